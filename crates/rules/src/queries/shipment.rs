// Copyright © 2024-present
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//   https://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::collections::BTreeSet;

use data::core::ids::{FactionId, TerritoryId};
use data::game_state::GameState;

use crate::predicates::movement::reachable_within;

/// Territories within 2 territories of the Great Flat, which the Fremen may
/// ship reserves into for free (rule 2.04.05).
pub fn fremen_distance_two_territories() -> Vec<TerritoryId> {
    reachable_within(TerritoryId("the_great_flat"), 2).into_iter().collect()
}

/// `storm_order` with the Spacing Guild removed, per spec.md §4.3.1 step 2
/// (the Guild is handled by its own timing override rather than a fixed
/// turn slot).
pub fn non_guild_storm_order(game: &GameState) -> Vec<FactionId> {
    game.storm_order.iter().copied().filter(|&f| f != FactionId::SpacingGuild).collect()
}

/// The set of factions with any force present in Arrakeen or Carthag right
/// now, used to compute `ornithopter_access` once at phase start (spec.md
/// §4.3.1 step 1) -- callers must not call this again mid-phase, since
/// access is frozen (invariant P7).
pub fn ornithopter_access(game: &GameState) -> BTreeSet<FactionId> {
    let arrakeen = TerritoryId("arrakeen");
    let carthag = TerritoryId("carthag");
    game.factions
        .values()
        .filter(|state| {
            state.forces.occupied_territories().any(|t| t == arrakeen || t == carthag)
        })
        .map(|state| state.id)
        .collect()
}
