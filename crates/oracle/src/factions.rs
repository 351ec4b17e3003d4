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

use data::core::ids::FactionId;

/// Display name for a faction, per spec.md §6's `FACTION_NAMES` table.
pub fn faction_name(faction: FactionId) -> &'static str {
    faction.label()
}

/// Maximum hand size for a faction (spec.md §3): 4 for most factions, 8 for
/// Harkonnen.
pub fn max_hand(faction: FactionId) -> usize {
    match faction {
        FactionId::Harkonnen => 8,
        _ => 4,
    }
}

/// Starting reserve force counts, used by the harness's scenario builder.
pub fn starting_forces(faction: FactionId) -> (u32, u32) {
    match faction {
        FactionId::Atreides => (10, 0),
        FactionId::Harkonnen => (10, 0),
        FactionId::Emperor => (10, 0),
        FactionId::Fremen => (10, 10),
        FactionId::SpacingGuild => (10, 0),
        FactionId::BeneGesserit => (5, 0),
    }
}

pub fn starting_spice(faction: FactionId) -> u32 {
    match faction {
        FactionId::Atreides => 10,
        FactionId::Harkonnen => 10,
        FactionId::Emperor => 10,
        FactionId::Fremen => 3,
        FactionId::SpacingGuild => 5,
        FactionId::BeneGesserit => 5,
    }
}
