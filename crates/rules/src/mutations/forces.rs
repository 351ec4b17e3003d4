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

use data::core::ids::{FactionId, SectorId, TerritoryId};
use data::game_state::GameState;
use utils::outcome::{Outcome, OK};
use utils::verify;

/// Moves `regular`/`elite` forces belonging to `faction` from one
/// (territory, sector) to another, pruning the source stack if it becomes
/// empty (spec.md §3's "removing/zeroing empty stacks" mutation contract).
pub fn move_forces(
    game: &mut GameState,
    faction: FactionId,
    from: TerritoryId,
    from_sector: SectorId,
    to: TerritoryId,
    to_sector: SectorId,
    regular: u32,
    elite: u32,
) -> Outcome {
    let state = game.faction_mut(faction);
    let source = state.forces.stack_at(from, from_sector);
    verify!(
        regular <= source.regular && elite <= source.elite,
        "{faction:?} does not have {regular}/{elite} regular/elite forces at {from:?}/{from_sector:?}"
    );

    {
        let stack = state.forces.stack_mut(from, from_sector);
        stack.regular -= regular;
        stack.elite -= elite;
    }
    state.forces.prune_empty(from, from_sector);

    let destination = state.forces.stack_mut(to, to_sector);
    destination.regular += regular;
    destination.elite += elite;

    OK
}

/// Ships `regular`/`elite` forces from `faction`'s reserves directly onto
/// the board, per spec.md §4.3.2.A. Payment (if any) is the caller's
/// responsibility via `mutations::spice`; this only moves force tokens.
pub fn ship_forces(
    game: &mut GameState,
    faction: FactionId,
    territory: TerritoryId,
    sector: SectorId,
    regular: u32,
    elite: u32,
) -> Outcome {
    let state = game.faction_mut(faction);
    verify!(
        regular <= state.forces.reserves.regular && elite <= state.forces.reserves.elite,
        "{faction:?} only has {}/{} regular/elite forces in reserve",
        state.forces.reserves.regular,
        state.forces.reserves.elite
    );

    state.forces.reserves.regular -= regular;
    state.forces.reserves.elite -= elite;
    let stack = state.forces.stack_mut(territory, sector);
    stack.regular += regular;
    stack.elite += elite;

    OK
}

/// Returns all forces `faction` has at `(territory, sector)` to its
/// reserves, e.g. a retreat or a Guild-shipment cancellation.
pub fn send_forces_to_reserves(
    game: &mut GameState,
    faction: FactionId,
    territory: TerritoryId,
    sector: SectorId,
) -> Outcome {
    let state = game.faction_mut(faction);
    let stack = state.forces.stack_at(territory, sector);
    state.forces.reserves.regular += stack.regular;
    state.forces.reserves.elite += stack.elite;
    *state.forces.stack_mut(territory, sector) = Default::default();
    state.forces.prune_empty(territory, sector);
    OK
}

/// Returns `regular`/`elite` forces from `(territory, sector)` to `faction`'s
/// reserves without touching the rest of the stack, e.g. the Spacing Guild's
/// off-planet shipping privilege (rule 2.06.08).
pub fn board_to_reserves(
    game: &mut GameState,
    faction: FactionId,
    territory: TerritoryId,
    sector: SectorId,
    regular: u32,
    elite: u32,
) -> Outcome {
    let state = game.faction_mut(faction);
    let source = state.forces.stack_at(territory, sector);
    verify!(
        regular <= source.regular && elite <= source.elite,
        "{faction:?} does not have {regular}/{elite} regular/elite forces at {territory:?}/{sector:?}"
    );

    {
        let stack = state.forces.stack_mut(territory, sector);
        stack.regular -= regular;
        stack.elite -= elite;
    }
    state.forces.prune_empty(territory, sector);
    state.forces.reserves.regular += regular;
    state.forces.reserves.elite += elite;

    OK
}

/// Sends all of `faction`'s forces at `(territory, sector)` to the Tleilaxu
/// Tanks, per the alliance-stacking constraint (spec.md §4.3.4) and combat
/// losses elsewhere in the ruleset. Advisor tokens are converted to
/// fighters' worth of regular forces on the way in -- the Tanks hold no
/// advisor distinction, matching rule 2.02.13.
pub fn send_forces_to_tanks(
    game: &mut GameState,
    faction: FactionId,
    territory: TerritoryId,
    sector: SectorId,
) -> Outcome {
    let stack = game.faction(faction).forces.stack_at(territory, sector);

    let tanks = game.tanks.entry(faction).or_default();
    tanks.regular += stack.regular + stack.advisors;
    tanks.elite += stack.elite;

    let state = game.faction_mut(faction);
    *state.forces.stack_mut(territory, sector) = Default::default();
    state.forces.prune_empty(territory, sector);
    OK
}
