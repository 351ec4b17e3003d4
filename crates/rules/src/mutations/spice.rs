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
use data::game_state::GameState;
use utils::outcome::{Outcome, OK};

/// Credits `faction` with `amount` spice. Spice entering the game (e.g.
/// from the bank) has no source faction to debit.
pub fn add_spice(game: &mut GameState, faction: FactionId, amount: u32) -> Outcome {
    game.faction_mut(faction).spice += amount;
    OK
}

/// Debits `faction` by `amount` spice. Fails with a fatal [StopCondition]
/// if the faction cannot afford it -- callers must check affordability with
/// a `rules::predicates` function first; this is the invariant-enforcing
/// primitive, not the player-facing validation.
pub fn remove_spice(game: &mut GameState, faction: FactionId, amount: u32) -> Outcome {
    let state = game.faction_mut(faction);
    utils::verify!(state.spice >= amount, "{faction:?} has {} spice, cannot remove {amount}", state.spice);
    state.spice -= amount;
    OK
}

/// Moves spice from `payer` to `payee`, e.g. a Guild shipment fee.
pub fn transfer_spice(
    game: &mut GameState,
    payer: FactionId,
    payee: FactionId,
    amount: u32,
) -> Outcome {
    remove_spice(game, payer, amount)?;
    add_spice(game, payee, amount)
}
