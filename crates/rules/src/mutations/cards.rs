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

use data::core::ids::{CardId, FactionId};
use data::game_state::GameState;
use utils::outcome::{Outcome, OK};
use utils::verify;

/// Moves a card instance from the top of the treachery deck into `winner`'s
/// hand, per spec.md §4.2.3. Fails if the deck is empty -- callers reshuffle
/// the discard into the deck before this point per rule 3.01.09, which is
/// out of scope for this subsystem (spec.md §1).
pub fn draw_card_to_hand(game: &mut GameState, winner: FactionId) -> Outcome {
    let card_id = game.treachery_deck.pop();
    let Some(card_id) = card_id else {
        return utils::fail!("Treachery deck is empty, cannot draw a card for {winner:?}");
    };
    move_card_to_hand(game, card_id, winner)
}

/// Moves a specific card instance into `owner`'s hand, updating both the
/// card's own `location`/`owner_id` and the owning faction's hand list.
pub fn move_card_to_hand(game: &mut GameState, card_id: CardId, owner: FactionId) -> Outcome {
    game.cards.get_mut(card_id).move_to_hand(owner);
    game.faction_mut(owner).hand.push(card_id);
    OK
}

/// Returns a card from the auction (or a hand) to the top of the treachery
/// deck, per the BOUGHT-IN resolution's default "return to top, in dealt
/// order" behavior (see DESIGN.md's Open Question decision).
pub fn return_card_to_deck_top(game: &mut GameState, card_id: CardId) -> Outcome {
    if let Some(owner) = game.cards.get(card_id).owner_id {
        game.faction_mut(owner).hand.retain(|&id| id != card_id);
    }
    game.cards.get_mut(card_id).move_to_deck();
    game.treachery_deck.push(card_id);
    OK
}

/// Removes `card_id` from `faction`'s hand and moves it to the discard
/// pile, e.g. when a Worthless card is played or a Karama card is spent.
pub fn discard_from_hand(game: &mut GameState, faction: FactionId, card_id: CardId) -> Outcome {
    let hand = &mut game.faction_mut(faction).hand;
    let before = hand.len();
    hand.retain(|&id| id != card_id);
    verify!(hand.len() < before, "{card_id:?} is not in {faction:?}'s hand");
    game.cards.get_mut(card_id).move_to_discard();
    OK
}
