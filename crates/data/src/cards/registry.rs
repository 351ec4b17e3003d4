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

use serde::{Deserialize, Serialize};
use slotmap::SlotMap;

use crate::cards::treachery_card::TreacheryCard;
use crate::core::ids::CardId;

/// Owns every [TreacheryCard] instance in the game, keyed by [CardId].
///
/// Mirrors the teacher's `Zones` registry: card-holding collections
/// (`FactionState::hand`, `GameState::treachery_deck`, discard piles) store
/// [CardId]s, never the card data itself, so a card only ever has one
/// owning copy.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CardRegistry {
    cards: SlotMap<CardId, TreacheryCard>,
}

impl CardRegistry {
    pub fn insert(&mut self, card: TreacheryCard) -> CardId {
        self.cards.insert(card)
    }

    pub fn get(&self, id: CardId) -> &TreacheryCard {
        &self.cards[id]
    }

    pub fn get_mut(&mut self, id: CardId) -> &mut TreacheryCard {
        &mut self.cards[id]
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }
}
