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

use crate::core::ids::CardDefinitionId;
use crate::core::ids::FactionId;

/// Printed category of a treachery card. Used by a small number of rule
/// predicates (Karama variants, weapon/defense pairing is a battle-phase
/// concern and out of scope here).
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum TreacheryCardType {
    Weapon,
    Defense,
    Special,
    Worthless,
    Karama,
}

/// Where a treachery card currently lives. Mirrors the teacher's `Zone` /
/// `CardState.location` coupling: `Deck` implies no owner, `Hand` and
/// `Discard` carry one.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum CardLocation {
    Deck,
    Hand,
    Discard,
}

/// A single treachery card instance.
///
/// Invariant (spec.md §3): `location == Deck` iff `owner_id == None`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreacheryCard {
    pub definition_id: CardDefinitionId,
    pub card_type: TreacheryCardType,
    pub location: CardLocation,
    pub owner_id: Option<FactionId>,
}

impl TreacheryCard {
    pub fn in_deck(definition_id: CardDefinitionId, card_type: TreacheryCardType) -> Self {
        Self { definition_id, card_type, location: CardLocation::Deck, owner_id: None }
    }

    /// Moves this card into `owner`'s hand. Panics (a programmer error, not
    /// a game error) if the card was not in the deck or discard -- callers
    /// go through `rules::mutations` which enforce this via the location/
    /// owner invariant rather than calling this directly on arbitrary state.
    pub fn move_to_hand(&mut self, owner: FactionId) {
        self.location = CardLocation::Hand;
        self.owner_id = Some(owner);
    }

    pub fn move_to_discard(&mut self) {
        self.location = CardLocation::Discard;
        self.owner_id = None;
    }

    pub fn move_to_deck(&mut self) {
        self.location = CardLocation::Deck;
        self.owner_id = None;
    }

    pub fn is_karama(&self) -> bool {
        self.card_type == TreacheryCardType::Karama
    }
}
