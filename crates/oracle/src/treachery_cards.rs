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

//! Read-only treachery card definitions. Card *identity* (definition_id,
//! type, name) lives here; which deck/hand/discard a given instance is in
//! right now lives on [data::cards::treachery_card::TreacheryCard].

use data::cards::treachery_card::TreacheryCardType;
use data::core::ids::CardDefinitionId;
use once_cell::sync::Lazy;

/// A printed card plus how many copies appear in a standard deck.
#[derive(Debug, Clone, Copy)]
pub struct TreacheryCardDefinition {
    pub id: CardDefinitionId,
    pub name: &'static str,
    pub card_type: TreacheryCardType,
    pub copies: u32,
}

pub static TREACHERY_CARD_DEFINITIONS: Lazy<Vec<TreacheryCardDefinition>> = Lazy::new(|| {
    vec![
        TreacheryCardDefinition {
            id: CardDefinitionId("karama"),
            name: "Karama",
            card_type: TreacheryCardType::Karama,
            copies: 2,
        },
        TreacheryCardDefinition {
            id: CardDefinitionId("lasgun"),
            name: "Lasgun",
            card_type: TreacheryCardType::Weapon,
            copies: 1,
        },
        TreacheryCardDefinition {
            id: CardDefinitionId("maula_pistol"),
            name: "Maula Pistol",
            card_type: TreacheryCardType::Weapon,
            copies: 3,
        },
        TreacheryCardDefinition {
            id: CardDefinitionId("slip_tip"),
            name: "Slip Tip",
            card_type: TreacheryCardType::Weapon,
            copies: 3,
        },
        TreacheryCardDefinition {
            id: CardDefinitionId("shield"),
            name: "Shield",
            card_type: TreacheryCardType::Defense,
            copies: 4,
        },
        TreacheryCardDefinition {
            id: CardDefinitionId("snooper"),
            name: "Snooper",
            card_type: TreacheryCardType::Defense,
            copies: 4,
        },
        TreacheryCardDefinition {
            id: CardDefinitionId("family_atomics"),
            name: "Family Atomics",
            card_type: TreacheryCardType::Special,
            copies: 1,
        },
        TreacheryCardDefinition {
            id: CardDefinitionId("hunter_seeker"),
            name: "Hunter-Seeker",
            card_type: TreacheryCardType::Special,
            copies: 1,
        },
        TreacheryCardDefinition {
            id: CardDefinitionId("weather_control"),
            name: "Weather Control",
            card_type: TreacheryCardType::Special,
            copies: 1,
        },
        TreacheryCardDefinition {
            id: CardDefinitionId("trip_to_gamont"),
            name: "Trip to Gamont",
            card_type: TreacheryCardType::Worthless,
            copies: 2,
        },
        TreacheryCardDefinition {
            id: CardDefinitionId("baliset"),
            name: "Baliset",
            card_type: TreacheryCardType::Worthless,
            copies: 2,
        },
    ]
});

pub fn find(id: CardDefinitionId) -> &'static TreacheryCardDefinition {
    TREACHERY_CARD_DEFINITIONS
        .iter()
        .find(|c| c.id == id)
        .unwrap_or_else(|| panic!("Unknown card definition {id:?}"))
}

/// Expands the definitions table into one logical deck entry per copy, in a
/// fixed, reproducible order. Shuffling is the caller's responsibility (see
/// `rules::queries::random_source`).
pub fn standard_deck_definitions() -> Vec<(CardDefinitionId, TreacheryCardType)> {
    TREACHERY_CARD_DEFINITIONS
        .iter()
        .flat_map(|def| std::iter::repeat((def.id, def.card_type)).take(def.copies as usize))
        .collect()
}
