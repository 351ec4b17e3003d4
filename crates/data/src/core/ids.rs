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

use enum_iterator::Sequence;
use enumset::EnumSetType;
use serde::{Deserialize, Serialize};
use slotmap::new_key_type;

new_key_type! {
    /// Identifies a single treachery card instance. Distinct from
    /// [CardDefinitionId]: several card instances may share one printed
    /// definition (e.g. the Worthless cards), matching how the teacher
    /// distinguishes a `CardId` (instance) from printed card data.
    pub struct CardId;
}

/// Identifies one of the six factions this subsystem knows how to seat.
///
/// Board geography and card-definition data are consumed as read-only
/// lookups (see the `oracle` crate); this subsystem only needs a faction
/// *identity* plus the behavioral exceptions spec.md calls out per faction.
#[derive(Debug, Hash, Serialize, Deserialize, EnumSetType, Ord, PartialOrd, Sequence)]
pub enum FactionId {
    Atreides,
    Harkonnen,
    Emperor,
    Fremen,
    SpacingGuild,
    BeneGesserit,
}

impl FactionId {
    /// Short uppercase label used in human-readable event messages.
    pub fn label(&self) -> &'static str {
        match self {
            FactionId::Atreides => "Atreides",
            FactionId::Harkonnen => "Harkonnen",
            FactionId::Emperor => "Emperor",
            FactionId::Fremen => "Fremen",
            FactionId::SpacingGuild => "Spacing Guild",
            FactionId::BeneGesserit => "Bene Gesserit",
        }
    }
}

/// Identifies a territory on the board. Geography (adjacency, sectors, type)
/// lives in `oracle::territories` and is looked up by this id; the id itself
/// is just a stable key, matching how the teacher treats `CardId` as an
/// opaque handle into `Zones`.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct TerritoryId(pub &'static str);

/// A storm sector, numbered 0-17 around the board.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct SectorId(pub u8);

impl SectorId {
    pub const COUNT: u8 = 18;

    pub fn new(value: u8) -> Self {
        Self(value % Self::COUNT)
    }
}

/// Identifies a treachery card's printed definition (name, type, text). The
/// printed data itself lives in `oracle::treachery_cards`.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct CardDefinitionId(pub &'static str);
