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

use std::collections::BTreeMap;

use enumset::{EnumSet, EnumSetType};
use serde::{Deserialize, Serialize};

use crate::core::ids::{CardDefinitionId, CardId, FactionId, SectorId, TerritoryId};

/// Transient per-auction/per-phase flags granted by the Karama card.
///
/// Per spec.md §9: represented as a small enum-indexed set rather than
/// ad-hoc booleans, and always cleared at auction resolution (see
/// `bidding::handler`).
#[derive(Debug, Hash, Serialize, Deserialize, EnumSetType)]
pub enum KaramaFlag {
    /// Rule 3.01.xx: may bid over available spice for the current auction.
    BiddingActive,
    /// Rule 3.01.11: next auction win is free, no payment required.
    FreeCardActive,
    /// Glossary: Karama may also cancel another faction's special ability.
    /// No phase in this subsystem consumes this flag; it is carried for
    /// completeness of the card's modeled powers (see DESIGN.md).
    CancelAbility,
}

/// Force counts held in reserve (off the board, in the Tleilaxu Tanks'
/// sibling "reserves" pool), per spec.md §3.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct ReserveCounts {
    pub regular: u32,
    pub elite: u32,
}

/// A stack of forces a faction has in a single (territory, sector).
///
/// `advisors` is only meaningful for Bene Gesserit: advisor tokens occupy a
/// territory without contributing to stronghold-occupancy counts and cannot
/// fight until flipped to fighters (stored in `regular`).
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct ForceStack {
    pub regular: u32,
    pub elite: u32,
    pub advisors: u32,
}

impl ForceStack {
    pub fn is_empty(&self) -> bool {
        self.regular == 0 && self.elite == 0 && self.advisors == 0
    }

    pub fn fighter_count(&self) -> u32 {
        self.regular + self.elite
    }

    pub fn total(&self) -> u32 {
        self.regular + self.elite + self.advisors
    }
}

/// All forces belonging to one faction.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Forces {
    pub reserves: ReserveCounts,
    pub on_board: BTreeMap<(TerritoryId, SectorId), ForceStack>,
}

impl Forces {
    pub fn stack_at(&self, territory: TerritoryId, sector: SectorId) -> ForceStack {
        self.on_board.get(&(territory, sector)).copied().unwrap_or_default()
    }

    pub fn stack_mut(&mut self, territory: TerritoryId, sector: SectorId) -> &mut ForceStack {
        self.on_board.entry((territory, sector)).or_default()
    }

    /// Removes the stack entry entirely if it has become empty, per
    /// spec.md §4.1's cleanup requirement to "remove empty force stacks".
    pub fn prune_empty(&mut self, territory: TerritoryId, sector: SectorId) {
        if self.on_board.get(&(territory, sector)).is_some_and(ForceStack::is_empty) {
            self.on_board.remove(&(territory, sector));
        }
    }

    /// Territories (ignoring sector) where this faction currently has any
    /// force present.
    pub fn occupied_territories(&self) -> impl Iterator<Item = TerritoryId> + '_ {
        self.on_board
            .iter()
            .filter(|(_, stack)| !stack.is_empty())
            .map(|((territory, _), _)| *territory)
    }
}

/// Per-faction state, per spec.md §3.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FactionState {
    pub id: FactionId,
    pub spice: u32,
    /// Ordered hand of card instances; length must stay `<= max_hand(id)`,
    /// enforced by `rules::mutations` helpers, never by this struct itself.
    pub hand: Vec<CardId>,
    pub forces: Forces,
    pub ally_id: Option<FactionId>,
    pub traitors_drawn: Vec<CardDefinitionId>,
    pub karama_flags: EnumSet<KaramaFlag>,
}

impl FactionState {
    pub fn new(id: FactionId, starting_spice: u32) -> Self {
        Self {
            id,
            spice: starting_spice,
            hand: Vec::new(),
            forces: Forces::default(),
            ally_id: None,
            traitors_drawn: Vec::new(),
            karama_flags: EnumSet::new(),
        }
    }

    pub fn has_karama_card(&self, registry: &crate::cards::registry::CardRegistry) -> bool {
        self.hand.iter().any(|&id| registry.get(id).is_karama())
    }

    pub fn karama_free_card_active(&self) -> bool {
        self.karama_flags.contains(KaramaFlag::FreeCardActive)
    }

    pub fn karama_bidding_active(&self) -> bool {
        self.karama_flags.contains(KaramaFlag::BiddingActive)
    }

    /// Clears all transient Karama flags, as required at auction resolution
    /// (spec.md §4.2.3) and at phase cleanup (§4.1).
    pub fn clear_karama_flags(&mut self) {
        self.karama_flags.clear();
    }
}
