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

use crate::core::ids::{CardDefinitionId, FactionId, SectorId, TerritoryId};
use crate::game_state::GamePhase;

/// Structured, typed data carried by a [PhaseEvent]. One primary event per
/// state-altering action, plus a handful of side-effect events, per
/// spec.md §4.5.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum EventData {
    PhaseStarted { phase: GamePhase },
    PhaseComplete { phase: GamePhase, next_phase: GamePhase },
    PhaseAborted { phase: GamePhase, next_phase: GamePhase },

    HandSizeDeclared { faction: FactionId, hand_size: usize, category: HandSizeCategory },
    AuctionStarted { card_index: usize, total_cards: usize, starting_bidder: FactionId },
    BidPlaced { faction: FactionId, amount: u32 },
    BidPassed { faction: FactionId, reason: String },
    BidRejected { faction: FactionId, code: String, message: String },
    KaramaFreeCard { faction: FactionId },
    CardWon { winner: FactionId, amount: u32, card_index: usize },
    CardDrawnFree { faction: FactionId, ability: &'static str },
    CardBoughtIn { cards_returned: usize, card_ids: Vec<CardDefinitionId> },

    AdvisorsFlipped { faction: FactionId, territory: TerritoryId, sector: SectorId },
    GuildTimingChosen { timing: String },
    GuildActedNow,
    ShipmentSkipped { faction: FactionId },
    MovementSkipped { faction: FactionId },
    ForcesShipped {
        faction: FactionId,
        territory: TerritoryId,
        sector: SectorId,
        regular: u32,
        elite: u32,
        reason: ForcesShippedReason,
    },
    StrongholdOccupancyViolation { faction: FactionId, territory: TerritoryId },
    ForcesMoved {
        faction: FactionId,
        from_territory: TerritoryId,
        from_sector: SectorId,
        to_territory: TerritoryId,
        to_sector: SectorId,
        count: u32,
    },
    MovementRejected { faction: FactionId, code: String, message: String },
    BgAdvisorSent { territory: TerritoryId, sector: SectorId },
    BgIntrusionResolved { territory: TerritoryId, sector: SectorId, flipped: bool },
    TakeUpArmsResolved { territory: TerritoryId, sector: SectorId, flipped: bool },
    ValidationRejected { faction: FactionId, code: String, message: String },
}

/// Why forces were sent somewhere other than where their controller
/// intended -- distinguishes a normal shipment from the alliance-stacking
/// constraint of rule 1.06.07.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
pub enum ForcesShippedReason {
    Shipment,
    AllianceConstraint,
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
pub enum HandSizeCategory {
    NoCards,
    AtLeastOne,
    FourOrMore,
}

impl HandSizeCategory {
    pub fn for_count(count: usize) -> Self {
        match count {
            0 => HandSizeCategory::NoCards,
            1..=3 => HandSizeCategory::AtLeastOne,
            _ => HandSizeCategory::FourOrMore,
        }
    }
}

/// One entry in the append-only, strictly-ordered event stream consumed by
/// observers (spec.md §4.5). Events never mutate state; `message` is a
/// non-authoritative human summary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhaseEvent {
    pub data: EventData,
    pub message: String,
}

impl PhaseEvent {
    pub fn new(data: EventData, message: impl Into<String>) -> Self {
        Self { data, message: message.into() }
    }
}
