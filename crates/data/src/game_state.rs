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

use std::collections::{BTreeMap, BTreeSet};

use rand_xoshiro::Xoshiro256StarStar;
use serde::{Deserialize, Serialize};

use crate::cards::registry::CardRegistry;
use crate::core::ids::{CardId, FactionId, SectorId, TerritoryId};
use crate::factions::faction_state::{FactionState, ReserveCounts};

/// Which phase the game is currently in. Only the two phases this subsystem
/// implements carry real phase-local context; the rest exist purely as
/// `next_phase` targets, per spec.md §1.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum GamePhase {
    Setup,
    Storm,
    SpiceBlow,
    Bidding,
    ShipmentMovement,
    Battle,
    Revival,
}

/// Options controlling overall gameplay, analogous to the teacher's
/// `GameConfiguration`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameConfiguration {
    pub advanced_rules: bool,
    /// Factions seated at this table, in their fixed table-order (the order
    /// storm rotation is applied to -- see `rules::queries::storm_order`).
    pub seated_factions: Vec<FactionId>,
}

impl GameConfiguration {
    pub fn has_faction(&self, faction: FactionId) -> bool {
        self.seated_factions.contains(&faction)
    }
}

/// A single append-only record of an action having been taken, per
/// spec.md §3's `action_log` invariant. Distinct from [crate::events::PhaseEvent]:
/// this is a terse record kept on [GameState] itself (and hence persisted /
/// replayable), while events are the richer per-step broadcast stream.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionLogEntry {
    pub turn: u32,
    pub phase: GamePhase,
    pub faction: Option<FactionId>,
    pub summary: String,
}

/// Append-only log of actions taken over the course of the game.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ActionLog {
    entries: Vec<ActionLogEntry>,
}

impl ActionLog {
    pub fn append(&mut self, entry: ActionLogEntry) {
        self.entries.push(entry);
    }

    pub fn entries(&self) -> &[ActionLogEntry] {
        &self.entries
    }
}

/// The single shared snapshot threaded through every phase handler.
///
/// Handlers receive this by value and return a new state (spec.md §3); in
/// this workspace that's expressed as `&mut GameState` mutation within one
/// `processStep` call followed by `state.clone()` at call boundaries where
/// the caller needs to keep the previous snapshot (e.g. for undo, which is
/// out of scope here and therefore not implemented).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    pub turn: u32,
    pub phase: GamePhase,
    pub storm_sector: SectorId,
    pub storm_order: Vec<FactionId>,
    pub factions: BTreeMap<FactionId, FactionState>,
    pub cards: CardRegistry,
    pub treachery_deck: Vec<CardId>,
    pub treachery_discard: Vec<CardId>,
    pub spice_deck_a: Vec<CardId>,
    pub spice_deck_b: Vec<CardId>,
    pub spice_discard: Vec<CardId>,
    pub alliances: BTreeSet<(FactionId, FactionId)>,
    pub territory_spice: BTreeMap<(TerritoryId, SectorId), u32>,
    /// The Tleilaxu Tanks: forces sent here by defeat or the
    /// alliance-stacking constraint, per faction, per spec.md §3's
    /// "reserves + on-board + tanks" force-accounting invariant.
    pub tanks: BTreeMap<FactionId, ReserveCounts>,
    pub configuration: GameConfiguration,
    pub action_log: ActionLog,
    #[serde(skip)]
    pub rng: Xoshiro256StarStar,
}

impl GameState {
    pub fn faction(&self, id: FactionId) -> &FactionState {
        self.factions.get(&id).unwrap_or_else(|| panic!("{id:?} is not seated in this game"))
    }

    pub fn faction_mut(&mut self, id: FactionId) -> &mut FactionState {
        self.factions.get_mut(&id).unwrap_or_else(|| panic!("{id:?} is not seated in this game"))
    }

    /// Records an alliance as an unordered pair, per spec.md §3.
    pub fn ally_pair(a: FactionId, b: FactionId) -> (FactionId, FactionId) {
        if a < b {
            (a, b)
        } else {
            (b, a)
        }
    }

    pub fn are_allied(&self, a: FactionId, b: FactionId) -> bool {
        a != b && self.alliances.contains(&Self::ally_pair(a, b))
    }

    pub fn log(&mut self, faction: Option<FactionId>, summary: impl Into<String>) {
        let entry =
            ActionLogEntry { turn: self.turn, phase: self.phase, faction, summary: summary.into() };
        self.action_log.append(entry);
    }
}
