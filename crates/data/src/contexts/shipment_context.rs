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

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::core::ids::{FactionId, SectorId, TerritoryId};

/// Which sub-turn a faction is on within its own ship-then-move turn.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
pub enum ShipmentSubStep {
    Ship,
    Move,
    Done,
}

/// The Guild's chosen timing, per rules 2.06.12.01/2.06.12.02.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
pub enum GuildTiming {
    ActNow,
    WaitLater,
    DelayToEnd,
}

/// A Bene-Gesserit reactive side-quest triggered mid-turn by another
/// faction's shipment or movement. Spec.md §3 describes these as an
/// orthogonal set of `isWaitingFor*` flags; §9 recommends consolidating
/// them into a tagged union, which this enum (together with
/// [ShipmentWaiting]) does.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub enum ReactiveSubquest {
    Wartime { territories: Vec<TerritoryId> },
    Intrusion { territory: TerritoryId, sector: SectorId, entering_faction: FactionId },
    SpiritualAdvisor { territory: TerritoryId, sector: SectorId },
    TakeUpArms { territory: TerritoryId, sector: SectorId, advisor_count: u32 },
}

/// Which single pending response type the phase handler currently accepts.
///
/// A discriminated union rather than several orthogonal booleans, per the
/// §9 redesign hint. Mismatched responses are ignored with an event rather
/// than rejected as an error (spec.md §4.3.3).
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub enum ShipmentWaiting {
    None,
    Wartime,
    GuildTiming,
    GuildPerFaction,
    FactionShip,
    FactionMove,
    BgAdvisor,
    BgIntrusion,
    TakeUpArms,
}

/// Ephemeral per-phase context for the shipment & movement phase, per
/// spec.md §3.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShipmentMovementContext {
    pub non_guild_storm_order: Vec<FactionId>,
    pub current_faction_index: usize,
    pub current_faction: Option<FactionId>,
    pub current_sub_step: ShipmentSubStep,
    /// Frozen at phase start (spec.md §4.3.1 step 1); invariant P7 requires
    /// this never changes for the rest of the phase.
    pub ornithopter_access: BTreeSet<FactionId>,
    pub guild_completed: bool,
    pub guild_timing: Option<GuildTiming>,
    pub ask_guild_before_next: bool,
    pub waiting_for: ShipmentWaiting,
    pub pending_reactive: Option<ReactiveSubquest>,
    /// Phase-initialization sequencing (spec.md §4.3.1): both start `false`
    /// and latch `true` once their one-time prompt (if any) has been issued
    /// and resolved, so `initialize`/`process_step` know which startup step
    /// to resume into.
    pub wartime_resolved: bool,
    pub guild_timing_resolved: bool,
}

impl Default for ShipmentMovementContext {
    fn default() -> Self {
        Self {
            non_guild_storm_order: Vec::new(),
            current_faction_index: 0,
            current_faction: None,
            current_sub_step: ShipmentSubStep::Done,
            ornithopter_access: BTreeSet::new(),
            guild_completed: false,
            guild_timing: None,
            ask_guild_before_next: false,
            waiting_for: ShipmentWaiting::None,
            pending_reactive: None,
            wartime_resolved: false,
            guild_timing_resolved: false,
        }
    }
}

impl ShipmentMovementContext {
    pub fn current_faction_done(&mut self) {
        self.current_sub_step = ShipmentSubStep::Done;
        self.waiting_for = ShipmentWaiting::None;
        self.pending_reactive = None;
    }

    pub fn advance_to_next_faction(&mut self) {
        self.current_faction_index += 1;
        self.current_faction = self.non_guild_storm_order.get(self.current_faction_index).copied();
    }
}
