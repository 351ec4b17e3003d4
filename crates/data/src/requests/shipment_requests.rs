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

use crate::core::ids::{FactionId, SectorId, TerritoryId};

/// Status of a single stronghold, used to populate a shipment request's
/// context (spec.md §4.3.2).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrongholdStatus {
    pub territory: TerritoryId,
    pub occupant_factions: Vec<FactionId>,
    pub storm_blocked: bool,
    pub reason_cannot_ship: Option<String>,
}

/// Context for the Guild's up-front timing prompt (rules 2.06.12.01/02).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GuildTimingContext {
    pub non_guild_faction_count: usize,
}

/// Context for the per-faction "should Guild act now?" prompt issued when
/// the Guild chose `wait_later` (spec.md §4.3.2).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GuildActNowOrWaitContext {
    pub before_faction: FactionId,
}

/// Context for the WARTIME advisor-flip prompt (spec.md §4.3.1 step 3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WartimeContext {
    pub flip_eligible_territories: Vec<TerritoryId>,
}

/// Context for a faction's shipment decision (spec.md §4.3.2).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShipmentRequestContext {
    pub faction_id: FactionId,
    pub reserves_regular: u32,
    pub reserves_elite: u32,
    pub stronghold_statuses: Vec<StrongholdStatus>,
    /// Populated only for Fremen (rule 2.04.05): territories within distance
    /// 2 of the Great Flat, which they may ship into for free.
    pub fremen_distance_two_territories: Vec<TerritoryId>,
    pub has_ornithopter_access: bool,
}

/// A faction's shipment action, per spec.md §4.3.2.A.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ShipmentAction {
    ShipForces {
        territory: TerritoryId,
        sector: SectorId,
        regular: u32,
        elite: u32,
        cost: u32,
    },
    FremenSendForces {
        territory: TerritoryId,
        sector: SectorId,
        regular: u32,
        elite: u32,
    },
    GuildCrossShip {
        from_territory: TerritoryId,
        from_sector: SectorId,
        to_territory: TerritoryId,
        to_sector: SectorId,
        regular: u32,
        elite: u32,
        cost: u32,
    },
    GuildShipOffPlanet {
        from_territory: TerritoryId,
        from_sector: SectorId,
        regular: u32,
        elite: u32,
    },
    /// §9's lenient interpretation: a `MOVE_FORCES` response received during
    /// the SHIP sub-phase is treated as "skip shipment, move immediately".
    SkipViaMovement(MovementAction),
}

/// Context for a faction's movement decision (spec.md §4.3.2).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MovementRequestContext {
    pub faction_id: FactionId,
    pub from_candidates: Vec<TerritoryId>,
    pub storm_blocked_sectors: Vec<SectorId>,
    pub has_ornithopter_access: bool,
}

/// A faction's movement action, per spec.md §4.3.2.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MovementAction {
    pub from_territory: TerritoryId,
    pub from_sector: SectorId,
    pub to_territory: TerritoryId,
    pub to_sector: SectorId,
    pub count: u32,
    pub use_elite: bool,
}

/// Context for the BG SEND_ADVISOR prompt (rule 2.02.10/11).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BgAdvisorContext {
    pub territory: TerritoryId,
    pub sector: SectorId,
    pub shipper: FactionId,
}

/// Context for the BG INTRUSION prompt (rule 2.02.16).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BgIntrusionContext {
    pub territory: TerritoryId,
    pub sector: SectorId,
    pub entering_faction: FactionId,
}

/// Context for the TAKE UP ARMS prompt (rule 2.02.17).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TakeUpArmsContext {
    pub territory: TerritoryId,
    pub sector: SectorId,
    pub advisor_count: u32,
}
