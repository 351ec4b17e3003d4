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

use data::core::ids::{FactionId, SectorId, TerritoryId};
use data::game_state::GameState;

use crate::predicates::errors::{RuleErrorCode, ValidationResult};
use crate::predicates::movement::validate_stronghold_occupancy;

/// CHOAM charity eligibility (rule 3.09): a faction with fewer than 2 spice
/// may request charity up to 2 spice; the Bene Gesserit may always request
/// 1 spice of charity regardless of their current holdings.
pub fn is_eligible_for_charity(game: &GameState, faction: FactionId) -> bool {
    let spice = game.faction(faction).spice;
    faction == FactionId::BeneGesserit || spice < 2
}

/// The charity payout a faction would receive if it requested charity right
/// now: enough to reach 2 spice (capped at 2 for factions already above it),
/// or a flat 1 for the Bene Gesserit's standing entitlement.
pub fn charity_amount(game: &GameState, faction: FactionId) -> u32 {
    let spice = game.faction(faction).spice;
    if faction == FactionId::BeneGesserit && spice >= 2 {
        1
    } else {
        2u32.saturating_sub(spice)
    }
}

/// Whether `faction` may invoke a Karama card's exception power at all right
/// now: it must hold an unplayed Karama card.
pub fn can_use_karama(game: &GameState, faction: FactionId) -> bool {
    game.faction(faction).has_karama_card(&game.cards)
}

/// The spice cost to ship `count` forces into `territory`, applying the
/// Guild's half-price shipping privilege (rule 2.06.07) when `shipper` is
/// the Spacing Guild. Off-planet full shipment costs 10 spice per force and
/// cross-planet shipment (moving directly between two on-board locations,
/// the Guild's exclusive privilege) costs 2 spice per force; both halve for
/// the Guild, rounding up per the rulebook's stated convention.
pub fn shipment_cost(shipper: FactionId, count: u32, cross_planet: bool) -> u32 {
    let per_force = if cross_planet { 2 } else { 10 };
    let raw = per_force * count;
    if shipper == FactionId::SpacingGuild {
        raw.div_ceil(2)
    } else {
        raw
    }
}

/// Validates that `faction` can ship `count` forces to `(territory, sector)`
/// per spec.md §4.3.2.A: the destination sector must not be under storm, the
/// faction must be able to afford the (Guild-adjusted) cost, and the
/// resulting occupancy must not exceed the 2-other-factions stronghold cap.
pub fn can_ship_to(
    game: &GameState,
    faction: FactionId,
    territory: TerritoryId,
    sector: SectorId,
    count: u32,
    cross_planet: bool,
) -> ValidationResult {
    if sector == game.storm_sector {
        return ValidationResult::fail(
            RuleErrorCode::ShipmentToStorm,
            format!("Sector {sector:?} is under storm"),
        );
    }

    let cost = shipment_cost(faction, count, cross_planet);
    if cost > game.faction(faction).spice {
        return ValidationResult::fail(
            RuleErrorCode::ShipmentInsufficientSpice,
            format!("{faction:?} has {} spice, shipment costs {cost}", game.faction(faction).spice),
        );
    }

    validate_stronghold_occupancy(game, territory, faction)
}
