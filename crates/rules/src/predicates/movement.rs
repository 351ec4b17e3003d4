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

use std::collections::{BTreeSet, VecDeque};

use data::contexts::shipment_context::ShipmentMovementContext;
use data::core::ids::{FactionId, SectorId, TerritoryId};
use data::game_state::GameState;

use crate::predicates::errors::{RuleErrorCode, ValidationResult};

/// Movement range in territory-hops: 1 normally, 2 with ornithopter access
/// (spec.md §4.3.2.B, frozen for the phase per [ShipmentMovementContext::ornithopter_access]).
fn movement_range(context: &ShipmentMovementContext, faction: FactionId) -> u32 {
    if faction == FactionId::Fremen {
        // Fremen troop movement of up to 2 territories is a base-game
        // privilege independent of ornithopter access (rule 4.03); folded in
        // here since it has the same "is this faction's range 2" shape.
        2
    } else if context.ornithopter_access.contains(&faction) {
        2
    } else {
        1
    }
}

/// Breadth-first search over `oracle::territories` adjacency, bounded by
/// `max_hops`, used to validate that a destination is reachable per spec.md
/// §4.3.2.B.
pub fn reachable_within(origin: TerritoryId, max_hops: u32) -> BTreeSet<TerritoryId> {
    let mut visited = BTreeSet::new();
    visited.insert(origin);
    let mut frontier = VecDeque::new();
    frontier.push_back((origin, 0u32));

    while let Some((current, hops)) = frontier.pop_front() {
        if hops >= max_hops {
            continue;
        }
        let territory = oracle::territories::find(current);
        for &next in &territory.adjacent_territories {
            if visited.insert(next) {
                frontier.push_back((next, hops + 1));
            }
        }
    }

    visited
}

/// Validates a `MOVE_FORCES` response per spec.md §4.3.2.B.
///
/// Checks, in order: the faction actually holds the forces it claims to
/// move; the destination is within movement range (accounting for
/// ornithopter access and the Fremen's innate 2-territory range); and the
/// destination sector is not the current storm sector.
pub fn validate_movement(
    game: &GameState,
    context: &ShipmentMovementContext,
    faction: FactionId,
    from: TerritoryId,
    from_sector: SectorId,
    to: TerritoryId,
    to_sector: SectorId,
    regular: u32,
    elite: u32,
) -> ValidationResult {
    let stack = game.faction(faction).forces.stack_at(from, from_sector);
    if regular > stack.regular || elite > stack.elite {
        return ValidationResult::fail(
            RuleErrorCode::MovementNoSuchForces,
            format!(
                "{faction:?} has only {}/{} regular/elite forces at {from:?}/{from_sector:?}",
                stack.regular, stack.elite
            ),
        );
    }

    if to_sector == game.storm_sector {
        return ValidationResult::fail(
            RuleErrorCode::MovementIntoStorm,
            format!("Sector {to_sector:?} is under storm"),
        );
    }

    let range = movement_range(context, faction);
    let reachable = reachable_within(from, range);
    if !reachable.contains(&to) {
        return ValidationResult::fail(
            RuleErrorCode::MovementOutOfRange,
            format!("{to:?} is not within {range} territories of {from:?}"),
        );
    }

    ValidationResult::ok()
}

/// Stronghold-occupancy check per spec.md §4.3.1.C / glossary: a stronghold
/// may hold forces from at most 2 factions simultaneously, not counting
/// allies as separate occupants beyond that cap per the alliance-stacking
/// rule (spec.md §4.3.4).
pub fn validate_stronghold_occupancy(
    game: &GameState,
    territory: TerritoryId,
    entering_faction: FactionId,
) -> ValidationResult {
    if !oracle::territories::is_stronghold(territory) {
        return ValidationResult::ok();
    }

    let mut occupants: BTreeSet<FactionId> = game
        .factions
        .values()
        .filter(|state| state.id != entering_faction)
        .filter(|state| state.forces.occupied_territories().any(|t| t == territory))
        .map(|state| state.id)
        .collect();

    // Allies already present don't count as a second distinct occupant for
    // `entering_faction` if `entering_faction` is itself allied with them
    // (spec.md §4.3.4): remove any occupant allied with the entering faction.
    occupants.retain(|&other| !game.are_allied(other, entering_faction));

    if occupants.len() >= 2 {
        return ValidationResult::fail(
            RuleErrorCode::StrongholdOccupancyExceeded,
            format!("{territory:?} already holds forces from 2 unallied factions"),
        );
    }

    ValidationResult::ok()
}
