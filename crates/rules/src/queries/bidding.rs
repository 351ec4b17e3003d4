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

use data::core::ids::FactionId;
use data::game_state::GameState;

use crate::predicates::bidding::is_eligible_bidder;

/// Factions eligible to bid at phase start, in storm order (spec.md
/// §4.2.1 step 2).
pub fn eligible_bidders(game: &GameState) -> Vec<FactionId> {
    game.storm_order.iter().copied().filter(|&f| is_eligible_bidder(game, f)).collect()
}

/// The starting bidder for auction `card_index`, per spec.md §4.2.2.A.
///
/// The first auction opens with the storm-order-first eligible player. Each
/// subsequent auction opens with the first eligible player strictly
/// clockwise (i.e. later in `storm_order`, wrapping) of the previous
/// opener; if the previous opener is the only eligible player left, they
/// re-open.
pub fn next_starting_bidder(
    game: &GameState,
    eligible_at_auction_start: &[FactionId],
    previous_opener: Option<FactionId>,
) -> Option<FactionId> {
    if eligible_at_auction_start.is_empty() {
        return None;
    }

    let Some(previous) = previous_opener else {
        return game.storm_order.iter().copied().find(|f| eligible_at_auction_start.contains(f));
    };

    let storm_order = &game.storm_order;
    let Some(previous_index) = storm_order.iter().position(|&f| f == previous) else {
        return game.storm_order.iter().copied().find(|f| eligible_at_auction_start.contains(f));
    };

    let n = storm_order.len();
    for offset in 1..=n {
        let candidate = storm_order[(previous_index + offset) % n];
        if eligible_at_auction_start.contains(&candidate) {
            return Some(candidate);
        }
    }

    None
}

/// Bidders still in play for the current auction: eligible at auction start,
/// and not yet in `passed_factions`.
pub fn active_bidders(
    eligible_at_auction_start: &std::collections::BTreeSet<FactionId>,
    passed_factions: &std::collections::BTreeSet<FactionId>,
) -> Vec<FactionId> {
    eligible_at_auction_start.iter().copied().filter(|f| !passed_factions.contains(f)).collect()
}
