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

use data::contexts::bidding_context::BiddingContext;
use data::core::ids::FactionId;
use data::game_state::GameState;

use crate::predicates::errors::{RuleErrorCode, ValidationResult};

/// Validates a `BID` response per spec.md §4.2.2.C.
///
/// Enforces, in order: the bid is positive (opening bids) or strictly
/// greater than the current bid; the bidder can afford it, unless a Karama
/// exception is active; the bidder is not already the high bidder (no
/// self-outbid); and the bidder's hand is not already full.
pub fn validate_bid(
    game: &GameState,
    context: &BiddingContext,
    faction: FactionId,
    amount: u32,
) -> ValidationResult {
    let is_opening_bid = context.current_bid == 0;

    if is_opening_bid {
        if amount < 1 {
            return ValidationResult::fail(
                RuleErrorCode::BidNotPositive,
                "Opening bid must be at least 1 spice",
            );
        }
    } else if amount <= context.current_bid {
        return ValidationResult::fail(
            RuleErrorCode::BidTooLow,
            format!("Bid of {amount} does not exceed the current bid of {}", context.current_bid),
        );
    }

    let faction_state = game.faction(faction);
    let karama_exempt =
        faction_state.karama_bidding_active() || faction_state.karama_free_card_active();
    if !karama_exempt && amount > faction_state.spice {
        return ValidationResult::fail(
            RuleErrorCode::BidExceedsSpice,
            format!("{faction:?} has {} spice, cannot bid {amount}", faction_state.spice),
        );
    }

    if context.high_bidder == Some(faction) {
        return ValidationResult::fail(
            RuleErrorCode::SelfOutbid,
            format!("{faction:?} is already the high bidder"),
        );
    }

    if faction_state.hand.len() >= oracle::factions::max_hand(faction) {
        return ValidationResult::fail(
            RuleErrorCode::HandFull,
            format!("{faction:?}'s hand is full"),
        );
    }

    ValidationResult::ok()
}

/// The minimum legal bid for the current auction state, per spec.md
/// §4.2.2.B.4: 1 if no bid has been placed yet, otherwise one more than the
/// current bid.
pub fn minimum_bid(context: &BiddingContext) -> u32 {
    if context.current_bid == 0 {
        1
    } else {
        context.current_bid + 1
    }
}

/// True if `faction` is eligible to participate in this phase's auctions at
/// all (spec.md §4.2.1 step 2): hand not full and has at least 1 spice, or
/// holds a Karama card, or has `karama_free_card_active`.
pub fn is_eligible_bidder(game: &GameState, faction: FactionId) -> bool {
    let state = game.faction(faction);
    let hand_not_full = state.hand.len() < oracle::factions::max_hand(faction);
    let can_open = state.spice >= 1;
    let karama = state.has_karama_card(&game.cards) || state.karama_free_card_active();
    hand_not_full && (can_open || karama)
}

/// Whether `faction` can use a Karama bid-over-spice exception right now.
/// Distinct from `is_eligible_bidder`: holding Karama makes a faction
/// eligible even with 0 spice, but the flag that lets them bid *above* what
/// they have must still be explicitly active (spec.md §9: "cyclic /
/// transient flags... always cleared at auction resolution").
pub fn can_use_karama_bid_over_spice(game: &GameState, faction: FactionId) -> bool {
    let state = game.faction(faction);
    state.karama_bidding_active() && state.has_karama_card(&game.cards)
}
