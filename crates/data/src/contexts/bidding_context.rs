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

use crate::core::ids::{CardId, FactionId};

/// Ephemeral per-phase context for the bidding phase, per spec.md §3.
///
/// Lives only while `GamePhase::Bidding` is active; created in
/// `BiddingPhaseHandler::initialize` and discarded at `cleanup`, the same
/// lifecycle the teacher gives `CombatState`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BiddingContext {
    /// Cards dealt for this phase's auctions, in dealing order.
    pub auction_cards: Vec<CardId>,
    pub current_card_index: usize,
    pub current_bid: u32,
    pub high_bidder: Option<FactionId>,
    /// Factions that have passed on the *current* card. Unioned with
    /// ineligibility for control flow, but kept distinct from it: only the
    /// set of factions eligible when the auction for this card *started*
    /// matters for BOUGHT-IN (spec.md §9).
    pub passed_factions: BTreeSet<FactionId>,
    /// Factions eligible to bid when the current auction started. Fixed for
    /// the duration of one auction.
    pub eligible_at_auction_start: BTreeSet<FactionId>,
    pub starting_bidder: Option<FactionId>,
    /// Auction indices (0-based) Atreides has already peeked at.
    pub atreides_peeked_cards: BTreeSet<usize>,
    /// Cards queued to return to the deck on a BOUGHT-IN or an empty-bidder
    /// auction start.
    pub cards_to_return_to_deck: Vec<CardId>,
    pub current_bidder_index: usize,
}

impl BiddingContext {
    pub fn invariants_hold(&self) -> bool {
        let high_bidder_matches_bid =
            (self.high_bidder.is_none()) == (self.current_bid == 0);
        let index_in_range = self.current_card_index <= self.auction_cards.len();
        let high_bidder_not_passed = self
            .high_bidder
            .map(|f| !self.passed_factions.contains(&f))
            .unwrap_or(true);
        high_bidder_matches_bid && index_in_range && high_bidder_not_passed
    }

    pub fn reset_for_next_auction(&mut self) {
        self.current_bid = 0;
        self.high_bidder = None;
        self.passed_factions.clear();
        self.eligible_at_auction_start.clear();
        self.current_bidder_index = 0;
    }

    pub fn total_cards(&self) -> usize {
        self.auction_cards.len()
    }

    pub fn current_card(&self) -> Option<CardId> {
        self.auction_cards.get(self.current_card_index).copied()
    }
}
