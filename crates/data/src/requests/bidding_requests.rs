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

use crate::core::ids::{CardDefinitionId, FactionId};

/// Context for a `PEEK_CARD` request, addressed solely to Atreides
/// (spec.md §4.2.2.A). Only Atreides' request carries the card's identity;
/// this is the access-control boundary the §9 "hidden information scoping"
/// hint asks for.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PeekCardContext {
    pub card_index: usize,
    pub total_cards: usize,
    pub card_type: crate::cards::treachery_card::TreacheryCardType,
    pub card_name: &'static str,
}

/// Context for a `BID_OR_PASS` request (spec.md §4.2.2.B.5).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BidOrPassContext {
    pub current_bid: u32,
    pub high_bidder: Option<FactionId>,
    pub spice_available: u32,
    pub minimum_bid: u32,
    pub is_opening_bid: bool,
    pub auction_number: usize,
    pub total_auctions: usize,
    pub passed_factions: BTreeSet<FactionId>,
    /// Only populated when the recipient is Atreides (prescience, rule
    /// 1.04.09 / glossary "Prescience").
    pub card_identity_if_atreides: Option<CardDefinitionId>,
}
