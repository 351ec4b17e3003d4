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

use data::contexts::bidding_context::BiddingContext;
use data::core::ids::FactionId;
use data::events::{EventData, HandSizeCategory, PhaseEvent};
use data::game_state::{GamePhase, GameState};
use data::phase_step_result::PhaseStepResult;
use data::requests::{
    AgentRequest, AgentResponse, BidOrPassContext, PeekCardContext, RequestKind, ResponseAction,
};
use engine::{EngineConfig, PhaseHandler};
use rules::predicates::bidding::{can_use_karama_bid_over_spice, minimum_bid, validate_bid};
use rules::predicates::errors::ValidationResult;
use rules::queries::bidding::{active_bidders, eligible_bidders, next_starting_bidder};
use rules::queries::random_source::RandomSource;

/// Which response this handler is currently paused waiting for, per
/// auction. Mirrors the `{AUCTION_INIT, AWAITING_PEEK, AWAITING_BID,
/// RESOLVING, DONE}` state machine of spec.md §4.2.2.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
enum Stage {
    /// No auction in flight; only valid before the first auction starts or
    /// after the phase has completed.
    Idle,
    AwaitingPeek,
    AwaitingBid(FactionId),
}

/// Implements the full Bidding phase (spec.md §4.2): the auction state
/// machine and per-faction exceptions (Atreides prescience, Harkonnen TOP
/// CARD, Emperor banking, Karama free-card / over-spice).
pub struct BiddingPhaseHandler {
    context: BiddingContext,
    stage: Stage,
    preserve_deck_order_on_return: bool,
}

impl BiddingPhaseHandler {
    pub fn new(preserve_deck_order_on_return: bool) -> Self {
        Self { context: BiddingContext::default(), stage: Stage::Idle, preserve_deck_order_on_return }
    }

    /// Builds a handler honoring `config.bought_in_preserves_order`, the
    /// `EngineConfig` knob this handler is meant to read.
    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(config.bought_in_preserves_order)
    }

    fn hand_size_events(&self, state: &GameState) -> Vec<PhaseEvent> {
        state
            .storm_order
            .iter()
            .map(|&faction| {
                let hand_size = state.faction(faction).hand.len();
                let category = HandSizeCategory::for_count(hand_size);
                PhaseEvent::new(
                    EventData::HandSizeDeclared { faction, hand_size, category },
                    format!("{faction:?} has {hand_size} card(s)"),
                )
            })
            .collect()
    }

    /// spec.md §4.2.1: deal `min(|eligible_bidders|, |deck|)` cards and
    /// start the first auction, or complete immediately if none are dealt.
    fn initialize_auctions(&mut self, mut state: GameState) -> PhaseStepResult {
        let mut events = self.hand_size_events(&state);

        let eligible = eligible_bidders(&state);
        let deal_count = eligible.len().min(state.treachery_deck.len());
        if deal_count == 0 {
            return PhaseStepResult::complete(state, GamePhase::Revival).with_events(events);
        }

        let mut auction_cards = Vec::with_capacity(deal_count);
        for _ in 0..deal_count {
            if let Some(card_id) = state.treachery_deck.pop() {
                auction_cards.push(card_id);
            }
        }
        self.context = BiddingContext { auction_cards, ..BiddingContext::default() };

        let mut result = self.start_auction(state, None);
        events.append(&mut result.events);
        result.events = events;
        result
    }

    /// Begins the auction at `current_card_index`, per spec.md §4.2.2.A.
    fn start_auction(&mut self, mut state: GameState, previous_opener: Option<FactionId>) -> PhaseStepResult {
        if self.context.current_card_index >= self.context.total_cards() {
            self.stage = Stage::Idle;
            return PhaseStepResult::complete(state, GamePhase::Revival);
        }

        self.context.reset_for_next_auction();
        let eligible: BTreeSet<FactionId> = eligible_bidders(&state).into_iter().collect();
        self.context.eligible_at_auction_start = eligible.clone();

        let Some(starting_bidder) =
            next_starting_bidder(&state, &eligible.iter().copied().collect::<Vec<_>>(), previous_opener)
        else {
            return self.return_remaining_to_deck(state, "no eligible bidders remain");
        };
        self.context.starting_bidder = Some(starting_bidder);
        // `current_bidder_index` indexes into `storm_order` filtered down to
        // `eligible_at_auction_start` (the same filter `step_auction` applies),
        // not the unfiltered `storm_order` -- otherwise the two would drift.
        let order: Vec<FactionId> =
            state.storm_order.iter().copied().filter(|f| eligible.contains(f)).collect();
        self.context.current_bidder_index =
            order.iter().position(|&f| f == starting_bidder).unwrap_or(0);

        let mut events = vec![PhaseEvent::new(
            EventData::AuctionStarted {
                card_index: self.context.current_card_index + 1,
                total_cards: self.context.total_cards(),
                starting_bidder,
            },
            format!(
                "Auction {}/{} started, {starting_bidder:?} opens",
                self.context.current_card_index + 1,
                self.context.total_cards()
            ),
        )];

        let card_id = self.context.current_card().expect("auction_cards checked above");
        let atreides_present = state.configuration.has_faction(FactionId::Atreides);
        let already_peeked = self.context.atreides_peeked_cards.contains(&self.context.current_card_index);
        if atreides_present && !already_peeked {
            self.context.atreides_peeked_cards.insert(self.context.current_card_index);
            let card = state.cards.get(card_id);
            let definition = oracle::treachery_cards::find(card.definition_id);
            self.stage = Stage::AwaitingPeek;
            let request = AgentRequest {
                faction_id: FactionId::Atreides,
                prompt: "Prescience: you may view this card before bidding begins".to_string(),
                kind: RequestKind::PeekCard(PeekCardContext {
                    card_index: self.context.current_card_index,
                    total_cards: self.context.total_cards(),
                    card_type: definition.card_type,
                    card_name: definition.name,
                }),
                available_actions: vec!["ACKNOWLEDGE".to_string()],
            };
            let mut result = PhaseStepResult::awaiting(state, vec![request]);
            result.events = events;
            return result;
        }

        let mut result = self.step_auction(state);
        let mut all_events = events.drain(..).collect::<Vec<_>>();
        all_events.append(&mut result.events);
        result.events = all_events;
        result
    }

    /// Advances the per-auction bid elicitation loop (spec.md §4.2.2.B)
    /// until either a new `BID_OR_PASS` request is issued or the auction
    /// resolves / the phase ends in BOUGHT-IN.
    fn step_auction(&mut self, mut state: GameState) -> PhaseStepResult {
        let mut events = Vec::new();
        loop {
            let active = active_bidders(&self.context.eligible_at_auction_start, &self.context.passed_factions);

            if active.is_empty() && self.context.high_bidder.is_none() {
                let mut result = self.handle_bought_in(state);
                result.events.splice(0..0, events);
                return result;
            }

            if let Some(high_bidder) = self.context.high_bidder {
                if active.len() <= 1 {
                    let mut result = self.resolve_auction(state);
                    result.events.splice(0..0, events);
                    return result;
                }
                debug_assert!(active.contains(&high_bidder));
            }

            let order: Vec<FactionId> = state
                .storm_order
                .iter()
                .copied()
                .filter(|f| self.context.eligible_at_auction_start.contains(f))
                .collect();
            if order.is_empty() {
                let mut result = self.handle_bought_in(state);
                result.events.splice(0..0, events);
                return result;
            }
            let idx = self.context.current_bidder_index % order.len();
            let candidate = order[idx];

            if self.context.passed_factions.contains(&candidate) {
                self.context.current_bidder_index += 1;
                continue;
            }

            if state.faction(candidate).karama_free_card_active() {
                events.push(PhaseEvent::new(
                    EventData::KaramaFreeCard { faction: candidate },
                    format!("{candidate:?} takes the card for free via Karama"),
                ));
                self.context.high_bidder = Some(candidate);
                self.context.current_bid = 0;
                let mut result = self.resolve_auction(state);
                result.events.splice(0..0, events);
                return result;
            }

            let min_bid = minimum_bid(&self.context);
            let can_afford = state.faction(candidate).spice >= min_bid;
            let has_karama = can_use_karama_bid_over_spice(&state, candidate);
            if !can_afford && !has_karama {
                self.context.passed_factions.insert(candidate);
                events.push(PhaseEvent::new(
                    EventData::BidPassed {
                        faction: candidate,
                        reason: "auto_skip_insufficient_spice".to_string(),
                    },
                    format!("{candidate:?} auto-skipped: cannot afford minimum bid of {min_bid}"),
                ));
                self.context.current_bidder_index += 1;
                continue;
            }

            self.stage = Stage::AwaitingBid(candidate);
            let card_identity_if_atreides = (candidate == FactionId::Atreides)
                .then(|| {
                    self.context
                        .current_card()
                        .map(|card_id| state.cards.get(card_id).definition_id)
                })
                .flatten();
            let request = AgentRequest {
                faction_id: candidate,
                prompt: format!("Bid at least {min_bid} spice, or pass"),
                kind: RequestKind::BidOrPass(BidOrPassContext {
                    current_bid: self.context.current_bid,
                    high_bidder: self.context.high_bidder,
                    spice_available: state.faction(candidate).spice,
                    minimum_bid: min_bid,
                    is_opening_bid: self.context.current_bid == 0,
                    auction_number: self.context.current_card_index + 1,
                    total_auctions: self.context.total_cards(),
                    passed_factions: self.context.passed_factions.clone(),
                    card_identity_if_atreides,
                }),
                available_actions: vec!["BID".to_string(), "PASS".to_string()],
            };
            let mut result = PhaseStepResult::awaiting(state, vec![request]);
            result.events = events;
            return result;
        }
    }

    /// spec.md §4.2.3.
    fn resolve_auction(&mut self, mut state: GameState) -> PhaseStepResult {
        let mut events = Vec::new();
        let winner = self.context.high_bidder.expect("resolve_auction requires a high bidder");
        let amount = self.context.current_bid;
        let card_id = self.context.current_card().expect("resolve_auction requires a current card");

        let karama_free = state.faction(winner).karama_free_card_active();
        rules::mutations::cards::move_card_to_hand(&mut state, card_id, winner)
            .expect("card hand move cannot fail for a freshly-dealt card");

        if !karama_free && amount > 0 {
            rules::mutations::spice::remove_spice(&mut state, winner, amount)
                .expect("winner's spice was validated before bidding");
            if state.configuration.has_faction(FactionId::Emperor) && winner != FactionId::Emperor {
                rules::mutations::spice::add_spice(&mut state, FactionId::Emperor, amount).expect("add_spice cannot fail");
            }
        }

        events.push(PhaseEvent::new(
            EventData::CardWon { winner, amount, card_index: self.context.current_card_index },
            format!("{winner:?} wins auction {} for {amount} spice", self.context.current_card_index + 1),
        ));

        if winner == FactionId::Harkonnen
            && state.faction(FactionId::Harkonnen).hand.len() < oracle::factions::max_hand(FactionId::Harkonnen)
            && !state.treachery_deck.is_empty()
        {
            rules::mutations::cards::draw_card_to_hand(&mut state, FactionId::Harkonnen)
                .expect("deck was checked non-empty");
            events.push(PhaseEvent::new(
                EventData::CardDrawnFree { faction: FactionId::Harkonnen, ability: "TOP_CARD" },
                "Harkonnen draws a bonus card via TOP CARD".to_string(),
            ));
        }

        state.faction_mut(winner).clear_karama_flags();

        let previous_opener = self.context.starting_bidder;
        self.context.current_card_index += 1;
        let mut result = self.start_auction(state, previous_opener);
        events.append(&mut result.events);
        result.events = events;
        result
    }

    /// rule 1.04.09, spec.md §4.2.2.B.2: no active bidders remain and
    /// nobody has bid. Returns the current card plus every unsold following
    /// card to the deck and ends the phase entirely.
    fn handle_bought_in(&mut self, mut state: GameState) -> PhaseStepResult {
        let remaining: Vec<_> = self.context.auction_cards[self.context.current_card_index..].to_vec();
        self.return_cards(&mut state, &remaining);
        let event = PhaseEvent::new(
            EventData::CardBoughtIn {
                cards_returned: remaining.len(),
                card_ids: remaining.iter().map(|&id| state.cards.get(id).definition_id).collect(),
            },
            format!("{} card(s) bought in, returned to the deck", remaining.len()),
        );
        self.stage = Stage::Idle;
        PhaseStepResult::complete(state, GamePhase::Revival).with_events(vec![event])
    }

    /// spec.md §4.2.2.A.5: no eligible bidders exist for this auction at
    /// all; return the remainder to the deck and end the phase.
    fn return_remaining_to_deck(&mut self, mut state: GameState, reason: &str) -> PhaseStepResult {
        let remaining: Vec<_> = self.context.auction_cards[self.context.current_card_index..].to_vec();
        self.return_cards(&mut state, &remaining);
        let event = PhaseEvent::new(
            EventData::CardBoughtIn {
                cards_returned: remaining.len(),
                card_ids: remaining.iter().map(|&id| state.cards.get(id).definition_id).collect(),
            },
            format!("Bidding ended early: {reason}"),
        );
        self.stage = Stage::Idle;
        PhaseStepResult::complete(state, GamePhase::Revival).with_events(vec![event])
    }

    fn return_cards(&self, state: &mut GameState, cards: &[data::core::ids::CardId]) {
        for &card_id in cards {
            rules::mutations::cards::return_card_to_deck_top(state, card_id)
                .expect("returning an auctioned card to the deck cannot fail");
        }
        if !self.preserve_deck_order_on_return {
            // Fisher-Yates over the returned suffix only, matching the
            // source's own shuffle-on-return behavior (see DESIGN.md's
            // Open Question decision for BOUGHT-IN).
            let start = state.treachery_deck.len() - cards.len();
            state.rng.shuffle(&mut state.treachery_deck[start..]);
        }
    }

    fn process_bid_response(
        &mut self,
        state: GameState,
        candidate: FactionId,
        response: AgentResponse,
    ) -> PhaseStepResult {
        let mut events = Vec::new();

        if response.passed || matches!(response.action, ResponseAction::Pass) {
            self.context.passed_factions.insert(candidate);
            events.push(PhaseEvent::new(
                EventData::BidPassed { faction: candidate, reason: "voluntary".to_string() },
                format!("{candidate:?} passes"),
            ));
        } else if let ResponseAction::Bid { amount } = response.action {
            let validation: ValidationResult =
                validate_bid(&state, &self.context, candidate, amount);
            if validation.is_valid() {
                self.context.current_bid = amount;
                self.context.high_bidder = Some(candidate);
                events.push(PhaseEvent::new(
                    EventData::BidPlaced { faction: candidate, amount },
                    format!("{candidate:?} bids {amount}"),
                ));
            } else {
                let error = validation.first_error().expect("is_valid() false implies an error");
                self.context.passed_factions.insert(candidate);
                events.push(PhaseEvent::new(
                    EventData::BidPassed { faction: candidate, reason: error.code.code().to_string() },
                    format!("{candidate:?}'s bid rejected: {error}"),
                ));
            }
        } else {
            // Malformed response for this request type: treat as a pass,
            // per spec.md §7.2.
            self.context.passed_factions.insert(candidate);
            events.push(PhaseEvent::new(
                EventData::BidPassed { faction: candidate, reason: "malformed_response".to_string() },
                format!("{candidate:?} sent an unexpected response type, treated as a pass"),
            ));
        }

        self.context.current_bidder_index += 1;
        let mut result = self.step_auction(state);
        events.append(&mut result.events);
        result.events = events;
        result
    }
}

impl PhaseHandler for BiddingPhaseHandler {
    fn phase(&self) -> GamePhase {
        GamePhase::Bidding
    }

    fn initialize(&mut self, state: GameState) -> PhaseStepResult {
        self.initialize_auctions(state)
    }

    fn process_step(&mut self, state: GameState, mut responses: Vec<AgentResponse>) -> PhaseStepResult {
        let result = match self.stage {
            Stage::Idle => {
                tracing::warn!("process_step called with no pending bidding request");
                PhaseStepResult::complete(state, GamePhase::Revival)
            }
            Stage::AwaitingPeek => {
                self.stage = Stage::Idle;
                self.step_auction(state)
            }
            Stage::AwaitingBid(candidate) => {
                let response = responses
                    .drain(..)
                    .find(|r| r.faction_id == candidate)
                    .unwrap_or_else(|| AgentResponse::pass(candidate));
                self.process_bid_response(state, candidate, response)
            }
        };
        debug_assert!(self.context.invariants_hold(), "bidding context invariants violated: {:?}", self.context);
        result
    }

    fn cleanup(&mut self, mut state: GameState) -> GameState {
        for faction in state.configuration.seated_factions.clone() {
            state.faction_mut(faction).clear_karama_flags();
        }
        self.context = BiddingContext::default();
        self.stage = Stage::Idle;
        state
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use data::cards::registry::CardRegistry;
    use data::cards::treachery_card::{TreacheryCard, TreacheryCardType};
    use data::core::ids::{CardDefinitionId, SectorId};
    use data::factions::faction_state::FactionState;
    use data::game_state::{ActionLog, GameConfiguration};
    use data::requests::ResponseAction;
    use rand::SeedableRng;
    use rand_xoshiro::Xoshiro256StarStar;

    use super::*;

    fn seated_factions() -> Vec<FactionId> {
        vec![
            FactionId::Atreides,
            FactionId::Harkonnen,
            FactionId::Emperor,
            FactionId::Fremen,
            FactionId::SpacingGuild,
            FactionId::BeneGesserit,
        ]
    }

    fn new_test_game(card_count: usize) -> GameState {
        let seated = seated_factions();
        let mut factions = BTreeMap::new();
        for &faction in &seated {
            factions.insert(faction, FactionState::new(faction, oracle::factions::starting_spice(faction)));
        }

        let mut cards = CardRegistry::default();
        let mut treachery_deck = Vec::new();
        for _ in 0..card_count {
            let id = cards.insert(TreacheryCard::in_deck(
                CardDefinitionId("lasgun"),
                TreacheryCardType::Weapon,
            ));
            treachery_deck.push(id);
        }

        GameState {
            turn: 1,
            phase: GamePhase::Bidding,
            storm_sector: SectorId::new(0),
            storm_order: seated.clone(),
            factions,
            cards,
            treachery_deck,
            treachery_discard: Vec::new(),
            spice_deck_a: Vec::new(),
            spice_deck_b: Vec::new(),
            spice_discard: Vec::new(),
            alliances: Default::default(),
            territory_spice: BTreeMap::new(),
            tanks: BTreeMap::new(),
            configuration: GameConfiguration { advanced_rules: true, seated_factions: seated },
            action_log: ActionLog::default(),
            rng: Xoshiro256StarStar::seed_from_u64(7),
        }
    }

    fn bid_response(faction: FactionId, amount: u32) -> AgentResponse {
        AgentResponse { faction_id: faction, action: ResponseAction::Bid { amount }, passed: false }
    }

    /// Drives a handler through the Atreides peek step, if one was issued,
    /// returning the result for the first actual `BID_OR_PASS` request.
    fn skip_peek(handler: &mut BiddingPhaseHandler, result: PhaseStepResult) -> PhaseStepResult {
        if matches!(handler.stage, Stage::AwaitingPeek) {
            handler.process_step(result.state, vec![AgentResponse {
                faction_id: FactionId::Atreides,
                action: ResponseAction::Acknowledge,
                passed: false,
            }])
        } else {
            result
        }
    }

    #[test]
    fn single_auction_highest_bidder_wins_and_pays() {
        let game = new_test_game(1);
        let mut handler = BiddingPhaseHandler::new(true);

        let result = skip_peek(&mut handler, handler.initialize(game));
        assert!(!result.phase_complete);
        let request = &result.pending_requests[0];
        let opener = request.faction_id;

        // Opener bids 3, then passes to a second faction who outbids, then
        // everyone else passes so the second faction wins.
        let step1 = handler.process_step(result.state, vec![bid_response(opener, 3)]);
        let next_candidate = step1.pending_requests[0].faction_id;
        assert_ne!(next_candidate, opener);

        let step2 = handler.process_step(step1.state, vec![bid_response(next_candidate, 5)]);

        // Every remaining faction passes in turn until only the high bidder
        // is active, which resolves the auction.
        let mut step = step2;
        while !step.phase_complete {
            let candidate = step.pending_requests[0].faction_id;
            step = handler.process_step(step.state, vec![AgentResponse::pass(candidate)]);
        }
        let result = step;

        assert!(result.phase_complete);
        assert_eq!(result.next_phase, Some(GamePhase::Revival));
        assert_eq!(result.state.faction(next_candidate).spice, oracle::factions::starting_spice(next_candidate) - 5);
        assert_eq!(result.state.faction(next_candidate).hand.len(), 1);
    }

    #[test]
    fn no_eligible_bidders_completes_phase_without_dealing() {
        let mut game = new_test_game(1);
        for faction in seated_factions() {
            game.faction_mut(faction).spice = 0;
        }
        let mut handler = BiddingPhaseHandler::new(true);
        let result = skip_peek(&mut handler, handler.initialize(game));

        assert!(result.phase_complete);
        assert_eq!(result.next_phase, Some(GamePhase::Revival));
        assert_eq!(result.state.treachery_deck.len(), 1);
    }

    #[test]
    fn bought_in_returns_card_to_deck_when_everyone_passes() {
        let game = new_test_game(1);
        let mut handler = BiddingPhaseHandler::new(true);
        let mut step = skip_peek(&mut handler, handler.initialize(game));

        while !step.phase_complete {
            let candidate = step.pending_requests[0].faction_id;
            step = handler.process_step(step.state, vec![AgentResponse::pass(candidate)]);
        }

        assert!(step.phase_complete);
        assert_eq!(step.next_phase, Some(GamePhase::Revival));
        assert_eq!(step.state.treachery_deck.len(), 1);
        for faction in seated_factions() {
            assert!(step.state.faction(faction).hand.is_empty());
        }
    }

    #[test]
    fn karama_free_card_short_circuits_bidding_without_payment() {
        let mut game = new_test_game(1);
        let opener_spice_before: BTreeMap<FactionId, u32> =
            seated_factions().iter().map(|&f| (f, game.faction(f).spice)).collect();
        for faction in seated_factions() {
            game.faction_mut(faction).karama_flags.insert(
                data::factions::faction_state::KaramaFlag::FreeCardActive,
            );
        }
        let mut handler = BiddingPhaseHandler::new(true);
        let result = skip_peek(&mut handler, handler.initialize(game));

        assert!(result.phase_complete);
        let winner = result
            .state
            .configuration
            .seated_factions
            .iter()
            .copied()
            .find(|&f| result.state.faction(f).hand.len() == 1)
            .expect("someone must have won the free card");
        assert_eq!(result.state.faction(winner).spice, opener_spice_before[&winner]);
    }

    #[test]
    fn no_cards_dealt_completes_phase_immediately() {
        let game = new_test_game(0);
        let mut handler = BiddingPhaseHandler::new(true);
        let result = handler.initialize(game);
        assert!(result.phase_complete);
        assert_eq!(result.next_phase, Some(GamePhase::Revival));
    }

    #[test]
    fn atreides_peek_request_issued_before_first_bid() {
        let game = new_test_game(1);
        let mut handler = BiddingPhaseHandler::new(true);
        let result = handler.initialize(game);
        assert!(!result.phase_complete);
        assert_eq!(result.pending_requests[0].faction_id, FactionId::Atreides);
        assert!(matches!(result.pending_requests[0].kind, RequestKind::PeekCard(_)));
    }

    #[test]
    fn cleanup_clears_karama_flags_and_resets_context() {
        let mut game = new_test_game(0);
        game.faction_mut(FactionId::Atreides).karama_flags.insert(
            data::factions::faction_state::KaramaFlag::BiddingActive,
        );
        let mut handler = BiddingPhaseHandler::new(true);
        let state = handler.cleanup(game);
        assert!(!state.faction(FactionId::Atreides).karama_bidding_active());
    }
}
