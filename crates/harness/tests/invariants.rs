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

//! Property-based tests for the universally quantified invariants P1-P9 of
//! spec.md §8, plus the round-trip/idempotence properties P8-P9.

use std::collections::BTreeSet;

use agent::ScriptedAgentProvider;
use bidding::BiddingPhaseHandler;
use data::cards::treachery_card::{CardLocation, TreacheryCardType};
use data::core::ids::{CardDefinitionId, FactionId, SectorId, TerritoryId};
use data::events::EventData;
use data::factions::faction_state::ForceStack;
use data::game_state::GamePhase;
use data::requests::{AgentResponse, ResponseAction};
use engine::{EngineConfig, PhaseHandler, PhaseManager, RecordingEventSink};
use harness::GameStateBuilder;
use proptest::prelude::*;
use rules::predicates::movement::validate_stronghold_occupancy;
use shipment::ShipmentMovementPhaseHandler;

const LASGUN: CardDefinitionId = CardDefinitionId("lasgun");

fn bid(faction: FactionId, amount: u32) -> AgentResponse {
    AgentResponse { faction_id: faction, action: ResponseAction::Bid { amount }, passed: false }
}

/// All card IDs currently reachable from `treachery_deck`, `treachery_discard`,
/// and every faction's hand -- the only three containers a `CardId` can live
/// in, per spec.md §3. Used by the P2 check below.
fn card_location_is_consistent(state: &data::game_state::GameState) -> bool {
    let mut seen = BTreeSet::new();
    for &id in &state.treachery_deck {
        if !seen.insert(id) {
            return false;
        }
        let card = state.cards.get(id);
        if card.location != CardLocation::Deck || card.owner_id.is_some() {
            return false;
        }
    }
    for &id in &state.treachery_discard {
        if !seen.insert(id) {
            return false;
        }
        let card = state.cards.get(id);
        if card.location != CardLocation::Discard || card.owner_id.is_some() {
            return false;
        }
    }
    for faction in state.factions.values() {
        for &id in &faction.hand {
            if !seen.insert(id) {
                return false;
            }
            let card = state.cards.get(id);
            if card.location != CardLocation::Hand || card.owner_id != Some(faction.id) {
                return false;
            }
        }
    }
    true
}

proptest! {
    /// P1 (no Emperor seated): a single-bidder auction pays into an
    /// untracked bank, so the two factions' combined spice must drop by
    /// exactly the winning bid, with every dollar of that drop leaving the
    /// faction pool (not redistributed to the loser). P3 and P2 are checked
    /// on the same run since they're cheap once the state is in hand.
    #[test]
    fn spice_conservation_without_emperor(
        atreides_spice in 5u32..40,
        harkonnen_spice in 5u32..40,
        winning_bid in 1u32..5,
    ) {
        let winning_bid = winning_bid.min(atreides_spice).max(1);
        let game = GameStateBuilder::new()
            .seated_factions(vec![FactionId::Atreides, FactionId::Harkonnen])
            .storm_order(vec![FactionId::Atreides, FactionId::Harkonnen])
            .phase(GamePhase::Bidding)
            .spice(FactionId::Atreides, atreides_spice)
            .spice(FactionId::Harkonnen, harkonnen_spice)
            .deck_cards(1, LASGUN, TreacheryCardType::Weapon)
            .build();

        let total_before = atreides_spice + harkonnen_spice;

        let mut provider = ScriptedAgentProvider::new();
        provider
            .push(FactionId::Atreides, bid(FactionId::Atreides, winning_bid))
            .push(FactionId::Harkonnen, AgentResponse::pass(FactionId::Harkonnen));

        let mut sink = RecordingEventSink::default();
        let config = EngineConfig::default();
        let mut handler = BiddingPhaseHandler::from_config(&config);
        let mut manager = PhaseManager::new(config, &mut provider, &mut sink);
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let result = runtime.block_on(manager.run_to_completion(&mut handler, game));
        let (state, _) = result.expect("bidding phase should complete cleanly");

        let total_after = state.faction(FactionId::Atreides).spice + state.faction(FactionId::Harkonnen).spice;
        prop_assert_eq!(total_before - total_after, winning_bid);
        prop_assert!(state.faction(FactionId::Atreides).hand.len() <= oracle::factions::max_hand(FactionId::Atreides));
        prop_assert!(card_location_is_consistent(&state));
    }

    /// P1, BOUGHT-IN case: nobody can afford the minimum bid, so every
    /// card returns to the deck and total spice is unchanged.
    #[test]
    fn spice_conservation_bought_in(spice_each in 0u32..1) {
        let game = GameStateBuilder::new()
            .seated_factions(vec![FactionId::Atreides, FactionId::Harkonnen, FactionId::Emperor])
            .storm_order(vec![FactionId::Atreides, FactionId::Harkonnen, FactionId::Emperor])
            .phase(GamePhase::Bidding)
            .spice(FactionId::Atreides, spice_each)
            .spice(FactionId::Harkonnen, spice_each)
            .spice(FactionId::Emperor, spice_each)
            .deck_cards(2, LASGUN, TreacheryCardType::Weapon)
            .build();

        let total_before: u32 = game.factions.values().map(|f| f.spice).sum();

        let mut provider = ScriptedAgentProvider::new();
        provider
            .push(FactionId::Atreides, AgentResponse::pass(FactionId::Atreides))
            .push(FactionId::Harkonnen, AgentResponse::pass(FactionId::Harkonnen))
            .push(FactionId::Emperor, AgentResponse::pass(FactionId::Emperor))
            .push(FactionId::Atreides, AgentResponse::pass(FactionId::Atreides))
            .push(FactionId::Harkonnen, AgentResponse::pass(FactionId::Harkonnen))
            .push(FactionId::Emperor, AgentResponse::pass(FactionId::Emperor));

        let mut sink = RecordingEventSink::default();
        let config = EngineConfig::default();
        let mut handler = BiddingPhaseHandler::from_config(&config);
        let mut manager = PhaseManager::new(config, &mut provider, &mut sink);
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let result = runtime.block_on(manager.run_to_completion(&mut handler, game));
        let (state, _) = result.expect("bidding phase should complete cleanly");

        let total_after: u32 = state.factions.values().map(|f| f.spice).sum();
        prop_assert_eq!(total_before, total_after);
        prop_assert_eq!(state.treachery_deck.len(), 2);
        prop_assert!(card_location_is_consistent(&state));
    }

    /// P5: `validate_stronghold_occupancy` must reject a third distinct,
    /// unallied faction and accept everything at or below the cap.
    #[test]
    fn stronghold_occupancy_cap_matches_distinct_unallied_count(
        distinct_occupants in 0usize..3,
    ) {
        let all = [FactionId::Harkonnen, FactionId::Emperor, FactionId::Fremen];
        let mut builder = GameStateBuilder::new()
            .seated_factions(vec![FactionId::Atreides, FactionId::Harkonnen, FactionId::Emperor, FactionId::Fremen])
            .phase(GamePhase::ShipmentMovement);
        for &faction in all.iter().take(distinct_occupants) {
            builder = builder.forces_at(faction, TerritoryId("carthag"), SectorId::new(2), 1, 0, 0);
        }
        let game = builder.build();

        let result = validate_stronghold_occupancy(&game, TerritoryId("carthag"), FactionId::Atreides);
        prop_assert_eq!(result.is_valid(), distinct_occupants < 2);
    }

    /// P4: after a full ship+move turn, an ally shipping into a stronghold
    /// already held by its partner ends up with zero forces there -- the
    /// alliance-stacking constraint sends the newcomer to the tanks instead
    /// of leaving two allied stacks in the same non-Polar-Sink territory.
    #[test]
    fn alliance_stacking_leaves_no_co_occupancy(incoming_regular in 1u32..10) {
        let game = GameStateBuilder::new()
            .seated_factions(vec![FactionId::Atreides, FactionId::Fremen])
            .storm_order(vec![FactionId::Atreides, FactionId::Fremen])
            .phase(GamePhase::ShipmentMovement)
            .advanced_rules(false)
            .spice(FactionId::Atreides, 100)
            .spice(FactionId::Fremen, 100)
            .reserves(FactionId::Atreides, incoming_regular, 0)
            .reserves(FactionId::Fremen, 5, 0)
            .forces_at(FactionId::Fremen, TerritoryId("sietch_tabr"), SectorId::new(13), 5, 0, 0)
            .ally(FactionId::Atreides, FactionId::Fremen)
            .build();

        let ship = data::requests::ShipmentAction::ShipForces {
            territory: TerritoryId("sietch_tabr"),
            sector: SectorId::new(13),
            regular: incoming_regular,
            elite: 0,
            cost: incoming_regular * 10,
        };
        let mut provider = ScriptedAgentProvider::new();
        provider
            .push(
                FactionId::Atreides,
                AgentResponse { faction_id: FactionId::Atreides, action: ResponseAction::Shipment(ship), passed: false },
            )
            .push(FactionId::Atreides, AgentResponse::pass(FactionId::Atreides))
            .push(FactionId::Fremen, AgentResponse::pass(FactionId::Fremen))
            .push(FactionId::Fremen, AgentResponse::pass(FactionId::Fremen));

        let mut sink = RecordingEventSink::default();
        let config = EngineConfig::default();
        let mut handler = ShipmentMovementPhaseHandler::from_config(&config);
        let mut manager = PhaseManager::new(config, &mut provider, &mut sink);
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let result = runtime.block_on(manager.run_to_completion(&mut handler, game));
        let (state, _) = result.expect("shipment/movement phase should complete cleanly");

        let atreides_has_forces = state
            .faction(FactionId::Atreides)
            .forces
            .occupied_territories()
            .any(|t| t == TerritoryId("sietch_tabr"));
        let fremen_has_forces =
            state.faction(FactionId::Fremen).forces.occupied_territories().any(|t| t == TerritoryId("sietch_tabr"));
        prop_assert!(!(atreides_has_forces && fremen_has_forces));
        prop_assert!(fremen_has_forces);
    }
}

/// P6: once a faction's `BidPassed` event is recorded for an auction, no
/// later `BidPlaced` for that same faction appears before the auction
/// resolves (`CardWon`/`CardBoughtIn`) -- i.e. `high_bidder` is never a
/// passed faction.
#[tokio::test]
async fn passed_factions_never_bid_again_within_an_auction() {
    let game = GameStateBuilder::new()
        .seated_factions(vec![FactionId::Atreides, FactionId::Harkonnen, FactionId::Emperor])
        .storm_order(vec![FactionId::Atreides, FactionId::Harkonnen, FactionId::Emperor])
        .phase(GamePhase::Bidding)
        .spice(FactionId::Atreides, 15)
        .spice(FactionId::Harkonnen, 15)
        .spice(FactionId::Emperor, 10)
        .deck_cards(1, LASGUN, TreacheryCardType::Weapon)
        .build();

    let mut provider = ScriptedAgentProvider::new();
    provider
        .push(FactionId::Atreides, bid(FactionId::Atreides, 1))
        .push(FactionId::Harkonnen, bid(FactionId::Harkonnen, 2))
        .push(FactionId::Atreides, bid(FactionId::Atreides, 3))
        .push(FactionId::Harkonnen, bid(FactionId::Harkonnen, 4))
        .push(FactionId::Atreides, AgentResponse::pass(FactionId::Atreides));

    let mut sink = RecordingEventSink::default();
    let config = EngineConfig::default();
    let mut handler = BiddingPhaseHandler::from_config(&config);
    let mut manager = PhaseManager::new(config, &mut provider, &mut sink);
    manager.run_to_completion(&mut handler, game).await.expect("bidding phase should complete cleanly");

    let mut passed: BTreeSet<FactionId> = BTreeSet::new();
    for event in &sink.events {
        match &event.data {
            EventData::BidPassed { faction, .. } => {
                passed.insert(*faction);
            }
            EventData::BidPlaced { faction, .. } => {
                assert!(!passed.contains(faction), "{faction:?} bid again after passing");
            }
            EventData::CardWon { .. } | EventData::CardBoughtIn { .. } => passed.clear(),
            _ => {}
        }
    }
}

/// P8: calling `cleanup` a second time on an already-cleaned state changes
/// nothing observable.
#[test]
fn cleanup_is_idempotent() {
    let game = GameStateBuilder::new()
        .seated_factions(vec![FactionId::Atreides, FactionId::Fremen])
        .phase(GamePhase::ShipmentMovement)
        .forces_at(FactionId::Atreides, TerritoryId("carthag"), SectorId::new(2), 0, 0, 0)
        .build();

    let mut handler = ShipmentMovementPhaseHandler::new(false);
    let once = handler.cleanup(game.clone());
    let twice = handler.cleanup(once.clone());

    assert_eq!(once.turn, twice.turn);
    assert_eq!(once.phase, twice.phase);
    for faction in once.factions.keys() {
        let a = &once.factions[faction];
        let b = &twice.factions[faction];
        assert_eq!(a.spice, b.spice);
        assert_eq!(a.hand, b.hand);
        let empty = ForceStack::default();
        for ((territory, sector), stack) in &a.forces.on_board {
            assert_eq!(*stack, b.forces.on_board.get(&(*territory, *sector)).copied().unwrap_or(empty));
        }
    }
}

/// P9: `process_step` with an empty response list and no pending requests
/// does nothing -- no events, and the returned state matches the input in
/// every observable field.
#[test]
fn empty_step_with_no_pending_requests_is_a_no_op() {
    let game = GameStateBuilder::new()
        .seated_factions(vec![FactionId::Atreides, FactionId::Harkonnen])
        .storm_order(vec![FactionId::Atreides, FactionId::Harkonnen])
        .phase(GamePhase::Bidding)
        .spice(FactionId::Atreides, 15)
        .spice(FactionId::Harkonnen, 15)
        .build();

    let mut handler = BiddingPhaseHandler::new(true);
    let initial = handler.initialize(game.clone());
    assert!(initial.phase_complete, "an empty deck completes immediately with no pending requests");

    let result = handler.process_step(initial.state.clone(), Vec::new());
    assert!(result.events.is_empty());
    assert_eq!(result.state.treachery_deck.len(), initial.state.treachery_deck.len());
    for faction in result.state.factions.keys() {
        assert_eq!(result.state.factions[faction].spice, initial.state.factions[faction].spice);
    }
}
