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

//! Concrete scenario constructors for the six end-to-end scenarios in
//! spec.md §8. Each returns a ready [GameState]; the corresponding
//! integration test in `tests/end_to_end.rs` scripts the agent responses
//! and drives it through a [engine::PhaseManager].

use data::cards::treachery_card::TreacheryCardType;
use data::core::ids::{CardDefinitionId, FactionId, SectorId, TerritoryId};
use data::game_state::{GamePhase, GameState};

use crate::builder::GameStateBuilder;

const LASGUN: CardDefinitionId = CardDefinitionId("lasgun");

/// Scenario 1: simple single-bidder auction. Atreides and Harkonnen, no
/// Emperor, 2-card deck.
pub fn simple_single_bidder_auction() -> GameState {
    GameStateBuilder::new()
        .seated_factions(vec![FactionId::Atreides, FactionId::Harkonnen])
        .storm_order(vec![FactionId::Atreides, FactionId::Harkonnen])
        .phase(GamePhase::Bidding)
        .spice(FactionId::Atreides, 15)
        .spice(FactionId::Harkonnen, 15)
        .deck_cards(2, LASGUN, TreacheryCardType::Weapon)
        .build()
}

/// Scenario 2: bidding war with Emperor payment. Atreides, Harkonnen,
/// Emperor; 1-card auction.
pub fn bidding_war_with_emperor_payment() -> GameState {
    GameStateBuilder::new()
        .seated_factions(vec![FactionId::Atreides, FactionId::Harkonnen, FactionId::Emperor])
        .storm_order(vec![FactionId::Atreides, FactionId::Harkonnen, FactionId::Emperor])
        .phase(GamePhase::Bidding)
        .spice(FactionId::Atreides, 15)
        .spice(FactionId::Harkonnen, 15)
        .spice(FactionId::Emperor, 10)
        .deck_cards(1, LASGUN, TreacheryCardType::Weapon)
        .build()
}

/// Scenario 3: BOUGHT-IN. Three factions, 1 spice each, 3-card auction, no
/// Karama.
pub fn bought_in() -> GameState {
    GameStateBuilder::new()
        .seated_factions(vec![FactionId::Atreides, FactionId::Harkonnen, FactionId::Emperor])
        .storm_order(vec![FactionId::Atreides, FactionId::Harkonnen, FactionId::Emperor])
        .phase(GamePhase::Bidding)
        .spice(FactionId::Atreides, 1)
        .spice(FactionId::Harkonnen, 1)
        .spice(FactionId::Emperor, 1)
        .deck_cards(3, LASGUN, TreacheryCardType::Weapon)
        .build()
}

/// Scenario 4: Harkonnen TOP CARD at the hand-size boundary. Harkonnen
/// alone, hand pre-filled to `hand_before`, a 2-card deck (one auctioned,
/// one left for the free draw).
pub fn harkonnen_top_card(hand_before: usize) -> GameState {
    let mut builder = GameStateBuilder::new()
        .seated_factions(vec![FactionId::Harkonnen])
        .storm_order(vec![FactionId::Harkonnen])
        .phase(GamePhase::Bidding)
        .spice(FactionId::Harkonnen, 50)
        .deck_cards(2, LASGUN, TreacheryCardType::Weapon);
    for _ in 0..hand_before {
        builder = builder.hand_card(FactionId::Harkonnen, LASGUN, TreacheryCardType::Weapon);
    }
    builder.build()
}

/// Scenario 5: Guild HOLDING PATTERN. Three non-Guild factions plus the
/// Guild, none of Fremen/Bene Gesserit seated (so no reactive sub-quests
/// muddy the ordering assertion).
pub fn guild_holding_pattern() -> GameState {
    GameStateBuilder::new()
        .seated_factions(vec![
            FactionId::Atreides,
            FactionId::Harkonnen,
            FactionId::Emperor,
            FactionId::SpacingGuild,
        ])
        .storm_order(vec![
            FactionId::Atreides,
            FactionId::Harkonnen,
            FactionId::Emperor,
            FactionId::SpacingGuild,
        ])
        .phase(GamePhase::ShipmentMovement)
        .advanced_rules(false)
        .reserves(FactionId::Atreides, 10, 0)
        .reserves(FactionId::Harkonnen, 10, 0)
        .reserves(FactionId::Emperor, 10, 0)
        .reserves(FactionId::SpacingGuild, 10, 0)
        .spice(FactionId::Atreides, 50)
        .spice(FactionId::Harkonnen, 50)
        .spice(FactionId::Emperor, 50)
        .spice(FactionId::SpacingGuild, 50)
        .build()
}

/// Scenario 6: alliance stacking constraint. Atreides and Fremen allied;
/// Fremen already hold Sietch Tabr.
pub fn alliance_stacking() -> GameState {
    GameStateBuilder::new()
        .seated_factions(vec![FactionId::Atreides, FactionId::Fremen])
        .storm_order(vec![FactionId::Atreides, FactionId::Fremen])
        .phase(GamePhase::ShipmentMovement)
        .advanced_rules(false)
        .spice(FactionId::Atreides, 50)
        .spice(FactionId::Fremen, 50)
        .reserves(FactionId::Atreides, 10, 0)
        .reserves(FactionId::Fremen, 5, 0)
        .forces_at(FactionId::Fremen, TerritoryId("sietch_tabr"), SectorId::new(13), 5, 0, 0)
        .ally(FactionId::Atreides, FactionId::Fremen)
        .build()
}
