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

pub mod mutations;
pub mod predicates;
pub mod queries;

#[cfg(test)]
mod tests {
    use data::core::ids::FactionId;

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

    fn new_test_game() -> data::game_state::GameState {
        use std::collections::{BTreeMap, BTreeSet};

        use data::cards::registry::CardRegistry;
        use data::core::ids::SectorId;
        use data::factions::faction_state::FactionState;
        use data::game_state::{ActionLog, GameConfiguration, GamePhase, GameState};
        use rand::SeedableRng;
        use rand_xoshiro::Xoshiro256StarStar;

        let seated = seated_factions();
        let mut factions = BTreeMap::new();
        for &faction in &seated {
            factions.insert(faction, FactionState::new(faction, oracle::factions::starting_spice(faction)));
        }

        GameState {
            turn: 1,
            phase: GamePhase::Bidding,
            storm_sector: SectorId::new(0),
            storm_order: seated.clone(),
            factions,
            cards: CardRegistry::default(),
            treachery_deck: Vec::new(),
            treachery_discard: Vec::new(),
            spice_deck_a: Vec::new(),
            spice_deck_b: Vec::new(),
            spice_discard: Vec::new(),
            alliances: BTreeSet::new(),
            territory_spice: BTreeMap::new(),
            tanks: BTreeMap::new(),
            configuration: GameConfiguration { advanced_rules: true, seated_factions: seated },
            action_log: ActionLog::default(),
            rng: Xoshiro256StarStar::seed_from_u64(1),
        }
    }

    #[test]
    fn eligible_bidders_excludes_empty_spice_without_karama() {
        let mut game = new_test_game();
        game.faction_mut(FactionId::Fremen).spice = 0;
        let eligible = queries::bidding::eligible_bidders(&game);
        assert!(!eligible.contains(&FactionId::Fremen));
        assert!(eligible.contains(&FactionId::Atreides));
    }

    #[test]
    fn validate_bid_rejects_self_outbid() {
        let game = new_test_game();
        let mut context = data::contexts::bidding_context::BiddingContext::default();
        context.current_bid = 3;
        context.high_bidder = Some(FactionId::Atreides);
        let result = predicates::bidding::validate_bid(&game, &context, FactionId::Atreides, 5);
        assert!(!result.is_valid());
        assert_eq!(
            result.first_error().unwrap().code,
            predicates::errors::RuleErrorCode::SelfOutbid
        );
    }

    #[test]
    fn validate_bid_rejects_opening_bid_of_zero() {
        let game = new_test_game();
        let context = data::contexts::bidding_context::BiddingContext::default();
        let result = predicates::bidding::validate_bid(&game, &context, FactionId::Atreides, 0);
        assert!(!result.is_valid());
    }

    #[test]
    fn shipment_cost_halves_for_guild() {
        assert_eq!(predicates::eligibility::shipment_cost(FactionId::Atreides, 3, false), 30);
        assert_eq!(predicates::eligibility::shipment_cost(FactionId::SpacingGuild, 3, false), 15);
        // odd totals round up
        assert_eq!(predicates::eligibility::shipment_cost(FactionId::SpacingGuild, 1, true), 1);
    }

    #[test]
    fn move_forces_prunes_empty_source_stack() {
        let mut game = new_test_game();
        let arrakeen = data::core::ids::TerritoryId("arrakeen");
        let carthag = data::core::ids::TerritoryId("carthag");
        let sector = data::core::ids::SectorId::new(9);
        game.faction_mut(FactionId::Atreides).forces.stack_mut(arrakeen, sector).regular = 3;

        mutations::forces::move_forces(
            &mut game,
            FactionId::Atreides,
            arrakeen,
            sector,
            carthag,
            sector,
            3,
            0,
        )
        .unwrap();

        assert_eq!(
            game.faction(FactionId::Atreides).forces.stack_at(arrakeen, sector).regular,
            0
        );
        assert!(!game
            .faction(FactionId::Atreides)
            .forces
            .on_board
            .contains_key(&(arrakeen, sector)));
        assert_eq!(
            game.faction(FactionId::Atreides).forces.stack_at(carthag, sector).regular,
            3
        );
    }
}
