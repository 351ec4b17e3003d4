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

//! Fluent [GameStateBuilder], the harness's equivalent of the teacher's
//! `server/src/new_game.rs` fresh-state constructor, generalized into a
//! builder so scenario tests only specify what differs from the defaults.

use std::collections::{BTreeMap, BTreeSet};

use data::cards::registry::CardRegistry;
use data::cards::treachery_card::{TreacheryCard, TreacheryCardType};
use data::core::ids::{CardDefinitionId, FactionId, SectorId, TerritoryId};
use data::factions::faction_state::{FactionState, ForceStack, ReserveCounts};
use data::game_state::{ActionLog, GameConfiguration, GamePhase, GameState};
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256StarStar;

/// Builds a [GameState] for scenario/property tests.
///
/// Defaults to all six factions seated, advanced rules on, storm at sector
/// 0, an empty deck, and starting spice/reserves from `oracle::factions`.
/// Every setter consumes and returns `self`, matching the small builder
/// pattern the rest of this workspace uses for context structs.
pub struct GameStateBuilder {
    seated_factions: Vec<FactionId>,
    phase: GamePhase,
    advanced_rules: bool,
    storm_sector: SectorId,
    storm_order: Option<Vec<FactionId>>,
    spice: BTreeMap<FactionId, u32>,
    reserves: BTreeMap<FactionId, ReserveCounts>,
    on_board: Vec<(FactionId, TerritoryId, SectorId, ForceStack)>,
    deck_cards: Vec<(CardDefinitionId, TreacheryCardType)>,
    hand_cards: Vec<(FactionId, CardDefinitionId, TreacheryCardType)>,
    alliances: Vec<(FactionId, FactionId)>,
    rng_seed: u64,
}

impl Default for GameStateBuilder {
    fn default() -> Self {
        Self {
            seated_factions: vec![
                FactionId::Atreides,
                FactionId::Harkonnen,
                FactionId::Emperor,
                FactionId::Fremen,
                FactionId::SpacingGuild,
                FactionId::BeneGesserit,
            ],
            phase: GamePhase::Bidding,
            advanced_rules: true,
            storm_sector: SectorId::new(0),
            storm_order: None,
            spice: BTreeMap::new(),
            reserves: BTreeMap::new(),
            on_board: Vec::new(),
            deck_cards: Vec::new(),
            hand_cards: Vec::new(),
            alliances: Vec::new(),
            rng_seed: 1,
        }
    }
}

impl GameStateBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seated_factions(mut self, factions: Vec<FactionId>) -> Self {
        self.seated_factions = factions;
        self
    }

    pub fn phase(mut self, phase: GamePhase) -> Self {
        self.phase = phase;
        self
    }

    pub fn advanced_rules(mut self, value: bool) -> Self {
        self.advanced_rules = value;
        self
    }

    pub fn storm_sector(mut self, sector: SectorId) -> Self {
        self.storm_sector = sector;
        self
    }

    pub fn storm_order(mut self, order: Vec<FactionId>) -> Self {
        self.storm_order = Some(order);
        self
    }

    pub fn spice(mut self, faction: FactionId, amount: u32) -> Self {
        self.spice.insert(faction, amount);
        self
    }

    pub fn reserves(mut self, faction: FactionId, regular: u32, elite: u32) -> Self {
        self.reserves.insert(faction, ReserveCounts { regular, elite });
        self
    }

    pub fn forces_at(
        mut self,
        faction: FactionId,
        territory: TerritoryId,
        sector: SectorId,
        regular: u32,
        elite: u32,
        advisors: u32,
    ) -> Self {
        self.on_board.push((faction, territory, sector, ForceStack { regular, elite, advisors }));
        self
    }

    /// Adds `count` copies of a card definition to the treachery deck, in
    /// the order they'll be dealt (last pushed is dealt first, since
    /// auctions `pop()` from the back).
    pub fn deck_cards(mut self, count: usize, id: CardDefinitionId, card_type: TreacheryCardType) -> Self {
        for _ in 0..count {
            self.deck_cards.push((id, card_type));
        }
        self
    }

    pub fn hand_card(mut self, faction: FactionId, id: CardDefinitionId, card_type: TreacheryCardType) -> Self {
        self.hand_cards.push((faction, id, card_type));
        self
    }

    pub fn ally(mut self, a: FactionId, b: FactionId) -> Self {
        self.alliances.push((a, b));
        self
    }

    pub fn rng_seed(mut self, seed: u64) -> Self {
        self.rng_seed = seed;
        self
    }

    pub fn build(self) -> GameState {
        let mut factions = BTreeMap::new();
        for &faction in &self.seated_factions {
            let starting_spice =
                self.spice.get(&faction).copied().unwrap_or_else(|| oracle::factions::starting_spice(faction));
            let mut state = FactionState::new(faction, starting_spice);
            state.forces.reserves = self
                .reserves
                .get(&faction)
                .copied()
                .unwrap_or_else(|| {
                    let (regular, elite) = oracle::factions::starting_forces(faction);
                    ReserveCounts { regular, elite }
                });
            factions.insert(faction, state);
        }

        let mut cards = CardRegistry::default();
        let mut treachery_deck = Vec::new();
        for (id, card_type) in &self.deck_cards {
            treachery_deck.push(cards.insert(TreacheryCard::in_deck(*id, *card_type)));
        }
        for (faction, id, card_type) in &self.hand_cards {
            let mut card = TreacheryCard::in_deck(*id, *card_type);
            card.move_to_hand(*faction);
            let card_id = cards.insert(card);
            factions.get_mut(faction).expect("hand card for an unseated faction").hand.push(card_id);
        }

        for (faction, territory, sector, stack) in &self.on_board {
            *factions
                .get_mut(faction)
                .expect("forces_at for an unseated faction")
                .forces
                .stack_mut(*territory, *sector) = *stack;
        }

        let alliances: BTreeSet<(FactionId, FactionId)> =
            self.alliances.iter().map(|&(a, b)| GameState::ally_pair(a, b)).collect();
        for &(a, b) in &self.alliances {
            factions.get_mut(&a).expect("ally for an unseated faction").ally_id = Some(b);
            factions.get_mut(&b).expect("ally for an unseated faction").ally_id = Some(a);
        }

        GameState {
            turn: 1,
            phase: self.phase,
            storm_sector: self.storm_sector,
            storm_order: self.storm_order.unwrap_or_else(|| self.seated_factions.clone()),
            factions,
            cards,
            treachery_deck,
            treachery_discard: Vec::new(),
            spice_deck_a: Vec::new(),
            spice_deck_b: Vec::new(),
            spice_discard: Vec::new(),
            alliances,
            territory_spice: BTreeMap::new(),
            tanks: BTreeMap::new(),
            configuration: GameConfiguration {
                advanced_rules: self.advanced_rules,
                seated_factions: self.seated_factions,
            },
            action_log: ActionLog::default(),
            rng: Xoshiro256StarStar::seed_from_u64(self.rng_seed),
        }
    }
}
