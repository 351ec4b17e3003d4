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

//! Thin demonstration binary: picks one of the canned scenarios from the
//! `harness` crate, drives it through a real `PhaseManager` against a
//! `ScriptedAgentProvider`, and prints the event log. Not a playable game
//! client -- see spec.md §1's scope note -- just a harness for watching the
//! phase engine run end to end.

mod logging;
mod scenario_script;

use agent::ScriptedAgentProvider;
use bidding::BiddingPhaseHandler;
use clap::{Parser, ValueEnum};
use engine::{EngineConfig, PhaseManager, RecordingEventSink};
use shipment::ShipmentMovementPhaseHandler;
use tracing::info;
use utils::outcome::Outcome;

#[derive(Copy, Clone, Eq, PartialEq, ValueEnum)]
enum Scenario {
    SimpleAuction,
    BiddingWar,
    BoughtIn,
    HarkonnenTopCard,
    GuildHoldingPattern,
    AllianceStacking,
}

/// Runs one of the six scenarios from spec.md §8 to completion and prints
/// every event the phase manager emitted.
#[derive(Parser)]
#[clap(name = "phase-engine-demo")]
struct Cli {
    #[arg(value_enum)]
    scenario: Scenario,

    /// Maximum `processStep` calls before the phase is forced to abort.
    #[arg(long, default_value_t = 20)]
    max_iterations: u32,
}

#[tokio::main]
async fn main() -> Outcome {
    logging::initialize();
    let cli = Cli::parse();

    let config = EngineConfig { max_iterations: cli.max_iterations, ..EngineConfig::default() };
    let mut sink = RecordingEventSink::default();

    let (state, next_phase) = match cli.scenario {
        Scenario::SimpleAuction => {
            let game = harness::scenarios::simple_single_bidder_auction();
            let mut provider = scenario_script::simple_auction_script();
            let mut handler = BiddingPhaseHandler::from_config(&config);
            let mut manager = PhaseManager::new(config, &mut provider, &mut sink);
            manager.run_to_completion(&mut handler, game).await
        }
        Scenario::BiddingWar => {
            let game = harness::scenarios::bidding_war_with_emperor_payment();
            let mut provider = scenario_script::bidding_war_script();
            let mut handler = BiddingPhaseHandler::from_config(&config);
            let mut manager = PhaseManager::new(config, &mut provider, &mut sink);
            manager.run_to_completion(&mut handler, game).await
        }
        Scenario::BoughtIn => {
            let game = harness::scenarios::bought_in();
            let mut provider = scenario_script::bought_in_script();
            let mut handler = BiddingPhaseHandler::from_config(&config);
            let mut manager = PhaseManager::new(config, &mut provider, &mut sink);
            manager.run_to_completion(&mut handler, game).await
        }
        Scenario::HarkonnenTopCard => {
            let game = harness::scenarios::harkonnen_top_card(6);
            let mut provider = scenario_script::harkonnen_top_card_script();
            let mut handler = BiddingPhaseHandler::from_config(&config);
            let mut manager = PhaseManager::new(config, &mut provider, &mut sink);
            manager.run_to_completion(&mut handler, game).await
        }
        Scenario::GuildHoldingPattern => {
            let game = harness::scenarios::guild_holding_pattern();
            let mut provider = scenario_script::guild_holding_pattern_script();
            let mut handler = ShipmentMovementPhaseHandler::from_config(&config);
            let mut manager = PhaseManager::new(config, &mut provider, &mut sink);
            manager.run_to_completion(&mut handler, game).await
        }
        Scenario::AllianceStacking => {
            let game = harness::scenarios::alliance_stacking();
            let mut provider = scenario_script::alliance_stacking_script();
            let mut handler = ShipmentMovementPhaseHandler::from_config(&config);
            let mut manager = PhaseManager::new(config, &mut provider, &mut sink);
            manager.run_to_completion(&mut handler, game).await
        }
    }?;

    info!(?next_phase, turn = state.turn, "phase run complete");
    for event in &sink.events {
        println!("{}", event.message);
    }

    utils::outcome::OK
}
