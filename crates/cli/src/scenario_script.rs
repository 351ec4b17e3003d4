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

//! Scripted agent responses matching each `harness::scenarios` constructor,
//! the same sequences `harness`'s own end-to-end tests drive against.

use agent::ScriptedAgentProvider;
use data::contexts::shipment_context::GuildTiming;
use data::core::ids::{FactionId, SectorId, TerritoryId};
use data::requests::{AgentResponse, ResponseAction, ShipmentAction};

fn ack(faction: FactionId) -> AgentResponse {
    AgentResponse { faction_id: faction, action: ResponseAction::Acknowledge, passed: false }
}

fn bid(faction: FactionId, amount: u32) -> AgentResponse {
    AgentResponse { faction_id: faction, action: ResponseAction::Bid { amount }, passed: false }
}

pub fn simple_auction_script() -> ScriptedAgentProvider {
    let mut provider = ScriptedAgentProvider::new();
    provider
        .push(FactionId::Atreides, ack(FactionId::Atreides))
        .push(FactionId::Atreides, bid(FactionId::Atreides, 1))
        .push(FactionId::Harkonnen, AgentResponse::pass(FactionId::Harkonnen))
        .push(FactionId::Atreides, ack(FactionId::Atreides))
        .push(FactionId::Harkonnen, bid(FactionId::Harkonnen, 1))
        .push(FactionId::Atreides, AgentResponse::pass(FactionId::Atreides));
    provider
}

pub fn bidding_war_script() -> ScriptedAgentProvider {
    let mut provider = ScriptedAgentProvider::new();
    provider
        .push(FactionId::Atreides, ack(FactionId::Atreides))
        .push(FactionId::Atreides, bid(FactionId::Atreides, 1))
        .push(FactionId::Harkonnen, bid(FactionId::Harkonnen, 2))
        .push(FactionId::Atreides, bid(FactionId::Atreides, 3))
        .push(FactionId::Harkonnen, bid(FactionId::Harkonnen, 4))
        .push(FactionId::Atreides, AgentResponse::pass(FactionId::Atreides));
    provider
}

pub fn bought_in_script() -> ScriptedAgentProvider {
    let mut provider = ScriptedAgentProvider::new();
    provider
        .push(FactionId::Atreides, AgentResponse::pass(FactionId::Atreides))
        .push(FactionId::Harkonnen, AgentResponse::pass(FactionId::Harkonnen))
        .push(FactionId::Emperor, AgentResponse::pass(FactionId::Emperor));
    provider
}

pub fn harkonnen_top_card_script() -> ScriptedAgentProvider {
    let mut provider = ScriptedAgentProvider::new();
    provider.push(FactionId::Harkonnen, bid(FactionId::Harkonnen, 1));
    provider
}

pub fn guild_holding_pattern_script() -> ScriptedAgentProvider {
    let mut provider = ScriptedAgentProvider::new();
    provider.push(
        FactionId::SpacingGuild,
        AgentResponse {
            faction_id: FactionId::SpacingGuild,
            action: ResponseAction::GuildTiming(GuildTiming::DelayToEnd),
            passed: false,
        },
    );
    for faction in [FactionId::Atreides, FactionId::Harkonnen, FactionId::Emperor] {
        provider.push(faction, AgentResponse::pass(faction)).push(faction, AgentResponse::pass(faction));
    }
    let ship = ShipmentAction::ShipForces {
        territory: TerritoryId("arrakeen"),
        sector: SectorId::new(9),
        regular: 2,
        elite: 0,
        cost: 10,
    };
    provider
        .push(
            FactionId::SpacingGuild,
            AgentResponse { faction_id: FactionId::SpacingGuild, action: ResponseAction::Shipment(ship), passed: false },
        )
        .push(FactionId::SpacingGuild, AgentResponse::pass(FactionId::SpacingGuild));
    provider
}

pub fn alliance_stacking_script() -> ScriptedAgentProvider {
    let mut provider = ScriptedAgentProvider::new();
    let ship = ShipmentAction::ShipForces {
        territory: TerritoryId("sietch_tabr"),
        sector: SectorId::new(13),
        regular: 3,
        elite: 0,
        cost: 30,
    };
    provider
        .push(
            FactionId::Atreides,
            AgentResponse { faction_id: FactionId::Atreides, action: ResponseAction::Shipment(ship), passed: false },
        )
        .push(FactionId::Atreides, AgentResponse::pass(FactionId::Atreides))
        .push(FactionId::Fremen, AgentResponse::pass(FactionId::Fremen))
        .push(FactionId::Fremen, AgentResponse::pass(FactionId::Fremen));
    provider
}
