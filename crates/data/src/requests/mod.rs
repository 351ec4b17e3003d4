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

//! Typed request/response envelope for pausing a [PhaseHandler](../../engine/trait.PhaseHandler.html)
//! to solicit a decision from an external agent.
//!
//! Per spec.md §9's redesign hint ("enumerate request types and attach
//! per-type context structs for safety"), each [RequestKind] variant carries
//! its own context struct rather than an untyped payload bag, and each
//! [ResponseData] variant lines up with the request it answers.

mod bidding_requests;
mod shipment_requests;

pub use bidding_requests::*;
pub use shipment_requests::*;

use serde::{Deserialize, Serialize};

use crate::core::ids::FactionId;

/// One outstanding request addressed to a single faction's agent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentRequest {
    pub faction_id: FactionId,
    /// Human-readable prompt, for UI display.
    pub prompt: String,
    pub kind: RequestKind,
    /// Action labels the agent may choose among, minimized to what rule
    /// state allows (spec.md §3). Kept alongside `kind`'s strongly-typed
    /// context for UI consumers that only want a flat list of options.
    pub available_actions: Vec<String>,
}

/// The strongly typed body of an [AgentRequest].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum RequestKind {
    PeekCard(PeekCardContext),
    BidOrPass(BidOrPassContext),
    GuildTiming(GuildTimingContext),
    GuildActNowOrWait(GuildActNowOrWaitContext),
    Wartime(WartimeContext),
    Shipment(ShipmentRequestContext),
    Movement(MovementRequestContext),
    SendAdvisor(BgAdvisorContext),
    BgIntrusion(BgIntrusionContext),
    TakeUpArms(TakeUpArmsContext),
}

/// A faction's answer to an [AgentRequest].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentResponse {
    pub faction_id: FactionId,
    pub action: ResponseAction,
    /// True if this is (or was normalized to, per spec.md §4.2.2.C and
    /// §4.3.4) a pass/skip of the requested decision.
    pub passed: bool,
}

impl AgentResponse {
    pub fn pass(faction_id: FactionId) -> Self {
        Self { faction_id, action: ResponseAction::Pass, passed: true }
    }
}

/// The strongly typed body of an [AgentResponse]. One variant per possible
/// decision across both phase handlers; handlers only interpret the
/// variants relevant to the [RequestKind] they issued and treat anything
/// else as malformed (spec.md §7.2 -> treated as pass, logged).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ResponseAction {
    Pass,
    Acknowledge,
    Bid { amount: u32 },
    GuildTiming(crate::contexts::shipment_context::GuildTiming),
    GuildActNow(bool),
    WartimeFlip { territories: Vec<crate::core::ids::TerritoryId> },
    Shipment(ShipmentAction),
    Movement(MovementAction),
    SendAdvisor(bool),
    BgIntrusion(IntrusionChoice),
    TakeUpArms(bool),
}

/// Bene-Gesserit's choice in response to an INTRUSION request (rule
/// 2.02.16).
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
pub enum IntrusionChoice {
    FlipToFighters,
    RemainAsAdvisors,
}
