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

use crate::events::PhaseEvent;
use crate::game_state::{GamePhase, GameState};
use crate::requests::AgentRequest;

/// The result of one `initialize`/`processStep` call, per spec.md §3.
///
/// `state` is the new snapshot after this step's mutations. Either
/// `phase_complete` is true and `next_phase` names the successor phase, or
/// `pending_requests` names the next round of agent requests to collect
/// responses for.
#[derive(Debug, Clone)]
pub struct PhaseStepResult {
    pub state: GameState,
    pub phase_complete: bool,
    pub next_phase: Option<GamePhase>,
    pub pending_requests: Vec<AgentRequest>,
    /// If true, every request in `pending_requests` must be answered
    /// together before the next `processStep` call; if false, requests are
    /// still answered in request order per faction (spec.md §4.1, §5).
    pub simultaneous_requests: bool,
    pub events: Vec<PhaseEvent>,
}

impl PhaseStepResult {
    pub fn awaiting(state: GameState, pending_requests: Vec<AgentRequest>) -> Self {
        Self {
            state,
            phase_complete: false,
            next_phase: None,
            pending_requests,
            simultaneous_requests: false,
            events: Vec::new(),
        }
    }

    pub fn awaiting_simultaneous(state: GameState, pending_requests: Vec<AgentRequest>) -> Self {
        Self { simultaneous_requests: true, ..Self::awaiting(state, pending_requests) }
    }

    pub fn complete(state: GameState, next_phase: GamePhase) -> Self {
        Self {
            state,
            phase_complete: true,
            next_phase: Some(next_phase),
            pending_requests: Vec::new(),
            simultaneous_requests: false,
            events: Vec::new(),
        }
    }

    pub fn with_events(mut self, events: Vec<PhaseEvent>) -> Self {
        self.events = events;
        self
    }

    pub fn push_event(&mut self, event: PhaseEvent) {
        self.events.push(event);
    }
}
