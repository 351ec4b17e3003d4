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

use data::game_state::{GamePhase, GameState};
use data::phase_step_result::PhaseStepResult;
use data::requests::AgentResponse;

/// The pausable request/response protocol every phase handler implements
/// (spec.md §4.1): `initialize` once, `processStep` repeatedly until
/// `phase_complete`, then `cleanup` exactly once.
///
/// A handler never panics on malformed agent input -- invalid responses
/// become events, not [utils::outcome::StopCondition::Error]s. The only
/// failures a handler surfaces are the two cases `utils::outcome` models:
/// a forced no-progress abort, or a genuine state-invariant violation.
pub trait PhaseHandler {
    /// The phase this handler is responsible for driving.
    fn phase(&self) -> GamePhase;

    /// Called once when the phase begins. Resets phase-local context,
    /// emits `PHASE_STARTED` (the caller also does this; handlers emit
    /// their own pre-phase declarations such as `HAND_SIZE_DECLARED`), and
    /// either completes immediately (an empty phase) or returns the first
    /// round of pending requests.
    fn initialize(&mut self, state: GameState) -> PhaseStepResult;

    /// Drives one advancement given the prior step's responses. Every
    /// `AgentRequest` from the previous step must have exactly one matching
    /// response unless that step set `simultaneous_requests`, in which case
    /// all requests are answered together before this call.
    fn process_step(&mut self, state: GameState, responses: Vec<AgentResponse>) -> PhaseStepResult;

    /// Final purification once `phase_complete` is observed: clears
    /// transient per-faction flags, removes empty force stacks, reconciles
    /// any side-effect state. Returns the purified state directly since
    /// there are no more pending requests to report.
    fn cleanup(&mut self, state: GameState) -> GameState;
}
