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

use agent::AgentProvider;
use data::events::{EventData, PhaseEvent};
use data::game_state::{GamePhase, GameState};
use utils::outcome::{StopCondition, Value};

use crate::config::EngineConfig;
use crate::event_sink::EventSink;
use crate::phase_handler::PhaseHandler;

/// Drives one [PhaseHandler] through `initialize`/`processStep*`/`cleanup`
/// to completion (spec.md §4.1's loop), against a live [AgentProvider] and
/// [EventSink].
pub struct PhaseManager<'a> {
    config: EngineConfig,
    agent_provider: &'a mut dyn AgentProvider,
    event_sink: &'a mut dyn EventSink,
}

impl<'a> PhaseManager<'a> {
    pub fn new(
        config: EngineConfig,
        agent_provider: &'a mut dyn AgentProvider,
        event_sink: &'a mut dyn EventSink,
    ) -> Self {
        Self { config, agent_provider, event_sink }
    }

    /// Runs `handler` from `state` to phase completion, returning the final
    /// state and the phase it should transition to next.
    pub async fn run_to_completion(
        &mut self,
        handler: &mut dyn PhaseHandler,
        state: GameState,
    ) -> Value<(GameState, GamePhase)> {
        let phase = handler.phase();
        self.emit(&PhaseEvent::new(
            EventData::PhaseStarted { phase },
            format!("{phase:?} phase started"),
        ));

        let mut result = handler.initialize(state);
        self.emit_all(std::mem::take(&mut result.events));

        let mut steps_without_progress = 0u32;
        loop {
            if result.phase_complete {
                let next_phase = result.next_phase.unwrap_or(phase);
                let state = handler.cleanup(result.state);
                return Ok((state, next_phase));
            }

            if steps_without_progress >= self.config.max_iterations {
                return self.force_abort(handler, result.state, phase);
            }

            let responses = self
                .agent_provider
                .get_responses(&result.pending_requests, result.simultaneous_requests)
                .await;

            result = handler.process_step(result.state, responses);
            let events = std::mem::take(&mut result.events);
            if events.is_empty() {
                steps_without_progress += 1;
            } else {
                steps_without_progress = 0;
            }
            self.emit_all(events);
        }
    }

    fn force_abort(
        &mut self,
        handler: &mut dyn PhaseHandler,
        state: GameState,
        phase: GamePhase,
    ) -> Value<(GameState, GamePhase)> {
        let next_phase = default_successor(phase);
        self.emit(&PhaseEvent::new(
            EventData::PhaseAborted { phase, next_phase },
            format!("{phase:?} aborted after {} steps with no new events, forcing {next_phase:?}", self.config.max_iterations),
        ));
        let state = handler.cleanup(state);
        Ok((state, next_phase))
    }

    fn emit(&mut self, event: &PhaseEvent) {
        self.event_sink.record(event);
    }

    fn emit_all(&mut self, events: Vec<PhaseEvent>) {
        for event in &events {
            self.emit(event);
        }
    }
}

/// The safe successor phase used when a handler is force-aborted, per
/// spec.md §7.5 ("prefer advancing to stalling"). Outside the two phases
/// this subsystem implements, any phase other than bidding and
/// shipment/movement simply advances to the next entry in the fixed game
/// cycle -- those phases are out of scope (spec.md §1) so only the two
/// concrete targets this subsystem cares about are meaningful here.
fn default_successor(phase: GamePhase) -> GamePhase {
    match phase {
        GamePhase::Bidding => GamePhase::Revival,
        GamePhase::ShipmentMovement => GamePhase::Battle,
        other => other,
    }
}

/// Converts a [StopCondition::Error] into the fatal branch of [Value]; used
/// by handlers that need to surface a genuine invariant violation rather
/// than an ordinary rejected response.
pub fn fatal<T>(message: impl Into<String>) -> Value<T> {
    Err(StopCondition::Error(color_eyre::eyre::eyre!(message.into())))
}
