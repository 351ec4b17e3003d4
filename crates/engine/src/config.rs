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

/// Options controlling the engine's behavior at the few points spec.md §9
/// leaves as open questions rather than settled rules. See DESIGN.md's
/// "Open Question decisions" for the reasoning behind each default.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Safety net against a handler that makes no progress (spec.md §7.5):
    /// the maximum number of consecutive `processStep` calls that may emit
    /// zero events before the manager force-completes the phase with
    /// `PHASE_ABORTED`. A step that emits at least one event resets the
    /// counter, so a long but actively-progressing phase (many auction
    /// cards, each bid or pass producing an event) never trips this.
    pub max_iterations: u32,

    /// BOUGHT-IN's returned cards go back to the top of the deck in the
    /// order they were dealt (`true`, the rulebook-literal reading) rather
    /// than being reshuffled (`false`).
    pub bought_in_preserves_order: bool,

    /// When `true`, a `MOVE_FORCES` response received during a faction's
    /// SHIP sub-step is rejected instead of being treated as "skip
    /// shipment, move immediately" (spec.md §9's lenient default).
    pub require_explicit_ship_pass: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_iterations: 20,
            bought_in_preserves_order: true,
            require_explicit_ship_pass: false,
        }
    }
}
