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

use color_eyre::Report;

/// Possible reasons why a phase handler should halt instead of returning a
/// normal [PhaseStepResult](../../engine/struct.PhaseStepResult.html).
///
/// Per spec.md §7, rule violations by agents are *not* represented here --
/// they become events and the handler keeps going. Only the two cases that
/// genuinely cannot be represented as "new pending requests" are modeled:
/// a no-progress loop being forced to a safe successor, and a state
/// invariant violation, which is a programmer error rather than a game
/// error.
#[derive(Debug)]
#[must_use]
pub enum StopCondition {
    /// The handler produced no new pending requests and no events for
    /// [crate::outcome] consumers to act on; the engine is still waiting
    /// on agents that have not yet responded.
    AwaitingAgents,

    /// §7.5: `MAX_ITERATIONS` was reached with no progress. The caller
    /// should force the phase to complete with the phase's default
    /// successor and emit `PHASE_ABORTED`.
    PhaseAborted,

    /// §7.4: a state invariant was violated (hand exceeds max, negative
    /// spice, a card owned by nobody while in `HAND` location, ...). This
    /// is fatal -- the engine refuses to continue.
    Error(Report),
}

/// Represents the result of some game mutation.
///
/// Mirrors the teacher's "outcome" wrapper around [Result]: most mutation
/// helpers only need to signal success or a fatal [StopCondition], so they
/// return this rather than threading an explicit value through.
pub type Outcome = Result<(), StopCondition>;

/// Equivalent alias to [Outcome] which wraps a returned value.
pub type Value<T> = Result<T, StopCondition>;

/// Mutation completed successfully, execution can continue.
pub const OK: Outcome = Ok(());
