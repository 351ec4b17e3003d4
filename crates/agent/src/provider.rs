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

use data::requests::{AgentRequest, AgentResponse};

/// Adapter from a batch of pending [AgentRequest]s to their [AgentResponse]s
/// (spec.md §4.1, C7). Implementations might call out to an LLM, a human
/// UI, or (for tests) a preloaded script; the phase engine itself never
/// knows which.
///
/// When `simultaneous` is true, every request in `requests` must be
/// answered before returning (spec.md §4.1's "answered together"
/// precondition); when false, a provider may still choose to collect them
/// one at a time internally, but must return exactly one response per
/// request either way.
#[async_trait::async_trait]
pub trait AgentProvider: Send + Sync {
    async fn get_responses(
        &mut self,
        requests: &[AgentRequest],
        simultaneous: bool,
    ) -> Vec<AgentResponse>;
}
