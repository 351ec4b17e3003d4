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

use std::collections::{HashMap, VecDeque};

use data::core::ids::FactionId;
use data::requests::{AgentRequest, AgentResponse};

use crate::provider::AgentProvider;

/// A deterministic, preloaded response queue, one per faction, for tests
/// and scenario replay (spec.md §8, C8). Each call to `get_responses`
/// pops the next scripted response for every faction named in `requests`,
/// in request order; a faction with no script left falls back to passing,
/// logged via `tracing` so a test author notices an under-scripted
/// scenario rather than silently getting a pass.
#[derive(Debug, Default)]
pub struct ScriptedAgentProvider {
    scripts: HashMap<FactionId, VecDeque<AgentResponse>>,
}

impl ScriptedAgentProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues `response` to be returned the next time `faction` is asked.
    pub fn push(&mut self, faction: FactionId, response: AgentResponse) -> &mut Self {
        self.scripts.entry(faction).or_default().push_back(response);
        self
    }
}

#[async_trait::async_trait]
impl AgentProvider for ScriptedAgentProvider {
    async fn get_responses(
        &mut self,
        requests: &[AgentRequest],
        _simultaneous: bool,
    ) -> Vec<AgentResponse> {
        requests
            .iter()
            .map(|request| {
                self.scripts
                    .get_mut(&request.faction_id)
                    .and_then(VecDeque::pop_front)
                    .unwrap_or_else(|| {
                        tracing::warn!(
                            faction = ?request.faction_id,
                            "no scripted response queued, defaulting to pass"
                        );
                        AgentResponse::pass(request.faction_id)
                    })
            })
            .collect()
    }
}
