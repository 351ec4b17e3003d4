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

pub mod config;
pub mod event_sink;
pub mod phase_handler;
pub mod phase_manager;

pub use config::EngineConfig;
pub use event_sink::{EventSink, RecordingEventSink, TracingEventSink};
pub use phase_handler::PhaseHandler;
pub use phase_manager::PhaseManager;
