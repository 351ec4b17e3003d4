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

use data::events::PhaseEvent;

/// Consumes the append-only [PhaseEvent] stream a [crate::PhaseManager] run
/// produces (spec.md §4.5, C6). Disk logging and UI rendering are both out
/// of scope here; this trait is the seam a caller hangs either of those off
/// of.
pub trait EventSink {
    fn record(&mut self, event: &PhaseEvent);
}

/// Default sink: logs every event at `debug` via `tracing`, matching the
/// teacher's own `#[instrument]`-and-`tracing::debug!` idiom rather than
/// printing to stdout directly.
#[derive(Debug, Default)]
pub struct TracingEventSink;

impl EventSink for TracingEventSink {
    fn record(&mut self, event: &PhaseEvent) {
        tracing::debug!(message = %event.message, data = ?event.data, "phase event");
    }
}

/// Collects every event in order, for tests and the harness crate.
#[derive(Debug, Default)]
pub struct RecordingEventSink {
    pub events: Vec<PhaseEvent>,
}

impl EventSink for RecordingEventSink {
    fn record(&mut self, event: &PhaseEvent) {
        self.events.push(event.clone());
    }
}
