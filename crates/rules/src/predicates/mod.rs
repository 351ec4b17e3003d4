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

//! Stateless rule predicates (spec.md §4.4): pure functions from
//! `&GameState` (plus phase context) to a [errors::ValidationResult]. None
//! of these mutate state; phase handlers call a predicate first and only
//! call into `crate::mutations` once it passes.

pub mod bidding;
pub mod eligibility;
pub mod errors;
pub mod movement;
