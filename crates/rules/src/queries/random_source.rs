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

//! Seam between the deck-shuffling call sites and the concrete RNG stored
//! on [data::game_state::GameState]. Everything here calls through this
//! trait rather than `rand::seq::SliceRandom` directly.

use rand::seq::SliceRandom;

/// A source of Fisher-Yates shuffles over a mutable slice.
///
/// The production implementation (below) is for
/// [rand_xoshiro::Xoshiro256StarStar], the same RNG type `GameState::rng`
/// stores.
pub trait RandomSource {
    fn shuffle<T>(&mut self, items: &mut [T]);
}

impl RandomSource for rand_xoshiro::Xoshiro256StarStar {
    fn shuffle<T>(&mut self, items: &mut [T]) {
        items.shuffle(self);
    }
}
