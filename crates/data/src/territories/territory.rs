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

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::core::ids::{SectorId, TerritoryId};

/// The kind of territory, per spec.md §3. `STRONGHOLD` territories cap
/// non-owning occupancy at two other factions (glossary: Stronghold);
/// `POLAR_SINK` is exempt from the alliance-stacking rule and from storm.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum TerritoryType {
    Sand,
    Stronghold,
    PolarSink,
    Rock,
    Basin,
}

/// Static board-geography record, read-only at runtime. Populated by
/// `oracle::territories::TERRITORY_DEFINITIONS`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Territory {
    pub id: TerritoryId,
    pub name: &'static str,
    pub territory_type: TerritoryType,
    pub sectors: BTreeSet<SectorId>,
    pub adjacent_territories: BTreeSet<TerritoryId>,
}

impl Territory {
    pub fn is_stronghold(&self) -> bool {
        self.territory_type == TerritoryType::Stronghold
    }

    pub fn is_polar_sink(&self) -> bool {
        self.territory_type == TerritoryType::PolarSink
    }
}
