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

//! Read-only board-geography lookup table.
//!
//! Full Dune board geography (all ~40 territories) is out of scope per
//! spec.md §1 ("board geography tables ... consumed as read-only
//! lookups"); this is a representative subset sufficient to exercise every
//! rule predicate and scenario in spec.md §8 -- the strongholds, Polar Sink,
//! and enough connected sand territory to validate adjacency-based
//! movement and storm blocking.

use std::collections::BTreeSet;

use data::core::ids::{SectorId, TerritoryId};
use data::territories::territory::{Territory, TerritoryType};
use once_cell::sync::Lazy;

fn sectors(values: &[u8]) -> BTreeSet<SectorId> {
    values.iter().map(|&v| SectorId::new(v)).collect()
}

fn adjacent(values: &[&'static str]) -> BTreeSet<TerritoryId> {
    values.iter().map(|&v| TerritoryId(v)).collect()
}

/// All five strongholds, per the glossary definition.
pub static STRONGHOLD_TERRITORIES: Lazy<Vec<TerritoryId>> = Lazy::new(|| {
    vec![
        TerritoryId("arrakeen"),
        TerritoryId("carthag"),
        TerritoryId("sietch_tabr"),
        TerritoryId("habbanya_sietch"),
        TerritoryId("tuek_sietch"),
    ]
});

pub static TERRITORY_DEFINITIONS: Lazy<Vec<Territory>> = Lazy::new(|| {
    vec![
        Territory {
            id: TerritoryId("polar_sink"),
            name: "Polar Sink",
            territory_type: TerritoryType::PolarSink,
            sectors: sectors(&[0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15, 16, 17]),
            adjacent_territories: adjacent(&["arrakeen", "carthag", "the_great_flat"]),
        },
        Territory {
            id: TerritoryId("arrakeen"),
            name: "Arrakeen",
            territory_type: TerritoryType::Stronghold,
            sectors: sectors(&[9, 10]),
            adjacent_territories: adjacent(&["polar_sink", "imperial_basin", "tuek_sietch"]),
        },
        Territory {
            id: TerritoryId("carthag"),
            name: "Carthag",
            territory_type: TerritoryType::Stronghold,
            sectors: sectors(&[9, 10]),
            adjacent_territories: adjacent(&["polar_sink", "imperial_basin"]),
        },
        Territory {
            id: TerritoryId("sietch_tabr"),
            name: "Sietch Tabr",
            territory_type: TerritoryType::Stronghold,
            sectors: sectors(&[13]),
            adjacent_territories: adjacent(&["pasty_mesa", "south_mesa"]),
        },
        Territory {
            id: TerritoryId("habbanya_sietch"),
            name: "Habbanya Sietch",
            territory_type: TerritoryType::Stronghold,
            sectors: sectors(&[4, 5]),
            adjacent_territories: adjacent(&["habbanya_erg", "habbanya_ridge_flat"]),
        },
        Territory {
            id: TerritoryId("tuek_sietch"),
            name: "Tuek's Sietch",
            territory_type: TerritoryType::Stronghold,
            sectors: sectors(&[11]),
            adjacent_territories: adjacent(&["arrakeen", "the_minor_erg"]),
        },
        Territory {
            id: TerritoryId("imperial_basin"),
            name: "Imperial Basin",
            territory_type: TerritoryType::Basin,
            sectors: sectors(&[9, 10, 11]),
            adjacent_territories: adjacent(&["arrakeen", "carthag", "the_great_flat"]),
        },
        Territory {
            id: TerritoryId("the_great_flat"),
            name: "The Great Flat",
            territory_type: TerritoryType::Sand,
            sectors: sectors(&[11, 12]),
            adjacent_territories: adjacent(&["imperial_basin", "habbanya_erg"]),
        },
        Territory {
            id: TerritoryId("the_minor_erg"),
            name: "The Minor Erg",
            territory_type: TerritoryType::Sand,
            sectors: sectors(&[11, 12]),
            adjacent_territories: adjacent(&["tuek_sietch", "habbanya_erg"]),
        },
        Territory {
            id: TerritoryId("habbanya_erg"),
            name: "Habbanya Erg",
            territory_type: TerritoryType::Sand,
            sectors: sectors(&[4, 5, 6]),
            adjacent_territories: adjacent(&["habbanya_sietch", "the_great_flat", "the_minor_erg"]),
        },
        Territory {
            id: TerritoryId("habbanya_ridge_flat"),
            name: "Habbanya Ridge Flat",
            territory_type: TerritoryType::Rock,
            sectors: sectors(&[3, 4]),
            adjacent_territories: adjacent(&["habbanya_sietch"]),
        },
        Territory {
            id: TerritoryId("pasty_mesa"),
            name: "Pasty Mesa",
            territory_type: TerritoryType::Rock,
            sectors: sectors(&[13, 14]),
            adjacent_territories: adjacent(&["sietch_tabr", "south_mesa"]),
        },
        Territory {
            id: TerritoryId("south_mesa"),
            name: "South Mesa",
            territory_type: TerritoryType::Rock,
            sectors: sectors(&[14, 15]),
            adjacent_territories: adjacent(&["sietch_tabr", "pasty_mesa"]),
        },
    ]
});

pub fn find(id: TerritoryId) -> &'static Territory {
    TERRITORY_DEFINITIONS
        .iter()
        .find(|t| t.id == id)
        .unwrap_or_else(|| panic!("Unknown territory {id:?}"))
}

pub fn is_stronghold(id: TerritoryId) -> bool {
    STRONGHOLD_TERRITORIES.contains(&id)
}

pub fn polar_sink() -> TerritoryId {
    TerritoryId("polar_sink")
}
