/*
 * This file is a part of a from-scratch reinterpretation of the
 * Abseil/Hashbrown SIMD hash table design.
 *
 * Copyright (c) 2024, the project contributors.
 *
 * This program is free software: you can redistribute it and/or modify
 * it under the terms of the GNU Affero General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * This program is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 * GNU Affero General Public License for more details.
 *
 * You should have received a copy of the GNU Affero General Public License
 * along with this program. If not, see <https://www.gnu.org/licenses/>.
 *
*/

//! In-process construction configuration for [`FlatMap`](crate::FlatMap).
//!
//! This is not file/environment configuration -- the table has none of
//! that, it is a pure data structure -- it is a small builder over the
//! three storage regimes spec.md §4.4 describes, so callers pick a regime
//! once instead of juggling three constructor families by hand. The load
//! factor is fixed at 7/8 everywhere (spec.md §3) and is not configurable.

use crate::error::TableError;
use crate::flat_map::table::FlatMap;
use core::hash::{BuildHasher, Hash};
use std::collections::hash_map::RandomState;

/// Which of the three memory regimes (spec.md §1) a [`TableConfig`] builds.
#[derive(Debug, Clone, Copy)]
enum Regime {
    /// Heap-growing; the default.
    Dynamic,
    /// One allocation, reserved once for at least `capacity` elements,
    /// never grown past that.
    Fixed { capacity: usize },
}

/// Builds a [`FlatMap`] over one of the three storage regimes with an
/// explicit hasher, instead of calling the matching constructor by hand.
#[derive(Debug, Clone)]
pub struct TableConfig<S = RandomState> {
    regime: Regime,
    hasher: S,
}

impl Default for TableConfig<RandomState> {
    fn default() -> Self {
        Self::new()
    }
}

impl TableConfig<RandomState> {
    /// Dynamic storage with the default `RandomState` hasher.
    pub fn new() -> Self {
        TableConfig {
            regime: Regime::Dynamic,
            hasher: RandomState::new(),
        }
    }
}

impl<S> TableConfig<S> {
    /// Dynamic storage with a caller-chosen hasher.
    pub fn with_hasher(hasher: S) -> Self {
        TableConfig {
            regime: Regime::Dynamic,
            hasher,
        }
    }

    /// Switches this builder to the fixed-capacity regime: one allocation,
    /// sized up front for at least `capacity` elements at the 7/8 load
    /// factor, never grown -- only in-place rehash (spec.md §4.7) reclaims
    /// room for it afterwards.
    pub fn fixed_capacity(mut self, capacity: usize) -> Self {
        self.regime = Regime::Fixed { capacity };
        self
    }

    /// Switches this builder back to the dynamic (heap-growing) regime.
    pub fn dynamic(mut self) -> Self {
        self.regime = Regime::Dynamic;
        self
    }

    /// Builds the configured [`FlatMap`].
    ///
    /// `UserReserved` tables are deliberately not reachable through this
    /// builder: they require an `unsafe` buffer/length pair supplied by the
    /// caller, so they are always built through
    /// [`FlatMap::from_raw_parts_and_hasher`] directly rather than threaded
    /// through a safe config object.
    pub fn build<K, V>(self) -> Result<FlatMap<K, V, S>, TableError>
    where
        K: Hash + Eq,
        S: BuildHasher,
    {
        match self.regime {
            Regime::Dynamic => Ok(FlatMap::with_hasher(self.hasher)),
            Regime::Fixed { capacity } => FlatMap::with_fixed_capacity_and_hasher(capacity, self.hasher),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dynamic_default_builds_an_empty_map() {
        let map: FlatMap<u64, u64> = TableConfig::new().build().unwrap();
        assert_eq!(map.len(), 0);
    }

    #[test]
    fn fixed_capacity_reserves_up_front() {
        let map: FlatMap<u64, u64> = TableConfig::new().fixed_capacity(16).build().unwrap();
        assert!(map.capacity() >= 16);
    }
}
