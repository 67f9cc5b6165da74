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

//! C8: the entry façade. `InsertError`/`Fail` from the callback-based
//! design fold into a single `Entry::Error` branch, so the two-phase API
//! has exactly one failure channel instead of a status flag threaded
//! through every call.

use super::table::FlatMap;
use crate::error::TableError;
use core::hash::{BuildHasher, Hash};

pub enum Entry<'a, K, V, S> {
    Occupied(OccupiedEntry<'a, K, V, S>),
    Vacant(VacantEntry<'a, K, V, S>),
    /// The table could not be prepared for this entry (allocation
    /// failure, or a fixed/user-reserved table with no room and no
    /// reclaimable tombstones).
    Error(TableError),
}

impl<'a, K, V, S> Entry<'a, K, V, S>
where
    K: Hash + Eq,
    S: BuildHasher,
{
    /// Returns the existing value, or inserts and returns `default`.
    /// Propagates the failure if the table could not make room.
    pub fn or_insert(self, default: V) -> Result<&'a mut V, TableError> {
        self.or_insert_with(|| default)
    }

    pub fn or_insert_with(self, default: impl FnOnce() -> V) -> Result<&'a mut V, TableError> {
        match self {
            Entry::Occupied(e) => Ok(e.into_mut()),
            Entry::Vacant(e) => Ok(e.insert(default())),
            Entry::Error(e) => Err(e),
        }
    }

    /// Applies `f` to the value if occupied, leaving a vacant or errored
    /// entry untouched, and returns `self` either way for chaining.
    pub fn and_modify(self, f: impl FnOnce(&mut V)) -> Self {
        match self {
            Entry::Occupied(mut e) => {
                f(e.get_mut());
                Entry::Occupied(e)
            }
            other => other,
        }
    }

    pub fn key(&self) -> Option<&K> {
        match self {
            Entry::Occupied(e) => Some(e.key()),
            Entry::Vacant(e) => Some(e.key()),
            Entry::Error(_) => None,
        }
    }
}

pub struct OccupiedEntry<'a, K, V, S> {
    pub(super) map: &'a mut FlatMap<K, V, S>,
    pub(super) index: usize,
}

impl<'a, K, V, S> OccupiedEntry<'a, K, V, S> {
    pub fn key(&self) -> &K {
        unsafe { &(*self.map.raw_data_at(self.index)).0 }
    }

    pub fn get(&self) -> &V {
        unsafe { &(*self.map.raw_data_at(self.index)).1 }
    }

    pub fn get_mut(&mut self) -> &mut V {
        unsafe { &mut (*self.map.raw_data_at(self.index)).1 }
    }

    pub fn into_mut(self) -> &'a mut V {
        unsafe { &mut (*self.map.raw_data_at(self.index)).1 }
    }

    /// `insert_or_assign`'s occupied branch: installs `value`, returns the
    /// value that was there before.
    pub fn insert(&mut self, value: V) -> V {
        core::mem::replace(self.get_mut(), value)
    }

    /// `remove_entry`: erases the record and returns it whole.
    pub fn remove(self) -> (K, V) {
        unsafe { self.map.raw_erase(self.index) }
    }
}

pub struct VacantEntry<'a, K, V, S> {
    pub(super) map: &'a mut FlatMap<K, V, S>,
    pub(super) key: K,
    pub(super) hash: u64,
}

impl<'a, K, V, S> VacantEntry<'a, K, V, S> {
    pub fn key(&self) -> &K {
        &self.key
    }

    pub fn into_key(self) -> K {
        self.key
    }

    /// The table has already made room for this entry by the time
    /// `FlatMap::entry` returns `Vacant` (see its doc comment), so this
    /// cannot fail.
    pub fn insert(self, value: V) -> &'a mut V {
        unsafe { self.map.raw_insert_fresh(self.hash, self.key, value) }
    }
}
