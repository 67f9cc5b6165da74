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

//! `FlatMap<K, V, S>`: the safe façade over [`super::raw::RawTable`]. This
//! is the only public entry point into the core; every `unsafe` primitive
//! in `tag`/`bitmask`/`group`/`probe`/`layout`/`storage`/`raw`/`rehash`/
//! `iter` is exercised from here and from `entry`, never by a caller
//! directly.

use super::entry::{Entry, OccupiedEntry, VacantEntry};
use super::iter::{IntoIter, Iter, IterMut};
use super::raw::{RawTable, SlotResult};
use crate::error::TableError;
use core::borrow::Borrow;
use core::hash::{BuildHasher, Hash};
use std::collections::hash_map::RandomState;

pub struct FlatMap<K, V, S = RandomState> {
    raw: RawTable<(K, V)>,
    hasher: S,
}

impl<K, V> FlatMap<K, V, RandomState> {
    /// Dynamic storage (spec.md §4.4): grows via the global allocator,
    /// shrinks back to nothing on `clear`... actually never shrinks on
    /// `clear` (capacity is retained), matching `std::collections::HashMap`.
    pub fn new() -> Self {
        FlatMap {
            raw: RawTable::new(),
            hasher: RandomState::new(),
        }
    }

    /// Fixed storage: one allocation, sized for at least `capacity`
    /// elements at the 7/8 load factor, never grown. Growth rehash always
    /// falls back to in-place reclamation for a table built this way.
    pub fn with_fixed_capacity(capacity: usize) -> Result<Self, TableError> {
        Ok(FlatMap {
            raw: RawTable::with_fixed_capacity(capacity)?,
            hasher: RandomState::new(),
        })
    }

    /// User-reserved storage: the table never allocates or frees `ptr`.
    ///
    /// ## Safety
    /// See [`RawTable::from_raw_parts`].
    pub unsafe fn from_raw_parts(ptr: *mut u8, len: usize) -> Result<Self, TableError> {
        Ok(FlatMap {
            raw: RawTable::from_raw_parts(ptr, len)?,
            hasher: RandomState::new(),
        })
    }
}

impl<K, V> Default for FlatMap<K, V, RandomState> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, S> FlatMap<K, V, S> {
    pub fn with_hasher(hasher: S) -> Self {
        FlatMap {
            raw: RawTable::new(),
            hasher,
        }
    }

    pub fn with_fixed_capacity_and_hasher(capacity: usize, hasher: S) -> Result<Self, TableError> {
        Ok(FlatMap {
            raw: RawTable::with_fixed_capacity(capacity)?,
            hasher,
        })
    }

    /// ## Safety
    /// See [`RawTable::from_raw_parts`].
    pub unsafe fn from_raw_parts_and_hasher(ptr: *mut u8, len: usize, hasher: S) -> Result<Self, TableError> {
        Ok(FlatMap {
            raw: RawTable::from_raw_parts(ptr, len)?,
            hasher,
        })
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.raw.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.raw.len() == 0
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.raw.capacity()
    }

    pub fn clear(&mut self) {
        self.raw.clear();
    }

    pub fn iter(&self) -> Iter<'_, (K, V)> {
        unsafe { Iter::new(&self.raw) }
    }

    pub fn iter_mut(&mut self) -> IterMut<'_, (K, V)> {
        unsafe { IterMut::new(&mut self.raw) }
    }

    pub(super) unsafe fn raw_data_at(&self, index: usize) -> *mut (K, V) {
        self.raw.data_at(index)
    }

    pub(super) unsafe fn raw_erase(&mut self, index: usize) -> (K, V) {
        self.raw.erase_at(index)
    }

    pub(super) unsafe fn raw_insert_fresh(&mut self, hash: u64, key: K, value: V) -> &mut V {
        match self.raw.find_key_or_slot(hash, |_| false) {
            SlotResult::Vacant(slot) => {
                self.raw.insert_at(slot, hash, (key, value));
                &mut (*self.raw.data_at(slot)).1
            }
            SlotResult::Occupied(_) => unreachable!("VacantEntry::insert called on an occupied key"),
        }
    }
}

impl<K, V, S> FlatMap<K, V, S>
where
    K: Hash + Eq,
    S: BuildHasher,
{
    fn hash_of<Q: Hash + ?Sized>(&self, key: &Q) -> u64 {
        self.hasher.hash_one(key)
    }

    /// Two-phase entry API (C8). Resolves allocation/rehash concerns
    /// before returning `Vacant`, so `VacantEntry::insert` is infallible.
    pub fn entry(&mut self, key: K) -> Entry<'_, K, V, S> {
        let hash = self.hash_of(&key);
        if let Err(e) = self.raw.ensure_init() {
            return Entry::Error(e);
        }
        match unsafe { self.raw.find_key_or_fail(hash, |record| record.0 == key) } {
            Some(index) => Entry::Occupied(OccupiedEntry { map: self, index }),
            None => {
                if self.raw.growth_left() == 0 {
                    let hasher = &self.hasher;
                    if let Err(e) = self.raw.rehash_for_insert(|record| hasher.hash_one(&record.0)) {
                        return Entry::Error(e);
                    }
                    if self.raw.growth_left() == 0 {
                        return Entry::Error(TableError::CapacityExhausted);
                    }
                }
                Entry::Vacant(VacantEntry { map: self, key, hash })
            }
        }
    }

    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.get(key).is_some()
    }

    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let hash = self.hash_of(key);
        unsafe {
            self.raw
                .find_key_or_fail(hash, |record| record.0.borrow() == key)
                .map(|i| &(*self.raw.data_at(i)).1)
        }
    }

    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let hash = self.hash_of(key);
        unsafe {
            self.raw
                .find_key_or_fail(hash, |record| record.0.borrow() == key)
                .map(|i| &mut (*self.raw.data_at(i)).1)
        }
    }

    /// `insert(k, v); get(k) == v`, and overwrites on a repeat key,
    /// returning the value that was displaced.
    pub fn insert(&mut self, key: K, value: V) -> Result<Option<V>, TableError> {
        match self.entry(key) {
            Entry::Occupied(mut e) => Ok(Some(e.insert(value))),
            Entry::Vacant(e) => {
                e.insert(value);
                Ok(None)
            }
            Entry::Error(e) => Err(e),
        }
    }

    /// `try_insert(k, v1); try_insert(k, v2); get(k) == v1`: only writes
    /// on a vacant key, otherwise leaves the existing value untouched.
    pub fn try_insert(&mut self, key: K, value: V) -> Result<&mut V, TableError> {
        match self.entry(key) {
            Entry::Occupied(e) => Ok(e.into_mut()),
            Entry::Vacant(e) => Ok(e.insert(value)),
            Entry::Error(e) => Err(e),
        }
    }

    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.remove_entry(key).map(|(_, v)| v)
    }

    pub fn remove_entry<Q>(&mut self, key: &Q) -> Option<(K, V)>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let hash = self.hash_of(key);
        let index = unsafe { self.raw.find_key_or_fail(hash, |record| record.0.borrow() == key)? };
        Some(unsafe { self.raw.erase_at(index) })
    }

    /// Three-way swap: if `key` is occupied, exchanges its value with
    /// `*value` in place (O(1), no temporary allocation) and reports
    /// `true`; if vacant, inserts `key`/`*value` as a new record and
    /// reports `false`, leaving the caller's slot holding `V::default()`.
    pub fn swap_entry(&mut self, key: K, value: &mut V) -> Result<bool, TableError>
    where
        V: Default,
    {
        match self.entry(key) {
            Entry::Occupied(mut e) => {
                core::mem::swap(e.get_mut(), value);
                Ok(true)
            }
            Entry::Vacant(e) => {
                e.insert(core::mem::take(value));
                Ok(false)
            }
            Entry::Error(e) => Err(e),
        }
    }
}

impl<K, V, S> IntoIterator for FlatMap<K, V, S> {
    type Item = (K, V);
    type IntoIter = IntoIter<(K, V)>;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter::new(self.raw)
    }
}

impl<'a, K, V, S> IntoIterator for &'a FlatMap<K, V, S> {
    type Item = &'a (K, V);
    type IntoIter = Iter<'a, (K, V)>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
