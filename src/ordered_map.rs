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

//! A sorted associative container used elsewhere in this repository for
//! range queries. Specified only by its public interface -- insert, get,
//! remove, range iteration -- exactly as `spec.md` treats it as an
//! external collaborator of the hash table; it carries none of that
//! module's SIMD/tombstone/rehash budget.

use std::borrow::Borrow;
use std::collections::BTreeMap;
use std::ops::RangeBounds;

#[derive(Debug, Clone, Default)]
pub struct OrderedMap<K, V>(BTreeMap<K, V>);

impl<K: Ord, V> OrderedMap<K, V> {
    pub fn new() -> Self {
        OrderedMap(BTreeMap::new())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        self.0.insert(key, value)
    }

    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q> + Ord,
        Q: Ord + ?Sized,
    {
        self.0.get(key)
    }

    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q> + Ord,
        Q: Ord + ?Sized,
    {
        self.0.remove(key)
    }

    /// In-order iteration over `range`, e.g. `map.range(lo..hi)`.
    pub fn range<R>(&self, range: R) -> std::collections::btree_map::Range<'_, K, V>
    where
        R: RangeBounds<K>,
    {
        self.0.range(range)
    }

    pub fn iter(&self) -> std::collections::btree_map::Iter<'_, K, V> {
        self.0.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn range_query_returns_ordered_slice() {
        let mut m = OrderedMap::new();
        for k in [5, 1, 9, 3, 7] {
            m.insert(k, k * 10);
        }
        let got: Vec<_> = m.range(3..8).map(|(k, v)| (*k, *v)).collect();
        assert_eq!(got, vec![(3, 30), (5, 50), (7, 70)]);
    }
}
