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

//! C9: iteration. `first_full_slot`/`next_full_slot` are the literal
//! `begin()`/`next(p)` cursor primitives; everything above them (`Iter`,
//! `IterMut`, `IntoIter`) is an ordinary safe Rust iterator built on that
//! cursor. Iteration order follows increasing tag-array index and is not
//! meaningful across mutation of the table.

use super::group::Group;
use super::raw::RawTable;
use super::tag::Tag;
use core::marker::PhantomData;

/// First full slot at or after tag-array index 0, or `None` if the table
/// holds no live records.
pub(super) unsafe fn first_full_slot(tag: *const Tag, capacity: usize) -> Option<usize> {
    let mut base = 0;
    while base < capacity {
        let group = Group::load_aligned(tag.add(base));
        if let Some(bit) = group.match_full().trailing_one() {
            return Some(base + bit);
        }
        base += Group::WIDTH;
    }
    None
}

/// First full slot strictly after `prev`, resuming mid-group via
/// `match_leading_full` before falling back to scanning subsequent
/// aligned groups.
pub(super) unsafe fn next_full_slot(tag: *const Tag, capacity: usize, prev: usize) -> Option<usize> {
    let group_base = prev - (prev % Group::WIDTH);
    let group = Group::load_aligned(tag.add(group_base));
    if let Some(bit) = group.match_leading_full(prev % Group::WIDTH + 1).trailing_one() {
        return Some(group_base + bit);
    }
    let mut base = group_base + Group::WIDTH;
    while base < capacity {
        let group = Group::load_aligned(tag.add(base));
        if let Some(bit) = group.match_full().trailing_one() {
            return Some(base + bit);
        }
        base += Group::WIDTH;
    }
    None
}

/// Raw, pointer-based cursor shared by the safe iterators below.
struct RawIter<T> {
    tag: *const Tag,
    data: *const T,
    capacity: usize,
    pos: Option<usize>,
    started: bool,
    remaining: usize,
}

impl<T> RawIter<T> {
    unsafe fn new(tag: *const Tag, data: *const T, capacity: usize, len: usize) -> Self {
        RawIter {
            tag,
            data,
            capacity,
            pos: None,
            started: false,
            remaining: len,
        }
    }

    unsafe fn advance(&mut self) -> Option<usize> {
        if self.capacity == 0 || self.tag.is_null() {
            return None;
        }
        let next = if !self.started {
            self.started = true;
            first_full_slot(self.tag, self.capacity)
        } else {
            next_full_slot(self.tag, self.capacity, self.pos.expect("advance called after exhaustion"))
        };
        self.pos = next;
        if next.is_some() {
            self.remaining -= 1;
        }
        next
    }
}

pub struct Iter<'a, T> {
    raw: RawIter<T>,
    _marker: PhantomData<&'a T>,
}

impl<'a, T> Iter<'a, T> {
    pub(super) unsafe fn new(table: &'a RawTable<T>) -> Self {
        Iter {
            raw: RawIter::new(table.tag_ptr(), table.data_ptr(), table.capacity(), table.len()),
            _marker: PhantomData,
        }
    }
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<&'a T> {
        unsafe { self.raw.advance().map(|i| &*self.raw.data.add(i)) }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.raw.remaining, Some(self.raw.remaining))
    }
}

impl<'a, T> ExactSizeIterator for Iter<'a, T> {}

pub struct IterMut<'a, T> {
    raw: RawIter<T>,
    _marker: PhantomData<&'a mut T>,
}

impl<'a, T> IterMut<'a, T> {
    pub(super) unsafe fn new(table: &'a mut RawTable<T>) -> Self {
        IterMut {
            raw: RawIter::new(table.tag_ptr(), table.data_ptr(), table.capacity(), table.len()),
            _marker: PhantomData,
        }
    }
}

impl<'a, T> Iterator for IterMut<'a, T> {
    type Item = &'a mut T;

    fn next(&mut self) -> Option<&'a mut T> {
        unsafe { self.raw.advance().map(|i| &mut *(self.raw.data as *mut T).add(i)) }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.raw.remaining, Some(self.raw.remaining))
    }
}

impl<'a, T> ExactSizeIterator for IterMut<'a, T> {}

/// Consumes the table, handing out owned records. Every slot read out is
/// immediately marked `EMPTY` so that if the caller drops `IntoIter` early,
/// the owning `RawTable`'s own `Drop` only runs destructors over the
/// records that were never yielded.
pub struct IntoIter<T> {
    raw: RawTable<T>,
    pos: Option<usize>,
    started: bool,
}

impl<T> IntoIter<T> {
    pub(super) fn new(raw: RawTable<T>) -> Self {
        IntoIter {
            raw,
            pos: None,
            started: false,
        }
    }
}

impl<T> Iterator for IntoIter<T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        unsafe {
            let tag = self.raw.tag_ptr();
            let capacity = self.raw.capacity();
            if capacity == 0 || tag.is_null() {
                return None;
            }
            let next = if !self.started {
                self.started = true;
                first_full_slot(tag, capacity)
            } else {
                next_full_slot(tag, capacity, self.pos.expect("next called after exhaustion"))
            };
            self.pos = next;
            next.map(|i| {
                let value = self.raw.data_at(i).read();
                *tag.add(i) = Tag::EMPTY;
                *self.raw.items_mut() -= 1;
                value
            })
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.raw.len(), Some(self.raw.len()))
    }
}

impl<T> ExactSizeIterator for IntoIter<T> {}

#[cfg(test)]
mod tests {
    use super::super::raw::{RawTable, SlotResult};

    #[test]
    fn iterates_every_inserted_record_exactly_once() {
        let mut t: RawTable<(u64, u64)> = RawTable::new();
        t.ensure_init().unwrap();
        for k in 0..20u64 {
            unsafe {
                if t.growth_left() == 0 {
                    t.rehash_for_insert(|kv| kv.0).unwrap();
                }
                let h = k;
                match t.find_key_or_slot(h, |kv: &(u64, u64)| kv.0 == k) {
                    SlotResult::Vacant(slot) => t.insert_at(slot, h, (k, k)),
                    SlotResult::Occupied(_) => panic!("keys are distinct"),
                }
            }
        }
        let seen: std::collections::HashSet<u64> =
            unsafe { super::Iter::new(&t) }.map(|kv| kv.0).collect();
        assert_eq!(seen.len(), 20);
        for k in 0..20u64 {
            assert!(seen.contains(&k));
        }
    }
}
