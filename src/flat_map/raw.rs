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

//! `RawTable<T>`: the non-generic-over-key core engine. It knows how to
//! place, find and erase records of type `T` given a caller-supplied hash
//! and equality closure, but has no idea what a "key" is -- that
//! projection lives one layer up, in [`super::table`].
//!
//! This is where C3 (layout), C4 (lazy init), C5 (search), C6
//! (insert/erase) and the swap slot live. C7 (rehash) is implemented in
//! [`super::rehash`] as an extension of this type; C9 (iteration) lives in
//! [`super::iter`].

use super::group::Group;
use super::layout::{calculate_layout, set_tag_mirrored, usable_capacity};
use super::storage::{alloc_block, dealloc_block, Storage};
use super::tag::Tag;
use super::util::likely;
use crate::error::TableError;
use core::marker::PhantomData;
use core::ptr::NonNull;

pub(crate) enum SlotResult {
    Occupied(usize),
    Vacant(usize),
}

pub(crate) struct RawTable<T> {
    storage: Storage,
    /// Base of the data array; indices `[0, capacity]` are valid once
    /// initialized (`capacity` is the swap slot). Null while uninitialized
    /// for `Dynamic`; set eagerly at construction for `Fixed`/`UserReserved`.
    data: *mut T,
    /// Base of the tag array, length `capacity + Group::WIDTH`. Null is
    /// the one true "uninitialized" sentinel (spec.md §3/§4.4), regardless
    /// of whether `data` has already been set.
    tag: *mut Tag,
    bucket_mask: usize,
    items: usize,
    deleted: usize,
    growth_left: usize,
    _marker: PhantomData<T>,
}

unsafe impl<T: Send> Send for RawTable<T> {}

impl<T> RawTable<T> {
    pub fn new() -> Self {
        RawTable {
            storage: Storage::Dynamic(None),
            data: core::ptr::null_mut(),
            tag: core::ptr::null_mut(),
            bucket_mask: 0,
            items: 0,
            deleted: 0,
            growth_left: 0,
            _marker: PhantomData,
        }
    }

    /// Reserves a single block sized for `capacity` elements, up front,
    /// and never grows it again: the "compile-time/stack" regime.
    pub fn with_fixed_capacity(capacity: usize) -> Result<Self, TableError> {
        let buckets = super::layout::capacity_for(capacity).ok_or(TableError::ArgumentError)?;
        let (ptr, _tag_offset, layout) = unsafe { alloc_block::<T>(buckets)? };
        Ok(RawTable {
            storage: Storage::Fixed(layout),
            data: ptr.as_ptr() as *mut T,
            tag: core::ptr::null_mut(),
            bucket_mask: buckets - 1,
            items: 0,
            deleted: 0,
            growth_left: 0,
            _marker: PhantomData,
        })
    }

    /// Builds a table over a caller-owned buffer of `len` bytes. The
    /// table never frees this memory. Fails with `ArgumentError` if the
    /// buffer cannot even hold one group's worth of buckets.
    ///
    /// ## Safety
    /// `ptr` must be valid for reads and writes for `len` bytes for the
    /// entire lifetime of the table, and aligned to at least
    /// `max(align_of::<T>(), Group::WIDTH)`.
    pub unsafe fn from_raw_parts(ptr: *mut u8, len: usize) -> Result<Self, TableError> {
        if ptr.is_null() {
            return Err(TableError::ArgumentError);
        }
        // binary-search the largest power-of-two bucket count whose layout fits in `len`
        let mut lo = Group::WIDTH;
        let mut best: Option<usize> = None;
        loop {
            match calculate_layout::<T>(lo) {
                Some((layout, _)) if layout.size() <= len => {
                    best = Some(lo);
                    lo *= 2;
                }
                _ => break,
            }
        }
        let buckets = best.ok_or(TableError::ArgumentError)?;
        Ok(RawTable {
            storage: Storage::UserReserved,
            data: ptr as *mut T,
            tag: core::ptr::null_mut(),
            bucket_mask: buckets - 1,
            items: 0,
            deleted: 0,
            growth_left: 0,
            _marker: PhantomData,
        })
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.items
    }

    #[inline]
    pub fn is_uninit(&self) -> bool {
        self.tag.is_null()
    }

    /// Buckets already reserved for this table. For `Fixed`/`UserReserved`
    /// storage this is nonzero from construction, even before the lazy
    /// initializer has touched the tag array -- the block is already
    /// committed, only the tag memset is deferred. A freshly constructed
    /// `Dynamic` table (no backing block yet) reports zero.
    #[inline]
    pub fn capacity(&self) -> usize {
        if self.bucket_mask == 0 && self.data.is_null() {
            0
        } else {
            self.bucket_mask + 1
        }
    }

    #[inline]
    pub fn growth_left(&self) -> usize {
        self.growth_left
    }

    #[inline]
    pub fn bucket_mask(&self) -> usize {
        self.bucket_mask
    }

    #[inline]
    pub(crate) unsafe fn tag_ptr(&self) -> *mut Tag {
        self.tag
    }

    #[inline]
    pub(crate) unsafe fn data_ptr(&self) -> *mut T {
        self.data
    }

    #[inline]
    unsafe fn tag_at(&self, i: usize) -> Tag {
        *self.tag.add(i)
    }

    #[inline]
    pub(crate) unsafe fn data_at(&self, i: usize) -> *mut T {
        self.data.add(i)
    }

    /// Index of the scratch "swap slot", always one past the last real
    /// bucket.
    #[inline]
    pub(crate) fn swap_index(&self) -> usize {
        self.bucket_mask + 1
    }

    /// The lazy initializer (C4): decides, on first mutation, whether the
    /// table is sitting over a fixed/user-reserved buffer that merely
    /// needs its tag array zeroed, or must allocate one from scratch.
    pub(crate) fn ensure_init(&mut self) -> Result<(), TableError> {
        if !self.tag.is_null() {
            return Ok(());
        }
        if self.bucket_mask != 0 && !self.data.is_null() {
            let capacity = self.bucket_mask + 1;
            if capacity < Group::WIDTH || !capacity.is_power_of_two() {
                return Err(TableError::ArgumentError);
            }
            let (_, tag_offset) = calculate_layout::<T>(capacity).ok_or(TableError::ArgumentError)?;
            let base = self.data as *mut u8;
            let tag_ptr = unsafe { base.add(tag_offset) } as *mut Tag;
            unsafe {
                tag_ptr.write_bytes(super::tag::EMPTY, capacity + Group::WIDTH);
            }
            self.tag = tag_ptr;
            self.growth_left = usable_capacity(capacity);
            log::trace!("flat_map: lazily initialized fixed/user-reserved table, capacity={capacity}");
            Ok(())
        } else if self.storage.has_allocator() {
            let capacity = Group::WIDTH;
            let (ptr, tag_offset, layout) = unsafe { alloc_block::<T>(capacity)? };
            let base = ptr.as_ptr();
            let tag_ptr = unsafe { base.add(tag_offset) } as *mut Tag;
            unsafe {
                tag_ptr.write_bytes(super::tag::EMPTY, capacity + Group::WIDTH);
            }
            self.data = base as *mut T;
            self.tag = tag_ptr;
            self.bucket_mask = capacity - 1;
            self.growth_left = usable_capacity(capacity);
            if let Storage::Dynamic(slot) = &mut self.storage {
                *slot = Some(layout);
            }
            log::trace!("flat_map: lazily allocated dynamic table, capacity={capacity}");
            Ok(())
        } else {
            Err(TableError::NoAllocationFunction)
        }
    }

    /// C5: search for `key`'s slot for the purposes of insertion. Returns
    /// the occupied index on an equality hit, or a vacant slot index
    /// recorded from the first empty-or-deleted position seen along the
    /// probe walk.
    ///
    /// ## Safety
    /// The table must be initialized (`ensure_init` already called).
    pub(crate) unsafe fn find_key_or_slot(
        &self,
        hash: u64,
        mut eq: impl FnMut(&T) -> bool,
    ) -> SlotResult {
        let fingerprint = Tag::full(hash);
        let mut probe = super::probe::ProbeSequence::new(hash, self.bucket_mask);
        let mut insert_slot: Option<usize> = None;
        loop {
            let group = Group::load_unaligned(self.tag.add(probe.pos));
            for bit in group.match_tag(fingerprint) {
                let idx = (probe.pos + bit) & self.bucket_mask;
                if likely(eq(&*self.data_at(idx))) {
                    return SlotResult::Occupied(idx);
                }
            }
            if insert_slot.is_none() {
                if let Some(bit) = group.match_empty_or_deleted().trailing_one() {
                    insert_slot = Some((probe.pos + bit) & self.bucket_mask);
                }
            }
            if group.match_empty().has_one() {
                return SlotResult::Vacant(
                    insert_slot.expect("a group with an empty tag must have yielded an insert slot"),
                );
            }
            probe.move_to_next(self.bucket_mask);
        }
    }

    /// C5: pure lookup -- same walk, no slot bookkeeping.
    pub(crate) unsafe fn find_key_or_fail(
        &self,
        hash: u64,
        mut eq: impl FnMut(&T) -> bool,
    ) -> Option<usize> {
        if self.is_uninit() {
            return None;
        }
        let fingerprint = Tag::full(hash);
        let mut probe = super::probe::ProbeSequence::new(hash, self.bucket_mask);
        loop {
            let group = Group::load_unaligned(self.tag.add(probe.pos));
            for bit in group.match_tag(fingerprint) {
                let idx = (probe.pos + bit) & self.bucket_mask;
                if likely(eq(&*self.data_at(idx))) {
                    return Some(idx);
                }
            }
            if group.match_empty().has_one() {
                return None;
            }
            probe.move_to_next(self.bucket_mask);
        }
    }

    /// C5: used during rehash, where the caller guarantees at least one
    /// empty-or-deleted slot exists along the walk.
    pub(crate) unsafe fn find_slot_or_noreturn(&self, hash: u64) -> usize {
        let mut probe = super::probe::ProbeSequence::new(hash, self.bucket_mask);
        loop {
            let group = Group::load_unaligned(self.tag.add(probe.pos));
            if let Some(bit) = group.match_empty_or_deleted().trailing_one() {
                return (probe.pos + bit) & self.bucket_mask;
            }
            probe.move_to_next(self.bucket_mask);
        }
    }

    /// C6: commits a record into slot `i`, whose tag is already known to
    /// be empty-or-deleted (from a prior `find_key_or_slot`/
    /// `find_slot_or_noreturn` call).
    pub(crate) unsafe fn insert_at(&mut self, i: usize, hash: u64, value: T) {
        let was_empty = self.tag_at(i).is_empty();
        if was_empty {
            self.growth_left -= 1;
        } else {
            self.deleted -= 1;
        }
        self.items += 1;
        set_tag_mirrored(self.tag, self.bucket_mask, i, Tag::full(hash));
        self.data_at(i).write(value);
    }

    /// C6: the deleted-vs-empty tombstone decision. `i` must currently
    /// hold a full tag.
    pub(crate) unsafe fn erase_at(&mut self, i: usize) -> T {
        let value = self.data_at(i).read();
        let before_start = i.wrapping_sub(Group::WIDTH) & self.bucket_mask;
        let group_before = Group::load_unaligned(self.tag.add(before_start));
        let group_after = Group::load_unaligned(self.tag.add(i));
        let prev_empty_count = group_before.match_empty().leading_zeros();
        let cur_empty_count = group_after.match_empty().trailing_zeros();
        let new_tag = if prev_empty_count + cur_empty_count >= Group::WIDTH {
            self.growth_left += 1;
            Tag::EMPTY
        } else {
            self.deleted += 1;
            Tag::DELETED
        };
        set_tag_mirrored(self.tag, self.bucket_mask, i, new_tag);
        self.items -= 1;
        value
    }

    pub(crate) fn items_mut(&mut self) -> &mut usize {
        &mut self.items
    }

    pub(crate) fn deleted(&self) -> usize {
        self.deleted
    }

    pub(crate) fn deleted_mut(&mut self) -> &mut usize {
        &mut self.deleted
    }

    pub(crate) fn growth_left_mut(&mut self) -> &mut usize {
        &mut self.growth_left
    }

    pub(crate) fn bucket_mask_mut(&mut self) -> &mut usize {
        &mut self.bucket_mask
    }

    pub(crate) fn storage(&self) -> &Storage {
        &self.storage
    }

    pub(crate) fn storage_mut(&mut self) -> &mut Storage {
        &mut self.storage
    }

    pub(crate) unsafe fn set_tag_ptr(&mut self, ptr: *mut Tag) {
        self.tag = ptr;
    }

    pub(crate) unsafe fn set_data_ptr(&mut self, ptr: *mut T) {
        self.data = ptr;
    }

    /// Drops every occupied record and resets the tag array to all-empty,
    /// without freeing any backing memory.
    pub fn clear(&mut self) {
        if self.is_uninit() {
            return;
        }
        unsafe {
            if core::mem::needs_drop::<T>() {
                for i in 0..self.capacity() {
                    if self.tag_at(i).is_full() {
                        core::ptr::drop_in_place(self.data_at(i));
                    }
                }
            }
            self.tag.write_bytes(super::tag::EMPTY, self.capacity() + Group::WIDTH);
        }
        self.items = 0;
        self.deleted = 0;
        self.growth_left = usable_capacity(self.capacity());
    }
}

impl<T> Drop for RawTable<T> {
    fn drop(&mut self) {
        self.clear();
        if self.is_uninit() && self.data.is_null() {
            return;
        }
        match &self.storage {
            Storage::Dynamic(Some(layout)) => unsafe {
                dealloc_block(NonNull::new_unchecked(self.data as *mut u8), *layout);
            },
            Storage::Fixed(layout) => unsafe {
                dealloc_block(NonNull::new_unchecked(self.data as *mut u8), *layout);
            },
            Storage::Dynamic(None) | Storage::UserReserved => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dynamic_lazy_init_on_first_touch() {
        let t: RawTable<u64> = RawTable::new();
        assert!(t.is_uninit());
        assert_eq!(t.capacity(), 0);
    }

    #[test]
    fn fixed_table_has_capacity_before_first_mutation() {
        let t: RawTable<u64> = RawTable::with_fixed_capacity(4).unwrap();
        assert!(t.is_uninit());
        assert!(t.capacity() >= 4);
    }

    #[test]
    fn insert_and_find_roundtrip() {
        let mut t: RawTable<(u64, u64)> = RawTable::new();
        t.ensure_init().unwrap();
        unsafe {
            let hash = 42u64;
            match t.find_key_or_slot(hash, |_| false) {
                SlotResult::Vacant(slot) => t.insert_at(slot, hash, (1, 100)),
                SlotResult::Occupied(_) => panic!("must be vacant"),
            }
            let found = t.find_key_or_fail(hash, |kv| kv.0 == 1);
            assert_eq!(found.map(|i| (*t.data_at(i)).1), Some(100));
        }
    }

    #[test]
    fn erase_then_lookup_through_probe_chain() {
        // force three keys into the same initial group so that erasing
        // the middle one still leaves the third reachable.
        let mut t: RawTable<(u64, u64)> = RawTable::new();
        t.ensure_init().unwrap();
        let base_hash = 7u64 << 20;
        unsafe {
            for k in 0..3u64 {
                let h = base_hash;
                match t.find_key_or_slot(h, |kv: &(u64, u64)| kv.0 == k) {
                    SlotResult::Vacant(slot) => t.insert_at(slot, h, (k, k * 10)),
                    SlotResult::Occupied(_) => panic!("keys are distinct"),
                }
            }
            let middle = t.find_key_or_fail(base_hash, |kv| kv.0 == 1).unwrap();
            t.erase_at(middle);
            assert!(t.find_key_or_fail(base_hash, |kv| kv.0 == 0).is_some());
            assert!(t.find_key_or_fail(base_hash, |kv| kv.0 == 2).is_some());
            assert!(t.find_key_or_fail(base_hash, |kv| kv.0 == 1).is_none());
        }
    }
}
