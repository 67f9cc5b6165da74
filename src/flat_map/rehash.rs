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

//! C7: the rehash engine, triggered whenever `growth_left` hits zero on an
//! insert path. Two modes, chosen by the same rule every time: grow (fresh
//! allocation, double-ish capacity) when an allocator is available and the
//! post-insert occupancy would exceed half of capacity; otherwise rehash
//! in place, reclaiming tombstones without ever calling the allocator --
//! the only option left for `Fixed`/`UserReserved` tables.

use super::group::Group;
use super::layout::{calculate_layout, set_tag_mirrored, usable_capacity};
use super::probe::ProbeSequence;
use super::raw::RawTable;
use super::storage::{alloc_block, dealloc_block, Storage};
use super::tag::Tag;
use crate::error::TableError;
use core::ptr::NonNull;

/// Shared by growth (placing into the fresh block) and in-place rehash
/// (re-placing a formerly-full, now-`DELETED` record): walk the probe
/// sequence for `hash` over a raw tag array and return the first
/// empty-or-deleted position. Identical contract to
/// [`RawTable::find_slot_or_noreturn`], just not bound to `self` since
/// growth operates on a tag array that isn't `self`'s yet.
unsafe fn find_empty_or_deleted_slot(tag: *mut Tag, bucket_mask: usize, hash: u64) -> usize {
    let mut probe = ProbeSequence::new(hash, bucket_mask);
    loop {
        let group = Group::load_unaligned(tag.add(probe.pos));
        if let Some(bit) = group.match_empty_or_deleted().trailing_one() {
            return (probe.pos + bit) & bucket_mask;
        }
        probe.move_to_next(bucket_mask);
    }
}

/// `next_pow2((capacity + 1) * 2)`, floored at one group's width.
fn grown_capacity(capacity: usize) -> usize {
    let target = capacity.saturating_add(1).saturating_mul(2);
    target.next_power_of_two().max(Group::WIDTH)
}

impl<T> RawTable<T> {
    /// Called from the insert path once `growth_left == 0`. On return,
    /// either `growth_left > 0` (room was made, by growing or by
    /// reclaiming tombstones) or the table genuinely has no more capacity
    /// to give (a `Fixed`/`UserReserved` table with no reclaimable
    /// tombstones), which the caller surfaces as `CapacityExhausted`.
    pub(crate) fn rehash_for_insert(&mut self, hash_of: impl Fn(&T) -> u64) -> Result<(), TableError> {
        let capacity = self.capacity();
        if self.storage().allows_growth() && self.len() + 1 > capacity / 2 {
            self.grow(hash_of)
        } else {
            unsafe { self.rehash_in_place(hash_of) };
            Ok(())
        }
    }

    /// Growth rehash: allocate a fresh, larger block, memset its tags to
    /// `EMPTY`, and re-place every currently-full record via a
    /// first-full-group scan of the old block. Frees the old block only
    /// after every record has been moved out of it.
    fn grow(&mut self, hash_of: impl Fn(&T) -> u64) -> Result<(), TableError> {
        let old_capacity = self.capacity();
        let old_data = unsafe { self.data_ptr() };
        let old_tag = unsafe { self.tag_ptr() };
        let old_layout = match self.storage() {
            Storage::Dynamic(Some(layout)) => *layout,
            _ => return Err(TableError::NoAllocationFunction),
        };

        let new_capacity = grown_capacity(old_capacity);
        let (new_ptr, new_tag_offset, new_layout) = unsafe { alloc_block::<T>(new_capacity)? };
        let new_data = new_ptr.as_ptr() as *mut T;
        let new_tag = unsafe { new_ptr.as_ptr().add(new_tag_offset) as *mut Tag };
        let new_bucket_mask = new_capacity - 1;

        unsafe {
            new_tag.write_bytes(super::tag::EMPTY, new_capacity + Group::WIDTH);

            let mut i = 0;
            while i < old_capacity {
                let group = Group::load_aligned(old_tag.add(i));
                for bit in group.match_full() {
                    let idx = i + bit;
                    let value = old_data.add(idx).read();
                    let hash = hash_of(&value);
                    let j = find_empty_or_deleted_slot(new_tag, new_bucket_mask, hash);
                    set_tag_mirrored(new_tag, new_bucket_mask, j, Tag::full(hash));
                    new_data.add(j).write(value);
                }
                i += Group::WIDTH;
            }

            dealloc_block(NonNull::new_unchecked(old_data as *mut u8), old_layout);

            self.set_data_ptr(new_data);
            self.set_tag_ptr(new_tag);
        }
        *self.bucket_mask_mut() = new_bucket_mask;
        *self.growth_left_mut() = usable_capacity(new_capacity) - self.len();
        *self.deleted_mut() = 0;
        if let Storage::Dynamic(slot) = self.storage_mut() {
            *slot = Some(new_layout);
        }
        log::debug!(
            "flat_map: grew table from capacity {old_capacity} to {new_capacity} ({} live records)",
            self.len()
        );
        Ok(())
    }

    /// In-place rehash (spec.md §4.7, step 1-4): reclaims tombstones in a
    /// single pass with no allocation. Terminates because every iteration
    /// of the inner loop either breaks out (an element reaches a final
    /// resting place) or strictly reduces the set of `DELETED` tags whose
    /// occupant has not yet been re-placed.
    unsafe fn rehash_in_place(&mut self, hash_of: impl Fn(&T) -> u64) {
        let capacity = self.capacity();
        let bucket_mask = self.bucket_mask();
        let tag = self.tag_ptr();

        let mut i = 0;
        while i < capacity {
            let group = Group::load_aligned(tag.add(i));
            let converted = group.convert_constant_to_empty_full_to_deleted();
            converted.store_aligned(tag.add(i));
            i += Group::WIDTH;
        }
        // restore the replica mirror now that every tag in [0, G) may have changed
        core::ptr::copy_nonoverlapping(tag, tag.add(capacity), Group::WIDTH.min(capacity));

        let mut i = 0;
        while i < capacity {
            if *tag.add(i) != Tag::DELETED {
                i += 1;
                continue;
            }
            loop {
                let hash = hash_of(&*self.data_at(i));
                let ideal = (hash as usize) & bucket_mask;
                let j = find_empty_or_deleted_slot(tag, bucket_mask, hash);
                let same_group = ((i.wrapping_sub(ideal)) & bucket_mask) / Group::WIDTH
                    == ((j.wrapping_sub(ideal)) & bucket_mask) / Group::WIDTH;
                if same_group {
                    set_tag_mirrored(tag, bucket_mask, i, Tag::full(hash));
                    break;
                } else if *tag.add(j) == Tag::EMPTY {
                    set_tag_mirrored(tag, bucket_mask, j, Tag::full(hash));
                    core::ptr::copy_nonoverlapping(self.data_at(i), self.data_at(j), 1);
                    set_tag_mirrored(tag, bucket_mask, i, Tag::EMPTY);
                    break;
                } else {
                    debug_assert_eq!(*tag.add(j), Tag::DELETED);
                    self.swap_data_raw(i, j);
                    set_tag_mirrored(tag, bucket_mask, j, Tag::full(hash));
                    // `data[i]` now holds the record that was displaced from
                    // `j`, still untagged; loop again for the same `i`.
                }
            }
            i += 1;
        }

        *self.deleted_mut() = 0;
        *self.growth_left_mut() = usable_capacity(capacity) - self.len();
        log::debug!("flat_map: rehashed table in place, capacity={capacity}, remain={}", self.growth_left());
    }

    /// Three-way data swap between `i` and `j` through the scratch swap
    /// slot, leaving both tags untouched. Used only by in-place rehash,
    /// where the caller updates tags itself.
    unsafe fn swap_data_raw(&mut self, i: usize, j: usize) {
        let swap = self.swap_index();
        core::ptr::copy_nonoverlapping(self.data_at(j), self.data_at(swap), 1);
        core::ptr::copy_nonoverlapping(self.data_at(i), self.data_at(j), 1);
        core::ptr::copy_nonoverlapping(self.data_at(swap), self.data_at(i), 1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flat_map::raw::SlotResult;

    fn hash_of(kv: &(u64, u64)) -> u64 {
        // a deliberately bad hash (identity) so tests exercise collisions
        // and the rehash engine's probe-chain preservation under stress.
        kv.0.wrapping_mul(0x9E37_79B9_7F4A_7C15)
    }

    #[test]
    fn growth_preserves_all_keys() {
        let mut t: RawTable<(u64, u64)> = RawTable::new();
        t.ensure_init().unwrap();
        for k in 0..14u64 {
            unsafe {
                if t.growth_left() == 0 {
                    t.rehash_for_insert(hash_of).unwrap();
                }
                let h = hash_of(&(k, 0));
                match t.find_key_or_slot(h, |kv: &(u64, u64)| kv.0 == k) {
                    SlotResult::Vacant(slot) => t.insert_at(slot, h, (k, k * 2)),
                    SlotResult::Occupied(_) => panic!("keys are distinct"),
                }
            }
        }
        assert_eq!(t.len(), 14);
        for k in 0..14u64 {
            unsafe {
                let h = hash_of(&(k, 0));
                let found = t.find_key_or_fail(h, |kv| kv.0 == k);
                assert_eq!(found.map(|i| (*t.data_at(i)).1), Some(k * 2));
            }
        }
    }

    #[test]
    fn in_place_rehash_reclaims_tombstones_without_allocator() {
        let mut t: RawTable<(u64, u64)> = RawTable::with_fixed_capacity(8).unwrap();
        t.ensure_init().unwrap();
        let capacity = t.capacity();
        unsafe {
            // fill to just under capacity, then erase everything to
            // saturate the table with DELETED tags.
            let fill = usable_capacity(capacity);
            for k in 0..fill as u64 {
                let h = hash_of(&(k, 0));
                match t.find_key_or_slot(h, |kv: &(u64, u64)| kv.0 == k) {
                    SlotResult::Vacant(slot) => t.insert_at(slot, h, (k, 0)),
                    SlotResult::Occupied(_) => panic!("keys are distinct"),
                }
            }
            for k in 0..(fill as u64 - 1) {
                let h = hash_of(&(k, 0));
                if let Some(idx) = t.find_key_or_fail(h, |kv| kv.0 == k) {
                    t.erase_at(idx);
                }
            }
            assert_eq!(t.growth_left(), 0);
            t.rehash_for_insert(hash_of).unwrap();
            assert!(t.growth_left() > 0, "in-place rehash must reclaim tombstones");
            // the one record that was never erased must still be found
            let last = fill as u64 - 1;
            let h = hash_of(&(last, 0));
            assert!(t.find_key_or_fail(h, |kv| kv.0 == last).is_some());
        }
    }
}
