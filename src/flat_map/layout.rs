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

//! Byte layout and capacity arithmetic.
//!
//! The contiguous block, when the table owns its storage, looks like:
//!
//! ```text
//! | data[0] | data[1] | .. | data[capacity-1] | swap_slot | pad* | tag[0..capacity] | tag_replica[0..G] |
//! ```
//!
//! `tag` is aligned to `Group::WIDTH` so aligned group loads/stores are
//! well-defined; `swap_slot` is the scratch element used by in-place
//! rehash (spec.md §4.7) and by the entry swap primitive (spec.md §4.8).

use super::group::Group;
use super::tag::Tag;
use core::alloc::Layout;
use core::mem;

pub const LOAD_FACTOR_NUMERATOR: usize = 7;
pub const LOAD_FACTOR_DENOMINATOR: usize = 8;

/// The maximum number of *usable* (full) slots for a table whose capacity
/// (bucket count) is `capacity`.
#[inline]
pub const fn usable_capacity(capacity: usize) -> usize {
    if capacity == 0 {
        0
    } else {
        (capacity / LOAD_FACTOR_DENOMINATOR) * LOAD_FACTOR_NUMERATOR
    }
}

/// Smallest power-of-two capacity, at least `Group::WIDTH`, that can hold
/// `n` elements under the 7/8 load factor -- or `None` on overflow.
pub fn capacity_for(n: usize) -> Option<usize> {
    if n == 0 {
        return Some(0);
    }
    let scaled = n.checked_mul(LOAD_FACTOR_DENOMINATOR)?;
    let adjusted = (scaled.checked_add(LOAD_FACTOR_NUMERATOR - 1)?) / LOAD_FACTOR_NUMERATOR;
    let pow2 = adjusted.next_power_of_two();
    Some(pow2.max(Group::WIDTH))
}

/// Layout of the contiguous allocation for `capacity` buckets of a `T`
/// record, and the byte offset at which the tag array begins.
pub struct TableLayout {
    elem_size: usize,
    elem_align: usize,
}

impl TableLayout {
    pub fn new<T>() -> Self {
        let l = Layout::new::<T>();
        TableLayout {
            elem_size: l.size(),
            elem_align: l.align(),
        }
    }

    /// Returns `(full block layout, tag array byte offset)` for `capacity`
    /// buckets (plus the one swap slot and the replica group), or `None`
    /// on arithmetic overflow.
    pub fn calculate(&self, capacity: usize) -> Option<(Layout, usize)> {
        let tag_align = usize::max(self.elem_align, Group::WIDTH);
        // data[0..capacity] + swap_slot, then padded up to tag_align
        let data_bytes = self.elem_size.checked_mul(capacity.checked_add(1)?)?;
        let tag_offset = (data_bytes.checked_add(tag_align - 1)?) & !(tag_align - 1);
        let total = tag_offset.checked_add(capacity.checked_add(Group::WIDTH)?)?;
        Some((Layout::from_size_align(total, tag_align).ok()?, tag_offset))
    }
}

pub fn calculate_layout<T>(capacity: usize) -> Option<(Layout, usize)> {
    TableLayout::new::<T>().calculate(capacity)
}

/// Mirrors `tag[i]` into the replica slot `capacity + i` whenever `i <
/// Group::WIDTH`, preserving the invariant that any unaligned group load
/// starting at an index up to `capacity - 1` reads a coherent, ring-
/// wrapped view.
#[inline]
pub unsafe fn set_tag_mirrored(tag_base: *mut Tag, bucket_mask: usize, index: usize, value: Tag) {
    *tag_base.add(index) = value;
    if index < Group::WIDTH {
        *tag_base.add(bucket_mask + 1 + index) = value;
    }
}

#[inline]
pub const fn round_up_to_group(n: usize) -> usize {
    (n + Group::WIDTH - 1) & !(Group::WIDTH - 1)
}

const _ASSERT_SIZE: () = assert!(mem::size_of::<Tag>() == 1);
