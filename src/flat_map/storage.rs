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

//! The three memory regimes a table can be built over, and the lazy
//! initializer that unifies them behind one first-touch code path.
//!
//! - `Dynamic` -- the table owns a heap block it grows (and shrinks back
//!   to nothing) itself, via the global allocator.
//! - `Fixed` -- the table owns exactly one heap block, sized once at
//!   construction and never reallocated; this is the "compile-time/stack"
//!   regime of spec.md §1. It is realized as a single owned allocation
//!   (rather than a literal inline `[T; N]` array) because the tag array
//!   requires `Group::WIDTH` alignment that a boxed byte slice cannot
//!   promise and that an inline array would force into a self-referential
//!   struct; see DESIGN.md for the tradeoff. The observable contract is
//!   still "reserved once, never grown, never reallocated".
//! - `UserReserved` -- the caller supplies a raw buffer (e.g. memory-
//!   mapped, arena-allocated, or owned across an FFI boundary) that the
//!   table reads and writes but never frees.

use super::layout::calculate_layout;
use crate::error::TableError;
use core::alloc::Layout;
use core::ptr::NonNull;

pub(super) enum Storage {
    /// Heap-growing. `None` until the first allocation (mirrors the
    /// `tag == NULL` sentinel of spec.md §4.4).
    Dynamic(Option<Layout>),
    /// One heap block and its layout, allocated eagerly at construction,
    /// never resized; freed on `Drop` like `Dynamic`'s block.
    Fixed(Layout),
    /// Caller-owned memory; never allocated or freed by this table.
    UserReserved,
}

impl Storage {
    pub fn allows_growth(&self) -> bool {
        matches!(self, Storage::Dynamic(_))
    }

    pub fn has_allocator(&self) -> bool {
        matches!(self, Storage::Dynamic(_))
    }
}

/// Allocates a zeroed block (not zeroed for data, only logically owned;
/// the tag array is memset to `EMPTY` separately by the caller) large
/// enough for `capacity` buckets of `T`. Returns the block base pointer
/// and the byte offset of the tag array within it.
pub(super) unsafe fn alloc_block<T>(capacity: usize) -> Result<(NonNull<u8>, usize, Layout), TableError> {
    let (layout, tag_offset) = calculate_layout::<T>(capacity).ok_or(TableError::ArgumentError)?;
    let ptr = std::alloc::alloc(layout);
    let ptr = NonNull::new(ptr).ok_or(TableError::AllocatorError)?;
    Ok((ptr, tag_offset, layout))
}

pub(super) unsafe fn dealloc_block(ptr: NonNull<u8>, layout: Layout) {
    std::alloc::dealloc(ptr.as_ptr(), layout);
}
