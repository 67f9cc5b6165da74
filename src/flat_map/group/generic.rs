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

//! Portable SWAR implementation, used whenever neither SSE2 nor NEON is
//! available, and also forced on by the `portable` feature for testing.
//!
//! Note about `GroupWord`: we pick the target's pointer word width rather
//! than blindly using 64 bits everywhere, since doing so on a genuinely
//! 32-bit host would only add avoidable work.

use super::super::bitmask::Bitmask;
use super::super::tag::{Tag, DELETED, EMPTY};
use core::mem;
use core::ptr;

cfg_if::cfg_if! {
    if #[cfg(any(target_pointer_width = "64", target_arch = "x86_64", target_arch = "aarch64"))] {
        type GroupWord = u64;
    } else {
        type GroupWord = u32;
    }
}

pub type BitmaskWord = GroupWord;
pub const BITMASK_STRIDE: usize = 8;
#[allow(clippy::unnecessary_cast)]
pub const BITMASK_MASK: BitmaskWord = 0x8080_8080_8080_8080_u64 as BitmaskWord;

fn repeat(byte: u8) -> GroupWord {
    GroupWord::from_ne_bytes([byte; Group::WIDTH])
}

/// A group of control tags scanned in parallel via word-at-a-time tricks.
#[derive(Clone, Copy)]
pub struct Group(GroupWord);

impl Group {
    pub const WIDTH: usize = mem::size_of::<Self>();

    pub const fn empty_static() -> &'static [u8; Group::WIDTH] {
        #[repr(C)]
        struct Aligned {
            _align: [Group; 0],
            bytes: [u8; Group::WIDTH],
        }
        const ALIGNED: Aligned = Aligned {
            _align: [],
            bytes: [EMPTY; Group::WIDTH],
        };
        &ALIGNED.bytes
    }

    pub unsafe fn load_unaligned(ptr: *const Tag) -> Self {
        Group(ptr::read_unaligned(ptr.cast()))
    }

    pub unsafe fn load_aligned(ptr: *const Tag) -> Self {
        Group(ptr::read(ptr.cast()))
    }

    pub unsafe fn store_aligned(self, ptr: *mut Tag) {
        ptr::write(ptr.cast(), self.0)
    }

    /// May return false positives on bytes that merely differ in their
    /// lowest bit; harmless here since the MSB can never be spuriously
    /// set (so `EMPTY`/`DELETED` are never matched by a full-tag probe)
    /// and the subsequent key-equality check filters any remaining false
    /// positive.
    pub fn match_tag(self, tag: Tag) -> Bitmask {
        let cmp = self.0 ^ repeat(tag.0);
        Bitmask((cmp.wrapping_sub(repeat(0x01)) & !cmp & repeat(0x80)).to_le())
    }

    pub fn match_empty(self) -> Bitmask {
        Bitmask((self.0 & (self.0 << 1)) & repeat(0x80).to_le())
    }

    pub fn match_deleted(self) -> Bitmask {
        self.match_tag(Tag(DELETED))
    }

    pub fn match_empty_or_deleted(self) -> Bitmask {
        Bitmask((self.0 & repeat(0x80)).to_le())
    }

    pub fn match_full(self) -> Bitmask {
        self.match_empty_or_deleted().invert()
    }

    /// Full positions strictly after `start` within this group; used by
    /// iteration to resume mid-group.
    pub fn match_leading_full(self, start: usize) -> Bitmask {
        let full = self.match_full();
        if start >= Self::WIDTH {
            Bitmask(0)
        } else if start == 0 {
            full
        } else {
            let clear_mask = !(((1u64 << (start * BITMASK_STRIDE)) - 1) as BitmaskWord);
            Bitmask(full.0 & clear_mask)
        }
    }

    /// `EMPTY`/`DELETED` (special) => `EMPTY`; `FULL` => `DELETED`.
    /// Used exclusively by in-place rehash; the low-7 fingerprint of a
    /// formerly-full tag is deliberately destroyed here so the rehash
    /// walk knows to recompute it from the key.
    pub fn convert_constant_to_empty_full_to_deleted(self) -> Self {
        let full = !self.0 & repeat(0x80);
        Group(!full + (full >> 7))
    }
}
