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

//! NEON-vectorized group scans for AArch64 hosts.
//!
//! Uses a 64-bit (8-lane) vector rather than the 128-bit register NEON
//! also offers, to keep the group width at 8 tags -- multi-cycle lane
//! latencies on many NEON implementations make the extra width not worth
//! it for a single probe step, and it keeps the replica-group bookkeeping
//! (`super::super::layout`) identical in shape to the portable backend.

use super::super::bitmask::Bitmask;
use super::super::tag::{Tag, DELETED, EMPTY};
use core::arch::aarch64 as neon;
use core::mem;

pub type BitmaskWord = u8;
pub const BITMASK_STRIDE: usize = 1;
pub const BITMASK_MASK: BitmaskWord = 0xff;

#[inline]
fn cmp_to_word(cmp: neon::uint8x8_t) -> BitmaskWord {
    const POWERS: [u8; 8] = [1, 2, 4, 8, 16, 32, 64, 128];
    unsafe {
        let powers = neon::vld1_u8(POWERS.as_ptr());
        let masked = neon::vand_u8(cmp, powers);
        // horizontal add across all 8 lanes collapses the per-lane power-of-two
        // bit into a single byte bitmask.
        neon::vaddv_u8(masked)
    }
}

#[derive(Clone, Copy)]
pub struct Group(neon::uint8x8_t);

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
        Group(neon::vld1_u8(ptr.cast()))
    }

    pub unsafe fn load_aligned(ptr: *const Tag) -> Self {
        Group(neon::vld1_u8(ptr.cast()))
    }

    pub unsafe fn store_aligned(self, ptr: *mut Tag) {
        neon::vst1_u8(ptr.cast(), self.0)
    }

    pub fn match_tag(self, tag: Tag) -> Bitmask {
        unsafe {
            let cmp = neon::vceq_u8(self.0, neon::vdup_n_u8(tag.0));
            Bitmask(cmp_to_word(cmp))
        }
    }

    pub fn match_empty(self) -> Bitmask {
        self.match_tag(Tag(EMPTY))
    }

    pub fn match_deleted(self) -> Bitmask {
        self.match_tag(Tag(DELETED))
    }

    pub fn match_empty_or_deleted(self) -> Bitmask {
        unsafe {
            let cmp = neon::vclt_s8(neon::vreinterpret_s8_u8(self.0), neon::vdup_n_s8(0));
            Bitmask(cmp_to_word(neon::vreinterpret_u8_s8(cmp)))
        }
    }

    pub fn match_full(self) -> Bitmask {
        self.match_empty_or_deleted().invert()
    }

    pub fn match_leading_full(self, start: usize) -> Bitmask {
        let full = self.match_full();
        if start >= Self::WIDTH {
            return Bitmask(0);
        }
        Bitmask(full.0 & !((1u8 << start).wrapping_sub(1)))
    }

    pub fn convert_constant_to_empty_full_to_deleted(self) -> Self {
        unsafe {
            let special = neon::vclt_s8(neon::vreinterpret_s8_u8(self.0), neon::vdup_n_s8(0));
            Group(neon::vorr_u8(
                neon::vreinterpret_u8_s8(special),
                neon::vdup_n_u8(0x80),
            ))
        }
    }
}
