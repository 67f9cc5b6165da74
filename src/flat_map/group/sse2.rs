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

//! SSE2-vectorized group scans, for x86/x86_64 hosts that support them.

use super::super::bitmask::Bitmask;
use super::super::tag::{Tag, DELETED, EMPTY};

#[cfg(target_arch = "x86")]
use core::arch::x86;
#[cfg(target_arch = "x86_64")]
use core::arch::x86_64 as x86;
use core::mem;

pub type BitmaskWord = u16;
pub const BITMASK_STRIDE: usize = 1;
pub const BITMASK_MASK: BitmaskWord = 0xffff;

#[derive(Clone, Copy)]
pub struct Group(x86::__m128i);

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
        Group(x86::_mm_loadu_si128(ptr.cast()))
    }

    pub unsafe fn load_aligned(ptr: *const Tag) -> Self {
        Group(x86::_mm_load_si128(ptr.cast()))
    }

    pub unsafe fn store_aligned(self, ptr: *mut Tag) {
        x86::_mm_store_si128(ptr.cast(), self.0)
    }

    pub fn match_tag(self, tag: Tag) -> Bitmask {
        unsafe {
            let cmp = x86::_mm_cmpeq_epi8(self.0, x86::_mm_set1_epi8(tag.0 as i8));
            Bitmask(x86::_mm_movemask_epi8(cmp) as u16)
        }
    }

    pub fn match_empty(self) -> Bitmask {
        self.match_tag(Tag(EMPTY))
    }

    pub fn match_deleted(self) -> Bitmask {
        self.match_tag(Tag(DELETED))
    }

    pub fn match_empty_or_deleted(self) -> Bitmask {
        unsafe { Bitmask(x86::_mm_movemask_epi8(self.0) as u16) }
    }

    pub fn match_full(self) -> Bitmask {
        self.match_empty_or_deleted().invert()
    }

    pub fn match_leading_full(self, start: usize) -> Bitmask {
        let full = self.match_full();
        if start >= Self::WIDTH {
            return Bitmask(0);
        }
        Bitmask(full.0 & !((1u16 << start).wrapping_sub(1)))
    }

    pub fn convert_constant_to_empty_full_to_deleted(self) -> Self {
        unsafe {
            let zero = x86::_mm_setzero_si128();
            let special = x86::_mm_cmpgt_epi8(zero, self.0);
            Group(x86::_mm_or_si128(
                special,
                x86::_mm_set1_epi8(0b1000_0000_u8 as i8),
            ))
        }
    }
}
