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

//! The abstract, bit-indexed view over a group scan's match result.
//!
//! The underlying word shape differs per backend (a 16-bit word with one
//! bit per lane on SSE2, a 64-bit word with one MSB-per-byte on the
//! portable/NEON backends) but every operation here is specified purely in
//! terms of "which of the `G` lanes matched", so algorithm code never has
//! to know which backend produced the mask.

use super::group::imp::{BitmaskWord, BITMASK_MASK, BITMASK_STRIDE};

#[derive(Clone, Copy)]
pub struct Bitmask(pub BitmaskWord);

impl Bitmask {
    /// Inverts every lane's matched bit.
    pub fn invert(self) -> Self {
        Self(self.0 ^ BITMASK_MASK)
    }

    /// Returns the lowest matching lane index, if any.
    pub fn trailing_one(self) -> Option<usize> {
        if self.0 == 0 {
            None
        } else {
            Some(self.trailing_zeros())
        }
    }

    /// Same as [`Self::trailing_one`] but UB if no lane matched -- only
    /// call this once [`Self::has_one`] is known true.
    pub unsafe fn trailing_one_unchecked(self) -> usize {
        self.trailing_zeros()
    }

    pub fn remove_lowest_one(self) -> Self {
        Bitmask(self.0 & (self.0.wrapping_sub(1)))
    }

    pub fn has_one(self) -> bool {
        self.0 != 0
    }

    pub fn trailing_zeros(self) -> usize {
        if cfg!(target_arch = "arm") && BITMASK_STRIDE % 8 == 0 {
            // ARM pre-v7 lacks a trailing-zero-count instruction; reverse
            // the bytes and count leading zeros instead.
            self.0.swap_bytes().leading_zeros() as usize / BITMASK_STRIDE
        } else {
            self.0.trailing_zeros() as usize / BITMASK_STRIDE
        }
    }

    pub fn leading_zeros(self) -> usize {
        self.0.leading_zeros() as usize / BITMASK_STRIDE
    }

    /// Flips the matched bit at `index`; returns whether it was unset
    /// before the flip.
    pub unsafe fn flip(&mut self, index: usize) -> bool {
        let mask = 1 << (index * BITMASK_STRIDE + BITMASK_STRIDE - 1);
        self.0 ^= mask;
        self.0 & mask == 0
    }
}

pub struct BitmaskIter(Bitmask);

impl Iterator for BitmaskIter {
    type Item = usize;
    fn next(&mut self) -> Option<usize> {
        let bit = self.0.trailing_one()?;
        self.0 = self.0.remove_lowest_one();
        Some(bit)
    }
}

impl IntoIterator for Bitmask {
    type IntoIter = BitmaskIter;
    type Item = usize;
    fn into_iter(self) -> Self::IntoIter {
        BitmaskIter(self)
    }
}
