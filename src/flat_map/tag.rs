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

//! The one-byte slot metadata tag and its three disjoint states.
//!
//! Wrapped in a single-field tuple struct rather than exposed as a bare
//! `u8` so that tag arrays are never silently reinterpreted as opaque
//! byte slices by the rest of the crate; every read/write goes through
//! this type.

/// All bits set: the slot has never held an element (or was reclaimed by
/// an in-place rehash). Has two high bits set, which is what
/// [`Tag::is_empty`] actually tests for.
pub const EMPTY: u8 = 0xFF;
/// Only the MSB set: the slot held an element that was erased, but may
/// still be bridging some other key's probe chain.
pub const DELETED: u8 = 0x80;

/// `EMPTY XOR DELETED == 0x7F`, i.e. exactly the fingerprint mask -- this
/// is not used directly but documents the invariant relied on by
/// [`group's`](super::group) bit tricks.
const _ASSERT_EMPTY_XOR_DELETED: () = assert!(EMPTY ^ DELETED == 0x7F);

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[repr(transparent)]
pub struct Tag(pub u8);

impl Tag {
    pub const EMPTY: Tag = Tag(EMPTY);
    pub const DELETED: Tag = Tag(DELETED);

    /// Builds the fingerprint tag for a 64-bit hash: the top 7 bits, with
    /// the MSB always clear so it can never collide with `EMPTY`/`DELETED`.
    #[inline]
    pub fn full(hash: u64) -> Tag {
        // shr by (64 - 7) keeps this well-defined regardless of pointer width,
        // unlike the teacher's `h2`, which special-cases 32-bit hosts.
        Tag(((hash >> 57) & 0x7f) as u8)
    }

    /// MSB set <=> special constant (`EMPTY` or `DELETED`).
    #[inline]
    pub const fn is_special(self) -> bool {
        self.0 & 0x80 != 0
    }

    #[inline]
    pub const fn is_full(self) -> bool {
        !self.is_special()
    }

    /// Only `EMPTY` has both of its two high bits set; `DELETED` has only
    /// the top one.
    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 & 0x01 != 0 && self.is_special()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fingerprint_never_collides_with_specials() {
        for hash in [0u64, 1, u64::MAX, 0xdead_beef_1234_5678] {
            let t = Tag::full(hash);
            assert!(t.is_full());
            assert_ne!(t, Tag::EMPTY);
            assert_ne!(t, Tag::DELETED);
        }
    }

    #[test]
    fn special_classification() {
        assert!(Tag::EMPTY.is_special());
        assert!(Tag::EMPTY.is_empty());
        assert!(Tag::DELETED.is_special());
        assert!(!Tag::DELETED.is_empty());
        assert!(!Tag::full(0x1234).is_special());
    }
}
