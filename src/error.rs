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

//! Error taxonomy for the flat hash table. Hand-rolled rather than built
//! on `thiserror`, matching the texture already found in this crate's
//! `storage`/`monitoring`-style modules: a small, closed set of variants
//! that never changes shape across dependency updates.

use core::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableError {
    /// A null required pointer, a mask that is nonzero but not a
    /// power-of-two-minus-one, or capacity arithmetic that overflowed.
    ArgumentError,
    /// The allocator returned null, or the computed byte count would be
    /// smaller than the table's current block.
    AllocatorError,
    /// Growth was needed on a table with no allocator (a `Fixed` or
    /// `UserReserved` table), or a clear-and-free was requested on one.
    NoAllocationFunction,
    /// A `Fixed` table's declared capacity was exhausted and growth is
    /// not permitted for this storage regime.
    CapacityExhausted,
}

impl fmt::Display for TableError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            TableError::ArgumentError => "invalid argument to flat map operation",
            TableError::AllocatorError => "allocator failed to satisfy request",
            TableError::NoAllocationFunction => "table has no allocator to grow into",
            TableError::CapacityExhausted => "fixed-capacity table is full",
        };
        f.write_str(msg)
    }
}

impl std::error::Error for TableError {}
