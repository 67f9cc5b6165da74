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

//! The SIMD-accelerated open-addressed hash table. See the crate root for
//! the module-level overview; `table` is the only module meant to be used
//! directly by callers, re-exported from `lib.rs`.

mod bitmask;
pub(crate) mod entry;
mod group;
pub(crate) mod iter;
mod layout;
mod probe;
pub(crate) mod raw;
mod rehash;
mod storage;
pub(crate) mod table;
mod tag;
mod util;
