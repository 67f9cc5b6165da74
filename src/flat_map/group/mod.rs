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

//! Group scan primitives: a build-time choice of SSE2, NEON or a portable
//! SWAR implementation, all exposing the identical `Group` contract so the
//! rest of the crate never has to branch on architecture.

mod generic;
#[cfg(all(target_arch = "aarch64", target_feature = "neon"))]
mod neon;
#[cfg(all(
    any(target_arch = "x86", target_arch = "x86_64"),
    target_feature = "sse2"
))]
mod sse2;

cfg_if::cfg_if! {
    if #[cfg(feature = "portable")] {
        pub use super::group::generic as imp;
    } else if #[cfg(all(
        any(target_arch = "x86", target_arch = "x86_64"),
        target_feature = "sse2"
    ))] {
        pub use super::group::sse2 as imp;
    } else if #[cfg(all(target_arch = "aarch64", target_feature = "neon"))] {
        pub use super::group::neon as imp;
    } else {
        pub use super::group::generic as imp;
    }
}

pub use imp::Group;
