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

//! The triangular probe sequence: stride grows as `T(k) = k*(k+1)/2 * G`,
//! which is provably a permutation of every group position on a
//! power-of-two-sized table (see
//! <https://fgiesen.wordpress.com/2015/02/22/triangular-numbers-mod-2n>),
//! so a probe walk visits every group exactly once and terminates as soon
//! as it meets an empty slot.

use super::group::Group;

pub struct ProbeSequence {
    pub pos: usize,
    stride: usize,
}

impl ProbeSequence {
    #[inline]
    pub fn new(hash: u64, bucket_mask: usize) -> Self {
        ProbeSequence {
            pos: (hash as usize) & bucket_mask,
            stride: 0,
        }
    }

    #[inline]
    pub fn move_to_next(&mut self, bucket_mask: usize) {
        self.stride += Group::WIDTH;
        self.pos += self.stride;
        self.pos &= bucket_mask;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn visits_every_group_exactly_once() {
        for shift in 3..=10 {
            let buckets = 1usize << shift;
            let bucket_mask = buckets - 1;
            let groups = (buckets / Group::WIDTH).max(1);
            let mut seen = vec![false; groups.max(1)];
            let mut seq = ProbeSequence::new(0x1357_9bdf, bucket_mask);
            for _ in 0..groups {
                let g = seq.pos / Group::WIDTH;
                assert!(!seen[g], "group {g} visited twice at buckets={buckets}");
                seen[g] = true;
                seq.move_to_next(bucket_mask);
            }
            assert!(seen.iter().all(|&v| v));
        }
    }
}
