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

//! A binary-heap-backed priority queue. Specified only by its public
//! interface -- push, pop the maximum, peek -- as an external
//! collaborator of the hash table.

use std::collections::BinaryHeap;

#[derive(Debug, Clone, Default)]
pub struct PriorityQueue<T: Ord>(BinaryHeap<T>);

impl<T: Ord> PriorityQueue<T> {
    pub fn new() -> Self {
        PriorityQueue(BinaryHeap::new())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn push(&mut self, value: T) {
        self.0.push(value)
    }

    pub fn pop(&mut self) -> Option<T> {
        self.0.pop()
    }

    pub fn peek(&self) -> Option<&T> {
        self.0.peek()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pop_always_returns_the_current_maximum() {
        let mut q = PriorityQueue::new();
        for v in [3, 1, 4, 1, 5, 9, 2, 6] {
            q.push(v);
        }
        let mut popped = Vec::new();
        while let Some(v) = q.pop() {
            popped.push(v);
        }
        assert_eq!(popped, vec![9, 6, 5, 4, 3, 2, 1, 1]);
    }
}
