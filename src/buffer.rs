//
// s3-version-scan - walks the version history of an S3 bucket and summarises
//                   recent delete markers and noncurrent versions within a
//                   bounded amount of memory.
//
// Copyright (C) 2023 Jonathan Davies
// 
// Permission is hereby granted, free of charge, to any person obtaining a copy
// of this software and associated documentation files (the "Software"), to deal
// in the Software without restriction, including without limitation the rights
// to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
// copies of the Software, and to permit persons to whom the Software is
// furnished to do so, subject to the following conditions:
// 
// The above copyright notice and this permission notice shall be included in all
// copies or substantial portions of the Software.
// 
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
// IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
// FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
// AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
// LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
// OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE
// SOFTWARE.
//

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

use crate::types::DeleteMarkerRecord;

/// Retains the `capacity` most recent delete markers seen so far.
///
/// Backed by a min-heap keyed on `(last_modified, arrival)`, so eviction of
/// the oldest retained marker is `O(log n)`. Arrival order only matters on a
/// timestamp tie, where the marker seen later wins.
#[derive(Debug)]
pub struct DeleteMarkerBuffer {
    capacity: usize,
    arrivals: u64,
    heap: BinaryHeap<Reverse<Ranked>>,
}

#[derive(Debug)]
struct Ranked {
    arrival: u64,
    record: DeleteMarkerRecord,
}

impl Ranked {
    fn rank(&self) -> (chrono::DateTime<chrono::Utc>, u64) {
        (self.record.last_modified, self.arrival)
    }
}

impl PartialEq for Ranked {
    fn eq(&self, other: &Self) -> bool {
        self.rank() == other.rank()
    }
}

impl Eq for Ranked {}

impl PartialOrd for Ranked {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Ranked {
    fn cmp(&self, other: &Self) -> Ordering {
        self.rank().cmp(&other.rank())
    }
}

impl DeleteMarkerBuffer {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            arrivals: 0,
            // Grows on demand; a huge cap must not allocate up front.
            heap: BinaryHeap::new(),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Offers a marker to the buffer. Returns whether it was retained.
    pub fn offer(&mut self, record: DeleteMarkerRecord) -> bool {
        if self.capacity == 0 {
            return false;
        }

        self.arrivals += 1;
        let candidate = Ranked {
            arrival: self.arrivals,
            record,
        };

        if self.heap.len() < self.capacity {
            self.heap.push(Reverse(candidate));
            return true;
        }

        match self.heap.peek_mut() {
            Some(mut oldest) if candidate > oldest.0 => {
                *oldest = Reverse(candidate);
                true
            }
            _ => false,
        }
    }

    /// Most recent first.
    pub fn into_sorted_vec(self) -> Vec<DeleteMarkerRecord> {
        // Ascending order of Reverse<_> is descending order of the rank.
        self.heap
            .into_sorted_vec()
            .into_iter()
            .map(|Reverse(ranked)| ranked.record)
            .collect()
    }
}
