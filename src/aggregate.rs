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

use std::collections::HashMap;

use crate::types::{NoncurrentAggregate, NoncurrentSummary, VersionRecord};

/// Per-key noncurrent version totals for at most `capacity` distinct keys.
///
/// Keys already tracked keep accumulating once the cap is reached. Keys first
/// seen after that are not tracked; only the fact that one was dropped is
/// remembered.
#[derive(Debug)]
pub struct NoncurrentTracker {
    capacity: usize,
    by_key: HashMap<String, NoncurrentAggregate>,
    tracked_versions: u64,
    keys_dropped: bool,
}

impl NoncurrentTracker {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            by_key: HashMap::new(),
            tracked_versions: 0,
            keys_dropped: false,
        }
    }

    pub fn len(&self) -> usize {
        self.by_key.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_key.is_empty()
    }

    /// Sum of the counts of every tracked key.
    pub fn tracked_versions(&self) -> u64 {
        self.tracked_versions
    }

    pub fn keys_dropped(&self) -> bool {
        self.keys_dropped
    }

    /// Records a noncurrent version. Returns whether its key is tracked.
    pub fn record(&mut self, version: &VersionRecord) -> bool {
        if let Some(aggregate) = self.by_key.get_mut(&version.key) {
            aggregate.absorb(version);
        } else if self.by_key.len() < self.capacity {
            self.by_key
                .insert(version.key.clone(), NoncurrentAggregate::first(version));
        } else {
            self.keys_dropped = true;
            return false;
        }

        self.tracked_versions += 1;
        true
    }

    /// Most recently modified first, then by key.
    pub fn into_sorted(self) -> Vec<NoncurrentSummary> {
        let mut summaries: Vec<NoncurrentSummary> = self
            .by_key
            .into_iter()
            .map(|(key, aggregate)| NoncurrentSummary { key, aggregate })
            .collect();
        summaries.sort_by(|a, b| {
            b.aggregate
                .latest_modified
                .cmp(&a.aggregate.latest_modified)
                .then_with(|| a.key.cmp(&b.key))
        });
        summaries
    }
}
