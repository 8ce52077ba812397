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

use chrono::{DateTime, Utc};
use serde::Serialize;

/// One object version as returned by a version listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VersionRecord {
    pub key: String,
    pub version_id: String,
    pub last_modified: DateTime<Utc>,
    pub size: u64,
    pub is_latest: bool,
}

/// One delete marker as returned by a version listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeleteMarkerRecord {
    pub key: String,
    pub version_id: String,
    pub last_modified: DateTime<Utc>,
    pub is_latest: bool,
}

/// A single page of a version listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VersionPage {
    pub versions: Vec<VersionRecord>,
    pub delete_markers: Vec<DeleteMarkerRecord>,
}

impl VersionPage {
    pub fn is_empty(&self) -> bool {
        self.versions.is_empty() && self.delete_markers.is_empty()
    }
}

/// Running totals for the noncurrent versions of a single key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NoncurrentAggregate {
    pub count: u64,
    pub total_size: u64,
    pub latest_modified: DateTime<Utc>,
}

impl NoncurrentAggregate {
    pub(crate) fn first(record: &VersionRecord) -> Self {
        Self {
            count: 1,
            total_size: record.size,
            latest_modified: record.last_modified,
        }
    }

    pub(crate) fn absorb(&mut self, record: &VersionRecord) {
        self.count += 1;
        self.total_size = self.total_size.saturating_add(record.size);
        if record.last_modified > self.latest_modified {
            self.latest_modified = record.last_modified;
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NoncurrentSummary {
    pub key: String,
    #[serde(flatten)]
    pub aggregate: NoncurrentAggregate,
}

/// The trailing range of modification times a scan considers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimeWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeWindow {
    pub fn contains(&self, timestamp: &DateTime<Utc>) -> bool {
        *timestamp >= self.start
    }
}

/// Summary produced by a scan.
///
/// The three counters are true totals and are never capped. The detail
/// lists are capped by the scan configuration, and `truncated` is set
/// whenever they hold less than the totals describe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScanResult {
    pub total_versions_scanned: u64,
    pub total_delete_markers_seen: u64,
    pub noncurrent_version_count: u64,
    /// Sorted descending by `latest_modified`.
    pub noncurrent_aggregates: Vec<NoncurrentSummary>,
    /// Sorted descending by `last_modified`.
    pub delete_markers: Vec<DeleteMarkerRecord>,
    pub time_window: TimeWindow,
    pub truncated: bool,
    pub pages_scanned: u64,
}

impl ScanResult {
    pub fn objects_with_noncurrent(&self) -> usize {
        self.noncurrent_aggregates.len()
    }

    pub fn tracked_noncurrent_versions(&self) -> u64 {
        self.noncurrent_aggregates
            .iter()
            .map(|summary| summary.aggregate.count)
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn version(size: u64, day: u32) -> VersionRecord {
        VersionRecord {
            key: "a".to_string(),
            version_id: format!("v{day}"),
            last_modified: Utc.with_ymd_and_hms(2026, 9, day, 0, 0, 0).unwrap(),
            size,
            is_latest: false,
        }
    }

    #[test]
    fn aggregate_keeps_latest_timestamp() {
        let mut aggregate = NoncurrentAggregate::first(&version(10, 5));
        aggregate.absorb(&version(20, 9));
        aggregate.absorb(&version(5, 1));

        assert_eq!(aggregate.count, 3);
        assert_eq!(aggregate.total_size, 35);
        assert_eq!(
            aggregate.latest_modified,
            Utc.with_ymd_and_hms(2026, 9, 9, 0, 0, 0).unwrap()
        );
    }

    #[test]
    fn window_start_is_inclusive() {
        let start = Utc.with_ymd_and_hms(2026, 7, 20, 0, 0, 0).unwrap();
        let window = TimeWindow {
            start,
            end: Utc.with_ymd_and_hms(2026, 10, 18, 0, 0, 0).unwrap(),
        };

        assert!(window.contains(&start));
        assert!(!window.contains(&(start - chrono::Duration::seconds(1))));
    }

    #[test]
    fn summary_serializes_flat() {
        let summary = NoncurrentSummary {
            key: "a".to_string(),
            aggregate: NoncurrentAggregate::first(&version(7, 3)),
        };
        let value = serde_json::to_value(&summary).unwrap();

        assert_eq!(value["key"], "a");
        assert_eq!(value["count"], 1);
        assert_eq!(value["total_size"], 7);
    }
}
