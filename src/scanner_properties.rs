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

// Property tests for the bounded version scanner.
//
// Whatever the input, the retained detail never exceeds its cap, the true
// totals never undercount the detail, and every delete marker strictly more
// recent than the oldest retained one is retained.

#[cfg(test)]
mod tests {
    use chrono::{DateTime, Duration, TimeZone, Utc};
    use proptest::prelude::*;

    use crate::scanner::VersionScanner;
    use crate::types::{DeleteMarkerRecord, ScanResult, TimeWindow, VersionPage, VersionRecord};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 18, 0, 0, 0).unwrap()
    }

    fn window() -> TimeWindow {
        TimeWindow {
            start: now() - Duration::days(90),
            end: now(),
        }
    }

    // (key index, minutes ago, is_latest); minutes reach past the window.
    fn arb_marker() -> impl Strategy<Value = DeleteMarkerRecord> {
        (0u8..20, 0i64..200_000, any::<bool>()).prop_map(|(key, minutes_ago, is_latest)| {
            DeleteMarkerRecord {
                key: format!("key-{key}"),
                version_id: format!("dm-{minutes_ago}"),
                last_modified: now() - Duration::minutes(minutes_ago),
                is_latest,
            }
        })
    }

    fn arb_version() -> impl Strategy<Value = VersionRecord> {
        (0u8..20, 0i64..200_000, 0u64..10_000, any::<bool>()).prop_map(
            |(key, minutes_ago, size, is_latest)| VersionRecord {
                key: format!("key-{key}"),
                version_id: format!("v-{minutes_ago}"),
                last_modified: now() - Duration::minutes(minutes_ago),
                size,
                is_latest,
            },
        )
    }

    fn arb_pages() -> impl Strategy<Value = Vec<VersionPage>> {
        prop::collection::vec(
            (
                prop::collection::vec(arb_version(), 0..20),
                prop::collection::vec(arb_marker(), 0..20),
            )
                .prop_map(|(versions, delete_markers)| VersionPage {
                    versions,
                    delete_markers,
                }),
            0..8,
        )
    }

    fn run(pages: &[VersionPage], max_markers: usize, max_keys: usize) -> ScanResult {
        let mut scanner = VersionScanner::with_window(window(), max_markers, max_keys);
        for page in pages {
            scanner.ingest(page);
        }
        scanner.finish()
    }

    proptest! {
        #[test]
        fn detail_never_exceeds_caps(
            pages in arb_pages(),
            max_markers in 0usize..10,
            max_keys in 0usize..10,
        ) {
            let result = run(&pages, max_markers, max_keys);

            prop_assert!(result.delete_markers.len() <= max_markers);
            prop_assert!(result.noncurrent_aggregates.len() <= max_keys);
        }

        #[test]
        fn totals_never_undercount_detail(
            pages in arb_pages(),
            max_markers in 0usize..10,
            max_keys in 0usize..10,
        ) {
            let result = run(&pages, max_markers, max_keys);

            prop_assert!(result.total_delete_markers_seen >= result.delete_markers.len() as u64);
            prop_assert!(result.noncurrent_version_count >= result.tracked_noncurrent_versions());
            prop_assert!(result.total_versions_scanned >= result.noncurrent_version_count);
            let markers_complete =
                result.total_delete_markers_seen == result.delete_markers.len() as u64;
            prop_assert_eq!(
                markers_complete,
                result.total_delete_markers_seen <= max_markers as u64
            );
        }

        #[test]
        fn retains_every_clearly_recent_marker(
            pages in arb_pages(),
            max_markers in 1usize..10,
        ) {
            let result = run(&pages, max_markers, 10);
            let window = window();

            if let Some(oldest) = result.delete_markers.last() {
                for marker in pages.iter().flat_map(|page| page.delete_markers.iter()) {
                    if marker.is_latest
                        && window.contains(&marker.last_modified)
                        && marker.last_modified > oldest.last_modified
                    {
                        prop_assert!(result.delete_markers.contains(marker));
                    }
                }
            }
            prop_assert!(result
                .delete_markers
                .windows(2)
                .all(|pair| pair[0].last_modified >= pair[1].last_modified));
        }

        #[test]
        fn rescanning_gives_identical_counters(
            pages in arb_pages(),
            max_markers in 0usize..10,
            max_keys in 0usize..10,
        ) {
            let first = run(&pages, max_markers, max_keys);
            let second = run(&pages, max_markers, max_keys);

            prop_assert_eq!(first.total_versions_scanned, second.total_versions_scanned);
            prop_assert_eq!(first.total_delete_markers_seen, second.total_delete_markers_seen);
            prop_assert_eq!(first.noncurrent_version_count, second.noncurrent_version_count);
            prop_assert_eq!(first.delete_markers.len(), second.delete_markers.len());
        }

        #[test]
        fn truncated_iff_detail_is_short(
            pages in arb_pages(),
            max_markers in 0usize..10,
            max_keys in 0usize..10,
        ) {
            let result = run(&pages, max_markers, max_keys);

            let expected = result.total_delete_markers_seen > result.delete_markers.len() as u64
                || result.noncurrent_version_count > result.tracked_noncurrent_versions();
            prop_assert_eq!(result.truncated, expected);
        }
    }
}
