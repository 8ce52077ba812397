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
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::aggregate::NoncurrentTracker;
use crate::buffer::DeleteMarkerBuffer;
use crate::config::ScanConfig;
use crate::error::ScanError;
use crate::source::PageSource;
use crate::types::{ScanResult, TimeWindow, VersionPage};

const PROGRESS_INTERVAL_PAGES: u64 = 10;

/// State of one scan over a bucket's version history.
///
/// Counters are true totals. Detail structures are capped by the
/// [`ScanConfig`] the scanner was created with, so memory stays bounded no
/// matter how many records are fed in.
#[derive(Debug)]
pub struct VersionScanner {
    window: TimeWindow,
    total_versions: u64,
    total_delete_markers: u64,
    noncurrent_count: u64,
    pages: u64,
    delete_markers: DeleteMarkerBuffer,
    noncurrent: NoncurrentTracker,
}

impl VersionScanner {
    pub fn new(config: &ScanConfig, now: DateTime<Utc>) -> Result<Self, ScanError> {
        Ok(Self::with_window(
            config.time_window(now)?,
            config.max_delete_markers,
            config.max_noncurrent_keys,
        ))
    }

    pub fn with_window(
        window: TimeWindow,
        max_delete_markers: usize,
        max_noncurrent_keys: usize,
    ) -> Self {
        Self {
            window,
            total_versions: 0,
            total_delete_markers: 0,
            noncurrent_count: 0,
            pages: 0,
            delete_markers: DeleteMarkerBuffer::new(max_delete_markers),
            noncurrent: NoncurrentTracker::new(max_noncurrent_keys),
        }
    }

    pub fn pages_scanned(&self) -> u64 {
        self.pages
    }

    pub fn total_delete_markers(&self) -> u64 {
        self.total_delete_markers
    }

    pub fn noncurrent_count(&self) -> u64 {
        self.noncurrent_count
    }

    /// Folds one page into the counters and the capped details.
    pub fn ingest(&mut self, page: &VersionPage) {
        self.pages += 1;

        for marker in &page.delete_markers {
            if !marker.is_latest || !self.window.contains(&marker.last_modified) {
                continue;
            }
            self.total_delete_markers += 1;
            self.delete_markers.offer(marker.clone());
        }

        for version in &page.versions {
            if !self.window.contains(&version.last_modified) {
                continue;
            }
            self.total_versions += 1;
            if !version.is_latest {
                self.noncurrent_count += 1;
                self.noncurrent.record(version);
            }
        }
    }

    /// Updates the counters from a page without keeping any detail.
    pub fn count_only(&mut self, page: &VersionPage) {
        self.pages += 1;

        self.total_delete_markers += page
            .delete_markers
            .iter()
            .filter(|marker| marker.is_latest && self.window.contains(&marker.last_modified))
            .count() as u64;

        for version in &page.versions {
            if self.window.contains(&version.last_modified) {
                self.total_versions += 1;
                if !version.is_latest {
                    self.noncurrent_count += 1;
                }
            }
        }
    }

    pub fn finish(self) -> ScanResult {
        let truncated = self.total_delete_markers > self.delete_markers.len() as u64
            || self.noncurrent_count > self.noncurrent.tracked_versions();
        if self.noncurrent.keys_dropped() {
            debug!(
                tracked_keys = self.noncurrent.len(),
                "noncurrent key limit reached, further keys were not tracked."
            );
        }

        ScanResult {
            total_versions_scanned: self.total_versions,
            total_delete_markers_seen: self.total_delete_markers,
            noncurrent_version_count: self.noncurrent_count,
            noncurrent_aggregates: self.noncurrent.into_sorted(),
            delete_markers: self.delete_markers.into_sorted_vec(),
            time_window: self.window,
            truncated,
            pages_scanned: self.pages,
        }
    }

    fn log_progress(&self) {
        if self.pages % PROGRESS_INTERVAL_PAGES == 0 {
            info!(
                pages = self.pages,
                delete_markers = self.total_delete_markers,
                noncurrent_versions = self.noncurrent_count,
                "scanning version history."
            );
        }
    }
}

/// Pulls every page from `source` and summarises it.
///
/// Pages are consumed strictly one at a time. Cancellation is honoured
/// between pages. If the source fails after some progress was made, the
/// remaining pages are counted once on a best-effort basis and the result
/// is returned inside [`ScanError::Partial`].
pub async fn scan<S>(
    source: &mut S,
    config: &ScanConfig,
    cancellation_token: &CancellationToken,
) -> Result<ScanResult, ScanError>
where
    S: PageSource + ?Sized,
{
    config.validate()?;
    let mut scanner = VersionScanner::new(config, Utc::now())?;

    debug!(window_start = %scanner.window.start, "version scan has started.");

    loop {
        if cancellation_token.is_cancelled() {
            info!(pages = scanner.pages, "version scan cancelled.");
            return Err(ScanError::Cancelled {
                result: Box::new(scanner.finish()),
            });
        }

        match source.next_page().await {
            Ok(Some(page)) => {
                scanner.ingest(&page);
                scanner.log_progress();
            }
            Ok(None) => break,
            Err(e) if scanner.pages == 0 => {
                return Err(ScanError::Transport(e.into()));
            }
            Err(e) => {
                warn!(
                    pages = scanner.pages,
                    retained_delete_markers = scanner.delete_markers.len(),
                    "version listing failed: {e:#}. counting remaining pages without details."
                );
                continue_counting(&mut scanner, source, cancellation_token).await;
                let result = scanner.finish();
                info!(
                    delete_markers = result.total_delete_markers_seen,
                    detailed = result.delete_markers.len(),
                    "partial version scan finished."
                );
                return Err(ScanError::Partial {
                    result: Box::new(result),
                    source: e.into(),
                });
            }
        }
    }

    let result = scanner.finish();
    info!(
        versions = result.total_versions_scanned,
        delete_markers = result.total_delete_markers_seen,
        noncurrent_versions = result.noncurrent_version_count,
        truncated = result.truncated,
        "version scan has been completed."
    );
    Ok(result)
}

async fn continue_counting<S>(
    scanner: &mut VersionScanner,
    source: &mut S,
    cancellation_token: &CancellationToken,
) where
    S: PageSource + ?Sized,
{
    while !cancellation_token.is_cancelled() {
        match source.next_page().await {
            Ok(Some(page)) => scanner.count_only(&page),
            Ok(None) => return,
            Err(e) => {
                warn!("version listing failed again, giving up: {e:#}");
                return;
            }
        }
    }
}
