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

use chrono::{DateTime, Days, Utc};

use crate::error::ScanError;
use crate::types::TimeWindow;

pub const DEFAULT_LOOKBACK_DAYS: u64 = 90;
pub const DEFAULT_MAX_DELETE_MARKERS: usize = 10_000;
pub const DEFAULT_MAX_NONCURRENT_KEYS: usize = 10_000;
pub const DEFAULT_PAGE_SIZE: i32 = 1000;

// ListObjectVersions never returns more than this per request.
const MAX_PAGE_SIZE: i32 = 1000;

/// Limits and window for a single scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanConfig {
    pub lookback_days: u64,
    pub max_delete_markers: usize,
    pub max_noncurrent_keys: usize,
    pub page_size: i32,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            lookback_days: DEFAULT_LOOKBACK_DAYS,
            max_delete_markers: DEFAULT_MAX_DELETE_MARKERS,
            max_noncurrent_keys: DEFAULT_MAX_NONCURRENT_KEYS,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl ScanConfig {
    pub fn validate(&self) -> Result<(), ScanError> {
        if self.lookback_days == 0 {
            return Err(ScanError::InvalidConfig(
                "lookback days must be at least 1".to_string(),
            ));
        }
        if !(1..=MAX_PAGE_SIZE).contains(&self.page_size) {
            return Err(ScanError::InvalidConfig(format!(
                "page size must be between 1 and {MAX_PAGE_SIZE}, got {}",
                self.page_size
            )));
        }
        self.time_window(Utc::now()).map(|_| ())
    }

    /// Window ending at `now` and reaching back `lookback_days`.
    pub fn time_window(&self, now: DateTime<Utc>) -> Result<TimeWindow, ScanError> {
        let start = now
            .checked_sub_days(Days::new(self.lookback_days))
            .ok_or_else(|| {
                ScanError::InvalidConfig(format!(
                    "{} lookback days is out of range",
                    self.lookback_days
                ))
            })?;

        Ok(TimeWindow { start, end: now })
    }
}
