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

use thiserror::Error;

use crate::types::ScanResult;

pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors surfaced by a version scan.
///
/// A scan never drops progress silently: once a page has been processed,
/// every failure carries the partial [`ScanResult`] collected so far.
///
/// ## Exit codes
///
/// - 0: Cancelled
/// - 1: Transport (nothing was scanned)
/// - 2: InvalidConfig
/// - 3: Partial
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The listing failed before any page was processed.
    #[error("Version listing failed: {0}")]
    Transport(#[source] BoxError),

    /// The listing failed after at least one page was processed.
    #[error("Version listing failed after {} pages: {source}", .result.pages_scanned)]
    Partial {
        result: Box<ScanResult>,
        #[source]
        source: BoxError,
    },

    #[error("Scan cancelled after {} pages", .result.pages_scanned)]
    Cancelled { result: Box<ScanResult> },
}

impl ScanError {
    pub fn exit_code(&self) -> i32 {
        match self {
            ScanError::Cancelled { .. } => 0,
            ScanError::Transport(_) => 1,
            ScanError::InvalidConfig(_) => 2,
            ScanError::Partial { .. } => 3,
        }
    }

    /// The result accumulated before the scan stopped, if any.
    pub fn partial_result(&self) -> Option<&ScanResult> {
        match self {
            ScanError::Partial { result, .. } | ScanError::Cancelled { result } => Some(&**result),
            _ => None,
        }
    }

    pub fn into_partial_result(self) -> Option<ScanResult> {
        match self {
            ScanError::Partial { result, .. } | ScanError::Cancelled { result } => Some(*result),
            _ => None,
        }
    }
}
