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

/*!
# Overview
s3-version-scan walks the version history of an S3 bucket and summarises
what was deleted or overwritten within a recent window.

A bucket with versioning enabled can hold millions of versions. The scan
consumes the listing one page at a time and keeps memory bounded: the counts
it reports are true totals, while the detail it keeps (the most recent
delete markers and per-key noncurrent version totals) is capped. A result
whose detail holds less than its totals is flagged as truncated.

## As a Library

```no_run
use s3_version_scan::s3::{build_client, S3VersionPages};
use s3_version_scan::{scan, ScanConfig};
use tokio_util::sync::CancellationToken;

# async fn run() -> anyhow::Result<()> {
let client = build_client(None, None, false).await;
let config = ScanConfig::default();
let mut pages = S3VersionPages::new(client, "my-bucket".to_string(), None, config.page_size);

match scan(&mut pages, &config, &CancellationToken::new()).await {
    Ok(result) => println!("{} delete markers", result.total_delete_markers_seen),
    Err(e) => {
        if let Some(partial) = e.partial_result() {
            println!("at least {} delete markers", partial.total_delete_markers_seen);
        }
    }
}
# Ok(())
# }
```
*/

pub mod aggregate;
pub mod buffer;
pub mod config;
pub mod error;
pub mod report;
pub mod s3;
pub mod scanner;
pub mod source;
pub mod types;

#[cfg(test)]
mod scanner_properties;

pub use config::ScanConfig;
pub use error::ScanError;
pub use scanner::{scan, VersionScanner};
pub use source::{IterPages, PageSource};
pub use types::{
    DeleteMarkerRecord, NoncurrentAggregate, NoncurrentSummary, ScanResult, TimeWindow,
    VersionPage, VersionRecord,
};
