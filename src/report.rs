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

use std::fmt::Write;

use crate::types::ScanResult;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const DATE_FORMAT: &str = "%Y-%m-%d";
const BYTES_PER_MIB: f64 = 1024.0 * 1024.0;

/// Renders a scan result as console text.
///
/// `display_limit` caps the rows of each table; `None` shows everything the
/// result retained.
pub fn render_text(result: &ScanResult, display_limit: Option<usize>) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail.
    let _ = write_text(&mut out, result, display_limit);
    out
}

pub fn render_json(result: &ScanResult) -> serde_json::Result<String> {
    serde_json::to_string_pretty(result)
}

fn write_text(
    out: &mut String,
    result: &ScanResult,
    display_limit: Option<usize>,
) -> std::fmt::Result {
    writeln!(
        out,
        "Version history from {} to {}",
        result.time_window.start.format(DATE_FORMAT),
        result.time_window.end.format(DATE_FORMAT)
    )?;
    writeln!(out, "  pages scanned:        {}", result.pages_scanned)?;
    writeln!(out, "  versions:             {}", result.total_versions_scanned)?;
    writeln!(out, "  noncurrent versions:  {}", result.noncurrent_version_count)?;
    writeln!(out, "  delete markers:       {}", result.total_delete_markers_seen)?;
    writeln!(out, "  objects with history: {}", result.objects_with_noncurrent())?;

    if !result.delete_markers.is_empty() || result.total_delete_markers_seen > 0 {
        let shown = rows_to_show(result.delete_markers.len(), display_limit);
        writeln!(out)?;
        writeln!(out, "Most recent delete markers")?;
        write_notice(out, shown as u64, result.total_delete_markers_seen)?;
        writeln!(out, "| Key | Deleted | Version ID |")?;
        writeln!(out, "|-----|---------|------------|")?;
        for marker in result.delete_markers.iter().take(shown) {
            writeln!(
                out,
                "| {} | {} | {} |",
                marker.key,
                marker.last_modified.format(TIMESTAMP_FORMAT),
                marker.version_id
            )?;
        }
    }

    if !result.noncurrent_aggregates.is_empty() || result.noncurrent_version_count > 0 {
        let shown = rows_to_show(result.noncurrent_aggregates.len(), display_limit);
        let shown_versions: u64 = result
            .noncurrent_aggregates
            .iter()
            .take(shown)
            .map(|summary| summary.aggregate.count)
            .sum();
        writeln!(out)?;
        writeln!(out, "Objects with noncurrent versions")?;
        write_notice(out, shown_versions, result.noncurrent_version_count)?;
        writeln!(out, "| Key | Noncurrent | Latest noncurrent | Size (MiB) |")?;
        writeln!(out, "|-----|------------|-------------------|------------|")?;
        for summary in result.noncurrent_aggregates.iter().take(shown) {
            writeln!(
                out,
                "| {} | {} | {} | {:.2} |",
                summary.key,
                summary.aggregate.count,
                summary.aggregate.latest_modified.format(TIMESTAMP_FORMAT),
                summary.aggregate.total_size as f64 / BYTES_PER_MIB
            )?;
        }
    }

    Ok(())
}

fn rows_to_show(retained: usize, display_limit: Option<usize>) -> usize {
    display_limit.map_or(retained, |limit| retained.min(limit))
}

fn write_notice(out: &mut String, shown: u64, total: u64) -> std::fmt::Result {
    if shown < total {
        writeln!(out, "(displaying {shown} of {total})")?;
    }
    Ok(())
}
