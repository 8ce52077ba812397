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

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use aws_config::meta::region::RegionProviderChain;
use aws_config::BehaviorVersion;
use aws_sdk_s3::error::{ProvideErrorMetadata, SdkError};
use aws_sdk_s3::types::{BucketVersioningStatus, DeleteMarkerEntry, ObjectVersion};
use aws_sdk_s3::{config::Region, Client};
use aws_smithy_types_convert::date_time::DateTimeExt;
use serde::Serialize;
use tracing::{debug, error, warn};

use crate::source::PageSource;
use crate::types::{DeleteMarkerRecord, VersionPage, VersionRecord};

// S3 reports the version of an object written before versioning as "null".
const NULL_VERSION_ID: &str = "null";

pub async fn build_client(
    endpoint: Option<String>,
    region: Option<String>,
    force_path_style: bool,
) -> Client {
    let region_provider = RegionProviderChain::first_try(region.map(Region::new))
        .or_default_provider()
        .or_else(Region::new("us-east-1"));

    let mut loader = aws_config::defaults(BehaviorVersion::latest()).region(region_provider);
    if let Some(endpoint) = endpoint {
        loader = loader.endpoint_url(endpoint);
    }
    let shared_config = loader.load().await;

    let s3_config = aws_sdk_s3::config::Builder::from(&shared_config)
        .force_path_style(force_path_style)
        .build();
    Client::from_conf(s3_config)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum VersioningStatus {
    Enabled,
    Suspended,
    Disabled,
}

impl VersioningStatus {
    /// Whether the bucket can hold noncurrent versions or delete markers.
    pub fn has_history(&self) -> bool {
        !matches!(self, VersioningStatus::Disabled)
    }
}

pub async fn versioning_status(client: &Client, bucket: &str) -> Result<VersioningStatus> {
    let output = client
        .get_bucket_versioning()
        .bucket(bucket)
        .send()
        .await
        .map_err(|e| {
            let (s3_error_code, s3_error_message) = sdk_error_details(&e);
            error!(
                bucket = bucket,
                s3_error_code = s3_error_code,
                s3_error_message = s3_error_message,
                "S3 GetBucketVersioning API call failed."
            );
            anyhow!(e)
        })
        .context("aws_sdk_s3::client::get_bucket_versioning() failed.")?;

    Ok(match output.status() {
        Some(BucketVersioningStatus::Enabled) => VersioningStatus::Enabled,
        Some(BucketVersioningStatus::Suspended) => VersioningStatus::Suspended,
        _ => VersioningStatus::Disabled,
    })
}

/// Pages of `ListObjectVersions` for one bucket and optional prefix.
///
/// The listing markers only advance after a successful request, so polling
/// again after a failure re-requests the page that failed.
pub struct S3VersionPages {
    client: Client,
    bucket: String,
    prefix: Option<String>,
    page_size: i32,
    key_marker: Option<String>,
    version_id_marker: Option<String>,
    exhausted: bool,
}

impl S3VersionPages {
    pub fn new(client: Client, bucket: String, prefix: Option<String>, page_size: i32) -> Self {
        Self {
            client,
            bucket,
            prefix,
            page_size,
            key_marker: None,
            version_id_marker: None,
            exhausted: false,
        }
    }
}

#[async_trait]
impl PageSource for S3VersionPages {
    async fn next_page(&mut self) -> Result<Option<VersionPage>> {
        if self.exhausted {
            return Ok(None);
        }

        let output = self
            .client
            .list_object_versions()
            .bucket(&self.bucket)
            .set_prefix(self.prefix.clone())
            .set_key_marker(self.key_marker.clone())
            .set_version_id_marker(self.version_id_marker.clone())
            .max_keys(self.page_size)
            .send()
            .await
            .map_err(|e| {
                let (s3_error_code, s3_error_message) = sdk_error_details(&e);
                error!(
                    bucket = self.bucket,
                    s3_error_code = s3_error_code,
                    s3_error_message = s3_error_message,
                    "S3 ListObjectVersions API call failed."
                );
                anyhow!(e).context("aws_sdk_s3::client::list_object_versions() failed.")
            })?;

        if output.is_truncated() == Some(true) {
            self.key_marker = output.next_key_marker().map(String::from);
            self.version_id_marker = output.next_version_id_marker().map(String::from);
        } else {
            self.exhausted = true;
        }

        let page = VersionPage {
            versions: output.versions().iter().filter_map(to_version_record).collect(),
            delete_markers: output
                .delete_markers()
                .iter()
                .filter_map(to_delete_marker_record)
                .collect(),
        };
        debug!(
            versions = page.versions.len(),
            delete_markers = page.delete_markers.len(),
            "listed a page of object versions."
        );

        Ok(Some(page))
    }
}

fn sdk_error_details<E, R>(e: &SdkError<E, R>) -> (String, String)
where
    E: ProvideErrorMetadata + std::error::Error + 'static,
    R: std::fmt::Debug,
{
    match e.as_service_error() {
        Some(service_error) => (
            service_error.code().unwrap_or("unknown").to_string(),
            service_error.message().unwrap_or("no message").to_string(),
        ),
        None => ("N/A".to_string(), e.to_string()),
    }
}

fn to_version_record(version: &ObjectVersion) -> Option<VersionRecord> {
    let Some(key) = version.key() else {
        warn!("skipping an object version without a key.");
        return None;
    };
    let last_modified = convert_timestamp(key, version.last_modified())?;

    Some(VersionRecord {
        key: key.to_string(),
        version_id: version.version_id().unwrap_or(NULL_VERSION_ID).to_string(),
        last_modified,
        size: version.size().unwrap_or_default().max(0) as u64,
        is_latest: version.is_latest().unwrap_or_default(),
    })
}

fn to_delete_marker_record(marker: &DeleteMarkerEntry) -> Option<DeleteMarkerRecord> {
    let Some(key) = marker.key() else {
        warn!("skipping a delete marker without a key.");
        return None;
    };
    let last_modified = convert_timestamp(key, marker.last_modified())?;

    Some(DeleteMarkerRecord {
        key: key.to_string(),
        version_id: marker.version_id().unwrap_or(NULL_VERSION_ID).to_string(),
        last_modified,
        is_latest: marker.is_latest().unwrap_or_default(),
    })
}

fn convert_timestamp(
    key: &str,
    timestamp: Option<&aws_sdk_s3::primitives::DateTime>,
) -> Option<chrono::DateTime<chrono::Utc>> {
    let Some(timestamp) = timestamp else {
        warn!(key = key, "skipping a version without a last modified timestamp.");
        return None;
    };

    match timestamp.to_chrono_utc() {
        Ok(converted) => Some(converted),
        Err(e) => {
            warn!(key = key, "skipping a version with an unusable timestamp: {e}");
            None
        }
    }
}
