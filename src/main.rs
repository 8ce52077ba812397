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

#![allow(clippy::result_large_err)]

use anyhow::Result;
use clap::{ArgAction, Parser};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use s3_version_scan::config::{
    DEFAULT_LOOKBACK_DAYS, DEFAULT_MAX_DELETE_MARKERS, DEFAULT_MAX_NONCURRENT_KEYS,
    DEFAULT_PAGE_SIZE,
};
use s3_version_scan::report::{render_json, render_text};
use s3_version_scan::s3::{build_client, versioning_status, S3VersionPages, VersioningStatus};
use s3_version_scan::{scan, ScanConfig, ScanError, ScanResult};

mod tracing_init;

#[derive(Debug, Parser)]
#[command(about = "Summarise recent delete markers and noncurrent versions of an S3 bucket")]
struct Opt {
    /// The name of the bucket.
    #[arg(short, long)]
    bucket: String,

    /// Only scan keys starting with this prefix
    #[arg(short, long)]
    prefix: Option<String>,

    /// Number of days to look back
    #[arg(short, long, default_value_t = DEFAULT_LOOKBACK_DAYS)]
    days: u64,

    /// Most recent delete markers to keep in the report
    #[arg(long, env = "S3_SCAN_MAX_DELETE_MARKERS", default_value_t = DEFAULT_MAX_DELETE_MARKERS)]
    max_delete_markers: usize,

    /// Distinct keys to break noncurrent versions down by
    #[arg(long, env = "S3_SCAN_MAX_NONCURRENT_KEYS", default_value_t = DEFAULT_MAX_NONCURRENT_KEYS)]
    max_noncurrent_keys: usize,

    /// Versions requested per listing call
    #[arg(long, default_value_t = DEFAULT_PAGE_SIZE)]
    page_size: i32,

    /// Rows to print per table
    #[arg(long)]
    display_limit: Option<usize>,

    /// Print the result as JSON
    #[arg(long)]
    json: bool,

    /// The AWS endpoint.
    #[arg(short, long, env = "AWS_ENDPOINT")]
    endpoint: Option<String>,

    /// The AWS Region.
    #[arg(short, long, env = "AWS_DEFAULT_REGION")]
    region: Option<String>,

    /// Use path-style bucket addressing
    #[arg(long)]
    force_path_style: bool,

    /// More logging, repeat for more detail
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,

    /// Emit logs as JSON
    #[arg(long)]
    json_tracing: bool,
}

impl TryFrom<&Opt> for ScanConfig {
    type Error = ScanError;

    fn try_from(opt: &Opt) -> Result<Self, Self::Error> {
        let config = ScanConfig {
            lookback_days: opt.days,
            max_delete_markers: opt.max_delete_markers,
            max_noncurrent_keys: opt.max_noncurrent_keys,
            page_size: opt.page_size,
        };
        config.validate()?;
        Ok(config)
    }
}

fn load_config_exit_if_err(opt: &Opt) -> ScanConfig {
    match ScanConfig::try_from(opt) {
        Ok(config) => config,
        Err(e) => clap::Error::raw(clap::error::ErrorKind::ValueValidation, format!("{e}\n")).exit(),
    }
}

fn spawn_ctrl_c_handler(cancellation_token: CancellationToken) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("ctrl-c received, stopping after the current page.");
            cancellation_token.cancel();
        }
    });
}

fn print_result(result: &ScanResult, opt: &Opt) -> Result<()> {
    if opt.json {
        println!("{}", render_json(result)?);
    } else {
        print!("{}", render_text(result, opt.display_limit));
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let opt = Opt::parse();
    let config = load_config_exit_if_err(&opt);

    tracing_init::init_tracing(&tracing_init::TracingConfig::from_verbosity(
        opt.verbose,
        opt.json_tracing,
    ));
    debug!("config = {:?}", config);

    let client = build_client(opt.endpoint.clone(), opt.region.clone(), opt.force_path_style).await;

    let status = versioning_status(&client, &opt.bucket).await?;
    match status {
        VersioningStatus::Enabled => {}
        VersioningStatus::Suspended => {
            warn!(bucket = opt.bucket, "versioning is suspended, scanning existing history.")
        }
        VersioningStatus::Disabled => {
            println!(
                "Versioning is not enabled on {}, deleted objects cannot be recovered from versions.",
                opt.bucket
            );
            return Ok(());
        }
    }

    let cancellation_token = CancellationToken::new();
    spawn_ctrl_c_handler(cancellation_token.clone());

    let mut pages = S3VersionPages::new(
        client,
        opt.bucket.clone(),
        opt.prefix.clone(),
        config.page_size,
    );

    match scan(&mut pages, &config, &cancellation_token).await {
        Ok(result) => print_result(&result, &opt),
        Err(e) => {
            let exit_code = e.exit_code();
            match e.partial_result() {
                Some(result) => {
                    eprintln!("WARNING: {e}. The summary may be incomplete.");
                    print_result(result, &opt)?;
                }
                None => error!("{e}"),
            }
            if exit_code == 0 {
                info!("scan stopped before completion.");
                return Ok(());
            }
            std::process::exit(exit_code)
        }
    }
}
