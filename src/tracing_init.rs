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

use std::env;
use std::io::IsTerminal;

use tracing::Level;

const EVENT_FILTER_ENV_VAR: &str = "RUST_LOG";

#[derive(Debug, Clone, Copy)]
pub struct TracingConfig {
    pub level: Level,
    pub json: bool,
    pub aws_sdk: bool,
}

impl TracingConfig {
    pub fn from_verbosity(verbose: u8, json: bool) -> Self {
        let level = match verbose {
            0 => Level::WARN,
            1 => Level::INFO,
            2 => Level::DEBUG,
            _ => Level::TRACE,
        };
        Self {
            level,
            json,
            // At the most verbose level the SDK's own events are shown too.
            aws_sdk: verbose > 3,
        }
    }
}

// Logs go to stderr so that the report on stdout stays machine readable.
pub fn init_tracing(config: &TracingConfig) {
    let level = config.level;
    let event_filter = if config.aws_sdk {
        format!(
            "s3_version_scan={level},aws_smithy_runtime={level},aws_config={level},aws_sigv4={level}"
        )
    } else if let Ok(filter) = env::var(EVENT_FILTER_ENV_VAR) {
        filter
    } else {
        format!("s3_version_scan={level}")
    };

    let subscriber_builder = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .compact()
        .with_target(false)
        .with_ansi(std::io::stderr().is_terminal())
        .with_env_filter(event_filter);

    if config.json {
        subscriber_builder.json().init();
    } else {
        subscriber_builder.init();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rusty_fork::rusty_fork_test;

    #[test]
    fn verbosity_levels() {
        assert_eq!(TracingConfig::from_verbosity(0, false).level, Level::WARN);
        assert_eq!(TracingConfig::from_verbosity(1, false).level, Level::INFO);
        assert_eq!(TracingConfig::from_verbosity(2, false).level, Level::DEBUG);
        assert_eq!(TracingConfig::from_verbosity(3, false).level, Level::TRACE);
        assert!(!TracingConfig::from_verbosity(3, false).aws_sdk);
        assert!(TracingConfig::from_verbosity(4, false).aws_sdk);
    }

    rusty_fork_test! {
        #[test]
        fn init_json_tracing() {
            init_tracing(&TracingConfig::from_verbosity(1, true));
        }

        #[test]
        fn init_aws_sdk_tracing() {
            init_tracing(&TracingConfig::from_verbosity(4, false));
        }

        #[test]
        fn init_with_env() {
            // Runs in a separate process.
            env::set_var(EVENT_FILTER_ENV_VAR, "trace");

            init_tracing(&TracingConfig::from_verbosity(0, false));
        }
    }
}
