// Copyright (c) 2022 RBB S.r.l
// opensource@mintlayer.org
// SPDX-License-Identifier: MIT
// Licensed under the MIT License;
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
// https://github.com/mintlayer/mintlayer-core/blob/master/LICENSE
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

mod log_style;
mod utils;

use std::io::IsTerminal;

use tracing_subscriber::EnvFilter;

pub use log;
pub use log_style::{get_log_style_from_env, LogStyle, LogStyleParseError, TextColoring};

/// Selects the output format, see [LogStyle::parse]
pub const LOG_STYLE_ENV_VAR_NAME: &str = "LOG_STYLE";

const DEFAULT_LOG_FILTER: &str = "info";

static INITIALIZE_LOGGER_ONCE_FLAG: std::sync::Once = std::sync::Once::new();

/// Install the process-wide subscriber. Records emitted through the `log` facade are
/// forwarded to it. Filtering follows `RUST_LOG`. Calling this more than once is a no-op.
pub fn init_logging() {
    INITIALIZE_LOGGER_ONCE_FLAG.call_once(init_logging_impl);
}

fn init_logging_impl() {
    let style = match get_log_style_from_env(LOG_STYLE_ENV_VAR_NAME) {
        Ok(style) => style.unwrap_or(LogStyle::Text(TextColoring::Auto)),
        Err(err) => {
            eprintln!("Ignoring {LOG_STYLE_ENV_VAR_NAME}: {err}");
            LogStyle::Text(TextColoring::Auto)
        }
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr);

    let result = match style {
        LogStyle::Json => builder.json().try_init(),
        LogStyle::Text(coloring) => builder.with_ansi(use_ansi(coloring)).try_init(),
    };

    // Somebody else may have installed a global subscriber already (e.g. a test harness).
    if let Err(err) = result {
        eprintln!("Logging initialization skipped: {err}");
    }
}

fn use_ansi(coloring: TextColoring) -> bool {
    match coloring {
        TextColoring::On => true,
        TextColoring::Off => false,
        TextColoring::Auto => std::io::stderr().is_terminal(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initialize_twice() {
        init_logging();
        init_logging();
        log::info!("logging initialized");
    }
}
