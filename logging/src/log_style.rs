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

use std::str::FromStr;

use thiserror::Error;

use crate::utils::{get_from_env, GetFromEnvError};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TextColoring {
    On,
    Off,
    /// Colored only when writing to a terminal
    Auto,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum LogStyle {
    Text(TextColoring),
    Json,
}

impl LogStyle {
    /// Case-insensitive: `text`, `text-colored`, `text-uncolored` or `json`
    pub fn parse(s: &str) -> Result<LogStyle, LogStyleParseError> {
        let s = s.trim().to_lowercase();
        let style = match s.as_str() {
            "json" => LogStyle::Json,
            "text" => LogStyle::Text(TextColoring::Auto),
            "text-colored" => LogStyle::Text(TextColoring::On),
            "text-uncolored" => LogStyle::Text(TextColoring::Off),
            _ => return Err(LogStyleParseError::UnrecognizedFormat(s)),
        };
        Ok(style)
    }
}

impl FromStr for LogStyle {
    type Err = LogStyleParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

pub fn get_log_style_from_env(env_var_name: &str) -> Result<Option<LogStyle>, LogStyleParseError> {
    get_from_env(env_var_name)?.map(|val| val.parse()).transpose()
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LogStyleParseError {
    #[error("Unrecognized format: {0}")]
    UnrecognizedFormat(String),
    #[error("Env var error: {0}")]
    GetFromEnvError(#[from] GetFromEnvError),
}
