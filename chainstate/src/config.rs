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

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// How to choose between valid tips with equal chain work
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default, derive_more::Display)]
#[serde(rename_all = "kebab-case")]
pub enum TieBreakPolicy {
    /// The tip accepted first wins
    #[default]
    #[display("first-seen")]
    FirstSeen,
    /// The tip with the numerically lowest block id wins
    #[display("lowest-id")]
    LowestId,
}

/// The chainstate subsystem configuration.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct ChainstateConfig {
    /// The number of maximum attempts to commit a block to the database.
    pub max_db_commit_attempts: usize,
    /// The maximum capacity of the orphan blocks pool.
    pub max_orphan_blocks: usize,
    /// How long an orphan is kept while waiting for its parent, in seconds.
    pub orphan_expiration_secs: u64,
    /// Tie-break between equal-work tips.
    pub tie_break: TieBreakPolicy,
}

impl ChainstateConfig {
    /// Creates a new chainstate configuration instance.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_orphan_blocks(mut self, max_orphan_blocks: usize) -> Self {
        self.max_orphan_blocks = max_orphan_blocks;
        self
    }

    pub fn with_orphan_expiration(mut self, expiration: Duration) -> Self {
        self.orphan_expiration_secs = expiration.as_secs();
        self
    }

    pub fn with_tie_break(mut self, tie_break: TieBreakPolicy) -> Self {
        self.tie_break = tie_break;
        self
    }

    pub fn with_max_db_commit_attempts(mut self, attempts: usize) -> Self {
        self.max_db_commit_attempts = attempts;
        self
    }

    pub fn orphan_expiration(&self) -> Duration {
        Duration::from_secs(self.orphan_expiration_secs)
    }
}

impl Default for ChainstateConfig {
    fn default() -> Self {
        Self {
            max_db_commit_attempts: 10,
            max_orphan_blocks: 500,
            orphan_expiration_secs: 60 * 60,
            tie_break: TieBreakPolicy::FirstSeen,
        }
    }
}

impl std::str::FromStr for ChainstateConfig {
    type Err = toml::de::Error;

    /// Parse from TOML; missing keys take their default values
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        toml::from_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_partial_toml() {
        let config: ChainstateConfig = r#"
            max_orphan_blocks = 20
            tie_break = "lowest-id"
        "#
        .parse()
        .unwrap();

        assert_eq!(config.max_orphan_blocks, 20);
        assert_eq!(config.tie_break, TieBreakPolicy::LowestId);
        assert_eq!(config.max_db_commit_attempts, 10);
        assert_eq!(config.orphan_expiration(), Duration::from_secs(3600));
    }

    #[test]
    fn roundtrip_toml() {
        let config = ChainstateConfig::new()
            .with_orphan_expiration(Duration::from_secs(90))
            .with_tie_break(TieBreakPolicy::LowestId);
        let text = toml::to_string(&config).unwrap();
        assert_eq!(text.parse::<ChainstateConfig>().unwrap(), config);
    }

    #[test]
    fn unknown_policy_rejected() {
        assert!("tie_break = \"random\"".parse::<ChainstateConfig>().is_err());
    }
}
