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

use std::{
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
    time::Duration,
};

use chainstate::{collaborators::Collaborators, ChainstateConfig, ChainstateError};
use chainstate_storage::Store;
use common::{
    chain::{config::Builder as ChainConfigBuilder, ChainConfig},
    time_getter::TimeGetter,
};

use crate::{StakeUniverse, TestFramework, TestStore, TestVerifier};

/// Default mock time: one hour after the genesis timestamp
const DEFAULT_TIME_SINCE_GENESIS: u64 = 60 * 60;

/// A clock that reads the given number of seconds since the epoch
fn mocked_time_getter_seconds(seconds: Arc<AtomicU64>) -> TimeGetter {
    TimeGetter::new(Arc::new(move || Duration::from_secs(seconds.load(Ordering::SeqCst))))
}

/// The TestFramework builder.
pub struct TestFrameworkBuilder {
    chain_config: ChainConfig,
    chainstate_config: ChainstateConfig,
    chainstate_storage: TestStore,
    stake: Option<StakeUniverse>,
    verifier: TestVerifier,
    time_value: Option<Arc<AtomicU64>>,
    initial_time_since_genesis: u64,
    live_tickets: Option<u32>,
}

impl TestFrameworkBuilder {
    /// Constructs a builder instance with values appropriate for most of the tests.
    pub fn new() -> Self {
        TestFrameworkBuilder {
            chain_config: ChainConfigBuilder::test_chain().build(),
            chainstate_config: ChainstateConfig::new(),
            chainstate_storage: TestStore::new(Store::new_empty().unwrap()),
            stake: None,
            verifier: TestVerifier::default(),
            time_value: None,
            initial_time_since_genesis: DEFAULT_TIME_SINCE_GENESIS,
            live_tickets: None,
        }
    }

    /// Reopen the storage of an existing framework. The collaborators and the clock carry over.
    pub fn from_existing_framework(tf: TestFramework) -> Self {
        let chain_config = (**tf.chainstate.get_chain_config()).clone();
        let chainstate_config = tf.chainstate.get_chainstate_config();

        TestFrameworkBuilder {
            chain_config,
            chainstate_config,
            chainstate_storage: tf.storage,
            stake: Some(tf.stake),
            verifier: tf.verifier,
            time_value: Some(tf.time_value),
            initial_time_since_genesis: DEFAULT_TIME_SINCE_GENESIS,
            live_tickets: None,
        }
    }

    pub fn with_storage(mut self, s: TestStore) -> Self {
        self.chainstate_storage = s;
        self
    }

    pub fn with_chain_config(mut self, chain_config: ChainConfig) -> Self {
        self.chain_config = chain_config;
        self
    }

    pub fn with_chainstate_config(mut self, config: ChainstateConfig) -> Self {
        self.chainstate_config = config;
        self
    }

    /// Number of live tickets the stake state reports. Defaults to a full set of voters.
    pub fn with_live_tickets(mut self, live_tickets: u32) -> Self {
        self.live_tickets = Some(live_tickets);
        self
    }

    /// Set initial mock time to given number of seconds after the genesis timestamp.
    pub fn with_initial_time_since_genesis(mut self, initial_time_since_genesis: u64) -> Self {
        self.initial_time_since_genesis = initial_time_since_genesis;
        self
    }

    pub fn try_build(self) -> Result<TestFramework, ChainstateError> {
        let genesis = self.chain_config.genesis_block().clone();

        let live_tickets =
            self.live_tickets.unwrap_or_else(|| u32::from(self.chain_config.votes_per_block()));
        let stake = self.stake.unwrap_or_else(|| StakeUniverse::new(live_tickets));
        if self.live_tickets.is_some() {
            stake.set_live_tickets(live_tickets);
        }
        stake.register_block(&genesis);

        let time_value = self.time_value.unwrap_or_else(|| {
            Arc::new(AtomicU64::new(
                genesis.timestamp().as_int_seconds() + self.initial_time_since_genesis,
            ))
        });
        let time_getter = mocked_time_getter_seconds(Arc::clone(&time_value));

        let chainstate = chainstate::make_chainstate(
            Arc::new(self.chain_config),
            self.chainstate_config,
            self.chainstate_storage.clone(),
            Collaborators::new(stake.provider(), self.verifier.verifier()),
            time_getter,
        )?;

        Ok(TestFramework::new(
            chainstate,
            self.chainstate_storage,
            stake,
            self.verifier,
            time_value,
            genesis,
        ))
    }

    pub fn build(self) -> TestFramework {
        self.try_build().unwrap()
    }
}

impl Default for TestFrameworkBuilder {
    fn default() -> Self {
        Self::new()
    }
}
