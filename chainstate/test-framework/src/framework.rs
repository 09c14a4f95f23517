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
    collections::BTreeMap,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
    time::Duration,
};

use chainstate::{
    BlockIndex, BlockProcessingFlags, BlockStatus, ChainstateError, ProcessBlockOutcome,
};
use common::{
    chain::{Block, ChainConfig},
    primitives::{BlockHeight, Id, Idable},
};

use crate::{
    BlockBuilder, StakeUniverse, TestChainstate, TestFrameworkBuilder, TestStore, TestVerifier,
};

/// The `Chainstate` wrapper that simplifies operations and checks in the tests.
pub struct TestFramework {
    pub chainstate: TestChainstate,
    pub storage: TestStore,
    pub stake: StakeUniverse,
    pub verifier: TestVerifier,
    // Current time in seconds since the epoch, as seen by the chainstate
    pub time_value: Arc<AtomicU64>,
    // Every block built through the framework, processed or not
    generated: BTreeMap<Id<Block>, Block>,
    extra_nonce: u32,
}

impl TestFramework {
    pub(crate) fn new(
        chainstate: TestChainstate,
        storage: TestStore,
        stake: StakeUniverse,
        verifier: TestVerifier,
        time_value: Arc<AtomicU64>,
        genesis: Block,
    ) -> Self {
        let generated = BTreeMap::from([(genesis.get_id(), genesis)]);
        Self {
            chainstate,
            storage,
            stake,
            verifier,
            time_value,
            generated,
            extra_nonce: 0,
        }
    }

    /// Creates a new test framework instance using a builder api.
    pub fn builder() -> TestFrameworkBuilder {
        TestFrameworkBuilder::new()
    }

    /// A framework over the small test chain with default settings
    pub fn default_test_chain() -> Self {
        Self::builder().build()
    }

    pub fn chainstate(self) -> TestChainstate {
        self.chainstate
    }

    pub fn chain_config(&self) -> Arc<ChainConfig> {
        Arc::clone(self.chainstate.get_chain_config())
    }

    /// Returns a block builder instance that builds on the current best block.
    pub fn make_block_builder(&mut self) -> BlockBuilder {
        BlockBuilder::new(self)
    }

    pub fn current_time(&self) -> Duration {
        Duration::from_secs(self.time_value.load(Ordering::SeqCst))
    }

    pub fn progress_time_seconds_since_epoch(&mut self, secs: u64) {
        self.time_value.fetch_add(secs, Ordering::SeqCst);
    }

    pub fn set_time_seconds_since_epoch(&mut self, val: u64) {
        self.time_value.store(val, Ordering::SeqCst);
    }

    /// Processes the given block, checking proof of work.
    pub fn process_block(&mut self, block: Block) -> Result<ProcessBlockOutcome, ChainstateError> {
        self.process_block_with_flags(block, BlockProcessingFlags::None)
    }

    pub fn process_block_with_flags(
        &mut self,
        block: Block,
        flags: BlockProcessingFlags,
    ) -> Result<ProcessBlockOutcome, ChainstateError> {
        self.remember(&block);
        self.chainstate.process_block(block, flags)
    }

    /// Builds and processes `blocks` blocks on top of `parent`. Returns the id of the last one.
    pub fn create_chain(
        &mut self,
        parent: &Id<Block>,
        blocks: usize,
    ) -> Result<Id<Block>, ChainstateError> {
        let mut prev_block_id = *parent;
        for _ in 0..blocks {
            let block = self.make_block_builder().with_parent(prev_block_id).build();
            prev_block_id = block.get_id();
            self.process_block(block)?;
        }
        Ok(prev_block_id)
    }

    /// Returns the genesis block of the chain.
    pub fn genesis(&self) -> Block {
        self.chainstate.get_chain_config().genesis_block().clone()
    }

    /// Returns the best block index.
    #[track_caller]
    pub fn best_block_index(&self) -> BlockIndex {
        self.chainstate.get_best_block_index().unwrap()
    }

    /// Return the best block identifier.
    #[track_caller]
    pub fn best_block_id(&self) -> Id<Block> {
        self.chainstate.get_best_block_id().unwrap()
    }

    #[track_caller]
    pub fn best_block_height(&self) -> BlockHeight {
        self.chainstate.get_best_block_height().unwrap()
    }

    /// Returns a main chain block identifier for the specified height.
    #[track_caller]
    pub fn block_id(&self, height: u64) -> Id<Block> {
        self.chainstate
            .get_block_id_from_height(&BlockHeight::new(height))
            .unwrap()
            .unwrap()
    }

    /// Returns a block corresponding to the specified identifier, from storage.
    #[track_caller]
    pub fn block(&self, id: Id<Block>) -> Block {
        self.chainstate.get_block(id).unwrap().unwrap()
    }

    /// Returns a block index corresponding to the specified id.
    #[track_caller]
    pub fn block_index(&self, id: &Id<Block>) -> BlockIndex {
        self.chainstate.get_block_index(id).unwrap().unwrap()
    }

    pub fn block_status(&self, id: &Id<Block>) -> Option<BlockStatus> {
        self.chainstate.get_block_status(id)
    }

    #[track_caller]
    pub fn is_block_in_main_chain(&self, id: &Id<Block>) -> bool {
        self.chainstate.is_block_in_main_chain(id).unwrap()
    }

    /// A block built through the framework, whether or not the chainstate has seen it
    pub fn generated_block(&self, id: &Id<Block>) -> Option<&Block> {
        self.generated.get(id)
    }

    pub(crate) fn remember(&mut self, block: &Block) {
        self.stake.register_block(block);
        self.generated.entry(block.get_id()).or_insert_with(|| block.clone());
    }

    pub(crate) fn next_extra_nonce(&mut self) -> u32 {
        self.extra_nonce += 1;
        self.extra_nonce
    }
}
