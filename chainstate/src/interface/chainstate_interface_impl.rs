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

use std::sync::Arc;

use chainstate_storage::BlockchainStorage;
use chainstate_types::{BlockIndex, BlockStatus};
use common::{
    chain::{Block, ChainConfig},
    primitives::{BlockHeight, Id},
};

use crate::{
    chainstate_interface::ChainstateInterface, detail, BlockProcessingFlags, ChainstateConfig,
    ChainstateError, ChainstateEvent, CheckBlockError, ProcessBlockOutcome,
};

pub struct ChainstateInterfaceImpl<S> {
    chainstate: detail::Chainstate<S>,
}

impl<S> ChainstateInterfaceImpl<S> {
    pub fn new(chainstate: detail::Chainstate<S>) -> Self {
        Self { chainstate }
    }
}

impl<S: BlockchainStorage> ChainstateInterface for ChainstateInterfaceImpl<S> {
    fn subscribe_to_events(&mut self, handler: Arc<dyn Fn(ChainstateEvent) + Send + Sync>) {
        self.chainstate.subscribe_to_events(handler)
    }

    fn wait_for_all_events(&self) {
        self.chainstate.wait_for_all_events()
    }

    fn process_block(
        &mut self,
        block: Block,
        flags: BlockProcessingFlags,
    ) -> Result<ProcessBlockOutcome, ChainstateError> {
        self.chainstate.process_block(block, flags).map_err(ChainstateError::ProcessBlockError)
    }

    fn get_best_block_id(&self) -> Result<Id<Block>, ChainstateError> {
        Ok(self.chainstate.get_best_block_id())
    }

    fn get_best_block_height(&self) -> Result<BlockHeight, ChainstateError> {
        self.chainstate
            .get_best_block_height()
            .map_err(ChainstateError::FailedToReadProperty)
    }

    fn get_best_block_index(&self) -> Result<BlockIndex, ChainstateError> {
        self.chainstate.get_best_block_index().map_err(ChainstateError::FailedToReadProperty)
    }

    fn get_block_index(&self, block_id: &Id<Block>) -> Result<Option<BlockIndex>, ChainstateError> {
        Ok(self.chainstate.get_block_index(block_id))
    }

    fn get_block(&self, block_id: Id<Block>) -> Result<Option<Block>, ChainstateError> {
        self.chainstate.get_block(block_id).map_err(ChainstateError::FailedToReadProperty)
    }

    fn get_block_id_from_height(
        &self,
        height: &BlockHeight,
    ) -> Result<Option<Id<Block>>, ChainstateError> {
        self.chainstate
            .get_block_id_from_height(height)
            .map_err(ChainstateError::FailedToReadProperty)
    }

    fn is_block_in_main_chain(&self, block_id: &Id<Block>) -> Result<bool, ChainstateError> {
        self.chainstate
            .is_block_in_main_chain(block_id)
            .map_err(ChainstateError::FailedToReadProperty)
    }

    fn get_block_height_in_main_chain(
        &self,
        block_id: &Id<Block>,
    ) -> Result<Option<BlockHeight>, ChainstateError> {
        self.chainstate
            .get_block_height_in_main_chain(block_id)
            .map_err(ChainstateError::FailedToReadProperty)
    }

    fn get_block_status(&self, block_id: &Id<Block>) -> Option<BlockStatus> {
        self.chainstate.get_block_status(block_id)
    }

    fn get_block_validation_error(&self, block_id: &Id<Block>) -> Option<CheckBlockError> {
        self.chainstate.get_block_validation_error(block_id)
    }

    fn get_chain_tips(&self) -> Vec<BlockIndex> {
        self.chainstate.get_chain_tips()
    }

    fn orphans_count(&self) -> usize {
        self.chainstate.orphans_count()
    }

    fn is_already_an_orphan(&self, block_id: &Id<Block>) -> bool {
        self.chainstate.is_already_an_orphan(block_id)
    }

    fn evict_expired_orphans(&mut self) -> usize {
        self.chainstate.evict_expired_orphans()
    }

    fn get_chain_config(&self) -> &Arc<ChainConfig> {
        self.chainstate.chain_config()
    }

    fn get_chainstate_config(&self) -> ChainstateConfig {
        self.chainstate.chainstate_config().clone()
    }
}
