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
    ops::{Deref, DerefMut},
    sync::Arc,
};

use chainstate_types::{BlockIndex, BlockStatus};
use common::{
    chain::{Block, ChainConfig},
    primitives::{BlockHeight, Id},
};

use crate::{
    chainstate_interface::ChainstateInterface, BlockProcessingFlags, ChainstateConfig,
    ChainstateError, ChainstateEvent, CheckBlockError, ProcessBlockOutcome,
};

impl<T> ChainstateInterface for T
where
    T: Deref<Target = dyn ChainstateInterface>
        + DerefMut<Target = dyn ChainstateInterface>
        + Send
        + Sync,
{
    fn subscribe_to_events(&mut self, handler: Arc<dyn Fn(ChainstateEvent) + Send + Sync>) {
        self.deref_mut().subscribe_to_events(handler)
    }

    fn wait_for_all_events(&self) {
        self.deref().wait_for_all_events()
    }

    fn process_block(
        &mut self,
        block: Block,
        flags: BlockProcessingFlags,
    ) -> Result<ProcessBlockOutcome, ChainstateError> {
        self.deref_mut().process_block(block, flags)
    }

    fn get_best_block_id(&self) -> Result<Id<Block>, ChainstateError> {
        self.deref().get_best_block_id()
    }

    fn get_best_block_height(&self) -> Result<BlockHeight, ChainstateError> {
        self.deref().get_best_block_height()
    }

    fn get_best_block_index(&self) -> Result<BlockIndex, ChainstateError> {
        self.deref().get_best_block_index()
    }

    fn get_block_index(&self, block_id: &Id<Block>) -> Result<Option<BlockIndex>, ChainstateError> {
        self.deref().get_block_index(block_id)
    }

    fn get_block(&self, block_id: Id<Block>) -> Result<Option<Block>, ChainstateError> {
        self.deref().get_block(block_id)
    }

    fn get_block_id_from_height(
        &self,
        height: &BlockHeight,
    ) -> Result<Option<Id<Block>>, ChainstateError> {
        self.deref().get_block_id_from_height(height)
    }

    fn is_block_in_main_chain(&self, block_id: &Id<Block>) -> Result<bool, ChainstateError> {
        self.deref().is_block_in_main_chain(block_id)
    }

    fn get_block_height_in_main_chain(
        &self,
        block_id: &Id<Block>,
    ) -> Result<Option<BlockHeight>, ChainstateError> {
        self.deref().get_block_height_in_main_chain(block_id)
    }

    fn get_block_status(&self, block_id: &Id<Block>) -> Option<BlockStatus> {
        self.deref().get_block_status(block_id)
    }

    fn get_block_validation_error(&self, block_id: &Id<Block>) -> Option<CheckBlockError> {
        self.deref().get_block_validation_error(block_id)
    }

    fn get_chain_tips(&self) -> Vec<BlockIndex> {
        self.deref().get_chain_tips()
    }

    fn orphans_count(&self) -> usize {
        self.deref().orphans_count()
    }

    fn is_already_an_orphan(&self, block_id: &Id<Block>) -> bool {
        self.deref().is_already_an_orphan(block_id)
    }

    fn evict_expired_orphans(&mut self) -> usize {
        self.deref_mut().evict_expired_orphans()
    }

    fn get_chain_config(&self) -> &Arc<ChainConfig> {
        self.deref().get_chain_config()
    }

    fn get_chainstate_config(&self) -> ChainstateConfig {
        self.deref().get_chainstate_config()
    }
}
