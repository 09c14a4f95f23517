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

use chainstate_types::{BlockIndex, BlockStatus};
use common::{
    chain::{Block, ChainConfig},
    primitives::{BlockHeight, Id},
};

use crate::{
    BlockProcessingFlags, ChainstateConfig, ChainstateError, ChainstateEvent, CheckBlockError,
    ProcessBlockOutcome,
};

/// The chainstate as seen by the rest of the node
pub trait ChainstateInterface: Send + Sync {
    fn subscribe_to_events(&mut self, handler: Arc<dyn Fn(ChainstateEvent) + Send + Sync>);

    /// Blocks until all events broadcast so far have been delivered
    fn wait_for_all_events(&self);

    /// Submit a block. See [ProcessBlockOutcome] for what a successful submission reports.
    fn process_block(
        &mut self,
        block: Block,
        flags: BlockProcessingFlags,
    ) -> Result<ProcessBlockOutcome, ChainstateError>;

    fn get_best_block_id(&self) -> Result<Id<Block>, ChainstateError>;
    fn get_best_block_height(&self) -> Result<BlockHeight, ChainstateError>;
    fn get_best_block_index(&self) -> Result<BlockIndex, ChainstateError>;
    fn get_block_index(&self, block_id: &Id<Block>) -> Result<Option<BlockIndex>, ChainstateError>;
    fn get_block(&self, block_id: Id<Block>) -> Result<Option<Block>, ChainstateError>;
    fn get_block_id_from_height(
        &self,
        height: &BlockHeight,
    ) -> Result<Option<Id<Block>>, ChainstateError>;
    fn is_block_in_main_chain(&self, block_id: &Id<Block>) -> Result<bool, ChainstateError>;
    fn get_block_height_in_main_chain(
        &self,
        block_id: &Id<Block>,
    ) -> Result<Option<BlockHeight>, ChainstateError>;
    fn get_block_status(&self, block_id: &Id<Block>) -> Option<BlockStatus>;
    fn get_block_validation_error(&self, block_id: &Id<Block>) -> Option<CheckBlockError>;
    fn get_chain_tips(&self) -> Vec<BlockIndex>;

    fn orphans_count(&self) -> usize;
    fn is_already_an_orphan(&self, block_id: &Id<Block>) -> bool;
    fn evict_expired_orphans(&mut self) -> usize;

    fn get_chain_config(&self) -> &Arc<ChainConfig>;
    fn get_chainstate_config(&self) -> ChainstateConfig;
}
