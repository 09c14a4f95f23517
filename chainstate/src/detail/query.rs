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

use chainstate_storage::{BlockchainStorage, BlockchainStorageRead, TransactionRo};
use chainstate_types::{BlockIndex, BlockStatus, PropertyQueryError};
use common::{
    chain::Block,
    primitives::{BlockHeight, Id},
};

use super::{Chainstate, CheckBlockError};

impl<S: BlockchainStorage> Chainstate<S> {
    pub fn get_best_block_id(&self) -> Id<Block> {
        self.best_block_id
    }

    pub fn get_best_block_index(&self) -> Result<BlockIndex, PropertyQueryError> {
        self.block_index
            .lookup(&self.best_block_id)
            .cloned()
            .ok_or(PropertyQueryError::BestBlockIndexNotFound)
    }

    pub fn get_best_block_height(&self) -> Result<BlockHeight, PropertyQueryError> {
        self.get_best_block_index().map(|index| index.block_height())
    }

    /// Index entry of any block in the block tree, on the active chain or not
    pub fn get_block_index(&self, block_id: &Id<Block>) -> Option<BlockIndex> {
        self.block_index.lookup(block_id).cloned()
    }

    pub fn get_block_status(&self, block_id: &Id<Block>) -> Option<BlockStatus> {
        self.block_index.lookup(block_id).map(|index| index.status())
    }

    /// The reason an invalid block was rejected, if it was rejected since this chainstate opened
    pub fn get_block_validation_error(&self, block_id: &Id<Block>) -> Option<CheckBlockError> {
        self.invalid_reasons.get(block_id).cloned()
    }

    /// Valid blocks that have no valid child
    pub fn get_chain_tips(&self) -> Vec<BlockIndex> {
        self.block_index.leaf_tips().cloned().collect()
    }

    /// A stored block; blocks that failed validation are never stored
    pub fn get_block(&self, block_id: Id<Block>) -> Result<Option<Block>, PropertyQueryError> {
        let db_tx = self.chainstate_storage.transaction_ro()?;
        let block = db_tx.get_block(block_id)?;
        db_tx.close();
        Ok(block)
    }

    /// Id of the active chain block at `height`
    pub fn get_block_id_from_height(
        &self,
        height: &BlockHeight,
    ) -> Result<Option<Id<Block>>, PropertyQueryError> {
        let db_tx = self.chainstate_storage.transaction_ro()?;
        let block_id = db_tx.get_block_id_by_height(height)?;
        db_tx.close();
        Ok(block_id)
    }

    pub fn get_block_height_in_main_chain(
        &self,
        block_id: &Id<Block>,
    ) -> Result<Option<BlockHeight>, PropertyQueryError> {
        let height = match self.block_index.lookup(block_id) {
            Some(index) => index.block_height(),
            None => return Ok(None),
        };
        let main_chain_id = self.get_block_id_from_height(&height)?;
        Ok((main_chain_id.as_ref() == Some(block_id)).then_some(height))
    }

    pub fn is_block_in_main_chain(&self, block_id: &Id<Block>) -> Result<bool, PropertyQueryError> {
        self.get_block_height_in_main_chain(block_id).map(|height| height.is_some())
    }

    pub fn orphans_count(&self) -> usize {
        self.orphan_blocks.len()
    }

    pub fn is_already_an_orphan(&self, block_id: &Id<Block>) -> bool {
        self.orphan_blocks.is_already_an_orphan(block_id)
    }

    /// Drop orphans that waited longer than the configured expiration; returns how many
    pub fn evict_expired_orphans(&mut self) -> usize {
        let now = self.time_getter.get_time();
        self.orphan_blocks.evict_expired(now)
    }
}
