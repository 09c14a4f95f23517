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

use chainstate_storage::{
    BlockchainStorage, BlockchainStorageRead, BlockchainStorageWrite, TransactionRo,
    TransactionRw,
};
use chainstate_types::BlockStatus;
use common::{
    chain::Block,
    primitives::{Id, Idable},
};
use logging::log;
use utils::tap_log::TapLog;

use super::{
    chain_selector::{best_tip, reorganize},
    error_classification::BlockProcessingErrorClassification,
    BlockError, Chainstate, CheckBlockError, ReorgError, ReorgPlan,
};
use crate::ChainstateEvent;

fn load_blocks(
    db_tx: &impl BlockchainStorageRead,
    block_ids: &[Id<Block>],
) -> Result<Vec<Block>, ReorgError> {
    block_ids
        .iter()
        .map(|id| db_tx.get_block(*id)?.ok_or(ReorgError::BlockNotStored(*id)))
        .collect()
}

impl<S: BlockchainStorage> Chainstate<S> {
    /// Make the best valid tip the active one after `new_block_id` entered the block tree.
    ///
    /// Returns the fork length reported for the new block: the number of blocks disconnected
    /// by a reorg, or the length of the side chain the block extends when the active tip stays.
    pub(super) fn activate_best_chain(&mut self, new_block_id: &Id<Block>) -> Result<u64, BlockError> {
        let old_tip = self.best_block_id;
        let best = match best_tip(&self.block_index, self.chainstate_config.tie_break) {
            Some(best) => *best.block_id(),
            None => return Ok(0),
        };

        if best == old_tip {
            let side_chain = reorganize(&self.block_index, &old_tip, new_block_id)?;
            log::debug!(
                "Block {new_block_id} is on a side chain forking at {}",
                side_chain.fork_point()
            );
            return Ok(side_chain.connect().len() as u64);
        }

        let plan = reorganize(&self.block_index, &old_tip, &best)?;
        let fork_len = plan.disconnect().len() as u64;
        if fork_len > 0 {
            log::info!(
                "Reorganizing from {old_tip} to {best}: {} blocks disconnected, {} connected",
                plan.disconnect().len(),
                plan.connect().len()
            );
        }

        self.apply_reorg(&plan)?;
        Ok(fork_len)
    }

    /// Switch the active chain along `plan`.
    ///
    /// Either the whole plan is committed or nothing is: the previous tip stays active when a
    /// block fails to connect or the commit fails. Observers are notified only after the commit.
    fn apply_reorg(&mut self, plan: &ReorgPlan) -> Result<(), BlockError> {
        let (disconnected, connected) = {
            let db_tx = self.chainstate_storage.transaction_ro().map_err(ReorgError::from)?;
            let disconnected = load_blocks(&db_tx, plan.disconnect())?;
            let connected = load_blocks(&db_tx, plan.connect())?;
            db_tx.close();
            (disconnected, connected)
        };

        for block in &connected {
            if let Err(error) = self.tx_verifier.check_connect(block, block.height()) {
                let block_id = block.get_id();
                log::warn!("Block {block_id} failed to connect: {error}");
                if error.classify().block_should_be_invalidated() {
                    self.invalidate_block(
                        &block_id,
                        CheckBlockError::TransactionInvalid(error.clone()),
                    )?;
                }
                return Err(ReorgError::ConnectFailed { block_id, error }.into());
            }
        }

        let new_tip = match connected.last() {
            Some(block) => block.get_id(),
            None => *plan.fork_point(),
        };

        let mut db_tx = self.chainstate_storage.transaction_rw().map_err(ReorgError::from)?;
        for block in &disconnected {
            db_tx.del_block_id_at_height(&block.height()).map_err(ReorgError::from)?;
        }
        for block in &connected {
            db_tx
                .set_block_id_at_height(&block.height(), &block.get_id())
                .map_err(ReorgError::from)?;
        }
        db_tx.set_best_block_id(&new_tip).map_err(ReorgError::from)?;
        db_tx.commit().map_err(ReorgError::CommitFailed).log_err()?;

        self.best_block_id = new_tip;

        for block in &disconnected {
            self.stake_state.block_disconnected(block, block.height());
        }
        for block in &connected {
            self.stake_state.block_connected(block, block.height());
        }

        for block in &disconnected {
            self.events_controller
                .broadcast(ChainstateEvent::BlockDisconnected(block.get_id(), block.height()));
        }
        for block in &connected {
            self.events_controller
                .broadcast(ChainstateEvent::BlockConnected(block.get_id(), block.height()));
        }

        let new_height = self
            .block_index
            .lookup(&new_tip)
            .map(|index| index.block_height())
            .ok_or(ReorgError::BlockNotStored(new_tip))?;
        self.events_controller.broadcast(ChainstateEvent::NewTip(new_tip, new_height));

        log::info!("New tip in chainstate {new_tip} with height {new_height}");
        Ok(())
    }

    /// Mark a block invalid along with its descendants.
    ///
    /// The new statuses reach the in-memory index only once they are committed.
    pub(super) fn invalidate_block(
        &mut self,
        block_id: &Id<Block>,
        reason: CheckBlockError,
    ) -> Result<(), BlockError> {
        let changed = self.block_index.status_changes(block_id, BlockStatus::Invalid)?;
        self.commit_with_retry(*block_id, |db_tx| {
            changed.iter().try_for_each(|index| db_tx.set_block_index(index))
        })?;
        self.block_index.set_status(block_id, BlockStatus::Invalid)?;
        self.invalid_reasons.insert(*block_id, reason);
        Ok(())
    }
}
