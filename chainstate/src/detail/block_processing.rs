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

use std::collections::VecDeque;

use chainstate_storage::{BlockchainStorage, BlockchainStorageWrite, TransactionRw};
use chainstate_types::{BlockIndex, BlockStatus};
use common::{
    chain::Block,
    primitives::{ChainWork, Id, Idable},
};
use logging::log;
use utils::tap_log::TapLog;

use super::{
    error_classification::BlockProcessingErrorClassification, BlockError, BlockProcessingFlags,
    Chainstate, CheckBlockError, ProcessBlockOutcome,
};

impl<S: BlockchainStorage> Chainstate<S> {
    /// Submit a block, then retry every orphan that was waiting for it.
    ///
    /// An orphan is reported as such and is not an error. Only a block that is definitely bad is
    /// recorded as invalid; a block rejected for any other reason leaves no trace and may be
    /// submitted again. When the block enters the block tree,
    /// whether valid or not, the orphans descending from it are processed too; the error of the
    /// submitted block wins, otherwise the first error among the orphans is returned.
    pub fn process_block(
        &mut self,
        block: Block,
        flags: BlockProcessingFlags,
    ) -> Result<ProcessBlockOutcome, BlockError> {
        let block_id = block.get_id();
        log::debug!("Processing block {block_id} at height {}", block.height());

        let result = self.attempt_to_process_block(block, flags);

        let orphans_result = if self.block_index.contains(&block_id) {
            self.process_orphans_of(&block_id, flags)
        } else {
            Ok(())
        };

        let outcome = result?;
        orphans_result?;
        Ok(outcome)
    }

    fn attempt_to_process_block(
        &mut self,
        block: Block,
        flags: BlockProcessingFlags,
    ) -> Result<ProcessBlockOutcome, BlockError> {
        let block_id = block.get_id();

        if self.block_index.contains(&block_id)
            || self.orphan_blocks.is_already_an_orphan(&block_id)
        {
            return Err(CheckBlockError::DuplicateBlock(block_id).into());
        }

        let parent = match self.block_index.lookup(&block.prev_block_id()) {
            Some(parent) => parent.clone(),
            None => {
                // Orphans are never indexed, whatever the outcome
                self.validator().check_structure(&block, flags).log_warn()?;
                let now = self.time_getter.get_time();
                self.orphan_blocks.add_block(block, now).log_err()?;
                log::debug!("Block {block_id} is an orphan");
                return Ok(ProcessBlockOutcome::orphan());
            }
        };

        let validation = self.validator().validate(&block, &parent, flags);
        if let Err(err) = &validation {
            if !err.classify().block_should_be_invalidated() {
                log::warn!("Block {block_id} rejected, nothing recorded: {err}");
                return Err(err.clone().into());
            }
        }

        let block_work = ChainWork::from_bits(block.bits()).unwrap_or(ChainWork::zero());
        let chain_work = parent
            .chain_work()
            .checked_add(block_work)
            .ok_or(BlockError::ChainWorkOverflow(block_id))?;
        let mut block_index = BlockIndex::new(
            &block,
            chain_work,
            self.block_index.next_sequence(),
            BlockStatus::ValidateInProgress,
        );

        if let Err(err) = validation {
            let status = match err {
                CheckBlockError::InvalidAncestor(_) => BlockStatus::InvalidAncestor,
                _ => BlockStatus::Invalid,
            };
            block_index.set_status(status);
            log::warn!("Block {block_id} rejected: {err}");

            self.commit_with_retry(block_id, |db_tx| db_tx.set_block_index(&block_index))?;
            self.block_index.insert(block_index)?;
            self.invalid_reasons.insert(block_id, err.clone());
            return Err(err.into());
        }

        block_index.set_status(BlockStatus::Valid);
        self.commit_with_retry(block_id, |db_tx| {
            db_tx.add_block(&block)?;
            db_tx.set_block_index(&block_index)
        })?;
        self.block_index.insert(block_index)?;
        log::debug!("Block {block_id} accepted into the block tree");

        let fork_len = self.activate_best_chain(&block_id)?;
        Ok(ProcessBlockOutcome::accepted(fork_len))
    }

    /// Process the orphans descending from `block_id`, breadth-first.
    ///
    /// A rejected orphan does not stop the sweep: its own orphans are still pulled and rejected
    /// as descendants of an invalid block.
    fn process_orphans_of(
        &mut self,
        block_id: &Id<Block>,
        flags: BlockProcessingFlags,
    ) -> Result<(), BlockError> {
        let mut first_error = None;

        let mut orphan_process_queue: VecDeque<Id<Block>> = VecDeque::from([*block_id]);
        while let Some(parent_id) = orphan_process_queue.pop_front() {
            for orphan in self.orphan_blocks.take_all_children_of(&parent_id) {
                let orphan_id = orphan.get_id();
                if let Err(err) = self.attempt_to_process_block(orphan, flags) {
                    log::warn!("Orphan block {orphan_id} failed to process: {err}");
                    first_error.get_or_insert(err);
                }
                if self.block_index.contains(&orphan_id) {
                    orphan_process_queue.push_back(orphan_id);
                }
            }
        }

        first_error.map_or(Ok(()), Err)
    }

    /// Run `write` in a fresh read-write transaction and commit it, retrying failed commits up
    /// to the configured number of attempts
    pub(super) fn commit_with_retry(
        &self,
        block_id: Id<Block>,
        mut write: impl FnMut(&mut dyn BlockchainStorageWrite) -> chainstate_storage::Result<()>,
    ) -> Result<(), BlockError> {
        let max_attempts = std::cmp::max(self.chainstate_config.max_db_commit_attempts, 1);

        let mut attempt = 1;
        loop {
            let mut db_tx = self.chainstate_storage.transaction_rw()?;
            write(&mut db_tx)?;
            match db_tx.commit() {
                Ok(()) => return Ok(()),
                Err(err) if attempt >= max_attempts => {
                    return Err(BlockError::DatabaseCommitError(block_id, attempt, err)).log_err()
                }
                Err(err) => {
                    log::warn!("Commit for block {block_id} failed, attempt #{attempt}: {err}");
                    attempt += 1;
                }
            }
        }
    }
}
