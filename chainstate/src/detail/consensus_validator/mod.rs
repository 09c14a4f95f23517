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

//! Consensus checks a block must pass before it joins the block tree

mod coinbase;
mod contextual;
mod structural;
mod transactions;

use chainstate_types::BlockIndex;
use common::{
    chain::{Block, ChainConfig},
    primitives::Idable,
    time_getter::TimeGetter,
};
use utils::ensure;

use super::{block_index_map::BlockIndexMap, CheckBlockError};
use crate::collaborators::{DifficultyOracle, StakeState, TransactionVerifier};

/// Adjusts which checks `process_block` runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BlockProcessingFlags {
    #[default]
    None,
    /// Skip the check of the block hash against its target. Meant for tests and trusted imports.
    NoPoWCheck,
}

pub struct ConsensusValidator<'a> {
    chain_config: &'a ChainConfig,
    block_index: &'a BlockIndexMap,
    stake_state: &'a dyn StakeState,
    tx_verifier: &'a dyn TransactionVerifier,
    difficulty: &'a dyn DifficultyOracle,
    time_getter: &'a TimeGetter,
}

impl<'a> ConsensusValidator<'a> {
    pub fn new(
        chain_config: &'a ChainConfig,
        block_index: &'a BlockIndexMap,
        stake_state: &'a dyn StakeState,
        tx_verifier: &'a dyn TransactionVerifier,
        difficulty: &'a dyn DifficultyOracle,
        time_getter: &'a TimeGetter,
    ) -> Self {
        Self {
            chain_config,
            block_index,
            stake_state,
            tx_verifier,
            difficulty,
            time_getter,
        }
    }

    /// Run every consensus check on a block whose parent is indexed.
    ///
    /// Checks run in a fixed order and the first failure is returned: duplicate, structure,
    /// context, work subsidy, tax, then transactions.
    pub fn validate(
        &self,
        block: &Block,
        parent: &BlockIndex,
        flags: BlockProcessingFlags,
    ) -> Result<(), CheckBlockError> {
        let block_id = block.get_id();
        ensure!(
            !self.block_index.lookup(&block_id).is_some_and(|bi| bi.status().is_final()),
            CheckBlockError::DuplicateBlock(block_id)
        );

        self.check_structure(block, flags)?;
        self.check_block_context(block, parent)?;
        coinbase::check_work_subsidy(self.chain_config, block)?;
        coinbase::check_tax(self.chain_config, block)?;
        self.check_block_transactions(block)?;

        Ok(())
    }

    /// The checks that need neither the parent nor the chain state
    pub fn check_structure(
        &self,
        block: &Block,
        flags: BlockProcessingFlags,
    ) -> Result<(), CheckBlockError> {
        structural::check_block_structure(self.chain_config, block, flags)?;
        Ok(())
    }
}
