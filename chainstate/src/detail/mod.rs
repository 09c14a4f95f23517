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

mod block_index_map;
mod block_processing;
mod chain_selector;
mod consensus_validator;
mod error;
mod error_classification;
mod initialization;
mod median_time;
mod orphan_blocks;
mod query;
mod reorg;

#[cfg(test)]
mod tests;

use std::{collections::BTreeMap, sync::Arc};

use common::{
    chain::{Block, ChainConfig},
    primitives::Id,
    time_getter::TimeGetter,
};
use utils::eventhandler::{EventHandler, EventsController};

use crate::{
    collaborators::{DifficultyOracle, StakeState, TransactionVerifier},
    ChainstateConfig, ChainstateEvent,
};

pub use self::{
    block_index_map::{BlockIndexError, BlockIndexMap},
    chain_selector::{best_tip, reorganize, ReorgPlan},
    consensus_validator::{BlockProcessingFlags, ConsensusValidator},
    error::*,
    median_time::calculate_median_time_past,
    orphan_blocks::{OrphanAddError, OrphanBlocksPool},
};

type ChainstateEventHandler = EventHandler<ChainstateEvent>;

/// Result of submitting a block
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcessBlockOutcome {
    fork_len: u64,
    is_orphan: bool,
}

impl ProcessBlockOutcome {
    fn orphan() -> Self {
        Self {
            fork_len: 0,
            is_orphan: true,
        }
    }

    fn accepted(fork_len: u64) -> Self {
        Self {
            fork_len,
            is_orphan: false,
        }
    }

    /// Distance from the previous tip to the fork point for a reorg, from the fork point to the
    /// block for a side chain, zero when the block extended the active tip
    pub fn fork_len(&self) -> u64 {
        self.fork_len
    }

    /// The parent is unknown and the block waits in the orphan pool
    pub fn is_orphan(&self) -> bool {
        self.is_orphan
    }

    /// The block was appended right on top of the active tip
    pub fn extends_tip(&self) -> bool {
        !self.is_orphan && self.fork_len == 0
    }
}

/// Block acceptance and chain selection over a block store.
///
/// The block tree lives in memory and is rebuilt from storage on start. Storage holds the blocks,
/// their index entries, the active chain by height and the best block id.
pub struct Chainstate<S> {
    chain_config: Arc<ChainConfig>,
    chainstate_config: ChainstateConfig,
    chainstate_storage: S,
    block_index: BlockIndexMap,
    orphan_blocks: OrphanBlocksPool,
    best_block_id: Id<Block>,
    // Why each invalid block was rejected; not persisted
    invalid_reasons: BTreeMap<Id<Block>, CheckBlockError>,
    stake_state: Box<dyn StakeState>,
    tx_verifier: Box<dyn TransactionVerifier>,
    difficulty: Box<dyn DifficultyOracle>,
    time_getter: TimeGetter,
    events_controller: EventsController<ChainstateEvent>,
}

impl<S> Chainstate<S> {
    pub fn subscribe_to_events(&mut self, handler: ChainstateEventHandler) {
        self.events_controller.subscribe_to_events(handler);
    }

    pub fn wait_for_all_events(&self) {
        self.events_controller.wait_for_all_events();
    }

    pub fn chain_config(&self) -> &Arc<ChainConfig> {
        &self.chain_config
    }

    pub fn chainstate_config(&self) -> &ChainstateConfig {
        &self.chainstate_config
    }

    fn validator(&self) -> ConsensusValidator<'_> {
        ConsensusValidator::new(
            &self.chain_config,
            &self.block_index,
            self.stake_state.as_ref(),
            self.tx_verifier.as_ref(),
            self.difficulty.as_ref(),
            &self.time_getter,
        )
    }
}
