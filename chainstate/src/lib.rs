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

//! Block acceptance and best chain selection for a hybrid proof-of-work/proof-of-stake chain.
//!
//! Blocks enter through [ChainstateInterface::process_block]. A block is either stored as an
//! orphan until its parent shows up, rejected by the consensus checks, or added to the block
//! tree; the active chain then follows the valid tip with the most work.

pub mod collaborators;
mod config;
mod detail;
mod handle;
mod interface;

use std::sync::Arc;

use chainstate_storage::BlockchainStorage;
use common::{
    chain::{Block, ChainConfig},
    primitives::{BlockHeight, Id},
    time_getter::TimeGetter,
};

use collaborators::Collaborators;
use detail::Chainstate;
use interface::chainstate_interface_impl::ChainstateInterfaceImpl;

pub use chainstate_types::{BlockIndex, BlockStatus, PropertyQueryError};
pub use interface::{chainstate_interface, chainstate_interface_impl_delegation};

pub use crate::{
    chainstate_interface::ChainstateInterface,
    config::{ChainstateConfig, TieBreakPolicy},
    detail::{
        best_tip, calculate_median_time_past, reorganize, BlockError, BlockIndexError,
        BlockIndexMap, BlockProcessingFlags, CheckBlockError, ConsensusValidator,
        ContextualError, InitializationError, OrphanAddError, OrphanBlocksPool,
        ProcessBlockOutcome, ReorgError, ReorgPlan, StructuralError,
    },
    handle::ChainstateHandle,
};

/// Changes of the active chain, broadcast after they are committed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChainstateEvent {
    NewTip(Id<Block>, BlockHeight),
    BlockConnected(Id<Block>, BlockHeight),
    BlockDisconnected(Id<Block>, BlockHeight),
}

#[derive(thiserror::Error, Debug, PartialEq, Eq, Clone)]
pub enum ChainstateError {
    #[error("Initialization error: {0}")]
    FailedToInitializeChainstate(#[from] InitializationError),
    #[error("Block processing failed: `{0}`")]
    ProcessBlockError(#[from] BlockError),
    #[error("Property read error: `{0}`")]
    FailedToReadProperty(#[from] PropertyQueryError),
}

pub fn make_chainstate<S: BlockchainStorage + 'static>(
    chain_config: Arc<ChainConfig>,
    chainstate_config: ChainstateConfig,
    chainstate_storage: S,
    collaborators: Collaborators,
    time_getter: TimeGetter,
) -> Result<Box<dyn ChainstateInterface>, ChainstateError> {
    let chainstate = Chainstate::new(
        chain_config,
        chainstate_config,
        chainstate_storage,
        collaborators,
        time_getter,
    )?;
    let chainstate_interface = ChainstateInterfaceImpl::new(chainstate);
    Ok(Box::new(chainstate_interface))
}
