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

use chainstate_types::PropertyQueryError;
use common::{
    chain::{Block, OutPoint, Transaction},
    primitives::{Amount, BlockHeight, Compact, Id},
};
use thiserror::Error;

use super::{block_index_map::BlockIndexError, orphan_blocks::OrphanAddError};
use crate::collaborators::{StakeStateError, TransactionVerifierError};

#[derive(Error, Debug, PartialEq, Eq, Clone)]
pub enum BlockError {
    #[error("Block storage error: `{0}`")]
    StorageError(#[from] chainstate_storage::Error),
    #[error("Check block failed: {0}")]
    CheckBlockFailed(#[from] CheckBlockError),
    #[error("Block index error: {0}")]
    BlockIndexError(#[from] BlockIndexError),
    #[error("Reorganization failed, the previous tip stays active: {0}")]
    ReorgFailed(#[from] ReorgError),
    #[error("Failed to commit block state update to database for block: {0} after {1} attempts with error {2}")]
    DatabaseCommitError(Id<Block>, usize, chainstate_storage::Error),
    #[error("Chain work overflow for block {0}")]
    ChainWorkOverflow(Id<Block>),
    #[error("Orphan block rejected: {0}")]
    OrphanAddFailed(#[from] OrphanAddError),
    #[error("Property query error: {0}")]
    PropertyQueryError(#[from] PropertyQueryError),
}

/// Consensus rejection of a block
#[derive(Error, Debug, PartialEq, Eq, Clone)]
pub enum CheckBlockError {
    #[error("Block {0} is already known")]
    DuplicateBlock(Id<Block>),
    #[error("Structural check failed: {0}")]
    Structural(#[from] StructuralError),
    #[error("Contextual check failed: {0}")]
    Contextual(#[from] ContextualError),
    #[error("Parent {0} is invalid")]
    InvalidAncestor(Id<Block>),
    #[error("Block carries {got} votes but {required} are required")]
    NotEnoughVotes { got: u16, required: u16 },
    #[error("Coinbase pays {paid} of proof-of-work subsidy, expected {expected}")]
    BadCoinbaseValue { expected: Amount, paid: Amount },
    #[error("Coinbase pays {paid} of dev-org tax, expected {expected}")]
    NoTax { expected: Amount, paid: Amount },
    #[error("Transaction validation failed: {0}")]
    TransactionInvalid(#[from] TransactionVerifierError),
}

/// Context-free block defects
#[derive(Error, Debug, PartialEq, Eq, Clone)]
pub enum StructuralError {
    #[error("Block has no transactions")]
    NoTransactions,
    #[error("Block size {size} exceeds the limit {max}")]
    BlockTooLarge { size: usize, max: usize },
    #[error("Block has an invalid merkle root")]
    MerkleRootMismatch,
    #[error("Difficulty bits {0:?} do not encode a valid target")]
    BadDifficultyBits(Compact),
    #[error("Difficulty bits {bits:?} are easier than the limit {limit:?}")]
    DifficultyAboveLimit { bits: Compact, limit: Compact },
    #[error("Block hash does not meet its target")]
    InsufficientProofOfWork,
    #[error("First transaction is not a coinbase")]
    FirstTxNotCoinbase,
    #[error("Coinbase transaction {0} found after the first position")]
    MultipleCoinbases(Id<Transaction>),
    #[error("Coinbase transaction has inputs")]
    CoinbaseHasInputs,
    #[error("Coinbase lacks the tax or height commitment output")]
    BadCoinbaseStructure,
    #[error("Coinbase does not commit to the block height {0}")]
    CoinbaseHeightMismatch(BlockHeight),
    #[error("Coinbase output values overflow")]
    CoinbaseValueOverflow,
    #[error("Duplicate transaction {0} in block")]
    DuplicateTransaction(Id<Transaction>),
    #[error("Output {0} spent twice in block")]
    DuplicateInput(OutPoint),
    #[error("Header declares {header} voters but the block carries {actual} votes")]
    VotersMismatch { header: u16, actual: usize },
    #[error("Header declares {header} fresh stake but the block carries {actual} ticket purchases")]
    FreshStakeMismatch { header: u8, actual: usize },
    #[error("Block carries {got} votes, at most {max} allowed")]
    TooManyVotes { got: u16, max: u16 },
    #[error("Block carries {got} ticket purchases, at most {max} allowed")]
    TooMuchFreshStake { got: u8, max: u8 },
}

/// Defects relative to the parent and the chain it extends
#[derive(Error, Debug, PartialEq, Eq, Clone)]
pub enum ContextualError {
    #[error("Block height {got} does not follow the parent, expected {expected}")]
    BadHeight { expected: BlockHeight, got: BlockHeight },
    #[error("Block time {timestamp} is not after the median time past {median}")]
    TimestampNotAfterMedianTime { timestamp: u64, median: u64 },
    #[error("Block time {timestamp} is too far in the future, the limit is {max}")]
    TimestampTooFarInFuture { timestamp: u64, max: u64 },
    #[error("Block declares difficulty {got:?}, expected {expected:?}")]
    BadDifficulty { expected: Compact, got: Compact },
    #[error("Ticket purchases at height {height} before stake is enabled at {enabled_at}")]
    TicketsBeforeStakeEnabled { height: BlockHeight, enabled_at: BlockHeight },
    #[error("Votes at height {height} before the stake validation height {validation_height}")]
    VotesBeforeValidationHeight {
        height: BlockHeight,
        validation_height: BlockHeight,
    },
    #[error("Vote {tx} is for block {voted}, expected the parent {expected}")]
    VoteForWrongBlock {
        tx: Id<Transaction>,
        voted: Id<Block>,
        expected: Id<Block>,
    },
    #[error("Block carries {votes} votes but only {live} tickets are live")]
    NotEnoughLiveTickets { votes: u16, live: u32 },
    #[error("Stake state error: {0}")]
    StakeState(#[from] StakeStateError),
}

/// Causes of an aborted reorganization
#[derive(Error, Debug, PartialEq, Eq, Clone)]
pub enum ReorgError {
    #[error("Connecting block {block_id} failed: {error}")]
    ConnectFailed {
        block_id: Id<Block>,
        error: TransactionVerifierError,
    },
    #[error("Failed to commit the reorganization: {0}")]
    CommitFailed(chainstate_storage::Error),
    #[error("Storage error during reorganization: {0}")]
    StorageError(#[from] chainstate_storage::Error),
    #[error("Block {0} on the new chain is not stored")]
    BlockNotStored(Id<Block>),
    #[error("Block index error: {0}")]
    BlockIndexError(#[from] BlockIndexError),
}

/// Failures while opening a chainstate over a store
#[derive(Error, Debug, PartialEq, Eq, Clone)]
pub enum InitializationError {
    #[error("Storage error: {0}")]
    StorageError(#[from] chainstate_storage::Error),
    #[error("Unsupported storage version {0}")]
    UnsupportedStorageVersion(u32),
    #[error("Stored genesis {stored} does not match the configured genesis {expected}")]
    GenesisMismatch {
        stored: Id<Block>,
        expected: Id<Block>,
    },
    #[error("Best block {0} has no stored index")]
    BestBlockIndexNotFound(Id<Block>),
    #[error("Storage has a version but no best block")]
    BestBlockNotFound,
    #[error("Storage has no block at height zero")]
    GenesisNotStored,
    #[error("Rebuilding the block index failed: {0}")]
    BlockIndexError(#[from] BlockIndexError),
    #[error("Invalid genesis difficulty {0:?}")]
    InvalidGenesisBits(Compact),
}
