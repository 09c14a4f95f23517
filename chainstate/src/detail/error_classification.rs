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

use crate::collaborators::{StakeStateError, TransactionVerifierError};

use super::{BlockError, CheckBlockError, ContextualError, ReorgError, StructuralError};

/// Block processing errors fall into classes that decide what is recorded about the block.
/// Only a block that is definitely bad enters the block tree as invalid. Everything else is
/// returned to the caller and leaves no trace, so the same block can be submitted again.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum BlockProcessingErrorClass {
    /// General error - the operation failed due to storage or collaborator issues.
    General,
    /// This error type signifies that the block is definitely bad.
    BadBlock,
    /// This error type signifies that the block is bad at this moment, but might become ok later.
    TemporarilyBadBlock,
    /// The block is bad, but the failure is not tied to its id: the body may not be the one the
    /// header commits to, or the header was produced without any proof of work.
    UnattributableBadBlock,
}

impl BlockProcessingErrorClass {
    pub fn block_should_be_invalidated(&self) -> bool {
        match self {
            BlockProcessingErrorClass::General
            | BlockProcessingErrorClass::TemporarilyBadBlock
            | BlockProcessingErrorClass::UnattributableBadBlock => false,
            BlockProcessingErrorClass::BadBlock => true,
        }
    }
}

pub trait BlockProcessingErrorClassification {
    fn classify(&self) -> BlockProcessingErrorClass;
}

impl BlockProcessingErrorClassification for BlockError {
    fn classify(&self) -> BlockProcessingErrorClass {
        match self {
            BlockError::StorageError(_)
            | BlockError::BlockIndexError(_)
            | BlockError::DatabaseCommitError(_, _, _)
            | BlockError::ChainWorkOverflow(_)
            | BlockError::OrphanAddFailed(_)
            | BlockError::PropertyQueryError(_) => BlockProcessingErrorClass::General,

            BlockError::CheckBlockFailed(err) => err.classify(),
            BlockError::ReorgFailed(err) => err.classify(),
        }
    }
}

impl BlockProcessingErrorClassification for CheckBlockError {
    fn classify(&self) -> BlockProcessingErrorClass {
        match self {
            // The block was handled on an earlier attempt
            CheckBlockError::DuplicateBlock(_) => BlockProcessingErrorClass::General,

            CheckBlockError::InvalidAncestor(_)
            | CheckBlockError::NotEnoughVotes { .. }
            | CheckBlockError::BadCoinbaseValue { .. }
            | CheckBlockError::NoTax { .. } => BlockProcessingErrorClass::BadBlock,

            CheckBlockError::Structural(err) => err.classify(),
            CheckBlockError::Contextual(err) => err.classify(),
            CheckBlockError::TransactionInvalid(err) => err.classify(),
        }
    }
}

impl BlockProcessingErrorClassification for StructuralError {
    fn classify(&self) -> BlockProcessingErrorClass {
        match self {
            StructuralError::BadDifficultyBits(_)
            | StructuralError::DifficultyAboveLimit { .. }
            | StructuralError::InsufficientProofOfWork
            | StructuralError::NoTransactions
            | StructuralError::MerkleRootMismatch
            | StructuralError::DuplicateTransaction(_)
            | StructuralError::BlockTooLarge { .. } => {
                BlockProcessingErrorClass::UnattributableBadBlock
            }

            StructuralError::FirstTxNotCoinbase
            | StructuralError::MultipleCoinbases(_)
            | StructuralError::CoinbaseHasInputs
            | StructuralError::BadCoinbaseStructure
            | StructuralError::CoinbaseHeightMismatch(_)
            | StructuralError::CoinbaseValueOverflow
            | StructuralError::DuplicateInput(_)
            | StructuralError::VotersMismatch { .. }
            | StructuralError::FreshStakeMismatch { .. }
            | StructuralError::TooManyVotes { .. }
            | StructuralError::TooMuchFreshStake { .. } => BlockProcessingErrorClass::BadBlock,
        }
    }
}

impl BlockProcessingErrorClassification for ContextualError {
    fn classify(&self) -> BlockProcessingErrorClass {
        match self {
            ContextualError::TimestampTooFarInFuture { .. } => {
                BlockProcessingErrorClass::TemporarilyBadBlock
            }

            ContextualError::BadHeight { .. }
            | ContextualError::TimestampNotAfterMedianTime { .. }
            | ContextualError::BadDifficulty { .. }
            | ContextualError::TicketsBeforeStakeEnabled { .. }
            | ContextualError::VotesBeforeValidationHeight { .. }
            | ContextualError::VoteForWrongBlock { .. }
            | ContextualError::NotEnoughLiveTickets { .. } => BlockProcessingErrorClass::BadBlock,

            ContextualError::StakeState(err) => err.classify(),
        }
    }
}

impl BlockProcessingErrorClassification for TransactionVerifierError {
    fn classify(&self) -> BlockProcessingErrorClass {
        match self {
            TransactionVerifierError::MissingInput(_)
            | TransactionVerifierError::ImmatureCoinbaseSpend { .. }
            | TransactionVerifierError::TransactionRejected { .. }
            | TransactionVerifierError::ConnectRejected { .. } => {
                BlockProcessingErrorClass::BadBlock
            }

            TransactionVerifierError::StakeState(err) => err.classify(),
        }
    }
}

impl BlockProcessingErrorClassification for StakeStateError {
    fn classify(&self) -> BlockProcessingErrorClass {
        // Both mean the provider could not answer, which says nothing about the block
        match self {
            StakeStateError::UnknownBlock(_) | StakeStateError::ProviderFailure(_) => {
                BlockProcessingErrorClass::General
            }
        }
    }
}

impl BlockProcessingErrorClassification for ReorgError {
    fn classify(&self) -> BlockProcessingErrorClass {
        match self {
            ReorgError::ConnectFailed { block_id: _, error } => error.classify(),

            ReorgError::CommitFailed(_)
            | ReorgError::StorageError(_)
            | ReorgError::BlockNotStored(_)
            | ReorgError::BlockIndexError(_) => BlockProcessingErrorClass::General,
        }
    }
}
