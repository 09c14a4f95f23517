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

use common::{
    chain::{Block, OutPoint, Transaction},
    primitives::{BlockHeight, Id},
};
use thiserror::Error;

use super::StakeStateError;

#[derive(Error, Debug, PartialEq, Eq, Clone)]
pub enum TransactionVerifierError {
    #[error("Input {0} spends an unknown or already spent output")]
    MissingInput(OutPoint),
    #[error("Input {outpoint} spends a coinbase output from height {created} at height {spend_height} before it matured")]
    ImmatureCoinbaseSpend {
        outpoint: OutPoint,
        created: BlockHeight,
        spend_height: BlockHeight,
    },
    #[error("Transaction {tx} rejected: {reason}")]
    TransactionRejected { tx: Id<Transaction>, reason: String },
    #[error("Block {block} cannot be connected: {reason}")]
    ConnectRejected { block: Id<Block>, reason: String },
    #[error("Stake state error: {0}")]
    StakeState(#[from] StakeStateError),
}

/// Script and signature checks, opaque to the chainstate
pub trait TransactionVerifier: Send + Sync {
    /// Check a transaction of a block built on `parent`, to be included at `spend_height`
    fn check_transaction(
        &self,
        tx: &Transaction,
        parent: &Id<Block>,
        spend_height: BlockHeight,
    ) -> Result<(), TransactionVerifierError>;

    /// Final state check of a block about to be connected to the active chain
    fn check_connect(&self, block: &Block, height: BlockHeight)
        -> Result<(), TransactionVerifierError>;
}

/// Verifier for nodes where scripts are checked elsewhere
#[derive(Debug, Clone, Copy, Default)]
pub struct AcceptAllTransactions;

impl TransactionVerifier for AcceptAllTransactions {
    fn check_transaction(
        &self,
        _tx: &Transaction,
        _parent: &Id<Block>,
        _spend_height: BlockHeight,
    ) -> Result<(), TransactionVerifierError> {
        Ok(())
    }

    fn check_connect(
        &self,
        _block: &Block,
        _height: BlockHeight,
    ) -> Result<(), TransactionVerifierError> {
        Ok(())
    }
}
