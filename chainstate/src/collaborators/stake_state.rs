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
    chain::{Block, OutPoint},
    primitives::{Amount, BlockHeight, Id},
};
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq, Clone)]
pub enum StakeStateError {
    #[error("Stake state has no view as of block {0}")]
    UnknownBlock(Id<Block>),
    #[error("Stake state provider failure: {0}")]
    ProviderFailure(String),
}

/// An unspent output as seen by the stake-state provider
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UtxoEntry {
    height: BlockHeight,
    is_coinbase: bool,
    value: Amount,
}

impl UtxoEntry {
    pub fn new(height: BlockHeight, is_coinbase: bool, value: Amount) -> Self {
        Self {
            height,
            is_coinbase,
            value,
        }
    }

    /// Height of the block that created the output
    pub fn height(&self) -> BlockHeight {
        self.height
    }

    pub fn is_coinbase(&self) -> bool {
        self.is_coinbase
    }

    pub fn value(&self) -> Amount {
        self.value
    }
}

/// UTXO and ticket view of the chain.
///
/// Queries are read-only. The chainstate reports every change of the active chain through
/// `block_connected`/`block_disconnected`, after the change is committed, in the order the
/// blocks were disconnected and connected.
pub trait StakeState: Send + Sync {
    /// The output, if it exists and is unspent in the chain ending at `as_of`
    fn spendable_output(
        &self,
        outpoint: &OutPoint,
        as_of: &Id<Block>,
    ) -> Result<Option<UtxoEntry>, StakeStateError>;

    /// Number of tickets that may vote on a block built on `parent`
    fn live_tickets(&self, parent: &Id<Block>) -> Result<u32, StakeStateError>;

    fn block_connected(&mut self, block: &Block, height: BlockHeight);

    fn block_disconnected(&mut self, block: &Block, height: BlockHeight);
}
