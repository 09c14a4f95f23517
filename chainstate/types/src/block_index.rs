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
    chain::{Block, BlockHeader, BlockTimestamp},
    primitives::{BlockHeight, ChainWork, Compact, Id, Idable},
};
use parity_scale_codec::{Decode, Encode};

use crate::BlockStatus;

/// Metadata of a block known to the node: a node of the block tree.
#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode)]
pub struct BlockIndex {
    block_id: Id<Block>,
    block_header: BlockHeader,
    /// The total work of the chain up to and including this block
    chain_work: ChainWork,
    /// Position in acceptance order. Used to break chain work ties.
    #[codec(compact)]
    sequence: u64,
    status: BlockStatus,
}

impl BlockIndex {
    pub fn new(block: &Block, chain_work: ChainWork, sequence: u64, status: BlockStatus) -> Self {
        Self {
            block_id: block.get_id(),
            block_header: block.header().clone(),
            chain_work,
            sequence,
            status,
        }
    }

    pub fn block_id(&self) -> &Id<Block> {
        &self.block_id
    }

    pub fn prev_block_id(&self) -> &Id<Block> {
        &self.block_header.prev_block_id
    }

    pub fn block_height(&self) -> BlockHeight {
        self.block_header.height
    }

    pub fn block_timestamp(&self) -> BlockTimestamp {
        self.block_header.timestamp
    }

    pub fn bits(&self) -> Compact {
        self.block_header.bits
    }

    pub fn chain_work(&self) -> ChainWork {
        self.chain_work
    }

    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    pub fn block_header(&self) -> &BlockHeader {
        &self.block_header
    }

    pub fn status(&self) -> BlockStatus {
        self.status
    }

    pub fn set_status(&mut self, status: BlockStatus) {
        self.status = status;
    }

    pub fn with_status(mut self, status: BlockStatus) -> Self {
        self.status = status;
        self
    }

    pub fn into_block_header(self) -> BlockHeader {
        self.block_header
    }
}
