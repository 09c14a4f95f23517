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

//! Choice of the best chain and the plan to switch to it.

use std::cmp::Ordering;

use chainstate_types::BlockIndex;
use common::{chain::Block, primitives::Id};

use super::block_index_map::{BlockIndexError, BlockIndexMap};
use crate::TieBreakPolicy;

/// Blocks to disconnect and connect to move the active chain from one tip to another
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReorgPlan {
    fork_point: Id<Block>,
    disconnect: Vec<Id<Block>>,
    connect: Vec<Id<Block>>,
}

impl ReorgPlan {
    /// The last block both chains share
    pub fn fork_point(&self) -> &Id<Block> {
        &self.fork_point
    }

    /// From the old tip down to the fork point (exclusive), descending height
    pub fn disconnect(&self) -> &[Id<Block>] {
        &self.disconnect
    }

    /// From the fork point (exclusive) up to the new tip, ascending height
    pub fn connect(&self) -> &[Id<Block>] {
        &self.connect
    }

    pub fn is_empty(&self) -> bool {
        self.disconnect.is_empty() && self.connect.is_empty()
    }
}

/// Order of two tips under the policy; `Greater` means `a` is preferred
fn compare_tips(policy: TieBreakPolicy, a: &BlockIndex, b: &BlockIndex) -> Ordering {
    a.chain_work().cmp(&b.chain_work()).then_with(|| match policy {
        TieBreakPolicy::FirstSeen => b.sequence().cmp(&a.sequence()),
        TieBreakPolicy::LowestId => b.block_id().cmp(a.block_id()),
    })
}

/// The valid leaf with the most chain work, ties resolved by `policy`
pub fn best_tip(block_index: &BlockIndexMap, policy: TieBreakPolicy) -> Option<&BlockIndex> {
    block_index.leaf_tips().max_by(|a, b| compare_tips(policy, a, b))
}

/// Plan the switch from `old_tip` to `new_tip` by walking both chains back to their fork point
pub fn reorganize(
    block_index: &BlockIndexMap,
    old_tip: &Id<Block>,
    new_tip: &Id<Block>,
) -> Result<ReorgPlan, BlockIndexError> {
    let lookup = |id: &Id<Block>| {
        block_index.lookup(id).ok_or(BlockIndexError::NodeNotFound(*id))
    };

    let mut old = lookup(old_tip)?;
    let mut new = lookup(new_tip)?;
    let mut disconnect = Vec::new();
    let mut connect = Vec::new();

    while old.block_height() > new.block_height() {
        disconnect.push(*old.block_id());
        old = lookup(old.prev_block_id())?;
    }
    while new.block_height() > old.block_height() {
        connect.push(*new.block_id());
        new = lookup(new.prev_block_id())?;
    }
    while old.block_id() != new.block_id() {
        disconnect.push(*old.block_id());
        connect.push(*new.block_id());
        old = lookup(old.prev_block_id())?;
        new = lookup(new.prev_block_id())?;
    }

    connect.reverse();
    Ok(ReorgPlan {
        fork_point: *old.block_id(),
        disconnect,
        connect,
    })
}
