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

//! In-memory block tree.
//!
//! Nodes live in an arena and refer to each other by arena position. Each node knows its parent
//! and children, so invalidity can be pushed down a subtree breadth-first. The set of leaf tips
//! (valid nodes without a valid child) is kept up to date on every change.

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use chainstate_types::{BlockIndex, BlockStatus};
use common::{chain::Block, primitives::Id};
use logging::log;
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq, Clone)]
pub enum BlockIndexError {
    #[error("Block index already contains block {0}")]
    DuplicateNode(Id<Block>),
    #[error("Block {0} is not in the block index")]
    NodeNotFound(Id<Block>),
    #[error("Parent {parent} of block {block} is not in the block index")]
    ParentNotFound { block: Id<Block>, parent: Id<Block> },
}

type NodeIdx = usize;

struct Node {
    index: BlockIndex,
    parent: Option<NodeIdx>,
    children: Vec<NodeIdx>,
}

#[derive(Default)]
pub struct BlockIndexMap {
    nodes: Vec<Node>,
    by_id: BTreeMap<Id<Block>, NodeIdx>,
    leaf_tips: BTreeSet<NodeIdx>,
    next_sequence: u64,
}

impl BlockIndexMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Sequence number to give the next inserted node
    pub fn next_sequence(&self) -> u64 {
        self.next_sequence
    }

    /// Add a node. Only the genesis node (height zero) may come without an indexed parent.
    pub fn insert(&mut self, block_index: BlockIndex) -> Result<(), BlockIndexError> {
        let block_id = *block_index.block_id();
        if self.by_id.contains_key(&block_id) {
            return Err(BlockIndexError::DuplicateNode(block_id));
        }

        let parent = match self.by_id.get(block_index.prev_block_id()) {
            Some(parent) => Some(*parent),
            None if block_index.block_height().is_genesis() => None,
            None => {
                return Err(BlockIndexError::ParentNotFound {
                    block: block_id,
                    parent: *block_index.prev_block_id(),
                })
            }
        };

        let idx = self.nodes.len();
        self.next_sequence = std::cmp::max(self.next_sequence, block_index.sequence() + 1);
        self.nodes.push(Node {
            index: block_index,
            parent,
            children: Vec::new(),
        });
        self.by_id.insert(block_id, idx);

        if let Some(parent) = parent {
            self.nodes[parent].children.push(idx);
            self.refresh_tip(parent);
        }
        self.refresh_tip(idx);

        Ok(())
    }

    pub fn lookup(&self, block_id: &Id<Block>) -> Option<&BlockIndex> {
        let node = self.by_id.get(block_id).map(|idx| &self.nodes[*idx].index);
        log::trace!("Block index lookup {block_id}: found={}", node.is_some());
        node
    }

    pub fn contains(&self, block_id: &Id<Block>) -> bool {
        self.by_id.contains_key(block_id)
    }

    /// Up to `count` nearest ancestors of the block, parent first
    pub fn ancestors(&self, block_id: &Id<Block>, count: usize) -> Vec<&BlockIndex> {
        let mut result = Vec::with_capacity(count);
        let mut current = self.by_id.get(block_id).and_then(|idx| self.nodes[*idx].parent);
        while let Some(idx) = current {
            if result.len() == count {
                break;
            }
            result.push(&self.nodes[idx].index);
            current = self.nodes[idx].parent;
        }
        result
    }

    /// Change the status of a node.
    ///
    /// A node newly marked `Invalid` turns every valid or undecided descendant into
    /// `InvalidAncestor`. Returns every node whose status changed, the target first.
    pub fn set_status(
        &mut self,
        block_id: &Id<Block>,
        status: BlockStatus,
    ) -> Result<Vec<BlockIndex>, BlockIndexError> {
        let idx = *self.by_id.get(block_id).ok_or(BlockIndexError::NodeNotFound(*block_id))?;
        let changed = self.cascade(idx, status);
        if changed.is_empty() {
            return Ok(Vec::new());
        }

        for (node, new_status) in &changed {
            self.nodes[*node].index.set_status(*new_status);
        }
        if changed.len() > 1 {
            log::debug!(
                "Block {block_id} marked {status}, {} descendants marked invalid-ancestor",
                changed.len() - 1
            );
        }

        for (node, _) in &changed {
            self.refresh_tip(*node);
        }
        if let Some(parent) = self.nodes[idx].parent {
            self.refresh_tip(parent);
        }

        Ok(changed.into_iter().map(|(idx, _)| self.nodes[idx].index.clone()).collect())
    }

    /// The entries `set_status` would change, carrying their new statuses, with the map left as is
    pub fn status_changes(
        &self,
        block_id: &Id<Block>,
        status: BlockStatus,
    ) -> Result<Vec<BlockIndex>, BlockIndexError> {
        let idx = *self.by_id.get(block_id).ok_or(BlockIndexError::NodeNotFound(*block_id))?;
        let changes = self
            .cascade(idx, status)
            .into_iter()
            .map(|(node, new_status)| {
                let mut index = self.nodes[node].index.clone();
                index.set_status(new_status);
                index
            })
            .collect();
        Ok(changes)
    }

    fn cascade(&self, idx: NodeIdx, status: BlockStatus) -> Vec<(NodeIdx, BlockStatus)> {
        if self.nodes[idx].index.status() == status {
            return Vec::new();
        }

        let mut changed = vec![(idx, status)];
        if status.is_invalid() {
            let mut queue: VecDeque<NodeIdx> = self.nodes[idx].children.iter().copied().collect();
            while let Some(child) = queue.pop_front() {
                // An invalid node already has an invalid subtree
                if self.nodes[child].index.status().is_invalid() {
                    continue;
                }
                changed.push((child, BlockStatus::InvalidAncestor));
                queue.extend(self.nodes[child].children.iter().copied());
            }
        }
        changed
    }

    /// Valid nodes with no valid child
    pub fn leaf_tips(&self) -> impl Iterator<Item = &BlockIndex> {
        self.leaf_tips.iter().map(|idx| &self.nodes[*idx].index)
    }

    /// Ids of all known descendants of a block, breadth-first
    pub fn descendants(&self, block_id: &Id<Block>) -> Vec<Id<Block>> {
        let mut result = Vec::new();
        let mut queue: VecDeque<NodeIdx> = match self.by_id.get(block_id) {
            Some(idx) => self.nodes[*idx].children.iter().copied().collect(),
            None => return result,
        };
        while let Some(idx) = queue.pop_front() {
            result.push(*self.nodes[idx].index.block_id());
            queue.extend(self.nodes[idx].children.iter().copied());
        }
        result
    }

    fn refresh_tip(&mut self, idx: NodeIdx) {
        let node = &self.nodes[idx];
        let is_tip = node.index.status().is_valid()
            && node.children.iter().all(|child| !self.nodes[*child].index.status().is_valid());
        if is_tip {
            self.leaf_tips.insert(idx);
        } else {
            self.leaf_tips.remove(&idx);
        }
    }
}
