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

use std::{
    collections::{BTreeMap, VecDeque},
    time::Duration,
};

use common::{
    chain::Block,
    primitives::{Id, Idable},
};
use logging::log;
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq, Clone)]
pub enum OrphanAddError {
    #[error("Block {0} is already in the orphan pool")]
    AlreadyOrphan(Id<Block>),
}

struct OrphanBlock {
    block: Block,
    expires_at: Duration,
}

/// Blocks whose parent is not indexed yet, waiting for it to arrive.
///
/// Capacity is bounded; when full, the oldest orphan makes room for the new one.
pub struct OrphanBlocksPool {
    // Insertion order, oldest first
    orphan_ids: VecDeque<Id<Block>>,
    orphan_by_id: BTreeMap<Id<Block>, OrphanBlock>,
    orphan_by_prev_id: BTreeMap<Id<Block>, Vec<Id<Block>>>,
    max_orphans: usize,
    expiration: Duration,
}

impl OrphanBlocksPool {
    pub fn new(max_orphans: usize, expiration: Duration) -> Self {
        OrphanBlocksPool {
            orphan_ids: VecDeque::new(),
            orphan_by_id: BTreeMap::new(),
            orphan_by_prev_id: BTreeMap::new(),
            max_orphans,
            expiration,
        }
    }

    pub fn len(&self) -> usize {
        self.orphan_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.orphan_ids.is_empty()
    }

    pub fn is_already_an_orphan(&self, block_id: &Id<Block>) -> bool {
        self.orphan_by_id.contains_key(block_id)
    }

    fn drop_block(&mut self, block_id: &Id<Block>) -> Option<Block> {
        use std::collections::btree_map::Entry;

        let orphan = self.orphan_by_id.remove(block_id)?;
        self.orphan_ids.retain(|id| id != block_id);

        if let Entry::Occupied(mut entry) = self.orphan_by_prev_id.entry(orphan.block.prev_block_id())
        {
            entry.get_mut().retain(|id| id != block_id);
            if entry.get().is_empty() {
                entry.remove();
            }
        }
        Some(orphan.block)
    }

    fn prune(&mut self) {
        while self.len() >= self.max_orphans {
            match self.orphan_ids.front().copied() {
                Some(oldest) => {
                    log::debug!("Orphan pool full, evicting oldest orphan {oldest}");
                    self.drop_block(&oldest);
                }
                None => break,
            }
        }
    }

    /// Store a block keyed by its id; it expires `expiration` after `now`
    pub fn add_block(&mut self, block: Block, now: Duration) -> Result<(), OrphanAddError> {
        let block_id = block.get_id();
        if self.orphan_by_id.contains_key(&block_id) {
            return Err(OrphanAddError::AlreadyOrphan(block_id));
        }
        if self.max_orphans == 0 {
            return Ok(());
        }
        self.prune();

        self.orphan_by_prev_id.entry(block.prev_block_id()).or_default().push(block_id);
        self.orphan_ids.push_back(block_id);
        self.orphan_by_id.insert(
            block_id,
            OrphanBlock {
                block,
                expires_at: now.saturating_add(self.expiration),
            },
        );
        Ok(())
    }

    /// Remove and return all orphans waiting on the given parent, oldest first
    pub fn take_all_children_of(&mut self, block_id: &Id<Block>) -> Vec<Block> {
        let children = self.orphan_by_prev_id.get(block_id).cloned().unwrap_or_default();
        children.iter().filter_map(|id| self.drop_block(id)).collect()
    }

    /// Remove every orphan that expired at or before `now`, returning how many were removed
    pub fn evict_expired(&mut self, now: Duration) -> usize {
        let expired: Vec<Id<Block>> = self
            .orphan_by_id
            .iter()
            .filter(|(_, orphan)| orphan.expires_at <= now)
            .map(|(id, _)| *id)
            .collect();
        expired.iter().for_each(|id| {
            self.drop_block(id);
        });
        if !expired.is_empty() {
            log::debug!("Evicted {} expired orphans", expired.len());
        }
        expired.len()
    }
}
