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

//! Storage wrapper that can be told to fail read-write commits.

use std::sync::Arc;

use chainstate_storage::{
    BlockchainStorage, BlockchainStorageRead, BlockchainStorageWrite, Transactional,
    TransactionRw,
};
use chainstate_types::BlockIndex;
use common::{
    chain::Block,
    primitives::{BlockHeight, Id},
};
use parking_lot::Mutex;

/// Which of the upcoming commits fail
#[derive(Debug, Clone, Copy, Default)]
struct CommitSchedule {
    // Commits to let through before failing
    skip: usize,
    // Commits to fail after that
    fail: usize,
}

impl CommitSchedule {
    /// Advance by one commit, returning whether it must fail
    fn next_fails(&mut self) -> bool {
        if self.skip > 0 {
            self.skip -= 1;
            false
        } else if self.fail > 0 {
            self.fail -= 1;
            true
        } else {
            false
        }
    }
}

/// Wraps a storage backend. Clones share the failure counter.
#[derive(Clone)]
pub struct FailingStorage<S> {
    inner: S,
    schedule: Arc<Mutex<CommitSchedule>>,
}

impl<S> FailingStorage<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            schedule: Arc::default(),
        }
    }

    /// The next `count` read-write commits fail and leave the store untouched
    pub fn fail_next_commits(&self, count: usize) {
        self.fail_commits_after(0, count);
    }

    /// Let `skip` commits through, then fail `count` of them
    pub fn fail_commits_after(&self, skip: usize, count: usize) {
        *self.schedule.lock() = CommitSchedule { skip, fail: count };
    }

    pub fn pending_failures(&self) -> usize {
        self.schedule.lock().fail
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }
}

pub struct FailingStorageTxRw<T> {
    inner: T,
    schedule: Arc<Mutex<CommitSchedule>>,
}

impl<'tx, S: Transactional<'tx>> Transactional<'tx> for FailingStorage<S> {
    type TransactionRo = S::TransactionRo;
    type TransactionRw = FailingStorageTxRw<S::TransactionRw>;

    fn transaction_ro<'st: 'tx>(&'st self) -> chainstate_storage::Result<Self::TransactionRo> {
        self.inner.transaction_ro()
    }

    fn transaction_rw<'st: 'tx>(&'st self) -> chainstate_storage::Result<Self::TransactionRw> {
        Ok(FailingStorageTxRw {
            inner: self.inner.transaction_rw()?,
            schedule: Arc::clone(&self.schedule),
        })
    }
}

impl<S: BlockchainStorage> BlockchainStorage for FailingStorage<S> {}

impl<T: BlockchainStorageRead> BlockchainStorageRead for FailingStorageTxRw<T> {
    fn get_storage_version(&self) -> chainstate_storage::Result<Option<u32>> {
        self.inner.get_storage_version()
    }

    fn get_best_block_id(&self) -> chainstate_storage::Result<Option<Id<Block>>> {
        self.inner.get_best_block_id()
    }

    fn get_block_index(&self, block_id: &Id<Block>) -> chainstate_storage::Result<Option<BlockIndex>> {
        self.inner.get_block_index(block_id)
    }

    fn get_all_block_indices(&self) -> chainstate_storage::Result<Vec<BlockIndex>> {
        self.inner.get_all_block_indices()
    }

    fn get_block(&self, id: Id<Block>) -> chainstate_storage::Result<Option<Block>> {
        self.inner.get_block(id)
    }

    fn get_block_id_by_height(
        &self,
        height: &BlockHeight,
    ) -> chainstate_storage::Result<Option<Id<Block>>> {
        self.inner.get_block_id_by_height(height)
    }
}

impl<T: BlockchainStorageWrite> BlockchainStorageWrite for FailingStorageTxRw<T> {
    fn set_storage_version(&mut self, version: u32) -> chainstate_storage::Result<()> {
        self.inner.set_storage_version(version)
    }

    fn set_best_block_id(&mut self, id: &Id<Block>) -> chainstate_storage::Result<()> {
        self.inner.set_best_block_id(id)
    }

    fn set_block_index(&mut self, block_index: &BlockIndex) -> chainstate_storage::Result<()> {
        self.inner.set_block_index(block_index)
    }

    fn add_block(&mut self, block: &Block) -> chainstate_storage::Result<()> {
        self.inner.add_block(block)
    }

    fn set_block_id_at_height(
        &mut self,
        height: &BlockHeight,
        block_id: &Id<Block>,
    ) -> chainstate_storage::Result<()> {
        self.inner.set_block_id_at_height(height, block_id)
    }

    fn del_block_id_at_height(&mut self, height: &BlockHeight) -> chainstate_storage::Result<()> {
        self.inner.del_block_id_at_height(height)
    }
}

impl<T: TransactionRw> TransactionRw for FailingStorageTxRw<T> {
    fn abort(self) {
        self.inner.abort()
    }

    fn commit(self) -> chainstate_storage::Result<()> {
        if self.schedule.lock().next_fails() {
            logging::log::debug!("Failing a storage commit on request");
            self.inner.abort();
            return Err(chainstate_storage::Error::TransactionFailed);
        }
        self.inner.commit()
    }
}
