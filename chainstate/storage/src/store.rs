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

//! In-memory storage backend.
//!
//! Every value is kept SCALE-encoded in one of a few columns. A read-write transaction holds the
//! write lock for its whole lifetime and collects its changes in a delta which is applied to the
//! columns on commit and dropped on abort.

use std::{collections::BTreeMap, sync::Arc};

use chainstate_types::BlockIndex;
use common::{
    chain::Block,
    primitives::{BlockHeight, Id, Idable},
};
use parity_scale_codec::{DecodeAll, Encode};
use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::{
    BlockchainStorage, BlockchainStorageRead, BlockchainStorageWrite, Error, TransactionRo,
    TransactionRw, Transactional,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Column {
    Value,
    Block,
    BlockIndex,
    BlockByHeight,
}

type Data = Vec<u8>;
type ColumnMap = BTreeMap<Data, Data>;
type Columns = BTreeMap<Column, ColumnMap>;
type Delta = BTreeMap<(Column, Data), Option<Data>>;

mod well_known {
    use super::{Block, Id};

    /// Pre-defined database keys
    pub trait Entry {
        /// Key for this entry
        const KEY: &'static [u8];
        /// Value type for this entry
        type Value: parity_scale_codec::Codec;
    }

    macro_rules! declare_entry {
        ($name:ident: $type:ty) => {
            pub struct $name;
            impl Entry for $name {
                const KEY: &'static [u8] = stringify!($name).as_bytes();
                type Value = $type;
            }
        };
    }

    declare_entry!(StoreVersion: u32);
    declare_entry!(BestBlockId: Id<Block>);
}

fn decode<T: DecodeAll>(bytes: &[u8]) -> crate::Result<T> {
    T::decode_all(&mut &*bytes).map_err(|_| Error::Corrupted)
}

/// Store for blockchain data
#[derive(Clone, Default)]
pub struct Store {
    columns: Arc<RwLock<Columns>>,
}

impl Store {
    /// New empty store
    pub fn new_empty() -> crate::Result<Self> {
        Ok(Self::default())
    }
}

impl<'tx> Transactional<'tx> for Store {
    type TransactionRo = StoreTxRo<'tx>;
    type TransactionRw = StoreTxRw<'tx>;

    fn transaction_ro<'st: 'tx>(&'st self) -> crate::Result<Self::TransactionRo> {
        Ok(StoreTxRo(self.columns.read()))
    }

    fn transaction_rw<'st: 'tx>(&'st self) -> crate::Result<Self::TransactionRw> {
        Ok(StoreTxRw {
            columns: self.columns.write(),
            delta: Delta::new(),
        })
    }
}

impl BlockchainStorage for Store {}

// Shared read access over the committed columns and, for read-write transactions, the pending delta
trait ReadColumns {
    fn read_raw(&self, column: Column, key: &[u8]) -> Option<Data>;

    fn all_raw(&self, column: Column) -> Vec<Data>;

    fn read<T: DecodeAll>(&self, column: Column, key: &[u8]) -> crate::Result<Option<T>> {
        self.read_raw(column, key).map(|bytes| decode(&bytes)).transpose()
    }

    fn read_value<E: well_known::Entry>(&self) -> crate::Result<Option<E::Value>> {
        self.read(Column::Value, E::KEY)
    }
}

macro_rules! impl_blockchain_storage_read {
    ($tx:ty) => {
        impl BlockchainStorageRead for $tx {
            fn get_storage_version(&self) -> crate::Result<Option<u32>> {
                self.read_value::<well_known::StoreVersion>()
            }

            fn get_best_block_id(&self) -> crate::Result<Option<Id<Block>>> {
                self.read_value::<well_known::BestBlockId>()
            }

            fn get_block_index(&self, block_id: &Id<Block>) -> crate::Result<Option<BlockIndex>> {
                self.read(Column::BlockIndex, &block_id.encode())
            }

            fn get_all_block_indices(&self) -> crate::Result<Vec<BlockIndex>> {
                self.all_raw(Column::BlockIndex).iter().map(|bytes| decode(bytes)).collect()
            }

            fn get_block(&self, id: Id<Block>) -> crate::Result<Option<Block>> {
                self.read(Column::Block, &id.encode())
            }

            fn get_block_id_by_height(&self, height: &BlockHeight) -> crate::Result<Option<Id<Block>>> {
                self.read(Column::BlockByHeight, &height.encode())
            }
        }
    };
}

impl_blockchain_storage_read!(StoreTxRo<'_>);
impl_blockchain_storage_read!(StoreTxRw<'_>);

/// Read-only chainstate storage transaction
pub struct StoreTxRo<'st>(RwLockReadGuard<'st, Columns>);

impl ReadColumns for StoreTxRo<'_> {
    fn read_raw(&self, column: Column, key: &[u8]) -> Option<Data> {
        self.0.get(&column).and_then(|map| map.get(key)).cloned()
    }

    fn all_raw(&self, column: Column) -> Vec<Data> {
        self.0.get(&column).map(|map| map.values().cloned().collect()).unwrap_or_default()
    }
}

impl TransactionRo for StoreTxRo<'_> {
    fn close(self) {}
}

/// Read-write chainstate storage transaction
pub struct StoreTxRw<'st> {
    columns: RwLockWriteGuard<'st, Columns>,
    delta: Delta,
}

impl StoreTxRw<'_> {
    fn write<T: Encode + ?Sized>(&mut self, column: Column, key: Data, value: &T) {
        self.delta.insert((column, key), Some(value.encode()));
    }

    fn write_value<E: well_known::Entry>(&mut self, value: &E::Value) {
        self.write(Column::Value, E::KEY.to_vec(), value)
    }

    fn del(&mut self, column: Column, key: Data) {
        self.delta.insert((column, key), None);
    }
}

impl ReadColumns for StoreTxRw<'_> {
    fn read_raw(&self, column: Column, key: &[u8]) -> Option<Data> {
        match self.delta.get(&(column, key.to_vec())) {
            Some(pending) => pending.clone(),
            None => self.columns.get(&column).and_then(|map| map.get(key)).cloned(),
        }
    }

    fn all_raw(&self, column: Column) -> Vec<Data> {
        let mut merged = self.columns.get(&column).cloned().unwrap_or_default();
        for ((col, key), val) in &self.delta {
            if *col != column {
                continue;
            }
            match val {
                Some(val) => merged.insert(key.clone(), val.clone()),
                None => merged.remove(key),
            };
        }
        merged.into_values().collect()
    }
}

impl BlockchainStorageWrite for StoreTxRw<'_> {
    fn set_storage_version(&mut self, version: u32) -> crate::Result<()> {
        self.write_value::<well_known::StoreVersion>(&version);
        Ok(())
    }

    fn set_best_block_id(&mut self, id: &Id<Block>) -> crate::Result<()> {
        self.write_value::<well_known::BestBlockId>(id);
        Ok(())
    }

    fn set_block_index(&mut self, block_index: &BlockIndex) -> crate::Result<()> {
        self.write(Column::BlockIndex, block_index.block_id().encode(), block_index);
        Ok(())
    }

    fn add_block(&mut self, block: &Block) -> crate::Result<()> {
        self.write(Column::Block, block.get_id().encode(), block);
        Ok(())
    }

    fn set_block_id_at_height(
        &mut self,
        height: &BlockHeight,
        block_id: &Id<Block>,
    ) -> crate::Result<()> {
        self.write(Column::BlockByHeight, height.encode(), block_id);
        Ok(())
    }

    fn del_block_id_at_height(&mut self, height: &BlockHeight) -> crate::Result<()> {
        self.del(Column::BlockByHeight, height.encode());
        Ok(())
    }
}

impl TransactionRw for StoreTxRw<'_> {
    fn abort(self) {}

    fn commit(self) -> crate::Result<()> {
        let StoreTxRw { mut columns, delta } = self;
        let changes = delta.len();
        for ((column, key), val) in delta {
            let map = columns.entry(column).or_default();
            match val {
                Some(val) => map.insert(key, val),
                None => map.remove(&key),
            };
        }
        logging::log::trace!("Storage commit applied {changes} changes");
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::{well_known::Entry, *};
    use chainstate_types::BlockStatus;
    use common::{
        chain::{config::create_regtest, Block, BlockHeader},
        primitives::{ChainWork, H256},
    };
    use rstest::rstest;
    use test_utils::random::{make_seedable_rng, Rng, Seed};

    fn some_block(nonce: u64) -> Block {
        let genesis = create_regtest().genesis_block().clone();
        let header = BlockHeader {
            nonce,
            ..genesis.header().clone()
        };
        Block::new(header, genesis.transactions().to_vec())
    }

    #[test]
    fn empty_store() {
        let store = Store::new_empty().unwrap();
        let tx = store.transaction_ro().unwrap();
        assert_eq!(tx.get_storage_version(), Ok(None));
        assert_eq!(tx.get_best_block_id(), Ok(None));
        assert_eq!(tx.get_block(Id::new(H256::repeat_byte(1))), Ok(None));
        assert_eq!(tx.get_all_block_indices(), Ok(Vec::new()));
        assert_eq!(tx.get_block_id_by_height(&BlockHeight::zero()), Ok(None));
    }

    #[test]
    fn commit_makes_writes_visible() {
        let store = Store::new_empty().unwrap();
        let block = some_block(1);

        let mut tx = store.transaction_rw().unwrap();
        tx.set_storage_version(1).unwrap();
        tx.add_block(&block).unwrap();
        tx.set_best_block_id(&block.get_id()).unwrap();
        tx.set_block_id_at_height(&BlockHeight::zero(), &block.get_id()).unwrap();
        // Pending writes are visible inside the transaction
        assert_eq!(tx.get_block(block.get_id()), Ok(Some(block.clone())));
        tx.commit().unwrap();

        let tx = store.transaction_ro().unwrap();
        assert_eq!(tx.get_storage_version(), Ok(Some(1)));
        assert_eq!(tx.get_best_block_id(), Ok(Some(block.get_id())));
        assert_eq!(tx.get_block(block.get_id()), Ok(Some(block.clone())));
        assert_eq!(
            tx.get_block_id_by_height(&BlockHeight::zero()),
            Ok(Some(block.get_id()))
        );
    }

    #[test]
    fn abort_discards_writes() {
        let store = Store::new_empty().unwrap();
        let block = some_block(2);

        let mut tx = store.transaction_rw().unwrap();
        tx.add_block(&block).unwrap();
        tx.set_best_block_id(&block.get_id()).unwrap();
        tx.abort();

        let tx = store.transaction_ro().unwrap();
        assert_eq!(tx.get_block(block.get_id()), Ok(None));
        assert_eq!(tx.get_best_block_id(), Ok(None));
    }

    #[test]
    fn delete_height_entry() {
        let store = Store::new_empty().unwrap();
        let id = some_block(3).get_id();

        let mut tx = store.transaction_rw().unwrap();
        tx.set_block_id_at_height(&BlockHeight::new(5), &id).unwrap();
        tx.commit().unwrap();

        let mut tx = store.transaction_rw().unwrap();
        tx.del_block_id_at_height(&BlockHeight::new(5)).unwrap();
        assert_eq!(tx.get_block_id_by_height(&BlockHeight::new(5)), Ok(None));
        tx.commit().unwrap();

        let tx = store.transaction_ro().unwrap();
        assert_eq!(tx.get_block_id_by_height(&BlockHeight::new(5)), Ok(None));
    }

    #[rstest]
    #[case(Seed::from_entropy())]
    fn block_indices_roundtrip(#[case] seed: Seed) {
        let mut rng = make_seedable_rng(seed);
        let store = Store::new_empty().unwrap();
        let count = rng.gen_range(1..20);

        let indices: Vec<BlockIndex> = (0..count)
            .map(|i| {
                let block = some_block(rng.gen());
                BlockIndex::new(&block, ChainWork::from_u64(i), i, BlockStatus::Valid)
            })
            .collect();

        // Half committed earlier, the rest pending in the transaction being read
        let (first, second) = indices.split_at(indices.len() / 2);
        let mut tx = store.transaction_rw().unwrap();
        first.iter().for_each(|bi| tx.set_block_index(bi).unwrap());
        tx.commit().unwrap();

        let mut tx = store.transaction_rw().unwrap();
        second.iter().for_each(|bi| tx.set_block_index(bi).unwrap());
        let updated = first.first().map(|bi| bi.clone().with_status(BlockStatus::Invalid));
        if let Some(updated) = &updated {
            tx.set_block_index(updated).unwrap();
        }

        let mut all = tx.get_all_block_indices().unwrap();
        all.sort_by_key(|bi| bi.sequence());
        assert_eq!(all.len(), indices.len());
        if let Some(updated) = &updated {
            assert_eq!(all[0], *updated);
        }
        tx.commit().unwrap();

        let tx = store.transaction_ro().unwrap();
        for bi in second {
            assert_eq!(tx.get_block_index(bi.block_id()).unwrap().as_ref(), Some(bi));
        }
    }

    #[test]
    fn clones_share_data() {
        let store = Store::new_empty().unwrap();
        let other = store.clone();
        let mut tx = store.transaction_rw().unwrap();
        tx.set_storage_version(7).unwrap();
        tx.commit().unwrap();
        assert_eq!(other.transaction_ro().unwrap().get_storage_version(), Ok(Some(7)));
    }

    #[test]
    fn corrupted_value() {
        let store = Store::new_empty().unwrap();
        store
            .columns
            .write()
            .entry(Column::Value)
            .or_default()
            .insert(well_known::BestBlockId::KEY.to_vec(), vec![1, 2, 3]);
        let tx = store.transaction_ro().unwrap();
        assert_eq!(tx.get_best_block_id(), Err(Error::Corrupted));
    }
}
