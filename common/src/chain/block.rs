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

use std::time::Duration;

use parity_scale_codec::{Decode, Encode};
use serde::{Deserialize, Serialize};

use crate::primitives::{default_hash, hash_encoded, BlockHeight, Compact, Id, Idable, H256};

use super::{Transaction, TxKind};

#[derive(
    Debug,
    Copy,
    Clone,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Encode,
    Decode,
    Serialize,
    Deserialize,
    derive_more::Display,
)]
pub struct BlockTimestamp {
    #[codec(compact)]
    timestamp: u64,
}

impl BlockTimestamp {
    pub const fn from_int_seconds(timestamp: u64) -> Self {
        Self { timestamp }
    }

    pub fn from_duration_since_epoch(duration: Duration) -> Self {
        Self::from_int_seconds(duration.as_secs())
    }

    pub fn as_duration_since_epoch(&self) -> Duration {
        Duration::from_secs(self.timestamp)
    }

    pub const fn as_int_seconds(&self) -> u64 {
        self.timestamp
    }

    pub fn add_int_seconds(&self, seconds: u64) -> Option<Self> {
        self.timestamp.checked_add(seconds).map(Self::from_int_seconds)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode)]
pub struct BlockHeader {
    pub version: u32,
    pub prev_block_id: Id<Block>,
    pub merkle_root: H256,
    /// Number of votes included in the block
    pub voters: u16,
    /// Number of ticket purchases included in the block
    pub fresh_stake: u8,
    pub bits: Compact,
    pub height: BlockHeight,
    pub timestamp: BlockTimestamp,
    pub nonce: u64,
}

impl BlockHeader {
    pub const CURRENT_VERSION: u32 = 1;

    pub fn block_id(&self) -> Id<Block> {
        Id::new(hash_encoded(self))
    }
}

impl Idable for BlockHeader {
    type Tag = Block;
    fn get_id(&self) -> Id<Block> {
        self.block_id()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode)]
pub struct Block {
    header: BlockHeader,
    transactions: Vec<Transaction>,
}

impl Block {
    /// Assembles a block as given. Nothing in the header is recomputed.
    pub fn new(header: BlockHeader, transactions: Vec<Transaction>) -> Self {
        Self {
            header,
            transactions,
        }
    }

    pub fn header(&self) -> &BlockHeader {
        &self.header
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn prev_block_id(&self) -> Id<Block> {
        self.header.prev_block_id
    }

    pub fn height(&self) -> BlockHeight {
        self.header.height
    }

    pub fn timestamp(&self) -> BlockTimestamp {
        self.header.timestamp
    }

    pub fn bits(&self) -> Compact {
        self.header.bits
    }

    pub fn merkle_root(&self) -> H256 {
        self.header.merkle_root
    }

    pub fn voters(&self) -> u16 {
        self.header.voters
    }

    pub fn fresh_stake(&self) -> u8 {
        self.header.fresh_stake
    }

    /// The first transaction, if it is a coinbase
    pub fn coinbase(&self) -> Option<&Transaction> {
        self.transactions.first().filter(|tx| tx.is_coinbase())
    }

    pub fn votes(&self) -> impl Iterator<Item = &Transaction> {
        self.transactions.iter().filter(|tx| tx.is_vote())
    }

    pub fn ticket_purchases(&self) -> impl Iterator<Item = &Transaction> {
        self.transactions.iter().filter(|tx| tx.kind() == &TxKind::TicketPurchase)
    }

    pub fn encoded_size(&self) -> usize {
        self.encode().len()
    }
}

impl Idable for Block {
    type Tag = Block;
    fn get_id(&self) -> Id<Block> {
        self.header.block_id()
    }
}

/// Binary merkle root over the transaction ids. The last node of an odd level is paired with itself.
pub fn calculate_tx_merkle_root(transactions: &[Transaction]) -> H256 {
    let mut level: Vec<H256> = transactions.iter().map(|tx| tx.get_id().get()).collect();
    if level.is_empty() {
        return H256::zero();
    }

    while level.len() > 1 {
        level = level
            .chunks(2)
            .map(|pair| {
                let left = pair[0];
                let right = pair.get(1).copied().unwrap_or(left);
                let mut data = [0u8; 64];
                data[..32].copy_from_slice(left.as_bytes());
                data[32..].copy_from_slice(right.as_bytes());
                default_hash(data)
            })
            .collect();
    }
    level[0]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        chain::{Destination, TxOutput},
        primitives::Amount,
    };

    fn tx(value: u128) -> Transaction {
        Transaction::new(
            TxKind::Regular,
            vec![],
            vec![TxOutput::new(Amount::from_atoms(value), Destination::AnyoneCanSpend)],
            0,
        )
    }

    fn header(merkle_root: H256) -> BlockHeader {
        BlockHeader {
            version: BlockHeader::CURRENT_VERSION,
            prev_block_id: Id::zero(),
            merkle_root,
            voters: 0,
            fresh_stake: 0,
            bits: Compact(0x207fffff),
            height: BlockHeight::zero(),
            timestamp: BlockTimestamp::from_int_seconds(1),
            nonce: 0,
        }
    }

    #[test]
    fn merkle_root_of_single_tx_is_its_id() {
        let t = tx(1);
        assert_eq!(calculate_tx_merkle_root(&[t.clone()]), t.get_id().get());
        assert_eq!(calculate_tx_merkle_root(&[]), H256::zero());
    }

    #[test]
    fn merkle_root_depends_on_order() {
        let (a, b, c) = (tx(1), tx(2), tx(3));
        let abc = calculate_tx_merkle_root(&[a.clone(), b.clone(), c.clone()]);
        let bac = calculate_tx_merkle_root(&[b, a, c]);
        assert_ne!(abc, bac);
    }

    #[test]
    fn block_id_is_the_header_id() {
        let txs = vec![tx(7)];
        let block = Block::new(header(calculate_tx_merkle_root(&txs)), txs);
        assert_eq!(block.get_id(), block.header().get_id());

        let mut other = block.header().clone();
        other.nonce += 1;
        assert_ne!(block.get_id(), other.block_id());
    }

    #[test]
    fn coinbase_accessor_requires_first_position() {
        let cb = Transaction::new(TxKind::Coinbase, vec![], vec![], 0);
        let block = Block::new(header(H256::zero()), vec![tx(1), cb.clone()]);
        assert!(block.coinbase().is_none());
        let block = Block::new(header(H256::zero()), vec![cb.clone(), tx(1)]);
        assert_eq!(block.coinbase(), Some(&cb));
    }
}
