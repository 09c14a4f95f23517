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

//! A stake-state provider that knows every block the framework has generated.
//!
//! Blocks are registered when they are built, so the provider answers spendability
//! questions for side chains and orphans alike. Notifications from the chainstate are
//! recorded to let tests check the order in which the active chain changed.

use std::{collections::BTreeMap, sync::Arc};

use chainstate::collaborators::{StakeState, StakeStateError, UtxoEntry};
use common::{
    chain::{Block, OutPoint},
    primitives::{BlockHeight, Id, Idable},
};
use parking_lot::{Mutex, MutexGuard};

/// A change of the active chain as reported to the stake-state provider
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StakeNotification {
    Connected(Id<Block>, BlockHeight),
    Disconnected(Id<Block>, BlockHeight),
}

struct BlockRecord {
    parent: Id<Block>,
    created: BTreeMap<OutPoint, UtxoEntry>,
    spent: Vec<OutPoint>,
}

impl BlockRecord {
    fn from_block(block: &Block) -> Self {
        let height = block.height();
        let mut created = BTreeMap::new();
        let mut spent = Vec::new();

        for tx in block.transactions() {
            spent.extend(tx.inputs().iter().map(|input| *input.outpoint()));
            let tx_id = tx.get_id();
            for (index, output) in tx.outputs().iter().enumerate() {
                created.insert(
                    OutPoint::new(tx_id, index as u32),
                    UtxoEntry::new(height, tx.is_coinbase(), output.value()),
                );
            }
        }

        Self {
            parent: block.prev_block_id(),
            created,
            spent,
        }
    }
}

struct Universe {
    blocks: BTreeMap<Id<Block>, BlockRecord>,
    live_tickets: u32,
    active_chain: Vec<Id<Block>>,
    notifications: Vec<StakeNotification>,
    // Queries fail with this reason while set
    failure: Option<String>,
}

impl Universe {
    fn check_available(&self) -> Result<(), StakeStateError> {
        match &self.failure {
            Some(reason) => Err(StakeStateError::ProviderFailure(reason.clone())),
            None => Ok(()),
        }
    }

    fn spendable_output(
        &self,
        outpoint: &OutPoint,
        as_of: &Id<Block>,
    ) -> Result<Option<UtxoEntry>, StakeStateError> {
        self.check_available()?;
        if !self.blocks.contains_key(as_of) {
            return Err(StakeStateError::UnknownBlock(*as_of));
        }

        // Walking back from the tip, a spend seen before the creation means the output is gone
        let mut cursor = *as_of;
        while let Some(record) = self.blocks.get(&cursor) {
            if record.spent.contains(outpoint) {
                return Ok(None);
            }
            if let Some(entry) = record.created.get(outpoint) {
                return Ok(Some(*entry));
            }
            cursor = record.parent;
        }
        Ok(None)
    }
}

/// Shared handle on the stake universe. Clones see the same state.
#[derive(Clone)]
pub struct StakeUniverse(Arc<Mutex<Universe>>);

impl StakeUniverse {
    pub fn new(live_tickets: u32) -> Self {
        Self(Arc::new(Mutex::new(Universe {
            blocks: BTreeMap::new(),
            live_tickets,
            active_chain: Vec::new(),
            notifications: Vec::new(),
            failure: None,
        })))
    }

    /// Make the outputs of `block` known. Registering a block twice is harmless.
    pub fn register_block(&self, block: &Block) {
        self.0.lock().blocks.entry(block.get_id()).or_insert_with(|| BlockRecord::from_block(block));
    }

    pub fn set_live_tickets(&self, live_tickets: u32) {
        self.0.lock().live_tickets = live_tickets;
    }

    /// Every query fails with a provider failure until [StakeUniverse::restore_queries]
    pub fn fail_queries(&self, reason: &str) {
        self.0.lock().failure = Some(reason.to_owned());
    }

    pub fn restore_queries(&self) {
        self.0.lock().failure = None;
    }

    /// Active chain as the chainstate reported it, genesis first
    pub fn active_chain(&self) -> Vec<Id<Block>> {
        self.0.lock().active_chain.clone()
    }

    pub fn notifications(&self) -> Vec<StakeNotification> {
        self.0.lock().notifications.clone()
    }

    pub fn clear_notifications(&self) {
        self.0.lock().notifications.clear();
    }

    fn universe(&self) -> MutexGuard<'_, Universe> {
        self.0.lock()
    }

    /// A provider to hand over to the chainstate
    pub fn provider(&self) -> Box<dyn StakeState> {
        Box::new(UniverseStakeState(self.clone()))
    }
}

struct UniverseStakeState(StakeUniverse);

impl StakeState for UniverseStakeState {
    fn spendable_output(
        &self,
        outpoint: &OutPoint,
        as_of: &Id<Block>,
    ) -> Result<Option<UtxoEntry>, StakeStateError> {
        self.0.universe().spendable_output(outpoint, as_of)
    }

    fn live_tickets(&self, parent: &Id<Block>) -> Result<u32, StakeStateError> {
        let universe = self.0.universe();
        universe.check_available()?;
        if !universe.blocks.contains_key(parent) {
            return Err(StakeStateError::UnknownBlock(*parent));
        }
        Ok(universe.live_tickets)
    }

    fn block_connected(&mut self, block: &Block, height: BlockHeight) {
        let mut universe = self.0.universe();
        universe.blocks.entry(block.get_id()).or_insert_with(|| BlockRecord::from_block(block));
        universe.active_chain.push(block.get_id());
        universe.notifications.push(StakeNotification::Connected(block.get_id(), height));
    }

    fn block_disconnected(&mut self, block: &Block, height: BlockHeight) {
        let mut universe = self.0.universe();
        assert_eq!(
            universe.active_chain.last(),
            Some(&block.get_id()),
            "disconnected block is not the active tip"
        );
        universe.active_chain.pop();
        universe.notifications.push(StakeNotification::Disconnected(block.get_id(), height));
    }
}

#[cfg(test)]
mod tests {
    use common::{
        chain::{config::create_regtest, Destination, Transaction, TxInput, TxKind, TxOutput},
        primitives::{Amount, Compact, H256},
    };

    use super::*;

    fn block_on(parent: &Block, transactions: Vec<Transaction>) -> Block {
        let header = common::chain::BlockHeader {
            version: common::chain::BlockHeader::CURRENT_VERSION,
            prev_block_id: parent.get_id(),
            merkle_root: H256::zero(),
            voters: 0,
            fresh_stake: 0,
            bits: Compact(0x207fffff),
            height: parent.height().next_height(),
            timestamp: parent.timestamp(),
            nonce: 0,
        };
        Block::new(header, transactions)
    }

    fn pay(inputs: Vec<OutPoint>, value: u128) -> Transaction {
        Transaction::new(
            TxKind::Regular,
            inputs.into_iter().map(|outpoint| TxInput::new(outpoint, vec![])).collect(),
            vec![TxOutput::new(Amount::from_atoms(value), Destination::AnyoneCanSpend)],
            0,
        )
    }

    #[test]
    fn spends_are_per_branch() {
        let config = create_regtest();
        let genesis = config.genesis_block().clone();
        let universe = StakeUniverse::new(0);
        universe.register_block(&genesis);
        let provider = universe.provider();

        let source = pay(vec![], 10);
        let outpoint = OutPoint::new(source.get_id(), 0);
        let a = block_on(&genesis, vec![source]);
        let spender = block_on(&a, vec![pay(vec![outpoint], 10)]);
        let sibling = block_on(&a, vec![pay(vec![], 3)]);
        for block in [&a, &spender, &sibling] {
            universe.register_block(block);
        }

        let entry = provider.spendable_output(&outpoint, &a.get_id()).unwrap().unwrap();
        assert_eq!(entry.value(), Amount::from_atoms(10));
        assert_eq!(entry.height(), BlockHeight::new(1));
        assert_eq!(provider.spendable_output(&outpoint, &spender.get_id()), Ok(None));
        assert!(provider.spendable_output(&outpoint, &sibling.get_id()).unwrap().is_some());
        assert_eq!(provider.spendable_output(&outpoint, &genesis.get_id()), Ok(None));
        assert_eq!(
            provider.spendable_output(&outpoint, &Id::zero()),
            Err(StakeStateError::UnknownBlock(Id::zero()))
        );
    }

    #[test]
    fn notifications_follow_the_active_chain() {
        let config = create_regtest();
        let genesis = config.genesis_block().clone();
        let universe = StakeUniverse::new(5);
        let mut provider = universe.provider();

        provider.block_connected(&genesis, BlockHeight::zero());
        assert_eq!(provider.live_tickets(&genesis.get_id()), Ok(5));

        let a = block_on(&genesis, vec![]);
        provider.block_connected(&a, BlockHeight::new(1));
        provider.block_disconnected(&a, BlockHeight::new(1));

        assert_eq!(universe.active_chain(), vec![genesis.get_id()]);
        assert_eq!(
            universe.notifications(),
            vec![
                StakeNotification::Connected(genesis.get_id(), BlockHeight::zero()),
                StakeNotification::Connected(a.get_id(), BlockHeight::new(1)),
                StakeNotification::Disconnected(a.get_id(), BlockHeight::new(1)),
            ]
        );
    }
}
