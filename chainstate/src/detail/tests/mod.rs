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
    collections::BTreeSet,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
    time::Duration,
};

use chainstate_storage::Store;
use common::{
    chain::{
        calculate_tx_merkle_root,
        config::{coinbase_height_commitment, Builder},
        Block, BlockHeader, ChainConfig, Destination, OutPoint, Transaction, TxKind, TxOutput,
    },
    primitives::{BlockHeight, Id, Idable},
    time_getter::TimeGetter,
};
use parking_lot::Mutex;

use super::*;
use crate::{
    collaborators::{
        Collaborators, StakeState, StakeStateError, TransactionVerifier,
        TransactionVerifierError, UtxoEntry,
    },
    ChainstateConfig,
};

mod reorg_tests;

/// Connect and disconnect notifications as (connected, block id, height)
type Notifications = Arc<Mutex<Vec<(bool, Id<Block>, BlockHeight)>>>;

#[derive(Default)]
struct RecordingStakeState {
    notifications: Notifications,
}

impl StakeState for RecordingStakeState {
    fn spendable_output(
        &self,
        _outpoint: &OutPoint,
        _as_of: &Id<Block>,
    ) -> Result<Option<UtxoEntry>, StakeStateError> {
        Ok(None)
    }

    fn live_tickets(&self, _parent: &Id<Block>) -> Result<u32, StakeStateError> {
        Ok(0)
    }

    fn block_connected(&mut self, block: &Block, height: BlockHeight) {
        self.notifications.lock().push((true, block.get_id(), height));
    }

    fn block_disconnected(&mut self, block: &Block, height: BlockHeight) {
        self.notifications.lock().push((false, block.get_id(), height));
    }
}

/// Accepts every transaction; refuses to connect the blocks listed in `refuse_connect`
#[derive(Default)]
struct SelectiveVerifier {
    refuse_connect: Arc<Mutex<BTreeSet<Id<Block>>>>,
}

impl TransactionVerifier for SelectiveVerifier {
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
        block: &Block,
        _height: BlockHeight,
    ) -> Result<(), TransactionVerifierError> {
        if self.refuse_connect.lock().contains(&block.get_id()) {
            return Err(TransactionVerifierError::ConnectRejected {
                block: block.get_id(),
                reason: "refused".to_owned(),
            });
        }
        Ok(())
    }
}

struct TestChainstate {
    chainstate: Chainstate<Store>,
    store: Store,
    notifications: Notifications,
    refuse_connect: Arc<Mutex<BTreeSet<Id<Block>>>>,
    // Seconds since the epoch
    time: Arc<AtomicU64>,
}

impl TestChainstate {
    fn new() -> Self {
        Self::with_configs(Builder::test_chain().build(), ChainstateConfig::new())
    }

    fn with_configs(chain_config: ChainConfig, chainstate_config: ChainstateConfig) -> Self {
        Self::open(chain_config, chainstate_config, Store::new_empty().unwrap())
    }

    fn open(chain_config: ChainConfig, chainstate_config: ChainstateConfig, store: Store) -> Self {
        let stake_state = RecordingStakeState::default();
        let notifications = Arc::clone(&stake_state.notifications);
        let verifier = SelectiveVerifier::default();
        let refuse_connect = Arc::clone(&verifier.refuse_connect);

        let start = chain_config.genesis_block().timestamp().as_int_seconds() + 3600;
        let time = Arc::new(AtomicU64::new(start));
        let time_getter = {
            let time = Arc::clone(&time);
            TimeGetter::new(Arc::new(move || {
                Duration::from_secs(time.load(Ordering::SeqCst))
            }))
        };

        let chainstate = Chainstate::new(
            Arc::new(chain_config),
            chainstate_config,
            store.clone(),
            Collaborators::new(Box::new(stake_state), Box::new(verifier)),
            time_getter,
        )
        .unwrap();

        Self {
            chainstate,
            store,
            notifications,
            refuse_connect,
            time,
        }
    }

    fn genesis(&self) -> Block {
        self.chainstate.chain_config().genesis_block().clone()
    }

    fn advance_time(&self, duration: Duration) {
        self.time.fetch_add(duration.as_secs(), Ordering::SeqCst);
    }

    fn process(&mut self, block: &Block) -> Result<ProcessBlockOutcome, BlockError> {
        self.chainstate.process_block(block.clone(), BlockProcessingFlags::NoPoWCheck)
    }

    /// A valid child of `parent`; `nonce` tells siblings apart
    fn child(&self, parent: &Block, nonce: u64) -> Block {
        self.child_with(parent, nonce, |_| {})
    }

    fn child_with(&self, parent: &Block, nonce: u64, munge: impl FnOnce(&mut Vec<TxOutput>)) -> Block {
        let config = self.chainstate.chain_config();
        let height = parent.height().next_height();
        let mut outputs = vec![
            TxOutput::new(config.tax_subsidy(height, 0), config.tax_destination().clone()),
            coinbase_height_commitment(height),
            TxOutput::new(config.work_subsidy(height, 0), Destination::AnyoneCanSpend),
        ];
        munge(&mut outputs);
        let transactions = vec![Transaction::new(TxKind::Coinbase, vec![], outputs, 0)];

        let header = BlockHeader {
            version: BlockHeader::CURRENT_VERSION,
            prev_block_id: parent.get_id(),
            merkle_root: calculate_tx_merkle_root(&transactions),
            voters: 0,
            fresh_stake: 0,
            bits: config.pow_limit(),
            height,
            timestamp: parent.timestamp().add_int_seconds(1).unwrap(),
            nonce,
        };
        Block::new(header, transactions)
    }

    /// `len` valid blocks on top of `parent`
    fn chain(&self, parent: &Block, len: usize, nonce: u64) -> Vec<Block> {
        let mut blocks: Vec<Block> = Vec::with_capacity(len);
        for _ in 0..len {
            let block = self.child(blocks.last().unwrap_or(parent), nonce);
            blocks.push(block);
        }
        blocks
    }

    fn main_chain_id_at(&self, height: u64) -> Option<Id<Block>> {
        self.chainstate.get_block_id_from_height(&BlockHeight::new(height)).unwrap()
    }
}
