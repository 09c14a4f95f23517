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

use chainstate::{ChainstateError, ProcessBlockOutcome};
use common::{
    chain::{
        calculate_tx_merkle_root, config::coinbase_height_commitment, Block, BlockHeader,
        BlockTimestamp, Destination, OutPoint, Transaction, TxKind, TxOutput,
    },
    primitives::{compact::hash_meets_target, Amount, Id},
};

use crate::{
    utils::{spend_output, ticket_purchase},
    TestFramework,
};

type CoinbaseMunger<'f> = Box<dyn FnOnce(&mut Vec<TxOutput>) + 'f>;
type HeaderMunger<'f> = Box<dyn FnOnce(&mut BlockHeader) + 'f>;

/// The block builder that allows construction and processing of a block.
///
/// Unless told otherwise it produces a block that passes every consensus check on top of its
/// parent: full coinbase, a vote from every ticket once votes are required, a timestamp one
/// block spacing after the parent and a solved proof of work.
pub struct BlockBuilder<'f> {
    framework: &'f mut TestFramework,
    parent: Id<Block>,
    timestamp: Option<BlockTimestamp>,
    voters: Option<u16>,
    transactions: Vec<Transaction>,
    coinbase_munger: Option<CoinbaseMunger<'f>>,
    header_munger: Option<HeaderMunger<'f>>,
    solve: bool,
}

impl<'f> BlockBuilder<'f> {
    /// Creates a new builder instance on top of the best block.
    pub fn new(framework: &'f mut TestFramework) -> Self {
        let parent = framework.best_block_id();
        Self {
            framework,
            parent,
            timestamp: None,
            voters: None,
            transactions: Vec::new(),
            coinbase_munger: None,
            header_munger: None,
            solve: true,
        }
    }

    pub fn with_parent(mut self, parent: Id<Block>) -> Self {
        self.parent = parent;
        self
    }

    pub fn with_timestamp(mut self, timestamp: BlockTimestamp) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    /// Number of votes to include. Defaults to all of them from the stake validation height on.
    pub fn with_voters(mut self, voters: u16) -> Self {
        self.voters = Some(voters);
        self
    }

    /// Appends the given transaction after the coinbase and the votes.
    pub fn add_transaction(mut self, transaction: Transaction) -> Self {
        self.transactions.push(transaction);
        self
    }

    /// Adds a transaction spending `outpoint` into a single output of `value`.
    pub fn add_spend(self, outpoint: OutPoint, value: Amount) -> Self {
        self.add_transaction(spend_output(outpoint, value))
    }

    /// Adds a ticket purchase funded by `outpoint`; the header's fresh stake counts it.
    pub fn add_ticket_purchase(self, outpoint: OutPoint, value: Amount) -> Self {
        self.add_transaction(ticket_purchase(outpoint, value))
    }

    /// Edit the coinbase outputs before the merkle root is computed.
    pub fn with_coinbase_outputs(mut self, f: impl FnOnce(&mut Vec<TxOutput>) + 'f) -> Self {
        self.coinbase_munger = Some(Box::new(f));
        self
    }

    /// Edit the header after the merkle root is set, before the proof of work is solved.
    pub fn with_header(mut self, f: impl FnOnce(&mut BlockHeader) + 'f) -> Self {
        self.header_munger = Some(Box::new(f));
        self
    }

    /// Keep the nonce as is, the block most likely fails the proof-of-work check.
    pub fn without_pow(mut self) -> Self {
        self.solve = false;
        self
    }

    pub fn build(self) -> Block {
        self.build_inner().0
    }

    /// Constructs a block and calls process_block on it.
    pub fn build_and_process(self) -> Result<ProcessBlockOutcome, ChainstateError> {
        let (block, framework) = self.build_inner();
        framework.process_block(block)
    }

    fn build_inner(self) -> (Block, &'f mut TestFramework) {
        let Self {
            framework,
            parent,
            timestamp,
            voters,
            transactions,
            coinbase_munger,
            header_munger,
            solve,
        } = self;

        let chain_config = framework.chain_config();
        let parent_block = framework
            .generated_block(&parent)
            .cloned()
            .unwrap_or_else(|| framework.block(parent));
        let height = parent_block.height().next_height();

        let voters = voters.unwrap_or_else(|| {
            if height >= chain_config.stake_validation_height() {
                chain_config.votes_per_block()
            } else {
                0
            }
        });

        let mut coinbase_outputs = vec![
            TxOutput::new(
                chain_config.tax_subsidy(height, voters),
                chain_config.tax_destination().clone(),
            ),
            coinbase_height_commitment(height),
            TxOutput::new(chain_config.work_subsidy(height, voters), Destination::AnyoneCanSpend),
        ];
        if let Some(munge) = coinbase_munger {
            munge(&mut coinbase_outputs);
        }

        let extra_nonce = framework.next_extra_nonce();
        let mut block_transactions = vec![Transaction::new(
            TxKind::Coinbase,
            Vec::new(),
            coinbase_outputs,
            extra_nonce,
        )];
        block_transactions.extend((0..voters).map(|voter| vote(parent, voter)));
        block_transactions.extend(transactions);

        let timestamp = timestamp.unwrap_or_else(|| {
            let spacing = chain_config.target_block_spacing().as_secs();
            parent_block.timestamp().add_int_seconds(spacing).unwrap()
        });

        let fresh_stake = block_transactions.iter().filter(|tx| tx.is_ticket_purchase()).count();

        let mut header = BlockHeader {
            version: BlockHeader::CURRENT_VERSION,
            prev_block_id: parent,
            merkle_root: calculate_tx_merkle_root(&block_transactions),
            voters,
            fresh_stake: fresh_stake as u8,
            bits: chain_config.pow_limit(),
            height,
            timestamp,
            nonce: 0,
        };
        if let Some(munge) = header_munger {
            munge(&mut header);
        }
        if solve {
            solve_pow(&mut header);
        }

        let block = Block::new(header, block_transactions);
        framework.remember(&block);
        (block, framework)
    }
}

/// A vote for `parent` from the given voter; voters are told apart by their reward destination
fn vote(parent: Id<Block>, voter: u16) -> Transaction {
    let [hi, lo] = voter.to_be_bytes();
    let mut key_hash = [0u8; 20];
    key_hash[0] = hi;
    key_hash[1] = lo;
    key_hash[19] = 1;
    Transaction::new(
        TxKind::Vote { voted_block: parent },
        Vec::new(),
        vec![TxOutput::new(Amount::ZERO, Destination::PublicKeyHash(key_hash))],
        0,
    )
}

/// Find a nonce whose header hash meets the declared target
fn solve_pow(header: &mut BlockHeader) {
    let Some(target) = header.bits.to_target().filter(|target| !target.is_zero()) else {
        return;
    };
    while !hash_meets_target(&header.block_id().get(), &target) {
        header.nonce += 1;
    }
}
