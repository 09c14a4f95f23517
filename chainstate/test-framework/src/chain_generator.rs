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

use std::collections::BTreeMap;

use chainstate::{BlockError, ChainstateError, ProcessBlockOutcome};
use common::{
    chain::{Block, OutPoint},
    primitives::{Amount, Id, Idable},
};

use crate::{utils::work_output, BlockBuilder, TestFramework};

const GENESIS_NAME: &str = "genesis";

/// Builds blocks under human-readable names and checks how the chainstate takes them.
///
/// New blocks go on top of the generator's own tip, which follows the last generated block
/// unless moved with [ChainGenerator::set_tip]. It is independent of the chainstate's tip.
pub struct ChainGenerator {
    pub tf: TestFramework,
    blocks: BTreeMap<String, Block>,
    tip_name: String,
}

impl ChainGenerator {
    pub fn new(tf: TestFramework) -> Self {
        let blocks = BTreeMap::from([(GENESIS_NAME.to_owned(), tf.genesis())]);
        Self {
            tf,
            blocks,
            tip_name: GENESIS_NAME.to_owned(),
        }
    }

    #[track_caller]
    pub fn block(&self, name: &str) -> &Block {
        self.blocks.get(name).unwrap_or_else(|| panic!("no block named {name}"))
    }

    #[track_caller]
    pub fn id(&self, name: &str) -> Id<Block> {
        self.block(name).get_id()
    }

    pub fn tip(&self) -> &Block {
        self.block(&self.tip_name)
    }

    pub fn tip_name(&self) -> &str {
        &self.tip_name
    }

    /// Build a valid block named `name` on the current tip and make it the new tip
    pub fn next_block(&mut self, name: &str) -> &Block {
        self.next_block_with(name, |builder| builder)
    }

    /// Same as [ChainGenerator::next_block], with a chance to alter the block before it is built
    pub fn next_block_with(
        &mut self,
        name: &str,
        munge: impl FnOnce(BlockBuilder) -> BlockBuilder,
    ) -> &Block {
        assert!(!self.blocks.contains_key(name), "block name {name} reused");
        let parent = self.tip().get_id();
        let block = munge(self.tf.make_block_builder().with_parent(parent)).build();
        self.blocks.insert(name.to_owned(), block);
        self.tip_name = name.to_owned();
        self.tip()
    }

    #[track_caller]
    pub fn set_tip(&mut self, name: &str) {
        assert!(self.blocks.contains_key(name), "no block named {name}");
        self.tip_name = name.to_owned();
    }

    pub fn process(&mut self, name: &str) -> Result<ProcessBlockOutcome, ChainstateError> {
        let block = self.block(name).clone();
        self.tf.process_block(block)
    }

    /// Submit the named block and expect it to be accepted with the given placement.
    /// A block that triggers a reorg does not extend the tip, see [ProcessBlockOutcome].
    #[track_caller]
    pub fn accept_block(&mut self, name: &str, extends_tip: bool, is_orphan: bool) {
        let outcome = self
            .process(name)
            .unwrap_or_else(|err| panic!("block {name} was rejected: {err}"));
        assert_eq!(outcome.is_orphan(), is_orphan, "unexpected orphan status of block {name}");
        assert_eq!(
            outcome.extends_tip(),
            extends_tip,
            "unexpected placement of block {name} (fork length {})",
            outcome.fork_len()
        );
    }

    /// Submit the tip and expect it to extend the active chain
    #[track_caller]
    pub fn accept_tip_block(&mut self) {
        let name = self.tip_name.clone();
        self.accept_block(&name, true, false);
        self.expect_tip(&name);
    }

    /// Submit the tip and expect it to wait for its parent
    #[track_caller]
    pub fn accept_tip_block_as_orphan(&mut self) {
        let name = self.tip_name.clone();
        self.accept_block(&name, false, true);
    }

    /// Submit the named block and expect the given error
    #[track_caller]
    pub fn reject_block(&mut self, name: &str, expected: impl Into<BlockError>) {
        let expected = ChainstateError::ProcessBlockError(expected.into());
        match self.process(name) {
            Ok(outcome) => panic!("block {name} was accepted ({outcome:?}), expected {expected}"),
            Err(err) => assert_eq!(err, expected, "block {name} rejected with the wrong error"),
        }
    }

    #[track_caller]
    pub fn reject_tip_block(&mut self, expected: impl Into<BlockError>) {
        let name = self.tip_name.clone();
        self.reject_block(&name, expected);
    }

    /// Build and accept blocks on the tip until the stake validation height is reached.
    ///
    /// Blocks before the stake enabled height are plain (`bm<height>`). From there on each block
    /// buys a ticket with a coinbase output that just matured (`bse<height>`), and the block at the
    /// stake validation height (`bsv<height>`) carries the votes.
    pub fn advance_to_stake_validation_height(&mut self) {
        let chain_config = self.tf.chain_config();
        let stake_enabled = chain_config.stake_enabled_height();
        let validation_height = chain_config.stake_validation_height();

        while self.tip().height() < validation_height {
            let height = self.tip().height().next_height();
            if height < stake_enabled {
                self.next_block(&format!("bm{height}"));
            } else {
                let prefix = if height < validation_height { "bse" } else { "bsv" };
                self.next_ticket_block(&format!("{prefix}{height}"));
            }
            self.accept_tip_block();
        }
    }

    /// Build a block on the tip that buys a ticket with the coinbase output that just matured
    pub fn next_ticket_block(&mut self, name: &str) -> &Block {
        let (outpoint, value) = self.mature_coinbase_output();
        self.next_block_with(name, |b| b.add_ticket_purchase(outpoint, value))
    }

    /// The proof-of-work output of the block `coinbase_maturity` below the next block on the
    /// tip, the youngest coinbase output that block may spend
    #[track_caller]
    pub fn mature_coinbase_output(&self) -> (OutPoint, Amount) {
        let maturity = self.tf.chain_config().coinbase_maturity().into_int();
        let mut block = self.tip().clone();
        for _ in 1..maturity {
            let parent = block.prev_block_id();
            block = self
                .tf
                .generated_block(&parent)
                .cloned()
                .unwrap_or_else(|| self.tf.block(parent));
        }
        assert!(!block.height().is_genesis(), "no mature coinbase below {}", self.tip_name);

        let outpoint = work_output(&block);
        let coinbase = block.coinbase().unwrap();
        let value = coinbase.outputs()[outpoint.output_index() as usize].value();
        (outpoint, value)
    }

    /// The chainstate's best block is the named block
    #[track_caller]
    pub fn expect_tip(&self, name: &str) {
        let best = self.tf.best_block_id();
        let expected = self.id(name);
        if best != expected {
            let best_name = self
                .blocks
                .iter()
                .find(|(_, block)| block.get_id() == best)
                .map_or("<unnamed>", |(name, _)| name.as_str());
            panic!("best block is {best_name}, expected {name}");
        }
    }
}
