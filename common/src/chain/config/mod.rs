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

mod builder;
mod subsidy;

use std::time::Duration;

use parity_scale_codec::Encode;

pub use builder::Builder;
pub use subsidy::{scale_by_votes, SubsidySchedule, SubsidyScheduleError};

use crate::primitives::{Amount, BlockDistance, BlockHeight, Compact, Id, H256};

use super::{
    calculate_tx_merkle_root, Block, BlockHeader, BlockTimestamp, Destination, Transaction, TxKind,
    TxOutput,
};

pub const DEFAULT_MAX_BLOCK_SIZE: usize = 1_310_720;
pub const DEFAULT_MAX_FUTURE_BLOCK_TIME_OFFSET: Duration = Duration::from_secs(2 * 60 * 60);
pub const DEFAULT_TARGET_BLOCK_SPACING: Duration = Duration::from_secs(300);

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ChainType {
    Mainnet,
    Testnet,
    Regtest,
}

impl ChainType {
    pub const fn name(&self) -> &'static str {
        match self {
            ChainType::Mainnet => "mainnet",
            ChainType::Testnet => "testnet",
            ChainType::Regtest => "regtest",
        }
    }

    const fn default_pow_limit(&self) -> Compact {
        match self {
            ChainType::Mainnet | ChainType::Testnet => Compact(0x1d00ffff),
            ChainType::Regtest => Compact(0x207fffff),
        }
    }

    const fn default_coinbase_maturity(&self) -> BlockDistance {
        match self {
            ChainType::Mainnet | ChainType::Testnet => BlockDistance::new(256),
            ChainType::Regtest => BlockDistance::new(16),
        }
    }

    const fn default_stake_enabled_height(&self) -> BlockHeight {
        match self {
            ChainType::Mainnet => BlockHeight::new(4096),
            ChainType::Testnet => BlockHeight::new(768),
            ChainType::Regtest => BlockHeight::new(32),
        }
    }

    const fn default_stake_validation_height(&self) -> BlockHeight {
        match self {
            ChainType::Mainnet => BlockHeight::new(4096),
            ChainType::Testnet => BlockHeight::new(768),
            ChainType::Regtest => BlockHeight::new(144),
        }
    }

    const fn default_genesis_timestamp(&self) -> BlockTimestamp {
        match self {
            ChainType::Mainnet => BlockTimestamp::from_int_seconds(1_454_954_400),
            ChainType::Testnet => BlockTimestamp::from_int_seconds(1_533_513_600),
            ChainType::Regtest => BlockTimestamp::from_int_seconds(1_538_524_800),
        }
    }

    fn default_subsidy_schedule(&self) -> SubsidySchedule {
        let (base, interval) = match self {
            ChainType::Mainnet => (3_119_582_664, 6144),
            ChainType::Testnet => (2_500_000_000, 2048),
            ChainType::Regtest => (50_000_000_000, 128),
        };
        SubsidySchedule::new(
            Amount::from_atoms(base),
            std::num::NonZeroU64::new(interval).expect("non-zero interval"),
            (100, std::num::NonZeroU64::new(101).expect("non-zero divisor")),
            (6, 3, 1),
        )
        .expect("default subsidy schedule is valid")
    }

    const fn default_tax_destination(&self) -> Destination {
        match self {
            ChainType::Mainnet => Destination::ScriptHash([
                0xf5, 0x91, 0x6f, 0xf3, 0x7b, 0x39, 0x28, 0x7c, 0x45, 0x5b, 0x48, 0x18, 0xb5, 0x04,
                0x96, 0x4c, 0x33, 0xd9, 0xfd, 0x1e,
            ]),
            ChainType::Testnet | ChainType::Regtest => Destination::ScriptHash([0x5a; 20]),
        }
    }
}

/// Consensus parameters of a chain. Read-only once built; see [Builder].
#[derive(Debug, Clone)]
pub struct ChainConfig {
    chain_type: ChainType,
    genesis_block: Block,
    genesis_block_id: Id<Block>,
    pow_limit: Compact,
    coinbase_maturity: BlockDistance,
    stake_enabled_height: BlockHeight,
    stake_validation_height: BlockHeight,
    votes_per_block: u16,
    max_fresh_stake_per_block: u8,
    max_block_size: usize,
    max_future_block_time_offset: Duration,
    target_block_spacing: Duration,
    subsidy_schedule: SubsidySchedule,
    tax_destination: Destination,
}

impl ChainConfig {
    pub fn chain_type(&self) -> ChainType {
        self.chain_type
    }

    pub fn genesis_block(&self) -> &Block {
        &self.genesis_block
    }

    pub fn genesis_block_id(&self) -> Id<Block> {
        self.genesis_block_id
    }

    pub fn pow_limit(&self) -> Compact {
        self.pow_limit
    }

    /// Number of blocks that must be built on top of a coinbase before its outputs are spendable
    pub fn coinbase_maturity(&self) -> BlockDistance {
        self.coinbase_maturity
    }

    /// First height at which ticket purchases are allowed
    pub fn stake_enabled_height(&self) -> BlockHeight {
        self.stake_enabled_height
    }

    /// First height at which blocks must carry votes
    pub fn stake_validation_height(&self) -> BlockHeight {
        self.stake_validation_height
    }

    pub fn votes_per_block(&self) -> u16 {
        self.votes_per_block
    }

    /// A block is only valid with a majority of the vote slots filled
    pub fn min_votes_required(&self) -> u16 {
        self.votes_per_block / 2 + 1
    }

    pub fn max_fresh_stake_per_block(&self) -> u8 {
        self.max_fresh_stake_per_block
    }

    pub fn max_block_size(&self) -> usize {
        self.max_block_size
    }

    pub fn max_future_block_time_offset(&self) -> Duration {
        self.max_future_block_time_offset
    }

    pub fn target_block_spacing(&self) -> Duration {
        self.target_block_spacing
    }

    pub fn subsidy_schedule(&self) -> &SubsidySchedule {
        &self.subsidy_schedule
    }

    pub fn tax_destination(&self) -> &Destination {
        &self.tax_destination
    }

    fn scale_after_validation_height(
        &self,
        amount: Amount,
        height: BlockHeight,
        voters: u16,
    ) -> Amount {
        if height < self.stake_validation_height {
            amount
        } else {
            scale_by_votes(amount, voters, self.votes_per_block)
        }
    }

    /// Amount the proof-of-work outputs of the coinbase at `height` must pay, given its vote count
    pub fn work_subsidy(&self, height: BlockHeight, voters: u16) -> Amount {
        let full = self.subsidy_schedule.full_work_subsidy(height);
        self.scale_after_validation_height(full, height, voters)
    }

    /// Amount the tax output of the coinbase at `height` must pay, given its vote count
    pub fn tax_subsidy(&self, height: BlockHeight, voters: u16) -> Amount {
        let full = self.subsidy_schedule.full_tax_subsidy(height);
        self.scale_after_validation_height(full, height, voters)
    }
}

pub fn create_mainnet() -> ChainConfig {
    Builder::new(ChainType::Mainnet).build()
}

pub fn create_testnet() -> ChainConfig {
    Builder::new(ChainType::Testnet).build()
}

pub fn create_regtest() -> ChainConfig {
    Builder::regtest().build()
}

/// The output committing a coinbase to its block height; keeps coinbase ids unique
pub fn coinbase_height_commitment(height: BlockHeight) -> TxOutput {
    TxOutput::new(Amount::ZERO, Destination::NullData(height.encode()))
}

fn create_genesis_block(
    timestamp: BlockTimestamp,
    pow_limit: Compact,
    tax_destination: &Destination,
) -> Block {
    let coinbase = Transaction::new(
        TxKind::Coinbase,
        vec![],
        vec![
            TxOutput::new(Amount::ZERO, tax_destination.clone()),
            coinbase_height_commitment(BlockHeight::zero()),
        ],
        0,
    );
    let transactions = vec![coinbase];
    let header = BlockHeader {
        version: BlockHeader::CURRENT_VERSION,
        prev_block_id: Id::new(H256::zero()),
        merkle_root: calculate_tx_merkle_root(&transactions),
        voters: 0,
        fresh_stake: 0,
        bits: pow_limit,
        height: BlockHeight::zero(),
        timestamp,
        nonce: 0,
    };
    Block::new(header, transactions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitives::Idable;

    #[test]
    fn mainnet_defaults() {
        let config = Builder::new(ChainType::Mainnet).build();
        assert_eq!(config.chain_type().name(), "mainnet");
        assert_eq!(config.min_votes_required(), 3);
        assert_eq!(config.genesis_block().height(), BlockHeight::zero());
        assert_eq!(config.genesis_block_id(), config.genesis_block().get_id());
        assert!(config.genesis_block().prev_block_id().is_zero());
    }

    #[test]
    fn genesis_differs_per_chain() {
        let mainnet = Builder::new(ChainType::Mainnet).build();
        let regtest = Builder::new(ChainType::Regtest).build();
        assert_ne!(mainnet.genesis_block_id(), regtest.genesis_block_id());
    }

    #[test]
    fn subsidy_is_scaled_by_votes_only_after_validation_height() {
        let config = Builder::regtest()
            .stake_validation_height(BlockHeight::new(10))
            .votes_per_block(5)
            .build();
        let before = BlockHeight::new(9);
        let after = BlockHeight::new(10);
        let full = config.subsidy_schedule().full_work_subsidy(after);

        assert_eq!(
            config.work_subsidy(before, 0),
            config.subsidy_schedule().full_work_subsidy(before)
        );
        assert_eq!(config.work_subsidy(after, 5), full);
        assert_eq!(config.work_subsidy(after, 3), scale_by_votes(full, 3, 5));
        assert!(config.tax_subsidy(after, 3) < config.tax_subsidy(after, 4));
    }
}
