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

use crate::{
    chain::{BlockTimestamp, Destination},
    primitives::{BlockDistance, BlockHeight, Compact, Idable},
};

use super::{create_genesis_block, ChainConfig, ChainType, SubsidySchedule};

/// Builder for [ChainConfig]
#[derive(Clone)]
pub struct Builder {
    chain_type: ChainType,
    genesis_timestamp: BlockTimestamp,
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

impl Builder {
    /// A new chain config builder, with given chain type as a basis
    pub fn new(chain_type: ChainType) -> Self {
        Self {
            chain_type,
            genesis_timestamp: chain_type.default_genesis_timestamp(),
            pow_limit: chain_type.default_pow_limit(),
            coinbase_maturity: chain_type.default_coinbase_maturity(),
            stake_enabled_height: chain_type.default_stake_enabled_height(),
            stake_validation_height: chain_type.default_stake_validation_height(),
            votes_per_block: 5,
            max_fresh_stake_per_block: 20,
            max_block_size: super::DEFAULT_MAX_BLOCK_SIZE,
            max_future_block_time_offset: super::DEFAULT_MAX_FUTURE_BLOCK_TIME_OFFSET,
            target_block_spacing: super::DEFAULT_TARGET_BLOCK_SPACING,
            subsidy_schedule: chain_type.default_subsidy_schedule(),
            tax_destination: chain_type.default_tax_destination(),
        }
    }

    pub fn regtest() -> Self {
        Self::new(ChainType::Regtest).target_block_spacing(Duration::from_secs(1))
    }

    /// New builder initialized with a small test chain: trivial proof of work and
    /// stake rules that kick in after a handful of blocks
    pub fn test_chain() -> Self {
        Self::regtest()
            .coinbase_maturity(BlockDistance::new(4))
            .stake_enabled_height(BlockHeight::new(8))
            .stake_validation_height(BlockHeight::new(16))
    }

    /// Build the chain config
    pub fn build(self) -> ChainConfig {
        let Self {
            chain_type,
            genesis_timestamp,
            pow_limit,
            coinbase_maturity,
            stake_enabled_height,
            stake_validation_height,
            votes_per_block,
            max_fresh_stake_per_block,
            max_block_size,
            max_future_block_time_offset,
            target_block_spacing,
            subsidy_schedule,
            tax_destination,
        } = self;

        let genesis_block = create_genesis_block(genesis_timestamp, pow_limit, &tax_destination);
        let genesis_block_id = genesis_block.get_id();

        ChainConfig {
            chain_type,
            genesis_block,
            genesis_block_id,
            pow_limit,
            coinbase_maturity,
            stake_enabled_height,
            stake_validation_height,
            votes_per_block,
            max_fresh_stake_per_block,
            max_block_size,
            max_future_block_time_offset,
            target_block_spacing,
            subsidy_schedule,
            tax_destination,
        }
    }
}

macro_rules! builder_method {
    ($name:ident: $type:ty) => {
        #[doc = concat!("Set the `", stringify!($name), "` field.")]
        #[must_use = "chain::config::Builder dropped prematurely"]
        pub fn $name(mut self, $name: $type) -> Self {
            self.$name = $name;
            self
        }
    };
}

impl Builder {
    builder_method!(chain_type: ChainType);
    builder_method!(genesis_timestamp: BlockTimestamp);
    builder_method!(pow_limit: Compact);
    builder_method!(coinbase_maturity: BlockDistance);
    builder_method!(stake_enabled_height: BlockHeight);
    builder_method!(stake_validation_height: BlockHeight);
    builder_method!(votes_per_block: u16);
    builder_method!(max_fresh_stake_per_block: u8);
    builder_method!(max_block_size: usize);
    builder_method!(max_future_block_time_offset: Duration);
    builder_method!(target_block_spacing: Duration);
    builder_method!(subsidy_schedule: SubsidySchedule);
    builder_method!(tax_destination: Destination);
}
