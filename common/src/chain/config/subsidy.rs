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

use std::num::NonZeroU64;

use thiserror::Error;
use utils::ensure;

use crate::primitives::{Amount, BlockHeight};

#[derive(Error, Debug, PartialEq, Eq, Clone)]
pub enum SubsidyScheduleError {
    #[error("The reduction multiplier {mul} exceeds the divisor {div}")]
    IncreasingSubsidy { mul: u64, div: u64 },
    #[error("Work, stake and tax proportions are all zero")]
    ZeroProportions,
}

/// Block subsidy that decays geometrically every `reduction_interval` blocks and is
/// split between the proof-of-work miner, the voters and the dev-org tax.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubsidySchedule {
    base_subsidy: Amount,
    reduction_interval: NonZeroU64,
    mul_subsidy: u64,
    div_subsidy: NonZeroU64,
    work_proportion: u16,
    stake_proportion: u16,
    tax_proportion: u16,
}

impl SubsidySchedule {
    pub fn new(
        base_subsidy: Amount,
        reduction_interval: NonZeroU64,
        (mul_subsidy, div_subsidy): (u64, NonZeroU64),
        (work_proportion, stake_proportion, tax_proportion): (u16, u16, u16),
    ) -> Result<Self, SubsidyScheduleError> {
        ensure!(
            mul_subsidy <= div_subsidy.get(),
            SubsidyScheduleError::IncreasingSubsidy {
                mul: mul_subsidy,
                div: div_subsidy.get(),
            }
        );
        ensure!(
            work_proportion as u32 + stake_proportion as u32 + tax_proportion as u32 > 0,
            SubsidyScheduleError::ZeroProportions
        );
        Ok(Self {
            base_subsidy,
            reduction_interval,
            mul_subsidy,
            div_subsidy,
            work_proportion,
            stake_proportion,
            tax_proportion,
        })
    }

    pub fn base_subsidy(&self) -> Amount {
        self.base_subsidy
    }

    pub fn reduction_interval(&self) -> NonZeroU64 {
        self.reduction_interval
    }

    fn total_proportions(&self) -> u128 {
        self.work_proportion as u128 + self.stake_proportion as u128 + self.tax_proportion as u128
    }

    /// Full subsidy minted at the given height, before it is split. Genesis mints nothing.
    pub fn block_subsidy(&self, height: BlockHeight) -> Amount {
        if height.is_genesis() {
            return Amount::ZERO;
        }

        let reductions = height.into_int() / self.reduction_interval.get();
        let mut subsidy = self.base_subsidy;
        for _ in 0..reductions {
            if subsidy == Amount::ZERO {
                break;
            }
            // Cannot grow since mul <= div; an overflow of the intermediate product ends emission.
            subsidy = (subsidy * self.mul_subsidy as u128)
                .and_then(|v| v / self.div_subsidy.get() as u128)
                .unwrap_or(Amount::ZERO);
        }
        subsidy
    }

    fn proportion_of(&self, height: BlockHeight, proportion: u16) -> Amount {
        (self.block_subsidy(height) * proportion as u128)
            .and_then(|v| v / self.total_proportions())
            .unwrap_or(Amount::ZERO)
    }

    /// Proof-of-work share when every vote slot is filled
    pub fn full_work_subsidy(&self, height: BlockHeight) -> Amount {
        self.proportion_of(height, self.work_proportion)
    }

    /// Share of a single vote, given the number of vote slots per block
    pub fn stake_subsidy_per_vote(&self, height: BlockHeight, votes_per_block: u16) -> Amount {
        (self.proportion_of(height, self.stake_proportion) / votes_per_block.max(1) as u128)
            .unwrap_or(Amount::ZERO)
    }

    /// Dev-org tax when every vote slot is filled
    pub fn full_tax_subsidy(&self, height: BlockHeight) -> Amount {
        self.proportion_of(height, self.tax_proportion)
    }
}

/// Scales an amount by `voters / votes_per_block`
pub fn scale_by_votes(amount: Amount, voters: u16, votes_per_block: u16) -> Amount {
    if votes_per_block == 0 {
        return amount;
    }
    (amount * voters as u128)
        .and_then(|v| v / votes_per_block as u128)
        .unwrap_or(Amount::ZERO)
}
