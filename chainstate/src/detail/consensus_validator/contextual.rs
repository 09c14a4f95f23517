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

use chainstate_types::BlockIndex;
use common::{
    chain::{Block, BlockTimestamp, TxKind},
    primitives::Idable,
};
use utils::ensure;

use super::ConsensusValidator;
use crate::detail::{median_time::calculate_median_time_past, CheckBlockError, ContextualError};

impl ConsensusValidator<'_> {
    /// Checks against the parent and the chain it ends
    pub(super) fn check_block_context(
        &self,
        block: &Block,
        parent: &BlockIndex,
    ) -> Result<(), CheckBlockError> {
        ensure!(
            !parent.status().is_invalid(),
            CheckBlockError::InvalidAncestor(*parent.block_id())
        );

        let expected = parent.block_height().next_height();
        ensure!(
            block.height() == expected,
            ContextualError::BadHeight {
                expected,
                got: block.height(),
            }
        );

        self.check_timestamp(block, parent)?;

        let expected_bits =
            self.difficulty.required_bits(self.chain_config, parent, block.timestamp());
        ensure!(
            block.bits() == expected_bits,
            ContextualError::BadDifficulty {
                expected: expected_bits,
                got: block.bits(),
            }
        );

        self.check_stake(block, parent)
    }

    fn check_timestamp(&self, block: &Block, parent: &BlockIndex) -> Result<(), ContextualError> {
        let timestamp = block.timestamp();

        let median = calculate_median_time_past(self.block_index, parent);
        ensure!(
            timestamp > median,
            ContextualError::TimestampNotAfterMedianTime {
                timestamp: timestamp.as_int_seconds(),
                median: median.as_int_seconds(),
            }
        );

        let max = BlockTimestamp::from_duration_since_epoch(
            self.time_getter
                .get_time()
                .saturating_add(self.chain_config.max_future_block_time_offset()),
        );
        ensure!(
            timestamp <= max,
            ContextualError::TimestampTooFarInFuture {
                timestamp: timestamp.as_int_seconds(),
                max: max.as_int_seconds(),
            }
        );
        Ok(())
    }

    fn check_stake(&self, block: &Block, parent: &BlockIndex) -> Result<(), CheckBlockError> {
        let height = block.height();

        if block.fresh_stake() > 0 {
            let enabled_at = self.chain_config.stake_enabled_height();
            ensure!(
                height >= enabled_at,
                ContextualError::TicketsBeforeStakeEnabled { height, enabled_at }
            );
        }

        let validation_height = self.chain_config.stake_validation_height();
        if block.voters() > 0 {
            ensure!(
                height >= validation_height,
                ContextualError::VotesBeforeValidationHeight {
                    height,
                    validation_height,
                }
            );

            for vote in block.votes() {
                if let TxKind::Vote { voted_block } = vote.kind() {
                    ensure!(
                        voted_block == parent.block_id(),
                        ContextualError::VoteForWrongBlock {
                            tx: vote.get_id(),
                            voted: *voted_block,
                            expected: *parent.block_id(),
                        }
                    );
                }
            }

            let live = self
                .stake_state
                .live_tickets(parent.block_id())
                .map_err(ContextualError::StakeState)?;
            ensure!(
                u32::from(block.voters()) <= live,
                ContextualError::NotEnoughLiveTickets {
                    votes: block.voters(),
                    live,
                }
            );
        }

        if height >= validation_height {
            let required = self.chain_config.min_votes_required();
            ensure!(
                block.voters() >= required,
                CheckBlockError::NotEnoughVotes {
                    got: block.voters(),
                    required,
                }
            );
        }

        Ok(())
    }
}
