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

use std::collections::BTreeSet;

use common::{
    chain::{calculate_tx_merkle_root, config::coinbase_height_commitment, Block, ChainConfig},
    primitives::{amount::sum_amounts, compact::hash_meets_target, Idable},
};
use utils::ensure;

use super::BlockProcessingFlags;
use crate::detail::StructuralError;

/// Checks that need nothing but the block and the chain parameters.
///
/// Proof of work comes first, then the checks binding the body to the header (merkle root and
/// unique transaction ids), so that a failure of any later check is a property of the block the
/// header commits to.
pub fn check_block_structure(
    chain_config: &ChainConfig,
    block: &Block,
    flags: BlockProcessingFlags,
) -> Result<(), StructuralError> {
    check_proof_of_work(chain_config, block, flags)?;

    ensure!(!block.transactions().is_empty(), StructuralError::NoTransactions);
    ensure!(
        calculate_tx_merkle_root(block.transactions()) == block.merkle_root(),
        StructuralError::MerkleRootMismatch
    );
    // An odd transaction count lets the last one be repeated without changing the merkle root
    check_duplicate_transactions(block)?;

    let size = block.encoded_size();
    let max = chain_config.max_block_size();
    ensure!(size <= max, StructuralError::BlockTooLarge { size, max });

    check_coinbase(block)?;
    check_duplicate_inputs(block)?;
    check_stake_counts(chain_config, block)?;

    Ok(())
}

fn check_proof_of_work(
    chain_config: &ChainConfig,
    block: &Block,
    flags: BlockProcessingFlags,
) -> Result<(), StructuralError> {
    let bits = block.bits();
    let target = bits
        .to_target()
        .filter(|target| !target.is_zero())
        .ok_or(StructuralError::BadDifficultyBits(bits))?;

    let limit = chain_config.pow_limit();
    let limit_target = limit.to_target().ok_or(StructuralError::BadDifficultyBits(limit))?;
    ensure!(
        target <= limit_target,
        StructuralError::DifficultyAboveLimit { bits, limit }
    );

    if flags != BlockProcessingFlags::NoPoWCheck {
        ensure!(
            hash_meets_target(&block.get_id().get(), &target),
            StructuralError::InsufficientProofOfWork
        );
    }
    Ok(())
}

fn check_coinbase(block: &Block) -> Result<(), StructuralError> {
    let coinbase = block.coinbase().ok_or(StructuralError::FirstTxNotCoinbase)?;

    if let Some(extra) = block.transactions().iter().skip(1).find(|tx| tx.is_coinbase()) {
        return Err(StructuralError::MultipleCoinbases(extra.get_id()));
    }

    ensure!(coinbase.inputs().is_empty(), StructuralError::CoinbaseHasInputs);

    // Tax output, then the height commitment, then the proof-of-work outputs
    let outputs = coinbase.outputs();
    ensure!(outputs.len() >= 2, StructuralError::BadCoinbaseStructure);
    ensure!(
        outputs[1] == coinbase_height_commitment(block.height()),
        StructuralError::CoinbaseHeightMismatch(block.height())
    );

    sum_amounts(outputs.iter().map(|output| output.value()))
        .ok_or(StructuralError::CoinbaseValueOverflow)?;

    Ok(())
}

fn check_duplicate_transactions(block: &Block) -> Result<(), StructuralError> {
    let mut tx_ids = BTreeSet::new();
    for tx in block.transactions() {
        let tx_id = tx.get_id();
        ensure!(tx_ids.insert(tx_id), StructuralError::DuplicateTransaction(tx_id));
    }
    Ok(())
}

fn check_duplicate_inputs(block: &Block) -> Result<(), StructuralError> {
    let mut spent = BTreeSet::new();
    for input in block.transactions().iter().flat_map(|tx| tx.inputs()) {
        let outpoint = *input.outpoint();
        ensure!(spent.insert(outpoint), StructuralError::DuplicateInput(outpoint));
    }
    Ok(())
}

fn check_stake_counts(chain_config: &ChainConfig, block: &Block) -> Result<(), StructuralError> {
    let votes = block.votes().count();
    ensure!(
        votes == block.voters() as usize,
        StructuralError::VotersMismatch {
            header: block.voters(),
            actual: votes,
        }
    );

    let tickets = block.ticket_purchases().count();
    ensure!(
        tickets == block.fresh_stake() as usize,
        StructuralError::FreshStakeMismatch {
            header: block.fresh_stake(),
            actual: tickets,
        }
    );

    let max_votes = chain_config.votes_per_block();
    ensure!(
        block.voters() <= max_votes,
        StructuralError::TooManyVotes {
            got: block.voters(),
            max: max_votes,
        }
    );

    let max_fresh_stake = chain_config.max_fresh_stake_per_block();
    ensure!(
        block.fresh_stake() <= max_fresh_stake,
        StructuralError::TooMuchFreshStake {
            got: block.fresh_stake(),
            max: max_fresh_stake,
        }
    );

    Ok(())
}
