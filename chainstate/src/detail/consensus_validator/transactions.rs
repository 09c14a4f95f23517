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

use common::{
    chain::{Block, OutPoint},
    primitives::{BlockDistance, Idable},
};

use super::ConsensusValidator;
use crate::{collaborators::TransactionVerifierError, detail::CheckBlockError};

impl ConsensusValidator<'_> {
    /// Input resolution and coinbase maturity, then the opaque per-transaction checks
    pub(super) fn check_block_transactions(&self, block: &Block) -> Result<(), CheckBlockError> {
        let parent_id = block.prev_block_id();
        let spend_height = block.height();
        let maturity = self.chain_config.coinbase_maturity();

        // Outputs created earlier in this block, flagged when they belong to the coinbase
        let mut created_here: BTreeMap<OutPoint, bool> = BTreeMap::new();

        for tx in block.transactions() {
            for input in tx.inputs() {
                let outpoint = *input.outpoint();

                if let Some(from_coinbase) = created_here.get(&outpoint) {
                    if *from_coinbase {
                        return Err(TransactionVerifierError::ImmatureCoinbaseSpend {
                            outpoint,
                            created: spend_height,
                            spend_height,
                        }
                        .into());
                    }
                    continue;
                }

                let utxo = self
                    .stake_state
                    .spendable_output(&outpoint, &parent_id)
                    .map_err(TransactionVerifierError::from)?
                    .ok_or(TransactionVerifierError::MissingInput(outpoint))?;

                if utxo.is_coinbase() {
                    let age = (spend_height - utxo.height()).unwrap_or(BlockDistance::zero());
                    if age < maturity {
                        return Err(TransactionVerifierError::ImmatureCoinbaseSpend {
                            outpoint,
                            created: utxo.height(),
                            spend_height,
                        }
                        .into());
                    }
                }
            }

            if !tx.is_coinbase() {
                self.tx_verifier.check_transaction(tx, &parent_id, spend_height)?;
            }

            let tx_id = tx.get_id();
            for index in 0..tx.outputs().len() {
                created_here.insert(OutPoint::new(tx_id, index as u32), tx.is_coinbase());
            }
        }

        Ok(())
    }
}
