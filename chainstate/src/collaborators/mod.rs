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

//! Services the chainstate queries but does not own the logic of.
//!
//! The stake-state provider answers spendability and ticket questions and follows the active
//! chain through connect/disconnect notifications. The transaction verifier is a black-box
//! predicate over scripts and signatures. The difficulty oracle knows the retarget rule.

mod difficulty;
mod stake_state;
mod tx_verifier;

pub use difficulty::{ConstantDifficulty, DifficultyOracle};
pub use stake_state::{StakeState, StakeStateError, UtxoEntry};
pub use tx_verifier::{AcceptAllTransactions, TransactionVerifier, TransactionVerifierError};

/// The external services a chainstate is wired to
pub struct Collaborators {
    pub stake_state: Box<dyn StakeState>,
    pub tx_verifier: Box<dyn TransactionVerifier>,
    pub difficulty: Box<dyn DifficultyOracle>,
}

impl Collaborators {
    /// Collaborators with the difficulty fixed at the chain's proof-of-work limit
    pub fn new(
        stake_state: Box<dyn StakeState>,
        tx_verifier: Box<dyn TransactionVerifier>,
    ) -> Self {
        Self {
            stake_state,
            tx_verifier,
            difficulty: Box::new(ConstantDifficulty),
        }
    }

    pub fn with_difficulty(mut self, difficulty: Box<dyn DifficultyOracle>) -> Self {
        self.difficulty = difficulty;
        self
    }
}
