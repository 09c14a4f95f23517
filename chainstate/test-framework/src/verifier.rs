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

use std::{collections::BTreeSet, sync::Arc};

use chainstate::collaborators::{TransactionVerifier, TransactionVerifierError};
use common::{
    chain::{Block, Transaction},
    primitives::{BlockHeight, Id, Idable},
};
use parking_lot::Mutex;

#[derive(Default)]
struct Rules {
    rejected_transactions: BTreeSet<Id<Transaction>>,
    refused_blocks: BTreeSet<Id<Block>>,
}

/// Transaction verifier that accepts everything except what a test told it to refuse.
/// Clones share the same rules.
#[derive(Clone, Default)]
pub struct TestVerifier(Arc<Mutex<Rules>>);

impl TestVerifier {
    /// Fail `check_transaction` for the given transaction
    pub fn reject_transaction(&self, tx_id: Id<Transaction>) {
        self.0.lock().rejected_transactions.insert(tx_id);
    }

    /// Fail `check_connect` for the given block, i.e. when it is about to join the active chain
    pub fn refuse_connect(&self, block_id: Id<Block>) {
        self.0.lock().refused_blocks.insert(block_id);
    }

    pub fn allow_connect(&self, block_id: &Id<Block>) {
        self.0.lock().refused_blocks.remove(block_id);
    }

    pub fn verifier(&self) -> Box<dyn TransactionVerifier> {
        Box::new(self.clone())
    }
}

impl TransactionVerifier for TestVerifier {
    fn check_transaction(
        &self,
        tx: &Transaction,
        _parent: &Id<Block>,
        _spend_height: BlockHeight,
    ) -> Result<(), TransactionVerifierError> {
        let tx_id = tx.get_id();
        if self.0.lock().rejected_transactions.contains(&tx_id) {
            return Err(TransactionVerifierError::TransactionRejected {
                tx: tx_id,
                reason: "rejected by test".to_owned(),
            });
        }
        Ok(())
    }

    fn check_connect(
        &self,
        block: &Block,
        _height: BlockHeight,
    ) -> Result<(), TransactionVerifierError> {
        let block_id = block.get_id();
        if self.0.lock().refused_blocks.contains(&block_id) {
            return Err(TransactionVerifierError::ConnectRejected {
                block: block_id,
                reason: "refused by test".to_owned(),
            });
        }
        Ok(())
    }
}
