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

use common::{
    chain::{Block, Destination, OutPoint, Transaction, TxInput, TxKind, TxOutput},
    primitives::{Amount, Idable},
};

/// Index of the first proof-of-work output in a coinbase, after the tax and the height commitment
const FIRST_WORK_OUTPUT: u32 = 2;

/// The first proof-of-work output of the block's coinbase
pub fn work_output(block: &Block) -> OutPoint {
    let coinbase = block.coinbase().expect("block has a coinbase");
    OutPoint::new(coinbase.get_id(), FIRST_WORK_OUTPUT)
}

/// A regular transaction paying `value` to anyone
pub fn regular_transaction(inputs: Vec<OutPoint>, value: Amount) -> Transaction {
    Transaction::new(
        TxKind::Regular,
        inputs.into_iter().map(|outpoint| TxInput::new(outpoint, Vec::new())).collect(),
        vec![TxOutput::new(value, Destination::AnyoneCanSpend)],
        0,
    )
}

/// A regular transaction spending `outpoint` into a single output worth `value`
pub fn spend_output(outpoint: OutPoint, value: Amount) -> Transaction {
    regular_transaction(vec![outpoint], value)
}

/// A ticket purchase locking the whole of `outpoint`, worth `value`, into a ticket
pub fn ticket_purchase(outpoint: OutPoint, value: Amount) -> Transaction {
    Transaction::new(
        TxKind::TicketPurchase,
        vec![TxInput::new(outpoint, Vec::new())],
        vec![TxOutput::new(value, Destination::AnyoneCanSpend)],
        0,
    )
}
