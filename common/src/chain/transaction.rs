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

use parity_scale_codec::{Decode, Encode};

use crate::primitives::{hash_encoded, Amount, Id, Idable};

use super::Block;

/// Where the value of an output goes. Spending conditions are checked by the transaction verifier.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Encode, Decode)]
pub enum Destination {
    #[codec(index = 0)]
    AnyoneCanSpend,
    #[codec(index = 1)]
    PublicKeyHash([u8; 20]),
    #[codec(index = 2)]
    ScriptHash([u8; 20]),
    /// Unspendable data carrier
    #[codec(index = 3)]
    NullData(Vec<u8>),
}

impl std::fmt::Display for Destination {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Destination::AnyoneCanSpend => write!(f, "AnyoneCanSpend"),
            Destination::PublicKeyHash(h) => write!(f, "PublicKeyHash({})", hex::encode(h)),
            Destination::ScriptHash(h) => write!(f, "ScriptHash({})", hex::encode(h)),
            Destination::NullData(d) => write!(f, "NullData({})", hex::encode(d)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Encode, Decode)]
pub struct OutPoint {
    tx_id: Id<Transaction>,
    index: u32,
}

impl OutPoint {
    pub fn new(tx_id: Id<Transaction>, index: u32) -> Self {
        Self { tx_id, index }
    }

    pub fn tx_id(&self) -> Id<Transaction> {
        self.tx_id
    }

    pub fn output_index(&self) -> u32 {
        self.index
    }
}

impl std::fmt::Display for OutPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.tx_id, self.index)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode)]
pub struct TxInput {
    outpoint: OutPoint,
    witness: Vec<u8>,
}

impl TxInput {
    pub fn new(outpoint: OutPoint, witness: Vec<u8>) -> Self {
        Self { outpoint, witness }
    }

    pub fn outpoint(&self) -> &OutPoint {
        &self.outpoint
    }

    pub fn witness(&self) -> &[u8] {
        &self.witness
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode)]
pub struct TxOutput {
    value: Amount,
    destination: Destination,
}

impl TxOutput {
    pub fn new(value: Amount, destination: Destination) -> Self {
        Self { value, destination }
    }

    pub fn value(&self) -> Amount {
        self.value
    }

    pub fn destination(&self) -> &Destination {
        &self.destination
    }
}

/// The role a transaction plays in a block
#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode)]
pub enum TxKind {
    #[codec(index = 0)]
    Regular,
    /// Mints the proof-of-work subsidy and pays the dev-org tax. Always the first transaction.
    #[codec(index = 1)]
    Coinbase,
    /// Buys a stake ticket; counted by the header's `fresh_stake`
    #[codec(index = 2)]
    TicketPurchase,
    /// A stake vote on the block it builds on; counted by the header's `voters`
    #[codec(index = 3)]
    Vote { voted_block: Id<Block> },
}

#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode)]
pub struct Transaction {
    version: u8,
    kind: TxKind,
    inputs: Vec<TxInput>,
    outputs: Vec<TxOutput>,
    lock_time: u32,
}

impl Transaction {
    pub const CURRENT_VERSION: u8 = 1;

    pub fn new(kind: TxKind, inputs: Vec<TxInput>, outputs: Vec<TxOutput>, lock_time: u32) -> Self {
        Self {
            version: Self::CURRENT_VERSION,
            kind,
            inputs,
            outputs,
            lock_time,
        }
    }

    pub fn version(&self) -> u8 {
        self.version
    }

    pub fn kind(&self) -> &TxKind {
        &self.kind
    }

    pub fn inputs(&self) -> &[TxInput] {
        &self.inputs
    }

    pub fn outputs(&self) -> &[TxOutput] {
        &self.outputs
    }

    pub fn lock_time(&self) -> u32 {
        self.lock_time
    }

    pub fn is_coinbase(&self) -> bool {
        self.kind == TxKind::Coinbase
    }

    pub fn is_ticket_purchase(&self) -> bool {
        self.kind == TxKind::TicketPurchase
    }

    pub fn is_vote(&self) -> bool {
        matches!(self.kind, TxKind::Vote { .. })
    }

    /// Replaces the outputs. Changes the transaction id.
    pub fn with_outputs(mut self, outputs: Vec<TxOutput>) -> Self {
        self.outputs = outputs;
        self
    }
}

impl Idable for Transaction {
    type Tag = Transaction;
    fn get_id(&self) -> Id<Transaction> {
        Id::new(hash_encoded(self))
    }
}
