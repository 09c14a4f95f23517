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

//! Test harness for the chainstate: a block builder that produces consensus-valid blocks,
//! a named-block chain generator, and mock collaborators the tests can steer.

#![allow(clippy::unwrap_used)]

mod block_builder;
mod chain_generator;
mod failing_storage;
mod framework;
mod framework_builder;
mod stake_universe;
mod utils;
mod verifier;

/// Storage backend used for testing (the in-memory backend behind a failure switch)
pub type TestStore = failing_storage::FailingStorage<chainstate_storage::Store>;

/// Chainstate instantiation for testing, using the in-memory storage backend
pub type TestChainstate = Box<dyn chainstate::ChainstateInterface>;

pub use {
    block_builder::BlockBuilder,
    chain_generator::ChainGenerator,
    failing_storage::{FailingStorage, FailingStorageTxRw},
    framework::TestFramework,
    framework_builder::TestFrameworkBuilder,
    stake_universe::{StakeNotification, StakeUniverse},
    utils::{regular_transaction, spend_output, work_output},
    verifier::TestVerifier,
};
