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

use chainstate::{BlockStatus, ChainstateError, InitializationError};
use chainstate_test_framework::{ChainGenerator, TestFramework, TestFrameworkBuilder};
use common::{
    chain::{config::Builder as ChainConfigBuilder, BlockTimestamp, Destination, TxOutput},
    primitives::{BlockHeight, Idable},
};

#[test]
fn fresh_storage_starts_at_genesis() {
    let tf = TestFramework::default_test_chain();
    let genesis_id = tf.genesis().get_id();

    assert_eq!(tf.best_block_id(), genesis_id);
    assert_eq!(tf.best_block_height(), BlockHeight::zero());
    assert_eq!(tf.block_id(0), genesis_id);
    assert_eq!(tf.block_status(&genesis_id), Some(BlockStatus::Valid));
    assert_eq!(tf.chainstate.get_chain_tips().len(), 1);
    assert_eq!(tf.chainstate.orphans_count(), 0);
}

// Reopening the storage brings back the block tree and the active chain, but no orphans
#[test]
fn reopen_existing_storage() {
    let mut g = ChainGenerator::new(TestFramework::default_test_chain());
    g.next_block("a1");
    g.accept_tip_block();
    g.next_block("a2");
    g.accept_tip_block();

    g.set_tip("a1");
    g.next_block("s2");
    g.accept_block("s2", false, false);
    g.next_block_with("s3", |b| {
        b.with_coinbase_outputs(|outputs: &mut Vec<TxOutput>| {
            let value = outputs[0].value();
            outputs[0] = TxOutput::new(value, Destination::AnyoneCanSpend);
        })
    });
    assert!(g.process("s3").is_err());

    g.set_tip("a2");
    g.next_block("withheld");
    g.next_block("orphan");
    g.accept_tip_block_as_orphan();

    let [a1, a2, s2, s3, withheld, orphan] =
        ["a1", "a2", "s2", "s3", "withheld", "orphan"].map(|name| g.id(name));
    let tip_height = g.tf.best_block_height();
    g.tf.stake.clear_notifications();

    let reopened = TestFrameworkBuilder::from_existing_framework(g.tf).build();

    assert_eq!(reopened.best_block_id(), a2);
    assert_eq!(reopened.best_block_height(), tip_height);
    assert_eq!(reopened.block_id(1), a1);
    assert!(reopened.is_block_in_main_chain(&a2));
    assert!(!reopened.is_block_in_main_chain(&s2));
    assert_eq!(reopened.block_status(&s2), Some(BlockStatus::Valid));
    assert_eq!(reopened.block_status(&s3), Some(BlockStatus::Invalid));
    // Rejection reasons live in memory only
    assert_eq!(reopened.chainstate.get_block_validation_error(&s3), None);

    assert_eq!(reopened.chainstate.orphans_count(), 0);
    assert_eq!(reopened.block_status(&withheld), None);
    assert_eq!(reopened.block_status(&orphan), None);

    // The stake state already knows the active chain, nothing is replayed into it
    assert!(reopened.stake.notifications().is_empty());
}

#[test]
fn reopened_chainstate_keeps_going() {
    let mut tf = TestFramework::default_test_chain();
    let genesis_id = tf.genesis().get_id();
    tf.create_chain(&genesis_id, 4).unwrap();

    let mut reopened = TestFrameworkBuilder::from_existing_framework(tf).build();
    let tip = reopened.best_block_id();
    let new_tip = reopened.create_chain(&tip, 3).unwrap();
    assert_eq!(reopened.best_block_id(), new_tip);
    assert_eq!(reopened.best_block_height(), BlockHeight::new(7));
}

#[test]
fn genesis_mismatch() {
    let tf = TestFramework::default_test_chain();
    let stored = tf.genesis().get_id();

    let other_config = ChainConfigBuilder::test_chain()
        .genesis_timestamp(BlockTimestamp::from_int_seconds(
            tf.genesis().timestamp().as_int_seconds() + 1,
        ))
        .build();
    let expected = other_config.genesis_block_id();

    let result = TestFramework::builder()
        .with_storage(tf.storage.clone())
        .with_chain_config(other_config)
        .try_build();
    match result {
        Err(err) => assert_eq!(
            err,
            ChainstateError::FailedToInitializeChainstate(InitializationError::GenesisMismatch {
                stored,
                expected,
            })
        ),
        Ok(_) => panic!("chainstate opened storage of another chain"),
    }
}
