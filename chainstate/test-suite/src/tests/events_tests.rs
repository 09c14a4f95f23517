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

use chainstate::ChainstateEvent;
use chainstate_test_framework::{ChainGenerator, TestFramework};
use common::{
    chain::{Destination, TxOutput},
    primitives::Idable,
};

use super::subscribe;

#[test]
fn events_of_extending_blocks() {
    let mut tf = TestFramework::default_test_chain();
    let events = subscribe(&mut tf.chainstate);

    let genesis_id = tf.genesis().get_id();
    tf.create_chain(&genesis_id, 3).unwrap();
    tf.chainstate.wait_for_all_events();

    let mut expected = Vec::new();
    for height in 1..=3u64 {
        let block = tf.block(tf.block_id(height));
        expected.push(ChainstateEvent::BlockConnected(block.get_id(), block.height()));
        expected.push(ChainstateEvent::NewTip(block.get_id(), block.height()));
    }
    assert_eq!(*events.lock().unwrap(), expected);
}

// Orphans, side blocks and rejected blocks leave the active chain alone and stay silent
#[test]
fn no_events_without_tip_change() {
    let mut g = ChainGenerator::new(TestFramework::default_test_chain());
    g.next_block("a1");
    g.accept_tip_block();
    g.next_block("a2");
    g.accept_tip_block();

    let events = subscribe(&mut g.tf.chainstate);

    g.set_tip("genesis");
    g.next_block("s1");
    g.next_block("s2");
    g.accept_block("s2", false, true);
    g.accept_block("s1", false, false);
    g.expect_tip("a2");

    let a2 = g.id("a2");
    g.set_tip("a2");
    g.next_block_with("bad", |b| {
        b.with_coinbase_outputs(|outputs: &mut Vec<TxOutput>| {
            let value = outputs[0].value();
            outputs[0] = TxOutput::new(value, Destination::AnyoneCanSpend);
        })
    });
    assert!(g.process("bad").is_err());

    g.tf.chainstate.wait_for_all_events();
    assert!(events.lock().unwrap().is_empty());
    assert_eq!(g.tf.best_block_id(), a2);
}

#[test]
fn every_subscriber_gets_every_event() {
    let mut tf = TestFramework::default_test_chain();
    let subscribers: Vec<_> = (0..4).map(|_| subscribe(&mut tf.chainstate)).collect();

    let genesis_id = tf.genesis().get_id();
    let tip = tf.create_chain(&genesis_id, 5).unwrap();
    tf.chainstate.wait_for_all_events();

    for events in &subscribers {
        let events = events.lock().unwrap();
        assert_eq!(events.len(), 10);
        assert_eq!(
            events.last(),
            Some(&ChainstateEvent::NewTip(tip, tf.best_block_height()))
        );
    }
}
