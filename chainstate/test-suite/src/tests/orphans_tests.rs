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

use std::time::Duration;

use chainstate::{BlockStatus, ChainstateConfig};
use chainstate_test_framework::TestFramework;
use common::{chain::Block, primitives::Idable};
use rstest::rstest;
use test_utils::random::{make_seedable_rng, Rng, Seed, SliceRandom};

/// Build `len` blocks on the best block without processing them
fn withheld_chain(tf: &mut TestFramework, len: usize) -> Vec<Block> {
    let mut blocks: Vec<Block> = Vec::with_capacity(len);
    let mut parent = tf.best_block_id();
    for _ in 0..len {
        let block = tf.make_block_builder().with_parent(parent).build();
        parent = block.get_id();
        blocks.push(block);
    }
    blocks
}

#[rstest]
#[trace]
#[case(Seed::from_entropy())]
fn orphans_connect_in_any_order(#[case] seed: Seed) {
    let mut rng = make_seedable_rng(seed);
    let mut tf = TestFramework::default_test_chain();

    let blocks = withheld_chain(&mut tf, rng.gen_range(2..20));
    let mut shuffled = blocks.clone();
    shuffled.shuffle(&mut rng);

    for block in shuffled {
        let parent_known = tf.chainstate.get_block_index(&block.prev_block_id()).unwrap().is_some();
        let outcome = tf.process_block(block).unwrap();
        assert_eq!(outcome.is_orphan(), !parent_known);
    }

    assert_eq!(tf.chainstate.orphans_count(), 0);
    assert_eq!(tf.best_block_id(), blocks.last().unwrap().get_id());
    for (height, block) in blocks.iter().enumerate() {
        assert_eq!(tf.block_id(height as u64 + 1), block.get_id());
        assert_eq!(tf.block_status(&block.get_id()), Some(BlockStatus::Valid));
    }
}

// A long orphan chain is connected in one go once its root arrives
#[test]
fn long_orphan_chain() {
    let mut tf = TestFramework::default_test_chain();
    let blocks = withheld_chain(&mut tf, 300);

    for block in blocks.iter().skip(1).rev() {
        assert!(tf.process_block(block.clone()).unwrap().is_orphan());
    }
    assert_eq!(tf.chainstate.orphans_count(), blocks.len() - 1);

    let outcome = tf.process_block(blocks[0].clone()).unwrap();
    assert!(outcome.extends_tip());
    assert_eq!(tf.chainstate.orphans_count(), 0);
    assert_eq!(tf.best_block_id(), blocks.last().unwrap().get_id());
}

#[test]
fn expired_orphan_never_connects() {
    let expiration = Duration::from_secs(600);
    let mut tf = TestFramework::builder()
        .with_chainstate_config(ChainstateConfig::new().with_orphan_expiration(expiration))
        .build();
    let blocks = withheld_chain(&mut tf, 2);

    assert!(tf.process_block(blocks[1].clone()).unwrap().is_orphan());

    tf.progress_time_seconds_since_epoch(expiration.as_secs() - 1);
    assert_eq!(tf.chainstate.evict_expired_orphans(), 0);
    tf.progress_time_seconds_since_epoch(1);
    assert_eq!(tf.chainstate.evict_expired_orphans(), 1);
    assert!(!tf.chainstate.is_already_an_orphan(&blocks[1].get_id()));

    assert!(tf.process_block(blocks[0].clone()).unwrap().extends_tip());
    assert_eq!(tf.best_block_id(), blocks[0].get_id());
    assert!(tf.chainstate.get_block_index(&blocks[1].get_id()).unwrap().is_none());

    // The evicted block is welcome again
    assert!(tf.process_block(blocks[1].clone()).unwrap().extends_tip());
}

// With a full pool the oldest orphan goes first
#[test]
fn orphan_pool_capacity() {
    let mut tf = TestFramework::builder()
        .with_chainstate_config(ChainstateConfig::new().with_max_orphan_blocks(3))
        .build();
    let blocks = withheld_chain(&mut tf, 5);

    for block in &blocks[1..] {
        assert!(tf.process_block(block.clone()).unwrap().is_orphan());
    }
    assert_eq!(tf.chainstate.orphans_count(), 3);
    assert!(!tf.chainstate.is_already_an_orphan(&blocks[1].get_id()));

    // The evicted orphan was the link to the rest
    tf.process_block(blocks[0].clone()).unwrap();
    assert_eq!(tf.best_block_id(), blocks[0].get_id());
    assert_eq!(tf.chainstate.orphans_count(), 3);

    tf.process_block(blocks[1].clone()).unwrap();
    assert_eq!(tf.best_block_id(), blocks[4].get_id());
    assert_eq!(tf.chainstate.orphans_count(), 0);
}
