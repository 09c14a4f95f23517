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

use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    time::Duration,
};

use chainstate::{BlockProcessingFlags, ChainstateConfig, ChainstateHandle};
use chainstate_test_framework::TestFramework;
use common::{
    chain::Block,
    primitives::{BlockHeight, Id, Idable},
};

const READERS: usize = 4;

fn withheld_branch(tf: &mut TestFramework, mut parent: Id<Block>, len: usize) -> Vec<Block> {
    let mut blocks = Vec::with_capacity(len);
    for _ in 0..len {
        let block = tf.make_block_builder().with_parent(parent).build();
        parent = block.get_id();
        blocks.push(block);
    }
    blocks
}

// Readers never see the best block disagree with the height index, whatever reorgs the writer
// goes through
#[test]
fn readers_see_consistent_tip() {
    let mut tf = TestFramework::default_test_chain();
    let genesis_id = tf.genesis().get_id();

    // Alternating branches off genesis, each one block longer than the last
    let mut branches = Vec::new();
    for len in 2..12 {
        branches.push(withheld_branch(&mut tf, genesis_id, len));
    }
    let expected_tip = branches.last().and_then(|b| b.last()).unwrap().get_id();

    let handle = ChainstateHandle::new(tf.chainstate());
    let done = AtomicBool::new(false);

    std::thread::scope(|s| {
        for _ in 0..READERS {
            s.spawn(|| {
                let mut observed = 0usize;
                while !done.load(Ordering::Acquire) || observed == 0 {
                    handle.call(|cs| {
                        let best_id = cs.get_best_block_id().unwrap();
                        let best_height = cs.get_best_block_height().unwrap();
                        let at_best_height = cs.get_block_id_from_height(&best_height).unwrap();
                        assert_eq!(at_best_height, Some(best_id));
                        assert_eq!(
                            cs.get_block_id_from_height(&best_height.next_height()).unwrap(),
                            None
                        );
                        assert!(cs.is_block_in_main_chain(&best_id).unwrap());
                    });
                    observed += 1;
                }
            });
        }

        for block in branches.into_iter().flatten() {
            handle
                .call_mut(|cs| cs.process_block(block, BlockProcessingFlags::None))
                .unwrap();
        }
        done.store(true, Ordering::Release);
    });

    assert_eq!(handle.call(|cs| cs.get_best_block_id()).unwrap(), expected_tip);
    assert_eq!(
        handle.call(|cs| cs.get_best_block_height()).unwrap(),
        BlockHeight::new(11)
    );
}

#[test]
fn periodic_eviction_of_expired_orphans() {
    let expiration = Duration::from_secs(60);
    let mut tf = TestFramework::builder()
        .with_chainstate_config(ChainstateConfig::new().with_orphan_expiration(expiration))
        .build();
    let genesis_id = tf.genesis().get_id();
    let blocks = withheld_branch(&mut tf, genesis_id, 3);
    for block in &blocks[1..] {
        assert!(tf.process_block(block.clone()).unwrap().is_orphan());
    }

    let time_value = Arc::clone(&tf.time_value);
    let handle = ChainstateHandle::new(tf.chainstate());

    let runtime = tokio::runtime::Builder::new_current_thread().enable_time().build().unwrap();
    runtime.block_on(async {
        let task = handle.spawn_orphan_eviction(Duration::from_millis(10));

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(handle.call(|cs| cs.orphans_count()), 2);

        time_value.fetch_add(expiration.as_secs(), Ordering::SeqCst);
        let mut attempts = 0;
        while handle.call(|cs| cs.orphans_count()) > 0 {
            assert!(attempts < 500, "expired orphans were never evicted");
            attempts += 1;
            tokio::time::sleep(Duration::from_millis(10)).await;
        }

        task.abort();
    });

    // The parent connects alone, its former orphans are gone
    let first = blocks[0].clone();
    let outcome = handle
        .call_mut(|cs| cs.process_block(first, BlockProcessingFlags::None))
        .unwrap();
    assert!(outcome.extends_tip());
    assert_eq!(handle.call(|cs| cs.get_best_block_height()).unwrap(), BlockHeight::new(1));
}
