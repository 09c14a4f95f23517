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

use chainstate_types::BlockStatus;

use super::*;
use crate::{ChainstateEvent, TieBreakPolicy};

#[test]
fn side_chain_reports_fork_length() {
    let mut tc = TestChainstate::new();
    let main = tc.chain(&tc.genesis(), 2, 0);
    for block in &main {
        assert!(tc.process(block).unwrap().extends_tip());
    }

    // Fork at genesis: a1 is one block off the fork point, a2 two
    let side = tc.chain(&tc.genesis(), 3, 1);
    let outcome = tc.process(&side[0]).unwrap();
    assert_eq!((outcome.fork_len(), outcome.is_orphan()), (1, false));
    assert_eq!(tc.process(&side[1]).unwrap().fork_len(), 2);

    // Equal work keeps the first seen tip
    assert_eq!(tc.chainstate.get_best_block_id(), main[1].get_id());
    assert_eq!(tc.chainstate.is_block_in_main_chain(&side[1].get_id()), Ok(false));
    assert_eq!(
        tc.chainstate.get_block_height_in_main_chain(&main[0].get_id()),
        Ok(Some(BlockHeight::new(1)))
    );
}

#[test]
fn reorg_to_longer_chain() {
    let mut tc = TestChainstate::new();
    let main = tc.chain(&tc.genesis(), 2, 0);
    let side = tc.chain(&tc.genesis(), 3, 1);
    for block in main.iter().chain(&side[..2]) {
        tc.process(block).unwrap();
    }

    let events = Arc::new(Mutex::new(Vec::new()));
    {
        let events = Arc::clone(&events);
        tc.chainstate
            .subscribe_to_events(Arc::new(move |event: ChainstateEvent| events.lock().push(event)));
    }
    tc.notifications.lock().clear();

    let outcome = tc.process(&side[2]).unwrap();
    assert_eq!((outcome.fork_len(), outcome.is_orphan()), (2, false));
    assert!(!outcome.extends_tip());

    assert_eq!(tc.chainstate.get_best_block_id(), side[2].get_id());
    for (height, block) in side.iter().enumerate() {
        assert_eq!(tc.main_chain_id_at(height as u64 + 1), Some(block.get_id()));
    }
    for block in &main {
        assert_eq!(tc.chainstate.is_block_in_main_chain(&block.get_id()), Ok(false));
        assert_eq!(tc.chainstate.get_block_status(&block.get_id()), Some(BlockStatus::Valid));
    }

    let h = BlockHeight::new;
    assert_eq!(
        *tc.notifications.lock(),
        vec![
            (false, main[1].get_id(), h(2)),
            (false, main[0].get_id(), h(1)),
            (true, side[0].get_id(), h(1)),
            (true, side[1].get_id(), h(2)),
            (true, side[2].get_id(), h(3)),
        ]
    );

    tc.chainstate.wait_for_all_events();
    assert_eq!(
        *events.lock(),
        vec![
            ChainstateEvent::BlockDisconnected(main[1].get_id(), h(2)),
            ChainstateEvent::BlockDisconnected(main[0].get_id(), h(1)),
            ChainstateEvent::BlockConnected(side[0].get_id(), h(1)),
            ChainstateEvent::BlockConnected(side[1].get_id(), h(2)),
            ChainstateEvent::BlockConnected(side[2].get_id(), h(3)),
            ChainstateEvent::NewTip(side[2].get_id(), h(3)),
        ]
    );
}

#[test]
fn reorg_from_mid_chain() {
    let mut tc = TestChainstate::new();
    let main = tc.chain(&tc.genesis(), 3, 0);
    for block in &main {
        tc.process(block).unwrap();
    }
    let side = tc.chain(&main[0], 3, 1);
    for block in &side {
        tc.process(block).unwrap();
    }

    assert_eq!(tc.chainstate.get_best_block_id(), side[2].get_id());
    assert_eq!(tc.main_chain_id_at(1), Some(main[0].get_id()));
    assert_eq!(tc.main_chain_id_at(4), Some(side[2].get_id()));
    assert_eq!(tc.main_chain_id_at(5), None);
}

#[test]
fn lowest_id_tie_break() {
    let mut tc = TestChainstate::with_configs(
        Builder::test_chain().build(),
        ChainstateConfig::new().with_tie_break(TieBreakPolicy::LowestId),
    );
    let a = tc.child(&tc.genesis(), 0);
    let b = tc.child(&tc.genesis(), 1);
    let (low, high) = if a.get_id() < b.get_id() { (a, b) } else { (b, a) };

    tc.process(&high).unwrap();
    assert_eq!(tc.chainstate.get_best_block_id(), high.get_id());

    let outcome = tc.process(&low).unwrap();
    assert_eq!(outcome.fork_len(), 1);
    assert_eq!(tc.chainstate.get_best_block_id(), low.get_id());
}

#[test]
fn connect_failure_keeps_old_tip() {
    let mut tc = TestChainstate::new();
    let main = tc.chain(&tc.genesis(), 1, 0);
    let side = tc.chain(&tc.genesis(), 3, 1);
    tc.process(&main[0]).unwrap();
    tc.refuse_connect.lock().insert(side[1].get_id());

    tc.process(&side[0]).unwrap();
    tc.notifications.lock().clear();

    let result = tc.process(&side[1]);
    assert_eq!(
        result,
        Err(BlockError::ReorgFailed(ReorgError::ConnectFailed {
            block_id: side[1].get_id(),
            error: TransactionVerifierError::ConnectRejected {
                block: side[1].get_id(),
                reason: "refused".to_owned(),
            },
        }))
    );

    assert_eq!(tc.chainstate.get_best_block_id(), main[0].get_id());
    assert_eq!(tc.main_chain_id_at(1), Some(main[0].get_id()));
    assert_eq!(tc.main_chain_id_at(2), None);
    assert!(tc.notifications.lock().is_empty());
    assert_eq!(
        tc.chainstate.get_block_status(&side[1].get_id()),
        Some(BlockStatus::Invalid)
    );
    assert!(matches!(
        tc.chainstate.get_block_validation_error(&side[1].get_id()),
        Some(CheckBlockError::TransactionInvalid(_))
    ));

    // Blocks on top of the refused one are invalid ancestors
    let err = tc.process(&side[2]).unwrap_err();
    assert_eq!(
        err,
        BlockError::CheckBlockFailed(CheckBlockError::InvalidAncestor(side[1].get_id()))
    );
    assert_eq!(
        tc.chainstate.get_block_status(&side[2].get_id()),
        Some(BlockStatus::InvalidAncestor)
    );
}
