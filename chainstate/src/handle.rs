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

use std::{sync::Arc, time::Duration};

use logging::log;
use parking_lot::RwLock;
use tokio::{task::JoinHandle, time::MissedTickBehavior};

use crate::ChainstateInterface;

/// Shared access to a chainstate.
///
/// Readers run concurrently. A call through [ChainstateHandle::call_mut] is exclusive, so a
/// reader never observes a reorganization half-way.
#[derive(Clone)]
pub struct ChainstateHandle(Arc<RwLock<Box<dyn ChainstateInterface>>>);

impl ChainstateHandle {
    pub fn new(chainstate: Box<dyn ChainstateInterface>) -> Self {
        Self(Arc::new(RwLock::new(chainstate)))
    }

    pub fn call<R>(&self, f: impl FnOnce(&dyn ChainstateInterface) -> R) -> R {
        let chainstate = self.0.read();
        f(chainstate.as_ref())
    }

    pub fn call_mut<R>(&self, f: impl FnOnce(&mut dyn ChainstateInterface) -> R) -> R {
        let mut chainstate = self.0.write();
        f(chainstate.as_mut())
    }

    /// Periodically drop expired orphans. Must be called from within a tokio runtime.
    pub fn spawn_orphan_eviction(&self, period: Duration) -> JoinHandle<()> {
        let handle = self.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                let evicted = handle.call_mut(|chainstate| chainstate.evict_expired_orphans());
                if evicted > 0 {
                    log::debug!("Periodic eviction dropped {evicted} orphan blocks");
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU64, Ordering};

    use chainstate_storage::Store;
    use common::{
        chain::{config::create_regtest, Block, BlockHeader, OutPoint},
        primitives::{BlockHeight, Compact, Id, H256},
        time_getter::TimeGetter,
    };

    use super::*;
    use crate::{
        collaborators::{AcceptAllTransactions, Collaborators, StakeState, StakeStateError, UtxoEntry},
        make_chainstate, BlockProcessingFlags, ChainstateConfig,
    };

    struct NoStake;

    impl StakeState for NoStake {
        fn spendable_output(
            &self,
            _outpoint: &OutPoint,
            _as_of: &Id<Block>,
        ) -> Result<Option<UtxoEntry>, StakeStateError> {
            Ok(None)
        }

        fn live_tickets(&self, _parent: &Id<Block>) -> Result<u32, StakeStateError> {
            Ok(0)
        }

        fn block_connected(&mut self, _block: &Block, _height: BlockHeight) {}

        fn block_disconnected(&mut self, _block: &Block, _height: BlockHeight) {}
    }

    fn orphan_block() -> Block {
        let header = BlockHeader {
            version: BlockHeader::CURRENT_VERSION,
            prev_block_id: Id::new(H256::repeat_byte(9)),
            merkle_root: H256::zero(),
            voters: 0,
            fresh_stake: 0,
            bits: Compact(0x207fffff),
            height: BlockHeight::new(5),
            timestamp: common::chain::BlockTimestamp::from_int_seconds(1),
            nonce: 0,
        };
        Block::new(header, vec![])
    }

    #[tokio::test(start_paused = true)]
    async fn periodic_orphan_eviction() {
        let seconds = Arc::new(AtomicU64::new(1_000_000));
        let time_getter = {
            let seconds = Arc::clone(&seconds);
            TimeGetter::new(Arc::new(move || Duration::from_secs(seconds.load(Ordering::SeqCst))))
        };
        let chainstate = make_chainstate(
            Arc::new(create_regtest()),
            ChainstateConfig::new().with_orphan_expiration(Duration::from_secs(10)),
            Store::new_empty().unwrap(),
            Collaborators::new(Box::new(NoStake), Box::new(AcceptAllTransactions)),
            time_getter,
        )
        .unwrap();
        let handle = ChainstateHandle::new(chainstate);

        let outcome = handle
            .call_mut(|cs| cs.process_block(orphan_block(), BlockProcessingFlags::None))
            .unwrap();
        assert!(outcome.is_orphan());

        let task = handle.spawn_orphan_eviction(Duration::from_secs(1));
        tokio::time::sleep(Duration::from_millis(1500)).await;
        assert_eq!(handle.call(|cs| cs.orphans_count()), 1);

        seconds.fetch_add(11, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(handle.call(|cs| cs.orphans_count()), 0);

        task.abort();
    }
}
