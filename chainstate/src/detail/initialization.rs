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

use std::{collections::BTreeMap, sync::Arc};

use chainstate_storage::{
    BlockchainStorage, BlockchainStorageRead, BlockchainStorageWrite, TransactionRo,
    TransactionRw, CURRENT_STORAGE_VERSION,
};
use chainstate_types::{BlockIndex, BlockStatus};
use common::{
    chain::ChainConfig,
    primitives::{BlockHeight, ChainWork},
    time_getter::TimeGetter,
};
use logging::log;
use utils::{ensure, eventhandler::EventsController, tap_log::TapLog};

use super::{BlockIndexMap, Chainstate, InitializationError, OrphanBlocksPool};
use crate::{collaborators::Collaborators, ChainstateConfig};

impl<S: BlockchainStorage> Chainstate<S> {
    /// Open a chainstate over `chainstate_storage`, writing the genesis block into an empty store
    /// or rebuilding the block tree from a populated one.
    pub fn new(
        chain_config: Arc<ChainConfig>,
        chainstate_config: ChainstateConfig,
        chainstate_storage: S,
        collaborators: Collaborators,
        time_getter: TimeGetter,
    ) -> Result<Self, InitializationError> {
        let storage_version = {
            let db_tx = chainstate_storage.transaction_ro().log_err()?;
            let version = db_tx.get_storage_version().log_err()?;
            db_tx.close();
            version
        };

        let Collaborators {
            stake_state,
            tx_verifier,
            difficulty,
        } = collaborators;

        let orphan_blocks = OrphanBlocksPool::new(
            chainstate_config.max_orphan_blocks,
            chainstate_config.orphan_expiration(),
        );
        let best_block_id = chain_config.genesis_block_id();

        let mut chainstate = Self {
            chain_config,
            chainstate_config,
            chainstate_storage,
            block_index: BlockIndexMap::new(),
            orphan_blocks,
            best_block_id,
            invalid_reasons: BTreeMap::new(),
            stake_state,
            tx_verifier,
            difficulty,
            time_getter,
            events_controller: EventsController::new(),
        };

        match storage_version {
            None => chainstate.process_genesis()?,
            Some(CURRENT_STORAGE_VERSION) => chainstate.load_block_index()?,
            Some(version) => {
                return Err(InitializationError::UnsupportedStorageVersion(version)).log_err()
            }
        }

        Ok(chainstate)
    }

    /// Initialize an empty store with the genesis block
    fn process_genesis(&mut self) -> Result<(), InitializationError> {
        let genesis = self.chain_config.genesis_block();
        let genesis_id = self.chain_config.genesis_block_id();
        let chain_work = ChainWork::from_bits(genesis.bits())
            .ok_or(InitializationError::InvalidGenesisBits(genesis.bits()))?;
        let genesis_index = BlockIndex::new(genesis, chain_work, 0, BlockStatus::Valid);

        let mut db_tx = self.chainstate_storage.transaction_rw().log_err()?;
        db_tx.set_storage_version(CURRENT_STORAGE_VERSION)?;
        db_tx.add_block(genesis)?;
        db_tx.set_block_index(&genesis_index)?;
        db_tx.set_block_id_at_height(&BlockHeight::zero(), &genesis_id)?;
        db_tx.set_best_block_id(&genesis_id)?;
        db_tx.commit().log_err()?;

        self.block_index.insert(genesis_index)?;
        self.best_block_id = genesis_id;
        self.stake_state.block_connected(genesis, BlockHeight::zero());

        log::info!("Chainstate initialized with genesis block {genesis_id}");
        Ok(())
    }

    /// Rebuild the in-memory block tree from the stored index entries
    fn load_block_index(&mut self) -> Result<(), InitializationError> {
        let db_tx = self.chainstate_storage.transaction_ro().log_err()?;
        let best_block_id =
            db_tx.get_best_block_id()?.ok_or(InitializationError::BestBlockNotFound)?;
        let stored_genesis = db_tx
            .get_block_id_by_height(&BlockHeight::zero())?
            .ok_or(InitializationError::GenesisNotStored)?;
        let mut indices = db_tx.get_all_block_indices()?;
        db_tx.close();

        let expected = self.chain_config.genesis_block_id();
        ensure!(
            stored_genesis == expected,
            InitializationError::GenesisMismatch {
                stored: stored_genesis,
                expected,
            }
        );

        // Acceptance order puts every parent before its children
        indices.sort_by_key(|index| index.sequence());
        let count = indices.len();
        for index in indices {
            self.block_index.insert(index)?;
        }

        ensure!(
            self.block_index.contains(&best_block_id),
            InitializationError::BestBlockIndexNotFound(best_block_id)
        );
        self.best_block_id = best_block_id;

        log::info!("Chainstate loaded {count} block index entries, best block {best_block_id}");
        Ok(())
    }
}
