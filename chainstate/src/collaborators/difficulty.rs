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

use chainstate_types::BlockIndex;
use common::{
    chain::{BlockTimestamp, ChainConfig},
    primitives::Compact,
};

/// Source of the difficulty a block built on a given parent must declare
pub trait DifficultyOracle: Send + Sync {
    fn required_bits(
        &self,
        chain_config: &ChainConfig,
        parent: &BlockIndex,
        timestamp: BlockTimestamp,
    ) -> Compact;
}

/// No retargeting: every block mines at the proof-of-work limit
#[derive(Debug, Clone, Copy, Default)]
pub struct ConstantDifficulty;

impl DifficultyOracle for ConstantDifficulty {
    fn required_bits(
        &self,
        chain_config: &ChainConfig,
        _parent: &BlockIndex,
        _timestamp: BlockTimestamp,
    ) -> Compact {
        chain_config.pow_limit()
    }
}
