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
use serde::{Deserialize, Serialize};

#[derive(
    Debug,
    Copy,
    Clone,
    PartialOrd,
    Ord,
    PartialEq,
    Eq,
    Hash,
    Encode,
    Decode,
    Serialize,
    Deserialize,
    derive_more::Display,
)]
pub struct BlockHeight(u64);

impl BlockHeight {
    pub const fn new(height: u64) -> BlockHeight {
        BlockHeight(height)
    }

    pub const fn zero() -> BlockHeight {
        BlockHeight(0)
    }

    pub const fn one() -> BlockHeight {
        BlockHeight(1)
    }

    pub const fn max() -> BlockHeight {
        BlockHeight(u64::MAX)
    }

    pub const fn into_int(self) -> u64 {
        self.0
    }

    pub fn next_height(&self) -> BlockHeight {
        BlockHeight(self.0.checked_add(1).expect("Block height overflow"))
    }

    pub fn prev_height(&self) -> Option<BlockHeight> {
        self.0.checked_sub(1).map(BlockHeight)
    }

    pub fn is_genesis(&self) -> bool {
        self.0 == 0
    }
}

impl From<u64> for BlockHeight {
    fn from(height: u64) -> Self {
        Self(height)
    }
}

impl From<BlockHeight> for u64 {
    fn from(height: BlockHeight) -> Self {
        height.0
    }
}

/// Signed distance between two heights.
#[derive(
    Debug,
    Copy,
    Clone,
    PartialOrd,
    Ord,
    PartialEq,
    Eq,
    Encode,
    Decode,
    Serialize,
    Deserialize,
    derive_more::Display,
)]
pub struct BlockDistance(i64);

impl BlockDistance {
    pub const fn new(distance: i64) -> Self {
        Self(distance)
    }

    pub const fn zero() -> Self {
        Self(0)
    }

    pub const fn into_int(self) -> i64 {
        self.0
    }
}

impl From<i64> for BlockDistance {
    fn from(distance: i64) -> Self {
        Self(distance)
    }
}

impl std::ops::Sub<BlockHeight> for BlockHeight {
    type Output = Option<BlockDistance>;

    fn sub(self, other: BlockHeight) -> Option<BlockDistance> {
        let lhs: i64 = self.0.try_into().ok()?;
        let rhs: i64 = other.0.try_into().ok()?;
        lhs.checked_sub(rhs).map(BlockDistance)
    }
}

impl std::ops::Add<BlockDistance> for BlockHeight {
    type Output = Option<BlockHeight>;

    fn add(self, other: BlockDistance) -> Option<BlockHeight> {
        let lhs: i64 = self.0.try_into().ok()?;
        let sum = lhs.checked_add(other.0)?;
        sum.try_into().ok().map(BlockHeight)
    }
}

impl std::ops::Sub<BlockDistance> for BlockHeight {
    type Output = Option<BlockHeight>;

    fn sub(self, other: BlockDistance) -> Option<BlockHeight> {
        self + BlockDistance(other.0.checked_neg()?)
    }
}
