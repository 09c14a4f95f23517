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

/// Validation state of an indexed block.
///
/// Nodes start `Unknown`, pass through `ValidateInProgress` and end up `Valid` or `Invalid`.
/// `InvalidAncestor` is assigned to every descendant of an `Invalid` node and is permanent.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Hash, Encode, Decode)]
pub enum BlockStatus {
    #[codec(index = 0)]
    Unknown,
    #[codec(index = 1)]
    ValidateInProgress,
    #[codec(index = 2)]
    Valid,
    #[codec(index = 3)]
    Invalid,
    #[codec(index = 4)]
    InvalidAncestor,
}

impl BlockStatus {
    pub fn is_valid(&self) -> bool {
        *self == BlockStatus::Valid
    }

    /// Failed validation itself or descends from a block that did
    pub fn is_invalid(&self) -> bool {
        matches!(self, BlockStatus::Invalid | BlockStatus::InvalidAncestor)
    }

    /// Validation has reached a verdict
    pub fn is_final(&self) -> bool {
        self.is_valid() || self.is_invalid()
    }
}

impl std::fmt::Display for BlockStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            BlockStatus::Unknown => "unknown",
            BlockStatus::ValidateInProgress => "validate-in-progress",
            BlockStatus::Valid => "valid",
            BlockStatus::Invalid => "invalid",
            BlockStatus::InvalidAncestor => "invalid-ancestor",
        };
        f.write_str(s)
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(BlockStatus::Unknown, false, false)]
    #[case(BlockStatus::ValidateInProgress, false, false)]
    #[case(BlockStatus::Valid, true, false)]
    #[case(BlockStatus::Invalid, false, true)]
    #[case(BlockStatus::InvalidAncestor, false, true)]
    fn predicates(#[case] status: BlockStatus, #[case] valid: bool, #[case] invalid: bool) {
        assert_eq!(status.is_valid(), valid);
        assert_eq!(status.is_invalid(), invalid);
        assert_eq!(status.is_final(), valid || invalid);
    }

    #[test]
    fn encoding_is_stable() {
        assert_eq!(BlockStatus::Valid.encode(), vec![2]);
        assert_eq!(
            BlockStatus::decode(&mut [4u8].as_slice()),
            Ok(BlockStatus::InvalidAncestor)
        );
    }
}
