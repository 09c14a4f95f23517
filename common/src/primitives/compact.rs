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

use parity_scale_codec::{Decode, Encode, Error as CodecError, Input, Output};
use primitive_types::U256;
use serde::{Deserialize, Serialize};

use super::H256;

/// Difficulty target in the compact "bits" representation
#[derive(
    Debug, Copy, Clone, PartialEq, Eq, Hash, Encode, Decode, Serialize, Deserialize,
)]
pub struct Compact(pub u32);

const SIGN_BIT: u32 = 0x0080_0000;
const MANTISSA_MASK: u32 = 0x007f_ffff;

impl Compact {
    /// Expands the compact bits into the full target; `None` for negative or overflowing encodings.
    pub fn to_target(self) -> Option<U256> {
        let size = self.0 >> 24;
        let mut word = self.0 & MANTISSA_MASK;

        if word != 0 && self.0 & SIGN_BIT != 0 {
            return None;
        }

        let overflow = word != 0
            && (size > 34 || (word > 0xff && size > 33) || (word > 0xffff && size > 32));
        if overflow {
            return None;
        }

        let target = if size <= 3 {
            word >>= 8 * (3 - size);
            U256::from(word)
        } else {
            U256::from(word) << (8 * (size - 3))
        };
        Some(target)
    }

    pub fn from_target(target: U256) -> Self {
        let mut size = (target.bits() as u32 + 7) / 8;
        let mut compact = if size <= 3 {
            (target.low_u64() << (8 * (3 - size))) as u32
        } else {
            (target >> (8 * (size - 3))).low_u32()
        };

        // The mantissa would be read as negative; move to the next exponent.
        if compact & SIGN_BIT != 0 {
            compact >>= 8;
            size += 1;
        }

        Compact(compact | (size << 24))
    }
}

/// Whether the given block id, read as a little-endian number, meets the target.
pub fn hash_meets_target(hash: &H256, target: &U256) -> bool {
    U256::from_little_endian(hash.as_bytes()) <= *target
}

/// Accumulated proof of work
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct ChainWork(U256);

impl ChainWork {
    pub const fn zero() -> Self {
        Self(U256::zero())
    }

    pub fn from_u64(v: u64) -> Self {
        Self(U256::from(v))
    }

    /// Expected number of hashes to find a block meeting the given bits
    pub fn from_bits(bits: Compact) -> Option<Self> {
        let target = bits.to_target()?;
        if target.is_zero() {
            return None;
        }
        // 2^256 / (target + 1) == ~target / (target + 1) + 1
        let work = match target.checked_add(U256::one()) {
            Some(denominator) => (!target / denominator) + U256::one(),
            None => U256::one(),
        };
        Some(Self(work))
    }

    pub fn inner(&self) -> U256 {
        self.0
    }

    pub fn checked_add(self, other: Self) -> Option<Self> {
        self.0.checked_add(other.0).map(Self)
    }
}

// Stored as 32 little-endian bytes
impl Encode for ChainWork {
    fn size_hint(&self) -> usize {
        32
    }

    fn encode_to<T: Output + ?Sized>(&self, dest: &mut T) {
        let mut bytes = [0u8; 32];
        self.0.to_little_endian(&mut bytes);
        dest.write(&bytes)
    }
}

impl Decode for ChainWork {
    fn decode<I: Input>(input: &mut I) -> Result<Self, CodecError> {
        let bytes = <[u8; 32]>::decode(input)?;
        Ok(Self(U256::from_little_endian(&bytes)))
    }
}

impl std::fmt::Display for ChainWork {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
