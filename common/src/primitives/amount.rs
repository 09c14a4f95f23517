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

// use only unsigned types
// if you need a signed amount, we should create a separate type for it and implement proper conversion

use parity_scale_codec::{Decode, Encode};
use serde::{Deserialize, Serialize};

pub type UnsignedIntType = u128;

/// An unsigned fixed-point type for amounts
/// The smallest unit of count is called an atom
#[derive(
    Debug,
    Copy,
    Clone,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Default,
    Encode,
    Decode,
    Serialize,
    Deserialize,
    derive_more::Display,
)]
#[must_use]
pub struct Amount {
    #[codec(compact)]
    atoms: UnsignedIntType,
}

impl Amount {
    pub const MAX: Self = Self::from_atoms(UnsignedIntType::MAX);
    pub const ZERO: Self = Self::from_atoms(0);

    pub const fn from_atoms(v: UnsignedIntType) -> Self {
        Amount { atoms: v }
    }

    pub const fn into_atoms(&self) -> UnsignedIntType {
        self.atoms
    }
}

impl std::ops::Add for Amount {
    type Output = Option<Self>;

    fn add(self, other: Self) -> Option<Self> {
        self.atoms.checked_add(other.atoms).map(|n| Amount { atoms: n })
    }
}

impl std::ops::Sub for Amount {
    type Output = Option<Self>;

    fn sub(self, other: Self) -> Option<Self> {
        self.atoms.checked_sub(other.atoms).map(|n| Amount { atoms: n })
    }
}

impl std::ops::Mul<UnsignedIntType> for Amount {
    type Output = Option<Self>;

    fn mul(self, other: UnsignedIntType) -> Option<Self> {
        self.atoms.checked_mul(other).map(|n| Amount { atoms: n })
    }
}

impl std::ops::Div<UnsignedIntType> for Amount {
    type Output = Option<Amount>;

    fn div(self, other: UnsignedIntType) -> Option<Amount> {
        self.atoms.checked_div(other).map(|n| Amount { atoms: n })
    }
}

/// Sum of amounts, `None` on overflow
pub fn sum_amounts<I: IntoIterator<Item = Amount>>(iter: I) -> Option<Amount> {
    iter.into_iter().try_fold(Amount::ZERO, |acc, a| acc + a)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn checked_ops() {
        let a = Amount::from_atoms(10);
        let b = Amount::from_atoms(3);
        assert_eq!(a + b, Some(Amount::from_atoms(13)));
        assert_eq!(b - a, None);
        assert_eq!(a * 3, Some(Amount::from_atoms(30)));
        assert_eq!(a / 0, None);
        assert_eq!(Amount::MAX + Amount::from_atoms(1), None);
    }

    #[test]
    fn sum_overflow() {
        assert_eq!(
            sum_amounts([Amount::from_atoms(1), Amount::from_atoms(2)]),
            Some(Amount::from_atoms(3))
        );
        assert_eq!(sum_amounts([Amount::MAX, Amount::from_atoms(1)]), None);
        assert_eq!(sum_amounts(Vec::new()), Some(Amount::ZERO));
    }
}
