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

use rand::SeedableRng;
use rand_chacha::ChaChaRng;

pub use rand::{seq::SliceRandom, Rng};

/// Seed of a test PRNG. Printed on use so that a failing case can be replayed.
#[derive(Debug, Clone, Copy)]
pub struct Seed(pub u64);

impl Seed {
    pub fn from_entropy() -> Self {
        Seed(rand::thread_rng().gen::<u64>())
    }

    pub fn from_u64(v: u64) -> Self {
        Seed(v)
    }
}

#[must_use]
pub fn make_seedable_rng(seed: Seed) -> impl Rng {
    ChaChaRng::seed_from_u64(seed.0)
}

/// Makes a PRNG for tests and prints where and with which seed, e.g.
///
/// `chainstate/src/detail/block_index_map.rs:312 Using seed '4862969352335513650' for the PRNG`
///
/// Replaying a failure is a matter of passing `Seed::from_u64(4862969352335513650)` instead of
/// `Seed::from_entropy()`.
///
/// ```
/// use test_utils::{make_seedable_rng, random::*};
/// let mut rng = make_seedable_rng!(Seed::from_u64(42));
/// let _: u32 = rng.gen();
/// ```
#[macro_export]
macro_rules! make_seedable_rng {
    ($seed:expr) => {{
        let seed = $seed;
        println!("{}:{} Using seed '{}' for the PRNG", file!(), line!(), seed.0);
        $crate::random::make_seedable_rng(seed)
    }};
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_sequence() {
        let mut a = make_seedable_rng(Seed::from_u64(7));
        let mut b = make_seedable_rng(Seed::from_u64(7));
        let xs: Vec<u64> = (0..8).map(|_| a.gen()).collect();
        let ys: Vec<u64> = (0..8).map(|_| b.gen()).collect();
        assert_eq!(xs, ys);
    }

    #[test]
    fn indices_are_distinct() {
        let mut rng = make_seedable_rng!(Seed::from_entropy());
        let mut picked = crate::random_indices(&mut rng, 10, 4);
        picked.sort();
        picked.dedup();
        assert_eq!(picked.len(), 4);
        assert!(picked.iter().all(|i| *i < 10));
    }
}
