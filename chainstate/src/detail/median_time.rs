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
use common::chain::BlockTimestamp;
use itertools::Itertools;

use super::block_index_map::BlockIndexMap;

const MEDIAN_TIME_SPAN: usize = 11;

/// Median timestamp of `starting_block` and up to ten of its ancestors
#[must_use]
pub fn calculate_median_time_past(
    block_index: &BlockIndexMap,
    starting_block: &BlockIndex,
) -> BlockTimestamp {
    let time_values = std::iter::once(starting_block)
        .chain(block_index.ancestors(starting_block.block_id(), MEDIAN_TIME_SPAN - 1))
        .map(|bi| bi.block_timestamp())
        .sorted()
        .collect::<Vec<_>>();

    time_values[time_values.len() / 2]
}

#[cfg(test)]
mod test {
    use super::*;
    use chainstate_types::BlockStatus;
    use common::{
        chain::{config::create_regtest, Block, BlockHeader},
        primitives::{ChainWork, Id, Idable},
    };
    use rstest::rstest;
    use test_utils::random::{make_seedable_rng, Rng, Seed};

    // Chain of blocks with the given timestamps on top of genesis, returning the last index
    fn chain_with_times(times: &[u64]) -> (BlockIndexMap, BlockIndex) {
        let genesis = create_regtest().genesis_block().clone();
        let mut map = BlockIndexMap::new();
        let genesis_index = BlockIndex::new(&genesis, ChainWork::zero(), 0, BlockStatus::Valid);
        map.insert(genesis_index.clone()).unwrap();

        let mut last = genesis_index;
        for time in times {
            let header = BlockHeader {
                prev_block_id: *last.block_id(),
                height: last.block_height().next_height(),
                timestamp: BlockTimestamp::from_int_seconds(*time),
                ..genesis.header().clone()
            };
            let block = Block::new(header, genesis.transactions().to_vec());
            let index =
                BlockIndex::new(&block, ChainWork::zero(), map.next_sequence(), BlockStatus::Valid);
            map.insert(index.clone()).unwrap();
            assert_eq!(index.block_id(), &block.get_id());
            last = index;
        }
        (map, last)
    }

    #[test]
    fn genesis_only() {
        let (map, genesis) = chain_with_times(&[]);
        assert_eq!(
            calculate_median_time_past(&map, &genesis),
            genesis.block_timestamp()
        );
        assert!(map.lookup(&Id::zero()).is_none());
    }

    #[test]
    fn short_chain_uses_all_blocks() {
        let genesis_time = create_regtest().genesis_block().timestamp().as_int_seconds();
        let (map, tip) = chain_with_times(&[genesis_time + 10, genesis_time + 20]);
        // genesis, +10, +20
        assert_eq!(
            calculate_median_time_past(&map, &tip),
            BlockTimestamp::from_int_seconds(genesis_time + 10)
        );
    }

    #[test]
    fn span_is_eleven_blocks() {
        let base = create_regtest().genesis_block().timestamp().as_int_seconds();
        let times: Vec<u64> = (1..=20).map(|i| base + i * 100).collect();
        let (map, tip) = chain_with_times(&times);
        // Blocks 10..=20 are considered, block 15 is the median
        assert_eq!(
            calculate_median_time_past(&map, &tip),
            BlockTimestamp::from_int_seconds(base + 1500)
        );
    }

    #[rstest]
    #[case(Seed::from_entropy())]
    fn unordered_timestamps(#[case] seed: Seed) {
        let mut rng = make_seedable_rng(seed);
        let base = create_regtest().genesis_block().timestamp().as_int_seconds();
        let times: Vec<u64> = (0..rng.gen_range(11..40)).map(|_| base + rng.gen_range(0..10_000)).collect();
        let (map, tip) = chain_with_times(&times);

        let mut last_eleven = times[times.len() - MEDIAN_TIME_SPAN..].to_vec();
        last_eleven.sort();
        assert_eq!(
            calculate_median_time_past(&map, &tip),
            BlockTimestamp::from_int_seconds(last_eleven[MEDIAN_TIME_SPAN / 2])
        );
    }
}
