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

use std::marker::PhantomData;

use blake2::{digest::consts::U32, Blake2b, Digest};
use parity_scale_codec::{Decode, Encode, Error as CodecError, Input, Output};

fixed_hash::construct_fixed_hash! {
    pub struct H256(32);
}

impl Encode for H256 {
    fn size_hint(&self) -> usize {
        Self::len_bytes()
    }

    fn encode_to<T: Output + ?Sized>(&self, dest: &mut T) {
        dest.write(self.as_bytes())
    }
}

impl Decode for H256 {
    fn decode<I: Input>(input: &mut I) -> Result<Self, CodecError> {
        <[u8; 32]>::decode(input).map(H256)
    }
}

type DefaultHashAlgo = Blake2b<U32>;

pub fn default_hash<T: AsRef<[u8]>>(data: T) -> H256 {
    let digest = DefaultHashAlgo::digest(data.as_ref());
    H256::from_slice(digest.as_slice())
}

/// Hash of the SCALE encoding of a value
pub fn hash_encoded<T: Encode + ?Sized>(value: &T) -> H256 {
    default_hash(value.encode())
}

static_assertions::assert_eq_size!(H256, [u8; 32]);

/// A typed identifier. The type parameter only tags what the hash identifies.
pub struct Id<T> {
    hash: H256,
    _shadow: PhantomData<fn() -> T>,
}

impl<T> Id<T> {
    pub const fn new(hash: H256) -> Self {
        Self {
            hash,
            _shadow: PhantomData,
        }
    }

    pub fn zero() -> Self {
        Self::new(H256::zero())
    }

    pub fn get(&self) -> H256 {
        self.hash
    }

    pub fn is_zero(&self) -> bool {
        self.hash.is_zero()
    }
}

// Derives would put bounds on T, which is only a tag.
impl<T> Clone for Id<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Id<T> {}

impl<T> PartialEq for Id<T> {
    fn eq(&self, other: &Self) -> bool {
        self.hash == other.hash
    }
}

impl<T> Eq for Id<T> {}

impl<T> PartialOrd for Id<T> {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for Id<T> {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.hash.cmp(&other.hash)
    }
}

impl<T> std::hash::Hash for Id<T> {
    fn hash<Hs: std::hash::Hasher>(&self, state: &mut Hs) {
        self.hash.hash(state)
    }
}

impl<T> From<H256> for Id<T> {
    fn from(hash: H256) -> Self {
        Self::new(hash)
    }
}

impl<T> std::fmt::Debug for Id<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Id<{}>{{{:x}}}", short_type_name::<T>(), self.hash)
    }
}

impl<T> std::fmt::Display for Id<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:x}", self.hash)
    }
}

impl<T> Encode for Id<T> {
    fn size_hint(&self) -> usize {
        self.hash.size_hint()
    }

    fn encode_to<O: Output + ?Sized>(&self, dest: &mut O) {
        self.hash.encode_to(dest)
    }
}

impl<T> Decode for Id<T> {
    fn decode<I: Input>(input: &mut I) -> Result<Self, CodecError> {
        H256::decode(input).map(Self::new)
    }
}

fn short_type_name<T>() -> &'static str {
    let name = std::any::type_name::<T>();
    name.rsplit("::").next().unwrap_or(name)
}

/// a trait for objects that deserve having a unique id with implementations to how to ID them
pub trait Idable {
    type Tag;
    fn get_id(&self) -> Id<Self::Tag>;
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Tag;

    #[test]
    fn hash_is_deterministic() {
        let h1 = default_hash(b"block");
        let h2 = default_hash(b"block");
        let h3 = default_hash(b"blocks");
        assert_eq!(h1, h2);
        assert_ne!(h1, h3);
    }

    #[test]
    fn id_codec_is_the_raw_hash() {
        let id: Id<Tag> = default_hash(b"x").into();
        let encoded = id.encode();
        assert_eq!(encoded.as_slice(), id.get().as_bytes());
        let decoded = Id::<Tag>::decode(&mut encoded.as_slice()).unwrap();
        assert_eq!(decoded, id);
    }

    #[test]
    fn zero_id() {
        assert!(Id::<Tag>::zero().is_zero());
        assert!(!Id::<Tag>::new(default_hash(b"y")).is_zero());
    }
}
