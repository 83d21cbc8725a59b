// Copyright (c) 2022 MASSA LABS <info@massa.net>

use std::collections::HashMap;
use std::hash::{BuildHasherDefault, Hasher};
use std::marker::PhantomData;

/// Marker for key types that already are uniformly distributed digests.
///
/// Every look-aside map in a process list is keyed by a blake3 output
/// (message hashes, entry hashes, identity chain ids), so bucket selection
/// can truncate the key instead of hashing a hash again.
pub trait PreHashed {}

impl PreHashed for quill_hash::Hash {}

/// `Hasher` that truncates a digest key to its trailing eight bytes.
pub struct DigestHasher<T: PreHashed> {
    state: u64,
    marker: PhantomData<T>,
}

impl<T: PreHashed> Default for DigestHasher<T> {
    fn default() -> Self {
        DigestHasher {
            state: 0,
            marker: PhantomData,
        }
    }
}

impl<T: PreHashed> Hasher for DigestHasher<T> {
    #[inline]
    fn finish(&self) -> u64 {
        self.state
    }

    /// Keeps the tail of the key; a key shorter than eight bytes is padded
    /// with zeroes rather than rejected.
    #[inline]
    fn write(&mut self, bytes: &[u8]) {
        let take = bytes.len().min(8);
        let mut tail = [0u8; 8];
        tail[..take].copy_from_slice(&bytes[bytes.len() - take..]);
        self.state = u64::from_le_bytes(tail);
    }
}

/// `BuildHasherDefault` specialization for [`DigestHasher`]
pub type BuildDigestHasher<T> = BuildHasherDefault<DigestHasher<T>>;

/// `HashMap` keyed by pre-hashed digests, skipping the default hasher
pub type PreHashMap<K, V> = HashMap<K, V, BuildDigestHasher<K>>;

#[cfg(test)]
mod tests {
    use super::*;
    use quill_hash::Hash;

    #[test]
    fn test_digest_keys_round_trip() {
        let mut map: PreHashMap<Hash, u32> = PreHashMap::default();
        for seed in 0..64u8 {
            map.insert(Hash::compute_from(&[seed]), seed as u32);
        }
        for seed in 0..64u8 {
            assert_eq!(map.get(&Hash::compute_from(&[seed])), Some(&(seed as u32)));
        }
        assert_eq!(map.len(), 64);
    }

    #[test]
    fn test_short_keys_are_padded() {
        let mut hasher = DigestHasher::<Hash>::default();
        hasher.write(&[1, 2, 3]);
        assert_eq!(hasher.finish(), u64::from_le_bytes([1, 2, 3, 0, 0, 0, 0, 0]));
    }
}
