// Copyright (c) 2022 MASSA LABS <info@massa.net>
//! Native hash module.
//! Wraps blake3 and exposes the fixed-size digest used as identifier
//! everywhere in the node.
#![warn(missing_docs)]
#![warn(unused_crate_dependencies)]

mod error;
pub use error::QuillHashError;

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Size of a hash in bytes
pub const HASH_SIZE_BYTES: usize = 32;

/// Hash wrapper, the underlying hash type used everywhere
#[derive(Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct Hash([u8; HASH_SIZE_BYTES]);

impl Hash {
    /// Compute a hash from data.
    ///
    /// # Example
    /// ```
    /// # use quill_hash::Hash;
    /// let hash = Hash::compute_from(&"hello world".as_bytes());
    /// ```
    pub fn compute_from(data: &[u8]) -> Self {
        Hash(*blake3::hash(data).as_bytes())
    }

    /// Compute a hash from the concatenation of two hashes.
    /// This is the running serial-hash step: feeding the previous entry's
    /// message hash and the current one yields the expected chain value.
    ///
    /// # Example
    /// ```
    /// # use quill_hash::Hash;
    /// let a = Hash::compute_from(b"a");
    /// let b = Hash::compute_from(b"b");
    /// let chained = Hash::compute_from_tuple(&a, &b);
    /// assert_eq!(chained, Hash::compute_from_tuple(&a, &b));
    /// ```
    pub fn compute_from_tuple(first: &Hash, second: &Hash) -> Self {
        let mut hasher = blake3::Hasher::new();
        hasher.update(first.to_bytes());
        hasher.update(second.to_bytes());
        Hash(*hasher.finalize().as_bytes())
    }

    /// Serialize a Hash using `bs58` encoding with checksum.
    pub fn to_bs58_check(&self) -> String {
        bs58::encode(self.to_bytes()).with_check().into_string()
    }

    /// Serialize a Hash as bytes.
    pub fn to_bytes(&self) -> &[u8; HASH_SIZE_BYTES] {
        &self.0
    }

    /// Deserialize using `bs58` encoding with checksum.
    pub fn from_bs58_check(data: &str) -> Result<Hash, QuillHashError> {
        let decoded_bs58_check = bs58::decode(data)
            .with_check(None)
            .into_vec()
            .map_err(|err| QuillHashError::ParsingError(format!("{}", err)))?;
        Ok(Hash::from_bytes(
            &decoded_bs58_check
                .as_slice()
                .try_into()
                .map_err(|err| QuillHashError::ParsingError(format!("{}", err)))?,
        ))
    }

    /// Deserialize a Hash as bytes.
    pub fn from_bytes(data: &[u8; HASH_SIZE_BYTES]) -> Hash {
        Hash(*data)
    }

    /// The zero hash, used as a placeholder for "no previous block".
    pub const fn zero() -> Hash {
        Hash([0u8; HASH_SIZE_BYTES])
    }
}

impl PartialOrd for Hash {
    fn partial_cmp(&self, other: &Hash) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Hash {
    fn cmp(&self, other: &Hash) -> Ordering {
        self.0.cmp(&other.0)
    }
}

impl std::fmt::Display for Hash {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.to_bs58_check())
    }
}

impl std::fmt::Debug for Hash {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.to_bs58_check())
    }
}
