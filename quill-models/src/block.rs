// Copyright (c) 2022 MASSA LABS <info@massa.net>

use crate::error::ModelsError;
use crate::server::ServerId;
use crate::signature::Signature;
use quill_hash::Hash;
use serde::{Deserialize, Serialize};

/// One leader's signature over the previous directory block, collected while
/// the current block is under construction
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DbSig {
    /// signing leader
    pub chain_id: ServerId,
    /// signature over the previous block
    pub signature: Signature,
    /// minute-0 VM index of the signing leader
    pub vm_index: usize,
}

/// One chain reference inside a directory block
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirectoryEntry {
    /// chain the referenced block belongs to
    pub chain_id: Hash,
    /// key merkle root of the referenced block
    pub key_mr: Hash,
}

/// The directory block under construction for one height
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirectoryBlock {
    /// directory block height
    pub height: u32,
    /// key merkle root of the previous directory block
    pub prev_key_mr: Hash,
    entries: Vec<DirectoryEntry>,
}

impl DirectoryBlock {
    /// Open the accumulator for the height following `previous`
    pub fn new(previous: Option<&DirectoryBlock>) -> Self {
        match previous {
            Some(prev) => DirectoryBlock {
                height: prev.height.saturating_add(1),
                prev_key_mr: prev.key_mr(),
                entries: Vec::new(),
            },
            None => DirectoryBlock {
                height: 0,
                prev_key_mr: Hash::zero(),
                entries: Vec::new(),
            },
        }
    }

    /// Reference a chain block from this directory block
    pub fn add_entry(&mut self, chain_id: Hash, key_mr: Hash) {
        self.entries.push(DirectoryEntry { chain_id, key_mr });
    }

    /// entries referenced so far
    pub fn entries(&self) -> &[DirectoryEntry] {
        &self.entries
    }

    /// Key merkle root over the current content
    pub fn key_mr(&self) -> Hash {
        let mut data = Vec::with_capacity(8 + 64 * self.entries.len());
        data.extend_from_slice(&self.height.to_be_bytes());
        data.extend_from_slice(self.prev_key_mr.to_bytes());
        for entry in &self.entries {
            data.extend_from_slice(entry.chain_id.to_bytes());
            data.extend_from_slice(entry.key_mr.to_bytes());
        }
        Hash::compute_from(&data)
    }
}

/// The admin block under construction for one height.
///
/// Only the back-reference chain and the raw entry hashes are tracked here;
/// composing the typed entry catalogue is the saver's business.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminBlock {
    /// directory block height this admin block belongs to
    pub height: u32,
    /// hash of the previous admin block
    pub prev_back_ref: Hash,
    entries: Vec<Hash>,
}

impl AdminBlock {
    /// Open the accumulator for the height following `previous`
    pub fn new(previous: Option<&AdminBlock>) -> Self {
        match previous {
            Some(prev) => AdminBlock {
                height: prev.height.saturating_add(1),
                prev_back_ref: prev.back_reference_hash(),
                entries: Vec::new(),
            },
            None => AdminBlock {
                height: 0,
                prev_back_ref: Hash::zero(),
                entries: Vec::new(),
            },
        }
    }

    /// Stage an admin entry by hash
    pub fn add_entry(&mut self, entry: Hash) {
        self.entries.push(entry);
    }

    /// entries staged so far
    pub fn entries(&self) -> &[Hash] {
        &self.entries
    }

    /// Hash the next admin block chains back to
    pub fn back_reference_hash(&self) -> Hash {
        let mut data = Vec::with_capacity(8 + 32 * self.entries.len());
        data.extend_from_slice(&self.height.to_be_bytes());
        data.extend_from_slice(self.prev_back_ref.to_bytes());
        for entry in &self.entries {
            data.extend_from_slice(entry.to_bytes());
        }
        Hash::compute_from(&data)
    }
}

/// One element of the entry-credit block body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum EcEntry {
    /// closes a minute inside the block
    MinuteMarker(u8),
    /// an entry-credit spend
    Commit {
        /// hash of the entry paid for
        entry_hash: Hash,
        /// number of credits spent
        credits: u8,
    },
}

/// The entry-credit block under construction for one height
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntryCreditBlock {
    /// directory block height this block belongs to
    pub height: u32,
    /// header hash of the previous entry-credit block
    pub prev_header_hash: Hash,
    body: Vec<EcEntry>,
}

impl EntryCreditBlock {
    /// Open the accumulator following `previous`.
    pub fn next(previous: Option<&EntryCreditBlock>) -> Result<Self, ModelsError> {
        match previous {
            Some(prev) => Ok(EntryCreditBlock {
                height: prev
                    .height
                    .checked_add(1)
                    .ok_or(ModelsError::BlockHeightOverflowError)?,
                prev_header_hash: prev.header_hash(),
                body: Vec::new(),
            }),
            None => Ok(EntryCreditBlock {
                height: 0,
                prev_header_hash: Hash::zero(),
                body: Vec::new(),
            }),
        }
    }

    /// Append a body element
    pub fn push(&mut self, entry: EcEntry) {
        self.body.push(entry);
    }

    /// body elements accumulated so far
    pub fn body(&self) -> &[EcEntry] {
        &self.body
    }

    /// Hash the next entry-credit block chains back to
    pub fn header_hash(&self) -> Hash {
        let mut data = Vec::with_capacity(8 + 34 * self.body.len());
        data.extend_from_slice(&self.height.to_be_bytes());
        data.extend_from_slice(self.prev_header_hash.to_bytes());
        for entry in &self.body {
            match entry {
                EcEntry::MinuteMarker(minute) => {
                    data.push(0);
                    data.push(*minute);
                }
                EcEntry::Commit {
                    entry_hash,
                    credits,
                } => {
                    data.push(1);
                    data.extend_from_slice(entry_hash.to_bytes());
                    data.push(*credits);
                }
            }
        }
        Hash::compute_from(&data)
    }
}
