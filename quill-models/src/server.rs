// Copyright (c) 2022 MASSA LABS <info@massa.net>

use crate::error::ModelsError;
use crate::prehash::PreHashed;
use quill_hash::Hash;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Identity chain id of a federated or audit server
#[derive(Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub struct ServerId(pub Hash);

impl PreHashed for ServerId {}

const SERVERID_PREFIX: char = 'S';

impl std::fmt::Display for ServerId {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}{}", SERVERID_PREFIX, self.0.to_bs58_check())
    }
}

impl std::fmt::Debug for ServerId {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self)
    }
}

impl FromStr for ServerId {
    type Err = ModelsError;
    /// ## Example
    /// ```rust
    /// # use quill_hash::Hash;
    /// # use std::str::FromStr;
    /// # use quill_models::server::ServerId;
    /// # let id = ServerId(Hash::compute_from(b"identity"));
    /// let ser = id.to_string();
    /// let res_id = ServerId::from_str(&ser).unwrap();
    /// assert_eq!(id, res_id);
    /// ```
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        match chars.next() {
            Some(prefix) if prefix == SERVERID_PREFIX => {
                let data = chars.collect::<String>();
                Ok(ServerId(
                    Hash::from_bs58_check(&data).map_err(|_| ModelsError::ServerIdParseError)?,
                ))
            }
            _ => Err(ModelsError::ServerIdParseError),
        }
    }
}

impl ServerId {
    /// Return the raw chain id bytes, used for server ordering
    pub fn to_bytes(&self) -> &[u8; quill_hash::HASH_SIZE_BYTES] {
        self.0.to_bytes()
    }
}

/// A federated or audit server record.
///
/// Kept a plain value type on purpose: membership snapshots are taken by
/// deep copy, never by aliasing a shared record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Server {
    /// identity chain id
    pub chain_id: ServerId,
    /// human readable name, display only
    pub name: String,
    /// whether the server currently responds on the network
    pub online: bool,
    /// server nominated to take this slot over, if any
    pub replacement: Option<ServerId>,
}

impl Server {
    /// Create an online server record for the given identity
    pub fn new(chain_id: ServerId) -> Self {
        Server {
            chain_id,
            name: String::new(),
            online: true,
            replacement: None,
        }
    }

    /// flag the server online / offline
    pub fn set_online(&mut self, online: bool) {
        self.online = online;
    }
}

/// Sort servers ascending by chain id bytes.
///
/// Stable and idempotent; membership mutators call this after every change.
pub fn sort_servers(servers: &mut [Server]) {
    servers.sort_by(|a, b| a.chain_id.to_bytes().cmp(b.chain_id.to_bytes()));
}
