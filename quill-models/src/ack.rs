// Copyright (c) 2022 MASSA LABS <info@massa.net>

use crate::config::SALT_SIZE_BYTES;
use crate::server::ServerId;
use quill_hash::Hash;
use quill_time::QuillTime;
use serde::{Deserialize, Serialize};

/// Ordering token issued by a leader for one message.
///
/// Every field is preserved bit-exact from the wire; the processor relies on
/// `serial_hash` chaining and `(db_height, vm_index, height)` addressing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ack {
    /// index of the VM this entry is ordered into
    pub vm_index: usize,
    /// directory block height the entry belongs to
    pub db_height: u32,
    /// position inside the VM list
    pub height: u32,
    /// running hash chain over the VM's message hashes
    pub serial_hash: Hash,
    /// hash of the acknowledged message
    pub message_hash: Hash,
    /// identity of the leader that issued this acknowledgement
    pub leader_chain_id: ServerId,
    /// instance salt of the issuing leader
    pub salt: [u8; SALT_SIZE_BYTES],
    /// salted check value derived from the issuing instance and `timestamp`
    pub salt_number: u32,
    /// true when this ack answers a request instead of ordering new work
    pub response: bool,
    /// issuing time
    pub timestamp: QuillTime,
    /// minute the entry was ordered in
    pub minute: u8,
    local: bool,
    peer2peer: bool,
}

impl Ack {
    /// Build an acknowledgement; starts flagged local until admitted.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        vm_index: usize,
        db_height: u32,
        height: u32,
        serial_hash: Hash,
        message_hash: Hash,
        leader_chain_id: ServerId,
        salt: [u8; SALT_SIZE_BYTES],
        salt_number: u32,
        timestamp: QuillTime,
        minute: u8,
    ) -> Self {
        Ack {
            vm_index,
            db_height,
            height,
            serial_hash,
            message_hash,
            leader_chain_id,
            salt,
            salt_number,
            response: false,
            timestamp,
            minute,
            local: true,
            peer2peer: false,
        }
    }

    /// The ack and the message it acknowledges key to the same hash
    pub fn hash(&self) -> Hash {
        self.message_hash
    }

    /// whether this ack was produced locally and not yet broadcast
    pub fn is_local(&self) -> bool {
        self.local
    }

    /// flag the ack local / network
    pub fn set_local(&mut self, local: bool) {
        self.local = local;
    }

    /// whether this ack travels on a direct peer connection only
    pub fn is_peer2peer(&self) -> bool {
        self.peer2peer
    }

    /// flag the ack as peer-to-peer only
    pub fn set_peer2peer(&mut self, peer2peer: bool) {
        self.peer2peer = peer2peer;
    }
}
