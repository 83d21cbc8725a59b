// Copyright (c) 2022 MASSA LABS <info@massa.net>

use crate::server::ServerId;
use crate::signature::Signature;
use quill_hash::Hash;
use quill_time::QuillTime;
use serde::{Deserialize, Serialize};

/// Why a VM was flagged as faulted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FaultReason {
    /// the leader failed to close the minute in time
    EomMissing,
    /// a replacement negotiation is in progress for the leader
    Negotiation,
}

/// Discriminant of a message, used for dispatch and display
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MessageKind {
    /// a leader closes one of its ten minutes
    EndOfMinute,
    /// a leader signs the previous directory block
    DirectoryBlockSignature,
    /// an entry-credit spend reserving a future reveal
    Commit,
    /// the revealed entry matching an earlier commit
    Reveal,
    /// a federation-wide statement that a leader is unresponsive
    FullServerFault,
    /// a request for the listed process-list slots
    MissingMessage,
}

/// Payload of a message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum MessageBody {
    /// minute-close marker
    EndOfMinute {
        /// directory block height
        db_height: u32,
        /// minute being closed, `0..=9`
        minute: u8,
    },
    /// signature over the previous directory block
    DirectoryBlockSignature {
        /// height of the block under construction
        db_height: u32,
        /// key merkle root of the previous directory block
        prev_key_mr: Hash,
        /// leader signature over the previous block
        signature: Signature,
    },
    /// entry-credit spend
    Commit {
        /// hash of the entry being paid for
        entry_hash: Hash,
        /// entry-credit address being debited
        ec_address: Hash,
        /// number of credits spent
        credits: u8,
    },
    /// entry reveal
    Reveal {
        /// chain the entry extends
        chain_id: Hash,
        /// hash of the revealed entry
        entry_hash: Hash,
    },
    /// system-level leader fault statement
    FullServerFault {
        /// directory block height the fault was observed at
        db_height: u32,
        /// VM the faulted leader owns
        vm_index: usize,
        /// ordering height inside the system list
        system_height: u32,
        /// leader being faulted
        faulted_id: ServerId,
        /// audit server nominated to take the slot
        replacement_id: ServerId,
        /// why the leader is considered faulted
        reason: FaultReason,
    },
    /// ask peers for process-list slots we never received
    MissingMessage {
        /// directory block height the gaps are at
        db_height: u32,
        /// VM with the gaps
        vm_index: usize,
        /// every missing slot, plus the first unknown height
        heights: Vec<u32>,
    },
}

impl MessageBody {
    fn digest(&self, out: &mut Vec<u8>) {
        match self {
            MessageBody::EndOfMinute { db_height, minute } => {
                out.push(0);
                out.extend_from_slice(&db_height.to_be_bytes());
                out.push(*minute);
            }
            MessageBody::DirectoryBlockSignature {
                db_height,
                prev_key_mr,
                signature,
            } => {
                out.push(1);
                out.extend_from_slice(&db_height.to_be_bytes());
                out.extend_from_slice(prev_key_mr.to_bytes());
                out.extend_from_slice(signature.to_bytes());
            }
            MessageBody::Commit {
                entry_hash,
                ec_address,
                credits,
            } => {
                out.push(2);
                out.extend_from_slice(entry_hash.to_bytes());
                out.extend_from_slice(ec_address.to_bytes());
                out.push(*credits);
            }
            MessageBody::Reveal {
                chain_id,
                entry_hash,
            } => {
                out.push(3);
                out.extend_from_slice(chain_id.to_bytes());
                out.extend_from_slice(entry_hash.to_bytes());
            }
            MessageBody::FullServerFault {
                db_height,
                vm_index,
                system_height,
                faulted_id,
                replacement_id,
                reason,
            } => {
                out.push(4);
                out.extend_from_slice(&db_height.to_be_bytes());
                out.extend_from_slice(&(*vm_index as u32).to_be_bytes());
                out.extend_from_slice(&system_height.to_be_bytes());
                out.extend_from_slice(faulted_id.to_bytes());
                out.extend_from_slice(replacement_id.to_bytes());
                out.push(match reason {
                    FaultReason::EomMissing => 0,
                    FaultReason::Negotiation => 1,
                });
            }
            MessageBody::MissingMessage {
                db_height,
                vm_index,
                heights,
            } => {
                out.push(5);
                out.extend_from_slice(&db_height.to_be_bytes());
                out.extend_from_slice(&(*vm_index as u32).to_be_bytes());
                for h in heights {
                    out.extend_from_slice(&h.to_be_bytes());
                }
            }
        }
    }

    /// kind discriminant of this payload
    pub fn kind(&self) -> MessageKind {
        match self {
            MessageBody::EndOfMinute { .. } => MessageKind::EndOfMinute,
            MessageBody::DirectoryBlockSignature { .. } => MessageKind::DirectoryBlockSignature,
            MessageBody::Commit { .. } => MessageKind::Commit,
            MessageBody::Reveal { .. } => MessageKind::Reveal,
            MessageBody::FullServerFault { .. } => MessageKind::FullServerFault,
            MessageBody::MissingMessage { .. } => MessageKind::MissingMessage,
        }
    }
}

/// A leader-authored message as seen by the process-list core.
///
/// The three identifying hashes are fixed at construction:
/// * `hash`: content hash; a message and its acknowledgement share it
/// * `msg_hash`: content plus authorship, the dedup key inside one list
/// * `repeat_hash`: the replay-protection key
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    /// message payload
    pub body: MessageBody,
    /// authoring time
    pub timestamp: QuillTime,
    /// identity of the authoring leader
    pub leader_chain_id: ServerId,
    /// minute the message was authored in
    pub minute: u8,
    local: bool,
    peer2peer: bool,
    hash: Hash,
    msg_hash: Hash,
    repeat_hash: Hash,
}

impl Message {
    /// Build a message and fix its identifying hashes.
    pub fn new(body: MessageBody, leader_chain_id: ServerId, minute: u8, timestamp: QuillTime) -> Self {
        let mut content = Vec::with_capacity(128);
        body.digest(&mut content);
        let hash = Hash::compute_from(&content);

        content.extend_from_slice(&timestamp.to_millis().to_be_bytes());
        let repeat_hash = Hash::compute_from(&content);

        content.extend_from_slice(leader_chain_id.to_bytes());
        let msg_hash = Hash::compute_from(&content);

        Message {
            body,
            timestamp,
            leader_chain_id,
            minute,
            local: true,
            peer2peer: false,
            hash,
            msg_hash,
            repeat_hash,
        }
    }

    /// Build a missing-message request for the given slots.
    pub fn missing_message(
        requester: ServerId,
        db_height: u32,
        vm_index: usize,
        heights: Vec<u32>,
        timestamp: QuillTime,
    ) -> Self {
        Message::new(
            MessageBody::MissingMessage {
                db_height,
                vm_index,
                heights,
            },
            requester,
            0,
            timestamp,
        )
    }

    /// kind discriminant
    pub fn kind(&self) -> MessageKind {
        self.body.kind()
    }

    /// content hash, shared with the acknowledgement
    pub fn hash(&self) -> Hash {
        self.hash
    }

    /// content-plus-authorship hash, the in-list dedup key
    pub fn msg_hash(&self) -> Hash {
        self.msg_hash
    }

    /// replay-protection key
    pub fn repeat_hash(&self) -> Hash {
        self.repeat_hash
    }

    /// authoring time
    pub fn timestamp(&self) -> QuillTime {
        self.timestamp
    }

    /// whether the message was produced locally and not yet broadcast
    pub fn is_local(&self) -> bool {
        self.local
    }

    /// flag the message local / network
    pub fn set_local(&mut self, local: bool) {
        self.local = local;
    }

    /// whether this message travels on a direct peer connection only
    pub fn is_peer2peer(&self) -> bool {
        self.peer2peer
    }

    /// flag the message as peer-to-peer only
    pub fn set_peer2peer(&mut self, peer2peer: bool) {
        self.peer2peer = peer2peer;
    }
}

impl std::fmt::Display for Message {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "{:?} leader={} minute={} ts={}",
            self.kind(),
            self.leader_chain_id,
            self.minute,
            self.timestamp
        )
    }
}
