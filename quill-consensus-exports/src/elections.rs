//! Internal messages handed to the elections subsystem.

use quill_models::message::FaultReason;
use quill_models::server::ServerId;

/// Membership and liveness notifications consumed by the elections queue.
///
/// Each carries the emitting node's name so a simulator running several
/// nodes in one process can tell the senders apart.
#[derive(Debug, Clone)]
pub enum ElectionsMessage {
    /// a server joined the federated set
    AddLeader {
        /// emitting node
        node: String,
        /// height the membership change applies at
        db_height: u32,
        /// identity added
        chain_id: ServerId,
    },
    /// a server joined the audit set
    AddAudit {
        /// emitting node
        node: String,
        /// height the membership change applies at
        db_height: u32,
        /// identity added
        chain_id: ServerId,
    },
    /// a server left the federated set
    RemoveLeader {
        /// emitting node
        node: String,
        /// height the membership change applies at
        db_height: u32,
        /// identity removed
        chain_id: ServerId,
    },
    /// a server left the audit set
    RemoveAudit {
        /// emitting node
        node: String,
        /// height the membership change applies at
        db_height: u32,
        /// identity removed
        chain_id: ServerId,
    },
    /// a leader's fault timer expired, an election is needed
    Fault {
        /// emitting node
        node: String,
        /// height the fault was observed at
        db_height: u32,
        /// VM owned by the unresponsive leader
        vm_index: usize,
        /// identity of the unresponsive leader
        chain_id: ServerId,
        /// why the leader is considered faulted
        reason: FaultReason,
    },
}
