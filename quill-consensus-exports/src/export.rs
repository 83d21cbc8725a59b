//! Read-only snapshot of a process list, for tooling and the API layer.

use quill_models::server::Server;
use serde::{Deserialize, Serialize};

/// Progress of one VM inside an exported process list
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VmExport {
    /// entries already processed
    pub height: usize,
    /// entries admitted so far
    pub list_len: usize,
    /// last minute the owning leader has closed
    pub leader_minute: usize,
    /// whether the VM reached the current end-of-minute
    pub synced: bool,
    /// whether the owning leader signed the previous block
    pub signed: bool,
}

/// Snapshot of a process list at one height
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessListExport {
    /// directory block height
    pub db_height: u32,
    /// federated servers, ascending by chain id
    pub fed_servers: Vec<Server>,
    /// audit servers, ascending by chain id
    pub audit_servers: Vec<Server>,
    /// one entry per active VM
    pub vms: Vec<VmExport>,
    /// directory-block signatures collected so far
    pub db_signature_count: usize,
    /// every active VM closed minute 10 and processed its whole list
    pub complete: bool,
}
