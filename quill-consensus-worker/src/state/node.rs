use quill_hash::Hash;
use quill_models::ack::Ack;
use quill_models::message::Message;
use quill_models::prehash::PreHashMap;
use quill_models::server::ServerId;
use quill_time::QuillTime;

use super::replay::ReplayFilter;

/// Node-wide context shared by every live process list.
///
/// This is the single home for what used to be process-global counters and
/// flags; process lists receive it by reference on every call and never hold
/// on to it.
pub struct NodeContext {
    /// node name, display and multi-node simulations only
    pub name: String,
    /// our own identity chain id
    pub identity_chain_id: ServerId,
    /// instance salt, distinguishes two processes sharing one identity
    pub salt: Hash,
    /// dedup gate over message repeat-hashes
    pub replay: ReplayFilter,
    /// acknowledgements waiting for their message
    pub acks: PreHashMap<Hash, Ack>,
    /// messages waiting for their acknowledgement
    pub holding: PreHashMap<Hash, Message>,
    /// height of the newest block persisted to disk
    pub highest_saved_block: u32,
    /// highest db height seen on any acknowledgement
    pub highest_known_ack: u32,
    /// height the processor touched last
    pub pl_process_height: u32,
    /// height up to which entry blocks are locally complete
    pub entry_db_height_complete: u32,
    /// gate processing on entry-block availability
    pub wait_for_entries: bool,
    /// whether the node is inside an end-of-minute syncing window
    pub syncing: bool,
    /// snapshot of the inbound queue length, refreshed every tick
    pub inbound_queue_len: usize,
    /// set when a serial-hash conflict demands an in-memory rebuild
    pub reset_requested: bool,
    /// total missing-message requests sent
    pub missing_request_ask_cnt: u64,
    /// current instant, refreshed once per tick so one tick observes one time
    pub now: QuillTime,
}

impl NodeContext {
    pub fn new(name: String, identity_chain_id: ServerId, salt: Hash, replay_window: QuillTime) -> Self {
        NodeContext {
            name,
            identity_chain_id,
            salt,
            replay: ReplayFilter::new(replay_window),
            acks: PreHashMap::default(),
            holding: PreHashMap::default(),
            highest_saved_block: 0,
            highest_known_ack: 0,
            pl_process_height: 0,
            entry_db_height_complete: 0,
            wait_for_entries: false,
            syncing: false,
            inbound_queue_len: 0,
            reset_requested: false,
            missing_request_ask_cnt: 0,
            now: QuillTime::ZERO,
        }
    }

    /// The instant everything in the current tick observes
    pub fn get_timestamp(&self) -> QuillTime {
        self.now
    }

    /// Salted check value for an acknowledgement issued at `timestamp`.
    ///
    /// Pure in `(salt, timestamp)`: the issuing instance and any checker
    /// derive the same number, a different instance with the same identity
    /// does not.
    pub fn get_salt(&self, timestamp: QuillTime) -> u32 {
        let mut data = Vec::with_capacity(40);
        data.extend_from_slice(self.salt.to_bytes());
        data.extend_from_slice(&timestamp.to_millis().to_be_bytes());
        let digest = Hash::compute_from(&data);
        let bytes = digest.to_bytes();
        u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])
    }

    /// Request a rebuild of the in-memory consensus state
    pub fn reset(&mut self) {
        self.reset_requested = true;
    }
}
