use std::collections::HashMap;

use quill_models::ack::Ack;
use quill_models::message::{FaultReason, Message};
use quill_time::QuillTime;

/// One leader's ordered message queue inside a process list.
///
/// `list` and `list_ack` always have the same length; a slot is either empty
/// in both or filled in both. `height` counts the processed prefix and never
/// regresses within one block.
pub struct Vm {
    /// admitted messages, sparse until slots fill in
    pub list: Vec<Option<Message>>,
    /// acknowledgements, parallel to `list`
    pub list_ack: Vec<Option<Ack>>,
    /// number of entries already processed
    pub height: usize,
    /// last minute the owning leader has closed, `0..=10`
    pub leader_minute: usize,
    /// whether the VM reached the current end-of-minute
    pub synced: bool,
    /// whether the owning leader signed the previous block
    pub signed: bool,
    /// first instant the VM was observed faulted; zero while healthy
    pub when_faulted: QuillTime,
    /// why the VM is faulted, if it is
    pub fault_flag: Option<FaultReason>,
    /// whether the current fault episode was reported to elections
    pub fault_notified: bool,
    /// slots already covered by an outstanding missing-message request
    pub mm_requests: HashMap<usize, bool>,
    /// when the last missing-message request went out
    pub mm_ask_time: QuillTime,
    /// last instant the processor made progress on this VM
    pub process_time: QuillTime,
    /// cleared on any activity
    pub heart_beat: u64,
}

impl Vm {
    pub fn new() -> Self {
        Vm {
            list: Vec::new(),
            list_ack: Vec::new(),
            height: 0,
            leader_minute: 0,
            synced: true,
            signed: false,
            when_faulted: QuillTime::ZERO,
            fault_flag: None,
            fault_notified: false,
            mm_requests: HashMap::new(),
            mm_ask_time: QuillTime::ZERO,
            process_time: QuillTime::ZERO,
            heart_beat: 0,
        }
    }

    /// Whether the processed prefix covers everything admitted so far
    pub fn caught_up(&self) -> bool {
        self.height == self.list.len()
    }

    /// Grow both lists with empty slots until `height` is addressable
    pub fn grow_to(&mut self, height: usize) {
        while self.list.len() <= height {
            self.list.push(None);
            self.list_ack.push(None);
        }
    }
}

impl Default for Vm {
    fn default() -> Self {
        Vm::new()
    }
}
