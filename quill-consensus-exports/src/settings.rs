use quill_models::config::{
    CHANNEL_SIZE, FAULT_TIMEOUT, INBOUND_QUEUE_MEDIUM_THRESHOLD, MISSING_MSG_ASK_INTERVAL,
    PROCESS_IDLE_ASK_DELAY, REPLAY_WINDOW, STALE_SELF_ACK_TIMEOUT_SECS, TICK_INTERVAL,
};
use quill_time::QuillTime;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ConsensusConfig {
    /// Minimum delay between two missing-message asks for one VM slot
    pub missing_request_interval: QuillTime,
    /// Idle time after which a caught-up VM is asked for its next message
    pub process_idle_ask_delay: QuillTime,
    /// Own acknowledgements older than this are dropped (seconds)
    pub stale_self_ack_timeout_secs: u64,
    /// Fault age past which the elections subsystem is notified
    pub fault_timeout: QuillTime,
    /// Inbound queue length above which repeat asks are deferred
    pub inbound_queue_medium: usize,
    /// Width of the replay-protection timestamp window
    pub replay_window: QuillTime,
    /// Cadence of the worker loop
    pub tick_interval: QuillTime,
    /// channel size
    pub channel_size: usize,
    /// Route every entry to VM 0, used by single-leader test networks
    pub one_leader: bool,
}

impl Default for ConsensusConfig {
    fn default() -> Self {
        ConsensusConfig {
            missing_request_interval: MISSING_MSG_ASK_INTERVAL,
            process_idle_ask_delay: PROCESS_IDLE_ASK_DELAY,
            stale_self_ack_timeout_secs: STALE_SELF_ACK_TIMEOUT_SECS,
            fault_timeout: FAULT_TIMEOUT,
            inbound_queue_medium: INBOUND_QUEUE_MEDIUM_THRESHOLD,
            replay_window: REPLAY_WINDOW,
            tick_interval: TICK_INTERVAL,
            channel_size: CHANNEL_SIZE,
            one_leader: false,
        }
    }
}
