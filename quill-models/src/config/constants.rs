//! DEFAULT VALUES USED TO INITIALIZE DIVERS CONFIGURATIONS STRUCTURES
//!
//! # Default hard-coded
//!
//! Each crate may contain a `settings.rs` or a `config.rs`; the `Default`
//! implementation of each object takes its values from the following file.
//!
//! These values are the hard-coded values that make sense to never be modified
//! by a user. Generally, these values are passed with dependency injection in a
//! `cfg` parameter for each worker, which is convenient for unit tests.

use quill_time::QuillTime;

/// Number of virtual-machine slots allocated per process list.
/// Only the first `fed_servers.len()` are active.
pub const MAX_VMS: usize = 65;

/// Number of intra-block intervals; each one owns a row of the minute map
pub const MINUTES_PER_BLOCK: usize = 10;

/// Multiplier applied to the block height when seeding the minute map rotation
pub const SERVER_MAP_HEIGHT_MULTIPLIER: u32 = 131;

/// channel size
pub const CHANNEL_SIZE: usize = 1024;

/// Minimum delay between two missing-message requests for the same VM slot
pub const MISSING_MSG_ASK_INTERVAL: QuillTime = QuillTime::from_millis(2000);

/// A VM that made no progress for this long gets asked for its next message
pub const PROCESS_IDLE_ASK_DELAY: QuillTime = QuillTime::from_millis(2000);

/// Acknowledgements we authored ourselves are dropped past this age (seconds)
pub const STALE_SELF_ACK_TIMEOUT_SECS: u64 = 120;

/// A faulted VM is reported to the elections subsystem after this long
pub const FAULT_TIMEOUT: QuillTime = QuillTime::from_millis(20_000);

/// Inbound queue length above which repeat missing-message asks are deferred
pub const INBOUND_QUEUE_MEDIUM_THRESHOLD: usize = 1000;

/// Width of the replay-protection timestamp window
pub const REPLAY_WINDOW: QuillTime = QuillTime::from_millis(3_600_000);

/// Cadence of the worker loop driving the processors
pub const TICK_INTERVAL: QuillTime = QuillTime::from_millis(100);

/// Size of a raw signature in bytes
pub const SIGNATURE_SIZE_BYTES: usize = 64;

/// Size of the acknowledgement salt in bytes
pub const SALT_SIZE_BYTES: usize = 8;
