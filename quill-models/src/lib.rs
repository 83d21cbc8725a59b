// Copyright (c) 2022 MASSA LABS <info@massa.net>
//! All the structures that are used everywhere
#![warn(missing_docs)]
#![warn(unused_crate_dependencies)]

/// acknowledgements issued by leaders
pub mod ack;
/// in-progress block accumulators
pub mod block;
/// node configuration, constants
pub mod config;
/// models error
pub mod error;
/// leader-authored messages
pub mod message;
/// pre-hashed trait, for hash-map optimization
pub mod prehash;
/// federated / audit server records
pub mod server;
/// opaque signature container
pub mod signature;

/// Re-export backing the `quill_trace!` expansion.
pub use serde_json;
/// Re-export backing the `quill_trace!` expansion.
pub use tracing;

/// Structured trace line: an event name plus a json payload of context.
///
/// ```
/// # use quill_models::quill_trace;
/// quill_trace!("consensus.process_list.add_to_process_list", { "db_height": 5 });
/// ```
#[macro_export]
macro_rules! quill_trace {
    ($evt:expr, $params:tt) => {
        $crate::tracing::trace!("quill:{}:{}", $evt, $crate::serde_json::json!($params));
    };
}
