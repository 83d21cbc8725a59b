// Copyright (c) 2022 MASSA LABS <info@massa.net>
//! Definition and exports of the process-list consensus types and errors.

mod channels;
mod controller_trait;
mod settings;

pub mod elections;
pub mod error;
pub mod events;
pub mod export;

pub use channels::{ConsensusChannels, OutboundItem};
pub use controller_trait::{ConsensusController, ConsensusManager};
pub use settings::ConsensusConfig;
