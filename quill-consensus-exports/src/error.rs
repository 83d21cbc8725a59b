// Copyright (c) 2022 MASSA LABS <info@massa.net>
use displaydoc::Display;
use quill_models::error::ModelsError;
use thiserror::Error;

/// Consensus
pub type ConsensusResult<T, E = ConsensusError> = core::result::Result<T, E>;

#[non_exhaustive]
#[derive(Display, Error, Debug)]
pub enum ConsensusError {
    /// models error: {0}
    ModelsError(#[from] ModelsError),
    /// config error: {0}
    ConfigError(String),
    /// Time error {0}
    TimeError(#[from] quill_time::TimeError),
    /// there was an inconsistency between containers {0}
    ContainerInconsistency(String),
    /// Send  channel error : {0}
    SendChannelError(String),
    /// Receive  channel error : {0}
    ReceiveChannelError(String),
}
