// Copyright (c) 2022 MASSA LABS <info@massa.net>

use displaydoc::Display;
use thiserror::Error;

/// models error
pub type ModelsResult<T, E = ModelsError> = core::result::Result<T, E>;

/// models error
#[non_exhaustive]
#[derive(Display, Error, Debug, Clone)]
pub enum ModelsError {
    /// hashing error
    HashError,
    /// `QuillHash` error: {0}
    QuillHashError(#[from] quill_hash::QuillHashError),
    /// Time error {0}
    TimeError(#[from] quill_time::TimeError),
    /// server id parsing error
    ServerIdParseError,
    /// signature parsing error: {0}
    SignatureParseError(String),
    /// block height overflow
    BlockHeightOverflowError,
    /// invalid minute: {0}
    InvalidMinute(u8),
}
