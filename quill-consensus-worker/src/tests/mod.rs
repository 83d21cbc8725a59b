// Copyright (c) 2022 MASSA LABS <info@massa.net>
//! # Internal process-list unit tests
//!
//! Everything runs against an in-memory `ConsensusState` with captured
//! channels; no worker thread is spawned. Time is driven by hand through
//! the node context so throttles and timeouts are deterministic.

mod admission_tests;
mod membership_tests;
mod process_tests;
mod tools;
