// Copyright (c) 2022 MASSA LABS <info@massa.net>

//! Process-list consensus worker.
//!
//! For every directory-block height the node keeps one process list: a set of
//! per-leader message queues (VMs), the federated / audit membership, and the
//! block accumulators under construction. This crate admits acknowledged
//! messages into their VM slots, advances each VM through its serial-hash
//! chain, requests slots that never arrived, and reports unresponsive leaders
//! to the elections subsystem.

mod commands;
mod controller;
mod manager;
mod state;
mod worker;

pub use state::ConsensusState;
pub use worker::start_consensus_worker;

#[cfg(test)]
mod tests;
