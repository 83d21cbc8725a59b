use std::time::Instant;

use crossbeam::channel::RecvTimeoutError;
use quill_consensus_exports::error::ConsensusError;
use quill_time::QuillTime;
use tracing::warn;

use crate::commands::ConsensusCommand;

use super::ConsensusWorker;

enum WaitingStatus {
    Ended,
    Interrupted,
    Disconnected,
}

impl ConsensusWorker {
    /// Execute a command received from the controller.
    ///
    /// # Returns:
    /// If successful, returns true if the loop should continue, false if it
    /// should stop. An error if the command failed.
    fn manage_command(&mut self, command: ConsensusCommand) -> Result<bool, ConsensusError> {
        let mut write_shared_state = self.shared_state.write();
        if let Ok(now) = QuillTime::now() {
            write_shared_state.node.now = now;
        }
        match command {
            ConsensusCommand::RegisterAckPair(ack, msg) => {
                write_shared_state.register_ack_pair(*ack, *msg)?;
                Ok(true)
            }
            ConsensusCommand::AddFedServer(db_height, id) => {
                write_shared_state.add_fed_server(db_height, id)?;
                Ok(true)
            }
            ConsensusCommand::AddAuditServer(db_height, id) => {
                write_shared_state.add_audit_server(db_height, id)?;
                Ok(true)
            }
            ConsensusCommand::RemoveFedServer(db_height, id) => {
                write_shared_state.remove_fed_server(db_height, id)?;
                Ok(true)
            }
            ConsensusCommand::RemoveAuditServer(db_height, id) => {
                write_shared_state.remove_audit_server(db_height, id)?;
                Ok(true)
            }
            ConsensusCommand::SetSyncWindow(syncing) => {
                write_shared_state.set_sync_window(syncing);
                Ok(true)
            }
            ConsensusCommand::SetHighestSavedBlock(db_height) => {
                let node = &mut write_shared_state.node;
                node.highest_saved_block = node.highest_saved_block.max(db_height);
                Ok(true)
            }
            ConsensusCommand::SetEntryHeightComplete(db_height) => {
                write_shared_state.node.entry_db_height_complete = db_height;
                Ok(true)
            }
            ConsensusCommand::Stop => Ok(false),
        }
    }

    /// Wait and interrupt if we receive a command, a stop signal or we reach
    /// the `deadline`.
    fn wait_tick_or_command(&mut self, deadline: Instant) -> WaitingStatus {
        match self.command_receiver.recv_deadline(deadline) {
            // message received => manage it
            Ok(command) => match self.manage_command(command) {
                Ok(true) => WaitingStatus::Interrupted,
                Ok(false) => WaitingStatus::Disconnected,
                Err(err) => {
                    warn!("Error in consensus: {}", err);
                    WaitingStatus::Interrupted
                }
            },
            // timeout => run a processing tick
            Err(RecvTimeoutError::Timeout) => WaitingStatus::Ended,
            // channel disconnected (sender dropped) => quit main loop
            Err(RecvTimeoutError::Disconnected) => WaitingStatus::Disconnected,
        }
    }

    /// Runs in loop forever. Every tick refreshes the shared time snapshot,
    /// drives each live process list and releases saved ones; any command
    /// interrupts the wait.
    pub fn run(&mut self) {
        loop {
            match self.wait_tick_or_command(self.next_tick) {
                WaitingStatus::Ended => {
                    {
                        let mut write_shared_state = self.shared_state.write();
                        match QuillTime::now() {
                            Ok(now) => write_shared_state.node.now = now,
                            Err(err) => {
                                warn!("could not read the clock: {}", err);
                            }
                        }
                        write_shared_state.node.inbound_queue_len = self.command_receiver.len();
                        write_shared_state.process_all();
                        write_shared_state.prune();
                    }
                    self.next_tick = Instant::now() + self.config.tick_interval.to_duration();
                }
                WaitingStatus::Disconnected => {
                    break;
                }
                WaitingStatus::Interrupted => {
                    continue;
                }
            };
        }
    }
}
