use std::sync::Arc;

use parking_lot::RwLock;
use quill_channel::QuillSender;
use quill_consensus_exports::export::ProcessListExport;
use quill_consensus_exports::ConsensusController;
use quill_models::ack::Ack;
use quill_models::message::Message;
use quill_models::server::ServerId;
use tracing::warn;

use crate::commands::ConsensusCommand;
use crate::state::ConsensusState;

/// The retrieval of data is made using a shared state and modifications are
/// asked by sending messages to a channel.
/// This is done mostly to be able to:
///
/// - send commands through the channel without waiting for them to be processed from the point of view of the sending thread, and channels are very much optimal for that (much faster than locks)
/// - still be able to read the current state of the process lists as processed so far (for this we need a shared state)
///
/// Note that sending commands and reading the state is done from different,
/// mutually-asynchronous tasks and they can have data that are not sync yet.
#[derive(Clone)]
pub struct ConsensusControllerImpl {
    command_sender: QuillSender<ConsensusCommand>,
    shared_state: Arc<RwLock<ConsensusState>>,
}

impl ConsensusControllerImpl {
    pub fn new(
        command_sender: QuillSender<ConsensusCommand>,
        shared_state: Arc<RwLock<ConsensusState>>,
    ) -> Self {
        Self {
            command_sender,
            shared_state,
        }
    }

    fn send_command(&self, command: ConsensusCommand, what: &str) {
        if let Err(err) = self.command_sender.try_send(command) {
            warn!("error trying to {}: {}", what, err);
        }
    }
}

impl ConsensusController for ConsensusControllerImpl {
    fn register_ack_pair(&self, ack: Ack, message: Message) {
        self.send_command(
            ConsensusCommand::RegisterAckPair(Box::new(ack), Box::new(message)),
            "register an ack pair",
        );
    }

    fn add_fed_server(&self, db_height: u32, chain_id: ServerId) {
        self.send_command(
            ConsensusCommand::AddFedServer(db_height, chain_id),
            "add a federated server",
        );
    }

    fn add_audit_server(&self, db_height: u32, chain_id: ServerId) {
        self.send_command(
            ConsensusCommand::AddAuditServer(db_height, chain_id),
            "add an audit server",
        );
    }

    fn remove_fed_server(&self, db_height: u32, chain_id: ServerId) {
        self.send_command(
            ConsensusCommand::RemoveFedServer(db_height, chain_id),
            "remove a federated server",
        );
    }

    fn remove_audit_server(&self, db_height: u32, chain_id: ServerId) {
        self.send_command(
            ConsensusCommand::RemoveAuditServer(db_height, chain_id),
            "remove an audit server",
        );
    }

    fn set_sync_window(&self, syncing: bool) {
        self.send_command(
            ConsensusCommand::SetSyncWindow(syncing),
            "set the sync window",
        );
    }

    fn set_highest_saved_block(&self, db_height: u32) {
        self.send_command(
            ConsensusCommand::SetHighestSavedBlock(db_height),
            "record a saved block",
        );
    }

    fn set_entry_height_complete(&self, db_height: u32) {
        self.send_command(
            ConsensusCommand::SetEntryHeightComplete(db_height),
            "record the complete entry height",
        );
    }

    fn get_process_list(&self, db_height: u32) -> Option<ProcessListExport> {
        self.shared_state.read().export(db_height)
    }

    fn get_current_height(&self) -> u32 {
        self.shared_state.read().current_height()
    }

    fn clone_box(&self) -> Box<dyn ConsensusController> {
        Box::new(self.clone())
    }
}
