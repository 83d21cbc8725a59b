use crate::export::ProcessListExport;
use quill_models::ack::Ack;
use quill_models::message::Message;
use quill_models::server::ServerId;

/// interface that communicates with the consensus worker thread
pub trait ConsensusController: Send + Sync {
    /// Hand an acknowledged message pair to the process list it addresses.
    ///
    /// # Arguments
    /// * `ack`: the ordering token issued by the leader
    /// * `message`: the message it acknowledges
    fn register_ack_pair(&self, ack: Ack, message: Message);

    /// Promote or add an identity to the federated set at the given height
    fn add_fed_server(&self, db_height: u32, chain_id: ServerId);

    /// Demote or add an identity to the audit set at the given height
    fn add_audit_server(&self, db_height: u32, chain_id: ServerId);

    /// Remove an identity from the federated set at the given height
    fn remove_fed_server(&self, db_height: u32, chain_id: ServerId);

    /// Remove an identity from the audit set at the given height
    fn remove_audit_server(&self, db_height: u32, chain_id: ServerId);

    /// Open or close the end-of-minute syncing window
    fn set_sync_window(&self, syncing: bool);

    /// Record that the block at this height was persisted
    fn set_highest_saved_block(&self, db_height: u32);

    /// Record the height up to which entry blocks are locally complete
    fn set_entry_height_complete(&self, db_height: u32);

    /// Get a snapshot of the process list at a height, if still live
    fn get_process_list(&self, db_height: u32) -> Option<ProcessListExport>;

    /// Height of the newest live process list
    fn get_current_height(&self) -> u32;

    /// Returns a boxed clone of self.
    /// Useful to allow cloning `Box<dyn ConsensusController>`.
    fn clone_box(&self) -> Box<dyn ConsensusController>;
}

/// Allow cloning `Box<dyn ConsensusController>`
/// Uses `ConsensusController::clone_box` internally
impl Clone for Box<dyn ConsensusController> {
    fn clone(&self) -> Box<dyn ConsensusController> {
        self.clone_box()
    }
}

/// Consensus manager used to stop the consensus thread
pub trait ConsensusManager {
    /// Stop the consensus thread
    /// Note that we do not take self by value to consume it
    /// because it is not allowed to move out of `Box<dyn ConsensusManager>`
    fn stop(&mut self);
}
