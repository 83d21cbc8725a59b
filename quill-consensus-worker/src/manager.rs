use quill_channel::QuillSender;
use quill_consensus_exports::ConsensusManager;
use std::thread::JoinHandle;
use tracing::info;

use crate::commands::ConsensusCommand;

pub struct ConsensusManagerImpl {
    pub consensus_thread: Option<(QuillSender<ConsensusCommand>, JoinHandle<()>)>,
}

impl ConsensusManager for ConsensusManagerImpl {
    fn stop(&mut self) {
        info!("stopping consensus worker...");
        // join the consensus thread
        if let Some((tx, join_handle)) = self.consensus_thread.take() {
            tx.send(ConsensusCommand::Stop)
                .expect("consensus thread panicked on try to send stop message to worker");
            drop(tx);
            join_handle
                .join()
                .expect("consensus thread panicked on try to join");
        }
        info!("consensus worker stopped");
    }
}
