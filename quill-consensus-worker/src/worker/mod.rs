use std::sync::Arc;
use std::thread;
use std::time::Instant;

use parking_lot::RwLock;
use quill_channel::{channel, QuillReceiver};
use quill_consensus_exports::error::ConsensusError;
use quill_consensus_exports::{
    ConsensusChannels, ConsensusConfig, ConsensusController, ConsensusManager,
};
use quill_hash::Hash;
use quill_models::server::ServerId;

use crate::commands::ConsensusCommand;
use crate::controller::ConsensusControllerImpl;
use crate::manager::ConsensusManagerImpl;
use crate::state::{ConsensusState, NodeContext};

/// The consensus worker structure that contains all information and tools
/// for the thread driving the process lists.
pub struct ConsensusWorker {
    /// Channel to receive commands from the controller
    command_receiver: QuillReceiver<ConsensusCommand>,
    /// Configuration of the consensus
    config: ConsensusConfig,
    /// State shared with the controller
    shared_state: Arc<RwLock<ConsensusState>>,
    /// Next processing tick
    next_tick: Instant,
}

mod main_loop;

/// Create a new consensus worker thread.
///
/// # Arguments:
/// * `config`: Configuration of the consensus
/// * `channels`: Channels to communicate with other modules
/// * `node_name`: name of this node, display and simulations only
/// * `identity`: our identity chain id
/// * `salt`: instance salt distinguishing processes sharing one identity
/// * `start_height`: height of the first process list to open
///
/// # Returns:
/// * The consensus controller to communicate with the worker thread
/// * The consensus manager to stop the worker thread
pub fn start_consensus_worker(
    config: ConsensusConfig,
    channels: ConsensusChannels,
    node_name: String,
    identity: ServerId,
    salt: Hash,
    start_height: u32,
) -> Result<(Box<dyn ConsensusController>, Box<dyn ConsensusManager>), ConsensusError> {
    let (tx, rx) = channel::<ConsensusCommand>("consensus_command", Some(config.channel_size));

    let node = NodeContext::new(node_name, identity, salt, config.replay_window);
    let shared_state = Arc::new(RwLock::new(ConsensusState::new(
        config.clone(),
        channels,
        node,
        start_height,
    )?));

    let shared_state_cloned = shared_state.clone();
    let worker_config = config.clone();
    let consensus_thread = thread::Builder::new()
        .name("consensus worker".into())
        .spawn(move || {
            let mut worker = ConsensusWorker {
                command_receiver: rx,
                config: worker_config,
                shared_state: shared_state_cloned,
                next_tick: Instant::now(),
            };
            worker.run()
        })
        .expect("Can't spawn consensus thread.");

    let manager = ConsensusManagerImpl {
        consensus_thread: Some((tx.clone(), consensus_thread)),
    };

    let controller = ConsensusControllerImpl::new(tx, shared_state);

    Ok((Box::new(controller), Box::new(manager)))
}
