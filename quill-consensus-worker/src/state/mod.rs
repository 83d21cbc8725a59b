use std::collections::VecDeque;

use quill_consensus_exports::error::ConsensusError;
use quill_consensus_exports::events::ConsensusEvent;
use quill_consensus_exports::export::ProcessListExport;
use quill_consensus_exports::{ConsensusChannels, ConsensusConfig};
use quill_models::ack::Ack;
use quill_models::message::Message;
use quill_models::server::ServerId;
use tracing::debug;

mod admission;
mod ask;
mod dbsig;
mod execute;
mod fault;
mod membership;
mod node;
mod process;
mod process_list;
mod replay;
mod server_map;
mod vm;

pub use node::NodeContext;
pub use process_list::ProcessList;
pub use replay::{ReplayFilter, ReplayKind};

/// Owner of the node context and every live process list.
///
/// Process lists never hold a reference back to the node; they receive the
/// context on each call. The deque is contiguous in height: `lists[k]` is
/// the list at `lists[0].db_height + k`.
pub struct ConsensusState {
    /// Configuration of the consensus
    pub config: ConsensusConfig,
    /// Channels to communicate with other modules
    pub channels: ConsensusChannels,
    /// Node-wide flags, counters and look-aside maps
    pub node: NodeContext,
    lists: VecDeque<ProcessList>,
}

impl ConsensusState {
    /// Open the state with a genesis process list at `start_height`.
    pub fn new(
        config: ConsensusConfig,
        channels: ConsensusChannels,
        node: NodeContext,
        start_height: u32,
    ) -> Result<Self, ConsensusError> {
        let genesis = ProcessList::new(None, start_height, node.identity_chain_id)?;
        let mut lists = VecDeque::new();
        lists.push_back(genesis);
        Ok(ConsensusState {
            config,
            channels,
            node,
            lists,
        })
    }

    /// The process list at a height, if it is still live
    pub fn get(&self, db_height: u32) -> Option<&ProcessList> {
        let base = self.lists.front()?.db_height;
        let index = db_height.checked_sub(base)? as usize;
        self.lists.get(index)
    }

    /// The process list at a height, creating it and everything up to it
    /// from its predecessors when needed. Heights below the oldest live list
    /// are refused.
    fn ensure_list(&mut self, db_height: u32) -> Result<Option<usize>, ConsensusError> {
        let base = match self.lists.front() {
            Some(front) => front.db_height,
            None => return Ok(None),
        };
        if db_height < base {
            return Ok(None);
        }
        loop {
            let back_height = match self.lists.back() {
                Some(back) => back.db_height,
                None => return Ok(None),
            };
            if back_height >= db_height {
                break;
            }
            let next = ProcessList::new(
                self.lists.back(),
                back_height + 1,
                self.node.identity_chain_id,
            )?;
            self.lists.push_back(next);
        }
        Ok(Some((db_height - base) as usize))
    }

    /// Route an acknowledged pair to the list its ack addresses.
    pub fn register_ack_pair(&mut self, ack: Ack, msg: Message) -> Result<(), ConsensusError> {
        if ack.db_height <= self.node.highest_saved_block && self.node.highest_saved_block > 0 {
            debug!("dropping an ack pair for an already saved height {}", ack.db_height);
            return Ok(());
        }
        let index = match self.ensure_list(ack.db_height)? {
            Some(index) => index,
            None => {
                debug!("dropping an ack pair below the oldest live list");
                return Ok(());
            }
        };
        self.lists[index].add_to_process_list(
            &mut self.node,
            &self.channels,
            &self.config,
            ack,
            msg,
        );
        Ok(())
    }

    /// Drive every live list once, oldest first.
    ///
    /// # Returns:
    /// whether any VM anywhere advanced
    pub fn process_all(&mut self) -> bool {
        let mut progress = false;
        for index in 0..self.lists.len() {
            if self.node.reset_requested {
                break;
            }
            progress |=
                self.lists[index].process(&mut self.node, &self.channels, &self.config);
            let list = &mut self.lists[index];
            if list.complete() && !list.completion_notified {
                list.completion_notified = true;
                let _ = self
                    .channels
                    .controller_event_tx
                    .send(ConsensusEvent::ListComplete(list.db_height));
            }
        }
        if self.node.reset_requested {
            self.node.reset_requested = false;
            let _ = self
                .channels
                .controller_event_tx
                .send(ConsensusEvent::NeedReset);
        }
        progress
    }

    /// Release lists whose block was persisted.
    pub fn prune(&mut self) {
        while self.lists.len() > 1 {
            match self.lists.front() {
                Some(front) if front.db_height < self.node.highest_saved_block => {
                    self.lists.pop_front();
                }
                _ => break,
            }
        }
    }

    /// Open or close the end-of-minute syncing window. Opening one resets
    /// the per-VM synced flags of the newest list.
    pub fn set_sync_window(&mut self, syncing: bool) {
        self.node.syncing = syncing;
        if syncing {
            if let Some(list) = self.lists.back_mut() {
                let active = list.fed_servers().len();
                for vm in list.vms.iter_mut().take(active) {
                    vm.synced = false;
                }
            }
        }
    }

    /// Add or promote a federated server on the list at a height
    pub fn add_fed_server(&mut self, db_height: u32, id: ServerId) -> Result<(), ConsensusError> {
        if let Some(index) = self.ensure_list(db_height)? {
            self.lists[index].add_fed_server(&self.node, &self.channels, id);
        }
        Ok(())
    }

    /// Add or demote to an audit server on the list at a height
    pub fn add_audit_server(&mut self, db_height: u32, id: ServerId) -> Result<(), ConsensusError> {
        if let Some(index) = self.ensure_list(db_height)? {
            self.lists[index].add_audit_server(&self.node, &self.channels, id);
        }
        Ok(())
    }

    /// Remove a federated server from the list at a height
    pub fn remove_fed_server(&mut self, db_height: u32, id: ServerId) -> Result<(), ConsensusError> {
        if let Some(index) = self.ensure_list(db_height)? {
            self.lists[index].remove_fed_server_hash(&self.node, &self.channels, id);
        }
        Ok(())
    }

    /// Remove an audit server from the list at a height
    pub fn remove_audit_server(
        &mut self,
        db_height: u32,
        id: ServerId,
    ) -> Result<(), ConsensusError> {
        if let Some(index) = self.ensure_list(db_height)? {
            self.lists[index].remove_audit_server_hash(&self.node, &self.channels, id);
        }
        Ok(())
    }

    /// Split borrow of one list together with the context it runs against.
    #[cfg(test)]
    pub(crate) fn parts_mut(
        &mut self,
        db_height: u32,
    ) -> Option<(
        &mut ProcessList,
        &mut NodeContext,
        &ConsensusChannels,
        &ConsensusConfig,
    )> {
        let base = self.lists.front()?.db_height;
        let index = db_height.checked_sub(base)? as usize;
        let list = self.lists.get_mut(index)?;
        Some((list, &mut self.node, &self.channels, &self.config))
    }

    /// Snapshot of the list at a height, if live
    pub fn export(&self, db_height: u32) -> Option<ProcessListExport> {
        self.get(db_height).map(|list| list.export())
    }

    /// Height of the newest live list
    pub fn current_height(&self) -> u32 {
        self.lists.back().map(|list| list.db_height).unwrap_or(0)
    }
}
