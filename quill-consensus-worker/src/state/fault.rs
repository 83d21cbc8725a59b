use quill_consensus_exports::elections::ElectionsMessage;
use quill_consensus_exports::{ConsensusChannels, ConsensusConfig};
use quill_models::message::FaultReason;
use quill_time::QuillTime;
use tracing::warn;

use super::node::NodeContext;
use super::process_list::ProcessList;

impl ProcessList {
    /// Start a fault episode for a VM, or escalate the reason of a running
    /// one. The first-observed instant is kept.
    pub fn mark_fault(&mut self, vm_index: usize, now: QuillTime, reason: FaultReason) {
        let vm = match self.vms.get_mut(vm_index) {
            Some(vm) => vm,
            None => return,
        };
        if vm.when_faulted.is_zero() {
            vm.when_faulted = now;
        }
        vm.fault_flag = Some(reason);
    }

    /// End a VM's fault episode.
    pub fn mark_no_fault(&mut self, vm_index: usize) {
        let vm = match self.vms.get_mut(vm_index) {
            Some(vm) => vm,
            None => return,
        };
        vm.when_faulted = QuillTime::ZERO;
        vm.fault_flag = None;
        vm.fault_notified = false;
    }

    /// Propagate expired fault timers to the elections subsystem.
    ///
    /// Each fault episode is reported once; the report marks the leader
    /// offline. Resolution comes back through membership changes, not
    /// through this path.
    pub fn fault_check(
        &mut self,
        node: &NodeContext,
        channels: &ConsensusChannels,
        config: &ConsensusConfig,
        now: QuillTime,
    ) {
        for i in 0..self.fed_servers.len() {
            let expired = {
                let vm = &self.vms[i];
                !vm.when_faulted.is_zero()
                    && !vm.fault_notified
                    && now.saturating_sub(vm.when_faulted) >= config.fault_timeout
            };
            if !expired {
                continue;
            }
            self.vms[i].fault_notified = true;
            self.fed_servers[i].set_online(false);
            let reason = self.vms[i].fault_flag.unwrap_or(FaultReason::EomMissing);
            let chain_id = self.fed_servers[i].chain_id;
            warn!(
                "leader {} on VM {} unresponsive for {} ms, requesting an election",
                chain_id,
                i,
                now.saturating_sub(self.vms[i].when_faulted)
            );
            if let Err(err) = channels.elections_tx.send(ElectionsMessage::Fault {
                node: node.name.clone(),
                db_height: self.db_height,
                vm_index: i,
                chain_id,
                reason,
            }) {
                warn!("channel error reporting a leader fault: {}", err);
            }
        }
    }
}
