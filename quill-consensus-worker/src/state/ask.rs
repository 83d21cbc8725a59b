use std::collections::HashMap;

use quill_consensus_exports::{ConsensusChannels, ConsensusConfig, OutboundItem};
use quill_models::message::Message;
use quill_time::QuillTime;

use super::node::NodeContext;
use super::process_list::ProcessList;

impl ProcessList {
    /// Request the slots of a VM that never arrived.
    ///
    /// Throttled per VM: a slot already covered by an outstanding request is
    /// only re-asked after `missing_request_interval`, and not at all while
    /// the inbound queue is congested. One request carries every currently
    /// empty slot plus the first unknown height.
    pub(crate) fn ask(
        &mut self,
        node: &mut NodeContext,
        channels: &ConsensusChannels,
        config: &ConsensusConfig,
        vm_index: usize,
        height: usize,
        now: QuillTime,
    ) {
        let vm = &mut self.vms[vm_index];

        let already_asked = vm.mm_requests.contains_key(&height);
        let allowed = vm.mm_requests.is_empty()
            || !already_asked
            || now.saturating_sub(vm.mm_ask_time) >= config.missing_request_interval;
        if !allowed {
            return;
        }
        if already_asked && node.inbound_queue_len > config.inbound_queue_medium {
            // re-asks can wait while the pump is drowning
            return;
        }

        let ask_for = vm.list.len();
        let mut heights: Vec<u32> = Vec::new();
        let mut covered: HashMap<usize, bool> = HashMap::new();
        for (k, slot) in vm.list.iter().enumerate() {
            if slot.is_none() {
                heights.push(k as u32);
                covered.insert(k, true);
            }
        }
        // might as well ask for the next message too, it won't hurt
        heights.push(ask_for as u32);
        covered.insert(ask_for, true);

        let request = Message::missing_message(
            node.identity_chain_id,
            self.db_height,
            vm_index,
            heights,
            now,
        );
        let _ = channels.outbound_tx.send(OutboundItem::Message(request));

        vm.mm_ask_time = now;
        vm.mm_requests = covered;
        node.missing_request_ask_cnt += 1;
    }
}
