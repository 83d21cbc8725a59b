use quill_consensus_exports::{ConsensusChannels, ConsensusConfig, OutboundItem};
use quill_models::ack::Ack;
use quill_models::message::{Message, MessageKind};
use quill_models::quill_trace;
use tracing::{debug, error, warn};

use super::node::NodeContext;
use super::process_list::ProcessList;
use super::replay::ReplayKind;

/// Discard a pair and drop its look-aside entries so it is not re-offered.
fn toss(node: &mut NodeContext, ack: &Ack, hint: &str) {
    debug!("tossing ack pair ({}) for {}", hint, ack.message_hash);
    node.holding.remove(&ack.hash());
    node.acks.remove(&ack.hash());
}

impl ProcessList {
    /// Stage an acknowledged message into the VM slot its ack addresses.
    ///
    /// Every rejection is silent towards the network: the pair is dropped
    /// and its look-aside entries cleared. The only exception is a salt
    /// mismatch on our own identity, which panics: two running instances
    /// share one leader identity and continuing would double-sign.
    pub fn add_to_process_list(
        &mut self,
        node: &mut NodeContext,
        channels: &ConsensusChannels,
        config: &ConsensusConfig,
        mut ack: Ack,
        mut msg: Message,
    ) {
        quill_trace!("consensus.process_list.add_to_process_list", {
            "db_height": self.db_height,
            "vm_index": ack.vm_index,
            "height": ack.height
        });

        if msg.kind() == MessageKind::MissingMessage {
            // requests are answered from the lists, never stored in them
            warn!("refusing to admit a missing-message request into a process list");
            toss(node, &ack, "missing-message request");
            return;
        }

        if ack.db_height > node.highest_known_ack && ack.minute > 0 {
            node.highest_known_ack = ack.db_height;
        }

        let now = node.get_timestamp();

        // We don't check the salt number if this isn't an actual message,
        // i.e. a response from the past.
        if !ack.response && ack.leader_chain_id == node.identity_chain_id {
            let age_secs = now.to_seconds().saturating_sub(ack.timestamp.to_seconds());
            if age_secs > config.stale_self_ack_timeout_secs {
                toss(node, &ack, "own ack, stale");
                return;
            }
            let num = node.get_salt(ack.timestamp);
            if num != ack.salt_number {
                error!(
                    "identity {} issued an ack with salt number {:x}, this instance derives {:x}",
                    node.identity_chain_id, ack.salt_number, num
                );
                panic!("two leaders are configured with the same identity on this network, this is a configuration problem");
            }
        }

        let vm_index = ack.vm_index;
        if vm_index >= self.vms.len() {
            toss(node, &ack, "vm index out of range");
            return;
        }
        let slot = ack.height as usize;

        let filled = {
            let vm = &self.vms[vm_index];
            vm.list.len() > slot && vm.list[slot].is_some()
        };
        if filled {
            if !node.replay.valid(ReplayKind::Internal, msg.repeat_hash(), msg.timestamp(), now) {
                toss(node, &ack, "seen before, or too old");
                return;
            }
            let duplicate = {
                let vm = &self.vms[vm_index];
                vm.list[slot].as_ref().map(|stored| stored.msg_hash()) == Some(msg.msg_hash())
            };
            if duplicate {
                toss(node, &ack, "duplicate");
                return;
            }
            // conflicting entry for an occupied slot: surrender the slot and
            // wait for the pair to be offered again
            warn!(
                "conflicting entry for slot {} of VM {} at height {}, clearing it",
                slot, vm_index, self.db_height
            );
            let vm = &mut self.vms[vm_index];
            vm.list[slot] = None;
            vm.list_ack[slot] = None;
            return;
        }

        if ack.db_height != self.db_height {
            warn!(
                "ack at the wrong height, expected {} got {}",
                self.db_height, ack.db_height
            );
            toss(node, &ack, "wrong height");
            return;
        }

        // the pair is considered recorded from here on
        node.acks.remove(&ack.hash());
        node.holding.remove(&msg.msg_hash());

        msg.set_local(false);
        msg.set_peer2peer(false);
        ack.set_local(false);
        ack.set_peer2peer(false);

        // message before ack: peers receiving an ack for an unknown message
        // turn around and request it
        let _ = channels.outbound_tx.send(OutboundItem::Message(msg.clone()));
        let _ = channels.outbound_tx.send(OutboundItem::Ack(ack.clone()));

        let vm = &mut self.vms[vm_index];
        vm.heart_beat = 0;
        vm.grow_to(slot);
        vm.list[slot] = Some(msg.clone());
        vm.list_ack[slot] = Some(ack.clone());

        self.add_old_msg(msg.clone());
        self.add_old_ack(msg.msg_hash(), ack);
    }
}
