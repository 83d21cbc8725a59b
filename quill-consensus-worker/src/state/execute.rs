use quill_consensus_exports::ConsensusChannels;
use quill_models::block::EcEntry;
use quill_models::message::{Message, MessageBody};
use tracing::warn;

use super::node::NodeContext;
use super::process_list::ProcessList;

impl ProcessList {
    /// Apply one admitted message to the block under construction.
    ///
    /// Returning `false` leaves the VM where it is; the processor will offer
    /// the same message again on the next pass.
    pub(crate) fn execute_message(
        &mut self,
        msg: &Message,
        node: &mut NodeContext,
        channels: &ConsensusChannels,
        vm_index: usize,
    ) -> bool {
        match &msg.body {
            MessageBody::EndOfMinute { minute, .. } => {
                let vm = &mut self.vms[vm_index];
                if vm.leader_minute != *minute as usize {
                    // minutes close strictly in order
                    return false;
                }
                vm.leader_minute += 1;
                vm.synced = true;
                self.entry_credit_block.push(EcEntry::MinuteMarker(*minute));
                true
            }
            MessageBody::DirectoryBlockSignature {
                prev_key_mr,
                signature,
                ..
            } => {
                if *prev_key_mr != self.directory_block.prev_key_mr {
                    // this leader built on a previous block we don't have
                    self.increment_diff_sig_tally();
                }
                self.add_db_sig(msg.leader_chain_id, *signature);
                self.vms[vm_index].signed = true;
                true
            }
            MessageBody::Commit {
                entry_hash,
                ec_address,
                credits,
            } => {
                self.update_ec_balance(*ec_address, -(*credits as i64));
                self.entry_credit_block.push(EcEntry::Commit {
                    entry_hash: *entry_hash,
                    credits: *credits,
                });
                true
            }
            MessageBody::Reveal {
                chain_id,
                entry_hash,
            } => {
                self.add_new_entry(*entry_hash, *chain_id);
                if self.get_new_eblock(*chain_id).is_none() {
                    self.add_new_eblock(*chain_id, *entry_hash);
                }
                self.pending_chain_heads
                    .write()
                    .insert(*chain_id, *entry_hash);
                true
            }
            MessageBody::FullServerFault {
                faulted_id,
                replacement_id,
                ..
            } => {
                // the replacement takes the federated slot, the faulted
                // leader falls back to the audit bench
                self.add_fed_server(node, channels, *replacement_id);
                self.add_audit_server(node, channels, *faulted_id);
                true
            }
            MessageBody::MissingMessage { .. } => {
                // admission refuses these; skip if one ever slips through
                warn!("missing-message request found in a process list, skipping it");
                true
            }
        }
    }
}
