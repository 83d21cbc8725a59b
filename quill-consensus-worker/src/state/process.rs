use quill_consensus_exports::{ConsensusChannels, ConsensusConfig};
use quill_hash::Hash;
use quill_models::message::FaultReason;
use quill_models::quill_trace;
use tracing::warn;

use super::node::NodeContext;
use super::process_list::ProcessList;
use super::replay::ReplayKind;

impl ProcessList {
    /// Advance every VM through its processed prefix.
    ///
    /// The only place a VM's `height` moves. Walks each active VM from its
    /// current height through the filled slots, verifying the serial-hash
    /// chain, gating on entry-block availability and replay, and executing
    /// each message in order. Gaps trigger missing-message requests; a
    /// broken chain requests a full in-memory rebuild.
    ///
    /// # Returns:
    /// whether any VM advanced during this call
    pub fn process(
        &mut self,
        node: &mut NodeContext,
        channels: &ConsensusChannels,
        config: &ConsensusConfig,
    ) -> bool {
        let mut progress = false;

        // already persisted, nothing left to drive
        if node.highest_saved_block >= self.db_height {
            return progress;
        }
        node.pl_process_height = self.db_height;
        let now = node.get_timestamp();

        for i in 0..self.fed_servers.len() {
            // liveness bookkeeping for this VM
            if !node.syncing {
                self.mark_no_fault(i);
            } else {
                if !self.vms[i].synced && self.vms[i].when_faulted.is_zero() {
                    self.mark_fault(i, now, FaultReason::EomMissing);
                }
                if self.vms[i].synced && self.vms[i].fault_flag.is_none() {
                    self.mark_no_fault(i);
                }
            }
            self.fault_check(node, channels, config, now);

            if self.vms[i].caught_up() {
                let height = self.vms[i].height;
                if node.syncing && !self.vms[i].synced {
                    // the end-of-minute is missing, ask right away
                    self.ask(node, channels, config, i, height, now);
                } else if now.saturating_sub(self.vms[i].process_time)
                    > config.process_idle_ask_delay
                {
                    self.ask(node, channels, config, i, height, now);
                }
            }

            let mut j = self.vms[i].height;
            while j < self.vms[i].list.len() {
                let msg = match self.vms[i].list[j].clone() {
                    Some(msg) => msg,
                    None => {
                        self.ask(node, channels, config, i, j, now);
                        break;
                    }
                };
                let this_ack = match self.vms[i].list_ack[j].clone() {
                    Some(ack) => ack,
                    None => {
                        self.ask(node, channels, config, i, j, now);
                        break;
                    }
                };

                let expected_serial = if j == 0 {
                    // slot zero's serial hash is authoritative
                    this_ack.serial_hash
                } else {
                    let height = self.vms[i].height;
                    match self.vms[i].list_ack[height - 1].as_ref() {
                        Some(prev) => {
                            Hash::compute_from_tuple(&prev.message_hash, &this_ack.message_hash)
                        }
                        None => break,
                    }
                };
                if expected_serial != this_ack.serial_hash {
                    warn!(
                        "{}: serial hash conflict on fed server {} at list height {}, expected {} got {}",
                        node.name, i, j, expected_serial, this_ack.serial_hash
                    );
                    quill_trace!("consensus.process_list.serial_hash_conflict", {
                        "db_height": self.db_height,
                        "vm_index": i,
                        "height": j
                    });
                    node.reset();
                    return progress;
                }

                // after a block is processed the signature stage needs a
                // chance to save before we insist on having entry blocks
                let diff = self.db_height.saturating_sub(node.entry_db_height_complete);
                let within_entry_gate = !node.wait_for_entries
                    || (self.vms[i].leader_minute < 2 && diff <= 3)
                    || diff <= 2;
                if !within_entry_gate {
                    break;
                }

                if !node
                    .replay
                    .valid(ReplayKind::Internal, msg.repeat_hash(), msg.timestamp(), now)
                {
                    self.vms[i].list[j] = None;
                    self.vms[i].list_ack[j] = None;
                    break;
                }

                self.vms[i].process_time = now;
                if self.execute_message(&msg, node, channels, i) {
                    self.vms[i].heart_beat = 0;
                    // don't process it again if the execution worked
                    self.vms[i].height = j + 1;
                    progress = true;
                    node.replay.is_ts_valid(
                        ReplayKind::Internal,
                        msg.repeat_hash(),
                        msg.timestamp(),
                        now,
                    );
                    node.replay
                        .is_ts_valid(ReplayKind::Internal, msg.msg_hash(), msg.timestamp(), now);
                    node.acks.remove(&msg.msg_hash());
                    node.holding.remove(&msg.msg_hash());
                } else {
                    // can't execute this entry, so nothing further in this
                    // list either; move on to the next VM
                    break;
                }
                j += 1;
            }
        }
        progress
    }
}
