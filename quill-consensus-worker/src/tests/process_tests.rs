use quill_consensus_exports::events::ConsensusEvent;
use quill_consensus_exports::{ConsensusConfig, OutboundItem};
use quill_hash::Hash;
use quill_models::block::EcEntry;
use quill_models::message::{FaultReason, MessageBody};
use quill_models::signature::Signature;
use quill_time::QuillTime;

use super::tools::{consensus_state_test, server_id, LeaderSim, T0};
use crate::state::ReplayKind;

fn now() -> QuillTime {
    QuillTime::from_millis(T0)
}

#[test]
fn test_process_advances_through_filled_slots() {
    consensus_state_test(ConsensusConfig::default(), |mut harness| {
        harness.with_fed_servers(&[server_id(1), server_id(2)]);
        let mut leader = LeaderSim::new(server_id(1), 0, 0);
        for seed in 1..=3 {
            let (ack, msg) = leader.commit(seed, now());
            harness.state.register_ack_pair(ack, msg).unwrap();
        }
        harness.drain();

        let progress = harness.state.process_all();

        assert!(progress);
        let list = harness.state.get(0).unwrap();
        assert_eq!(list.vms[0].list.len(), 3);
        assert_eq!(list.vms[0].height, 3);
        for i in 0..3 {
            assert!(list.vms[0].list[i].is_some());
            assert!(list.vms[0].list_ack[i].is_some());
        }
        // commits spent tentative credits and grew the entry-credit body
        assert_eq!(list.ec_balance(Hash::compute_from(&[b'a', 1])), -1);
        assert_eq!(list.entry_credit_block.body().len(), 3);
    });
}

#[test]
fn test_serial_hash_conflict_requests_reset() {
    consensus_state_test(ConsensusConfig::default(), |mut harness| {
        harness.with_fed_servers(&[server_id(1), server_id(2)]);
        let mut leader = LeaderSim::new(server_id(1), 0, 0);
        let (ack0, msg0) = leader.commit(1, now());
        harness.state.register_ack_pair(ack0, msg0).unwrap();
        assert!(harness.state.process_all());

        // second entry carries a serial hash that does not chain
        let (mut ack1, msg1) = leader.commit(2, now());
        ack1.serial_hash = Hash::compute_from(b"not the chain");
        harness.state.register_ack_pair(ack1, msg1).unwrap();
        harness.drain();

        harness.state.process_all();

        let list = harness.state.get(0).unwrap();
        assert_eq!(list.vms[0].height, 1, "height must not move past a conflict");
        let events = {
            let mut out = Vec::new();
            while let Ok(event) = harness.event_rx.try_recv() {
                out.push(event);
            }
            out
        };
        assert!(events
            .iter()
            .any(|event| matches!(event, ConsensusEvent::NeedReset)));
    });
}

#[test]
fn test_gap_triggers_missing_message_ask() {
    consensus_state_test(ConsensusConfig::default(), |mut harness| {
        harness.with_fed_servers(&[server_id(1)]);
        let mut leader = LeaderSim::new(server_id(1), 0, 0);
        let (ack0, msg0) = leader.commit(1, now());
        let (_dropped_ack, _dropped_msg) = leader.commit(2, now());
        let (ack2, msg2) = leader.commit(3, now());

        harness.state.register_ack_pair(ack0, msg0).unwrap();
        harness.state.register_ack_pair(ack2, msg2).unwrap();
        harness.drain();

        harness.state.process_all();

        let list = harness.state.get(0).unwrap();
        assert_eq!(list.vms[0].height, 1);
        assert_eq!(harness.state.node.missing_request_ask_cnt, 1);

        let asks: Vec<Vec<u32>> = harness
            .outbound()
            .into_iter()
            .filter_map(|item| match item {
                OutboundItem::Message(msg) => match msg.body {
                    MessageBody::MissingMessage { heights, vm_index, .. } if vm_index == 0 => {
                        Some(heights)
                    }
                    _ => None,
                },
                _ => None,
            })
            .collect();
        assert_eq!(asks.len(), 1);
        // the empty slot and the first unknown height
        assert!(asks[0].contains(&1));
        assert!(asks[0].contains(&3));
    });
}

#[test]
fn test_entry_gate_blocks_distant_heights() {
    consensus_state_test(ConsensusConfig::default(), |mut harness| {
        harness.with_fed_servers(&[server_id(1), server_id(2)]);
        let mut leader = LeaderSim::new(server_id(1), 0, 4);
        let (ack, msg) = leader.commit(1, now());
        harness.state.register_ack_pair(ack, msg).unwrap();
        harness.state.node.wait_for_entries = true;
        harness.state.node.entry_db_height_complete = 0;
        harness.drain();

        harness.state.process_all();
        let list = harness.state.get(4).unwrap();
        assert_eq!(list.vms[0].height, 0, "four heights behind must stall");

        harness.state.node.entry_db_height_complete = 2;
        harness.state.process_all();
        let list = harness.state.get(4).unwrap();
        assert_eq!(list.vms[0].height, 1, "two heights behind may proceed");
    });
}

#[test]
fn test_replay_gate_nulls_replayed_slot() {
    consensus_state_test(ConsensusConfig::default(), |mut harness| {
        harness.with_fed_servers(&[server_id(1), server_id(2)]);
        let mut leader = LeaderSim::new(server_id(1), 0, 0);
        let (ack, msg) = leader.commit(1, now());
        let repeat = msg.repeat_hash();
        let ts = msg.timestamp();
        harness.state.register_ack_pair(ack, msg).unwrap();
        harness.drain();

        // the same message already went through a list once
        let list_now = harness.state.node.get_timestamp();
        harness
            .state
            .node
            .replay
            .is_ts_valid(ReplayKind::Internal, repeat, ts, list_now);

        harness.state.process_all();

        let list = harness.state.get(0).unwrap();
        assert_eq!(list.vms[0].height, 0);
        assert!(list.vms[0].list[0].is_none());
        assert!(list.vms[0].list_ack[0].is_none());
    });
}

#[test]
fn test_eom_sequence_completes_the_list() {
    consensus_state_test(ConsensusConfig::default(), |mut harness| {
        harness.with_fed_servers(&[server_id(1)]);
        let mut leader = LeaderSim::new(server_id(1), 0, 0);
        for minute in 0..10u8 {
            let (ack, msg) = leader.eom(minute, now());
            harness.state.register_ack_pair(ack, msg).unwrap();
        }
        harness.drain();

        harness.state.process_all();

        let list = harness.state.get(0).unwrap();
        assert_eq!(list.vms[0].leader_minute, 10);
        assert_eq!(list.vms[0].height, 10);
        assert!(list.complete());
        let minutes = list
            .entry_credit_block
            .body()
            .iter()
            .filter(|entry| matches!(entry, EcEntry::MinuteMarker(_)))
            .count();
        assert_eq!(minutes, 10);

        let events = {
            let mut out = Vec::new();
            while let Ok(event) = harness.event_rx.try_recv() {
                out.push(event);
            }
            out
        };
        assert!(events
            .iter()
            .any(|event| matches!(event, ConsensusEvent::ListComplete(0))));
    });
}

#[test]
fn test_out_of_order_eom_stalls() {
    consensus_state_test(ConsensusConfig::default(), |mut harness| {
        harness.with_fed_servers(&[server_id(1)]);
        let mut leader = LeaderSim::new(server_id(1), 0, 0);
        // minute 3 closed without minutes 0..2
        let (ack, msg) = leader.eom(3, now());
        harness.state.register_ack_pair(ack, msg).unwrap();
        harness.drain();

        let progress = harness.state.process_all();

        assert!(!progress);
        let list = harness.state.get(0).unwrap();
        assert_eq!(list.vms[0].height, 0);
        assert_eq!(list.vms[0].leader_minute, 0);
    });
}

#[test]
fn test_db_signature_is_collected() {
    consensus_state_test(ConsensusConfig::default(), |mut harness| {
        harness.with_fed_servers(&[server_id(1), server_id(2)]);
        let prev_key_mr = {
            let list = harness.state.get(0).unwrap();
            list.directory_block.prev_key_mr
        };
        let mut leader = LeaderSim::new(server_id(1), 0, 0);
        let (ack, msg) = leader.ack_pair(
            MessageBody::DirectoryBlockSignature {
                db_height: 0,
                prev_key_mr,
                signature: Signature::from_bytes([3u8; 64]),
            },
            0,
            now(),
        );
        harness.state.register_ack_pair(ack, msg).unwrap();
        harness.drain();

        harness.state.process_all();

        let list = harness.state.get(0).unwrap();
        assert_eq!(list.db_signatures().len(), 1);
        assert_eq!(list.db_signatures()[0].chain_id, server_id(1));
        assert!(list.vms[0].signed);
        assert!(list.check_diff_sig_tally());
    });
}

#[test]
fn test_diverging_db_signature_tallies() {
    consensus_state_test(ConsensusConfig::default(), |mut harness| {
        harness.with_fed_servers(&[server_id(1)]);
        let mut leader = LeaderSim::new(server_id(1), 0, 0);
        let (ack, msg) = leader.ack_pair(
            MessageBody::DirectoryBlockSignature {
                db_height: 0,
                prev_key_mr: Hash::compute_from(b"some other block"),
                signature: Signature::from_bytes([3u8; 64]),
            },
            0,
            now(),
        );
        harness.state.register_ack_pair(ack, msg).unwrap();
        harness.drain();

        harness.state.process_all();

        let list = harness.state.get(0).unwrap();
        // the single leader disagrees with our saved block
        assert!(!list.check_diff_sig_tally());
    });
}

#[test]
fn test_full_server_fault_swaps_membership() {
    consensus_state_test(ConsensusConfig::default(), |mut harness| {
        harness.with_fed_servers(&[server_id(1), server_id(2)]);
        harness.state.add_audit_server(0, server_id(9)).unwrap();
        harness.drain();

        let mut leader = LeaderSim::new(server_id(1), 0, 0);
        let (ack, msg) = leader.ack_pair(
            MessageBody::FullServerFault {
                db_height: 0,
                vm_index: 1,
                system_height: 0,
                faulted_id: server_id(2),
                replacement_id: server_id(9),
                reason: FaultReason::EomMissing,
            },
            0,
            now(),
        );
        harness.state.register_ack_pair(ack, msg).unwrap();
        harness.state.process_all();

        let list = harness.state.get(0).unwrap();
        let fed: Vec<_> = list.fed_servers().iter().map(|s| s.chain_id).collect();
        let audit: Vec<_> = list.audit_servers().iter().map(|s| s.chain_id).collect();
        assert!(fed.contains(&server_id(9)));
        assert!(!fed.contains(&server_id(2)));
        assert_eq!(audit, vec![server_id(2)]);
    });
}

#[test]
fn test_saved_heights_are_not_processed() {
    consensus_state_test(ConsensusConfig::default(), |mut harness| {
        harness.with_fed_servers(&[server_id(1), server_id(2)]);
        let mut leader = LeaderSim::new(server_id(1), 0, 0);
        let (ack, msg) = leader.commit(1, now());
        harness.state.register_ack_pair(ack, msg).unwrap();
        harness.state.node.highest_saved_block = 5;

        let progress = harness.state.process_all();

        assert!(!progress);
        let list = harness.state.get(0).unwrap();
        assert_eq!(list.vms[0].height, 0);
    });
}

#[test]
fn test_idle_caught_up_vm_is_asked_with_throttle() {
    consensus_state_test(ConsensusConfig::default(), |mut harness| {
        harness.with_fed_servers(&[server_id(1), server_id(2)]);
        harness.drain();

        // a VM that never made progress is asked on the first pass
        harness.state.process_all();
        let first = harness.state.node.missing_request_ask_cnt;
        assert!(first > 0);

        // a second pass inside the throttle window asks nothing new
        harness.state.process_all();
        assert_eq!(harness.state.node.missing_request_ask_cnt, first);

        harness.tick(2_100);
        harness.state.process_all();
        assert!(harness.state.node.missing_request_ask_cnt > first);
    });
}
