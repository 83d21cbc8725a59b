use quill_consensus_exports::{ConsensusConfig, OutboundItem};
use quill_models::ack::Ack;
use quill_models::message::{Message, MessageBody};
use quill_time::QuillTime;

use super::tools::{consensus_state_test, own_identity, server_id, LeaderSim, T0};

fn now() -> QuillTime {
    QuillTime::from_millis(T0)
}

#[test]
fn test_admission_fills_slot_and_broadcasts_message_first() {
    consensus_state_test(ConsensusConfig::default(), |mut harness| {
        harness.with_fed_servers(&[server_id(1), server_id(2)]);
        let mut leader = LeaderSim::new(server_id(1), 0, 0);
        let (ack, msg) = leader.commit(1, now());
        let msg_hash = msg.msg_hash();

        harness.state.register_ack_pair(ack, msg).unwrap();

        let list = harness.state.get(0).unwrap();
        assert!(list.vms[0].list[0].is_some());
        assert!(list.vms[0].list_ack[0].is_some());
        assert_eq!(list.vms[0].list.len(), list.vms[0].list_ack.len());
        assert!(list.get_old_msg(list.vms[0].list[0].as_ref().unwrap().hash()).is_some());
        assert!(list.get_old_ack(msg_hash).is_some());

        let outbound = harness.outbound();
        assert_eq!(outbound.len(), 2);
        assert!(matches!(outbound[0], OutboundItem::Message(_)));
        assert!(matches!(outbound[1], OutboundItem::Ack(_)));
    });
}

#[test]
fn test_admitting_exact_duplicate_changes_nothing() {
    consensus_state_test(ConsensusConfig::default(), |mut harness| {
        harness.with_fed_servers(&[server_id(1), server_id(2)]);
        let mut leader = LeaderSim::new(server_id(1), 0, 0);
        let (ack, msg) = leader.commit(1, now());

        harness
            .state
            .register_ack_pair(ack.clone(), msg.clone())
            .unwrap();
        harness.drain();

        harness.state.register_ack_pair(ack, msg.clone()).unwrap();

        let list = harness.state.get(0).unwrap();
        assert_eq!(list.vms[0].list.len(), 1);
        assert_eq!(
            list.vms[0].list[0].as_ref().map(|m| m.msg_hash()),
            Some(msg.msg_hash())
        );
        assert!(harness.outbound().is_empty());
    });
}

#[test]
fn test_conflicting_entry_clears_the_slot() {
    consensus_state_test(ConsensusConfig::default(), |mut harness| {
        harness.with_fed_servers(&[server_id(1), server_id(2)]);
        let mut first = LeaderSim::new(server_id(1), 0, 0);
        let mut second = LeaderSim::new(server_id(1), 0, 0);
        let (ack1, msg1) = first.commit(1, now());
        let (ack2, msg2) = second.commit(2, now());

        harness.state.register_ack_pair(ack1, msg1).unwrap();
        harness.drain();
        harness.state.register_ack_pair(ack2, msg2).unwrap();

        let list = harness.state.get(0).unwrap();
        assert!(list.vms[0].list[0].is_none());
        assert!(list.vms[0].list_ack[0].is_none());
        // nothing was re-broadcast for the surrendered slot
        assert!(harness.outbound().is_empty());
    });
}

#[test]
fn test_wrong_height_is_dropped() {
    consensus_state_test(ConsensusConfig::default(), |mut harness| {
        harness.with_fed_servers(&[server_id(1), server_id(2)]);
        let mut leader = LeaderSim::new(server_id(1), 0, 5);
        let (ack, msg) = leader.commit(1, now());

        let (list, node, channels, config) = harness.state.parts_mut(0).unwrap();
        list.add_to_process_list(node, channels, config, ack, msg);

        assert!(list.vms[0].list.is_empty());
    });
}

#[test]
fn test_stale_own_ack_is_dropped() {
    consensus_state_test(ConsensusConfig::default(), |mut harness| {
        harness.with_fed_servers(&[own_identity(), server_id(1)]);
        let stale = QuillTime::from_millis(T0 - 121_000);
        let mut leader = LeaderSim::new(own_identity(), 0, 0);
        let (ack, msg) = leader.commit(1, stale);

        harness.state.register_ack_pair(ack, msg).unwrap();

        let list = harness.state.get(0).unwrap();
        assert!(list.vms[0].list.is_empty());
    });
}

#[test]
fn test_own_ack_with_matching_salt_is_admitted() {
    consensus_state_test(ConsensusConfig::default(), |mut harness| {
        harness.with_fed_servers(&[own_identity(), server_id(1)]);
        let ts = now();
        let msg = Message::new(
            MessageBody::Commit {
                entry_hash: quill_hash::Hash::compute_from(b"entry"),
                ec_address: quill_hash::Hash::compute_from(b"address"),
                credits: 1,
            },
            own_identity(),
            0,
            ts,
        );
        let salt_number = harness.state.node.get_salt(ts);
        let ack = Ack::new(
            0,
            0,
            0,
            quill_hash::Hash::compute_from(b"chain start"),
            msg.msg_hash(),
            own_identity(),
            [0u8; 8],
            salt_number,
            ts,
            0,
        );

        harness.state.register_ack_pair(ack, msg).unwrap();

        let list = harness.state.get(0).unwrap();
        assert!(list.vms[0].list[0].is_some());
    });
}

#[test]
#[should_panic(expected = "two leaders are configured with the same identity")]
fn test_own_ack_with_wrong_salt_is_fatal() {
    consensus_state_test(ConsensusConfig::default(), |mut harness| {
        harness.with_fed_servers(&[own_identity(), server_id(1)]);
        let ts = now();
        let msg = Message::new(
            MessageBody::Commit {
                entry_hash: quill_hash::Hash::compute_from(b"entry"),
                ec_address: quill_hash::Hash::compute_from(b"address"),
                credits: 1,
            },
            own_identity(),
            0,
            ts,
        );
        let wrong = harness.state.node.get_salt(ts).wrapping_add(1);
        let ack = Ack::new(
            0,
            0,
            0,
            quill_hash::Hash::compute_from(b"chain start"),
            msg.msg_hash(),
            own_identity(),
            [0u8; 8],
            wrong,
            ts,
            0,
        );

        harness.state.register_ack_pair(ack, msg).unwrap();
    });
}

#[test]
fn test_highest_known_ack_tracks_later_heights() {
    consensus_state_test(ConsensusConfig::default(), |mut harness| {
        harness.with_fed_servers(&[server_id(1), server_id(2)]);
        assert_eq!(harness.state.node.highest_known_ack, 0);

        let mut leader = LeaderSim::new(server_id(1), 0, 2);
        let (ack, msg) = leader.eom(1, now());
        harness.state.register_ack_pair(ack, msg).unwrap();

        assert_eq!(harness.state.node.highest_known_ack, 2);
    });
}

#[test]
fn test_missing_message_request_is_refused() {
    consensus_state_test(ConsensusConfig::default(), |mut harness| {
        harness.with_fed_servers(&[server_id(1), server_id(2)]);
        let msg = Message::missing_message(server_id(1), 0, 0, vec![0], now());
        let ack = Ack::new(
            0,
            0,
            0,
            quill_hash::Hash::compute_from(b"chain start"),
            msg.msg_hash(),
            server_id(1),
            [0u8; 8],
            0,
            now(),
            0,
        );

        harness.state.register_ack_pair(ack, msg).unwrap();

        let list = harness.state.get(0).unwrap();
        assert!(list.vms[0].list.is_empty());
        assert!(harness.outbound().is_empty());
    });
}
