use quill_consensus_exports::elections::ElectionsMessage;
use quill_consensus_exports::ConsensusConfig;
use quill_models::server::ServerId;

use super::tools::{consensus_state_test, server_id};

fn fed_ids(harness: &super::tools::TestHarness) -> Vec<ServerId> {
    harness
        .state
        .get(0)
        .unwrap()
        .fed_servers()
        .iter()
        .map(|s| s.chain_id)
        .collect()
}

fn audit_ids(harness: &super::tools::TestHarness) -> Vec<ServerId> {
    harness
        .state
        .get(0)
        .unwrap()
        .audit_servers()
        .iter()
        .map(|s| s.chain_id)
        .collect()
}

fn assert_sorted_and_disjoint(harness: &super::tools::TestHarness) {
    let fed = fed_ids(harness);
    let audit = audit_ids(harness);
    for w in fed.windows(2) {
        assert!(w[0].to_bytes() < w[1].to_bytes(), "fed servers out of order");
    }
    for w in audit.windows(2) {
        assert!(
            w[0].to_bytes() < w[1].to_bytes(),
            "audit servers out of order"
        );
    }
    for id in &fed {
        assert!(!audit.contains(id), "{} is in both sets", id);
    }
}

#[test]
fn test_promote_audit_server() {
    consensus_state_test(ConsensusConfig::default(), |mut harness| {
        harness.with_fed_servers(&[server_id(1), server_id(2)]);
        let promoted = server_id(9);
        harness.state.add_audit_server(0, promoted).unwrap();
        harness.drain();

        harness.state.add_fed_server(0, promoted).unwrap();

        assert!(audit_ids(&harness).is_empty());
        assert!(fed_ids(&harness).contains(&promoted));

        let notices = harness.elections();
        assert_eq!(notices.len(), 2);
        assert!(matches!(
            notices[0],
            ElectionsMessage::RemoveAudit { chain_id, .. } if chain_id == promoted
        ));
        assert!(matches!(
            notices[1],
            ElectionsMessage::AddLeader { chain_id, .. } if chain_id == promoted
        ));

        // the rotation was rebuilt for the grown federation
        let list = harness.state.get(0).unwrap();
        let n = list.fed_servers().len();
        for row in &list.server_map {
            for column in row.iter().take(n) {
                assert!(*column < n);
            }
        }
        assert_sorted_and_disjoint(&harness);
    });
}

#[test]
fn test_demote_fed_server() {
    consensus_state_test(ConsensusConfig::default(), |mut harness| {
        harness.with_fed_servers(&[server_id(1), server_id(2), server_id(3)]);
        let demoted = server_id(2);

        harness.state.add_audit_server(0, demoted).unwrap();

        assert!(!fed_ids(&harness).contains(&demoted));
        assert_eq!(audit_ids(&harness), vec![demoted]);

        let notices = harness.elections();
        assert_eq!(notices.len(), 2);
        assert!(matches!(
            notices[0],
            ElectionsMessage::RemoveLeader { chain_id, .. } if chain_id == demoted
        ));
        assert!(matches!(
            notices[1],
            ElectionsMessage::AddAudit { chain_id, .. } if chain_id == demoted
        ));
        assert_sorted_and_disjoint(&harness);
    });
}

#[test]
fn test_promote_demote_round_trip() {
    consensus_state_test(ConsensusConfig::default(), |mut harness| {
        harness.with_fed_servers(&[server_id(1), server_id(2)]);
        let fed_before = fed_ids(&harness);
        let audit_before = audit_ids(&harness);

        let id = server_id(7);
        harness.state.add_fed_server(0, id).unwrap();
        harness.state.remove_fed_server(0, id).unwrap();
        harness.state.add_audit_server(0, id).unwrap();
        harness.state.remove_audit_server(0, id).unwrap();

        assert_eq!(fed_before, fed_ids(&harness));
        assert_eq!(audit_before, audit_ids(&harness));
        assert_sorted_and_disjoint(&harness);
    });
}

#[test]
fn test_add_is_idempotent_and_last_set_wins() {
    consensus_state_test(ConsensusConfig::default(), |mut harness| {
        harness.with_fed_servers(&[server_id(1)]);
        let id = server_id(5);

        // fed then audit leaves the identity in audit only
        harness.state.add_fed_server(0, id).unwrap();
        harness.state.add_fed_server(0, id).unwrap();
        assert_eq!(fed_ids(&harness).iter().filter(|x| **x == id).count(), 1);

        harness.state.add_audit_server(0, id).unwrap();
        assert!(!fed_ids(&harness).contains(&id));
        assert_eq!(audit_ids(&harness), vec![id]);

        // and back again: audit then fed leaves it in fed only
        harness.state.add_fed_server(0, id).unwrap();
        assert!(fed_ids(&harness).contains(&id));
        assert!(audit_ids(&harness).is_empty());
        assert_sorted_and_disjoint(&harness);
    });
}

#[test]
fn test_remove_unknown_id_is_noop() {
    consensus_state_test(ConsensusConfig::default(), |mut harness| {
        harness.with_fed_servers(&[server_id(1), server_id(2)]);
        let fed_before = fed_ids(&harness);

        harness.state.remove_fed_server(0, server_id(42)).unwrap();
        harness.state.remove_audit_server(0, server_id(42)).unwrap();

        assert_eq!(fed_before, fed_ids(&harness));
        assert!(audit_ids(&harness).is_empty());
        assert!(harness.elections().is_empty());
    });
}
