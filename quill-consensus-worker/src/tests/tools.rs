use quill_channel::{channel, QuillReceiver};
use quill_consensus_exports::elections::ElectionsMessage;
use quill_consensus_exports::events::ConsensusEvent;
use quill_consensus_exports::{ConsensusChannels, ConsensusConfig, OutboundItem};
use quill_hash::Hash;
use quill_models::ack::Ack;
use quill_models::message::{Message, MessageBody};
use quill_models::server::ServerId;
use quill_time::QuillTime;

use crate::state::{ConsensusState, NodeContext};

/// Deterministic start instant for every harness
pub const T0: u64 = 1_000_000_000;

pub fn server_id(seed: u8) -> ServerId {
    ServerId(Hash::compute_from(&[seed]))
}

/// The identity the harness node runs under
pub fn own_identity() -> ServerId {
    server_id(200)
}

pub struct TestHarness {
    pub state: ConsensusState,
    pub elections_rx: QuillReceiver<ElectionsMessage>,
    pub outbound_rx: QuillReceiver<OutboundItem>,
    pub event_rx: QuillReceiver<ConsensusEvent>,
}

impl TestHarness {
    /// Advance the shared time snapshot by `millis`
    pub fn tick(&mut self, millis: u64) {
        self.state.node.now = self
            .state
            .node
            .now
            .saturating_add(QuillTime::from_millis(millis));
    }

    /// Throw away everything queued on the captured channels
    pub fn drain(&self) {
        while self.elections_rx.try_recv().is_ok() {}
        while self.outbound_rx.try_recv().is_ok() {}
        while self.event_rx.try_recv().is_ok() {}
    }

    /// Outbound items queued since the last drain
    pub fn outbound(&self) -> Vec<OutboundItem> {
        let mut items = Vec::new();
        while let Ok(item) = self.outbound_rx.try_recv() {
            items.push(item);
        }
        items
    }

    /// Elections messages queued since the last drain
    pub fn elections(&self) -> Vec<ElectionsMessage> {
        let mut items = Vec::new();
        while let Ok(item) = self.elections_rx.try_recv() {
            items.push(item);
        }
        items
    }

    /// Replace the federated set of the list at height 0 with `ids`
    pub fn with_fed_servers(&mut self, ids: &[ServerId]) {
        for id in ids {
            self.state.add_fed_server(0, *id).unwrap();
        }
        let me = self.state.node.identity_chain_id;
        if !ids.contains(&me) {
            self.state.remove_fed_server(0, me).unwrap();
        }
        self.drain();
    }
}

/// Run a test against a fresh in-memory consensus state.
pub fn consensus_state_test<F>(config: ConsensusConfig, test: F)
where
    F: FnOnce(TestHarness),
{
    let (elections_tx, elections_rx) = channel("test_elections", None);
    let (outbound_tx, outbound_rx) = channel("test_outbound", None);
    let (controller_event_tx, event_rx) = channel("test_events", None);
    let channels = ConsensusChannels {
        elections_tx,
        outbound_tx,
        controller_event_tx,
    };

    let mut node = NodeContext::new(
        "test-node".to_string(),
        own_identity(),
        Hash::compute_from(b"instance salt"),
        config.replay_window,
    );
    node.now = QuillTime::from_millis(T0);

    let state = ConsensusState::new(config, channels, node, 0).unwrap();
    test(TestHarness {
        state,
        elections_rx,
        outbound_rx,
        event_rx,
    });
}

/// Emulates one leader issuing a serial-hash-chained stream of
/// acknowledged messages for a single VM.
pub struct LeaderSim {
    pub leader: ServerId,
    pub vm_index: usize,
    pub db_height: u32,
    next_height: u32,
    last_message_hash: Option<Hash>,
}

impl LeaderSim {
    pub fn new(leader: ServerId, vm_index: usize, db_height: u32) -> Self {
        LeaderSim {
            leader,
            vm_index,
            db_height,
            next_height: 0,
            last_message_hash: None,
        }
    }

    /// Issue the next `(ack, message)` pair in the chain
    pub fn ack_pair(&mut self, body: MessageBody, minute: u8, ts: QuillTime) -> (Ack, Message) {
        let msg = Message::new(body, self.leader, minute, ts);
        let serial = match self.last_message_hash {
            // the first slot's serial hash is taken on trust
            None => Hash::compute_from(b"chain start"),
            Some(prev) => Hash::compute_from_tuple(&prev, &msg.msg_hash()),
        };
        let ack = Ack::new(
            self.vm_index,
            self.db_height,
            self.next_height,
            serial,
            msg.msg_hash(),
            self.leader,
            [0u8; 8],
            0,
            ts,
            minute,
        );
        self.last_message_hash = Some(msg.msg_hash());
        self.next_height += 1;
        (ack, msg)
    }

    /// Next pair carrying an end-of-minute marker
    pub fn eom(&mut self, minute: u8, ts: QuillTime) -> (Ack, Message) {
        self.ack_pair(
            MessageBody::EndOfMinute {
                db_height: self.db_height,
                minute,
            },
            minute,
            ts,
        )
    }

    /// Next pair carrying an entry-credit commit; `seed` keeps them distinct
    pub fn commit(&mut self, seed: u8, ts: QuillTime) -> (Ack, Message) {
        self.ack_pair(
            MessageBody::Commit {
                entry_hash: Hash::compute_from(&[b'e', seed]),
                ec_address: Hash::compute_from(&[b'a', seed]),
                credits: 1,
            },
            0,
            ts,
        )
    }
}
