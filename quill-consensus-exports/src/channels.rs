use quill_channel::QuillSender;
use quill_models::ack::Ack;
use quill_models::message::Message;

use crate::elections::ElectionsMessage;
use crate::events::ConsensusEvent;

/// One item on its way to the peer network.
///
/// Admission re-broadcasts the message before its acknowledgement: peers
/// that see an ack for an unknown message immediately ask for it.
#[derive(Debug, Clone)]
#[allow(clippy::large_enum_variant)]
pub enum OutboundItem {
    /// a leader-authored message
    Message(Message),
    /// an acknowledgement
    Ack(Ack),
}

/// Contains links to other modules of the node to be able to interact with them.
#[derive(Clone)]
pub struct ConsensusChannels {
    /// Queue feeding the elections subsystem
    pub elections_tx: QuillSender<ElectionsMessage>,
    /// Fire-and-forget broadcast towards the peer pump
    pub outbound_tx: QuillSender<OutboundItem>,
    /// Channel used by the consensus to send events to the node globally
    pub controller_event_tx: QuillSender<ConsensusEvent>,
}
