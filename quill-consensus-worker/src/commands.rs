use quill_models::ack::Ack;
use quill_models::message::Message;
use quill_models::server::ServerId;

#[allow(clippy::large_enum_variant)]
#[derive(Clone)]
pub enum ConsensusCommand {
    RegisterAckPair(Box<Ack>, Box<Message>),
    AddFedServer(u32, ServerId),
    AddAuditServer(u32, ServerId),
    RemoveFedServer(u32, ServerId),
    RemoveAuditServer(u32, ServerId),
    SetSyncWindow(bool),
    SetHighestSavedBlock(u32),
    SetEntryHeightComplete(u32),
    Stop,
}
