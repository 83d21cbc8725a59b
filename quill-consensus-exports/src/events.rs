/// Events that are emitted by the consensus worker.
#[derive(Debug, Clone)]
pub enum ConsensusEvent {
    /// every active VM of the list at this height closed minute 10
    ListComplete(u32),
    /// a serial-hash conflict was detected, in-memory state must be rebuilt
    NeedReset,
}
