use quill_hash::Hash;
use quill_models::prehash::PreHashMap;
use quill_time::QuillTime;

/// Which dedup space a hash is checked against
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplayKind {
    /// messages admitted into process lists
    Internal,
    /// messages seen on the network
    Network,
}

/// Sliding-window dedup over message repeat-hashes.
///
/// A hash is acceptable when its timestamp falls inside the window around
/// `now` and it was never recorded before. Recorded entries are forgotten
/// once their timestamp leaves the window.
pub struct ReplayFilter {
    window: QuillTime,
    internal: PreHashMap<Hash, QuillTime>,
    network: PreHashMap<Hash, QuillTime>,
    last_prune: QuillTime,
}

impl ReplayFilter {
    pub fn new(window: QuillTime) -> Self {
        ReplayFilter {
            window,
            internal: PreHashMap::default(),
            network: PreHashMap::default(),
            last_prune: QuillTime::ZERO,
        }
    }

    fn map(&self, kind: ReplayKind) -> &PreHashMap<Hash, QuillTime> {
        match kind {
            ReplayKind::Internal => &self.internal,
            ReplayKind::Network => &self.network,
        }
    }

    fn map_mut(&mut self, kind: ReplayKind) -> &mut PreHashMap<Hash, QuillTime> {
        match kind {
            ReplayKind::Internal => &mut self.internal,
            ReplayKind::Network => &mut self.network,
        }
    }

    fn in_window(&self, timestamp: QuillTime, now: QuillTime) -> bool {
        timestamp.abs_diff(now) <= self.window
    }

    /// Whether the hash is new and its timestamp acceptable. Read-only.
    pub fn valid(&self, kind: ReplayKind, hash: Hash, timestamp: QuillTime, now: QuillTime) -> bool {
        self.in_window(timestamp, now) && !self.map(kind).contains_key(&hash)
    }

    /// Record the hash if acceptable; returns whether it was new.
    pub fn is_ts_valid(
        &mut self,
        kind: ReplayKind,
        hash: Hash,
        timestamp: QuillTime,
        now: QuillTime,
    ) -> bool {
        self.prune(now);
        if !self.valid(kind, hash, timestamp, now) {
            return false;
        }
        self.map_mut(kind).insert(hash, timestamp);
        true
    }

    fn prune(&mut self, now: QuillTime) {
        // amortized: a full sweep at most every tenth of the window
        let interval = QuillTime::from_millis(self.window.to_millis() / 10);
        if now.saturating_sub(self.last_prune) < interval {
            return;
        }
        self.last_prune = now;
        let window = self.window;
        self.internal.retain(|_, ts| ts.abs_diff(now) <= window);
        self.network.retain(|_, ts| ts.abs_diff(now) <= window);
    }
}
