use quill_consensus_exports::ConsensusConfig;
use quill_hash::Hash;
use quill_models::config::{MINUTES_PER_BLOCK, SERVER_MAP_HEIGHT_MULTIPLIER};
use quill_models::server::{Server, ServerId};

use super::process_list::ProcessList;

impl ProcessList {
    /// Rebuild the minute → federated-server rotation.
    ///
    /// Pure in `(fed_servers.len(), db_height)` so two nodes at the same
    /// height derive the same table. This is the hook where a
    /// matryoshka-hash-based assignment will later be substituted; keep it
    /// free of side effects.
    pub(crate) fn make_map(&mut self) {
        let n = self.fed_servers.len();
        if n > 0 {
            let mut indx = (self.db_height.wrapping_mul(SERVER_MAP_HEIGHT_MULTIPLIER) as usize) % n;
            for minute in 0..MINUTES_PER_BLOCK {
                indx = (indx + 1) % n;
                for column in 0..n {
                    self.server_map[minute][column] = indx;
                    indx = (indx + 1) % n;
                }
            }
        }
    }

    /// The VM index owning entries keyed by `hash`.
    ///
    /// Independent of minute and endianness: the byte sum of the hash modulo
    /// the federation size. Single-leader networks route everything to VM 0.
    pub fn vm_index_for(&self, config: &ConsensusConfig, hash: &Hash) -> usize {
        if config.one_leader {
            return 0;
        }
        let v: u64 = hash.to_bytes().iter().map(|b| *b as u64).sum();
        (v % self.fed_servers.len() as u64) as usize
    }

    /// The federated server responsible for `hash` in the given minute
    pub fn fed_server_for(
        &self,
        config: &ConsensusConfig,
        minute: usize,
        hash: &Hash,
    ) -> Option<&Server> {
        let vs = self.vm_index_for(config, hash);
        let fed_index = *self.server_map.get(minute)?.get(vs)?;
        self.fed_servers.get(fed_index)
    }

    /// The column (VM index) a federated identity occupies in the given
    /// minute, or `None` if the identity is not federated.
    pub fn get_virtual_servers(&self, minute: usize, identity: ServerId) -> Option<usize> {
        let fed_index = self.get_fed_server_index(identity).ok()?;
        let row = self.server_map.get(minute)?;
        (0..self.fed_servers.len()).find(|&column| row[column] == fed_index)
    }

    /// Render the minute map, one row per minute
    pub fn format_map(&self) -> String {
        let n = self.fed_servers.len();
        let mut out = format!("===MinuteMapStart=== {}\n", self.db_height);
        for (minute, row) in self.server_map.iter().enumerate() {
            out.push_str(&format!("{:3}  ", minute));
            for column in row.iter().take(n) {
                out.push_str(&format!("{:2} ", column));
            }
            out.push('\n');
        }
        out.push_str(&format!("===MinuteMapEnd=== {}\n", self.db_height));
        out
    }
}
