use quill_consensus_exports::elections::ElectionsMessage;
use quill_consensus_exports::ConsensusChannels;
use quill_models::config::MAX_VMS;
use quill_models::server::{sort_servers, Server, ServerId};
use tracing::warn;

use super::node::NodeContext;
use super::process_list::ProcessList;

impl ProcessList {
    /// Index of a federated identity, or the insertion point keeping the
    /// list sorted by chain id bytes
    pub fn get_fed_server_index(&self, identity: ServerId) -> Result<usize, usize> {
        self.fed_servers
            .binary_search_by(|server| server.chain_id.to_bytes().cmp(identity.to_bytes()))
    }

    /// Index of an audit identity, or the insertion point keeping the list
    /// sorted by chain id bytes
    pub fn get_audit_server_index(&self, identity: ServerId) -> Result<usize, usize> {
        self.audit_servers
            .binary_search_by(|server| server.chain_id.to_bytes().cmp(identity.to_bytes()))
    }

    /// Add an identity to the federated set, promoting it out of the audit
    /// set if needed, and return its federated index.
    pub fn add_fed_server(
        &mut self,
        node: &NodeContext,
        channels: &ConsensusChannels,
        identity: ServerId,
    ) -> usize {
        sort_servers(&mut self.fed_servers);
        let insert_at = match self.get_fed_server_index(identity) {
            Ok(existing) => return existing,
            Err(insert_at) => insert_at,
        };
        // every federated server needs a VM slot
        if self.fed_servers.len() >= MAX_VMS {
            warn!("federated set is full, refusing to add {}", identity);
            return insert_at;
        }
        // an audit server gets promoted
        if self.get_audit_server_index(identity).is_ok() {
            self.remove_audit_server_hash(node, channels, identity);
        }
        self.fed_servers.insert(insert_at, Server::new(identity));
        if let Err(err) = channels.elections_tx.send(ElectionsMessage::AddLeader {
            node: node.name.clone(),
            db_height: self.db_height,
            chain_id: identity,
        }) {
            warn!("channel error notifying elections of a new leader: {}", err);
        }

        self.make_map();

        insert_at
    }

    /// Add an identity to the audit set, demoting it out of the federated
    /// set if needed, and return its audit index.
    ///
    /// Audit servers take no minute slots, so the minute map stays as is.
    pub fn add_audit_server(
        &mut self,
        node: &NodeContext,
        channels: &ConsensusChannels,
        identity: ServerId,
    ) -> usize {
        let insert_at = match self.get_audit_server_index(identity) {
            Ok(existing) => return existing,
            Err(insert_at) => insert_at,
        };
        // a fed server gets demoted
        if self.get_fed_server_index(identity).is_ok() {
            self.remove_fed_server_hash(node, channels, identity);
        }
        self.audit_servers.insert(insert_at, Server::new(identity));
        if let Err(err) = channels.elections_tx.send(ElectionsMessage::AddAudit {
            node: node.name.clone(),
            db_height: self.db_height,
            chain_id: identity,
        }) {
            warn!(
                "channel error notifying elections of a new audit server: {}",
                err
            );
        }

        insert_at
    }

    /// Remove an identity from the federated set. Unknown federated ids fall
    /// through to an audit removal attempt.
    pub fn remove_fed_server_hash(
        &mut self,
        node: &NodeContext,
        channels: &ConsensusChannels,
        identity: ServerId,
    ) {
        let index = match self.get_fed_server_index(identity) {
            Ok(index) => index,
            Err(_) => {
                self.remove_audit_server_hash(node, channels, identity);
                return;
            }
        };
        self.fed_servers.remove(index);
        if let Err(err) = channels.elections_tx.send(ElectionsMessage::RemoveLeader {
            node: node.name.clone(),
            db_height: self.db_height,
            chain_id: identity,
        }) {
            warn!(
                "channel error notifying elections of a removed leader: {}",
                err
            );
        }
        self.make_map();
    }

    /// Remove an identity from the audit set; unknown ids are a no-op.
    pub fn remove_audit_server_hash(
        &mut self,
        node: &NodeContext,
        channels: &ConsensusChannels,
        identity: ServerId,
    ) {
        let index = match self.get_audit_server_index(identity) {
            Ok(index) => index,
            Err(_) => return,
        };
        self.audit_servers.remove(index);
        if let Err(err) = channels.elections_tx.send(ElectionsMessage::RemoveAudit {
            node: node.name.clone(),
            db_height: self.db_height,
            chain_id: identity,
        }) {
            warn!(
                "channel error notifying elections of a removed audit server: {}",
                err
            );
        }
    }
}
