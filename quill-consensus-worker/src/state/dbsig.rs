use quill_models::block::DbSig;
use quill_models::server::ServerId;
use quill_models::signature::Signature;

use super::process_list::ProcessList;

impl ProcessList {
    /// Whether a leader already contributed a directory-block signature
    pub fn contains_db_sig(&self, server_id: ServerId) -> bool {
        self.db_signatures
            .iter()
            .any(|dbsig| dbsig.chain_id == server_id)
    }

    /// Collect one leader's signature over the previous directory block.
    ///
    /// At most one signature per federated identity; non-federated signers
    /// are ignored. The VM index is the signer's minute-0 column.
    pub fn add_db_sig(&mut self, server_id: ServerId, signature: Signature) {
        if self.get_fed_server_index(server_id).is_err() || self.contains_db_sig(server_id) {
            // duplicate, or not a federated server
            return;
        }
        let vm_index = match self.get_virtual_servers(0, server_id) {
            Some(vm_index) => vm_index,
            None => return,
        };
        self.db_signatures.push(DbSig {
            chain_id: server_id,
            signature,
            vm_index,
        });
        self.sort_db_sigs();
    }

    fn sort_db_sigs(&mut self) {
        self.db_signatures.sort_by_key(|dbsig| dbsig.vm_index);
    }
}
