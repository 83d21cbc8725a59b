// Copyright (c) 2022 MASSA LABS <info@massa.net>

use parking_lot::RwLock;
use quill_consensus_exports::error::ConsensusError;
use quill_consensus_exports::export::{ProcessListExport, VmExport};
use quill_hash::Hash;
use quill_models::ack::Ack;
use quill_models::block::{AdminBlock, DbSig, DirectoryBlock, EntryCreditBlock};
use quill_models::config::{MAX_VMS, MINUTES_PER_BLOCK};
use quill_models::message::{Message, MessageKind};
use quill_models::prehash::PreHashMap;
use quill_models::server::{sort_servers, Server, ServerId};
use quill_time::QuillTime;

use super::vm::Vm;

/// The consensus state for one directory-block height.
///
/// Holds the per-leader VMs, the membership view, the blocks under
/// construction and the look-aside maps used for dedup while the block is
/// open. The hash-keyed maps each carry their own lock; when more than one is
/// taken, acquire in lexicographic order of the field name, and never hold
/// one across message execution or a broadcast send.
pub struct ProcessList {
    /// directory block height, immutable after creation
    pub db_height: u32,
    pub(crate) vms: Vec<Vm>,
    /// system-wide fault entries, ordered but never acknowledged
    pub(crate) system: Vm,
    pub(crate) server_map: [[usize; MAX_VMS]; MINUTES_PER_BLOCK],
    pub(crate) fed_servers: Vec<Server>,
    pub(crate) audit_servers: Vec<Server>,
    pub(crate) starting_fed_servers: Vec<Server>,
    pub(crate) starting_audit_servers: Vec<Server>,
    pub(crate) directory_block: DirectoryBlock,
    pub(crate) admin_block: AdminBlock,
    pub(crate) entry_credit_block: EntryCreditBlock,
    pub(crate) db_signatures: Vec<DbSig>,
    pub(crate) old_msgs: RwLock<PreHashMap<Hash, Message>>,
    pub(crate) old_acks: RwLock<PreHashMap<Hash, Ack>>,
    pub(crate) new_eblocks: RwLock<PreHashMap<Hash, Hash>>,
    pub(crate) new_entries: RwLock<PreHashMap<Hash, Hash>>,
    pub(crate) pending_chain_heads: RwLock<PreHashMap<Hash, Hash>>,
    pub(crate) factoid_balances_t: RwLock<PreHashMap<Hash, i64>>,
    pub(crate) ec_balances_t: RwLock<PreHashMap<Hash, i64>>,
    pub(crate) diff_sig_tally: i32,
    pub(crate) completion_notified: bool,
}

impl ProcessList {
    /// Build the process list for `db_height` from the one before it.
    ///
    /// Membership is carried forward: federated servers come back online,
    /// audit servers start offline except ourselves. Without a predecessor
    /// the list opens with our own identity as the only federated server.
    pub fn new(
        previous: Option<&ProcessList>,
        db_height: u32,
        identity: ServerId,
    ) -> Result<Self, ConsensusError> {
        let mut fed_servers = Vec::new();
        let mut audit_servers = Vec::new();

        if let Some(prev) = previous {
            fed_servers.extend(prev.fed_servers.iter().cloned());
            audit_servers.extend(prev.audit_servers.iter().cloned());
            for audit in audit_servers.iter_mut() {
                // always consider yourself online
                audit.set_online(audit.chain_id == identity);
            }
            for fed in fed_servers.iter_mut() {
                fed.set_online(true);
            }
            sort_servers(&mut fed_servers);
        } else {
            fed_servers.push(Server::new(identity));
        }

        let (directory_block, admin_block, entry_credit_block) = match previous {
            Some(prev) => (
                DirectoryBlock::new(Some(&prev.directory_block)),
                AdminBlock::new(Some(&prev.admin_block)),
                EntryCreditBlock::next(Some(&prev.entry_credit_block))?,
            ),
            None => (
                DirectoryBlock::new(None),
                AdminBlock::new(None),
                EntryCreditBlock::next(None)?,
            ),
        };

        let mut pl = ProcessList {
            db_height,
            vms: (0..MAX_VMS).map(|_| Vm::new()).collect(),
            system: Vm::new(),
            server_map: [[0; MAX_VMS]; MINUTES_PER_BLOCK],
            starting_fed_servers: fed_servers.clone(),
            starting_audit_servers: audit_servers.clone(),
            fed_servers,
            audit_servers,
            directory_block,
            admin_block,
            entry_credit_block,
            db_signatures: Vec::new(),
            old_msgs: RwLock::new(PreHashMap::default()),
            old_acks: RwLock::new(PreHashMap::default()),
            new_eblocks: RwLock::new(PreHashMap::default()),
            new_entries: RwLock::new(PreHashMap::default()),
            pending_chain_heads: RwLock::new(PreHashMap::default()),
            factoid_balances_t: RwLock::new(PreHashMap::default()),
            ec_balances_t: RwLock::new(PreHashMap::default()),
            diff_sig_tally: 0,
            completion_notified: false,
        };
        pl.make_map();
        Ok(pl)
    }

    /// federated servers, ascending by chain id
    pub fn fed_servers(&self) -> &[Server] {
        &self.fed_servers
    }

    /// audit servers, ascending by chain id
    pub fn audit_servers(&self) -> &[Server] {
        &self.audit_servers
    }

    /// membership snapshot taken when the block opened
    pub fn starting_fed_servers(&self) -> &[Server] {
        &self.starting_fed_servers
    }

    /// membership snapshot taken when the block opened
    pub fn starting_audit_servers(&self) -> &[Server] {
        &self.starting_audit_servers
    }

    /// directory-block signatures collected so far, ascending by VM index
    pub fn db_signatures(&self) -> &[DbSig] {
        &self.db_signatures
    }

    /// True once every active VM closed minute 10 and processed its list
    pub fn complete(&self) -> bool {
        for vm in self.vms.iter().take(self.fed_servers.len()) {
            if vm.leader_minute < MINUTES_PER_BLOCK {
                return false;
            }
            if vm.height < vm.list.len() {
                return false;
            }
        }
        true
    }

    /// Whether any active VM admitted at least one entry
    pub fn has_message(&self) -> bool {
        self.vms
            .iter()
            .take(self.fed_servers.len())
            .any(|vm| !vm.list.is_empty())
    }

    /// Acknowledgement at the given VM's processed height
    pub fn get_ack(&self, vm_index: usize) -> Option<&Ack> {
        self.get_ack_at(vm_index, self.vms.get(vm_index)?.height)
    }

    /// Acknowledgement at an arbitrary height of a VM
    pub fn get_ack_at(&self, vm_index: usize, height: usize) -> Option<&Ack> {
        self.vms.get(vm_index)?.list_ack.get(height)?.as_ref()
    }

    /// Timestamp of the first directory-block signature in VM 0, if any
    pub fn leader_timestamp(&self) -> Option<QuillTime> {
        self.vms.first()?.list.iter().flatten().find_map(|msg| {
            (msg.kind() == MessageKind::DirectoryBlockSignature).then(|| msg.timestamp())
        })
    }

    /// Drop the tail of a VM list.
    // The guard fires when the list is NOT longer than `height`; kept as
    // shipped, `fixed-trim-guard` flips it to the expected direction.
    pub fn trim_vm_list(&mut self, height: u32, vm_index: usize) {
        let vm = match self.vms.get_mut(vm_index) {
            Some(vm) => vm,
            None => return,
        };
        #[cfg(not(feature = "fixed-trim-guard"))]
        let should_trim = vm.list.len() as u32 <= height;
        #[cfg(feature = "fixed-trim-guard")]
        let should_trim = vm.list.len() as u32 > height;
        if should_trim {
            vm.list.truncate(height as usize);
            vm.list_ack.truncate(height as usize);
        }
    }

    /// Rebuild hook. Returns immediately; rebuilds are driven through
    /// `NeedReset` events until per-list reset semantics are settled.
    pub fn reset(&mut self) -> bool {
        true
    }

    /// Stage a full-server fault statement in the system list, ordered by
    /// its system height. Anything else is refused.
    pub fn add_to_system_list(&mut self, msg: Message) -> bool {
        let system_height = match &msg.body {
            quill_models::message::MessageBody::FullServerFault { system_height, .. } => {
                *system_height as usize
            }
            _ => return false,
        };
        if system_height < self.system.height {
            return false;
        }
        self.system.grow_to(system_height);
        if self.system.list[system_height].is_some() {
            return false;
        }
        self.system.list[system_height] = Some(msg);
        true
    }

    pub fn reset_diff_sig_tally(&mut self) {
        self.diff_sig_tally = 0;
    }

    /// One more peer disagreed with our saved previous-block signature
    pub fn increment_diff_sig_tally(&mut self) {
        self.diff_sig_tally += 1;
    }

    /// False once a majority of leaders disagree with our saved block; the
    /// caller decides what to discard.
    pub fn check_diff_sig_tally(&self) -> bool {
        !(self.diff_sig_tally > 0 && self.diff_sig_tally > (self.fed_servers.len() / 2) as i32)
    }

    pub fn add_old_msg(&mut self, msg: Message) {
        self.old_msgs.write().insert(msg.hash(), msg);
    }

    pub fn get_old_msg(&self, key: Hash) -> Option<Message> {
        self.old_msgs.read().get(&key).cloned()
    }

    pub fn delete_old_msg(&mut self, key: Hash) {
        self.old_msgs.write().remove(&key);
    }

    pub fn add_old_ack(&mut self, key: Hash, ack: Ack) {
        self.old_acks.write().insert(key, ack);
    }

    pub fn get_old_ack(&self, key: Hash) -> Option<Ack> {
        self.old_acks.read().get(&key).cloned()
    }

    pub fn add_new_eblock(&mut self, chain_id: Hash, key_mr: Hash) {
        self.new_eblocks.write().insert(chain_id, key_mr);
    }

    pub fn get_new_eblock(&self, chain_id: Hash) -> Option<Hash> {
        self.new_eblocks.read().get(&chain_id).copied()
    }

    pub fn delete_new_eblock(&mut self, chain_id: Hash) {
        self.new_eblocks.write().remove(&chain_id);
    }

    pub fn add_new_entry(&mut self, entry_hash: Hash, chain_id: Hash) {
        self.new_entries.write().insert(entry_hash, chain_id);
    }

    pub fn get_new_entry(&self, entry_hash: Hash) -> Option<Hash> {
        self.new_entries.read().get(&entry_hash).copied()
    }

    pub fn delete_new_entry(&mut self, entry_hash: Hash) {
        self.new_entries.write().remove(&entry_hash);
    }

    pub fn keys_new_entries(&self) -> Vec<Hash> {
        self.new_entries.read().keys().copied().collect()
    }

    pub fn len_new_entries(&self) -> usize {
        self.new_entries.read().len()
    }

    /// Latest staged entry per chain, if any
    pub fn pending_chain_head(&self, chain_id: Hash) -> Option<Hash> {
        self.pending_chain_heads.read().get(&chain_id).copied()
    }

    /// Apply a tentative factoid balance delta
    pub fn update_factoid_balance(&mut self, address: Hash, delta: i64) {
        *self.factoid_balances_t.write().entry(address).or_insert(0) += delta;
    }

    /// Tentative factoid balance delta for an address
    pub fn factoid_balance(&self, address: Hash) -> i64 {
        self.factoid_balances_t
            .read()
            .get(&address)
            .copied()
            .unwrap_or(0)
    }

    /// Apply a tentative entry-credit balance delta
    pub fn update_ec_balance(&mut self, address: Hash, delta: i64) {
        *self.ec_balances_t.write().entry(address).or_insert(0) += delta;
    }

    /// Tentative entry-credit balance delta for an address
    pub fn ec_balance(&self, address: Hash) -> i64 {
        self.ec_balances_t.read().get(&address).copied().unwrap_or(0)
    }

    /// Read-only snapshot for tooling and the API layer
    pub fn export(&self) -> ProcessListExport {
        ProcessListExport {
            db_height: self.db_height,
            fed_servers: self.fed_servers.clone(),
            audit_servers: self.audit_servers.clone(),
            vms: self
                .vms
                .iter()
                .take(self.fed_servers.len())
                .map(|vm| VmExport {
                    height: vm.height,
                    list_len: vm.list.len(),
                    leader_minute: vm.leader_minute,
                    synced: vm.synced,
                    signed: vm.signed,
                })
                .collect(),
            db_signature_count: self.db_signatures.len(),
            complete: self.complete(),
        }
    }
}

impl std::fmt::Display for ProcessList {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        writeln!(f, "===ProcessListStart===")?;
        writeln!(
            f,
            "#VMs {} Complete {} DBHeight {}",
            self.fed_servers.len(),
            self.complete(),
            self.db_height
        )?;
        for (i, vm) in self.vms.iter().take(self.fed_servers.len()).enumerate() {
            writeln!(
                f,
                "  VM {}  vMin {} vHeight {} len(List) {} Synced {}",
                i,
                vm.leader_minute,
                vm.height,
                vm.list.len(),
                vm.synced
            )?;
            for (j, slot) in vm.list.iter().enumerate() {
                let marker = if j < vm.height { " P" } else { "  " };
                match slot {
                    Some(msg) => writeln!(f, "   {:3}{}   {}", j, marker, msg)?,
                    None => writeln!(f, "   {:3}{}   <nil>", j, marker)?,
                }
            }
        }
        writeln!(f, "===FederatedServersStart=== {}", self.fed_servers.len())?;
        for fed in &self.fed_servers {
            let flag = if fed.online { "" } else { " F" };
            writeln!(f, "    {}{}", fed.chain_id, flag)?;
        }
        writeln!(f, "===FederatedServersEnd=== {}", self.fed_servers.len())?;
        writeln!(f, "===AuditServersStart=== {}", self.audit_servers.len())?;
        for aud in &self.audit_servers {
            let state = if aud.online { " online" } else { " offline" };
            writeln!(f, "    {}{}", aud.chain_id, state)?;
        }
        writeln!(f, "===AuditServersEnd=== {}", self.audit_servers.len())?;
        writeln!(f, "===ProcessListEnd=== {}", self.db_height)
    }
}
