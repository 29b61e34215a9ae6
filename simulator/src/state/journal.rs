use tracing::debug;

use super::{
    nullifiers::{DuplicateNullifier, NullifierCache, Nullifiers},
    public_storage::{PublicStorage, PublicStorageCache},
    trace::WorldStateAccessTrace,
    HostStorage,
};
use crate::Fr;

/// Owned state a finished frame hands back to its caller.
#[derive(Debug, Clone, Default)]
pub struct JournalState {
    pub public_storage: PublicStorageCache,
    pub nullifiers: NullifierCache,
    pub trace: WorldStateAccessTrace,
}

/// The world-state view of one call frame: host reads, buffered writes and
/// pending nullifiers, all recorded in the access trace.
pub struct WorldStateJournal<'a> {
    host: &'a dyn HostStorage,
    public_storage: PublicStorage<'a>,
    nullifiers: Nullifiers<'a>,
    trace: WorldStateAccessTrace,
}

impl<'a> WorldStateJournal<'a> {
    /// Journal of a transaction's root, starting at counter zero.
    pub fn new(host: &'a dyn HostStorage) -> Self {
        Self {
            host,
            public_storage: PublicStorage::new(host),
            nullifiers: Nullifiers::new(host),
            trace: WorldStateAccessTrace::new(0),
        }
    }

    /// Journal for a nested call. Reads see this journal's uncommitted
    /// state; the trace continues from this journal's counter.
    pub fn fork(&self) -> WorldStateJournal<'_> {
        WorldStateJournal {
            host: self.host,
            public_storage: self.public_storage.fork(),
            nullifiers: self.nullifiers.fork(),
            trace: WorldStateAccessTrace::new(self.trace.access_counter()),
        }
    }

    pub fn into_state(self) -> JournalState {
        JournalState {
            public_storage: self.public_storage.into_cache(),
            nullifiers: self.nullifiers.into_cache(),
            trace: self.trace,
        }
    }

    /// Merges a finished nested call. Buffered writes are adopted only if it
    /// did not revert; its access history is adopted either way.
    pub fn accept_nested_call_state(&mut self, state: JournalState, reverted: bool) {
        debug!(reverted, "merging nested call state");
        self.trace.merge(state.trace, reverted);
        if !reverted {
            self.public_storage.accept_and_merge(state.public_storage);
            self.nullifiers.accept_and_merge(state.nullifiers);
        }
    }

    pub fn host(&self) -> &'a dyn HostStorage {
        self.host
    }

    pub fn trace(&self) -> &WorldStateAccessTrace {
        &self.trace
    }

    pub fn public_storage(&self) -> &PublicStorage<'a> {
        &self.public_storage
    }

    pub fn read_storage(&mut self, storage_address: Fr, slot: Fr) -> Fr {
        let read = self.public_storage.read(storage_address, slot);
        debug!(%storage_address, %slot, value = %read.value, exists = read.exists, "storage read");
        self.trace.trace_public_storage_read(
            storage_address,
            slot,
            read.value,
            read.exists,
            read.cached,
        );
        read.value
    }

    pub fn write_storage(&mut self, storage_address: Fr, slot: Fr, value: Fr) {
        debug!(%storage_address, %slot, %value, "storage write");
        self.public_storage.write(storage_address, slot, value);
        self.trace
            .trace_public_storage_write(storage_address, slot, value);
    }

    /// `leaf_index` is `None` when the operand does not fit a tree index, in
    /// which case the note hash cannot exist there.
    pub fn check_note_hash_exists(
        &mut self,
        storage_address: Fr,
        note_hash: Fr,
        leaf_index: Fr,
        leaf_index_u64: Option<u64>,
    ) -> bool {
        let exists = leaf_index_u64
            .is_some_and(|index| self.host.note_hash_exists(storage_address, note_hash, index));
        debug!(%note_hash, %leaf_index, exists, "note hash check");
        self.trace
            .trace_note_hash_check(storage_address, note_hash, leaf_index, exists);
        exists
    }

    pub fn write_note_hash(&mut self, storage_address: Fr, note_hash: Fr) {
        debug!(%note_hash, "new note hash");
        self.trace.trace_new_note_hash(storage_address, note_hash);
    }

    pub fn check_nullifier_exists(&mut self, storage_address: Fr, nullifier: Fr) -> bool {
        let check = self.nullifiers.check_exists(storage_address, nullifier);
        debug!(%nullifier, exists = check.exists, is_pending = check.is_pending, "nullifier check");
        self.trace.trace_nullifier_check(
            storage_address,
            nullifier,
            check.exists,
            check.is_pending,
            check.leaf_index,
        );
        check.exists
    }

    pub fn write_nullifier(
        &mut self,
        storage_address: Fr,
        nullifier: Fr,
    ) -> Result<(), DuplicateNullifier> {
        self.nullifiers.append(storage_address, nullifier)?;
        debug!(%nullifier, "new nullifier");
        self.trace.trace_new_nullifier(storage_address, nullifier);
        Ok(())
    }

    pub fn check_l1_to_l2_message_exists(
        &mut self,
        msg_hash: Fr,
        msg_leaf_index: Fr,
        msg_leaf_index_u64: Option<u64>,
    ) -> bool {
        let exists = msg_leaf_index_u64
            .is_some_and(|index| self.host.l1_to_l2_message_exists(msg_hash, index));
        debug!(%msg_hash, %msg_leaf_index, exists, "l1 to l2 message check");
        self.trace
            .trace_l1_to_l2_message_check(msg_hash, msg_leaf_index, exists);
        exists
    }

    pub fn write_unencrypted_log(&mut self, contract_address: Fr, log: Vec<Fr>) {
        debug!(fields = log.len(), "new unencrypted log");
        self.trace.trace_unencrypted_log(contract_address, log);
    }

    pub fn write_l2_to_l1_message(&mut self, contract_address: Fr, recipient: Fr, content: Fr) {
        debug!(%recipient, %content, "new l2 to l1 message");
        self.trace
            .trace_l2_to_l1_message(contract_address, recipient, content);
    }

    pub fn get_bytecode(&self, address: Fr) -> Option<Vec<u8>> {
        self.host.get_bytecode(address)
    }
}

impl std::fmt::Debug for WorldStateJournal<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorldStateJournal")
            .field("public_storage", &self.public_storage)
            .field("nullifiers", &self.nullifiers)
            .field("trace", &self.trace)
            .finish()
    }
}
