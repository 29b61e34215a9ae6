use ahash::AHashMap;

use crate::Fr;

/// Read-only view of committed world state.
///
/// The simulator never writes through this interface: every mutation is
/// buffered in the per-frame caches and handed back to the caller.
pub trait HostStorage {
    /// Committed value of a public storage slot, `None` if never written.
    fn storage_read(&self, address: Fr, slot: Fr) -> Option<Fr>;

    /// Whether `note_hash` is the leaf at `leaf_index` of the note hash tree.
    fn note_hash_exists(&self, address: Fr, note_hash: Fr, leaf_index: u64) -> bool;

    /// Leaf index of a committed nullifier siloed under `address`.
    fn nullifier_exists(&self, address: Fr, nullifier: Fr) -> Option<u64>;

    /// Whether `msg_hash` is the leaf at `leaf_index` of the L1-to-L2 message
    /// tree.
    fn l1_to_l2_message_exists(&self, msg_hash: Fr, leaf_index: u64) -> bool;

    /// Deployed bytecode of a contract.
    fn get_bytecode(&self, address: Fr) -> Option<Vec<u8>>;
}

/// Host backed by hash maps. Used by the `avm-run` binary and in tests.
#[derive(Debug, Clone, Default)]
pub struct InMemoryHost {
    storage: AHashMap<(Fr, Fr), Fr>,
    note_hashes: AHashMap<u64, Fr>,
    nullifiers: AHashMap<(Fr, Fr), u64>,
    l1_to_l2_messages: AHashMap<u64, Fr>,
    contracts: AHashMap<Fr, Vec<u8>>,
}

impl InMemoryHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_storage(&mut self, address: Fr, slot: Fr, value: Fr) -> &mut Self {
        self.storage.insert((address, slot), value);
        self
    }

    pub fn insert_note_hash(&mut self, leaf_index: u64, note_hash: Fr) -> &mut Self {
        self.note_hashes.insert(leaf_index, note_hash);
        self
    }

    pub fn insert_nullifier(&mut self, address: Fr, nullifier: Fr, leaf_index: u64) -> &mut Self {
        self.nullifiers.insert((address, nullifier), leaf_index);
        self
    }

    pub fn insert_l1_to_l2_message(&mut self, leaf_index: u64, msg_hash: Fr) -> &mut Self {
        self.l1_to_l2_messages.insert(leaf_index, msg_hash);
        self
    }

    pub fn deploy(&mut self, address: Fr, bytecode: Vec<u8>) -> &mut Self {
        self.contracts.insert(address, bytecode);
        self
    }
}

impl HostStorage for InMemoryHost {
    fn storage_read(&self, address: Fr, slot: Fr) -> Option<Fr> {
        self.storage.get(&(address, slot)).copied()
    }

    fn note_hash_exists(&self, _address: Fr, note_hash: Fr, leaf_index: u64) -> bool {
        self.note_hashes.get(&leaf_index) == Some(&note_hash)
    }

    fn nullifier_exists(&self, address: Fr, nullifier: Fr) -> Option<u64> {
        self.nullifiers.get(&(address, nullifier)).copied()
    }

    fn l1_to_l2_message_exists(&self, msg_hash: Fr, leaf_index: u64) -> bool {
        self.l1_to_l2_messages.get(&leaf_index) == Some(&msg_hash)
    }

    fn get_bytecode(&self, address: Fr) -> Option<Vec<u8>> {
        self.contracts.get(&address).cloned()
    }
}
