//! Copy-on-fork public storage.
//!
//! Each call frame owns a write cache and borrows its ancestors' caches.
//! Reads walk `self -> parent -> ... -> host`; writes only ever touch the
//! frame's own cache until the caller merges it back.

use ahash::AHashMap;
use ark_ff::Zero;

use super::HostStorage;
use crate::Fr;

/// Buffered writes of one frame, keyed by contract address then slot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PublicStorageCache {
    per_contract: AHashMap<Fr, AHashMap<Fr, Fr>>,
}

impl PublicStorageCache {
    pub fn read(&self, address: Fr, slot: Fr) -> Option<Fr> {
        self.per_contract.get(&address)?.get(&slot).copied()
    }

    pub fn write(&mut self, address: Fr, slot: Fr, value: Fr) {
        self.per_contract
            .entry(address)
            .or_default()
            .insert(slot, value);
    }

    /// Adopts every entry of `incoming`, overwriting existing ones.
    pub fn accept_and_merge(&mut self, incoming: PublicStorageCache) {
        for (address, slots) in incoming.per_contract {
            self.per_contract.entry(address).or_default().extend(slots);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.per_contract.values().all(|slots| slots.is_empty())
    }

    /// Every buffered `(address, slot, value)`, in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = (Fr, Fr, Fr)> + '_ {
        self.per_contract.iter().flat_map(|(address, slots)| {
            slots
                .iter()
                .map(move |(slot, value)| (*address, *slot, *value))
        })
    }

    /// Every buffered `(address, slot, value)`, sorted by address then slot.
    pub fn sorted_entries(&self) -> Vec<(Fr, Fr, Fr)> {
        let mut entries = self.iter().collect::<Vec<_>>();
        entries.sort_unstable_by_key(|&(address, slot, _)| (address, slot));
        entries
    }
}

/// Result of a storage lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StorageRead {
    pub value: Fr,
    /// Whether the slot was found in a cache or in the host.
    pub exists: bool,
    /// Whether the value came from a frame cache rather than the host.
    pub cached: bool,
}

/// One link of the storage cache chain.
pub struct PublicStorage<'a> {
    host: &'a dyn HostStorage,
    parent: Option<&'a PublicStorage<'a>>,
    cache: PublicStorageCache,
}

impl<'a> PublicStorage<'a> {
    /// Root of a chain, directly above the host.
    pub fn new(host: &'a dyn HostStorage) -> Self {
        Self {
            host,
            parent: None,
            cache: PublicStorageCache::default(),
        }
    }

    /// Starts a child link whose reads fall through to `self`.
    pub fn fork(&self) -> PublicStorage<'_> {
        PublicStorage {
            host: self.host,
            parent: Some(self),
            cache: PublicStorageCache::default(),
        }
    }

    /// Looks a slot up in this cache, then the ancestors' caches.
    pub fn read_here_or_parent(&self, address: Fr, slot: Fr) -> Option<Fr> {
        self.cache.read(address, slot).or_else(|| {
            self.parent
                .and_then(|parent| parent.read_here_or_parent(address, slot))
        })
    }

    /// Reads a slot. Slots absent everywhere hold zero.
    pub fn read(&self, address: Fr, slot: Fr) -> StorageRead {
        if let Some(value) = self.read_here_or_parent(address, slot) {
            return StorageRead {
                value,
                exists: true,
                cached: true,
            };
        }
        match self.host.storage_read(address, slot) {
            Some(value) => StorageRead {
                value,
                exists: true,
                cached: false,
            },
            None => StorageRead {
                value: Fr::zero(),
                exists: false,
                cached: false,
            },
        }
    }

    pub fn write(&mut self, address: Fr, slot: Fr, value: Fr) {
        self.cache.write(address, slot, value);
    }

    pub fn cache(&self) -> &PublicStorageCache {
        &self.cache
    }

    pub fn into_cache(self) -> PublicStorageCache {
        self.cache
    }

    /// Merges a finished child's writes into this link; the child wins.
    pub fn accept_and_merge(&mut self, incoming: PublicStorageCache) {
        self.cache.accept_and_merge(incoming);
    }
}

impl std::fmt::Debug for PublicStorage<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PublicStorage")
            .field("has_parent", &self.parent.is_some())
            .field("cache", &self.cache)
            .finish()
    }
}
