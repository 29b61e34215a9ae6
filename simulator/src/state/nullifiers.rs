//! Pending nullifiers, chained across call frames like public storage.

use ahash::{AHashMap, AHashSet};
use thiserror::Error;

use super::HostStorage;
use crate::Fr;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("nullifier {nullifier} already exists for contract {address}")]
pub struct DuplicateNullifier {
    pub address: Fr,
    pub nullifier: Fr,
}

/// Nullifiers emitted by one frame, siloed by contract address.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NullifierCache {
    per_contract: AHashMap<Fr, AHashSet<Fr>>,
}

impl NullifierCache {
    pub fn contains(&self, address: Fr, nullifier: Fr) -> bool {
        self.per_contract
            .get(&address)
            .is_some_and(|set| set.contains(&nullifier))
    }

    fn insert(&mut self, address: Fr, nullifier: Fr) -> bool {
        self.per_contract
            .entry(address)
            .or_default()
            .insert(nullifier)
    }

    pub fn accept_and_merge(&mut self, incoming: NullifierCache) {
        for (address, nullifiers) in incoming.per_contract {
            self.per_contract
                .entry(address)
                .or_default()
                .extend(nullifiers);
        }
    }

    pub fn len(&self) -> usize {
        self.per_contract.values().map(|set| set.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Outcome of a nullifier membership check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NullifierCheck {
    pub exists: bool,
    /// Found among the nullifiers emitted earlier in this transaction.
    pub is_pending: bool,
    /// Tree position, for nullifiers already committed in the host.
    pub leaf_index: Option<u64>,
}

/// One link of the nullifier cache chain.
pub struct Nullifiers<'a> {
    host: &'a dyn HostStorage,
    parent: Option<&'a Nullifiers<'a>>,
    cache: NullifierCache,
}

impl<'a> Nullifiers<'a> {
    pub fn new(host: &'a dyn HostStorage) -> Self {
        Self {
            host,
            parent: None,
            cache: NullifierCache::default(),
        }
    }

    pub fn fork(&self) -> Nullifiers<'_> {
        Nullifiers {
            host: self.host,
            parent: Some(self),
            cache: NullifierCache::default(),
        }
    }

    fn is_pending(&self, address: Fr, nullifier: Fr) -> bool {
        self.cache.contains(address, nullifier)
            || self
                .parent
                .is_some_and(|parent| parent.is_pending(address, nullifier))
    }

    /// Pending nullifiers take precedence over the host.
    pub fn check_exists(&self, address: Fr, nullifier: Fr) -> NullifierCheck {
        if self.is_pending(address, nullifier) {
            return NullifierCheck {
                exists: true,
                is_pending: true,
                leaf_index: None,
            };
        }
        let leaf_index = self.host.nullifier_exists(address, nullifier);
        NullifierCheck {
            exists: leaf_index.is_some(),
            is_pending: false,
            leaf_index,
        }
    }

    /// Records a new nullifier. Fails if it is already pending anywhere in
    /// the chain or committed in the host.
    pub fn append(&mut self, address: Fr, nullifier: Fr) -> Result<(), DuplicateNullifier> {
        if self.check_exists(address, nullifier).exists || !self.cache.insert(address, nullifier) {
            return Err(DuplicateNullifier { address, nullifier });
        }
        Ok(())
    }

    pub fn cache(&self) -> &NullifierCache {
        &self.cache
    }

    pub fn into_cache(self) -> NullifierCache {
        self.cache
    }

    pub fn accept_and_merge(&mut self, incoming: NullifierCache) {
        self.cache.accept_and_merge(incoming);
    }
}

impl std::fmt::Debug for Nullifiers<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Nullifiers")
            .field("has_parent", &self.parent.is_some())
            .field("cache", &self.cache)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::InMemoryHost;

    fn fr(v: u64) -> Fr {
        Fr::from(v)
    }

    #[test]
    fn test_host_nullifier_reports_leaf_index() {
        let mut host = InMemoryHost::new();
        host.insert_nullifier(fr(1), fr(5), 42);
        let nullifiers = Nullifiers::new(&host);
        assert_eq!(
            nullifiers.check_exists(fr(1), fr(5)),
            NullifierCheck {
                exists: true,
                is_pending: false,
                leaf_index: Some(42)
            }
        );
        assert!(!nullifiers.check_exists(fr(2), fr(5)).exists);
    }

    #[test]
    fn test_pending_nullifiers_are_siloed() {
        let host = InMemoryHost::new();
        let mut nullifiers = Nullifiers::new(&host);
        nullifiers.append(fr(1), fr(5)).unwrap();
        assert!(nullifiers.check_exists(fr(1), fr(5)).is_pending);
        assert!(!nullifiers.check_exists(fr(2), fr(5)).exists);
    }

    #[test]
    fn test_duplicates_are_rejected_across_the_chain() {
        let mut host = InMemoryHost::new();
        host.insert_nullifier(fr(1), fr(9), 0);
        let mut parent = Nullifiers::new(&host);
        parent.append(fr(1), fr(5)).unwrap();

        let mut child = parent.fork();
        assert_eq!(
            child.append(fr(1), fr(5)).unwrap_err(),
            DuplicateNullifier {
                address: fr(1),
                nullifier: fr(5)
            }
        );
        assert!(child.append(fr(1), fr(9)).is_err());
        child.append(fr(1), fr(6)).unwrap();
        let cache = child.into_cache();

        assert!(!parent.check_exists(fr(1), fr(6)).exists);
        parent.accept_and_merge(cache);
        assert!(parent.check_exists(fr(1), fr(6)).is_pending);
        assert_eq!(parent.cache().len(), 2);
        assert!(!parent.cache().is_empty());
    }
}
