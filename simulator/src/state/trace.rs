//! Counter-ordered record of every world-state access.
//!
//! Every traced operation takes the current access counter and bumps it, so
//! counters are unique and strictly increasing across the whole transaction.
//! A nested call starts from its caller's counter and the caller adopts the
//! child's final counter on merge; counters are never renumbered.

use crate::Fr;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TracedPublicStorageRead {
    pub storage_address: Fr,
    pub slot: Fr,
    pub value: Fr,
    pub exists: bool,
    pub cached: bool,
    pub counter: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TracedPublicStorageWrite {
    pub storage_address: Fr,
    pub slot: Fr,
    pub value: Fr,
    pub counter: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TracedNoteHashCheck {
    pub storage_address: Fr,
    pub note_hash: Fr,
    pub leaf_index: Fr,
    pub exists: bool,
    pub counter: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TracedNoteHash {
    pub storage_address: Fr,
    pub note_hash: Fr,
    pub counter: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TracedNullifierCheck {
    pub storage_address: Fr,
    pub nullifier: Fr,
    pub exists: bool,
    pub is_pending: bool,
    pub leaf_index: Option<u64>,
    pub counter: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TracedNullifier {
    pub storage_address: Fr,
    pub nullifier: Fr,
    pub counter: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TracedL1ToL2MessageCheck {
    pub msg_hash: Fr,
    pub msg_leaf_index: Fr,
    pub exists: bool,
    pub counter: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TracedUnencryptedLog {
    pub contract_address: Fr,
    pub log: Vec<Fr>,
    pub counter: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TracedL2ToL1Message {
    pub contract_address: Fr,
    pub recipient: Fr,
    pub content: Fr,
    pub counter: u32,
}

/// Effects of a call that survive only if it does not revert.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccruedSubstate {
    pub note_hashes: Vec<TracedNoteHash>,
    pub nullifiers: Vec<TracedNullifier>,
    pub unencrypted_logs: Vec<TracedUnencryptedLog>,
    pub l2_to_l1_messages: Vec<TracedL2ToL1Message>,
}

impl AccruedSubstate {
    fn append(&mut self, other: AccruedSubstate) {
        self.note_hashes.extend(other.note_hashes);
        self.nullifiers.extend(other.nullifiers);
        self.unencrypted_logs.extend(other.unencrypted_logs);
        self.l2_to_l1_messages.extend(other.l2_to_l1_messages);
    }

    pub fn is_empty(&self) -> bool {
        self.note_hashes.is_empty()
            && self.nullifiers.is_empty()
            && self.unencrypted_logs.is_empty()
            && self.l2_to_l1_messages.is_empty()
    }
}

/// A borrowed view of any trace entry, for counter-ordered hand-off.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraceEntry<'a> {
    PublicStorageRead(&'a TracedPublicStorageRead),
    PublicStorageWrite(&'a TracedPublicStorageWrite),
    NoteHashCheck(&'a TracedNoteHashCheck),
    NewNoteHash(&'a TracedNoteHash),
    NullifierCheck(&'a TracedNullifierCheck),
    NewNullifier(&'a TracedNullifier),
    L1ToL2MessageCheck(&'a TracedL1ToL2MessageCheck),
    UnencryptedLog(&'a TracedUnencryptedLog),
    L2ToL1Message(&'a TracedL2ToL1Message),
}

impl TraceEntry<'_> {
    pub fn counter(&self) -> u32 {
        match self {
            Self::PublicStorageRead(e) => e.counter,
            Self::PublicStorageWrite(e) => e.counter,
            Self::NoteHashCheck(e) => e.counter,
            Self::NewNoteHash(e) => e.counter,
            Self::NullifierCheck(e) => e.counter,
            Self::NewNullifier(e) => e.counter,
            Self::L1ToL2MessageCheck(e) => e.counter,
            Self::UnencryptedLog(e) => e.counter,
            Self::L2ToL1Message(e) => e.counter,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorldStateAccessTrace {
    access_counter: u32,
    pub public_storage_reads: Vec<TracedPublicStorageRead>,
    pub public_storage_writes: Vec<TracedPublicStorageWrite>,
    pub note_hash_checks: Vec<TracedNoteHashCheck>,
    pub nullifier_checks: Vec<TracedNullifierCheck>,
    pub l1_to_l2_message_checks: Vec<TracedL1ToL2MessageCheck>,
    pub accrued_substate: AccruedSubstate,
}

impl WorldStateAccessTrace {
    /// An empty trace whose first entry will carry `access_counter`.
    pub fn new(access_counter: u32) -> Self {
        Self {
            access_counter,
            ..Default::default()
        }
    }

    /// Counter the next traced access will carry.
    pub fn access_counter(&self) -> u32 {
        self.access_counter
    }

    fn next_counter(&mut self) -> u32 {
        let counter = self.access_counter;
        self.access_counter += 1;
        counter
    }

    pub fn trace_public_storage_read(
        &mut self,
        storage_address: Fr,
        slot: Fr,
        value: Fr,
        exists: bool,
        cached: bool,
    ) {
        let counter = self.next_counter();
        self.public_storage_reads.push(TracedPublicStorageRead {
            storage_address,
            slot,
            value,
            exists,
            cached,
            counter,
        });
    }

    pub fn trace_public_storage_write(&mut self, storage_address: Fr, slot: Fr, value: Fr) {
        let counter = self.next_counter();
        self.public_storage_writes.push(TracedPublicStorageWrite {
            storage_address,
            slot,
            value,
            counter,
        });
    }

    pub fn trace_note_hash_check(
        &mut self,
        storage_address: Fr,
        note_hash: Fr,
        leaf_index: Fr,
        exists: bool,
    ) {
        let counter = self.next_counter();
        self.note_hash_checks.push(TracedNoteHashCheck {
            storage_address,
            note_hash,
            leaf_index,
            exists,
            counter,
        });
    }

    pub fn trace_new_note_hash(&mut self, storage_address: Fr, note_hash: Fr) {
        let counter = self.next_counter();
        self.accrued_substate.note_hashes.push(TracedNoteHash {
            storage_address,
            note_hash,
            counter,
        });
    }

    pub fn trace_nullifier_check(
        &mut self,
        storage_address: Fr,
        nullifier: Fr,
        exists: bool,
        is_pending: bool,
        leaf_index: Option<u64>,
    ) {
        let counter = self.next_counter();
        self.nullifier_checks.push(TracedNullifierCheck {
            storage_address,
            nullifier,
            exists,
            is_pending,
            leaf_index,
            counter,
        });
    }

    pub fn trace_new_nullifier(&mut self, storage_address: Fr, nullifier: Fr) {
        let counter = self.next_counter();
        self.accrued_substate.nullifiers.push(TracedNullifier {
            storage_address,
            nullifier,
            counter,
        });
    }

    pub fn trace_l1_to_l2_message_check(&mut self, msg_hash: Fr, msg_leaf_index: Fr, exists: bool) {
        let counter = self.next_counter();
        self.l1_to_l2_message_checks.push(TracedL1ToL2MessageCheck {
            msg_hash,
            msg_leaf_index,
            exists,
            counter,
        });
    }

    pub fn trace_unencrypted_log(&mut self, contract_address: Fr, log: Vec<Fr>) {
        let counter = self.next_counter();
        self.accrued_substate
            .unencrypted_logs
            .push(TracedUnencryptedLog {
                contract_address,
                log,
                counter,
            });
    }

    pub fn trace_l2_to_l1_message(&mut self, contract_address: Fr, recipient: Fr, content: Fr) {
        let counter = self.next_counter();
        self.accrued_substate
            .l2_to_l1_messages
            .push(TracedL2ToL1Message {
                contract_address,
                recipient,
                content,
                counter,
            });
    }

    /// Absorbs a finished child's trace.
    ///
    /// Reads and checks are always kept. Storage writes and the accrued
    /// substate are dropped when `reject_accrued_substate` is set. Either
    /// way this trace continues from the child's counter.
    pub fn merge(&mut self, child: WorldStateAccessTrace, reject_accrued_substate: bool) {
        self.public_storage_reads.extend(child.public_storage_reads);
        self.note_hash_checks.extend(child.note_hash_checks);
        self.nullifier_checks.extend(child.nullifier_checks);
        self.l1_to_l2_message_checks
            .extend(child.l1_to_l2_message_checks);
        if !reject_accrued_substate {
            self.public_storage_writes
                .extend(child.public_storage_writes);
            self.accrued_substate.append(child.accrued_substate);
        }
        self.access_counter = child.access_counter;
    }

    /// Every entry, sorted by access counter.
    pub fn ordered_entries(&self) -> Vec<TraceEntry<'_>> {
        let substate = &self.accrued_substate;
        let mut entries = self
            .public_storage_reads
            .iter()
            .map(TraceEntry::PublicStorageRead)
            .chain(
                self.public_storage_writes
                    .iter()
                    .map(TraceEntry::PublicStorageWrite),
            )
            .chain(self.note_hash_checks.iter().map(TraceEntry::NoteHashCheck))
            .chain(substate.note_hashes.iter().map(TraceEntry::NewNoteHash))
            .chain(self.nullifier_checks.iter().map(TraceEntry::NullifierCheck))
            .chain(substate.nullifiers.iter().map(TraceEntry::NewNullifier))
            .chain(
                self.l1_to_l2_message_checks
                    .iter()
                    .map(TraceEntry::L1ToL2MessageCheck),
            )
            .chain(
                substate
                    .unencrypted_logs
                    .iter()
                    .map(TraceEntry::UnencryptedLog),
            )
            .chain(
                substate
                    .l2_to_l1_messages
                    .iter()
                    .map(TraceEntry::L2ToL1Message),
            )
            .collect::<Vec<_>>();
        entries.sort_by_key(TraceEntry::counter);
        entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fr(v: u64) -> Fr {
        Fr::from(v)
    }

    #[test]
    fn test_counters_strictly_increase() {
        let mut trace = WorldStateAccessTrace::new(5);
        trace.trace_public_storage_read(fr(1), fr(1), fr(0), false, false);
        trace.trace_new_note_hash(fr(1), fr(2));
        trace.trace_nullifier_check(fr(1), fr(3), false, false, None);
        trace.trace_unencrypted_log(fr(1), vec![fr(4)]);
        assert_eq!(trace.access_counter(), 9);

        let counters = trace
            .ordered_entries()
            .iter()
            .map(TraceEntry::counter)
            .collect::<Vec<_>>();
        assert_eq!(counters, vec![5, 6, 7, 8]);
    }

    #[test]
    fn test_merge_adopts_child_counter() {
        let mut parent = WorldStateAccessTrace::new(0);
        parent.trace_public_storage_write(fr(1), fr(1), fr(1));

        let mut child = WorldStateAccessTrace::new(parent.access_counter());
        child.trace_public_storage_read(fr(2), fr(1), fr(0), false, false);
        child.trace_new_nullifier(fr(2), fr(7));
        parent.merge(child, false);

        assert_eq!(parent.access_counter(), 3);
        assert_eq!(parent.accrued_substate.nullifiers[0].counter, 2);
        parent.trace_new_note_hash(fr(1), fr(8));
        assert_eq!(parent.accrued_substate.note_hashes[0].counter, 3);
    }

    #[test]
    fn test_rejected_merge_keeps_reads_and_drops_effects() {
        let mut parent = WorldStateAccessTrace::new(0);
        let mut child = WorldStateAccessTrace::new(0);
        child.trace_public_storage_read(fr(2), fr(1), fr(0), false, false);
        child.trace_public_storage_write(fr(2), fr(1), fr(5));
        child.trace_note_hash_check(fr(2), fr(3), fr(0), false);
        child.trace_new_note_hash(fr(2), fr(4));
        child.trace_l2_to_l1_message(fr(2), fr(6), fr(7));
        parent.merge(child, true);

        assert_eq!(parent.public_storage_reads.len(), 1);
        assert_eq!(parent.note_hash_checks.len(), 1);
        assert!(parent.public_storage_writes.is_empty());
        assert!(parent.accrued_substate.is_empty());
        assert_eq!(parent.access_counter(), 5);
    }
}
