//! World state as seen by the simulator: the host interface, the per-frame
//! caches layered over it, and the access trace handed to the prover.

mod host;
mod journal;
mod nullifiers;
mod public_storage;
mod trace;

pub use host::{HostStorage, InMemoryHost};
pub use journal::{JournalState, WorldStateJournal};
pub use nullifiers::{DuplicateNullifier, NullifierCache, NullifierCheck, Nullifiers};
pub use public_storage::{PublicStorage, PublicStorageCache, StorageRead};
pub use trace::{
    AccruedSubstate, TraceEntry, TracedL1ToL2MessageCheck, TracedL2ToL1Message, TracedNoteHash,
    TracedNoteHashCheck, TracedNullifier, TracedNullifierCheck, TracedPublicStorageRead,
    TracedPublicStorageWrite, TracedUnencryptedLog, WorldStateAccessTrace,
};
