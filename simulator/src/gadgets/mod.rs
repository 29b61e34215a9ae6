//! Cryptographic primitives exposed as opcodes.
//!
//! Keccak, SHA-256, Grumpkin arithmetic and radix decomposition run
//! natively. Poseidon2 and Pedersen are delegated to a [`BlackBoxSolver`]
//! supplied by the embedder, so the simulator always agrees with the
//! parameters the proving backend uses.

mod grumpkin;
mod hash;
mod radix;

pub use grumpkin::{msm, GrumpkinPoint};
pub use hash::{keccak_f1600, sha256_compression};
pub use radix::to_radix_be;
use thiserror::Error;

use crate::Fr;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BlackBoxError {
    /// The solver does not implement this primitive.
    #[error("black box function {0} is not supported")]
    Unsupported(&'static str),
    #[error("black box function {name} failed: {reason}")]
    Failed { name: &'static str, reason: String },
}

/// Primitives whose parameters live with the proving backend.
pub trait BlackBoxSolver {
    /// The Poseidon2 permutation of width 4.
    fn poseidon2_permutation(&self, input: &[Fr; 4]) -> Result<[Fr; 4], BlackBoxError>;

    /// Pedersen hash of `inputs` with generators starting at
    /// `generator_index`.
    fn pedersen_hash(&self, inputs: &[Fr], generator_index: u32) -> Result<Fr, BlackBoxError>;
}

/// A solver that supports nothing; programs using Poseidon2 or Pedersen fail.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnsupportedBlackBox;

impl BlackBoxSolver for UnsupportedBlackBox {
    fn poseidon2_permutation(&self, _input: &[Fr; 4]) -> Result<[Fr; 4], BlackBoxError> {
        Err(BlackBoxError::Unsupported("poseidon2_permutation"))
    }

    fn pedersen_hash(&self, _inputs: &[Fr], _generator_index: u32) -> Result<Fr, BlackBoxError> {
        Err(BlackBoxError::Unsupported("pedersen_hash"))
    }
}
