//! Call frames and the fetch-decode-execute loop.

mod error;
pub(crate) mod frame;
mod interpreter;
mod revert;

pub use error::{ExecutionError, VmError};
pub use revert::{AvmRevertReason, CallFrameInfo, RevertCause};

use crate::Fr;

/// How a call frame ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallOutcome {
    /// `Return`, with its return data.
    Returned(Vec<Fr>),
    /// `Revert`, with its revert data.
    Reverted(Vec<Fr>),
    /// An interpreter fault.
    Failed(ExecutionError),
}

impl CallOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Returned(_))
    }

    /// Return or revert data; empty for faults.
    pub fn data(&self) -> &[Fr] {
        match self {
            Self::Returned(data) | Self::Reverted(data) => data,
            Self::Failed(_) => &[],
        }
    }
}
