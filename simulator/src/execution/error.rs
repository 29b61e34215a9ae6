use thiserror::Error;

use super::AvmRevertReason;
use crate::{
    bytecode::DecodeError, gadgets::BlackBoxError, gas::Gas, memory::MemoryError,
    opcodes::Opcode, state::DuplicateNullifier, Fr,
};

/// Faults that fail the current call frame. The caller observes a failed
/// call and keeps running.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExecutionError {
    #[error(transparent)]
    Memory(#[from] MemoryError),
    #[error("out of gas: needed {required}, {available} left")]
    OutOfGas { required: Gas, available: Gas },
    /// A state-mutating opcode ran inside a static call.
    #[error("{opcode} is not allowed in a static call")]
    StaticCallAlteration { opcode: Opcode },
    #[error("division by zero")]
    DivisionByZero,
    /// Jumped or fell outside the program.
    #[error("program counter {pc} is outside a program of {len} instructions")]
    InvalidProgramCounter { pc: u32, len: usize },
    #[error("internal return with an empty internal call stack")]
    InternalCallStackUnderflow,
    #[error(transparent)]
    DuplicateNullifier(#[from] DuplicateNullifier),
    #[error("maximum call depth of {max} exceeded")]
    CallDepthExceeded { max: u32 },
    #[error("no contract deployed at {0}")]
    ContractNotFound(Fr),
    /// The callee's bytecode does not decode.
    #[error("invalid callee bytecode: {0}")]
    InvalidBytecode(#[from] DecodeError),
    #[error("radix {0} is outside 2..=256")]
    InvalidRadix(u32),
    #[error("point ({x}, {y}) is not on the curve")]
    PointNotOnCurve { x: Fr, y: Fr },
    #[error(transparent)]
    BlackBox(#[from] BlackBoxError),
}

/// Top-level error of a simulation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VmError {
    /// The top-level bytecode is malformed; nothing was executed.
    #[error("malformed bytecode: {0}")]
    Decode(#[source] DecodeError),
    /// The top-level call reverted or failed.
    #[error("{0}")]
    Reverted(Box<AvmRevertReason>),
}
