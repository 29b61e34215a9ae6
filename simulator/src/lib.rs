//! Public-execution virtual machine of a privacy-preserving rollup.
//!
//! The simulator decodes contract bytecode, interprets it over a tagged
//! memory, and records every world-state access in a counter-ordered trace
//! that is later handed, unmodified, to the proving backend.

mod addressing;
pub mod bytecode;
mod environment;
pub mod execution;
pub mod gadgets;
mod gas;
mod instructions;
pub mod memory;
mod opcodes;
mod simulator;
pub mod state;
mod stats;
pub mod util;

/// The native field of the VM: the BN254 scalar field.
pub type Fr = ark_bn254::Fr;

pub use addressing::Addressing;
pub use bytecode::{decode, encode, DecodeError, Instruction};
pub use environment::{EnvironmentVariable, ExecutionEnvironment, GlobalVariables};
pub use execution::{
    AvmRevertReason, CallFrameInfo, CallOutcome, ExecutionError, RevertCause, VmError,
};
pub use gas::Gas;
pub use memory::{MemoryError, TaggedMemory, TaggedValue, TypeTag};
pub use opcodes::Opcode;
pub use simulator::{AvmExecutionResult, AvmSimulator, SimulatorConfig};
pub use stats::InstructionStats;
