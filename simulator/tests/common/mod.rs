//! Shared helpers for the integration tests: a fluent program builder and
//! one-call simulation against an [`InMemoryHost`].

#![allow(dead_code)]

use avm_simulator::{
    bytecode::{
        BinaryOp, EmitNoteHash, ExternalCall, GetEnvVar, Halt, Jump, SLoad, SStore, Set,
    },
    encode,
    gadgets::UnsupportedBlackBox,
    state::InMemoryHost,
    AvmExecutionResult, AvmSimulator, EnvironmentVariable, ExecutionEnvironment, Fr, Gas,
    Instruction, SimulatorConfig, TypeTag,
};

pub const DEFAULT_GAS: Gas = Gas::new(1_000_000, 1_000_000);

/// Scratch slot the builder uses for halt sizes.
pub const SIZE_SLOT: u32 = 1000;

pub fn fr(value: u64) -> Fr {
    Fr::from(value)
}

#[derive(Debug, Clone, Default)]
pub struct Program {
    instructions: Vec<Instruction>,
}

impl Program {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(mut self, instruction: Instruction) -> Self {
        self.instructions.push(instruction);
        self
    }

    pub fn set_field(self, dst_offset: u32, value: Fr) -> Self {
        self.push(Instruction::SetFf(Set {
            indirect: 0,
            tag: TypeTag::Field,
            value,
            dst_offset,
        }))
    }

    pub fn set_u32(self, dst_offset: u32, value: u32) -> Self {
        self.push(Instruction::Set32(Set {
            indirect: 0,
            tag: TypeTag::U32,
            value,
            dst_offset,
        }))
    }

    pub fn add(self, a_offset: u32, b_offset: u32, dst_offset: u32) -> Self {
        self.push(Instruction::Add(BinaryOp {
            indirect: 0,
            a_offset,
            b_offset,
            dst_offset,
        }))
    }

    pub fn get_env(self, var: EnvironmentVariable, dst_offset: u32) -> Self {
        self.push(Instruction::GetEnvVar(GetEnvVar {
            indirect: 0,
            var,
            dst_offset,
        }))
    }

    pub fn jump(self, loc: u32) -> Self {
        self.push(Instruction::Jump(Jump { loc }))
    }

    pub fn sload(self, slot_offset: u32, dst_offset: u32) -> Self {
        self.push(Instruction::SLoad(SLoad {
            indirect: 0,
            slot_offset,
            dst_offset,
        }))
    }

    pub fn sstore(self, src_offset: u32, slot_offset: u32) -> Self {
        self.push(Instruction::SStore(SStore {
            indirect: 0,
            src_offset,
            slot_offset,
        }))
    }

    pub fn emit_note_hash(self, note_hash_offset: u32) -> Self {
        self.push(Instruction::EmitNoteHash(EmitNoteHash {
            indirect: 0,
            note_hash_offset,
        }))
    }

    /// Calls the contract whose address is in `address_offset` with
    /// `gas` for both dimensions and no arguments. Return data lands at
    /// `ret_offset`, the success flag at `success_offset`.
    pub fn call(
        self,
        address_offset: u32,
        gas: u32,
        ret_offset: u32,
        ret_size: u32,
        success_offset: u32,
        is_static: bool,
    ) -> Self {
        const GAS_SLOT: u32 = 2000;
        const ARGS_SIZE_SLOT: u32 = 2002;
        const SELECTOR_SLOT: u32 = 2003;
        let operands = ExternalCall {
            indirect: 0,
            gas_offset: GAS_SLOT,
            address_offset,
            args_offset: 0,
            args_size_offset: ARGS_SIZE_SLOT,
            ret_offset,
            ret_size,
            success_offset,
            function_selector_offset: SELECTOR_SLOT,
        };
        let program = self
            .set_u32(GAS_SLOT, gas)
            .set_u32(GAS_SLOT + 1, gas)
            .set_u32(ARGS_SIZE_SLOT, 0)
            .set_u32(SELECTOR_SLOT, 0xabcd);
        if is_static {
            program.push(Instruction::StaticCall(operands))
        } else {
            program.push(Instruction::Call(operands))
        }
    }

    fn halt(self, offset: u32, size: u32, revert: bool) -> Self {
        let halt = Halt {
            indirect: 0,
            return_offset: offset,
            return_size_offset: SIZE_SLOT,
        };
        let program = self.set_u32(SIZE_SLOT, size);
        if revert {
            program.push(Instruction::Revert(halt))
        } else {
            program.push(Instruction::Return(halt))
        }
    }

    pub fn ret(self, offset: u32, size: u32) -> Self {
        self.halt(offset, size, false)
    }

    pub fn revert(self, offset: u32, size: u32) -> Self {
        self.halt(offset, size, true)
    }

    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    pub fn bytecode(&self) -> Vec<u8> {
        encode(&self.instructions)
    }
}

pub fn env_for(address: u64) -> ExecutionEnvironment {
    ExecutionEnvironment {
        address: fr(address),
        storage_address: fr(address),
        sender: fr(0xdead),
        ..Default::default()
    }
}

/// Runs the contract deployed at `address` in `host`.
pub fn run_contract(
    host: &InMemoryHost,
    address: u64,
    config: SimulatorConfig,
) -> AvmExecutionResult {
    let blackbox = UnsupportedBlackBox;
    AvmSimulator::with_config(host, &blackbox, config)
        .execute(env_for(address), DEFAULT_GAS)
        .expect("top-level bytecode decodes")
}

/// Runs `program` at address 1 of an otherwise empty host.
pub fn run(program: &Program) -> AvmExecutionResult {
    run_with_env(&InMemoryHost::new(), program, env_for(1), DEFAULT_GAS)
}

pub fn run_with_env(
    host: &InMemoryHost,
    program: &Program,
    env: ExecutionEnvironment,
    gas: Gas,
) -> AvmExecutionResult {
    let blackbox = UnsupportedBlackBox;
    AvmSimulator::new(host, &blackbox)
        .execute_bytecode(&program.bytecode(), env, gas)
        .expect("top-level bytecode decodes")
}
