use tracing::{instrument, trace, warn};

use super::{AvmRevertReason, CallFrameInfo, CallOutcome, ExecutionError, RevertCause};
use crate::{
    addressing::Addressing,
    bytecode::{decode, Instruction},
    environment::ExecutionEnvironment,
    gadgets::BlackBoxSolver,
    gas::Gas,
    memory::TaggedMemory,
    opcodes::{Opcode, INDIRECT_ADDRESSING_L2_GAS},
    simulator::SimulatorConfig,
    state::{JournalState, WorldStateAccessTrace, WorldStateJournal},
    stats::InstructionStats,
    Fr,
};

/// What the interpreter does after an instruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Flow {
    Next,
    JumpTo(u32),
    Halt(CallOutcome),
}

/// Simulation-wide collaborators shared by every frame.
#[derive(Clone, Copy)]
pub(crate) struct CallContext<'a> {
    pub(crate) blackbox: &'a dyn BlackBoxSolver,
    pub(crate) config: &'a SimulatorConfig,
}

/// Everything a finished frame hands back to its caller.
#[derive(Debug)]
pub(crate) struct FrameResult {
    pub(crate) outcome: CallOutcome,
    pub(crate) gas_left: Gas,
    pub(crate) state: JournalState,
    pub(crate) revert_reason: Option<AvmRevertReason>,
    pub(crate) stats: InstructionStats,
}

/// The state of one executing contract call.
pub(crate) struct Frame<'a> {
    pub(crate) ctx: CallContext<'a>,
    pub(crate) env: ExecutionEnvironment,
    pub(crate) memory: TaggedMemory,
    pub(crate) journal: WorldStateJournal<'a>,
    pub(crate) gas: Gas,
    pub(crate) pc: u32,
    pub(crate) internal_call_stack: Vec<u32>,
    pub(crate) instructions: &'a [Instruction],
    /// Number of frames on the call stack, this one included.
    pub(crate) depth: u32,
    /// Return data of the last nested call.
    pub(crate) nested_returndata: Vec<Fr>,
    /// Why the last nested call did not return, if it did not.
    pub(crate) nested_revert_reason: Option<AvmRevertReason>,
    pub(crate) stats: InstructionStats,
}

impl<'a> Frame<'a> {
    pub(crate) fn new(
        ctx: CallContext<'a>,
        env: ExecutionEnvironment,
        gas: Gas,
        instructions: &'a [Instruction],
        journal: WorldStateJournal<'a>,
        depth: u32,
    ) -> Self {
        Self {
            ctx,
            env,
            memory: TaggedMemory::new(),
            journal,
            gas,
            pc: 0,
            internal_call_stack: Vec::new(),
            instructions,
            depth,
            nested_returndata: Vec::new(),
            nested_revert_reason: None,
            stats: InstructionStats::new(ctx.config.collect_stats),
        }
    }

    pub(crate) fn info(&self) -> CallFrameInfo {
        CallFrameInfo {
            address: self.env.address,
            function_selector: self.env.function_selector,
        }
    }

    /// Runs the frame to completion. Faults become a `Failed` outcome; they
    /// never escape.
    #[instrument(
        level = "debug",
        skip_all,
        fields(address = %self.env.address, depth = self.depth, gas = %self.gas)
    )]
    pub(crate) fn run(mut self) -> FrameResult {
        let outcome = match self.execute_loop() {
            Ok(outcome) => outcome,
            Err(err) => {
                warn!(%err, pc = self.pc, "frame failed");
                CallOutcome::Failed(err)
            }
        };
        self.finish(outcome)
    }

    fn execute_loop(&mut self) -> Result<CallOutcome, ExecutionError> {
        loop {
            let instruction = *self.instructions.get(self.pc as usize).ok_or(
                ExecutionError::InvalidProgramCounter {
                    pc: self.pc,
                    len: self.instructions.len(),
                },
            )?;
            match self.step(&instruction)? {
                Flow::Next => self.pc += 1,
                Flow::JumpTo(loc) => self.pc = loc,
                Flow::Halt(outcome) => return Ok(outcome),
            }
        }
    }

    fn step(&mut self, instruction: &Instruction) -> Result<Flow, ExecutionError> {
        let opcode = instruction.opcode();
        trace!(pc = self.pc, %opcode, gas = %self.gas, "step");
        let gas_before = self.gas;
        let result = self
            .charge(opcode.base_gas())
            .and_then(|()| instruction.execute(self));
        self.stats.record(opcode, gas_before.saturating_sub(self.gas));
        result
    }

    fn finish(mut self, outcome: CallOutcome) -> FrameResult {
        let cause = match &outcome {
            CallOutcome::Returned(_) => None,
            CallOutcome::Reverted(data) => Some(RevertCause::Reverted(data.clone())),
            CallOutcome::Failed(err) => Some(RevertCause::Failed(err.clone())),
        };
        let frame = self.info();
        let nested = self.nested_revert_reason.take().map(Box::new);
        let revert_reason = cause.map(|cause| AvmRevertReason {
            frame,
            cause,
            nested,
        });
        let gas_left = if matches!(outcome, CallOutcome::Failed(_)) {
            Gas::zero()
        } else {
            self.gas
        };
        FrameResult {
            outcome,
            gas_left,
            state: self.journal.into_state(),
            revert_reason,
            stats: self.stats,
        }
    }

    pub(crate) fn charge(&mut self, cost: Gas) -> Result<(), ExecutionError> {
        self.gas = self
            .gas
            .checked_sub(cost)
            .ok_or(ExecutionError::OutOfGas {
                required: cost,
                available: self.gas,
            })?;
        Ok(())
    }

    /// Charges the length-dependent part of an opcode's cost.
    pub(crate) fn charge_dynamic(&mut self, opcode: Opcode, units: u32) -> Result<(), ExecutionError> {
        self.charge(opcode.dynamic_gas() * units)
    }

    /// Resolves operand offsets through the `indirect` mask, paying for each
    /// pointer followed.
    pub(crate) fn resolve<const N: usize>(
        &mut self,
        indirect: u8,
        offsets: [u32; N],
    ) -> Result<[u32; N], ExecutionError> {
        let addressing = Addressing::new(indirect);
        self.charge(Gas::new(
            INDIRECT_ADDRESSING_L2_GAS * addressing.indirect_count(N),
            0,
        ))?;
        let resolved = addressing.resolve(&offsets, &self.memory)?;
        let mut out = offsets;
        out.copy_from_slice(&resolved);
        Ok(out)
    }

    pub(crate) fn ensure_not_static(&self, opcode: Opcode) -> Result<(), ExecutionError> {
        debug_assert!(opcode.is_state_mutating(), "{opcode} never alters state");
        if self.env.is_static_call {
            return Err(ExecutionError::StaticCallAlteration { opcode });
        }
        Ok(())
    }

    /// Executes a nested contract call in a child frame forked from this one.
    /// Failures to even start the callee are reported as a failed call.
    #[instrument(level = "debug", skip(self, calldata), fields(depth = self.depth + 1))]
    pub(crate) fn run_nested_call(
        &self,
        address: Fr,
        function_selector: u32,
        calldata: Vec<Fr>,
        gas: Gas,
        is_static_call: bool,
    ) -> FrameResult {
        let env = self
            .env
            .derive_nested(address, function_selector, calldata, is_static_call);
        let max = self.ctx.config.max_call_depth;
        if self.depth >= max {
            return self.failed_to_start(&env, ExecutionError::CallDepthExceeded { max });
        }
        let Some(bytecode) = self.journal.get_bytecode(address) else {
            return self.failed_to_start(&env, ExecutionError::ContractNotFound(address));
        };
        let instructions = match decode(&bytecode) {
            Ok(instructions) => instructions,
            Err(err) => return self.failed_to_start(&env, err.into()),
        };
        Frame::new(
            self.ctx,
            env,
            gas,
            &instructions,
            self.journal.fork(),
            self.depth + 1,
        )
        .run()
    }

    fn failed_to_start(&self, env: &ExecutionEnvironment, err: ExecutionError) -> FrameResult {
        warn!(%err, address = %env.address, "nested call failed to start");
        FrameResult {
            revert_reason: Some(AvmRevertReason {
                frame: CallFrameInfo {
                    address: env.address,
                    function_selector: env.function_selector,
                },
                cause: RevertCause::Failed(err.clone()),
                nested: None,
            }),
            outcome: CallOutcome::Failed(err),
            gas_left: Gas::zero(),
            state: JournalState {
                trace: WorldStateAccessTrace::new(self.journal.trace().access_counter()),
                ..Default::default()
            },
            stats: InstructionStats::new(self.stats.is_enabled()),
        }
    }

    /// Reads `size` slots starting at `offset` as field elements, whatever
    /// their tags.
    pub(crate) fn read_words(&self, offset: u32, size: u32) -> Result<Vec<Fr>, ExecutionError> {
        Ok(self
            .memory
            .get_slice(offset, size)?
            .iter()
            .map(|value| value.to_field())
            .collect())
    }

    /// Leaf indices are FIELD operands; one that does not fit a `u64` cannot
    /// name a tree leaf.
    pub(crate) fn read_leaf_index(&self, offset: u32) -> Result<(Fr, Option<u64>), ExecutionError> {
        let index = self.memory.get_field(offset)?;
        Ok((index, crate::memory::field_to_u64(&index)))
    }
}
