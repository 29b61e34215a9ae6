//! Entry point of a simulation: decodes the top-level bytecode, runs the
//! root frame, and packages what the proving backend needs.

use tracing::{info, instrument, warn};

use crate::{
    bytecode::decode,
    environment::ExecutionEnvironment,
    execution::{
        frame::{CallContext, Frame},
        AvmRevertReason, CallFrameInfo, CallOutcome, ExecutionError, RevertCause, VmError,
    },
    gadgets::BlackBoxSolver,
    gas::Gas,
    state::{HostStorage, PublicStorageCache, WorldStateAccessTrace, WorldStateJournal},
    stats::InstructionStats,
    Fr,
};

pub const DEFAULT_MAX_CALL_DEPTH: u32 = 64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimulatorConfig {
    /// Frames allowed on the call stack, the top-level one included.
    pub max_call_depth: u32,
    /// Record per-opcode counts and gas in [`AvmExecutionResult::stats`].
    pub collect_stats: bool,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            max_call_depth: DEFAULT_MAX_CALL_DEPTH,
            collect_stats: false,
        }
    }
}

/// Everything a top-level call leaves behind.
#[derive(Debug, Clone)]
pub struct AvmExecutionResult {
    pub reverted: bool,
    /// Return data, or revert data when `reverted`.
    pub output: Vec<Fr>,
    pub gas_left: Gas,
    pub revert_reason: Option<AvmRevertReason>,
    /// Full access history, reads of reverted calls included.
    pub trace: WorldStateAccessTrace,
    /// Storage writes that survive the call. Empty when reverted.
    pub public_storage_writes: PublicStorageCache,
    pub stats: InstructionStats,
}

impl AvmExecutionResult {
    /// The return data, or the revert reason as an error.
    pub fn into_result(self) -> Result<Vec<Fr>, VmError> {
        match self.revert_reason {
            Some(reason) if self.reverted => Err(VmError::Reverted(Box::new(reason))),
            _ => Ok(self.output),
        }
    }
}

pub struct AvmSimulator<'a> {
    host: &'a dyn HostStorage,
    blackbox: &'a dyn BlackBoxSolver,
    config: SimulatorConfig,
}

impl<'a> AvmSimulator<'a> {
    pub fn new(host: &'a dyn HostStorage, blackbox: &'a dyn BlackBoxSolver) -> Self {
        Self::with_config(host, blackbox, SimulatorConfig::default())
    }

    pub fn with_config(
        host: &'a dyn HostStorage,
        blackbox: &'a dyn BlackBoxSolver,
        config: SimulatorConfig,
    ) -> Self {
        Self {
            host,
            blackbox,
            config,
        }
    }

    pub fn config(&self) -> &SimulatorConfig {
        &self.config
    }

    /// Runs the contract deployed at `env.address`. A missing contract
    /// reverts at once and consumes all of `gas`.
    pub fn execute(
        &self,
        env: ExecutionEnvironment,
        gas: Gas,
    ) -> Result<AvmExecutionResult, VmError> {
        match self.host.get_bytecode(env.address) {
            Some(bytecode) => self.execute_bytecode(&bytecode, env, gas),
            None => Ok(self.missing_contract(&env)),
        }
    }

    fn missing_contract(&self, env: &ExecutionEnvironment) -> AvmExecutionResult {
        let err = ExecutionError::ContractNotFound(env.address);
        warn!(%err, "top-level call failed to start");
        AvmExecutionResult {
            reverted: true,
            output: Vec::new(),
            gas_left: Gas::zero(),
            revert_reason: Some(AvmRevertReason {
                frame: CallFrameInfo {
                    address: env.address,
                    function_selector: env.function_selector,
                },
                cause: RevertCause::Failed(err),
                nested: None,
            }),
            trace: WorldStateAccessTrace::new(0),
            public_storage_writes: PublicStorageCache::default(),
            stats: InstructionStats::new(self.config.collect_stats),
        }
    }

    /// Runs `bytecode` as the top-level call. Only malformed bytecode is an
    /// error here; reverts and faults are reported in the result.
    #[instrument(level = "info", skip_all, fields(address = %env.address, gas = %gas))]
    pub fn execute_bytecode(
        &self,
        bytecode: &[u8],
        env: ExecutionEnvironment,
        gas: Gas,
    ) -> Result<AvmExecutionResult, VmError> {
        let instructions = decode(bytecode).map_err(VmError::Decode)?;
        let ctx = CallContext {
            blackbox: self.blackbox,
            config: &self.config,
        };

        let mut root = WorldStateJournal::new(self.host);
        let result = Frame::new(ctx, env, gas, &instructions, root.fork(), 1).run();
        let reverted = !result.outcome.is_success();
        root.accept_nested_call_state(result.state, reverted);
        let state = root.into_state();

        info!(
            reverted,
            gas_left = %result.gas_left,
            accesses = state.trace.access_counter(),
            "simulation finished"
        );
        let output = match result.outcome {
            CallOutcome::Returned(data) | CallOutcome::Reverted(data) => data,
            CallOutcome::Failed(_) => Vec::new(),
        };
        Ok(AvmExecutionResult {
            reverted,
            output,
            gas_left: result.gas_left,
            revert_reason: result.revert_reason,
            trace: state.trace,
            public_storage_writes: state.public_storage,
            stats: result.stats,
        })
    }
}
