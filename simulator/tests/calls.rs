mod common;

use avm_simulator::{
    bytecode::{BinaryOp, ReturndataSize},
    state::InMemoryHost,
    CallFrameInfo, EnvironmentVariable, ExecutionError, Gas, Instruction, Opcode, RevertCause,
    SimulatorConfig, VmError,
};
use common::{fr, run_contract, Program};

const CALLER: u64 = 1;
const CALLEE: u64 = 2;

fn host_with(contracts: &[(u64, Program)]) -> InMemoryHost {
    let mut host = InMemoryHost::new();
    for (address, program) in contracts {
        host.deploy(fr(*address), program.bytecode());
    }
    host
}

/// Calls `CALLEE`, then returns `[returndata[0], success, returndata size]`.
fn caller(is_static: bool) -> Program {
    Program::new()
        .set_field(100, fr(CALLEE))
        .call(100, 100_000, 30, 1, 31, is_static)
        .push(Instruction::ReturndataSize(ReturndataSize {
            indirect: 0,
            dst_offset: 32,
        }))
        .ret(30, 3)
}

#[test]
fn test_nested_call_commits_effects() {
    let callee = Program::new()
        .set_field(0, fr(7))
        .set_field(1, fr(1))
        .sstore(0, 1)
        .emit_note_hash(0)
        .set_field(2, fr(42))
        .ret(2, 1);
    let host = host_with(&[(CALLER, caller(false)), (CALLEE, callee)]);
    let result = run_contract(&host, CALLER, SimulatorConfig::default());

    assert!(!result.reverted);
    assert_eq!(result.output, vec![fr(42), fr(1), fr(1)]);
    assert_eq!(
        result.public_storage_writes.iter().collect::<Vec<_>>(),
        vec![(fr(CALLEE), fr(1), fr(7))]
    );
    let note_hashes = &result.trace.accrued_substate.note_hashes;
    assert_eq!(note_hashes.len(), 1);
    assert_eq!(note_hashes[0].storage_address, fr(CALLEE));
    assert_eq!(note_hashes[0].counter, 1);
    assert_eq!(result.trace.access_counter(), 2);
}

#[test]
fn test_reverted_nested_call_is_discarded() {
    let callee = Program::new()
        .set_field(0, fr(7))
        .sload(0, 5)
        .sstore(0, 0)
        .emit_note_hash(0)
        .set_field(1, fr(9))
        .revert(1, 1);
    let host = host_with(&[(CALLER, caller(false)), (CALLEE, callee)]);
    let result = run_contract(&host, CALLER, SimulatorConfig::default());

    assert!(!result.reverted);
    assert_eq!(result.output, vec![fr(9), fr(0), fr(1)]);
    assert!(result.public_storage_writes.is_empty());
    assert_eq!(result.trace.public_storage_reads.len(), 1);
    assert!(result.trace.public_storage_writes.is_empty());
    assert!(result.trace.accrued_substate.is_empty());
    assert_eq!(result.trace.access_counter(), 3);
}

#[test]
fn test_static_call_forbids_mutation_in_callee() {
    let callee = Program::new().set_field(0, fr(7)).sstore(0, 0).ret(0, 0);
    let host = host_with(&[(CALLER, caller(true)), (CALLEE, callee.clone())]);
    let result = run_contract(&host, CALLER, SimulatorConfig::default());
    assert_eq!(result.output, vec![fr(0), fr(0), fr(0)]);
    assert!(result.trace.public_storage_writes.is_empty());

    // A plain call from a static context stays static.
    let relay = Program::new()
        .set_field(100, fr(3))
        .call(100, 50_000, 30, 0, 31, false)
        .ret(31, 1);
    let host = host_with(&[(CALLER, caller(true)), (CALLEE, relay), (3, callee)]);
    let result = run_contract(&host, CALLER, SimulatorConfig::default());
    // The relay returns its own call's success flag, which is false.
    assert_eq!(result.output, vec![fr(0), fr(1), fr(1)]);
    assert!(result.public_storage_writes.is_empty());
}

#[test]
fn test_revert_reason_walks_call_stack() {
    let callee = Program::new()
        .set_u32(0, 1)
        .set_u32(1, 0)
        .push(Instruction::Div(BinaryOp {
            indirect: 0,
            a_offset: 0,
            b_offset: 1,
            dst_offset: 2,
        }))
        .ret(2, 1);
    let caller = Program::new()
        .set_field(100, fr(CALLEE))
        .call(100, 100_000, 30, 0, 31, false)
        .revert(31, 1);
    let host = host_with(&[(CALLER, caller), (CALLEE, callee)]);
    let result = run_contract(&host, CALLER, SimulatorConfig::default());

    assert!(result.reverted);
    assert_eq!(result.output, vec![fr(0)]);
    let reason = result.revert_reason.clone().unwrap();
    assert_eq!(
        reason.call_stack(),
        vec![
            CallFrameInfo {
                address: fr(CALLER),
                function_selector: 0,
            },
            CallFrameInfo {
                address: fr(CALLEE),
                function_selector: 0xabcd,
            },
        ]
    );
    assert_eq!(
        reason.root_cause(),
        &RevertCause::Failed(ExecutionError::DivisionByZero)
    );
    assert!(reason.to_string().contains("caused by: division by zero"));
    assert!(result.into_result().is_err());
}

#[test]
fn test_call_depth_is_bounded() {
    let recursive = Program::new()
        .get_env(EnvironmentVariable::Address, 100)
        .call(100, 1_000_000, 30, 0, 31, false)
        .ret(31, 1);
    let host = host_with(&[(CALLER, recursive)]);
    let config = SimulatorConfig {
        max_call_depth: 4,
        collect_stats: true,
    };
    let result = run_contract(&host, CALLER, config);

    assert!(!result.reverted);
    // Frames at depths 1 to 3 made calls that started; the one at depth 4
    // was refused.
    assert_eq!(result.output, vec![fr(1)]);
    assert_eq!(result.stats.count(Opcode::Call), 4);
    assert_eq!(result.stats.count(Opcode::Return), 4);
}

#[test]
fn test_missing_contract_fails_only_the_call() {
    let caller = Program::new()
        .set_field(100, fr(99))
        .call(100, 100_000, 30, 0, 31, false)
        .ret(31, 1);
    let host = host_with(&[(CALLER, caller)]);
    let result = run_contract(&host, CALLER, SimulatorConfig::default());

    assert!(!result.reverted);
    assert_eq!(result.output, vec![fr(0)]);
}

#[test]
fn test_missing_top_level_contract_reverts_with_all_gas_consumed() {
    let result = run_contract(&InMemoryHost::new(), 42, SimulatorConfig::default());

    assert!(result.reverted);
    assert!(result.output.is_empty());
    assert_eq!(result.gas_left, Gas::zero());
    assert!(result.trace.ordered_entries().is_empty());
    assert!(result.public_storage_writes.is_empty());
    let reason = result.revert_reason.clone().unwrap();
    assert_eq!(reason.frame.address, fr(42));
    assert_eq!(
        reason.cause,
        RevertCause::Failed(ExecutionError::ContractNotFound(fr(42)))
    );
    assert!(matches!(result.into_result(), Err(VmError::Reverted(_))));
}

#[test]
fn test_failed_call_consumes_its_allocation() {
    const REQUESTED: u32 = 10_000;
    let caller = Program::new()
        .set_field(100, fr(CALLEE))
        .call(100, REQUESTED, 30, 0, 31, false)
        .ret(0, 0);
    let returns = Program::new().ret(0, 0);
    let spins = Program::new().jump(0);

    let gas_left = |callee: Program| {
        let host = host_with(&[(CALLER, caller.clone()), (CALLEE, callee)]);
        run_contract(&host, CALLER, SimulatorConfig::default()).gas_left
    };
    let after_return = gas_left(returns);
    let after_failure = gas_left(spins);

    let callee_cost = Opcode::Set32.base_gas() + Opcode::Return.base_gas();
    assert_eq!(
        after_return.l2_gas - after_failure.l2_gas,
        REQUESTED - callee_cost.l2_gas
    );
}
