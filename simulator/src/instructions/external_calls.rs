//! Nested contract calls and frame termination.

use tracing::debug;

use crate::{
    bytecode::{ExternalCall, Halt},
    execution::{frame::Flow, frame::Frame, CallOutcome, ExecutionError},
    gas::Gas,
    memory::{MemoryError, TaggedValue, TypeTag},
    opcodes::Opcode,
};

/// Selectors may be passed as `U32` or as a FIELD holding one.
fn read_function_selector(frame: &Frame<'_>, offset: u32) -> Result<u32, ExecutionError> {
    match frame.memory.get(offset) {
        TaggedValue::U32(selector) => Ok(selector),
        TaggedValue::Field(selector) => Ok(crate::memory::field_low_u128(&selector) as u32),
        other => Err(MemoryError::TagMismatch {
            offset,
            expected: TypeTag::U32,
            found: other.tag(),
        }
        .into()),
    }
}

pub(crate) fn call(
    frame: &mut Frame<'_>,
    op: &ExternalCall,
    is_static_call: bool,
) -> Result<Flow, ExecutionError> {
    let opcode = if is_static_call {
        Opcode::StaticCall
    } else {
        Opcode::Call
    };
    let [gas_offset, address_offset, args_offset, args_size_offset, ret_offset, success_offset, selector_offset] =
        frame.resolve(
            op.indirect,
            [
                op.gas_offset,
                op.address_offset,
                op.args_offset,
                op.args_size_offset,
                op.ret_offset,
                op.success_offset,
                op.function_selector_offset,
            ],
        )?;
    let da_gas_offset = gas_offset
        .checked_add(1)
        .ok_or(MemoryError::SliceOutOfRange {
            offset: gas_offset,
            size: 2,
        })?;
    let requested = Gas::new(
        frame.memory.get_u32(gas_offset)?,
        frame.memory.get_u32(da_gas_offset)?,
    );
    let address = frame.memory.get_field(address_offset)?;
    let args_size = frame.memory.get_u32(args_size_offset)?;
    let function_selector = read_function_selector(frame, selector_offset)?;
    frame.charge_dynamic(opcode, args_size)?;
    let calldata = frame.read_words(args_offset, args_size)?;

    let allocated = frame.gas.allocate_nested(requested);
    let result = frame.run_nested_call(
        address,
        function_selector,
        calldata,
        allocated,
        is_static_call,
    );

    // The child can only have spent gas it was given.
    frame.gas = frame
        .gas
        .saturating_sub(allocated.saturating_sub(result.gas_left));
    let success = result.outcome.is_success();
    debug!(%address, success, gas_left = %result.gas_left, "nested call finished");
    frame
        .journal
        .accept_nested_call_state(result.state, !success);
    frame.stats.merge(&result.stats);
    frame.nested_revert_reason = result.revert_reason;
    frame.nested_returndata = result.outcome.data().to_vec();

    frame.memory.set(success_offset, TaggedValue::U1(success));
    let copied = frame.nested_returndata.len().min(op.ret_size as usize);
    let returndata = frame.nested_returndata[..copied].to_vec();
    frame.memory.set_field_slice(ret_offset, &returndata)?;
    Ok(Flow::Next)
}

/// `Return` and `Revert`: halts the frame with `size` words from memory.
pub(crate) fn halt(frame: &mut Frame<'_>, op: &Halt, revert: bool) -> Result<Flow, ExecutionError> {
    let opcode = if revert { Opcode::Revert } else { Opcode::Return };
    let [return_offset, size_offset] =
        frame.resolve(op.indirect, [op.return_offset, op.return_size_offset])?;
    let size = frame.memory.get_u32(size_offset)?;
    frame.charge_dynamic(opcode, size)?;
    let data = frame.read_words(return_offset, size)?;
    let outcome = if revert {
        CallOutcome::Reverted(data)
    } else {
        CallOutcome::Returned(data)
    };
    Ok(Flow::Halt(outcome))
}
