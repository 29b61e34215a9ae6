use crate::{
    bytecode::{Jump, JumpI},
    execution::{frame::Flow, frame::Frame, ExecutionError},
};

pub(crate) fn jump(_frame: &mut Frame<'_>, op: &Jump) -> Result<Flow, ExecutionError> {
    Ok(Flow::JumpTo(op.loc))
}

/// Branches when the condition slot holds a non-zero value of any tag.
pub(crate) fn jumpi(frame: &mut Frame<'_>, op: &JumpI) -> Result<Flow, ExecutionError> {
    let [cond_offset] = frame.resolve(op.indirect, [op.cond_offset])?;
    if frame.memory.get(cond_offset).is_zero() {
        Ok(Flow::Next)
    } else {
        Ok(Flow::JumpTo(op.loc))
    }
}

pub(crate) fn internal_call(frame: &mut Frame<'_>, op: &Jump) -> Result<Flow, ExecutionError> {
    frame.internal_call_stack.push(frame.pc + 1);
    Ok(Flow::JumpTo(op.loc))
}

pub(crate) fn internal_return(frame: &mut Frame<'_>) -> Result<Flow, ExecutionError> {
    frame
        .internal_call_stack
        .pop()
        .map(Flow::JumpTo)
        .ok_or(ExecutionError::InternalCallStackUnderflow)
}
