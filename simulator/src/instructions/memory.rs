use crate::{
    bytecode::{Mov, Set, SetImmediate},
    execution::{frame::Flow, frame::Frame, ExecutionError},
};

pub(crate) fn set<T: SetImmediate>(frame: &mut Frame<'_>, op: &Set<T>) -> Result<Flow, ExecutionError> {
    let [dst_offset] = frame.resolve(op.indirect, [op.dst_offset])?;
    frame.memory.set(dst_offset, op.value.to_tagged(op.tag));
    Ok(Flow::Next)
}

pub(crate) fn mov<T: Into<u32> + Copy>(
    frame: &mut Frame<'_>,
    op: &Mov<T>,
) -> Result<Flow, ExecutionError> {
    let [src_offset, dst_offset] =
        frame.resolve(op.indirect, [op.src_offset.into(), op.dst_offset.into()])?;
    let value = frame.memory.get(src_offset);
    frame.memory.set(dst_offset, value);
    Ok(Flow::Next)
}
