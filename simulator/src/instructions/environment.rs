use ark_ff::Zero;

use crate::{
    bytecode::{DataCopy, GetEnvVar, ReturndataSize},
    execution::{frame::Flow, frame::Frame, ExecutionError},
    memory::TaggedValue,
    opcodes::Opcode,
    Fr,
};

pub(crate) fn get_env_var(frame: &mut Frame<'_>, op: &GetEnvVar) -> Result<Flow, ExecutionError> {
    let [dst_offset] = frame.resolve(op.indirect, [op.dst_offset])?;
    let value = frame.env.get(op.var, frame.gas);
    frame.memory.set(dst_offset, value);
    Ok(Flow::Next)
}

/// `count` words of `source` starting at `start`, zero past its end.
fn copy_window(source: &[Fr], start: u32, count: u32) -> Vec<Fr> {
    (0..count as usize)
        .map(|i| {
            (start as usize)
                .checked_add(i)
                .and_then(|index| source.get(index))
                .copied()
                .unwrap_or_else(Fr::zero)
        })
        .collect()
}

pub(crate) fn calldata_copy(frame: &mut Frame<'_>, op: &DataCopy) -> Result<Flow, ExecutionError> {
    let [start_offset, size_offset, dst_offset] =
        frame.resolve(op.indirect, [op.start_offset, op.copy_size_offset, op.dst_offset])?;
    let start = frame.memory.get_u32(start_offset)?;
    let size = frame.memory.get_u32(size_offset)?;
    frame.charge_dynamic(Opcode::CalldataCopy, size)?;
    let words = copy_window(&frame.env.calldata, start, size);
    frame.memory.set_field_slice(dst_offset, &words)?;
    Ok(Flow::Next)
}

pub(crate) fn returndata_size(
    frame: &mut Frame<'_>,
    op: &ReturndataSize,
) -> Result<Flow, ExecutionError> {
    let [dst_offset] = frame.resolve(op.indirect, [op.dst_offset])?;
    let size = frame.nested_returndata.len() as u32;
    frame.memory.set(dst_offset, TaggedValue::U32(size));
    Ok(Flow::Next)
}

pub(crate) fn returndata_copy(frame: &mut Frame<'_>, op: &DataCopy) -> Result<Flow, ExecutionError> {
    let [start_offset, size_offset, dst_offset] =
        frame.resolve(op.indirect, [op.start_offset, op.copy_size_offset, op.dst_offset])?;
    let start = frame.memory.get_u32(start_offset)?;
    let size = frame.memory.get_u32(size_offset)?;
    frame.charge_dynamic(Opcode::ReturndataCopy, size)?;
    let words = copy_window(&frame.nested_returndata, start, size);
    frame.memory.set_field_slice(dst_offset, &words)?;
    Ok(Flow::Next)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_copy_window_pads_with_zero() {
        let source = [Fr::from(1u64), Fr::from(2u64)];
        assert_eq!(
            copy_window(&source, 1, 3),
            vec![Fr::from(2u64), Fr::zero(), Fr::zero()]
        );
        assert_eq!(copy_window(&source, u32::MAX, 1), vec![Fr::zero()]);
        assert!(copy_window(&source, 0, 0).is_empty());
    }
}
