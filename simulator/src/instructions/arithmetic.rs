//! Arithmetic, comparison, bitwise and cast instructions.

use crate::{
    bytecode::{BinaryOp, Cast, UnaryOp},
    execution::{frame::Flow, frame::Frame, ExecutionError},
    memory::TaggedValue,
};

type BinaryFn = fn(&TaggedValue, &TaggedValue) -> Result<TaggedValue, ExecutionError>;

/// `dst = f(a, b)`. Tag rules are enforced by `f`.
pub(crate) fn binary(frame: &mut Frame<'_>, op: &BinaryOp, f: BinaryFn) -> Result<Flow, ExecutionError> {
    let [a_offset, b_offset, dst_offset] =
        frame.resolve(op.indirect, [op.a_offset, op.b_offset, op.dst_offset])?;
    let a = frame.memory.get(a_offset);
    let b = frame.memory.get(b_offset);
    frame.memory.set(dst_offset, f(&a, &b)?);
    Ok(Flow::Next)
}

pub(crate) fn add(a: &TaggedValue, b: &TaggedValue) -> Result<TaggedValue, ExecutionError> {
    Ok(a.add(b)?)
}

pub(crate) fn sub(a: &TaggedValue, b: &TaggedValue) -> Result<TaggedValue, ExecutionError> {
    Ok(a.sub(b)?)
}

pub(crate) fn mul(a: &TaggedValue, b: &TaggedValue) -> Result<TaggedValue, ExecutionError> {
    Ok(a.mul(b)?)
}

pub(crate) fn div(a: &TaggedValue, b: &TaggedValue) -> Result<TaggedValue, ExecutionError> {
    a.div(b)?.ok_or(ExecutionError::DivisionByZero)
}

pub(crate) fn field_div(a: &TaggedValue, b: &TaggedValue) -> Result<TaggedValue, ExecutionError> {
    a.field_div(b)?.ok_or(ExecutionError::DivisionByZero)
}

pub(crate) fn eq(a: &TaggedValue, b: &TaggedValue) -> Result<TaggedValue, ExecutionError> {
    Ok(a.eq(b)?)
}

pub(crate) fn lt(a: &TaggedValue, b: &TaggedValue) -> Result<TaggedValue, ExecutionError> {
    Ok(a.lt(b)?)
}

pub(crate) fn lte(a: &TaggedValue, b: &TaggedValue) -> Result<TaggedValue, ExecutionError> {
    Ok(a.lte(b)?)
}

pub(crate) fn and(a: &TaggedValue, b: &TaggedValue) -> Result<TaggedValue, ExecutionError> {
    Ok(a.and(b)?)
}

pub(crate) fn or(a: &TaggedValue, b: &TaggedValue) -> Result<TaggedValue, ExecutionError> {
    Ok(a.or(b)?)
}

pub(crate) fn xor(a: &TaggedValue, b: &TaggedValue) -> Result<TaggedValue, ExecutionError> {
    Ok(a.xor(b)?)
}

pub(crate) fn shl(a: &TaggedValue, b: &TaggedValue) -> Result<TaggedValue, ExecutionError> {
    Ok(a.shl(b)?)
}

pub(crate) fn shr(a: &TaggedValue, b: &TaggedValue) -> Result<TaggedValue, ExecutionError> {
    Ok(a.shr(b)?)
}

pub(crate) fn not(frame: &mut Frame<'_>, op: &UnaryOp) -> Result<Flow, ExecutionError> {
    let [src_offset, dst_offset] = frame.resolve(op.indirect, [op.src_offset, op.dst_offset])?;
    let value = frame.memory.get(src_offset).not()?;
    frame.memory.set(dst_offset, value);
    Ok(Flow::Next)
}

pub(crate) fn cast(frame: &mut Frame<'_>, op: &Cast) -> Result<Flow, ExecutionError> {
    let [src_offset, dst_offset] = frame.resolve(op.indirect, [op.src_offset, op.dst_offset])?;
    let value = frame.memory.get(src_offset).cast(op.dst_tag);
    frame.memory.set(dst_offset, value);
    Ok(Flow::Next)
}
