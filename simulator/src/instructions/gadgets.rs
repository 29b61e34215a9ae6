//! Hash, curve and decomposition gadgets.

use tracing::trace;

use crate::{
    bytecode::{
        EcAdd, Keccakf1600, Msm, PedersenHash, Poseidon2, Sha256Compression, ToRadixBe,
    },
    execution::{frame::Flow, frame::Frame, ExecutionError},
    gadgets::{keccak_f1600, msm as grumpkin_msm, sha256_compression, to_radix_be, GrumpkinPoint},
    memory::{field_low_u128, MemoryError, TaggedValue, TypeTag},
    opcodes::Opcode,
    Fr,
};

/// Reads `N` slots that must all carry `tag`, as integers.
fn read_words_tagged<const N: usize>(
    frame: &Frame<'_>,
    tag: TypeTag,
    offset: u32,
) -> Result<[u128; N], ExecutionError> {
    frame.memory.check_tags_range(tag, offset, N as u32)?;
    let mut words = [0u128; N];
    for (word, value) in words.iter_mut().zip(frame.memory.get_slice(offset, N as u32)?) {
        *word = value.to_u128_lossy();
    }
    Ok(words)
}

fn write_words(
    frame: &mut Frame<'_>,
    tag: TypeTag,
    offset: u32,
    words: impl IntoIterator<Item = u128>,
) -> Result<(), ExecutionError> {
    let values = words
        .into_iter()
        .map(|word| TaggedValue::from_u128_truncating(word, tag))
        .collect::<Vec<_>>();
    frame.memory.set_slice(offset, &values)?;
    Ok(())
}

/// Reads a Grumpkin point laid out as `x, y, is_infinite`.
fn read_point(
    frame: &Frame<'_>,
    x_offset: u32,
    y_offset: u32,
    infinite_offset: u32,
) -> Result<GrumpkinPoint, ExecutionError> {
    let x = frame.memory.get_field(x_offset)?;
    let y = frame.memory.get_field(y_offset)?;
    frame.memory.check_tag(TypeTag::U1, infinite_offset)?;
    let point = GrumpkinPoint::new(x, y, !frame.memory.get(infinite_offset).is_zero());
    if !point.is_on_curve() {
        return Err(ExecutionError::PointNotOnCurve { x, y });
    }
    Ok(point)
}

fn write_point(frame: &mut Frame<'_>, offset: u32, point: &GrumpkinPoint) -> Result<(), ExecutionError> {
    frame.memory.set_slice(
        offset,
        &[
            TaggedValue::Field(point.x),
            TaggedValue::Field(point.y),
            TaggedValue::U1(point.is_infinite),
        ],
    )?;
    Ok(())
}

/// `base + index * stride + field`, failing past the address space.
fn element_offset(base: u32, index: u32, stride: u32, field: u32) -> Result<u32, ExecutionError> {
    index
        .checked_mul(stride)
        .and_then(|at| at.checked_add(field))
        .and_then(|at| base.checked_add(at))
        .ok_or_else(|| {
            MemoryError::SliceOutOfRange {
                offset: base,
                size: (index as u64 + 1) * stride as u64,
            }
            .into()
        })
}

pub(crate) fn keccakf1600(frame: &mut Frame<'_>, op: &Keccakf1600) -> Result<Flow, ExecutionError> {
    let [dst_offset, input_offset] = frame.resolve(op.indirect, [op.dst_offset, op.input_offset])?;
    let lanes = read_words_tagged::<25>(frame, TypeTag::U64, input_offset)?;
    let state = keccak_f1600(lanes.map(|lane| lane as u64));
    write_words(frame, TypeTag::U64, dst_offset, state.map(u128::from))?;
    Ok(Flow::Next)
}

pub(crate) fn sha256_compression_op(
    frame: &mut Frame<'_>,
    op: &Sha256Compression,
) -> Result<Flow, ExecutionError> {
    let [output_offset, state_offset, inputs_offset] = frame.resolve(
        op.indirect,
        [op.output_offset, op.state_offset, op.inputs_offset],
    )?;
    let state = read_words_tagged::<8>(frame, TypeTag::U32, state_offset)?;
    let inputs = read_words_tagged::<16>(frame, TypeTag::U32, inputs_offset)?;
    let output = sha256_compression(state.map(|w| w as u32), inputs.map(|w| w as u32));
    write_words(frame, TypeTag::U32, output_offset, output.map(u128::from))?;
    Ok(Flow::Next)
}

pub(crate) fn poseidon2(frame: &mut Frame<'_>, op: &Poseidon2) -> Result<Flow, ExecutionError> {
    let [input_offset, output_offset] =
        frame.resolve(op.indirect, [op.input_offset, op.output_offset])?;
    let input = frame.memory.get_field_slice(input_offset, 4)?;
    let input: [Fr; 4] = [input[0], input[1], input[2], input[3]];
    let output = frame.ctx.blackbox.poseidon2_permutation(&input)?;
    frame.memory.set_field_slice(output_offset, &output)?;
    Ok(Flow::Next)
}

pub(crate) fn pedersen_hash(frame: &mut Frame<'_>, op: &PedersenHash) -> Result<Flow, ExecutionError> {
    let [gen_index_offset, output_offset, input_offset, input_size_offset] = frame.resolve(
        op.indirect,
        [
            op.gen_index_offset,
            op.output_offset,
            op.input_offset,
            op.input_size_offset,
        ],
    )?;
    let generator_index = frame.memory.get_u32(gen_index_offset)?;
    let input_size = frame.memory.get_u32(input_size_offset)?;
    frame.charge_dynamic(Opcode::PedersenHash, input_size)?;
    let inputs = frame.memory.get_field_slice(input_offset, input_size)?;
    let hash = frame.ctx.blackbox.pedersen_hash(&inputs, generator_index)?;
    frame.memory.set(output_offset, TaggedValue::Field(hash));
    Ok(Flow::Next)
}

pub(crate) fn ec_add(frame: &mut Frame<'_>, op: &EcAdd) -> Result<Flow, ExecutionError> {
    let [p1_x, p1_y, p1_inf, p2_x, p2_y, p2_inf, dst_offset] = frame.resolve(
        op.indirect,
        [
            op.p1_x_offset,
            op.p1_y_offset,
            op.p1_infinite_offset,
            op.p2_x_offset,
            op.p2_y_offset,
            op.p2_infinite_offset,
            op.dst_offset,
        ],
    )?;
    let p1 = read_point(frame, p1_x, p1_y, p1_inf)?;
    let p2 = read_point(frame, p2_x, p2_y, p2_inf)?;
    let sum = p1.add(&p2);
    trace!(?p1, ?p2, ?sum, "ec add");
    write_point(frame, dst_offset, &sum)?;
    Ok(Flow::Next)
}

pub(crate) fn msm(frame: &mut Frame<'_>, op: &Msm) -> Result<Flow, ExecutionError> {
    let [points_offset, scalars_offset, output_offset, length_offset] = frame.resolve(
        op.indirect,
        [
            op.points_offset,
            op.scalars_offset,
            op.output_offset,
            op.points_length_offset,
        ],
    )?;
    let length = frame.memory.get_u32(length_offset)?;
    frame.charge_dynamic(Opcode::Msm, length)?;
    let mut points = Vec::with_capacity(length as usize);
    let mut scalars = Vec::with_capacity(length as usize);
    for i in 0..length {
        points.push(read_point(
            frame,
            element_offset(points_offset, i, 3, 0)?,
            element_offset(points_offset, i, 3, 1)?,
            element_offset(points_offset, i, 3, 2)?,
        )?);
        let lo = frame.memory.get_field(element_offset(scalars_offset, i, 2, 0)?)?;
        let hi = frame.memory.get_field(element_offset(scalars_offset, i, 2, 1)?)?;
        scalars.push((field_low_u128(&lo), field_low_u128(&hi)));
    }
    let result = grumpkin_msm(&points, &scalars);
    write_point(frame, output_offset, &result)?;
    Ok(Flow::Next)
}

pub(crate) fn to_radix_be_op(frame: &mut Frame<'_>, op: &ToRadixBe) -> Result<Flow, ExecutionError> {
    let [src_offset, radix_offset, dst_offset] =
        frame.resolve(op.indirect, [op.src_offset, op.radix_offset, op.dst_offset])?;
    let value = frame.memory.get_field(src_offset)?;
    let radix = frame.memory.get_u32(radix_offset)?;
    if !(2..=256).contains(&radix) {
        return Err(ExecutionError::InvalidRadix(radix));
    }
    frame.charge_dynamic(Opcode::ToRadixBe, op.num_limbs)?;
    let limbs = to_radix_be(&value, radix, op.num_limbs as usize);
    let tag = if op.output_bits {
        TypeTag::U1
    } else {
        TypeTag::U8
    };
    write_words(frame, tag, dst_offset, limbs.into_iter().map(u128::from))?;
    Ok(Flow::Next)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_element_offset() {
        assert_eq!(element_offset(10, 2, 3, 1).unwrap(), 17);
        assert!(element_offset(u32::MAX, 1, 3, 0).is_err());
        assert!(element_offset(0, u32::MAX, 3, 0).is_err());
    }
}
