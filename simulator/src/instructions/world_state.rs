//! Public storage and tree-membership instructions.

use crate::{
    bytecode::{
        EmitNoteHash, EmitNullifier, L1ToL2MessageExists, NoteHashExists, NullifierExists, SLoad,
        SStore,
    },
    execution::{frame::Flow, frame::Frame, ExecutionError},
    memory::TaggedValue,
    opcodes::Opcode,
};

pub(crate) fn sload(frame: &mut Frame<'_>, op: &SLoad) -> Result<Flow, ExecutionError> {
    let [slot_offset, dst_offset] = frame.resolve(op.indirect, [op.slot_offset, op.dst_offset])?;
    let slot = frame.memory.get_field(slot_offset)?;
    let value = frame.journal.read_storage(frame.env.storage_address, slot);
    frame.memory.set(dst_offset, TaggedValue::Field(value));
    Ok(Flow::Next)
}

pub(crate) fn sstore(frame: &mut Frame<'_>, op: &SStore) -> Result<Flow, ExecutionError> {
    frame.ensure_not_static(Opcode::SStore)?;
    let [src_offset, slot_offset] = frame.resolve(op.indirect, [op.src_offset, op.slot_offset])?;
    let value = frame.memory.get_field(src_offset)?;
    let slot = frame.memory.get_field(slot_offset)?;
    frame
        .journal
        .write_storage(frame.env.storage_address, slot, value);
    Ok(Flow::Next)
}

pub(crate) fn note_hash_exists(
    frame: &mut Frame<'_>,
    op: &NoteHashExists,
) -> Result<Flow, ExecutionError> {
    let [note_hash_offset, leaf_index_offset, exists_offset] = frame.resolve(
        op.indirect,
        [op.note_hash_offset, op.leaf_index_offset, op.exists_offset],
    )?;
    let note_hash = frame.memory.get_field(note_hash_offset)?;
    let (leaf_index, leaf_index_u64) = frame.read_leaf_index(leaf_index_offset)?;
    let exists = frame.journal.check_note_hash_exists(
        frame.env.storage_address,
        note_hash,
        leaf_index,
        leaf_index_u64,
    );
    frame.memory.set(exists_offset, TaggedValue::U1(exists));
    Ok(Flow::Next)
}

pub(crate) fn emit_note_hash(frame: &mut Frame<'_>, op: &EmitNoteHash) -> Result<Flow, ExecutionError> {
    frame.ensure_not_static(Opcode::EmitNoteHash)?;
    let [note_hash_offset] = frame.resolve(op.indirect, [op.note_hash_offset])?;
    let note_hash = frame.memory.get_field(note_hash_offset)?;
    frame
        .journal
        .write_note_hash(frame.env.storage_address, note_hash);
    Ok(Flow::Next)
}

pub(crate) fn nullifier_exists(
    frame: &mut Frame<'_>,
    op: &NullifierExists,
) -> Result<Flow, ExecutionError> {
    let [nullifier_offset, address_offset, exists_offset] = frame.resolve(
        op.indirect,
        [op.nullifier_offset, op.address_offset, op.exists_offset],
    )?;
    let nullifier = frame.memory.get_field(nullifier_offset)?;
    let address = frame.memory.get_field(address_offset)?;
    let exists = frame.journal.check_nullifier_exists(address, nullifier);
    frame.memory.set(exists_offset, TaggedValue::U1(exists));
    Ok(Flow::Next)
}

pub(crate) fn emit_nullifier(frame: &mut Frame<'_>, op: &EmitNullifier) -> Result<Flow, ExecutionError> {
    frame.ensure_not_static(Opcode::EmitNullifier)?;
    let [nullifier_offset] = frame.resolve(op.indirect, [op.nullifier_offset])?;
    let nullifier = frame.memory.get_field(nullifier_offset)?;
    frame
        .journal
        .write_nullifier(frame.env.storage_address, nullifier)?;
    Ok(Flow::Next)
}

pub(crate) fn l1_to_l2_message_exists(
    frame: &mut Frame<'_>,
    op: &L1ToL2MessageExists,
) -> Result<Flow, ExecutionError> {
    let [msg_hash_offset, msg_leaf_index_offset, exists_offset] = frame.resolve(
        op.indirect,
        [op.msg_hash_offset, op.msg_leaf_index_offset, op.exists_offset],
    )?;
    let msg_hash = frame.memory.get_field(msg_hash_offset)?;
    let (leaf_index, leaf_index_u64) = frame.read_leaf_index(msg_leaf_index_offset)?;
    let exists = frame
        .journal
        .check_l1_to_l2_message_exists(msg_hash, leaf_index, leaf_index_u64);
    frame.memory.set(exists_offset, TaggedValue::U1(exists));
    Ok(Flow::Next)
}
