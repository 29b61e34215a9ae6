use crate::{
    bytecode::{EmitUnencryptedLog, SendL2ToL1Message},
    execution::{frame::Flow, frame::Frame, ExecutionError},
    opcodes::Opcode,
};

pub(crate) fn emit_unencrypted_log(
    frame: &mut Frame<'_>,
    op: &EmitUnencryptedLog,
) -> Result<Flow, ExecutionError> {
    frame.ensure_not_static(Opcode::EmitUnencryptedLog)?;
    let [log_offset, log_size_offset] =
        frame.resolve(op.indirect, [op.log_offset, op.log_size_offset])?;
    let size = frame.memory.get_u32(log_size_offset)?;
    frame.charge_dynamic(Opcode::EmitUnencryptedLog, size)?;
    let log = frame.read_words(log_offset, size)?;
    frame.journal.write_unencrypted_log(frame.env.address, log);
    Ok(Flow::Next)
}

pub(crate) fn send_l2_to_l1_message(
    frame: &mut Frame<'_>,
    op: &SendL2ToL1Message,
) -> Result<Flow, ExecutionError> {
    frame.ensure_not_static(Opcode::SendL2ToL1Message)?;
    let [recipient_offset, content_offset] =
        frame.resolve(op.indirect, [op.recipient_offset, op.content_offset])?;
    let recipient = frame.memory.get_field(recipient_offset)?;
    let content = frame.memory.get_field(content_offset)?;
    frame
        .journal
        .write_l2_to_l1_message(frame.env.address, recipient, content);
    Ok(Flow::Next)
}
