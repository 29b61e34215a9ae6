use tracing::{debug, enabled, Level};

use crate::{
    bytecode::DebugLog,
    opcodes::Opcode,
    execution::{frame::Flow, frame::Frame, ExecutionError},
    Fr,
};

/// Substitutes `fields` into the `{}` placeholders of `template` in order.
/// Placeholders without a field are kept verbatim.
fn format_message(template: &str, fields: &[Fr]) -> String {
    let mut fields = fields.iter();
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(at) = rest.find("{}") {
        out.push_str(&rest[..at]);
        match fields.next() {
            Some(field) => out.push_str(&field.to_string()),
            None => out.push_str("{}"),
        }
        rest = &rest[at + 2..];
    }
    out.push_str(rest);
    out
}

pub(crate) fn debug_log(frame: &mut Frame<'_>, op: &DebugLog) -> Result<Flow, ExecutionError> {
    let [message_offset, fields_offset, fields_size_offset] = frame.resolve(
        op.indirect,
        [op.message_offset, op.fields_offset, op.fields_size_offset],
    )?;
    let fields_size = frame.memory.get_u32(fields_size_offset)?;
    frame.charge_dynamic(Opcode::DebugLog, op.message_size.saturating_add(fields_size))?;
    if !enabled!(Level::DEBUG) {
        return Ok(Flow::Next);
    }
    let message = frame
        .memory
        .get_slice(message_offset, op.message_size)?
        .iter()
        .map(|value| value.to_u128_lossy() as u8 as char)
        .collect::<String>();
    let fields = frame.read_words(fields_offset, fields_size)?;
    debug!(address = %frame.env.address, "{}", format_message(&message, &fields));
    Ok(Flow::Next)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_message() {
        let fields = [Fr::from(7u64), Fr::from(8u64)];
        assert_eq!(format_message("a={} b={}", &fields), "a=7 b=8");
        assert_eq!(format_message("{} {} {}", &fields[..1]), "7 {} {}");
        assert_eq!(format_message("plain", &fields), "plain");
    }
}
