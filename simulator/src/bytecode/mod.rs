//! Bytecode codec.
//!
//! An instruction is its opcode byte followed by that opcode's operands,
//! laid out back to back with no alignment padding. Decoding walks the blob
//! once and either yields the whole program or fails; it never yields a
//! prefix.

mod error;
mod instruction;
pub(crate) mod wire;

pub use error::DecodeError;
pub use instruction::*;
use tracing::{debug, instrument};
use wire::BytecodeReader;

use crate::opcodes::Opcode;

/// Decodes a complete bytecode blob.
#[instrument(level = "debug", skip_all, fields(len = bytecode.len()))]
pub fn decode(bytecode: &[u8]) -> Result<Vec<Instruction>, DecodeError> {
    let mut reader = BytecodeReader::new(bytecode);
    let mut instructions = Vec::new();
    while !reader.is_empty() {
        instructions.push(decode_instruction(&mut reader)?);
    }
    debug!(count = instructions.len(), "decoded bytecode");
    Ok(instructions)
}

fn decode_instruction(reader: &mut BytecodeReader<'_>) -> Result<Instruction, DecodeError> {
    let position = reader.position();
    let opcode = reader.read_u8()?;
    let opcode =
        Opcode::try_from(opcode).map_err(|_| DecodeError::UnknownOpcode { opcode, position })?;
    Instruction::read_operands(opcode, reader)
}

/// Encodes a program; the inverse of [`decode`].
pub fn encode(instructions: &[Instruction]) -> Vec<u8> {
    let mut out = Vec::new();
    for instruction in instructions {
        instruction.encode_into(&mut out);
    }
    out
}

impl Instruction {
    pub fn encode_into(&self, out: &mut Vec<u8>) {
        out.push(self.opcode().into());
        self.write_operands(out);
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::new();
        self.encode_into(&mut out);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::TypeTag;

    #[test]
    fn test_decode_emit_note_hash() {
        let bytes = [u8::from(Opcode::EmitNoteHash), 0x01, 0x12, 0x34, 0x56, 0x78];
        let decoded = decode(&bytes).unwrap();
        assert_eq!(
            decoded,
            vec![Instruction::EmitNoteHash(EmitNoteHash {
                indirect: 0x01,
                note_hash_offset: 0x1234_5678
            })]
        );
        assert_eq!(encode(&decoded), bytes);
    }

    #[test]
    fn test_set_immediate_width_follows_variant() {
        let set16 = Instruction::Set16(Set {
            indirect: 0,
            tag: TypeTag::U64,
            value: 0xbeef,
            dst_offset: 3,
        });
        assert_eq!(
            set16.to_bytes(),
            [u8::from(Opcode::Set16), 0, 5, 0xbe, 0xef, 0, 0, 0, 3]
        );

        let mov8 = Instruction::Mov8(Mov {
            indirect: 0,
            src_offset: 1,
            dst_offset: 2,
        });
        assert_eq!(mov8.to_bytes(), [u8::from(Opcode::Mov8), 0, 1, 2]);
    }

    #[test]
    fn test_unknown_opcode_is_fatal() {
        let mut bytes = Instruction::InternalReturn(NoOperands {}).to_bytes();
        bytes.push(0xee);
        assert_eq!(
            decode(&bytes).unwrap_err(),
            DecodeError::UnknownOpcode {
                opcode: 0xee,
                position: 1
            }
        );
    }

    #[test]
    fn test_truncated_operand_is_fatal() {
        let mut bytes = Instruction::Jump(Jump { loc: 7 }).to_bytes();
        bytes.pop();
        assert!(matches!(
            decode(&bytes),
            Err(DecodeError::Truncated { position: 1, .. })
        ));
    }

    #[test]
    fn test_empty_bytecode_decodes_to_nothing() {
        assert!(decode(&[]).unwrap().is_empty());
    }
}
