use thiserror::Error;

/// Malformed bytecode. Decoding never yields a partial program.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// The byte at an instruction boundary is not in the opcode table.
    #[error("unknown opcode {opcode:#04x} at byte {position}")]
    UnknownOpcode { opcode: u8, position: usize },
    /// The bytecode ends in the middle of an operand.
    #[error("truncated operand at byte {position}: needed {needed} bytes, {available} left")]
    Truncated {
        position: usize,
        needed: usize,
        available: usize,
    },
    #[error("invalid type tag {tag:#04x} at byte {position}")]
    InvalidTag { tag: u8, position: usize },
    #[error("invalid environment variable {var:#04x} at byte {position}")]
    InvalidEnvironmentVariable { var: u8, position: usize },
    /// A boolean operand holds something other than 0 or 1.
    #[error("invalid flag byte {flag:#04x} at byte {position}")]
    InvalidFlag { flag: u8, position: usize },
    /// A 32-byte field immediate is not below the modulus.
    #[error("non-canonical field immediate at byte {position}")]
    NonCanonicalField { position: usize },
}
