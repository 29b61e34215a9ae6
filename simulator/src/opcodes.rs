use num_enum::{IntoPrimitive, TryFromPrimitive};
use strum_macros::{Display, EnumCount, EnumIter};

use crate::gas::Gas;

/// The closed opcode table.
///
/// Each discriminant is the first byte of the instruction on the wire and the
/// selector used by the proving backend's circuit. Values are never reused:
/// new gadgets take fresh numbers at the end of the table.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Display,
    EnumCount,
    EnumIter,
    TryFromPrimitive,
    IntoPrimitive,
)]
#[repr(u8)]
pub enum Opcode {
    // Arithmetic
    Add = 0x00,
    Sub = 0x01,
    Mul = 0x02,
    Div = 0x03,
    FieldDiv = 0x04,

    // Comparison
    Eq = 0x05,
    Lt = 0x06,
    Lte = 0x07,

    // Bitwise
    And = 0x08,
    Or = 0x09,
    Xor = 0x0a,
    Not = 0x0b,
    Shl = 0x0c,
    Shr = 0x0d,

    // Type conversion
    Cast = 0x0e,

    // Execution environment
    GetEnvVar = 0x0f,
    CalldataCopy = 0x10,
    ReturndataSize = 0x11,
    ReturndataCopy = 0x12,

    // Control flow
    Jump = 0x13,
    JumpI = 0x14,
    InternalCall = 0x15,
    InternalReturn = 0x16,

    // Memory
    Set8 = 0x17,
    Set16 = 0x18,
    Set32 = 0x19,
    Set64 = 0x1a,
    Set128 = 0x1b,
    SetFf = 0x1c,
    Mov8 = 0x1d,
    Mov16 = 0x1e,

    // World state
    SLoad = 0x1f,
    SStore = 0x20,
    NoteHashExists = 0x21,
    EmitNoteHash = 0x22,
    NullifierExists = 0x23,
    EmitNullifier = 0x24,
    L1ToL2MessageExists = 0x25,

    // Accrued substate
    EmitUnencryptedLog = 0x26,
    SendL2ToL1Message = 0x27,

    // Contract calls
    Call = 0x28,
    StaticCall = 0x29,
    Return = 0x2a,
    Revert = 0x2b,

    // Misc
    DebugLog = 0x2c,

    // Gadgets
    Keccakf1600 = 0x2d,
    Sha256Compression = 0x2e,
    Poseidon2 = 0x2f,
    PedersenHash = 0x30,
    EcAdd = 0x31,
    Msm = 0x32,
    ToRadixBe = 0x33,
}

/// L2 gas charged for every operand resolved through a pointer.
pub const INDIRECT_ADDRESSING_L2_GAS: u32 = 3;

impl Opcode {
    /// Whether executing this opcode alters world state or accrued substate.
    /// These are rejected inside static calls.
    pub const fn is_state_mutating(self) -> bool {
        matches!(
            self,
            Opcode::SStore
                | Opcode::EmitNoteHash
                | Opcode::EmitNullifier
                | Opcode::EmitUnencryptedLog
                | Opcode::SendL2ToL1Message
        )
    }

    /// Fixed cost charged before the instruction executes.
    pub const fn base_gas(self) -> Gas {
        use Opcode::*;
        let (l2_gas, da_gas) = match self {
            Add | Sub | Eq | Lt | Lte | And | Or | Xor | Not | Cast => (10, 0),
            Mul | Shl | Shr => (12, 0),
            Div | FieldDiv => (24, 0),
            GetEnvVar | ReturndataSize => (5, 0),
            CalldataCopy | ReturndataCopy => (10, 0),
            Jump | InternalReturn => (4, 0),
            JumpI | InternalCall => (6, 0),
            Set8 | Set16 | Set32 | Set64 | Set128 | SetFf | Mov8 | Mov16 => (3, 0),
            SLoad => (129, 0),
            SStore => (1_657, 512),
            NoteHashExists | NullifierExists | L1ToL2MessageExists => (192, 0),
            EmitNoteHash => (1_285, 512),
            EmitNullifier => (1_540, 512),
            EmitUnencryptedLog => (18, 0),
            SendL2ToL1Message => (209, 512),
            Call | StaticCall => (45, 0),
            Return | Revert => (28, 0),
            DebugLog => (9, 0),
            Keccakf1600 => (58_176, 0),
            Sha256Compression => (12_288, 0),
            Poseidon2 => (78, 0),
            PedersenHash => (1_000, 0),
            EcAdd => (27, 0),
            Msm => (6_000, 0),
            ToRadixBe => (100, 0),
        };
        Gas::new(l2_gas, da_gas)
    }

    /// Per-unit cost for length-dependent opcodes (words copied, log fields
    /// emitted, points multiplied, limbs produced, words logged).
    pub const fn dynamic_gas(self) -> Gas {
        use Opcode::*;
        let (l2_gas, da_gas) = match self {
            CalldataCopy | ReturndataCopy | Return | Revert => (3, 0),
            EmitUnencryptedLog => (3, 32),
            Call | StaticCall => (3, 0),
            PedersenHash => (40, 0),
            Msm => (1_500, 0),
            ToRadixBe => (4, 0),
            DebugLog => (1, 0),
            _ => (0, 0),
        };
        Gas::new(l2_gas, da_gas)
    }
}

#[cfg(test)]
mod tests {
    use strum::IntoEnumIterator;

    use super::*;

    #[test]
    fn test_opcode_bytes_are_dense_and_stable() {
        for (i, opcode) in Opcode::iter().enumerate() {
            assert_eq!(u8::from(opcode) as usize, i);
            assert_eq!(Opcode::try_from(i as u8).unwrap(), opcode);
        }
        assert_eq!(u8::from(Opcode::EmitNoteHash), 0x22);
        assert!(Opcode::try_from(0xffu8).is_err());
    }

    #[test]
    fn test_every_opcode_costs_gas() {
        for opcode in Opcode::iter() {
            assert!(opcode.base_gas().l2_gas > 0, "{opcode} is free");
        }
    }

    #[test]
    fn test_state_mutating_set() {
        let mutating = Opcode::iter()
            .filter(|op| op.is_state_mutating())
            .collect::<Vec<_>>();
        assert_eq!(
            mutating,
            vec![
                Opcode::SStore,
                Opcode::EmitNoteHash,
                Opcode::EmitNullifier,
                Opcode::EmitUnencryptedLog,
                Opcode::SendL2ToL1Message
            ]
        );
    }
}
