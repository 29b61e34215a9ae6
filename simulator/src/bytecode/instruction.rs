//! Decoded instruction shapes. Every operand struct's fields are listed in
//! wire order, and bit `i` of `indirect` refers to the `i`-th memory-offset
//! field (immediates such as jump targets and sizes are never indirect).

use super::{
    wire::{define_operands, BytecodeReader, WireField, WireOperands},
    DecodeError,
};
use crate::{
    environment::EnvironmentVariable,
    memory::{TaggedValue, TypeTag},
    opcodes::Opcode,
    Fr,
};

define_operands! {
    /// `dst = a <op> b`.
    BinaryOp {
        indirect: u8,
        a_offset: u32,
        b_offset: u32,
        dst_offset: u32,
    }

    UnaryOp {
        indirect: u8,
        src_offset: u32,
        dst_offset: u32,
    }

    Cast {
        indirect: u8,
        src_offset: u32,
        dst_offset: u32,
        dst_tag: TypeTag,
    }

    GetEnvVar {
        indirect: u8,
        var: EnvironmentVariable,
        dst_offset: u32,
    }

    /// Copies `memory[copy_size_offset]` words of calldata or return data,
    /// starting at word `memory[start_offset]`, into `dst_offset..`.
    DataCopy {
        indirect: u8,
        start_offset: u32,
        copy_size_offset: u32,
        dst_offset: u32,
    }

    ReturndataSize {
        indirect: u8,
        dst_offset: u32,
    }

    Jump {
        loc: u32,
    }

    JumpI {
        indirect: u8,
        cond_offset: u32,
        loc: u32,
    }

    NoOperands {}

    SLoad {
        indirect: u8,
        slot_offset: u32,
        dst_offset: u32,
    }

    SStore {
        indirect: u8,
        src_offset: u32,
        slot_offset: u32,
    }

    NoteHashExists {
        indirect: u8,
        note_hash_offset: u32,
        leaf_index_offset: u32,
        exists_offset: u32,
    }

    EmitNoteHash {
        indirect: u8,
        note_hash_offset: u32,
    }

    NullifierExists {
        indirect: u8,
        nullifier_offset: u32,
        address_offset: u32,
        exists_offset: u32,
    }

    EmitNullifier {
        indirect: u8,
        nullifier_offset: u32,
    }

    L1ToL2MessageExists {
        indirect: u8,
        msg_hash_offset: u32,
        msg_leaf_index_offset: u32,
        exists_offset: u32,
    }

    EmitUnencryptedLog {
        indirect: u8,
        log_offset: u32,
        log_size_offset: u32,
    }

    SendL2ToL1Message {
        indirect: u8,
        recipient_offset: u32,
        content_offset: u32,
    }

    /// Operands shared by `Call` and `StaticCall`.
    ExternalCall {
        indirect: u8,
        /// L2 gas at `gas_offset`, DA gas at `gas_offset + 1`.
        gas_offset: u32,
        address_offset: u32,
        args_offset: u32,
        args_size_offset: u32,
        ret_offset: u32,
        ret_size: u32,
        success_offset: u32,
        function_selector_offset: u32,
    }

    /// Operands shared by `Return` and `Revert`.
    Halt {
        indirect: u8,
        return_offset: u32,
        return_size_offset: u32,
    }

    /// `message_size` U8 characters at `message_offset`, with `{}`
    /// placeholders filled from the FIELD words at `fields_offset`.
    DebugLog {
        indirect: u8,
        message_offset: u32,
        fields_offset: u32,
        fields_size_offset: u32,
        message_size: u32,
    }

    Keccakf1600 {
        indirect: u8,
        dst_offset: u32,
        input_offset: u32,
    }

    Sha256Compression {
        indirect: u8,
        output_offset: u32,
        state_offset: u32,
        inputs_offset: u32,
    }

    Poseidon2 {
        indirect: u8,
        input_offset: u32,
        output_offset: u32,
    }

    PedersenHash {
        indirect: u8,
        gen_index_offset: u32,
        output_offset: u32,
        input_offset: u32,
        input_size_offset: u32,
    }

    EcAdd {
        indirect: u8,
        p1_x_offset: u32,
        p1_y_offset: u32,
        p1_infinite_offset: u32,
        p2_x_offset: u32,
        p2_y_offset: u32,
        p2_infinite_offset: u32,
        dst_offset: u32,
    }

    Msm {
        indirect: u8,
        points_offset: u32,
        scalars_offset: u32,
        output_offset: u32,
        points_length_offset: u32,
    }

    ToRadixBe {
        indirect: u8,
        src_offset: u32,
        radix_offset: u32,
        dst_offset: u32,
        num_limbs: u32,
        output_bits: bool,
    }
}

/// Writes an immediate to memory under an explicit tag. The immediate width
/// is chosen by the opcode variant, independently of the tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Set<T> {
    pub indirect: u8,
    pub tag: TypeTag,
    pub value: T,
    pub dst_offset: u32,
}

impl<T: WireField> WireOperands for Set<T> {
    fn read(reader: &mut BytecodeReader<'_>) -> Result<Self, DecodeError> {
        Ok(Self {
            indirect: u8::read(reader)?,
            tag: TypeTag::read(reader)?,
            value: T::read(reader)?,
            dst_offset: u32::read(reader)?,
        })
    }

    fn write(&self, out: &mut Vec<u8>) {
        self.indirect.write(out);
        self.tag.write(out);
        self.value.write(out);
        self.dst_offset.write(out);
    }
}

/// An immediate that `Set` can store under any tag.
pub trait SetImmediate: Copy {
    fn to_tagged(&self, tag: TypeTag) -> TaggedValue;
}

macro_rules! impl_set_immediate_for_int {
    ($($t:ty),*) => {
        $(
            impl SetImmediate for $t {
                fn to_tagged(&self, tag: TypeTag) -> TaggedValue {
                    TaggedValue::from_u128_truncating(*self as u128, tag)
                }
            }
        )*
    };
}

impl_set_immediate_for_int!(u8, u16, u32, u64, u128);

impl SetImmediate for Fr {
    fn to_tagged(&self, tag: TypeTag) -> TaggedValue {
        TaggedValue::Field(*self).cast(tag)
    }
}

/// Copies one slot, tag included. The offset width is chosen by the opcode
/// variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mov<T> {
    pub indirect: u8,
    pub src_offset: T,
    pub dst_offset: T,
}

impl<T: WireField> WireOperands for Mov<T> {
    fn read(reader: &mut BytecodeReader<'_>) -> Result<Self, DecodeError> {
        Ok(Self {
            indirect: u8::read(reader)?,
            src_offset: T::read(reader)?,
            dst_offset: T::read(reader)?,
        })
    }

    fn write(&self, out: &mut Vec<u8>) {
        self.indirect.write(out);
        self.src_offset.write(out);
        self.dst_offset.write(out);
    }
}

macro_rules! define_instructions {
    ($($variant:ident($operands:ty)),* $(,)?) => {
        /// One decoded instruction. Variants mirror [`Opcode`] one-to-one, so
        /// a missing decoder is a compile error.
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        pub enum Instruction {
            $($variant($operands),)*
        }

        impl Instruction {
            pub const fn opcode(&self) -> Opcode {
                match self {
                    $(Self::$variant(_) => Opcode::$variant,)*
                }
            }

            pub(crate) fn read_operands(
                opcode: Opcode,
                reader: &mut BytecodeReader<'_>,
            ) -> Result<Self, DecodeError> {
                match opcode {
                    $(Opcode::$variant => <$operands as WireOperands>::read(reader).map(Self::$variant),)*
                }
            }

            pub(crate) fn write_operands(&self, out: &mut Vec<u8>) {
                match self {
                    $(Self::$variant(operands) => operands.write(out),)*
                }
            }
        }
    };
}

define_instructions! {
    Add(BinaryOp),
    Sub(BinaryOp),
    Mul(BinaryOp),
    Div(BinaryOp),
    FieldDiv(BinaryOp),
    Eq(BinaryOp),
    Lt(BinaryOp),
    Lte(BinaryOp),
    And(BinaryOp),
    Or(BinaryOp),
    Xor(BinaryOp),
    Not(UnaryOp),
    Shl(BinaryOp),
    Shr(BinaryOp),
    Cast(Cast),
    GetEnvVar(GetEnvVar),
    CalldataCopy(DataCopy),
    ReturndataSize(ReturndataSize),
    ReturndataCopy(DataCopy),
    Jump(Jump),
    JumpI(JumpI),
    InternalCall(Jump),
    InternalReturn(NoOperands),
    Set8(Set<u8>),
    Set16(Set<u16>),
    Set32(Set<u32>),
    Set64(Set<u64>),
    Set128(Set<u128>),
    SetFf(Set<Fr>),
    Mov8(Mov<u8>),
    Mov16(Mov<u16>),
    SLoad(SLoad),
    SStore(SStore),
    NoteHashExists(NoteHashExists),
    EmitNoteHash(EmitNoteHash),
    NullifierExists(NullifierExists),
    EmitNullifier(EmitNullifier),
    L1ToL2MessageExists(L1ToL2MessageExists),
    EmitUnencryptedLog(EmitUnencryptedLog),
    SendL2ToL1Message(SendL2ToL1Message),
    Call(ExternalCall),
    StaticCall(ExternalCall),
    Return(Halt),
    Revert(Halt),
    DebugLog(DebugLog),
    Keccakf1600(Keccakf1600),
    Sha256Compression(Sha256Compression),
    Poseidon2(Poseidon2),
    PedersenHash(PedersenHash),
    EcAdd(EcAdd),
    Msm(Msm),
    ToRadixBe(ToRadixBe),
}
