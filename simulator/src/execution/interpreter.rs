//! Dispatch from decoded instructions to their handlers.

use super::{frame::Flow, frame::Frame, ExecutionError};
use crate::{
    bytecode::Instruction,
    instructions::{
        accrued_substate, arithmetic, control_flow, environment, external_calls, gadgets, memory,
        misc, world_state,
    },
};

impl Instruction {
    /// Executes the instruction against `frame`. Base gas has already been
    /// charged.
    pub(crate) fn execute(&self, frame: &mut Frame<'_>) -> Result<Flow, ExecutionError> {
        match self {
            Self::Add(op) => arithmetic::binary(frame, op, arithmetic::add),
            Self::Sub(op) => arithmetic::binary(frame, op, arithmetic::sub),
            Self::Mul(op) => arithmetic::binary(frame, op, arithmetic::mul),
            Self::Div(op) => arithmetic::binary(frame, op, arithmetic::div),
            Self::FieldDiv(op) => arithmetic::binary(frame, op, arithmetic::field_div),
            Self::Eq(op) => arithmetic::binary(frame, op, arithmetic::eq),
            Self::Lt(op) => arithmetic::binary(frame, op, arithmetic::lt),
            Self::Lte(op) => arithmetic::binary(frame, op, arithmetic::lte),
            Self::And(op) => arithmetic::binary(frame, op, arithmetic::and),
            Self::Or(op) => arithmetic::binary(frame, op, arithmetic::or),
            Self::Xor(op) => arithmetic::binary(frame, op, arithmetic::xor),
            Self::Not(op) => arithmetic::not(frame, op),
            Self::Shl(op) => arithmetic::binary(frame, op, arithmetic::shl),
            Self::Shr(op) => arithmetic::binary(frame, op, arithmetic::shr),
            Self::Cast(op) => arithmetic::cast(frame, op),
            Self::GetEnvVar(op) => environment::get_env_var(frame, op),
            Self::CalldataCopy(op) => environment::calldata_copy(frame, op),
            Self::ReturndataSize(op) => environment::returndata_size(frame, op),
            Self::ReturndataCopy(op) => environment::returndata_copy(frame, op),
            Self::Jump(op) => control_flow::jump(frame, op),
            Self::JumpI(op) => control_flow::jumpi(frame, op),
            Self::InternalCall(op) => control_flow::internal_call(frame, op),
            Self::InternalReturn(_) => control_flow::internal_return(frame),
            Self::Set8(op) => memory::set(frame, op),
            Self::Set16(op) => memory::set(frame, op),
            Self::Set32(op) => memory::set(frame, op),
            Self::Set64(op) => memory::set(frame, op),
            Self::Set128(op) => memory::set(frame, op),
            Self::SetFf(op) => memory::set(frame, op),
            Self::Mov8(op) => memory::mov(frame, op),
            Self::Mov16(op) => memory::mov(frame, op),
            Self::SLoad(op) => world_state::sload(frame, op),
            Self::SStore(op) => world_state::sstore(frame, op),
            Self::NoteHashExists(op) => world_state::note_hash_exists(frame, op),
            Self::EmitNoteHash(op) => world_state::emit_note_hash(frame, op),
            Self::NullifierExists(op) => world_state::nullifier_exists(frame, op),
            Self::EmitNullifier(op) => world_state::emit_nullifier(frame, op),
            Self::L1ToL2MessageExists(op) => world_state::l1_to_l2_message_exists(frame, op),
            Self::EmitUnencryptedLog(op) => accrued_substate::emit_unencrypted_log(frame, op),
            Self::SendL2ToL1Message(op) => accrued_substate::send_l2_to_l1_message(frame, op),
            Self::Call(op) => external_calls::call(frame, op, false),
            Self::StaticCall(op) => external_calls::call(frame, op, true),
            Self::Return(op) => external_calls::halt(frame, op, false),
            Self::Revert(op) => external_calls::halt(frame, op, true),
            Self::DebugLog(op) => misc::debug_log(frame, op),
            Self::Keccakf1600(op) => gadgets::keccakf1600(frame, op),
            Self::Sha256Compression(op) => gadgets::sha256_compression_op(frame, op),
            Self::Poseidon2(op) => gadgets::poseidon2(frame, op),
            Self::PedersenHash(op) => gadgets::pedersen_hash(frame, op),
            Self::EcAdd(op) => gadgets::ec_add(frame, op),
            Self::Msm(op) => gadgets::msm(frame, op),
            Self::ToRadixBe(op) => gadgets::to_radix_be_op(frame, op),
        }
    }
}
