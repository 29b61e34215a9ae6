use thiserror::Error;

use super::TypeTag;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MemoryError {
    #[error("tag mismatch at offset {offset}: expected {expected}, found {found}")]
    TagMismatch {
        offset: u32,
        expected: TypeTag,
        found: TypeTag,
    },
    #[error("operands carry different tags: {lhs} and {rhs}")]
    OperandTagMismatch { lhs: TypeTag, rhs: TypeTag },
    #[error("operation requires an integral tag, found {0}")]
    IntegralTagRequired(TypeTag),
    #[error("operation requires a FIELD tag, found {0}")]
    FieldTagRequired(TypeTag),
    #[error("memory slice [{offset}, {offset} + {size}) exceeds the address space")]
    SliceOutOfRange { offset: u32, size: u64 },
}
