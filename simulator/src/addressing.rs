use smallvec::SmallVec;

use crate::memory::{MemoryError, TaggedMemory};

/// Per-operand addressing modes decoded from an instruction's `indirect`
/// byte. Bit `i` set means operand `i` names a slot that holds the real
/// offset as a `U32`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Addressing {
    indirect: u8,
}

impl Addressing {
    pub const fn new(indirect: u8) -> Self {
        Self { indirect }
    }

    pub const fn is_indirect(&self, operand: usize) -> bool {
        operand < 8 && (self.indirect >> operand) & 1 == 1
    }

    /// Number of indirect operands among the first `operand_count`.
    pub fn indirect_count(&self, operand_count: usize) -> u32 {
        (0..operand_count.min(8))
            .filter(|&i| self.is_indirect(i))
            .count() as u32
    }

    /// Resolves every operand to the offset it ultimately refers to.
    pub fn resolve(
        &self,
        offsets: &[u32],
        memory: &TaggedMemory,
    ) -> Result<SmallVec<[u32; 8]>, MemoryError> {
        offsets
            .iter()
            .enumerate()
            .map(|(i, &offset)| {
                if self.is_indirect(i) {
                    memory.get_u32(offset)
                } else {
                    Ok(offset)
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{TaggedValue, TypeTag};

    #[test]
    fn test_direct_operands_pass_through() {
        let memory = TaggedMemory::new();
        let resolved = Addressing::new(0).resolve(&[1, 2, 3], &memory).unwrap();
        assert_eq!(resolved.as_slice(), &[1, 2, 3]);
    }

    #[test]
    fn test_indirect_operands_follow_pointers() {
        let mut memory = TaggedMemory::new();
        memory.set(10, TaggedValue::U32(100));
        memory.set(30, TaggedValue::U32(300));
        let addressing = Addressing::new(0b101);
        assert_eq!(addressing.indirect_count(3), 2);
        let resolved = addressing.resolve(&[10, 20, 30], &memory).unwrap();
        assert_eq!(resolved.as_slice(), &[100, 20, 300]);
    }

    #[test]
    fn test_pointer_must_be_u32() {
        let mut memory = TaggedMemory::new();
        memory.set(0, TaggedValue::U64(5));
        let err = Addressing::new(1).resolve(&[0], &memory).unwrap_err();
        assert_eq!(
            err,
            MemoryError::TagMismatch {
                offset: 0,
                expected: TypeTag::U32,
                found: TypeTag::U64
            }
        );
    }
}
