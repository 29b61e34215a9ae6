//! Tagged memory for a single call frame.
//!
//! Every slot holds exactly one [`TaggedValue`]. Slots that were never
//! written read back as `FIELD(0)`.

mod error;
mod tagged;

use ahash::AHashMap;
pub use error::MemoryError;
pub(crate) use tagged::{field_low_u128, field_to_u64};
pub use tagged::{TaggedValue, TypeTag};
use tracing::trace;

use crate::Fr;

/// Memory is addressed by `u32` offsets, so at most `2^32` slots exist.
pub const MAX_MEMORY_SIZE: u64 = 1 << 32;

/// Flat, sparsely backed word memory.
#[derive(Debug, Clone, Default)]
pub struct TaggedMemory {
    slots: AHashMap<u32, TaggedValue>,
}

impl TaggedMemory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads the value at `offset`.
    pub fn get(&self, offset: u32) -> TaggedValue {
        let value = self.slots.get(&offset).copied().unwrap_or_default();
        trace!(offset, %value, "memory get");
        value
    }

    pub fn set(&mut self, offset: u32, value: TaggedValue) {
        trace!(offset, %value, "memory set");
        self.slots.insert(offset, value);
    }

    pub fn get_tag(&self, offset: u32) -> TypeTag {
        self.get(offset).tag()
    }

    /// Reads `size` contiguous slots starting at `offset`.
    pub fn get_slice(&self, offset: u32, size: u32) -> Result<Vec<TaggedValue>, MemoryError> {
        check_range(offset, size as u64)?;
        Ok((0..size).map(|i| self.get(offset + i)).collect())
    }

    /// Writes `values` to contiguous slots starting at `offset`.
    pub fn set_slice(&mut self, offset: u32, values: &[TaggedValue]) -> Result<(), MemoryError> {
        check_range(offset, values.len() as u64)?;
        for (i, value) in values.iter().enumerate() {
            self.set(offset + i as u32, *value);
        }
        Ok(())
    }

    /// Fails unless the slot at `offset` carries `tag`.
    pub fn check_tag(&self, tag: TypeTag, offset: u32) -> Result<(), MemoryError> {
        let found = self.get_tag(offset);
        if found != tag {
            return Err(MemoryError::TagMismatch {
                offset,
                expected: tag,
                found,
            });
        }
        Ok(())
    }

    pub fn check_tags(&self, tag: TypeTag, offsets: &[u32]) -> Result<(), MemoryError> {
        offsets
            .iter()
            .try_for_each(|&offset| self.check_tag(tag, offset))
    }

    pub fn check_tags_range(&self, tag: TypeTag, offset: u32, size: u32) -> Result<(), MemoryError> {
        check_range(offset, size as u64)?;
        (0..size).try_for_each(|i| self.check_tag(tag, offset + i))
    }

    /// Reads a field element, requiring the FIELD tag.
    pub fn get_field(&self, offset: u32) -> Result<Fr, MemoryError> {
        self.check_tag(TypeTag::Field, offset)?;
        Ok(self.get(offset).to_field())
    }

    /// Reads a `U32` value, typically a size or an offset.
    pub fn get_u32(&self, offset: u32) -> Result<u32, MemoryError> {
        self.get(offset).as_offset(offset)
    }

    /// Reads a contiguous slice of FIELD-tagged slots.
    pub fn get_field_slice(&self, offset: u32, size: u32) -> Result<Vec<Fr>, MemoryError> {
        self.check_tags_range(TypeTag::Field, offset, size)?;
        Ok(self
            .get_slice(offset, size)?
            .iter()
            .map(TaggedValue::to_field)
            .collect())
    }

    /// Writes field elements tagged as FIELD.
    pub fn set_field_slice(&mut self, offset: u32, values: &[Fr]) -> Result<(), MemoryError> {
        let values = values.iter().copied().map(TaggedValue::Field).collect::<Vec<_>>();
        self.set_slice(offset, &values)
    }

    /// Number of slots that have been written at least once.
    pub fn touched_slots(&self) -> usize {
        self.slots.len()
    }
}

fn check_range(offset: u32, size: u64) -> Result<(), MemoryError> {
    if offset as u64 + size > MAX_MEMORY_SIZE {
        return Err(MemoryError::SliceOutOfRange { offset, size });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use ark_ff::Zero;

    use super::*;

    #[test]
    fn test_uninitialized_reads_are_field_zero() {
        let memory = TaggedMemory::new();
        assert_eq!(memory.get(1234), TaggedValue::Field(Fr::zero()));
        assert_eq!(memory.get_tag(u32::MAX), TypeTag::Field);
    }

    #[test]
    fn test_set_overwrites_value_and_tag() {
        let mut memory = TaggedMemory::new();
        memory.set(1, TaggedValue::Field(Fr::from(27u64)));
        memory.set(1, TaggedValue::U32(1234));
        assert_eq!(memory.get(1), TaggedValue::U32(1234));
        assert_eq!(memory.get_tag(1), TypeTag::U32);
    }

    #[test]
    fn test_slices_fill_gaps_with_zero() {
        let mut memory = TaggedMemory::new();
        memory
            .set_slice(10, &[TaggedValue::U8(1), TaggedValue::U8(2)])
            .unwrap();
        let slice = memory.get_slice(9, 4).unwrap();
        assert_eq!(
            slice,
            vec![
                TaggedValue::default(),
                TaggedValue::U8(1),
                TaggedValue::U8(2),
                TaggedValue::default()
            ]
        );
    }

    #[test]
    fn test_slice_past_address_space_fails() {
        let memory = TaggedMemory::new();
        assert_eq!(
            memory.get_slice(u32::MAX, 2).unwrap_err(),
            MemoryError::SliceOutOfRange {
                offset: u32::MAX,
                size: 2
            }
        );
        assert!(memory.get_slice(u32::MAX, 1).is_ok());
    }

    #[test]
    fn test_tag_checks() {
        let mut memory = TaggedMemory::new();
        memory.set(0, TaggedValue::U32(7));
        memory.set(1, TaggedValue::U64(7));
        assert_eq!(memory.get_u32(0).unwrap(), 7);
        assert_eq!(
            memory.get_u32(1).unwrap_err(),
            MemoryError::TagMismatch {
                offset: 1,
                expected: TypeTag::U32,
                found: TypeTag::U64
            }
        );
        assert!(memory.check_tags(TypeTag::U32, &[0, 1]).is_err());
        assert!(memory.get_field(2).is_ok());
    }
}
