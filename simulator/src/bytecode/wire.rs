//! Byte-level building blocks of the instruction encoding. All multi-byte
//! integers are big-endian; there is no padding between operands.

use ark_ff::{BigInteger, PrimeField};

use super::DecodeError;
use crate::{environment::EnvironmentVariable, memory::TypeTag, Fr};

/// Cursor over a bytecode blob.
#[derive(Debug, Clone)]
pub(crate) struct BytecodeReader<'a> {
    bytes: &'a [u8],
    position: usize,
}

impl<'a> BytecodeReader<'a> {
    pub(crate) const fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, position: 0 }
    }

    pub(crate) const fn position(&self) -> usize {
        self.position
    }

    pub(crate) const fn is_empty(&self) -> bool {
        self.position >= self.bytes.len()
    }

    pub(crate) fn read_array<const N: usize>(&mut self) -> Result<[u8; N], DecodeError> {
        let available = self.bytes.len() - self.position;
        let chunk = self
            .bytes
            .get(self.position..self.position + N)
            .ok_or(DecodeError::Truncated {
                position: self.position,
                needed: N,
                available,
            })?;
        self.position += N;
        let mut out = [0u8; N];
        out.copy_from_slice(chunk);
        Ok(out)
    }

    pub(crate) fn read_u8(&mut self) -> Result<u8, DecodeError> {
        self.read_array::<1>().map(|[byte]| byte)
    }
}

/// A single operand type that can appear on the wire.
pub(crate) trait WireField: Sized {
    fn read(reader: &mut BytecodeReader<'_>) -> Result<Self, DecodeError>;
    fn write(&self, out: &mut Vec<u8>);
}

macro_rules! impl_wire_field_for_int {
    ($($t:ty),*) => {
        $(
            impl WireField for $t {
                fn read(reader: &mut BytecodeReader<'_>) -> Result<Self, DecodeError> {
                    reader.read_array().map(<$t>::from_be_bytes)
                }

                fn write(&self, out: &mut Vec<u8>) {
                    out.extend_from_slice(&self.to_be_bytes());
                }
            }
        )*
    };
}

impl_wire_field_for_int!(u8, u16, u32, u64, u128);

impl WireField for bool {
    fn read(reader: &mut BytecodeReader<'_>) -> Result<Self, DecodeError> {
        let position = reader.position();
        match reader.read_u8()? {
            0 => Ok(false),
            1 => Ok(true),
            flag => Err(DecodeError::InvalidFlag { flag, position }),
        }
    }

    fn write(&self, out: &mut Vec<u8>) {
        out.push(*self as u8);
    }
}

impl WireField for TypeTag {
    fn read(reader: &mut BytecodeReader<'_>) -> Result<Self, DecodeError> {
        let position = reader.position();
        let tag = reader.read_u8()?;
        TypeTag::try_from(tag).map_err(|_| DecodeError::InvalidTag { tag, position })
    }

    fn write(&self, out: &mut Vec<u8>) {
        out.push((*self).into());
    }
}

impl WireField for EnvironmentVariable {
    fn read(reader: &mut BytecodeReader<'_>) -> Result<Self, DecodeError> {
        let position = reader.position();
        let var = reader.read_u8()?;
        EnvironmentVariable::try_from(var)
            .map_err(|_| DecodeError::InvalidEnvironmentVariable { var, position })
    }

    fn write(&self, out: &mut Vec<u8>) {
        out.push((*self).into());
    }
}

impl WireField for Fr {
    fn read(reader: &mut BytecodeReader<'_>) -> Result<Self, DecodeError> {
        let position = reader.position();
        let bytes = reader.read_array::<32>()?;
        let value = Fr::from_be_bytes_mod_order(&bytes);
        if value.into_bigint().to_bytes_be() != bytes {
            return Err(DecodeError::NonCanonicalField { position });
        }
        Ok(value)
    }

    fn write(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.into_bigint().to_bytes_be());
    }
}

/// The full operand list of one instruction.
pub(crate) trait WireOperands: Sized {
    fn read(reader: &mut BytecodeReader<'_>) -> Result<Self, DecodeError>;
    fn write(&self, out: &mut Vec<u8>);
}

/// Declares an operand struct whose wire layout is its fields in order.
macro_rules! define_operands {
    ($(
        $(#[$meta:meta])*
        $name:ident { $($(#[$field_meta:meta])* $field:ident : $ty:ty),* $(,)? }
    )*) => {
        $(
            $(#[$meta])*
            #[derive(Debug, Clone, Copy, PartialEq, Eq)]
            pub struct $name {
                $($(#[$field_meta])* pub $field: $ty,)*
            }

            impl $crate::bytecode::wire::WireOperands for $name {
                #[allow(unused_variables)]
                fn read(
                    reader: &mut $crate::bytecode::wire::BytecodeReader<'_>,
                ) -> Result<Self, $crate::bytecode::DecodeError> {
                    Ok(Self {
                        $($field: <$ty as $crate::bytecode::wire::WireField>::read(reader)?,)*
                    })
                }

                #[allow(unused_variables)]
                fn write(&self, out: &mut Vec<u8>) {
                    $($crate::bytecode::wire::WireField::write(&self.$field, out);)*
                }
            }
        )*
    };
}

pub(crate) use define_operands;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reader_reports_truncation() {
        let mut reader = BytecodeReader::new(&[0x01, 0x02, 0x03]);
        assert_eq!(reader.read_u8().unwrap(), 1);
        assert_eq!(
            u32::read(&mut reader).unwrap_err(),
            DecodeError::Truncated {
                position: 1,
                needed: 4,
                available: 2
            }
        );
    }

    #[test]
    fn test_integers_are_big_endian() {
        let mut out = Vec::new();
        0x1234_5678u32.write(&mut out);
        0xabcdu16.write(&mut out);
        assert_eq!(out, [0x12, 0x34, 0x56, 0x78, 0xab, 0xcd]);
    }

    #[test]
    fn test_field_immediate_must_be_canonical() {
        let mut reader = BytecodeReader::new(&[0xff; 32]);
        assert_eq!(
            Fr::read(&mut reader).unwrap_err(),
            DecodeError::NonCanonicalField { position: 0 }
        );

        let mut out = Vec::new();
        (-Fr::from(1u64)).write(&mut out);
        assert_eq!(out.len(), 32);
        let mut reader = BytecodeReader::new(&out);
        assert_eq!(Fr::read(&mut reader).unwrap(), -Fr::from(1u64));
        assert!(reader.is_empty());
    }

    #[test]
    fn test_enum_bytes_are_validated() {
        let mut reader = BytecodeReader::new(&[7]);
        assert_eq!(
            TypeTag::read(&mut reader).unwrap_err(),
            DecodeError::InvalidTag {
                tag: 7,
                position: 0
            }
        );
        let mut reader = BytecodeReader::new(&[2]);
        assert_eq!(
            bool::read(&mut reader).unwrap_err(),
            DecodeError::InvalidFlag {
                flag: 2,
                position: 0
            }
        );
    }
}
