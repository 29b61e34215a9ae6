use ark_ff::{BigInteger, Field, PrimeField, Zero};
use num_enum::{IntoPrimitive, TryFromPrimitive};
use strum_macros::{Display, EnumCount, EnumIter};

use super::MemoryError;
use crate::Fr;

/// The width/type tag carried by every memory slot.
///
/// The discriminants are part of the wire format (`Set`, `Cast`) and of the
/// proving backend's circuit, so they must never change.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
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
pub enum TypeTag {
    #[default]
    #[strum(serialize = "FIELD")]
    Field = 0,
    #[strum(serialize = "U1")]
    U1 = 1,
    #[strum(serialize = "U8")]
    U8 = 2,
    #[strum(serialize = "U16")]
    U16 = 3,
    #[strum(serialize = "U32")]
    U32 = 4,
    #[strum(serialize = "U64")]
    U64 = 5,
    #[strum(serialize = "U128")]
    U128 = 6,
}

impl TypeTag {
    /// Bit width of an integral tag, `None` for [`TypeTag::Field`].
    pub const fn bits(self) -> Option<u32> {
        match self {
            Self::Field => None,
            Self::U1 => Some(1),
            Self::U8 => Some(8),
            Self::U16 => Some(16),
            Self::U32 => Some(32),
            Self::U64 => Some(64),
            Self::U128 => Some(128),
        }
    }

    pub const fn is_integral(self) -> bool {
        !matches!(self, Self::Field)
    }

    /// Mask selecting the low `bits` bits of a `u128`.
    const fn mask(self) -> u128 {
        match self.bits() {
            Some(128) | None => u128::MAX,
            Some(bits) => (1u128 << bits) - 1,
        }
    }
}

/// A value stored in tagged memory.
///
/// Integral variants always hold an in-range value, so every arithmetic
/// helper below is total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaggedValue {
    Field(Fr),
    U1(bool),
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    U128(u128),
}

impl Default for TaggedValue {
    fn default() -> Self {
        Self::Field(Fr::zero())
    }
}

impl From<Fr> for TaggedValue {
    fn from(value: Fr) -> Self {
        Self::Field(value)
    }
}

impl From<bool> for TaggedValue {
    fn from(value: bool) -> Self {
        Self::U1(value)
    }
}

impl From<u8> for TaggedValue {
    fn from(value: u8) -> Self {
        Self::U8(value)
    }
}

impl From<u16> for TaggedValue {
    fn from(value: u16) -> Self {
        Self::U16(value)
    }
}

impl From<u32> for TaggedValue {
    fn from(value: u32) -> Self {
        Self::U32(value)
    }
}

impl From<u64> for TaggedValue {
    fn from(value: u64) -> Self {
        Self::U64(value)
    }
}

impl From<u128> for TaggedValue {
    fn from(value: u128) -> Self {
        Self::U128(value)
    }
}

impl std::fmt::Display for TaggedValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Field(v) => write!(f, "FIELD({v})"),
            _ => write!(f, "{}({:#x})", self.tag(), self.to_u128_lossy()),
        }
    }
}

/// Low 128 bits of a field element's canonical representative.
pub(crate) fn field_low_u128(value: &Fr) -> u128 {
    let limbs = value.into_bigint().0;
    (limbs[0] as u128) | ((limbs[1] as u128) << 64)
}

/// The field element as a `u64`, if its canonical representative fits.
pub(crate) fn field_to_u64(value: &Fr) -> Option<u64> {
    let limbs = value.into_bigint().0;
    limbs[1..].iter().all(|limb| *limb == 0).then_some(limbs[0])
}

impl TaggedValue {
    pub const fn tag(&self) -> TypeTag {
        match self {
            Self::Field(_) => TypeTag::Field,
            Self::U1(_) => TypeTag::U1,
            Self::U8(_) => TypeTag::U8,
            Self::U16(_) => TypeTag::U16,
            Self::U32(_) => TypeTag::U32,
            Self::U64(_) => TypeTag::U64,
            Self::U128(_) => TypeTag::U128,
        }
    }

    /// Builds a value of the given tag, keeping only the low bits that fit.
    pub fn from_u128_truncating(value: u128, tag: TypeTag) -> Self {
        let value = value & tag.mask();
        match tag {
            TypeTag::Field => Self::Field(Fr::from(value)),
            TypeTag::U1 => Self::U1(value == 1),
            TypeTag::U8 => Self::U8(value as u8),
            TypeTag::U16 => Self::U16(value as u16),
            TypeTag::U32 => Self::U32(value as u32),
            TypeTag::U64 => Self::U64(value as u64),
            TypeTag::U128 => Self::U128(value),
        }
    }

    /// Integer view of the value. Field elements are reduced to their low
    /// 128 bits.
    pub fn to_u128_lossy(&self) -> u128 {
        match *self {
            Self::Field(v) => field_low_u128(&v),
            Self::U1(v) => v as u128,
            Self::U8(v) => v as u128,
            Self::U16(v) => v as u128,
            Self::U32(v) => v as u128,
            Self::U64(v) => v as u128,
            Self::U128(v) => v,
        }
    }

    /// Exact field representation; every integral tag fits below the prime.
    pub fn to_field(&self) -> Fr {
        match *self {
            Self::Field(v) => v,
            _ => Fr::from(self.to_u128_lossy()),
        }
    }

    pub fn is_zero(&self) -> bool {
        match self {
            Self::Field(v) => v.is_zero(),
            _ => self.to_u128_lossy() == 0,
        }
    }

    /// Converts to `dst` tag: zero-extension when widening, low-bit
    /// truncation when narrowing, and exact embedding into the field.
    pub fn cast(&self, dst: TypeTag) -> Self {
        match (self, dst) {
            (Self::Field(v), TypeTag::Field) => Self::Field(*v),
            (_, TypeTag::Field) => Self::Field(self.to_field()),
            (_, _) => Self::from_u128_truncating(self.to_u128_lossy(), dst),
        }
    }

    /// Reads the value as a memory offset. Only `U32` values qualify.
    pub fn as_offset(&self, at: u32) -> Result<u32, MemoryError> {
        match *self {
            Self::U32(v) => Ok(v),
            other => Err(MemoryError::TagMismatch {
                offset: at,
                expected: TypeTag::U32,
                found: other.tag(),
            }),
        }
    }

    fn same_tag(&self, rhs: &Self) -> Result<TypeTag, MemoryError> {
        let tag = self.tag();
        if tag != rhs.tag() {
            return Err(MemoryError::OperandTagMismatch {
                lhs: tag,
                rhs: rhs.tag(),
            });
        }
        Ok(tag)
    }

    fn integral_pair(&self, rhs: &Self) -> Result<(TypeTag, u128, u128), MemoryError> {
        let tag = self.same_tag(rhs)?;
        if !tag.is_integral() {
            return Err(MemoryError::IntegralTagRequired(tag));
        }
        Ok((tag, self.to_u128_lossy(), rhs.to_u128_lossy()))
    }

    pub fn add(&self, rhs: &Self) -> Result<Self, MemoryError> {
        match (self, rhs) {
            (Self::Field(a), Self::Field(b)) => Ok(Self::Field(*a + b)),
            _ => {
                let (tag, a, b) = self.integral_pair(rhs)?;
                Ok(Self::from_u128_truncating(a.wrapping_add(b), tag))
            }
        }
    }

    pub fn sub(&self, rhs: &Self) -> Result<Self, MemoryError> {
        match (self, rhs) {
            (Self::Field(a), Self::Field(b)) => Ok(Self::Field(*a - b)),
            _ => {
                let (tag, a, b) = self.integral_pair(rhs)?;
                Ok(Self::from_u128_truncating(a.wrapping_sub(b), tag))
            }
        }
    }

    pub fn mul(&self, rhs: &Self) -> Result<Self, MemoryError> {
        match (self, rhs) {
            (Self::Field(a), Self::Field(b)) => Ok(Self::Field(*a * b)),
            _ => {
                let (tag, a, b) = self.integral_pair(rhs)?;
                Ok(Self::from_u128_truncating(a.wrapping_mul(b), tag))
            }
        }
    }

    /// Unsigned integer division. Returns `Ok(None)` on a zero divisor so
    /// the caller can report it with its own error type.
    pub fn div(&self, rhs: &Self) -> Result<Option<Self>, MemoryError> {
        let (tag, a, b) = self.integral_pair(rhs)?;
        Ok(a.checked_div(b).map(|q| Self::from_u128_truncating(q, tag)))
    }

    /// Field division (multiplication by the inverse). `Ok(None)` on zero.
    pub fn field_div(&self, rhs: &Self) -> Result<Option<Self>, MemoryError> {
        match (self, rhs) {
            (Self::Field(a), Self::Field(b)) => Ok(b.inverse().map(|inv| Self::Field(*a * inv))),
            _ => Err(MemoryError::FieldTagRequired(self.same_tag(rhs)?)),
        }
    }

    pub fn eq(&self, rhs: &Self) -> Result<Self, MemoryError> {
        self.same_tag(rhs)?;
        Ok(Self::U1(self == rhs))
    }

    pub fn lt(&self, rhs: &Self) -> Result<Self, MemoryError> {
        self.same_tag(rhs)?;
        Ok(Self::U1(self.compare(rhs).is_lt()))
    }

    pub fn lte(&self, rhs: &Self) -> Result<Self, MemoryError> {
        self.same_tag(rhs)?;
        Ok(Self::U1(self.compare(rhs).is_le()))
    }

    fn compare(&self, rhs: &Self) -> std::cmp::Ordering {
        match (self, rhs) {
            (Self::Field(a), Self::Field(b)) => a.into_bigint().cmp(&b.into_bigint()),
            _ => self.to_u128_lossy().cmp(&rhs.to_u128_lossy()),
        }
    }

    pub fn and(&self, rhs: &Self) -> Result<Self, MemoryError> {
        let (tag, a, b) = self.integral_pair(rhs)?;
        Ok(Self::from_u128_truncating(a & b, tag))
    }

    pub fn or(&self, rhs: &Self) -> Result<Self, MemoryError> {
        let (tag, a, b) = self.integral_pair(rhs)?;
        Ok(Self::from_u128_truncating(a | b, tag))
    }

    pub fn xor(&self, rhs: &Self) -> Result<Self, MemoryError> {
        let (tag, a, b) = self.integral_pair(rhs)?;
        Ok(Self::from_u128_truncating(a ^ b, tag))
    }

    pub fn not(&self) -> Result<Self, MemoryError> {
        let tag = self.tag();
        if !tag.is_integral() {
            return Err(MemoryError::IntegralTagRequired(tag));
        }
        Ok(Self::from_u128_truncating(!self.to_u128_lossy(), tag))
    }

    /// Left shift; shifting by the tag width or more yields zero.
    pub fn shl(&self, rhs: &Self) -> Result<Self, MemoryError> {
        let (tag, a, shift) = self.integral_pair(rhs)?;
        let bits = tag.bits().unwrap_or(128) as u128;
        let res = if shift >= bits { 0 } else { a << shift };
        Ok(Self::from_u128_truncating(res, tag))
    }

    /// Logical right shift; shifting by the tag width or more yields zero.
    pub fn shr(&self, rhs: &Self) -> Result<Self, MemoryError> {
        let (tag, a, shift) = self.integral_pair(rhs)?;
        let bits = tag.bits().unwrap_or(128) as u128;
        let res = if shift >= bits { 0 } else { a >> shift };
        Ok(Self::from_u128_truncating(res, tag))
    }

    /// Big-endian byte encoding, `ceil(bits / 8)` bytes wide (32 for fields).
    pub fn to_be_bytes(&self) -> Vec<u8> {
        match self {
            Self::Field(v) => v.into_bigint().to_bytes_be(),
            _ => {
                let width = self.tag().bits().unwrap_or(128).div_ceil(8) as usize;
                self.to_u128_lossy().to_be_bytes()[16 - width..].to_vec()
            }
        }
    }
}
