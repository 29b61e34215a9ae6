use ark_ff::{BigInteger, PrimeField};

use crate::Fr;

/// Big-endian digits of `value` in `radix`, exactly `num_limbs` of them.
/// Digits that do not fit in `num_limbs` are dropped from the top.
///
/// `radix` must lie in `2..=256`.
pub fn to_radix_be(value: &Fr, radix: u32, num_limbs: usize) -> Vec<u8> {
    debug_assert!((2..=256).contains(&radix));
    let mut quotient = value.into_bigint().to_bytes_be();
    let mut limbs = vec![0u8; num_limbs];
    for limb in limbs.iter_mut().rev() {
        let mut remainder = 0u32;
        for byte in quotient.iter_mut() {
            let acc = (remainder << 8) | *byte as u32;
            *byte = (acc / radix) as u8;
            remainder = acc % radix;
        }
        *limb = remainder as u8;
    }
    limbs
}
