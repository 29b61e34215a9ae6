//! Affine arithmetic on Grumpkin, `y^2 = x^3 - 17` over the BN254 scalar
//! field.

use ark_ff::{AdditiveGroup, Field, Zero};

use crate::Fr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GrumpkinPoint {
    pub x: Fr,
    pub y: Fr,
    pub is_infinite: bool,
}

fn curve_b() -> Fr {
    -Fr::from(17u64)
}

impl GrumpkinPoint {
    pub fn new(x: Fr, y: Fr, is_infinite: bool) -> Self {
        if is_infinite {
            return Self::infinity();
        }
        Self { x, y, is_infinite }
    }

    pub fn infinity() -> Self {
        Self {
            x: Fr::zero(),
            y: Fr::zero(),
            is_infinite: true,
        }
    }

    pub fn is_on_curve(&self) -> bool {
        self.is_infinite || self.y.square() == self.x.square() * self.x + curve_b()
    }

    pub fn neg(&self) -> Self {
        if self.is_infinite {
            return *self;
        }
        Self::new(self.x, -self.y, false)
    }

    pub fn double(&self) -> Self {
        if self.is_infinite {
            return *self;
        }
        let Some(inv) = self.y.double().inverse() else {
            return Self::infinity();
        };
        let lambda = self.x.square() * Fr::from(3u64) * inv;
        let x = lambda.square() - self.x.double();
        let y = lambda * (self.x - x) - self.y;
        Self::new(x, y, false)
    }

    pub fn add(&self, other: &Self) -> Self {
        if self.is_infinite {
            return *other;
        }
        if other.is_infinite {
            return *self;
        }
        if self.x == other.x {
            return if self.y == other.y {
                self.double()
            } else {
                Self::infinity()
            };
        }
        let Some(inv) = (other.x - self.x).inverse() else {
            return Self::infinity();
        };
        let lambda = (other.y - self.y) * inv;
        let x = lambda.square() - self.x - other.x;
        let y = lambda * (self.x - x) - self.y;
        Self::new(x, y, false)
    }

    /// Double-and-add with the 256-bit scalar `hi * 2^128 + lo`.
    pub fn mul(&self, lo: u128, hi: u128) -> Self {
        let mut acc = Self::infinity();
        for limb in [hi, lo] {
            for bit in (0..128).rev() {
                acc = acc.double();
                if (limb >> bit) & 1 == 1 {
                    acc = acc.add(self);
                }
            }
        }
        acc
    }
}

/// `sum(scalar_i * point_i)`; scalars are `(lo, hi)` 128-bit halves.
pub fn msm(points: &[GrumpkinPoint], scalars: &[(u128, u128)]) -> GrumpkinPoint {
    points
        .iter()
        .zip(scalars)
        .fold(GrumpkinPoint::infinity(), |acc, (point, &(lo, hi))| {
            acc.add(&point.mul(lo, hi))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn generator() -> GrumpkinPoint {
        let y = (-Fr::from(16u64)).sqrt().unwrap();
        GrumpkinPoint::new(Fr::from(1u64), y, false)
    }

    #[test]
    fn test_generator_is_on_curve() {
        assert!(generator().is_on_curve());
        assert!(!GrumpkinPoint::new(Fr::from(1u64), Fr::from(1u64), false).is_on_curve());
        assert!(GrumpkinPoint::infinity().is_on_curve());
    }

    #[test]
    fn test_group_law() {
        let g = generator();
        let two_g = g.add(&g);
        assert_eq!(two_g, g.double());
        assert!(two_g.is_on_curve());
        assert_eq!(g.add(&g.neg()), GrumpkinPoint::infinity());
        assert_eq!(g.add(&GrumpkinPoint::infinity()), g);
        assert_eq!(two_g.add(&g), g.add(&two_g));
    }

    #[test]
    fn test_scalar_multiplication() {
        let g = generator();
        assert_eq!(g.mul(0, 0), GrumpkinPoint::infinity());
        assert_eq!(g.mul(1, 0), g);
        assert_eq!(g.mul(3, 0), g.add(&g).add(&g));

        let mut expected = g;
        for _ in 0..128 {
            expected = expected.double();
        }
        assert_eq!(g.mul(0, 1), expected);
    }

    #[test]
    fn test_msm_sums_products() {
        let g = generator();
        let two_g = g.double();
        let result = msm(&[g, two_g], &[(5, 0), (3, 0)]);
        assert_eq!(result, g.mul(11, 0));
        assert_eq!(msm(&[], &[]), GrumpkinPoint::infinity());
    }
}
