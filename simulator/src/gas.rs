use std::ops::{Add, Mul};

/// Remaining (or charged) gas in both dimensions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Gas {
    /// Execution gas.
    pub l2_gas: u32,
    /// Data-availability gas.
    pub da_gas: u32,
}

impl Gas {
    pub const fn new(l2_gas: u32, da_gas: u32) -> Self {
        Self { l2_gas, da_gas }
    }

    pub const fn zero() -> Self {
        Self::new(0, 0)
    }

    /// Subtracts `cost`, or returns `None` if either dimension would go
    /// negative.
    pub fn checked_sub(self, cost: Gas) -> Option<Gas> {
        Some(Self {
            l2_gas: self.l2_gas.checked_sub(cost.l2_gas)?,
            da_gas: self.da_gas.checked_sub(cost.da_gas)?,
        })
    }

    pub fn saturating_sub(self, other: Gas) -> Gas {
        Self {
            l2_gas: self.l2_gas.saturating_sub(other.l2_gas),
            da_gas: self.da_gas.saturating_sub(other.da_gas),
        }
    }

    /// Gas handed to a nested call: what was requested, capped so the
    /// caller always keeps 1/64 of its remaining gas in each dimension.
    pub fn allocate_nested(self, requested: Gas) -> Gas {
        let cap = |remaining: u32| remaining - remaining / 64;
        Self {
            l2_gas: requested.l2_gas.min(cap(self.l2_gas)),
            da_gas: requested.da_gas.min(cap(self.da_gas)),
        }
    }
}

impl Add for Gas {
    type Output = Gas;

    fn add(self, rhs: Gas) -> Gas {
        Self {
            l2_gas: self.l2_gas.saturating_add(rhs.l2_gas),
            da_gas: self.da_gas.saturating_add(rhs.da_gas),
        }
    }
}

impl Mul<u32> for Gas {
    type Output = Gas;

    fn mul(self, rhs: u32) -> Gas {
        Self {
            l2_gas: self.l2_gas.saturating_mul(rhs),
            da_gas: self.da_gas.saturating_mul(rhs),
        }
    }
}

impl std::fmt::Display for Gas {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "l2={} da={}", self.l2_gas, self.da_gas)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checked_sub_fails_per_dimension() {
        let gas = Gas::new(10, 5);
        assert_eq!(gas.checked_sub(Gas::new(10, 5)), Some(Gas::zero()));
        assert_eq!(gas.checked_sub(Gas::new(11, 0)), None);
        assert_eq!(gas.checked_sub(Gas::new(0, 6)), None);
    }

    #[test]
    fn test_nested_allocation_keeps_reserve() {
        let remaining = Gas::new(6400, 64);
        assert_eq!(
            remaining.allocate_nested(Gas::new(u32::MAX, u32::MAX)),
            Gas::new(6300, 63)
        );
        assert_eq!(
            remaining.allocate_nested(Gas::new(100, 1)),
            Gas::new(100, 1)
        );
        assert_eq!(Gas::zero().allocate_nested(Gas::new(1, 1)), Gas::zero());
    }

    #[test]
    fn test_scaled_cost_saturates() {
        assert_eq!(Gas::new(3, 32) * 4, Gas::new(12, 128));
        assert_eq!(Gas::new(u32::MAX, 0) * 2, Gas::new(u32::MAX, 0));
    }
}
