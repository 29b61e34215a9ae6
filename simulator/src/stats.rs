use std::fmt;

use strum::{EnumCount, IntoEnumIterator};

use crate::{gas::Gas, opcodes::Opcode};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct OpcodeStats {
    count: u64,
    l2_gas: u64,
    da_gas: u64,
}

impl OpcodeStats {
    fn record(&mut self, gas: Gas) {
        self.count += 1;
        self.l2_gas += gas.l2_gas as u64;
        self.da_gas += gas.da_gas as u64;
    }

    fn average_l2_gas(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.l2_gas as f64 / self.count as f64
        }
    }
}

/// Per-opcode execution counts and gas, across every frame of a simulation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstructionStats {
    enabled: bool,
    stats: [OpcodeStats; Opcode::COUNT],
}

impl Default for InstructionStats {
    fn default() -> Self {
        Self::new(false)
    }
}

impl InstructionStats {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            stats: [OpcodeStats::default(); Opcode::COUNT],
        }
    }

    pub const fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub(crate) fn record(&mut self, opcode: Opcode, gas: Gas) {
        if self.enabled {
            self.stats[u8::from(opcode) as usize].record(gas);
        }
    }

    /// Folds in the stats of a nested call.
    pub(crate) fn merge(&mut self, other: &InstructionStats) {
        for (mine, theirs) in self.stats.iter_mut().zip(other.stats.iter()) {
            mine.count += theirs.count;
            mine.l2_gas += theirs.l2_gas;
            mine.da_gas += theirs.da_gas;
        }
    }

    pub fn count(&self, opcode: Opcode) -> u64 {
        self.stats[u8::from(opcode) as usize].count
    }

    pub fn total_instructions(&self) -> u64 {
        self.stats.iter().map(|s| s.count).sum()
    }

    /// `(opcode, executions, l2 gas, da gas)` for every opcode that ran.
    pub fn iter(&self) -> impl Iterator<Item = (Opcode, u64, u64, u64)> + '_ {
        Opcode::iter()
            .zip(self.stats.iter())
            .filter(|(_, s)| s.count > 0)
            .map(|(opcode, s)| (opcode, s.count, s.l2_gas, s.da_gas))
    }
}

impl fmt::Display for InstructionStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (opcode, s) in Opcode::iter().zip(self.stats.iter()) {
            if s.count == 0 {
                continue;
            }
            writeln!(
                f,
                "Opcode: {:<22} Count: {:>8}  L2 gas: {:>10}  DA gas: {:>8}  Avg L2: {:.2}",
                opcode.to_string(),
                s.count,
                s.l2_gas,
                s.da_gas,
                s.average_l2_gas()
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disabled_stats_record_nothing() {
        let mut stats = InstructionStats::new(false);
        stats.record(Opcode::Add, Gas::new(10, 0));
        assert_eq!(stats.total_instructions(), 0);
    }

    #[test]
    fn test_record_and_merge() {
        let mut parent = InstructionStats::new(true);
        parent.record(Opcode::Add, Gas::new(10, 0));
        let mut child = InstructionStats::new(true);
        child.record(Opcode::Add, Gas::new(13, 0));
        child.record(Opcode::SStore, Gas::new(1657, 512));
        parent.merge(&child);

        assert_eq!(parent.count(Opcode::Add), 2);
        assert_eq!(parent.total_instructions(), 3);
        let rows = parent.iter().collect::<Vec<_>>();
        assert_eq!(
            rows,
            vec![(Opcode::Add, 2, 23, 0), (Opcode::SStore, 1, 1657, 512)]
        );
        assert!(parent.to_string().contains("SStore"));
    }
}
