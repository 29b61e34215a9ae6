//! Per-call execution context: who is running, on whose behalf, with which
//! inputs, and the chain globals of the enclosing block.

use ark_ff::Zero;
use num_enum::{IntoPrimitive, TryFromPrimitive};
use strum_macros::{Display, EnumCount, EnumIter};

use crate::{gas::Gas, memory::TaggedValue, Fr};

/// Block-level values shared by every call in a transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlobalVariables {
    pub chain_id: Fr,
    pub version: Fr,
    pub block_number: Fr,
    pub timestamp: u64,
    pub fee_per_l2_gas: Fr,
    pub fee_per_da_gas: Fr,
}

impl Default for GlobalVariables {
    fn default() -> Self {
        Self {
            chain_id: Fr::zero(),
            version: Fr::zero(),
            block_number: Fr::zero(),
            timestamp: 0,
            fee_per_l2_gas: Fr::zero(),
            fee_per_da_gas: Fr::zero(),
        }
    }
}

/// Immutable context of one contract call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionEnvironment {
    pub address: Fr,
    pub storage_address: Fr,
    pub sender: Fr,
    pub function_selector: u32,
    pub transaction_fee: Fr,
    pub globals: GlobalVariables,
    pub is_static_call: bool,
    pub calldata: Vec<Fr>,
}

impl Default for ExecutionEnvironment {
    fn default() -> Self {
        Self {
            address: Fr::zero(),
            storage_address: Fr::zero(),
            sender: Fr::zero(),
            function_selector: 0,
            transaction_fee: Fr::zero(),
            globals: GlobalVariables::default(),
            is_static_call: false,
            calldata: Vec::new(),
        }
    }
}

impl ExecutionEnvironment {
    /// Environment of a call made from this one. The caller becomes the
    /// sender, and a static context can never be left again.
    pub fn derive_nested(
        &self,
        address: Fr,
        function_selector: u32,
        calldata: Vec<Fr>,
        is_static_call: bool,
    ) -> Self {
        Self {
            address,
            storage_address: address,
            sender: self.address,
            function_selector,
            transaction_fee: self.transaction_fee,
            globals: self.globals.clone(),
            is_static_call: self.is_static_call || is_static_call,
            calldata,
        }
    }

    /// Reads one environment variable with the tag it is exposed under.
    pub fn get(&self, var: EnvironmentVariable, gas_left: Gas) -> TaggedValue {
        use EnvironmentVariable::*;
        match var {
            Address => self.address.into(),
            StorageAddress => self.storage_address.into(),
            Sender => self.sender.into(),
            FunctionSelector => self.function_selector.into(),
            TransactionFee => self.transaction_fee.into(),
            ChainId => self.globals.chain_id.into(),
            Version => self.globals.version.into(),
            BlockNumber => self.globals.block_number.into(),
            Timestamp => self.globals.timestamp.into(),
            FeePerL2Gas => self.globals.fee_per_l2_gas.into(),
            FeePerDaGas => self.globals.fee_per_da_gas.into(),
            IsStaticCall => self.is_static_call.into(),
            L2GasLeft => gas_left.l2_gas.into(),
            DaGasLeft => gas_left.da_gas.into(),
        }
    }
}

/// Selector operand of `GetEnvVar`. The discriminant is the wire byte.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Display,
    EnumCount,
    EnumIter,
    TryFromPrimitive,
    IntoPrimitive,
)]
#[repr(u8)]
pub enum EnvironmentVariable {
    Address = 0,
    StorageAddress = 1,
    Sender = 2,
    FunctionSelector = 3,
    TransactionFee = 4,
    ChainId = 5,
    Version = 6,
    BlockNumber = 7,
    Timestamp = 8,
    FeePerL2Gas = 9,
    FeePerDaGas = 10,
    IsStaticCall = 11,
    L2GasLeft = 12,
    DaGasLeft = 13,
}

#[cfg(test)]
mod tests {
    use strum::IntoEnumIterator;

    use super::*;
    use crate::memory::TypeTag;

    #[test]
    fn test_variable_tags() {
        let env = ExecutionEnvironment::default();
        for var in EnvironmentVariable::iter() {
            let expected = match var {
                EnvironmentVariable::FunctionSelector
                | EnvironmentVariable::L2GasLeft
                | EnvironmentVariable::DaGasLeft => TypeTag::U32,
                EnvironmentVariable::Timestamp => TypeTag::U64,
                EnvironmentVariable::IsStaticCall => TypeTag::U1,
                _ => TypeTag::Field,
            };
            assert_eq!(env.get(var, Gas::zero()).tag(), expected, "{var}");
        }
    }

    #[test]
    fn test_nested_environment() {
        let parent = ExecutionEnvironment {
            address: Fr::from(1u64),
            sender: Fr::from(9u64),
            ..Default::default()
        };
        let child = parent.derive_nested(Fr::from(2u64), 7, vec![Fr::from(3u64)], false);
        assert_eq!(child.sender, Fr::from(1u64));
        assert_eq!(child.storage_address, Fr::from(2u64));
        assert_eq!(child.function_selector, 7);
        assert!(!child.is_static_call);

        let static_child = child.derive_nested(Fr::from(4u64), 0, vec![], true);
        assert!(static_child.is_static_call);
        let grandchild = static_child.derive_nested(Fr::from(5u64), 0, vec![], false);
        assert!(grandchild.is_static_call);
    }

    #[test]
    fn test_gas_left_is_live() {
        let env = ExecutionEnvironment::default();
        assert_eq!(
            env.get(EnvironmentVariable::DaGasLeft, Gas::new(1, 2)),
            TaggedValue::U32(2)
        );
    }
}
