use soroban_sdk::contracttype;

/// Gas oracle entry for one chain
#[contracttype]
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ChainData {
    /// USD per native token, scaled by 10^ORACLE_PRECISION
    pub price: u128,
    /// Native token per gas unit, scaled by 10^ORACLE_PRECISION
    pub gas_price: u128,
}
