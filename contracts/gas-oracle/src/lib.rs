#![no_std]

use bridge_math::{mul_div, pow10};
use bridge_types::{AdminConfig, ChainData, Error, ORACLE_PRECISION, ORACLE_SCALING_FACTOR};
use soroban_sdk::{contract, contractimpl, contracttype, panic_with_error, Address, Env, Symbol};

#[contract]
pub struct GasOracle;

/// Storage keys
#[contracttype]
#[derive(Clone)]
pub enum DataKey {
    Admin,
    ChainId,
    /// 10^(ORACLE_PRECISION - chain precision)
    ScalingFactor,
    ChainData(u32),
}

// TTL constants
const INSTANCE_TTL_THRESHOLD: u32 = 17280; // ~1 day
const INSTANCE_TTL_EXTEND: u32 = 518400; // ~30 days
const PERSISTENT_TTL_THRESHOLD: u32 = 17280;
const PERSISTENT_TTL_EXTEND: u32 = 518400;

#[contractimpl]
impl GasOracle {
    /// Initialize the oracle for the local chain
    ///
    /// # Arguments
    /// * `chain_precision` - Decimals of the local native token
    pub fn initialize(
        env: Env,
        admin: Address,
        chain_id: u32,
        chain_precision: u32,
    ) -> Result<(), Error> {
        if env.storage().instance().has(&DataKey::Admin) {
            return Err(Error::AlreadyInitialized);
        }
        if chain_precision > ORACLE_PRECISION {
            return Err(Error::InvalidParameter);
        }

        admin.require_auth();

        let scaling_factor = pow10(ORACLE_PRECISION - chain_precision)?;
        env.storage()
            .instance()
            .set(&DataKey::Admin, &AdminConfig::new(admin));
        env.storage().instance().set(&DataKey::ChainId, &chain_id);
        env.storage()
            .instance()
            .set(&DataKey::ScalingFactor, &scaling_factor);
        extend_instance_ttl(&env);
        Ok(())
    }

    /// Set both the native token price and the gas price of a chain
    pub fn set_chain_data(env: Env, chain_id: u32, price: u128, gas_price: u128) {
        get_admin(&env).require_owner();
        set_chain_data(&env, chain_id, &ChainData { price, gas_price });
    }

    /// Set the USD price of a chain's native token
    pub fn set_price(env: Env, chain_id: u32, price: u128) {
        get_admin(&env).require_owner();
        let mut data = get_chain_data(&env, chain_id);
        data.price = price;
        set_chain_data(&env, chain_id, &data);
    }

    /// Set the price of one gas unit in a chain's native token
    pub fn set_gas_price(env: Env, chain_id: u32, gas_price: u128) {
        get_admin(&env).require_owner();
        let mut data = get_chain_data(&env, chain_id);
        data.gas_price = gas_price;
        set_chain_data(&env, chain_id, &data);
    }

    /// Transfer ownership of the oracle
    pub fn set_owner(env: Env, owner: Address) {
        let mut admin = get_admin(&env);
        admin.require_owner();
        admin.owner = owner.clone();
        env.storage().instance().set(&DataKey::Admin, &admin);
        extend_instance_ttl(&env);
        env.events()
            .publish((Symbol::new(&env, "owner_set"),), owner);
    }

    // === View Functions ===

    pub fn get_chain_data(env: Env, chain_id: u32) -> ChainData {
        get_chain_data(&env, chain_id)
    }

    /// USD price of a chain's native token
    pub fn price(env: Env, chain_id: u32) -> u128 {
        get_chain_data(&env, chain_id).price
    }

    /// Price of another chain's native token in local native tokens, scaled by 10^18
    pub fn cross_rate(env: Env, other_chain_id: u32) -> Result<u128, Error> {
        let own_price = local_price(&env)?;
        let other_price = get_chain_data(&env, other_chain_id).price;
        mul_div(&env, other_price, ORACLE_SCALING_FACTOR, own_price)
    }

    /// Cost of `gas_amount` gas on another chain, in local native tokens
    pub fn tx_cost_in_native(
        env: Env,
        other_chain_id: u32,
        gas_amount: u128,
    ) -> Result<u128, Error> {
        let own_price = local_price(&env)?;
        let other = get_chain_data(&env, other_chain_id);
        let gas_cost = other
            .gas_price
            .checked_mul(gas_amount)
            .ok_or(Error::MathOverflow)?;
        let cost = mul_div(&env, gas_cost, other.price, own_price)?;
        Ok(cost / get_scaling_factor(&env))
    }

    /// Cost of `gas_amount` gas on another chain in USD, scaled by 10^18
    pub fn tx_cost_in_usd(env: Env, other_chain_id: u32, gas_amount: u128) -> Result<u128, Error> {
        let other = get_chain_data(&env, other_chain_id);
        let gas_cost = other
            .gas_price
            .checked_mul(gas_amount)
            .ok_or(Error::MathOverflow)?;
        mul_div(&env, gas_cost, other.price, ORACLE_SCALING_FACTOR)
    }

    pub fn chain_id(env: Env) -> u32 {
        get_chain_id(&env)
    }

    pub fn get_admin(env: Env) -> AdminConfig {
        get_admin(&env)
    }
}

fn extend_instance_ttl(env: &Env) {
    env.storage()
        .instance()
        .extend_ttl(INSTANCE_TTL_THRESHOLD, INSTANCE_TTL_EXTEND);
}

fn get_admin(env: &Env) -> AdminConfig {
    extend_instance_ttl(env);
    env.storage()
        .instance()
        .get(&DataKey::Admin)
        .unwrap_or_else(|| panic_with_error!(env, Error::NotInitialized))
}

fn get_chain_id(env: &Env) -> u32 {
    env.storage()
        .instance()
        .get(&DataKey::ChainId)
        .unwrap_or_else(|| panic_with_error!(env, Error::NotInitialized))
}

fn get_scaling_factor(env: &Env) -> u128 {
    env.storage()
        .instance()
        .get(&DataKey::ScalingFactor)
        .unwrap_or_else(|| panic_with_error!(env, Error::NotInitialized))
}

fn get_chain_data(env: &Env, chain_id: u32) -> ChainData {
    let key = DataKey::ChainData(chain_id);
    env.storage()
        .persistent()
        .get(&key)
        .unwrap_or_default()
}

fn set_chain_data(env: &Env, chain_id: u32, data: &ChainData) {
    let key = DataKey::ChainData(chain_id);
    env.storage().persistent().set(&key, data);
    env.storage()
        .persistent()
        .extend_ttl(&key, PERSISTENT_TTL_THRESHOLD, PERSISTENT_TTL_EXTEND);

    env.events().publish(
        (Symbol::new(env, "chain_data_set"), chain_id),
        (data.price, data.gas_price),
    );
}

fn local_price(env: &Env) -> Result<u128, Error> {
    let price = get_chain_data(env, get_chain_id(env)).price;
    if price == 0 {
        return Err(Error::UnknownChain);
    }
    Ok(price)
}

#[cfg(test)]
mod tests {
    use super::*;
    use soroban_sdk::testutils::{Address as _, Events, MockAuth, MockAuthInvoke};
    use soroban_sdk::{vec, Address, Env, IntoVal};

    const CHAIN_1: u32 = 1;
    const CHAIN_2: u32 = 2;
    const CHAIN_3: u32 = 3;
    const E18: u128 = 1_000_000_000_000_000_000;

    fn setup(env: &Env, chain_precision: u32) -> (GasOracleClient<'_>, Address) {
        env.mock_all_auths();
        let admin = Address::generate(env);
        let contract_id = env.register(GasOracle, ());
        let client = GasOracleClient::new(env, &contract_id);
        client.initialize(&admin, &CHAIN_1, &chain_precision);
        (client, admin)
    }

    #[test]
    fn test_set_chain_data() {
        let env = Env::default();
        let (client, _) = setup(&env, 18);

        client.set_chain_data(&CHAIN_1, &(100 * E18), &50_000_000_000_000);
        let data = client.get_chain_data(&CHAIN_1);
        assert_eq!(data.price, 100 * E18);
        assert_eq!(data.gas_price, 50_000_000_000_000);
        assert_eq!(
            env.events().all(),
            vec![
                &env,
                (
                    client.address.clone(),
                    (Symbol::new(&env, "chain_data_set"), CHAIN_1).into_val(&env),
                    (100 * E18, 50_000_000_000_000u128).into_val(&env),
                ),
            ]
        );
    }

    #[test]
    fn test_set_price_keeps_gas_price() {
        let env = Env::default();
        let (client, _) = setup(&env, 18);

        client.set_gas_price(&CHAIN_1, &50_000_000_000_000);
        client.set_price(&CHAIN_1, &(100 * E18));
        let data = client.get_chain_data(&CHAIN_1);
        assert_eq!(data.price, 100 * E18);
        assert_eq!(data.gas_price, 50_000_000_000_000);
        assert_eq!(client.price(&CHAIN_1), 100 * E18);
    }

    #[test]
    fn test_initialize_twice_fails() {
        let env = Env::default();
        let (client, admin) = setup(&env, 18);
        let result = client.try_initialize(&admin, &CHAIN_1, &18);
        assert_eq!(result, Err(Ok(Error::AlreadyInitialized)));
    }

    #[test]
    fn test_initialize_rejects_precision_above_oracle() {
        let env = Env::default();
        env.mock_all_auths();
        let client = GasOracleClient::new(&env, &env.register(GasOracle, ()));
        let result = client.try_initialize(&Address::generate(&env), &CHAIN_1, &19);
        assert_eq!(result, Err(Ok(Error::InvalidParameter)));
    }

    #[test]
    #[should_panic]
    fn test_set_price_requires_owner() {
        let env = Env::default();
        let admin = Address::generate(&env);
        let user = Address::generate(&env);
        let contract_id = env.register(GasOracle, ());
        let client = GasOracleClient::new(&env, &contract_id);
        client
            .mock_auths(&[MockAuth {
                address: &admin,
                invoke: &MockAuthInvoke {
                    contract: &contract_id,
                    fn_name: "initialize",
                    args: (&admin, CHAIN_1, 18u32).into_val(&env),
                    sub_invokes: &[],
                },
            }])
            .initialize(&admin, &CHAIN_1, &18);

        client
            .mock_auths(&[MockAuth {
                address: &user,
                invoke: &MockAuthInvoke {
                    contract: &contract_id,
                    fn_name: "set_price",
                    args: (CHAIN_1, 1u128).into_val(&env),
                    sub_invokes: &[],
                },
            }])
            .set_price(&CHAIN_1, &1);
    }

    #[test]
    fn test_cross_rate() {
        let env = Env::default();
        let (client, _) = setup(&env, 18);

        client.set_price(&CHAIN_1, &(100 * E18));
        client.set_price(&CHAIN_2, &(200 * E18));
        client.set_price(&CHAIN_3, &(50 * E18));
        assert_eq!(client.cross_rate(&CHAIN_2), 2 * E18);
        assert_eq!(client.cross_rate(&CHAIN_3), E18 / 2);
    }

    #[test]
    fn test_cross_rate_without_local_price() {
        let env = Env::default();
        let (client, _) = setup(&env, 18);
        client.set_price(&CHAIN_2, &(200 * E18));
        assert_eq!(client.try_cross_rate(&CHAIN_2), Err(Ok(Error::UnknownChain)));
    }

    #[test]
    fn test_tx_cost_in_native_precision_18() {
        let env = Env::default();
        let (client, _) = setup(&env, 18);

        // 2000 USD per ETH, 100 gwei
        client.set_chain_data(&CHAIN_1, &(2000 * E18), &100_000_000_000);
        // 0.1 USD per TRX, 420 SUN
        client.set_chain_data(&CHAIN_2, &(E18 / 10), &420_000_000_000_000);

        // 21 TRX = 2.1 USD = 0.00105 ETH
        assert_eq!(client.tx_cost_in_native(&CHAIN_2, &50_000), 1_050_000_000_000_000);
    }

    #[test]
    fn test_tx_cost_in_native_precision_6() {
        let env = Env::default();
        let (client, _) = setup(&env, 6);

        client.set_chain_data(&CHAIN_1, &(E18 / 10), &420_000_000_000_000);
        client.set_chain_data(&CHAIN_2, &(2000 * E18), &100_000_000_000);

        // 0.01 ETH = 20 USD = 200 TRX
        assert_eq!(client.tx_cost_in_native(&CHAIN_2, &100_000), 200_000_000);
    }

    #[test]
    fn test_tx_cost_in_usd() {
        let env = Env::default();
        let (client, _) = setup(&env, 18);

        client.set_chain_data(&CHAIN_2, &(E18 / 10), &420_000_000_000_000);
        assert_eq!(client.tx_cost_in_usd(&CHAIN_2, &50_000), 2_100_000_000_000_000_000);
    }

    #[test]
    fn test_set_owner() {
        let env = Env::default();
        let (client, _) = setup(&env, 18);
        let new_owner = Address::generate(&env);
        client.set_owner(&new_owner);
        assert_eq!(client.get_admin().owner, new_owner);
        assert_eq!(
            env.events().all(),
            vec![
                &env,
                (
                    client.address.clone(),
                    (Symbol::new(&env, "owner_set"),).into_val(&env),
                    new_owner.into_val(&env),
                ),
            ]
        );
    }
}
