#![no_std]

mod external;
mod storage;
mod transfer;


use bridge_types::{address_to_bytes, AdminConfig, Error, MessengerProtocol, MAX_CHAIN_ID};
use soroban_sdk::{contract, contractimpl, token, Address, BytesN, Env, Symbol, U256};
pub use storage::BridgeConfig;
use storage::{get_admin, get_config, is_initialized, set_admin, set_config};
pub use transfer::{ReceiveTokensParams, SwapAndBridgeParams};

#[contract]
pub struct Bridge;

#[contractimpl]
impl Bridge {
    /// Initialize the bridge of the local chain
    ///
    /// # Arguments
    /// * `native_token` - Token gas fees are paid in
    /// * `gas_oracle` - Oracle pricing gas of other chains
    pub fn initialize(
        env: Env,
        admin: Address,
        chain_id: u32,
        native_token: Address,
        gas_oracle: Address,
    ) -> Result<(), Error> {
        if is_initialized(&env) {
            return Err(Error::AlreadyInitialized);
        }
        if chain_id > MAX_CHAIN_ID {
            return Err(Error::InvalidChainId);
        }

        admin.require_auth();

        let chain_precision = token::Client::new(&env, &native_token).decimals();
        set_config(
            &env,
            &BridgeConfig {
                chain_id,
                native_token,
                chain_precision,
                gas_oracle,
                rebalancer: None,
                can_swap: true,
            },
        );
        set_admin(&env, &AdminConfig::new(admin));
        Ok(())
    }

    /// Send tokens to another chain
    ///
    /// # Returns
    /// Hash identifying the transfer
    pub fn swap_and_bridge(env: Env, params: SwapAndBridgeParams) -> Result<BytesN<32>, Error> {
        transfer::swap_and_bridge(&env, params)
    }

    /// Complete a transfer from another chain
    ///
    /// # Returns
    /// Token amount paid to the recipient
    pub fn receive_tokens(env: Env, params: ReceiveTokensParams) -> Result<u128, Error> {
        transfer::receive_tokens(&env, params)
    }

    /// Swap between two local pools
    pub fn swap(
        env: Env,
        sender: Address,
        amount: u128,
        token: Address,
        receive_token: Address,
        recipient: Address,
        receive_amount_min: u128,
    ) -> Result<u128, Error> {
        transfer::swap(
            &env,
            sender,
            amount,
            token,
            receive_token,
            recipient,
            receive_amount_min,
        )
    }

    // === View Functions ===

    /// Delivery cost to `chain_id` in units of `token`
    pub fn get_bridging_cost_in_tokens(
        env: Env,
        chain_id: u32,
        messenger: MessengerProtocol,
        token: Address,
    ) -> Result<u128, Error> {
        transfer::bridging_cost_in_tokens(&env, chain_id, messenger, &token)
    }

    /// Cost in native tokens of receiving a transfer on `chain_id`
    pub fn get_transaction_cost(env: Env, chain_id: u32) -> Result<u128, Error> {
        transfer::transaction_cost(&env, &get_config(&env), chain_id)
    }

    #[allow(clippy::too_many_arguments)]
    pub fn hash_message(
        env: Env,
        amount: u128,
        recipient: BytesN<32>,
        source_chain_id: u32,
        destination_chain_id: u32,
        receive_token: BytesN<32>,
        nonce: U256,
        messenger: MessengerProtocol,
    ) -> Result<BytesN<32>, Error> {
        bridge_types::hash_message(
            &env,
            amount,
            &recipient,
            source_chain_id,
            destination_chain_id,
            &receive_token,
            &nonce,
            messenger,
        )
    }

    pub fn has_sent_message(env: Env, hash: BytesN<32>) -> bool {
        storage::has_sent_message(&env, &hash)
    }

    pub fn has_processed_message(env: Env, hash: BytesN<32>) -> bool {
        storage::has_received_message(&env, &hash)
    }

    pub fn get_pool(env: Env, token: Address) -> Result<Option<Address>, Error> {
        Ok(storage::get_pool(&env, &address_to_bytes(&env, &token)?))
    }

    pub fn get_other_bridge(env: Env, chain_id: u32) -> Option<BytesN<32>> {
        storage::get_other_bridge(&env, chain_id)
    }

    pub fn is_bridge_token(env: Env, chain_id: u32, token: BytesN<32>) -> bool {
        storage::is_other_bridge_token(&env, chain_id, &token)
    }

    pub fn get_gas_usage(env: Env, chain_id: u32) -> u128 {
        storage::get_gas_usage(&env, chain_id)
    }

    pub fn get_messenger(env: Env, protocol: MessengerProtocol) -> Option<Address> {
        storage::get_messenger(&env, protocol)
    }

    pub fn get_config(env: Env) -> BridgeConfig {
        get_config(&env)
    }

    pub fn get_admin(env: Env) -> AdminConfig {
        get_admin(&env)
    }

    // === Admin Functions ===

    /// Register the counterpart bridge on `chain_id`
    pub fn register_bridge(env: Env, chain_id: u32, bridge: BytesN<32>) -> Result<(), Error> {
        get_admin(&env).require_owner();
        if chain_id > MAX_CHAIN_ID {
            return Err(Error::InvalidChainId);
        }
        storage::set_other_bridge(&env, chain_id, &bridge);
        env.events()
            .publish((Symbol::new(&env, "bridge_registered"), chain_id), bridge);
        Ok(())
    }

    /// Accept `token` as a destination token on `chain_id`
    pub fn add_bridge_token(env: Env, chain_id: u32, token: BytesN<32>) -> Result<(), Error> {
        get_admin(&env).require_owner();
        if chain_id > MAX_CHAIN_ID {
            return Err(Error::InvalidChainId);
        }
        storage::set_other_bridge_token(&env, chain_id, &token, true);
        env.events()
            .publish((Symbol::new(&env, "bridge_token_added"), chain_id), token);
        Ok(())
    }

    pub fn remove_bridge_token(env: Env, chain_id: u32, token: BytesN<32>) {
        get_admin(&env).require_owner();
        storage::set_other_bridge_token(&env, chain_id, &token, false);
        env.events()
            .publish((Symbol::new(&env, "bridge_token_removed"), chain_id), token);
    }

    /// Route swaps of `token` through `pool`
    pub fn add_pool(env: Env, pool: Address, token: Address) -> Result<(), Error> {
        get_admin(&env).require_owner();
        storage::set_pool(&env, &address_to_bytes(&env, &token)?, &pool);
        env.events()
            .publish((Symbol::new(&env, "pool_added"), token), pool);
        Ok(())
    }

    /// Set the gas used by `receive_tokens` on `chain_id`
    pub fn set_gas_usage(env: Env, chain_id: u32, gas_usage: u128) {
        get_admin(&env).require_owner();
        storage::set_gas_usage(&env, chain_id, gas_usage);
        env.events()
            .publish((Symbol::new(&env, "gas_usage_set"), chain_id), gas_usage);
    }

    pub fn set_gas_oracle(env: Env, gas_oracle: Address) {
        get_admin(&env).require_owner();
        let mut config = get_config(&env);
        config.gas_oracle = gas_oracle.clone();
        set_config(&env, &config);
        env.events()
            .publish((Symbol::new(&env, "gas_oracle_set"),), gas_oracle);
    }

    pub fn set_messenger(env: Env, protocol: MessengerProtocol, messenger: Address) {
        get_admin(&env).require_owner();
        storage::set_messenger(&env, protocol, &messenger);
        env.events()
            .publish((Symbol::new(&env, "messenger_set"), protocol), messenger);
    }

    pub fn set_rebalancer(env: Env, rebalancer: Address) {
        get_admin(&env).require_owner();
        let mut config = get_config(&env);
        config.rebalancer = Some(rebalancer.clone());
        set_config(&env, &config);
        env.events()
            .publish((Symbol::new(&env, "rebalancer_set"),), rebalancer);
    }

    pub fn set_stop_authority(env: Env, stop_authority: Address) {
        let mut admin = get_admin(&env);
        admin.require_owner();
        admin.stop_authority = stop_authority.clone();
        set_admin(&env, &admin);
        env.events()
            .publish((Symbol::new(&env, "stop_authority_set"),), stop_authority);
    }

    pub fn set_owner(env: Env, owner: Address) {
        let mut admin = get_admin(&env);
        admin.require_owner();
        admin.owner = owner.clone();
        set_admin(&env, &admin);
        env.events()
            .publish((Symbol::new(&env, "owner_set"),), owner);
    }

    /// Halt all swaps and transfers (stop authority)
    pub fn stop_swap(env: Env) {
        get_admin(&env).require_stop_authority();
        set_can_swap(&env, false);
    }

    /// Resume swaps and transfers (owner)
    pub fn start_swap(env: Env) {
        get_admin(&env).require_owner();
        set_can_swap(&env, true);
    }

    /// Send collected native gas fees to the owner
    pub fn withdraw_gas_tokens(env: Env, amount: u128) -> Result<(), Error> {
        let admin = get_admin(&env);
        admin.require_owner();
        let config = get_config(&env);
        token::Client::new(&env, &config.native_token).transfer(
            &env.current_contract_address(),
            &admin.owner,
            &to_token_amount(amount)?,
        );
        env.events()
            .publish((Symbol::new(&env, "gas_tokens_withdrawn"), admin.owner), amount);
        Ok(())
    }

    /// Send fees paid in `token` to the owner
    pub fn withdraw_bridging_fee_in_tokens(
        env: Env,
        token: Address,
        amount: u128,
    ) -> Result<(), Error> {
        let admin = get_admin(&env);
        admin.require_owner();
        token::Client::new(&env, &token).transfer(
            &env.current_contract_address(),
            &admin.owner,
            &to_token_amount(amount)?,
        );
        env.events().publish(
            (Symbol::new(&env, "bridging_fee_withdrawn"), token),
            (admin.owner, amount),
        );
        Ok(())
    }
}

fn set_can_swap(env: &Env, can_swap: bool) {
    let mut config = get_config(env);
    config.can_swap = can_swap;
    set_config(env, &config);
    env.events()
        .publish((Symbol::new(env, "can_swap_set"),), can_swap);
}

pub(crate) fn to_token_amount(amount: u128) -> Result<i128, Error> {
    i128::try_from(amount).map_err(|_| Error::MathOverflow)
}
