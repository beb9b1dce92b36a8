#![no_std]

mod storage;

use bridge_types::{address_to_bytes, hash_with_sender, invoke, AdminConfig, Error, MAX_CHAIN_ID};
use soroban_sdk::{contract, contractimpl, token, Address, BytesN, Env, IntoVal, Symbol, Vec};
pub use storage::MessengerConfig;
use storage::{
    get_admin, get_config, is_initialized, is_other_chain, is_secondary_validator, set_admin,
    set_config, set_other_chain, set_received_message, set_secondary_validator, set_sent_message,
};

/// Validator-signed transport between bridges.
///
/// A message is a 32-byte transfer hash whose first two bytes carry the source and
/// destination chain ids. Outgoing messages are bound to the sending bridge with
/// `hash_with_sender` and picked up by the validators from the `message_sent` event.
/// Delivery on the destination chain needs the primary validator and one
/// registered secondary validator to authorize it.
#[contract]
pub struct Messenger;

#[contractimpl]
impl Messenger {
    /// Initialize the messenger of the local chain
    ///
    /// # Arguments
    /// * `native_token` - Token the relay fee is paid in
    /// * `gas_oracle` - Oracle pricing the destination gas
    /// * `other_chain_ids` - Chains messages can be sent to
    #[allow(clippy::too_many_arguments)]
    pub fn initialize(
        env: Env,
        admin: Address,
        chain_id: u32,
        native_token: Address,
        gas_oracle: Address,
        primary_validator: Address,
        secondary_validators: Vec<Address>,
        other_chain_ids: Vec<u32>,
    ) -> Result<(), Error> {
        if is_initialized(&env) {
            return Err(Error::AlreadyInitialized);
        }
        if chain_id > MAX_CHAIN_ID {
            return Err(Error::InvalidChainId);
        }

        admin.require_auth();

        set_config(
            &env,
            &MessengerConfig {
                chain_id,
                native_token,
                gas_oracle,
                primary_validator,
            },
        );
        set_admin(&env, &AdminConfig::new(admin));

        for validator in secondary_validators.iter() {
            set_secondary_validator(&env, &validator, true);
        }
        for other_chain_id in other_chain_ids.iter() {
            set_other_chain(&env, other_chain_id, true);
        }
        Ok(())
    }

    /// Register an outgoing message of `sender`
    ///
    /// The relay fee of `get_transaction_cost(destination)` is pulled from `sender`
    /// in native tokens.
    pub fn send_message(env: Env, sender: Address, message: BytesN<32>) -> Result<(), Error> {
        sender.require_auth();

        let config = get_config(&env);
        let bytes = message.to_array();
        if bytes[0] as u32 != config.chain_id {
            return Err(Error::WrongSourceChain);
        }
        if !is_other_chain(&env, bytes[1] as u32) {
            return Err(Error::UnknownChain);
        }

        let message_with_sender =
            hash_with_sender(&env, &message, &address_to_bytes(&env, &sender)?);
        if storage::get_sent_message(&env, &message_with_sender).is_some() {
            return Err(Error::MessageAlreadySent);
        }

        let fee = transaction_cost(&env, &config, bytes[1] as u32)?;
        if fee > 0 {
            let native = token::Client::new(&env, &config.native_token);
            let fee_i128 = i128::try_from(fee).map_err(|_| Error::MathOverflow)?;
            if native.balance(&sender) < fee_i128 {
                return Err(Error::NotEnoughFee);
            }
            native.transfer(&sender, &env.current_contract_address(), &fee_i128);
        }
        set_sent_message(&env, &message_with_sender, env.ledger().sequence());

        env.events().publish(
            (Symbol::new(&env, "message_sent"), sender),
            (message_with_sender, fee),
        );
        Ok(())
    }

    /// Record a message delivered by the validators.
    ///
    /// Delivering the same message twice is a no-op.
    pub fn receive_message(
        env: Env,
        message: BytesN<32>,
        secondary_validator: Address,
    ) -> Result<(), Error> {
        let config = get_config(&env);
        config.primary_validator.require_auth();

        if !is_secondary_validator(&env, &secondary_validator) {
            return Err(Error::WrongSecondaryValidator);
        }
        secondary_validator.require_auth();

        if message.to_array()[1] as u32 != config.chain_id {
            return Err(Error::WrongDestinationChain);
        }

        set_received_message(&env, &message);
        env.events().publish(
            (Symbol::new(&env, "message_received"), secondary_validator),
            message,
        );
        Ok(())
    }

    pub fn has_sent_message(env: Env, message: BytesN<32>) -> bool {
        storage::get_sent_message(&env, &message).is_some()
    }

    /// Ledger sequence a message was sent at
    pub fn get_sent_message(env: Env, message: BytesN<32>) -> Option<u32> {
        storage::get_sent_message(&env, &message)
    }

    pub fn has_received_message(env: Env, message: BytesN<32>) -> bool {
        storage::has_received_message(&env, &message)
    }

    /// Gas needed to deliver a message to `chain_id`
    pub fn get_gas_usage(env: Env, chain_id: u32) -> u128 {
        storage::get_gas_usage(&env, chain_id)
    }

    /// Relay fee for a message to `chain_id` in native tokens
    pub fn get_transaction_cost(env: Env, chain_id: u32) -> Result<u128, Error> {
        transaction_cost(&env, &get_config(&env), chain_id)
    }

    pub fn is_secondary_validator(env: Env, validator: Address) -> bool {
        is_secondary_validator(&env, &validator)
    }

    pub fn is_other_chain(env: Env, chain_id: u32) -> bool {
        is_other_chain(&env, chain_id)
    }

    pub fn get_config(env: Env) -> MessengerConfig {
        get_config(&env)
    }

    pub fn get_admin(env: Env) -> AdminConfig {
        get_admin(&env)
    }

    // === Admin Functions ===

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

    pub fn set_primary_validator(env: Env, validator: Address) {
        get_admin(&env).require_owner();
        let mut config = get_config(&env);
        config.primary_validator = validator.clone();
        set_config(&env, &config);
        env.events()
            .publish((Symbol::new(&env, "primary_validator_set"),), validator);
    }

    /// Remove `old_validators`, then register `new_validators`
    pub fn set_secondary_validators(
        env: Env,
        old_validators: Vec<Address>,
        new_validators: Vec<Address>,
    ) {
        get_admin(&env).require_owner();
        for validator in old_validators.iter() {
            set_secondary_validator(&env, &validator, false);
        }
        for validator in new_validators.iter() {
            set_secondary_validator(&env, &validator, true);
        }
        env.events().publish(
            (Symbol::new(&env, "secondary_validators_set"),),
            (old_validators, new_validators),
        );
    }

    pub fn set_other_chain_ids(env: Env, chain_ids: Vec<u32>, enabled: bool) {
        get_admin(&env).require_owner();
        for chain_id in chain_ids.iter() {
            set_other_chain(&env, chain_id, enabled);
        }
        env.events().publish(
            (Symbol::new(&env, "other_chain_ids_set"), enabled),
            chain_ids,
        );
    }

    /// Send collected relay fees to the owner
    pub fn withdraw_gas_tokens(env: Env, amount: u128) -> Result<(), Error> {
        let admin = get_admin(&env);
        admin.require_owner();

        let config = get_config(&env);
        let amount_i128 = i128::try_from(amount).map_err(|_| Error::MathOverflow)?;
        token::Client::new(&env, &config.native_token).transfer(
            &env.current_contract_address(),
            &admin.owner,
            &amount_i128,
        );
        env.events()
            .publish((Symbol::new(&env, "gas_tokens_withdrawn"), admin.owner), amount);
        Ok(())
    }

    pub fn set_owner(env: Env, owner: Address) {
        let mut admin = get_admin(&env);
        admin.require_owner();
        admin.owner = owner.clone();
        set_admin(&env, &admin);
        env.events()
            .publish((Symbol::new(&env, "owner_set"),), owner);
    }
}

/// Relay fee to `chain_id`. Chains without a configured gas usage are free.
fn transaction_cost(env: &Env, config: &MessengerConfig, chain_id: u32) -> Result<u128, Error> {
    let gas_usage = storage::get_gas_usage(env, chain_id);
    if gas_usage == 0 {
        return Ok(0);
    }
    invoke(
        env,
        &config.gas_oracle,
        "tx_cost_in_native",
        (chain_id, gas_usage).into_val(env),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use gas_oracle::{GasOracle, GasOracleClient};
    use soroban_sdk::testutils::{Address as _, Events, Ledger};
    use soroban_sdk::token::{StellarAssetClient, TokenClient};
    use soroban_sdk::{vec, Address, Env, Val};

    const CHAIN_ID: u32 = 1;
    const OTHER_CHAIN_ID: u32 = 2;
    const E18: u128 = 1_000_000_000_000_000_000;

    struct Setup<'a> {
        env: Env,
        owner: Address,
        secondary_validator: Address,
        native: TokenClient<'a>,
        oracle: GasOracleClient<'a>,
        messenger: MessengerClient<'a>,
    }

    fn setup<'a>() -> Setup<'a> {
        let env = Env::default();
        env.mock_all_auths();

        let owner = Address::generate(&env);
        let primary_validator = Address::generate(&env);
        let secondary_validator = Address::generate(&env);

        let sac = env.register_stellar_asset_contract_v2(owner.clone());
        let native = TokenClient::new(&env, &sac.address());

        let oracle = GasOracleClient::new(&env, &env.register(GasOracle, ()));
        oracle.initialize(&owner, &CHAIN_ID, &7);

        let messenger = MessengerClient::new(&env, &env.register(Messenger, ()));
        messenger.initialize(
            &owner,
            &CHAIN_ID,
            &native.address,
            &oracle.address,
            &primary_validator,
            &vec![&env, secondary_validator.clone()],
            &vec![&env, OTHER_CHAIN_ID],
        );

        Setup {
            env,
            owner,
            secondary_validator,
            native,
            oracle,
            messenger,
        }
    }

    fn message(env: &Env, source: u8, destination: u8) -> BytesN<32> {
        let mut bytes = [7u8; 32];
        bytes[0] = source;
        bytes[1] = destination;
        BytesN::from_array(env, &bytes)
    }

    #[test]
    fn test_initialize_twice_fails() {
        let s = setup();
        let result = s.messenger.try_initialize(
            &s.owner,
            &CHAIN_ID,
            &s.native.address,
            &s.oracle.address,
            &s.owner,
            &Vec::new(&s.env),
            &Vec::new(&s.env),
        );
        assert_eq!(result, Err(Ok(Error::AlreadyInitialized)));
    }

    #[test]
    fn test_send_message() {
        let s = setup();
        let sender = Address::generate(&s.env);
        let message = message(&s.env, CHAIN_ID as u8, OTHER_CHAIN_ID as u8);
        s.env.ledger().set_sequence_number(42);

        s.messenger.send_message(&sender, &message);

        let bound = hash_with_sender(
            &s.env,
            &message,
            &address_to_bytes(&s.env, &sender).unwrap(),
        );
        assert!(s.messenger.has_sent_message(&bound));
        assert_eq!(s.messenger.get_sent_message(&bound), Some(42));
        // Only the sender-bound hash is recorded
        assert!(!s.messenger.has_sent_message(&message));
    }

    #[test]
    fn test_send_message_twice_fails() {
        let s = setup();
        let sender = Address::generate(&s.env);
        let message = message(&s.env, CHAIN_ID as u8, OTHER_CHAIN_ID as u8);

        s.messenger.send_message(&sender, &message);
        assert_eq!(
            s.messenger.try_send_message(&sender, &message),
            Err(Ok(Error::MessageAlreadySent))
        );

        // Another sender produces another bound hash
        let other_sender = Address::generate(&s.env);
        s.messenger.send_message(&other_sender, &message);
    }

    fn set_relay_prices(s: &Setup) {
        // Local native token at $0.1, remote at $2000 with 20 gwei gas
        s.oracle.set_price(&CHAIN_ID, &(E18 / 10));
        s.oracle
            .set_chain_data(&OTHER_CHAIN_ID, &(2000 * E18), &20_000_000_000);
        s.messenger.set_gas_usage(&OTHER_CHAIN_ID, &100_000);
    }

    #[test]
    fn test_send_message_pays_relay_fee() {
        let s = setup();
        set_relay_prices(&s);
        let sender = Address::generate(&s.env);
        StellarAssetClient::new(&s.env, &s.native.address).mint(&sender, &500_000_000);
        let message = message(&s.env, CHAIN_ID as u8, OTHER_CHAIN_ID as u8);

        s.messenger.send_message(&sender, &message);

        assert_eq!(s.native.balance(&sender), 100_000_000);
        assert_eq!(s.native.balance(&s.messenger.address), 400_000_000);
    }

    #[test]
    fn test_send_message_without_relay_fee_fails() {
        let s = setup();
        set_relay_prices(&s);
        let sender = Address::generate(&s.env);
        StellarAssetClient::new(&s.env, &s.native.address).mint(&sender, &399_999_999);
        let message = message(&s.env, CHAIN_ID as u8, OTHER_CHAIN_ID as u8);

        assert_eq!(
            s.messenger.try_send_message(&sender, &message),
            Err(Ok(Error::NotEnoughFee))
        );
        assert_eq!(s.native.balance(&sender), 399_999_999);
        let bound = hash_with_sender(
            &s.env,
            &message,
            &address_to_bytes(&s.env, &sender).unwrap(),
        );
        assert!(!s.messenger.has_sent_message(&bound));
    }

    #[test]
    fn test_send_message_with_wrong_source_chain_fails() {
        let s = setup();
        let sender = Address::generate(&s.env);
        let message = message(&s.env, OTHER_CHAIN_ID as u8, CHAIN_ID as u8);
        assert_eq!(
            s.messenger.try_send_message(&sender, &message),
            Err(Ok(Error::WrongSourceChain))
        );
    }

    #[test]
    fn test_send_message_to_unknown_chain_fails() {
        let s = setup();
        let sender = Address::generate(&s.env);
        let message = message(&s.env, CHAIN_ID as u8, 5);
        assert_eq!(
            s.messenger.try_send_message(&sender, &message),
            Err(Ok(Error::UnknownChain))
        );

        s.messenger.set_other_chain_ids(&vec![&s.env, 5], &true);
        s.messenger.send_message(&sender, &message);
    }

    #[test]
    fn test_receive_message() {
        let s = setup();
        let message = message(&s.env, OTHER_CHAIN_ID as u8, CHAIN_ID as u8);
        assert!(!s.messenger.has_received_message(&message));

        s.messenger
            .receive_message(&message, &s.secondary_validator);
        assert!(s.messenger.has_received_message(&message));

        // A repeated delivery is accepted
        s.messenger
            .receive_message(&message, &s.secondary_validator);
        assert!(s.messenger.has_received_message(&message));
    }

    #[test]
    fn test_receive_message_with_wrong_destination_fails() {
        let s = setup();
        let message = message(&s.env, CHAIN_ID as u8, OTHER_CHAIN_ID as u8);
        assert_eq!(
            s.messenger
                .try_receive_message(&message, &s.secondary_validator),
            Err(Ok(Error::WrongDestinationChain))
        );
    }

    #[test]
    fn test_receive_message_with_unknown_secondary_fails() {
        let s = setup();
        let message = message(&s.env, OTHER_CHAIN_ID as u8, CHAIN_ID as u8);
        let stranger = Address::generate(&s.env);
        assert_eq!(
            s.messenger.try_receive_message(&message, &stranger),
            Err(Ok(Error::WrongSecondaryValidator))
        );
    }

    #[test]
    #[should_panic]
    fn test_receive_message_without_validator_auth_fails() {
        let s = setup();
        let message = message(&s.env, OTHER_CHAIN_ID as u8, CHAIN_ID as u8);
        s.env.set_auths(&[]);
        s.messenger
            .receive_message(&message, &s.secondary_validator);
    }

    #[test]
    fn test_update_secondary_validators() {
        let s = setup();
        let replacement = Address::generate(&s.env);
        s.messenger.set_secondary_validators(
            &vec![&s.env, s.secondary_validator.clone()],
            &vec![&s.env, replacement.clone()],
        );

        assert!(!s.messenger.is_secondary_validator(&s.secondary_validator));
        assert!(s.messenger.is_secondary_validator(&replacement));

        let message = message(&s.env, OTHER_CHAIN_ID as u8, CHAIN_ID as u8);
        assert_eq!(
            s.messenger
                .try_receive_message(&message, &s.secondary_validator),
            Err(Ok(Error::WrongSecondaryValidator))
        );
        s.messenger.receive_message(&message, &replacement);
    }

    #[test]
    fn test_transaction_cost() {
        let s = setup();
        // Local native token at $0.1, remote at $2000 with 20 gwei gas
        s.oracle.set_price(&CHAIN_ID, &(E18 / 10));
        s.oracle
            .set_chain_data(&OTHER_CHAIN_ID, &(2000 * E18), &20_000_000_000);

        assert_eq!(s.messenger.get_transaction_cost(&OTHER_CHAIN_ID), 0);

        s.messenger.set_gas_usage(&OTHER_CHAIN_ID, &100_000);
        assert_eq!(s.messenger.get_gas_usage(&OTHER_CHAIN_ID), 100_000);
        // 0.002 ETH = 40 XLM with 7 decimals
        assert_eq!(
            s.messenger.get_transaction_cost(&OTHER_CHAIN_ID),
            400_000_000
        );
    }

    #[test]
    fn test_transaction_cost_without_local_price_fails() {
        let s = setup();
        s.messenger.set_gas_usage(&OTHER_CHAIN_ID, &100_000);
        assert_eq!(
            s.messenger.try_get_transaction_cost(&OTHER_CHAIN_ID),
            Err(Ok(Error::UnknownChain))
        );
    }

    #[test]
    fn test_withdraw_gas_tokens() {
        let s = setup();
        StellarAssetClient::new(&s.env, &s.native.address)
            .mint(&s.messenger.address, &1_000);

        s.messenger.withdraw_gas_tokens(&600);
        assert_eq!(s.native.balance(&s.owner), 600);
        assert_eq!(s.native.balance(&s.messenger.address), 400);

        assert_eq!(
            last_event(&s.env),
            vec![
                &s.env,
                (
                    s.messenger.address.clone(),
                    (Symbol::new(&s.env, "gas_tokens_withdrawn"), s.owner.clone())
                        .into_val(&s.env),
                    600u128.into_val(&s.env),
                ),
            ]
        );
    }

    fn last_event(env: &Env) -> Vec<(Address, Vec<Val>, Val)> {
        vec![env, env.events().all().last().unwrap()]
    }

    #[test]
    fn test_admin_changes_emit_events() {
        let s = setup();
        let oracle = Address::generate(&s.env);
        s.messenger.set_gas_oracle(&oracle);
        assert_eq!(
            last_event(&s.env),
            vec![
                &s.env,
                (
                    s.messenger.address.clone(),
                    (Symbol::new(&s.env, "gas_oracle_set"),).into_val(&s.env),
                    oracle.into_val(&s.env),
                ),
            ]
        );

        let chain_ids = vec![&s.env, 5u32, 6];
        s.messenger.set_other_chain_ids(&chain_ids, &true);
        assert_eq!(
            last_event(&s.env),
            vec![
                &s.env,
                (
                    s.messenger.address.clone(),
                    (Symbol::new(&s.env, "other_chain_ids_set"), true).into_val(&s.env),
                    chain_ids.into_val(&s.env),
                ),
            ]
        );

        let new_owner = Address::generate(&s.env);
        s.messenger.set_owner(&new_owner);
        assert_eq!(s.messenger.get_admin().owner, new_owner);
        assert_eq!(
            last_event(&s.env),
            vec![
                &s.env,
                (
                    s.messenger.address.clone(),
                    (Symbol::new(&s.env, "owner_set"),).into_val(&s.env),
                    new_owner.into_val(&s.env),
                ),
            ]
        );
    }

    #[test]
    #[should_panic]
    fn test_set_gas_usage_requires_owner() {
        let s = setup();
        s.env.set_auths(&[]);
        s.messenger.set_gas_usage(&OTHER_CHAIN_ID, &1);
    }
}
