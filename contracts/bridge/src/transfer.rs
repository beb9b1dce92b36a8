use crate::external;
use crate::storage::{
    get_config, get_gas_usage, get_messenger, get_other_bridge, get_pool, has_received_message,
    has_sent_message, is_other_bridge_token, set_received_message, set_sent_message, BridgeConfig,
};
use crate::to_token_amount;
use bridge_math::{mul_div, pow10, u256_to_u128};
use bridge_types::{
    address_to_bytes, hash_message, hash_with_sender, Error, MessengerProtocol,
    ORACLE_SCALING_FACTOR,
};
use soroban_sdk::auth::{ContractContext, InvokerContractAuthEntry, SubContractInvocation};
use soroban_sdk::{
    contracttype, log, token, vec, Address, BytesN, Env, IntoVal, Symbol, Vec, U256,
};

/// Parameters of an outgoing cross-chain transfer
#[contracttype]
#[derive(Clone, Debug)]
pub struct SwapAndBridgeParams {
    pub sender: Address,
    /// Local token sent
    pub token: Address,
    /// Token amount, including `fee_token_amount`
    pub amount: u128,
    /// Recipient on the destination chain
    pub recipient: BytesN<32>,
    pub destination_chain_id: u32,
    /// Token received on the destination chain
    pub receive_token: BytesN<32>,
    pub nonce: U256,
    pub messenger: MessengerProtocol,
    /// Native tokens paid for delivery
    pub gas_amount: u128,
    /// Part of `amount` paid for delivery
    pub fee_token_amount: u128,
}

/// Parameters of an incoming cross-chain transfer
#[contracttype]
#[derive(Clone, Debug)]
pub struct ReceiveTokensParams {
    /// Caller, pays `extra_gas_amount`
    pub sender: Address,
    /// vUSD amount
    pub amount: u128,
    pub recipient: Address,
    pub source_chain_id: u32,
    pub receive_token: Address,
    pub nonce: U256,
    pub messenger: MessengerProtocol,
    pub receive_amount_min: u128,
    /// Native tokens forwarded from `sender` to `recipient`
    pub extra_gas_amount: u128,
}

fn require_can_swap(config: &BridgeConfig) -> Result<(), Error> {
    if !config.can_swap {
        return Err(Error::SwapProhibited);
    }
    Ok(())
}

fn pool_for(env: &Env, token: &Address) -> Result<Address, Error> {
    get_pool(env, &address_to_bytes(env, token)?).ok_or(Error::UnsupportedToken)
}

fn messenger_for(env: &Env, protocol: MessengerProtocol) -> Result<Address, Error> {
    get_messenger(env, protocol).ok_or(Error::UnknownMessenger)
}

/// Native token value of `fee_token_amount` tokens priced at one USD each
///
/// `fee_token_amount * 10^18 * 10^chain_precision / (price(chain_id) * 10^token_decimals)`,
/// computed in 256 bits.
pub fn bridging_fee_from_tokens(
    env: &Env,
    config: &BridgeConfig,
    token: &Address,
    fee_token_amount: u128,
) -> Result<u128, Error> {
    let price = external::price(env, &config.gas_oracle, config.chain_id)?;
    if price == 0 {
        return Err(Error::UnknownChain);
    }
    let token_decimals = token::Client::new(env, token).decimals();

    let numerator = U256::from_u128(env, fee_token_amount)
        .mul(&U256::from_u128(env, pow10(config.chain_precision)?))
        .mul(&U256::from_u128(env, ORACLE_SCALING_FACTOR));
    let denominator =
        U256::from_u128(env, price).mul(&U256::from_u128(env, pow10(token_decimals)?));
    u256_to_u128(&numerator.div(&denominator))
}

/// Cost in native tokens of executing `receive_tokens` on `chain_id`
pub fn transaction_cost(env: &Env, config: &BridgeConfig, chain_id: u32) -> Result<u128, Error> {
    external::tx_cost_in_native(
        env,
        &config.gas_oracle,
        chain_id,
        get_gas_usage(env, chain_id),
    )
}

/// Total delivery cost to `chain_id` expressed in `token`
pub fn bridging_cost_in_tokens(
    env: &Env,
    chain_id: u32,
    protocol: MessengerProtocol,
    token: &Address,
) -> Result<u128, Error> {
    let config = get_config(env);
    let messenger = messenger_for(env, protocol)?;
    let gas = get_gas_usage(env, chain_id)
        .checked_add(external::messenger_gas_usage(env, &messenger, chain_id)?)
        .ok_or(Error::MathOverflow)?;
    let cost_in_usd = external::tx_cost_in_usd(env, &config.gas_oracle, chain_id, gas)?;
    let token_decimals = token::Client::new(env, token).decimals();
    mul_div(env, cost_in_usd, pow10(token_decimals)?, ORACLE_SCALING_FACTOR)
}

/// Swap tokens into vUSD and send the transfer to another chain
pub fn swap_and_bridge(env: &Env, params: SwapAndBridgeParams) -> Result<BytesN<32>, Error> {
    params.sender.require_auth();

    let config = get_config(env);
    require_can_swap(&config)?;

    if params.amount <= params.fee_token_amount {
        return Err(Error::AmountTooLowForFee);
    }
    if params.recipient == BytesN::from_array(env, &[0; 32]) {
        return Err(Error::ZeroRecipient);
    }
    if params.destination_chain_id == config.chain_id {
        return Err(Error::WrongDestinationChain);
    }
    if !is_other_bridge_token(env, params.destination_chain_id, &params.receive_token) {
        return Err(Error::UnknownChainOrToken);
    }
    let pool = pool_for(env, &params.token)?;
    let messenger = messenger_for(env, params.messenger)?;
    let bridge = env.current_contract_address();
    let token_client = token::Client::new(env, &params.token);
    let native_client = token::Client::new(env, &config.native_token);

    let mut fee_in_native = 0;
    if params.fee_token_amount > 0 {
        token_client.transfer(
            &params.sender,
            &bridge,
            &to_token_amount(params.fee_token_amount)?,
        );
        fee_in_native =
            bridging_fee_from_tokens(env, &config, &params.token, params.fee_token_amount)?;
        env.events().publish(
            (Symbol::new(env, "bridging_fee_from_tokens"), params.sender.clone()),
            (params.token.clone(), params.fee_token_amount, fee_in_native),
        );
    }

    let bridge_cost = transaction_cost(env, &config, params.destination_chain_id)?;
    let messenger_cost =
        external::messenger_transaction_cost(env, &messenger, params.destination_chain_id)?;
    let paid = params
        .gas_amount
        .checked_add(fee_in_native)
        .ok_or(Error::MathOverflow)?;
    let required = bridge_cost
        .checked_add(messenger_cost)
        .ok_or(Error::MathOverflow)?;
    if paid < required {
        return Err(Error::NotEnoughFee);
    }
    if params.gas_amount > 0 {
        native_client.transfer(&params.sender, &bridge, &to_token_amount(params.gas_amount)?);
    }

    let amount = params.amount - params.fee_token_amount;
    token_client.transfer(&params.sender, &pool, &to_token_amount(amount)?);
    let v_usd_amount = external::swap_to_v_usd(env, &pool, &params.sender, amount, false)?;

    let hash = hash_message(
        env,
        v_usd_amount,
        &params.recipient,
        config.chain_id,
        params.destination_chain_id,
        &params.receive_token,
        &params.nonce,
        params.messenger,
    )?;
    if has_sent_message(env, &hash) {
        return Err(Error::TokensAlreadySent);
    }
    set_sent_message(env, &hash);

    if messenger_cost > 0 {
        // The messenger pulls its relay fee from the bridge
        env.authorize_as_current_contract(vec![
            env,
            InvokerContractAuthEntry::Contract(SubContractInvocation {
                context: ContractContext {
                    contract: config.native_token.clone(),
                    fn_name: Symbol::new(env, "transfer"),
                    args: (
                        bridge.clone(),
                        messenger.clone(),
                        to_token_amount(messenger_cost)?,
                    )
                        .into_val(env),
                },
                sub_invocations: Vec::new(env),
            }),
        ]);
    }
    external::send_message(env, &messenger, &bridge, &hash)?;

    env.events().publish(
        (Symbol::new(env, "tokens_sent"), params.sender.clone()),
        (
            v_usd_amount,
            params.recipient,
            params.destination_chain_id,
            params.receive_token,
            params.nonce,
            params.messenger,
        ),
    );
    env.events().publish(
        (Symbol::new(env, "receive_fee"), params.sender),
        (params.gas_amount, messenger_cost, params.fee_token_amount),
    );

    Ok(hash)
}

/// Complete a transfer delivered by a messenger
pub fn receive_tokens(env: &Env, params: ReceiveTokensParams) -> Result<u128, Error> {
    params.sender.require_auth();

    let config = get_config(env);
    require_can_swap(&config)?;

    let other_bridge =
        get_other_bridge(env, params.source_chain_id).ok_or(Error::SourceNotRegistered)?;

    let hash = hash_message(
        env,
        params.amount,
        &address_to_bytes(env, &params.recipient)?,
        params.source_chain_id,
        config.chain_id,
        &address_to_bytes(env, &params.receive_token)?,
        &params.nonce,
        params.messenger,
    )?;
    let messenger = messenger_for(env, params.messenger)?;
    let message = hash_with_sender(env, &hash, &other_bridge);
    if !external::has_received_message(env, &messenger, &message)? {
        return Err(Error::NoMessage);
    }
    if has_received_message(env, &hash) {
        return Err(Error::MessageProcessed);
    }

    let pool = pool_for(env, &params.receive_token)?;
    let received = external::swap_from_v_usd(
        env,
        &pool,
        &params.recipient,
        params.amount,
        params.receive_amount_min,
        false,
    )?;
    // Only a completed swap consumes the message
    set_received_message(env, &hash);

    if params.extra_gas_amount > 0 {
        let native_client = token::Client::new(env, &config.native_token);
        let forwarded = matches!(
            native_client.try_transfer(
                &params.sender,
                &params.recipient,
                &to_token_amount(params.extra_gas_amount)?,
            ),
            Ok(Ok(()))
        );
        if !forwarded {
            log!(
                env,
                "extra gas transfer failed",
                params.sender,
                params.extra_gas_amount
            );
        }
    }

    env.events().publish(
        (Symbol::new(env, "tokens_received"), params.recipient.clone()),
        (
            received,
            params.source_chain_id,
            params.receive_token,
            params.nonce,
            params.messenger,
        ),
    );

    Ok(received)
}

/// Same-chain swap through vUSD. Swaps of the rebalancer are fee free.
pub fn swap(
    env: &Env,
    sender: Address,
    amount: u128,
    token: Address,
    receive_token: Address,
    recipient: Address,
    receive_amount_min: u128,
) -> Result<u128, Error> {
    sender.require_auth();

    let config = get_config(env);
    require_can_swap(&config)?;

    let pool_in = pool_for(env, &token)?;
    let pool_out = pool_for(env, &receive_token)?;
    let zero_fee = config.rebalancer.as_ref() == Some(&sender);

    token::Client::new(env, &token).transfer(&sender, &pool_in, &to_token_amount(amount)?);
    let v_usd_amount = external::swap_to_v_usd(env, &pool_in, &sender, amount, zero_fee)?;
    let received = external::swap_from_v_usd(
        env,
        &pool_out,
        &recipient,
        v_usd_amount,
        receive_amount_min,
        zero_fee,
    )?;

    env.events().publish(
        (Symbol::new(env, "swapped"), sender, recipient),
        (token, receive_token, amount, received),
    );

    Ok(received)
}
