use bridge_types::{invoke, Error};
use soroban_sdk::{Address, BytesN, Env, IntoVal};

// === Pool ===

pub fn swap_to_v_usd(
    env: &Env,
    pool: &Address,
    user: &Address,
    amount: u128,
    zero_fee: bool,
) -> Result<u128, Error> {
    invoke(
        env,
        pool,
        "swap_to_v_usd",
        (user, amount, zero_fee).into_val(env),
    )
}

pub fn swap_from_v_usd(
    env: &Env,
    pool: &Address,
    user: &Address,
    amount: u128,
    receive_amount_min: u128,
    zero_fee: bool,
) -> Result<u128, Error> {
    invoke(
        env,
        pool,
        "swap_from_v_usd",
        (user, amount, receive_amount_min, zero_fee).into_val(env),
    )
}

// === Messenger ===

pub fn send_message(
    env: &Env,
    messenger: &Address,
    sender: &Address,
    message: &BytesN<32>,
) -> Result<(), Error> {
    invoke(
        env,
        messenger,
        "send_message",
        (sender, message).into_val(env),
    )
}

pub fn has_received_message(
    env: &Env,
    messenger: &Address,
    message: &BytesN<32>,
) -> Result<bool, Error> {
    invoke(
        env,
        messenger,
        "has_received_message",
        (message,).into_val(env),
    )
}

pub fn messenger_transaction_cost(
    env: &Env,
    messenger: &Address,
    chain_id: u32,
) -> Result<u128, Error> {
    invoke(
        env,
        messenger,
        "get_transaction_cost",
        (chain_id,).into_val(env),
    )
}

pub fn messenger_gas_usage(env: &Env, messenger: &Address, chain_id: u32) -> Result<u128, Error> {
    invoke(env, messenger, "get_gas_usage", (chain_id,).into_val(env))
}

// === Gas oracle ===

pub fn price(env: &Env, oracle: &Address, chain_id: u32) -> Result<u128, Error> {
    invoke(env, oracle, "price", (chain_id,).into_val(env))
}

pub fn tx_cost_in_native(
    env: &Env,
    oracle: &Address,
    chain_id: u32,
    gas_amount: u128,
) -> Result<u128, Error> {
    invoke(
        env,
        oracle,
        "tx_cost_in_native",
        (chain_id, gas_amount).into_val(env),
    )
}

pub fn tx_cost_in_usd(
    env: &Env,
    oracle: &Address,
    chain_id: u32,
    gas_amount: u128,
) -> Result<u128, Error> {
    invoke(
        env,
        oracle,
        "tx_cost_in_usd",
        (chain_id, gas_amount).into_val(env),
    )
}
