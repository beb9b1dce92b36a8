use crate::invariants::{token_balance_in_bounds, validate_balance_ratio};
use crate::rewards::add_rewards;
use crate::storage::{get_config, get_state, non_reentrant, set_state};
use crate::to_token_amount;
use bridge_math::{bp_share, from_system_precision, get_y, to_system_precision};
use bridge_types::Error;
use soroban_sdk::{token, Address, Env, Symbol};

/// Add a token amount to the pool and take vUSD out.
///
/// The router moves `amount` tokens from the user to the pool before calling.
pub fn swap_to_v_usd(env: &Env, user: Address, amount: u128, zero_fee: bool) -> Result<u128, Error> {
    let config = get_config(env);
    config.router.require_auth();

    if amount == 0 {
        return Ok(0);
    }

    let mut state = get_state(env);

    let fee = if zero_fee {
        0
    } else {
        bp_share(env, amount, config.fee_share_bp)
    };
    let amount_in = to_system_precision(amount - fee, config.decimals)?;
    // Precision dust goes to the fee
    let fee = amount - from_system_precision(amount_in, config.decimals)?;

    state.token_balance += amount_in;
    state.reserves += amount_in;
    if !token_balance_in_bounds(&state) {
        return Err(Error::PoolOverflow);
    }

    let v_usd_balance = get_y(env, state.token_balance, state.d, config.a)?;
    let result = state.v_usd_balance.saturating_sub(v_usd_balance);
    state.v_usd_balance = v_usd_balance;

    add_rewards(env, &mut state, fee)?;
    set_state(env, &state);

    env.events().publish(
        (Symbol::new(env, "swapped_to_v_usd"), user),
        (config.token, amount, result, fee),
    );

    Ok(result)
}

/// Put vUSD into the pool and pay the resulting tokens to `user`.
pub fn swap_from_v_usd(
    env: &Env,
    user: Address,
    amount: u128,
    receive_amount_min: u128,
    zero_fee: bool,
) -> Result<u128, Error> {
    let config = get_config(env);
    config.router.require_auth();

    non_reentrant(env, || {
        if amount == 0 {
            if receive_amount_min > 0 {
                return Err(Error::SlippageExceeded);
            }
            return Ok(0);
        }

        let mut state = get_state(env);

        state.v_usd_balance += amount;
        let token_balance = get_y(env, state.v_usd_balance, state.d, config.a)?;
        let result_sp = state.token_balance.saturating_sub(token_balance);
        let result = from_system_precision(result_sp, config.decimals)?;

        if state.reserves < result_sp {
            return Err(Error::InsufficientReserves);
        }
        state.token_balance = token_balance;
        state.reserves -= result_sp;

        let fee = if zero_fee {
            0
        } else {
            bp_share(env, result, config.fee_share_bp)
        };
        let result = result - fee;
        if result < receive_amount_min {
            return Err(Error::SlippageExceeded);
        }

        validate_balance_ratio(&config, &state, env.ledger().sequence())?;

        add_rewards(env, &mut state, fee)?;
        set_state(env, &state);

        if result > 0 {
            token::Client::new(env, &config.token).transfer(
                &env.current_contract_address(),
                &user,
                &to_token_amount(result)?,
            );
        }

        env.events().publish(
            (Symbol::new(env, "swapped_from_v_usd"), user.clone()),
            (config.token.clone(), amount, result, fee),
        );

        Ok(result)
    })
}
