use crate::invariants::{lp_supply_covers_d, token_balance_in_bounds};
use crate::rewards::{deposit_lp, withdraw_lp};
use crate::storage::{get_admin, get_config, get_state, non_reentrant, set_state};
use crate::to_token_amount;
use bridge_math::{from_system_precision, get_d, mul_div, to_system_precision};
use bridge_types::Error;
use soroban_sdk::{token, Address, Env, Symbol};

/// Deposit tokens and mint LP equal to the growth of D
pub fn deposit(env: &Env, user: Address, amount: u128) -> Result<u128, Error> {
    user.require_auth();

    non_reentrant(env, || {
        let config = get_config(env);
        if !config.can_deposit {
            return Err(Error::DepositProhibited);
        }

        let amount_sp = to_system_precision(amount, config.decimals)?;
        if amount_sp == 0 {
            return Err(Error::ZeroAmount);
        }

        let token_client = token::Client::new(env, &config.token);
        token_client.transfer(
            &user,
            &env.current_contract_address(),
            &to_token_amount(amount)?,
        );

        let mut state = get_state(env);
        let old_d = state.d;
        let old_balance = state.token_balance + state.v_usd_balance;

        if old_d == 0 || old_balance == 0 {
            // First deposit is split evenly between both legs
            let half = amount_sp >> 1;
            state.token_balance += half;
            state.v_usd_balance += half;
        } else {
            state.token_balance += mul_div(env, amount_sp, state.token_balance, old_balance)?;
            state.v_usd_balance += mul_div(env, amount_sp, state.v_usd_balance, old_balance)?;
        }
        state.reserves += amount_sp;

        if !token_balance_in_bounds(&state) {
            return Err(Error::PoolOverflow);
        }

        state.d = get_d(env, state.token_balance, state.v_usd_balance, config.a)?;
        if state.d <= old_d {
            return Err(Error::ZeroChanges);
        }
        let lp_amount = state.d - old_d;

        let reward = deposit_lp(env, &mut state, &user, lp_amount)?;
        state.last_deposit_ledger = env.ledger().sequence();
        set_state(env, &state);

        if reward > 0 {
            token_client.transfer(&env.current_contract_address(), &user, &to_token_amount(reward)?);
        }

        env.events().publish(
            (Symbol::new(env, "deposit"), user.clone()),
            (amount, lp_amount, reward),
        );

        Ok(lp_amount)
    })
}

/// Burn LP and pay out real tokens. Virtual balance is never redeemable.
pub fn withdraw(env: &Env, user: Address, lp_amount: u128) -> Result<u128, Error> {
    user.require_auth();

    non_reentrant(env, || {
        let config = get_config(env);
        if !config.can_withdraw {
            return Err(Error::WithdrawProhibited);
        }

        let mut state = get_state(env);
        let reward = withdraw_lp(env, &mut state, &user, lp_amount)?;

        let old_balance = state.token_balance + state.v_usd_balance;
        if old_balance == 0 {
            return Err(Error::ZeroChanges);
        }
        state.token_balance -= mul_div(env, lp_amount, state.token_balance, old_balance)?;
        state.v_usd_balance -= mul_div(env, lp_amount, state.v_usd_balance, old_balance)?;
        if state.token_balance + state.v_usd_balance >= old_balance {
            return Err(Error::ZeroChanges);
        }

        let payout_sp = lp_amount.min(state.reserves);
        state.reserves -= payout_sp;

        let old_d = state.d;
        state.d = get_d(env, state.token_balance, state.v_usd_balance, config.a)?;
        if state.d >= old_d {
            return Err(Error::ZeroChanges);
        }

        let payout = from_system_precision(payout_sp, config.decimals)?;
        if payout == 0 {
            return Err(Error::ZeroChanges);
        }
        set_state(env, &state);

        let token_client = token::Client::new(env, &config.token);
        token_client.transfer(
            &env.current_contract_address(),
            &user,
            &to_token_amount(payout + reward)?,
        );

        env.events().publish(
            (Symbol::new(env, "withdraw"), user.clone()),
            (payout, lp_amount, reward),
        );

        Ok(payout)
    })
}

/// Mint the drift between D and the LP supply to the owner
pub fn adjust_total_lp_amount(env: &Env) -> Result<u128, Error> {
    let admin = get_admin(env);
    admin.require_owner();

    non_reentrant(env, || {
        let mut state = get_state(env);
        if state.d <= state.total_lp_amount {
            return Ok(0);
        }

        let drift = state.d - state.total_lp_amount;
        let reward = deposit_lp(env, &mut state, &admin.owner, drift)?;
        debug_assert!(lp_supply_covers_d(&state));
        set_state(env, &state);

        if reward > 0 {
            let config = get_config(env);
            token::Client::new(env, &config.token).transfer(
                &env.current_contract_address(),
                &admin.owner,
                &to_token_amount(reward)?,
            );
        }

        env.events().publish(
            (Symbol::new(env, "total_lp_adjusted"), admin.owner.clone()),
            (drift, state.total_lp_amount),
        );

        Ok(drift)
    })
}
