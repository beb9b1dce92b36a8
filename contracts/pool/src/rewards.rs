use crate::storage::{get_user_deposit, set_user_deposit};
use bridge_math::{bp_share, mul_shr, shl_div};
use bridge_types::{Error, PoolState, UserDeposit, REWARD_SHIFT};
use soroban_sdk::{Address, Env};

/// Distribute a swap fee (native units) between LP holders and the owner.
///
/// Fees collected while the pool has no LP supply stay in the pool.
pub fn add_rewards(env: &Env, state: &mut PoolState, fee: u128) -> Result<(), Error> {
    if fee == 0 || state.total_lp_amount == 0 {
        return Ok(());
    }

    let admin_fee = bp_share(env, fee, state.admin_fee_share_bp);
    let lp_fee = fee - admin_fee;

    state.acc_reward_per_share_p = state
        .acc_reward_per_share_p
        .checked_add(shl_div(env, lp_fee, REWARD_SHIFT, state.total_lp_amount)?)
        .ok_or(Error::MathOverflow)?;
    state.admin_fee_amount += admin_fee;
    Ok(())
}

/// Reward accrued by `deposit` and not yet paid
pub fn pending_reward(env: &Env, state: &PoolState, deposit: &UserDeposit) -> Result<u128, Error> {
    let accrued = mul_shr(env, deposit.lp_amount, state.acc_reward_per_share_p, REWARD_SHIFT)?;
    Ok(accrued.saturating_sub(deposit.reward_debt))
}

fn reward_debt(env: &Env, state: &PoolState, lp_amount: u128) -> Result<u128, Error> {
    mul_shr(env, lp_amount, state.acc_reward_per_share_p, REWARD_SHIFT)
}

/// Mint LP to `user`. Returns the reward to pay out.
pub fn deposit_lp(
    env: &Env,
    state: &mut PoolState,
    user: &Address,
    lp_amount: u128,
) -> Result<u128, Error> {
    let mut deposit = get_user_deposit(env, user);
    let pending = pending_reward(env, state, &deposit)?;

    deposit.lp_amount += lp_amount;
    deposit.reward_debt = reward_debt(env, state, deposit.lp_amount)?;
    state.total_lp_amount += lp_amount;

    set_user_deposit(env, user, &deposit);
    Ok(pending)
}

/// Burn LP of `user`. Returns the reward to pay out.
pub fn withdraw_lp(
    env: &Env,
    state: &mut PoolState,
    user: &Address,
    lp_amount: u128,
) -> Result<u128, Error> {
    let mut deposit = get_user_deposit(env, user);
    if deposit.lp_amount < lp_amount {
        return Err(Error::NotEnoughAmount);
    }
    let pending = pending_reward(env, state, &deposit)?;

    deposit.lp_amount -= lp_amount;
    deposit.reward_debt = reward_debt(env, state, deposit.lp_amount)?;
    state.total_lp_amount -= lp_amount;

    set_user_deposit(env, user, &deposit);
    Ok(pending)
}

/// Settle the pending reward of `user` without changing the LP amount
pub fn claim(env: &Env, state: &PoolState, user: &Address) -> Result<u128, Error> {
    let mut deposit = get_user_deposit(env, user);
    let pending = pending_reward(env, state, &deposit)?;
    if pending > 0 {
        deposit.reward_debt = reward_debt(env, state, deposit.lp_amount)?;
        set_user_deposit(env, user, &deposit);
    }
    Ok(pending)
}
