#![no_std]

mod invariants;
mod liquidity;
mod rewards;
mod storage;
mod swap;

use bridge_types::{AdminConfig, Error, PoolConfig, PoolState, UserDeposit, BP};
use soroban_sdk::{contract, contractimpl, token, Address, Env, Symbol};
use storage::{
    get_admin, get_config, get_state, get_user_deposit, is_initialized, non_reentrant,
    set_admin, set_config, set_state,
};

#[contract]
pub struct Pool;

#[contractimpl]
impl Pool {
    /// Initialize a pool for `token`
    ///
    /// # Arguments
    /// * `router` - Bridge contract allowed to swap
    /// * `a` - Amplification coefficient
    /// * `fee_share_bp` - Swap fee in basis points
    /// * `balance_ratio_min_bp` - Lowest allowed ratio between the curve legs
    pub fn initialize(
        env: Env,
        admin: Address,
        router: Address,
        a: u128,
        token: Address,
        fee_share_bp: u128,
        balance_ratio_min_bp: u128,
    ) -> Result<(), Error> {
        if is_initialized(&env) {
            return Err(Error::AlreadyInitialized);
        }
        if a == 0 || balance_ratio_min_bp > BP {
            return Err(Error::InvalidParameter);
        }
        if fee_share_bp > BP {
            return Err(Error::FeeTooHigh);
        }

        admin.require_auth();

        let decimals = token::Client::new(&env, &token).decimals();
        let config = PoolConfig {
            a,
            token,
            decimals,
            router,
            fee_share_bp,
            balance_ratio_min_bp,
            balance_diff_base_bp: BP,
            balance_diff_step_bp: 0,
            can_deposit: true,
            can_withdraw: true,
        };
        set_config(&env, &config);
        set_state(&env, &PoolState::new());
        set_admin(&env, &AdminConfig::new(admin));
        Ok(())
    }

    /// Deposit tokens
    ///
    /// # Returns
    /// LP amount minted
    pub fn deposit(env: Env, user: Address, amount: u128) -> Result<u128, Error> {
        liquidity::deposit(&env, user, amount)
    }

    /// Burn LP and withdraw tokens
    ///
    /// # Returns
    /// Token amount paid out, excluding rewards
    pub fn withdraw(env: Env, user: Address, lp_amount: u128) -> Result<u128, Error> {
        liquidity::withdraw(&env, user, lp_amount)
    }

    /// Swap tokens already moved to the pool into vUSD (router only)
    pub fn swap_to_v_usd(
        env: Env,
        user: Address,
        amount: u128,
        zero_fee: bool,
    ) -> Result<u128, Error> {
        swap::swap_to_v_usd(&env, user, amount, zero_fee)
    }

    /// Swap vUSD into tokens sent to `user` (router only)
    pub fn swap_from_v_usd(
        env: Env,
        user: Address,
        amount: u128,
        receive_amount_min: u128,
        zero_fee: bool,
    ) -> Result<u128, Error> {
        swap::swap_from_v_usd(&env, user, amount, receive_amount_min, zero_fee)
    }

    /// Pay out the pending reward of `user`
    pub fn claim_rewards(env: Env, user: Address) -> Result<u128, Error> {
        user.require_auth();

        non_reentrant(&env, || {
            let config = get_config(&env);
            let state = get_state(&env);
            let reward = rewards::claim(&env, &state, &user)?;
            if reward > 0 {
                token::Client::new(&env, &config.token).transfer(
                    &env.current_contract_address(),
                    &user,
                    &to_token_amount(reward)?,
                );
                env.events().publish(
                    (Symbol::new(&env, "rewards_claimed"), user.clone()),
                    reward,
                );
            }
            Ok(reward)
        })
    }

    /// Pay out the accumulated admin fee to the owner
    pub fn claim_admin_fee(env: Env) -> Result<u128, Error> {
        let admin = get_admin(&env);
        admin.require_owner();

        non_reentrant(&env, || {
            let config = get_config(&env);
            let mut state = get_state(&env);
            let amount = state.admin_fee_amount;
            if amount > 0 {
                state.admin_fee_amount = 0;
                set_state(&env, &state);
                token::Client::new(&env, &config.token).transfer(
                    &env.current_contract_address(),
                    &admin.owner,
                    &to_token_amount(amount)?,
                );
                env.events().publish(
                    (Symbol::new(&env, "admin_fee_claimed"), admin.owner.clone()),
                    amount,
                );
            }
            Ok(amount)
        })
    }

    /// Re-sync the LP supply with D by minting the drift to the owner
    ///
    /// # Returns
    /// LP amount minted
    pub fn adjust_total_lp_amount(env: Env) -> Result<u128, Error> {
        liquidity::adjust_total_lp_amount(&env)
    }

    // === Admin Functions ===

    pub fn set_fee_share(env: Env, fee_share_bp: u128) -> Result<(), Error> {
        get_admin(&env).require_owner();
        if fee_share_bp > BP {
            return Err(Error::FeeTooHigh);
        }
        let mut config = get_config(&env);
        config.fee_share_bp = fee_share_bp;
        set_config(&env, &config);
        publish_config_change(&env, "fee_share_set", fee_share_bp);
        Ok(())
    }

    pub fn set_admin_fee_share(env: Env, admin_fee_share_bp: u128) -> Result<(), Error> {
        get_admin(&env).require_owner();
        if admin_fee_share_bp > BP {
            return Err(Error::FeeTooHigh);
        }
        let mut state = get_state(&env);
        state.admin_fee_share_bp = admin_fee_share_bp;
        set_state(&env, &state);
        publish_config_change(&env, "admin_fee_share_set", admin_fee_share_bp);
        Ok(())
    }

    pub fn set_balance_ratio_min_bp(env: Env, balance_ratio_min_bp: u128) -> Result<(), Error> {
        get_admin(&env).require_owner();
        if balance_ratio_min_bp > BP {
            return Err(Error::InvalidParameter);
        }
        let mut config = get_config(&env);
        config.balance_ratio_min_bp = balance_ratio_min_bp;
        set_config(&env, &config);
        publish_config_change(&env, "balance_ratio_set", balance_ratio_min_bp);
        Ok(())
    }

    /// Configure how the allowed balance difference widens after a deposit
    ///
    /// # Arguments
    /// * `base_bp` - Allowed difference right after a deposit
    /// * `step_bp` - Growth per ledger
    pub fn set_balance_diff_window(env: Env, base_bp: u128, step_bp: u128) -> Result<(), Error> {
        get_admin(&env).require_owner();
        if base_bp > BP {
            return Err(Error::InvalidParameter);
        }
        let mut config = get_config(&env);
        config.balance_diff_base_bp = base_bp;
        config.balance_diff_step_bp = step_bp;
        set_config(&env, &config);
        env.events().publish(
            (Symbol::new(&env, "balance_window_set"),),
            (base_bp, step_bp),
        );
        Ok(())
    }

    pub fn stop_deposit(env: Env) {
        get_admin(&env).require_stop_authority();
        set_can_deposit(&env, false);
    }

    pub fn start_deposit(env: Env) {
        get_admin(&env).require_owner();
        set_can_deposit(&env, true);
    }

    pub fn stop_withdraw(env: Env) {
        get_admin(&env).require_stop_authority();
        set_can_withdraw(&env, false);
    }

    pub fn start_withdraw(env: Env) {
        get_admin(&env).require_owner();
        set_can_withdraw(&env, true);
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
        env.events().publish((Symbol::new(&env, "owner_set"),), owner);
    }

    pub fn set_router(env: Env, router: Address) {
        get_admin(&env).require_owner();
        let mut config = get_config(&env);
        config.router = router.clone();
        set_config(&env, &config);
        env.events().publish((Symbol::new(&env, "router_set"),), router);
    }

    // === View Functions ===

    pub fn get_config(env: Env) -> PoolConfig {
        get_config(&env)
    }

    pub fn get_state(env: Env) -> PoolState {
        get_state(&env)
    }

    pub fn get_admin(env: Env) -> AdminConfig {
        get_admin(&env)
    }

    pub fn d(env: Env) -> u128 {
        get_state(&env).d
    }

    pub fn token_balance(env: Env) -> u128 {
        get_state(&env).token_balance
    }

    pub fn v_usd_balance(env: Env) -> u128 {
        get_state(&env).v_usd_balance
    }

    pub fn reserves(env: Env) -> u128 {
        get_state(&env).reserves
    }

    pub fn total_lp_amount(env: Env) -> u128 {
        get_state(&env).total_lp_amount
    }

    pub fn token(env: Env) -> Address {
        get_config(&env).token
    }

    pub fn decimals(env: Env) -> u32 {
        get_config(&env).decimals
    }

    pub fn can_deposit(env: Env) -> bool {
        get_config(&env).can_deposit
    }

    pub fn can_withdraw(env: Env) -> bool {
        get_config(&env).can_withdraw
    }

    pub fn user_deposit(env: Env, user: Address) -> UserDeposit {
        get_user_deposit(&env, &user)
    }

    pub fn pending_reward(env: Env, user: Address) -> Result<u128, Error> {
        let state = get_state(&env);
        rewards::pending_reward(&env, &state, &get_user_deposit(&env, &user))
    }

    /// Other leg of the curve for balance `x` at the current D
    pub fn get_y(env: Env, x: u128) -> Result<u128, Error> {
        let config = get_config(&env);
        bridge_math::get_y(&env, x, get_state(&env).d, config.a)
    }

    /// Curve invariant for balances `x` and `y`
    pub fn get_d(env: Env, x: u128, y: u128) -> Result<u128, Error> {
        bridge_math::get_d(&env, x, y, get_config(&env).a)
    }
}

/// Native amounts are u128 inside the pool and i128 on the token interface
pub(crate) fn to_token_amount(amount: u128) -> Result<i128, Error> {
    i128::try_from(amount).map_err(|_| Error::MathOverflow)
}

fn set_can_deposit(env: &Env, value: bool) {
    let mut config = get_config(env);
    config.can_deposit = value;
    set_config(env, &config);
    env.events()
        .publish((Symbol::new(env, "can_deposit_set"),), value);
}

fn set_can_withdraw(env: &Env, value: bool) {
    let mut config = get_config(env);
    config.can_withdraw = value;
    set_config(env, &config);
    env.events()
        .publish((Symbol::new(env, "can_withdraw_set"),), value);
}

fn publish_config_change(env: &Env, name: &str, value: u128) {
    env.events().publish((Symbol::new(env, name),), value);
}
