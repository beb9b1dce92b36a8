// ============================================================================
// INVARIANTS MODULE
// ============================================================================
//
// Properties of the pool state that every entry point must preserve.
//
// 1. CURVE INVARIANTS
//    - Tracked D matches a fresh get_d(token_balance, v_usd_balance)
//    - Token balance stays below MAX_TOKEN_BALANCE
//
// 2. BALANCE RATIO
//    - The smaller curve leg never drops below the effective minimum ratio
//    - The allowed difference widens with ledgers elapsed since the last deposit
//
// 3. LP INVARIANTS
//    - total_lp_amount equals the sum of user LP amounts
//
// ============================================================================

use bridge_math::get_d;
use bridge_types::{Error, PoolConfig, PoolState, MAX_TOKEN_BALANCE, BP};
use soroban_sdk::Env;

// ============================================================================
// CURVE INVARIANTS
// ============================================================================

/// Invariant: token balance is bounded
///
/// Property:
///   token_balance < MAX_TOKEN_BALANCE
pub fn token_balance_in_bounds(state: &PoolState) -> bool {
    state.token_balance < MAX_TOKEN_BALANCE
}

/// Invariant: tracked D matches the balances
///
/// Property:
///   |d - get_d(token_balance, v_usd_balance)| <= tolerance
///
/// Swaps keep D fixed and move balances along the curve with rounding, so the
/// fresh value drifts from the tracked one by a few units.
pub fn d_matches_balances(
    env: &Env,
    state: &PoolState,
    a: u128,
    tolerance: u128,
) -> Result<bool, Error> {
    let fresh = get_d(env, state.token_balance, state.v_usd_balance, a)?;
    Ok(fresh.abs_diff(state.d) <= tolerance)
}

// ============================================================================
// BALANCE RATIO
// ============================================================================

/// Allowed balance difference after `elapsed` ledgers since the last deposit
///
/// Property:
///   allowed_balance_diff_bp(e1) <= allowed_balance_diff_bp(e2) for e1 <= e2
///   allowed_balance_diff_bp(e) <= BP
pub fn allowed_balance_diff_bp(config: &PoolConfig, elapsed: u32) -> u128 {
    let growth = config
        .balance_diff_step_bp
        .saturating_mul(elapsed as u128);
    config
        .balance_diff_base_bp
        .saturating_add(growth)
        .min(BP)
}

/// Lowest allowed ratio between the smaller and the larger leg
pub fn min_balance_ratio_bp(config: &PoolConfig, elapsed: u32) -> u128 {
    let from_window = BP - allowed_balance_diff_bp(config, elapsed);
    config.balance_ratio_min_bp.max(from_window)
}

/// Check the balance ratio at ledger `current_ledger`
///
/// Property:
///   min(x, y) * BP / max(x, y) >= min_balance_ratio_bp
pub fn validate_balance_ratio(
    config: &PoolConfig,
    state: &PoolState,
    current_ledger: u32,
) -> Result<(), Error> {
    let elapsed = current_ledger.saturating_sub(state.last_deposit_ledger);
    let min_ratio = min_balance_ratio_bp(config, elapsed);

    if state.token_balance > state.v_usd_balance {
        if state.v_usd_balance * BP / state.token_balance < min_ratio {
            return Err(Error::LowVUsdBalance);
        }
    } else if state.token_balance < state.v_usd_balance
        && state.token_balance * BP / state.v_usd_balance < min_ratio
    {
        return Err(Error::LowTokenBalance);
    }
    Ok(())
}

// ============================================================================
// LP INVARIANTS
// ============================================================================

/// Invariant: LP supply covers D after an adjustment
///
/// Property:
///   total_lp_amount >= d
pub fn lp_supply_covers_d(state: &PoolState) -> bool {
    state.total_lp_amount >= state.d
}

#[cfg(test)]
mod tests {
    use super::*;
    use soroban_sdk::testutils::Address as _;
    use soroban_sdk::{Address, Env};

    fn config(env: &Env, ratio_min_bp: u128, base_bp: u128, step_bp: u128) -> PoolConfig {
        PoolConfig {
            a: 20,
            token: Address::generate(env),
            decimals: 7,
            router: Address::generate(env),
            fee_share_bp: 0,
            balance_ratio_min_bp: ratio_min_bp,
            balance_diff_base_bp: base_bp,
            balance_diff_step_bp: step_bp,
            can_deposit: true,
            can_withdraw: true,
        }
    }

    fn state(token_balance: u128, v_usd_balance: u128, last_deposit_ledger: u32) -> PoolState {
        PoolState {
            token_balance,
            v_usd_balance,
            last_deposit_ledger,
            ..PoolState::new()
        }
    }

    #[test]
    fn test_allowed_diff_is_monotonic_and_capped() {
        let env = Env::default();
        let config = config(&env, 0, 1000, 10);

        let mut previous = 0;
        for elapsed in [0u32, 1, 10, 100, 899, 900, 901, 10_000, u32::MAX] {
            let allowed = allowed_balance_diff_bp(&config, elapsed);
            assert!(allowed >= previous);
            assert!(allowed <= BP);
            previous = allowed;
        }
        assert_eq!(allowed_balance_diff_bp(&config, 0), 1000);
        assert_eq!(allowed_balance_diff_bp(&config, 100), 2000);
        assert_eq!(allowed_balance_diff_bp(&config, 900), BP);
    }

    #[test]
    fn test_default_window_uses_plain_ratio() {
        let env = Env::default();
        let config = config(&env, 5000, BP, 0);
        assert_eq!(min_balance_ratio_bp(&config, 0), 5000);
        assert_eq!(min_balance_ratio_bp(&config, 1_000_000), 5000);
    }

    #[test]
    fn test_validate_balance_ratio() {
        let env = Env::default();
        let config = config(&env, 5000, BP, 0);

        assert_eq!(validate_balance_ratio(&config, &state(100, 100, 0), 0), Ok(()));
        assert_eq!(validate_balance_ratio(&config, &state(100, 50, 0), 0), Ok(()));
        assert_eq!(
            validate_balance_ratio(&config, &state(100, 49, 0), 0),
            Err(Error::LowVUsdBalance)
        );
        assert_eq!(
            validate_balance_ratio(&config, &state(49, 100, 0), 0),
            Err(Error::LowTokenBalance)
        );
    }

    #[test]
    fn test_window_widens_after_deposit() {
        let env = Env::default();
        // 10% right after a deposit, +1% per ledger
        let config = config(&env, 0, 1000, 100);
        let skewed = state(100, 80, 50);

        assert_eq!(
            validate_balance_ratio(&config, &skewed, 50),
            Err(Error::LowVUsdBalance)
        );
        assert_eq!(
            validate_balance_ratio(&config, &skewed, 59),
            Err(Error::LowVUsdBalance)
        );
        assert_eq!(validate_balance_ratio(&config, &skewed, 60), Ok(()));
    }

    #[test]
    fn test_d_matches_balances() {
        let env = Env::default();
        let mut s = state(500_000_000, 500_000_000, 0);
        s.d = 1_000_000_000;
        assert_eq!(d_matches_balances(&env, &s, 20, 0), Ok(true));
        s.d = 1_000_000_005;
        assert_eq!(d_matches_balances(&env, &s, 20, 4), Ok(false));
    }
}
