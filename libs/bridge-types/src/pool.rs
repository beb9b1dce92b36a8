use soroban_sdk::{contracttype, Address};

/// Pool configuration - set at initialization, tunable by the owner
#[contracttype]
#[derive(Clone, Debug)]
pub struct PoolConfig {
    /// StableSwap amplification coefficient
    pub a: u128,
    /// Underlying token
    pub token: Address,
    /// Native decimals of the underlying token
    pub decimals: u32,
    /// Bridge contract allowed to swap against the pool
    pub router: Address,
    /// Swap fee in basis points
    pub fee_share_bp: u128,
    /// Lowest allowed ratio between the smaller and the larger balance, in basis points
    pub balance_ratio_min_bp: u128,
    /// Allowed balance difference right after a deposit, in basis points
    pub balance_diff_base_bp: u128,
    /// Growth of the allowed balance difference per ledger since the last deposit
    pub balance_diff_step_bp: u128,
    pub can_deposit: bool,
    pub can_withdraw: bool,
}

/// Pool balances and reward accounting - stored in Instance storage
#[contracttype]
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct PoolState {
    /// Token leg of the curve (system precision)
    pub token_balance: u128,
    /// Virtual vUSD leg of the curve (system precision)
    pub v_usd_balance: u128,
    /// Real tokens held for payouts (system precision)
    pub reserves: u128,
    /// Current curve invariant
    pub d: u128,
    /// Sum of all user LP amounts
    pub total_lp_amount: u128,
    /// Reward per LP share, shifted left by REWARD_SHIFT
    pub acc_reward_per_share_p: u128,
    /// Part of every fee kept for the owner, in basis points
    pub admin_fee_share_bp: u128,
    /// Unclaimed owner fees (native precision)
    pub admin_fee_amount: u128,
    /// Ledger sequence of the last deposit
    pub last_deposit_ledger: u32,
}

impl PoolState {
    pub fn new() -> Self {
        Self::default()
    }
}

/// LP position of a single user
#[contracttype]
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct UserDeposit {
    pub lp_amount: u128,
    /// Rewards already accounted for at the current `lp_amount`
    pub reward_debt: u128,
}
