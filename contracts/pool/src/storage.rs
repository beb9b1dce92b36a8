use bridge_types::{AdminConfig, Error, PoolConfig, PoolState, UserDeposit};
use soroban_sdk::{contracttype, panic_with_error, Address, Env};

// ============================================================================
// Storage layout
// ============================================================================
// - Config, State, Admin and the reentrancy flag live in Instance storage and
//   are touched by every call
// - Each LP position is a separate Persistent entry (~50 bytes)
// - Empty positions are removed
// ============================================================================

/// Storage keys for the pool contract
#[contracttype]
#[derive(Clone)]
pub enum DataKey {
    /// Administrative roles (Instance storage)
    Admin,
    /// Pool configuration (Instance storage)
    Config,
    /// Balances and reward accounting (Instance storage)
    State,
    /// Set while a guarded entry point runs (Instance storage)
    Locked,
    /// LP position: user -> UserDeposit (Persistent storage)
    UserDeposit(Address),
}

// TTL constants
const INSTANCE_TTL_THRESHOLD: u32 = 17280; // ~1 day
const INSTANCE_TTL_EXTEND: u32 = 518400; // ~30 days
const PERSISTENT_TTL_THRESHOLD: u32 = 17280;
const PERSISTENT_TTL_EXTEND: u32 = 518400;

/// Extend instance storage TTL
pub fn extend_instance_ttl(env: &Env) {
    env.storage()
        .instance()
        .extend_ttl(INSTANCE_TTL_THRESHOLD, INSTANCE_TTL_EXTEND);
}

/// Extend persistent storage TTL for a key
pub fn extend_persistent_ttl(env: &Env, key: &DataKey) {
    env.storage()
        .persistent()
        .extend_ttl(key, PERSISTENT_TTL_THRESHOLD, PERSISTENT_TTL_EXTEND);
}

pub fn is_initialized(env: &Env) -> bool {
    env.storage().instance().has(&DataKey::Config)
}

// === Admin ===

pub fn get_admin(env: &Env) -> AdminConfig {
    extend_instance_ttl(env);
    env.storage()
        .instance()
        .get(&DataKey::Admin)
        .unwrap_or_else(|| panic_with_error!(env, Error::NotInitialized))
}

pub fn set_admin(env: &Env, admin: &AdminConfig) {
    env.storage().instance().set(&DataKey::Admin, admin);
    extend_instance_ttl(env);
}

// === Config ===

pub fn get_config(env: &Env) -> PoolConfig {
    extend_instance_ttl(env);
    env.storage()
        .instance()
        .get(&DataKey::Config)
        .unwrap_or_else(|| panic_with_error!(env, Error::NotInitialized))
}

pub fn set_config(env: &Env, config: &PoolConfig) {
    env.storage().instance().set(&DataKey::Config, config);
    extend_instance_ttl(env);
}

// === State ===

pub fn get_state(env: &Env) -> PoolState {
    extend_instance_ttl(env);
    env.storage()
        .instance()
        .get(&DataKey::State)
        .unwrap_or_else(|| panic_with_error!(env, Error::NotInitialized))
}

pub fn set_state(env: &Env, state: &PoolState) {
    env.storage().instance().set(&DataKey::State, state);
    extend_instance_ttl(env);
}

// === User deposits ===

pub fn get_user_deposit(env: &Env, user: &Address) -> UserDeposit {
    let key = DataKey::UserDeposit(user.clone());
    env.storage()
        .persistent()
        .get(&key)
        .unwrap_or_default()
}

pub fn set_user_deposit(env: &Env, user: &Address, deposit: &UserDeposit) {
    let key = DataKey::UserDeposit(user.clone());
    if deposit.lp_amount == 0 && deposit.reward_debt == 0 {
        // Remove empty position
        env.storage().persistent().remove(&key);
    } else {
        env.storage().persistent().set(&key, deposit);
        extend_persistent_ttl(env, &key);
    }
}

// === Reentrancy lock ===

pub fn is_locked(env: &Env) -> bool {
    env.storage()
        .instance()
        .get(&DataKey::Locked)
        .unwrap_or(false)
}

pub fn set_locked(env: &Env, locked: bool) {
    if locked {
        env.storage().instance().set(&DataKey::Locked, &true);
    } else {
        env.storage().instance().remove(&DataKey::Locked);
    }
}

/// Run `f` holding the pool lock. A nested guarded call fails with `Reentrancy`.
pub fn non_reentrant<T>(env: &Env, f: impl FnOnce() -> Result<T, Error>) -> Result<T, Error> {
    if is_locked(env) {
        return Err(Error::Reentrancy);
    }
    set_locked(env, true);
    let result = f();
    set_locked(env, false);
    result
}
