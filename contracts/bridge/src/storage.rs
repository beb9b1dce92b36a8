use bridge_types::{AdminConfig, Error, MessengerProtocol};
use soroban_sdk::{contracttype, panic_with_error, Address, BytesN, Env, IntoVal, TryFromVal, Val};

// ============================================================================
// Storage layout
// ============================================================================
// - Admin and Config live in Instance storage
// - Registries (pools, counterpart bridges, tokens, messengers, gas usage) are
//   Persistent entries
// - Sent and received transfer hashes are Persistent and never removed
// ============================================================================

/// Bridge configuration (Instance storage)
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct BridgeConfig {
    pub chain_id: u32,
    /// Token gas fees are paid in
    pub native_token: Address,
    /// Decimals of the native token
    pub chain_precision: u32,
    pub gas_oracle: Address,
    /// Account whose swaps are fee free
    pub rebalancer: Option<Address>,
    pub can_swap: bool,
}

/// Storage keys for the bridge contract
#[contracttype]
#[derive(Clone)]
pub enum DataKey {
    Admin,
    Config,
    /// Local token id -> pool
    Pool(BytesN<32>),
    /// Chain id -> counterpart bridge
    OtherBridge(u32),
    /// (chain id, token id) accepted on the destination
    OtherBridgeToken(u32, BytesN<32>),
    /// Transfer hashes sent from this chain
    SentMessage(BytesN<32>),
    /// Transfer hashes processed on this chain
    ReceivedMessage(BytesN<32>),
    /// Gas used by `receive_tokens` on a chain
    GasUsage(u32),
    Messenger(MessengerProtocol),
}

// TTL constants
const INSTANCE_TTL_THRESHOLD: u32 = 17280; // ~1 day
const INSTANCE_TTL_EXTEND: u32 = 518400; // ~30 days
const PERSISTENT_TTL_THRESHOLD: u32 = 17280;
const PERSISTENT_TTL_EXTEND: u32 = 518400;

pub fn extend_instance_ttl(env: &Env) {
    env.storage()
        .instance()
        .extend_ttl(INSTANCE_TTL_THRESHOLD, INSTANCE_TTL_EXTEND);
}

fn extend_persistent_ttl(env: &Env, key: &DataKey) {
    env.storage()
        .persistent()
        .extend_ttl(key, PERSISTENT_TTL_THRESHOLD, PERSISTENT_TTL_EXTEND);
}

fn get_persistent<T: TryFromVal<Env, Val>>(env: &Env, key: &DataKey) -> Option<T> {
    let value = env.storage().persistent().get(key);
    if value.is_some() {
        extend_persistent_ttl(env, key);
    }
    value
}

fn set_persistent<T: IntoVal<Env, Val>>(env: &Env, key: &DataKey, value: &T) {
    env.storage().persistent().set(key, value);
    extend_persistent_ttl(env, key);
}

pub fn is_initialized(env: &Env) -> bool {
    env.storage().instance().has(&DataKey::Config)
}

// === Admin / Config ===

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

pub fn get_config(env: &Env) -> BridgeConfig {
    extend_instance_ttl(env);
    env.storage()
        .instance()
        .get(&DataKey::Config)
        .unwrap_or_else(|| panic_with_error!(env, Error::NotInitialized))
}

pub fn set_config(env: &Env, config: &BridgeConfig) {
    env.storage().instance().set(&DataKey::Config, config);
    extend_instance_ttl(env);
}

// === Registries ===

pub fn get_pool(env: &Env, token_id: &BytesN<32>) -> Option<Address> {
    get_persistent(env, &DataKey::Pool(token_id.clone()))
}

pub fn set_pool(env: &Env, token_id: &BytesN<32>, pool: &Address) {
    set_persistent(env, &DataKey::Pool(token_id.clone()), pool);
}

pub fn get_other_bridge(env: &Env, chain_id: u32) -> Option<BytesN<32>> {
    get_persistent(env, &DataKey::OtherBridge(chain_id))
}

pub fn set_other_bridge(env: &Env, chain_id: u32, bridge: &BytesN<32>) {
    set_persistent(env, &DataKey::OtherBridge(chain_id), bridge);
}

pub fn is_other_bridge_token(env: &Env, chain_id: u32, token_id: &BytesN<32>) -> bool {
    get_persistent(env, &DataKey::OtherBridgeToken(chain_id, token_id.clone())).unwrap_or(false)
}

pub fn set_other_bridge_token(env: &Env, chain_id: u32, token_id: &BytesN<32>, enabled: bool) {
    let key = DataKey::OtherBridgeToken(chain_id, token_id.clone());
    if enabled {
        set_persistent(env, &key, &true);
    } else {
        env.storage().persistent().remove(&key);
    }
}

pub fn get_gas_usage(env: &Env, chain_id: u32) -> u128 {
    get_persistent(env, &DataKey::GasUsage(chain_id)).unwrap_or(0)
}

pub fn set_gas_usage(env: &Env, chain_id: u32, gas_usage: u128) {
    set_persistent(env, &DataKey::GasUsage(chain_id), &gas_usage);
}

pub fn get_messenger(env: &Env, protocol: MessengerProtocol) -> Option<Address> {
    get_persistent(env, &DataKey::Messenger(protocol))
}

pub fn set_messenger(env: &Env, protocol: MessengerProtocol, messenger: &Address) {
    set_persistent(env, &DataKey::Messenger(protocol), messenger);
}

// === Transfer hashes ===

pub fn has_sent_message(env: &Env, hash: &BytesN<32>) -> bool {
    env.storage()
        .persistent()
        .has(&DataKey::SentMessage(hash.clone()))
}

pub fn set_sent_message(env: &Env, hash: &BytesN<32>) {
    set_persistent(env, &DataKey::SentMessage(hash.clone()), &true);
}

pub fn has_received_message(env: &Env, hash: &BytesN<32>) -> bool {
    env.storage()
        .persistent()
        .has(&DataKey::ReceivedMessage(hash.clone()))
}

pub fn set_received_message(env: &Env, hash: &BytesN<32>) {
    set_persistent(env, &DataKey::ReceivedMessage(hash.clone()), &true);
}
