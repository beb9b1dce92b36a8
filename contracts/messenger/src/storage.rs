use bridge_types::{AdminConfig, Error};
use soroban_sdk::{contracttype, panic_with_error, Address, BytesN, Env};

/// Messenger configuration (Instance storage)
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct MessengerConfig {
    pub chain_id: u32,
    /// Token the relay fee is paid in
    pub native_token: Address,
    pub gas_oracle: Address,
    /// Validator that must authorize every delivered message
    pub primary_validator: Address,
}

/// Storage keys for the messenger contract
#[contracttype]
#[derive(Clone)]
pub enum DataKey {
    Admin,
    Config,
    /// Registered secondary validator (Persistent storage)
    SecondaryValidator(Address),
    /// Chain messages can be sent to (Persistent storage)
    OtherChainId(u32),
    /// Gas needed to deliver a message to a chain (Persistent storage)
    GasUsage(u32),
    /// Sent message -> ledger it was sent at (Persistent storage)
    SentMessage(BytesN<32>),
    /// Delivered message (Persistent storage)
    ReceivedMessage(BytesN<32>),
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

pub fn get_config(env: &Env) -> MessengerConfig {
    extend_instance_ttl(env);
    env.storage()
        .instance()
        .get(&DataKey::Config)
        .unwrap_or_else(|| panic_with_error!(env, Error::NotInitialized))
}

pub fn set_config(env: &Env, config: &MessengerConfig) {
    env.storage().instance().set(&DataKey::Config, config);
    extend_instance_ttl(env);
}

// === Flags ===

fn get_flag(env: &Env, key: &DataKey) -> bool {
    env.storage().persistent().get(key).unwrap_or(false)
}

fn set_flag(env: &Env, key: DataKey, value: bool) {
    if value {
        env.storage().persistent().set(&key, &true);
        extend_persistent_ttl(env, &key);
    } else {
        env.storage().persistent().remove(&key);
    }
}

pub fn is_secondary_validator(env: &Env, validator: &Address) -> bool {
    get_flag(env, &DataKey::SecondaryValidator(validator.clone()))
}

pub fn set_secondary_validator(env: &Env, validator: &Address, enabled: bool) {
    set_flag(env, DataKey::SecondaryValidator(validator.clone()), enabled);
}

pub fn is_other_chain(env: &Env, chain_id: u32) -> bool {
    get_flag(env, &DataKey::OtherChainId(chain_id))
}

pub fn set_other_chain(env: &Env, chain_id: u32, enabled: bool) {
    set_flag(env, DataKey::OtherChainId(chain_id), enabled);
}

// === Gas usage ===

pub fn get_gas_usage(env: &Env, chain_id: u32) -> u128 {
    env.storage()
        .persistent()
        .get(&DataKey::GasUsage(chain_id))
        .unwrap_or(0)
}

pub fn set_gas_usage(env: &Env, chain_id: u32, gas_usage: u128) {
    let key = DataKey::GasUsage(chain_id);
    env.storage().persistent().set(&key, &gas_usage);
    extend_persistent_ttl(env, &key);
}

// === Messages ===
// Sent and received messages are never removed.

pub fn get_sent_message(env: &Env, message: &BytesN<32>) -> Option<u32> {
    env.storage()
        .persistent()
        .get(&DataKey::SentMessage(message.clone()))
}

pub fn set_sent_message(env: &Env, message: &BytesN<32>, ledger: u32) {
    let key = DataKey::SentMessage(message.clone());
    env.storage().persistent().set(&key, &ledger);
    extend_persistent_ttl(env, &key);
}

pub fn has_received_message(env: &Env, message: &BytesN<32>) -> bool {
    get_flag(env, &DataKey::ReceivedMessage(message.clone()))
}

pub fn set_received_message(env: &Env, message: &BytesN<32>) {
    set_flag(env, DataKey::ReceivedMessage(message.clone()), true);
}
