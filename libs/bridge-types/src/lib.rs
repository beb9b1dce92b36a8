#![no_std]

mod admin;
mod error;
mod invoke;
mod message;
mod messenger;
mod oracle;
mod pool;

pub use admin::*;
pub use error::*;
pub use invoke::*;
pub use message::*;
pub use messenger::*;
pub use oracle::*;
pub use pool::*;

/// Decimal digits used for every amount inside a pool
pub const SYSTEM_PRECISION: u32 = 3;

/// Basis points denominator (100%)
pub const BP: u128 = 10_000;

/// Upper bound (exclusive) for a pool's token balance in system precision
pub const MAX_TOKEN_BALANCE: u128 = 1 << 40;

/// Fixed-point shift of the accumulated reward per LP share
pub const REWARD_SHIFT: u32 = 48;

/// Decimal digits of gas oracle prices
pub const ORACLE_PRECISION: u32 = 18;

/// 10^ORACLE_PRECISION
pub const ORACLE_SCALING_FACTOR: u128 = 1_000_000_000_000_000_000;

/// Largest chain id that fits into the one-byte chain slots of a message hash
pub const MAX_CHAIN_ID: u32 = u8::MAX as u32;
