use bridge_types::{Error, BP};
use soroban_fixed_point_math::SorobanFixedPoint;
use soroban_sdk::{Env, U256};

/// Multiply and divide with 256-bit intermediate precision (rounds down)
/// Returns (a * b) / denominator
pub fn mul_div(env: &Env, a: u128, b: u128, denominator: u128) -> Result<u128, Error> {
    if denominator == 0 {
        return Err(Error::DivisionByZero);
    }

    let a_256 = U256::from_u128(env, a);
    let b_256 = U256::from_u128(env, b);
    let denom_256 = U256::from_u128(env, denominator);

    u256_to_u128(&a_256.mul(&b_256).div(&denom_256))
}

/// (a * b) >> shift with 256-bit intermediate precision
pub fn mul_shr(env: &Env, a: u128, b: u128, shift: u32) -> Result<u128, Error> {
    let product = U256::from_u128(env, a).mul(&U256::from_u128(env, b));
    u256_to_u128(&product.shr(shift))
}

/// (a << shift) / denominator with 256-bit intermediate precision
pub fn shl_div(env: &Env, a: u128, shift: u32, denominator: u128) -> Result<u128, Error> {
    if denominator == 0 {
        return Err(Error::DivisionByZero);
    }
    let shifted = U256::from_u128(env, a).shl(shift);
    u256_to_u128(&shifted.div(&U256::from_u128(env, denominator)))
}

/// Basis-point share of an amount, rounded down
pub fn bp_share(env: &Env, amount: u128, bp: u128) -> u128 {
    amount.fixed_mul_floor(env, &bp, &BP)
}

/// Convert U256 to u128
pub fn u256_to_u128(value: &U256) -> Result<u128, Error> {
    value.to_u128().ok_or(Error::MathOverflow)
}
