use bridge_types::{Error, SYSTEM_PRECISION};

/// 10^exp
pub fn pow10(exp: u32) -> Result<u128, Error> {
    10u128.checked_pow(exp).ok_or(Error::MathOverflow)
}

/// Native token amount to system precision. Truncates.
pub fn to_system_precision(amount: u128, decimals: u32) -> Result<u128, Error> {
    if decimals > SYSTEM_PRECISION {
        Ok(amount / pow10(decimals - SYSTEM_PRECISION)?)
    } else {
        amount
            .checked_mul(pow10(SYSTEM_PRECISION - decimals)?)
            .ok_or(Error::MathOverflow)
    }
}

/// System precision amount to native token precision. Truncates.
pub fn from_system_precision(amount: u128, decimals: u32) -> Result<u128, Error> {
    if decimals > SYSTEM_PRECISION {
        amount
            .checked_mul(pow10(decimals - SYSTEM_PRECISION)?)
            .ok_or(Error::MathOverflow)
    } else {
        Ok(amount / pow10(SYSTEM_PRECISION - decimals)?)
    }
}
