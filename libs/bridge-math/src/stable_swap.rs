// Two-asset StableSwap curve between a token balance `x` and a virtual vUSD
// balance `y`, solved in closed form:
//
//   4A(x + y) + D = 4AD + D^3 / (4xy)
//
// All intermediates are 256-bit. The integer roots and their rounding are part of
// the pool's observable behavior and match the pools on other chains.

use crate::full_math::u256_to_u128;
use bridge_types::Error;
use soroban_sdk::{Env, U256};

/// Integer square root (Babylonian method, rounds down)
pub fn sqrt(env: &Env, n: &U256) -> U256 {
    let zero = U256::from_u32(env, 0);
    if *n == zero {
        return zero;
    }

    let mut x = n.shr(1).add(&U256::from_u32(env, 1));
    let mut y = x.add(&n.div(&x)).shr(1);
    while x > y {
        x = y;
        y = x.add(&n.div(&x)).shr(1);
    }
    x
}

/// Integer cube root, one base-2 digit per step from bit 255 down (rounds down)
pub fn cbrt(env: &Env, n: &U256) -> U256 {
    let one = U256::from_u32(env, 1);
    let three = U256::from_u32(env, 3);
    let mut n = n.clone();
    let mut x = U256::from_u32(env, 0);

    let mut shift: i32 = 255;
    while shift >= 0 {
        x = x.shl(1);
        let z = three.mul(&x).mul(&x.add(&one)).add(&one);
        if n.shr(shift as u32) >= z {
            n = n.sub(&z.shl(shift as u32));
            x = x.add(&one);
        }
        shift -= 3;
    }
    x
}

/// Curve invariant for balances `x` and `y`
pub fn get_d(env: &Env, x: u128, y: u128, a: u128) -> Result<u128, Error> {
    let x = U256::from_u128(env, x);
    let y = U256::from_u128(env, y);
    let a = U256::from_u128(env, a);

    let xy = x.mul(&y);
    // A * xy * (x + y)
    let p1 = a.mul(&xy).mul(&x.add(&y));
    // xy * (4A - 1) / 3
    let p2 = xy
        .mul(&a.shl(2).sub(&U256::from_u32(env, 1)))
        .div(&U256::from_u32(env, 3));
    // sqrt(p1^2 + p2^3)
    let p3 = sqrt(env, &p1.mul(&p1).add(&p2.mul(&p2).mul(&p2)));

    let mut d = cbrt(env, &p1.add(&p3));
    if p3 > p1 {
        d = d.sub(&cbrt(env, &p3.sub(&p1)));
    } else {
        d = d.add(&cbrt(env, &p1.sub(&p3)));
    }
    u256_to_u128(&d.shl(1))
}

/// Balance on the other side of the curve that keeps invariant `d` for balance `x`.
///
/// The result carries a +1 rounding unit in favor of the pool.
pub fn get_y(env: &Env, x: u128, d: u128, a: u128) -> Result<u128, Error> {
    if x == 0 {
        return Err(Error::DivisionByZero);
    }
    let x = U256::from_u128(env, x);
    let d = U256::from_u128(env, d);
    let a = U256::from_u128(env, a);
    let a4 = a.shl(2);

    // part1 = 4A(D - x) - D, kept as magnitude and sign
    let (d_minus_x, d_below_x) = abs_diff(&d, &x);
    let scaled = a4.mul(&d_minus_x);
    let (part1, part1_negative) = if d_below_x {
        (scaled.add(&d), true)
    } else {
        let (diff, below) = abs_diff(&scaled, &d);
        (diff, below)
    };

    // part2 = x * (4A * D^3 + x * part1^2)
    let ddd = d.mul(&d).mul(&d);
    let part2 = x.mul(&a4.mul(&ddd).add(&x.mul(&part1.mul(&part1))));

    let root = sqrt(env, &part2);
    let x_part1 = x.mul(&part1);
    let numerator = if part1_negative {
        if root < x_part1 {
            return Err(Error::MathOverflow);
        }
        root.sub(&x_part1)
    } else {
        root.add(&x_part1)
    };

    let y = numerator.div(&a.shl(3).mul(&x));
    u256_to_u128(&y.add(&U256::from_u32(env, 1)))
}

/// |a - b| and whether a < b
fn abs_diff(a: &U256, b: &U256) -> (U256, bool) {
    if a < b {
        (b.sub(a), true)
    } else {
        (a.sub(b), false)
    }
}
