#![no_std]

pub mod full_math;
pub mod precision;
pub mod stable_swap;

pub use full_math::*;
pub use precision::*;
pub use stable_swap::*;
