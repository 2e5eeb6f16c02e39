use pendzl::math::{
    errors::MathError,
    operations::{mul_div, Rounding},
};

use crate::constants::E18_U128;

/// amount * rate / 1e18, rounded down.
pub fn mul_denom_e18(amount: u128, rate: u128) -> Result<u128, MathError> {
    mul_div(amount, rate, E18_U128, Rounding::Down)
}

/// numerator / denominator as an 1e18-scaled fraction, rounded down.
pub fn ratio_e18(numerator: u128, denominator: u128) -> Result<u128, MathError> {
    mul_div(numerator, E18_U128, denominator, Rounding::Down)
}
