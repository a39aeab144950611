use fixed::types::I80F48;
use primitive_types::U256;

use crate::error::OracleError;
use crate::PRECISION;

/// `a * b / denominator` with a 256-bit intermediate, truncating toward zero.
pub fn mul_div(a: u128, b: u128, denominator: u128) -> Result<u128, OracleError> {
    let quotient = wide_quotient(a, b, denominator)?;
    if quotient > U256::from(u128::MAX) {
        return Err(OracleError::MathOverflow);
    }
    Ok(quotient.low_u128())
}

/// Like [`mul_div`], but a quotient above `u128::MAX` is clamped to `u128::MAX`.
pub fn mul_div_saturating(a: u128, b: u128, denominator: u128) -> Result<u128, OracleError> {
    let quotient = wide_quotient(a, b, denominator)?;
    Ok(if quotient > U256::from(u128::MAX) {
        u128::MAX
    } else {
        quotient.low_u128()
    })
}

fn wide_quotient(a: u128, b: u128, denominator: u128) -> Result<U256, OracleError> {
    if denominator == 0 {
        return Err(OracleError::DivisionByZero);
    }
    // Two u128 factors always fit in 256 bits.
    Ok(U256::from(a) * U256::from(b) / U256::from(denominator))
}

/// Multiply two wad values: `a * b / PRECISION`.
pub fn wad_mul(a: u128, b: u128) -> Result<u128, OracleError> {
    mul_div(a, b, PRECISION)
}

/// Divide two wad values: `a * PRECISION / b`.
pub fn wad_div(a: u128, b: u128) -> Result<u128, OracleError> {
    mul_div(a, PRECISION, b)
}

/// USD value (18 decimals) of `amount` units priced at `price`.
pub fn usd_value(price: u128, amount: u128) -> Result<u128, OracleError> {
    wad_mul(price, amount)
}

/// Units of an asset priced at `price` worth `usd_amount`.
pub fn amount_from_usd(price: u128, usd_amount: u128) -> Result<u128, OracleError> {
    wad_div(usd_amount, price)
}

/// Render a wad value as a binary fixed-point decimal for log output.
pub fn wad_to_fixed(value: u128) -> I80F48 {
    // u128::MAX / PRECISION < 2^79, so the integer part always fits.
    let whole = I80F48::from_num(value / PRECISION);
    let fraction = I80F48::from_num(value % PRECISION) / I80F48::from_num(PRECISION);
    whole + fraction
}
