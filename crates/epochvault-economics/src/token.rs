// crates/epochvault-economics/src/token.rs
//
// Amount units and fixed-point helpers.
//
// Amounts are u128 in the token's smallest unit (18 decimals). Fee
// percentages are u32 parts-per-million over FEE_DENOMINATOR. Products of two
// amounts can exceed u128, so `mul_div` widens to 256 bits before dividing.

use ethnum::U256;

use epochvault_core::error::VaultError;

/// Smallest units per whole token (10^18).
pub const UNIT: u128 = 1_000_000_000_000_000_000;

/// Denominator for every fee percentage. 1,000,000 = 100%.
pub const FEE_DENOMINATOR: u128 = 1_000_000;

/// Upper bound for any configured fee: 10%.
pub const FEE_MAX: u32 = 100_000;

/// `a * b / denominator`, rounded down, with a 256-bit intermediate.
///
/// # Errors
/// `Overflow` if `denominator` is zero or the quotient does not fit in u128.
pub fn mul_div(a: u128, b: u128, denominator: u128) -> Result<u128, VaultError> {
    if denominator == 0 {
        return Err(VaultError::Overflow("mul_div by zero"));
    }
    let quotient = U256::from(a) * U256::from(b) / U256::from(denominator);
    if quotient > U256::from(u128::MAX) {
        return Err(VaultError::Overflow("mul_div result"));
    }
    Ok(quotient.as_u128())
}

/// Split `amount` into `(fee, post_fee)` at `fee_percent` parts per million.
pub fn apply_fee(amount: u128, fee_percent: u32) -> Result<(u128, u128), VaultError> {
    let fee = mul_div(amount, u128::from(fee_percent), FEE_DENOMINATOR)?;
    let post_fee = amount
        .checked_sub(fee)
        .ok_or(VaultError::Underflow("post-fee amount"))?;
    Ok((fee, post_fee))
}

/// Render an amount as a decimal token quantity, trimming trailing zeros.
pub fn format_units(amount: u128) -> String {
    let whole = amount / UNIT;
    let frac = amount % UNIT;
    if frac == 0 {
        format!("{}", whole)
    } else {
        let frac_str = format!("{:018}", frac);
        format!("{}.{}", whole, frac_str.trim_end_matches('0'))
    }
}

/// Parse a decimal token quantity such as `"1.5"` into smallest units.
///
/// # Errors
/// `InvalidConfig` for malformed input or more than 18 decimal places, and
/// `Overflow` if the amount does not fit in u128.
pub fn parse_units(s: &str) -> Result<u128, VaultError> {
    let invalid = || VaultError::InvalidConfig(format!("invalid token amount: {:?}", s));
    let (whole, frac) = match s.trim().split_once('.') {
        Some((whole, frac)) => (whole, frac),
        None => (s.trim(), ""),
    };
    if whole.is_empty() && frac.is_empty() {
        return Err(invalid());
    }
    if frac.len() > 18 || !whole.chars().chain(frac.chars()).all(|c| c.is_ascii_digit()) {
        return Err(invalid());
    }
    let whole: u128 = if whole.is_empty() {
        0
    } else {
        whole.parse().map_err(|_| invalid())?
    };
    let frac: u128 = if frac.is_empty() {
        0
    } else {
        format!("{:0<18}", frac).parse().map_err(|_| invalid())?
    };
    whole
        .checked_mul(UNIT)
        .and_then(|w| w.checked_add(frac))
        .ok_or(VaultError::Overflow("token amount"))
}

/// Render a parts-per-million fee as a percentage, e.g. `30000` -> `3%`.
pub fn format_percent(fee_percent: u32) -> String {
    let whole = fee_percent / 10_000;
    let frac = fee_percent % 10_000;
    if frac == 0 {
        format!("{}%", whole)
    } else {
        let frac_str = format!("{:04}", frac);
        format!("{}.{}%", whole, frac_str.trim_end_matches('0'))
    }
}
