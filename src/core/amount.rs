//! Currency amounts
//!
//! Balances are stored as integer lamports; operators read and type SOL.

use thiserror::Error;

/// Lamports in one SOL
pub const LAMPORTS_PER_SOL: u64 = 1_000_000_000;

/// Decimal places in a SOL amount
pub const SOL_DECIMALS: usize = 9;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum AmountError {
    #[error("Invalid amount: {0:?}")]
    Invalid(String),
    #[error("Amount {0:?} has more than {} decimal places", SOL_DECIMALS)]
    TooPrecise(String),
    #[error("Amount {0:?} is too large")]
    Overflow(String),
    #[error("Amount must be greater than zero")]
    Zero,
}

/// Parse a SOL amount such as `"1"`, `"0.5"` or `".25"` into lamports.
///
/// Parsing is exact; amounts finer than one lamport are rejected instead of
/// being rounded.
pub fn sol_to_lamports(input: &str) -> Result<u64, AmountError> {
    let s = input.trim();
    let (whole, frac) = match s.split_once('.') {
        Some((w, f)) => (w, f),
        None => (s, ""),
    };

    let is_digits = |part: &str| part.bytes().all(|b| b.is_ascii_digit());
    if (whole.is_empty() && frac.is_empty()) || !is_digits(whole) || !is_digits(frac) {
        return Err(AmountError::Invalid(input.to_string()));
    }
    if frac.len() > SOL_DECIMALS {
        return Err(AmountError::TooPrecise(input.to_string()));
    }

    let whole: u64 = if whole.is_empty() {
        0
    } else {
        whole
            .parse()
            .map_err(|_| AmountError::Overflow(input.to_string()))?
    };
    let frac: u64 = if frac.is_empty() {
        0
    } else {
        format!("{:0<width$}", frac, width = SOL_DECIMALS)
            .parse()
            .map_err(|_| AmountError::Invalid(input.to_string()))?
    };

    whole
        .checked_mul(LAMPORTS_PER_SOL)
        .and_then(|l| l.checked_add(frac))
        .ok_or_else(|| AmountError::Overflow(input.to_string()))
}

/// Like [`sol_to_lamports`], but zero is an error
pub fn sol_to_nonzero_lamports(input: &str) -> Result<u64, AmountError> {
    match sol_to_lamports(input)? {
        0 => Err(AmountError::Zero),
        lamports => Ok(lamports),
    }
}

/// Format lamports as an exact SOL string with trailing zeros trimmed
pub fn format_sol(lamports: u64) -> String {
    let whole = lamports / LAMPORTS_PER_SOL;
    let frac = lamports % LAMPORTS_PER_SOL;
    if frac == 0 {
        return whole.to_string();
    }
    let frac = format!("{:0>width$}", frac, width = SOL_DECIMALS);
    format!("{}.{}", whole, frac.trim_end_matches('0'))
}
