// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// AMOUNT CONVERTER
//
// Human amount ("12.5") <-> origin amount (12.5 × 10^decimals as a Nat).
// Works on the decimal digits directly, so precision is unbounded and
// any `decimals` up to 255 is exact. Surplus fractional digits are
// truncated, never rounded.
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

use crate::{AmountFault, DftError};
use candid::Nat;
use num_bigint::BigUint;
use num_traits::Zero;

/// On-chain integer representation of a token quantity (smallest unit).
pub type OriginAmount = Nat;

/// Scales a human amount into origin units.
///
/// The plan builder takes this as a parameter instead of calling
/// [`to_origin`] directly so callers can substitute their own scaling.
pub trait OriginScaler {
    fn to_origin(&self, human: &str, decimals: u8) -> Result<OriginAmount, DftError>;
}

/// The standard decimal converter backed by [`to_origin`].
#[derive(Debug, Clone, Copy, Default)]
pub struct DecimalConverter;

impl OriginScaler for DecimalConverter {
    fn to_origin(&self, human: &str, decimals: u8) -> Result<OriginAmount, DftError> {
        to_origin(human, decimals)
    }
}

/// A validated numeral split at the decimal point.
struct Numeral<'a> {
    integer: &'a str,
    fraction: &'a str,
}

impl Numeral<'_> {
    fn is_zero(&self) -> bool {
        self.integer
            .bytes()
            .chain(self.fraction.bytes())
            .all(|b| b == b'0')
    }
}

fn invalid(input: &str, reason: AmountFault) -> DftError {
    DftError::InvalidAmount {
        input: input.to_string(),
        reason,
    }
}

/// Accepts `123`, `123.45`, `.45` and `123.` with optional surrounding
/// whitespace. No sign, exponent or digit separators.
fn parse_numeral(raw: &str) -> Result<Numeral<'_>, DftError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(invalid(raw, AmountFault::Empty));
    }
    if trimmed.starts_with('-') {
        return Err(invalid(raw, AmountFault::Negative));
    }

    let (integer, fraction) = match trimmed.split_once('.') {
        Some((integer, fraction)) => (integer, fraction),
        None => (trimmed, ""),
    };

    let all_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
    if !all_digits(integer) || !all_digits(fraction) || integer.len() + fraction.len() == 0 {
        return Err(invalid(raw, AmountFault::NotDecimal));
    }

    Ok(Numeral { integer, fraction })
}

/// `10^exp` as a big integer.
pub fn pow10(exp: u8) -> BigUint {
    BigUint::from(10u32).pow(u32::from(exp))
}

/// Convert a human amount into origin units: `floor(human × 10^decimals)`.
pub fn to_origin(human: &str, decimals: u8) -> Result<OriginAmount, DftError> {
    let numeral = parse_numeral(human)?;
    let scale = usize::from(decimals);

    let kept = &numeral.fraction[..numeral.fraction.len().min(scale)];
    let mut digits = String::with_capacity(numeral.integer.len() + scale);
    digits.push_str(numeral.integer);
    digits.push_str(kept);
    digits.extend(std::iter::repeat('0').take(scale - kept.len()));

    if digits.is_empty() {
        // ".5" at zero decimals
        return Ok(Nat::from(0u32));
    }

    BigUint::parse_bytes(digits.as_bytes(), 10)
        .map(Nat::from)
        .ok_or_else(|| invalid(human, AmountFault::NotDecimal))
}

/// Convert origin units back into the canonical human form.
///
/// Canonical form: no leading zeros in the integer part, no trailing zeros
/// in the fraction, and no decimal point when the fraction is zero.
pub fn to_human(origin: &OriginAmount, decimals: u8) -> String {
    let digits = origin.0.to_str_radix(10);
    let scale = usize::from(decimals);
    if scale == 0 {
        return digits;
    }

    let (integer, fraction) = if digits.len() > scale {
        let (i, f) = digits.split_at(digits.len() - scale);
        (i.to_string(), f.to_string())
    } else {
        ("0".to_string(), format!("{:0>width$}", digits, width = scale))
    };

    let fraction = fraction.trim_end_matches('0');
    if fraction.is_empty() {
        integer
    } else {
        format!("{}.{}", integer, fraction)
    }
}

/// True when `raw` is a well-formed numeral equal to zero ("0", "0.00", "000").
pub fn is_zero_numeral(raw: &str) -> bool {
    parse_numeral(raw).map(|n| n.is_zero()).unwrap_or(false)
}

/// Narrow an origin amount for callers that need a fixed-width value.
pub fn origin_to_u128(origin: &OriginAmount) -> Result<u128, DftError> {
    u128::try_from(&origin.0)
        .map_err(|_| invalid(&origin.0.to_str_radix(10), AmountFault::Overflow))
}

/// True when the origin amount is zero.
pub fn is_zero(origin: &OriginAmount) -> bool {
    origin.0.is_zero()
}

// ─────────────────────────────────────────────────────────────────
// TESTS
// ─────────────────────────────────────────────────────────────────
