use std::str::FromStr;

use rust_decimal::Decimal;

// These were deprecated as methods on Decimal, so re-implement them.
// Those implementations don't actually do zero checks, and can result
// in weird behaviour.
pub fn is_positive(d: &Decimal) -> bool {
    d.is_sign_positive() && !d.is_zero()
}

pub fn is_negative(d: &Decimal) -> bool {
    d.is_sign_negative() && !d.is_zero()
}

/// Parses decimals as they are printed on statements. These may contain
/// thousands separators ("1,234.5"), and negatives may be printed in
/// parentheses ("(1,234.5)") or with a leading minus.
pub fn parse_large_decimal(s: &str) -> Result<Decimal, rust_decimal::Error> {
    let trimmed = s.trim();
    let (negate, body) = match trimmed
        .strip_prefix('(')
        .and_then(|t| t.strip_suffix(')'))
    {
        Some(inner) => (true, inner.trim()),
        None => (false, trimmed),
    };
    let cleaned = body.replace(',', "");
    let d = Decimal::from_str_exact(&cleaned)
        .or_else(|_| Decimal::from_str(&cleaned))?;
    Ok(if negate { -d } else { d })
}
