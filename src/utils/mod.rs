//! Project-specific utilities live here.

/// Formats a shared log prefix for project logs.
pub fn log_prefix(module: &str) -> String {
    format!("library::{module}")
}

/// Convert a raw path segment to an integer the way a numeric cast would.
///
/// Surrounding whitespace is ignored and an empty segment reads as zero.
/// Decimal, exponent and `0x`/`0o`/`0b` forms are accepted. Returns `None`
/// for anything that is not a finite whole number.
pub fn parse_numeric_id(raw: &str) -> Option<i64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Some(0);
    }

    for (prefix, radix) in [("0x", 16), ("0o", 8), ("0b", 2)] {
        if let Some(digits) = strip_prefix_ignore_case(trimmed, prefix) {
            if digits.is_empty() || digits.starts_with(['+', '-']) {
                return None;
            }
            return i64::from_str_radix(digits, radix).ok();
        }
    }

    // `f64::from_str` also knows "inf" and "NaN"; neither is a whole number.
    let value: f64 = trimmed.parse().ok()?;
    if !value.is_finite() || value.fract() != 0.0 {
        return None;
    }
    if value < i64::MIN as f64 || value >= i64::MAX as f64 {
        return None;
    }
    Some(value as i64)
}

fn strip_prefix_ignore_case<'a>(value: &'a str, prefix: &str) -> Option<&'a str> {
    let head = value.get(..prefix.len())?;
    if head.eq_ignore_ascii_case(prefix) {
        Some(&value[prefix.len()..])
    } else {
        None
    }
}
