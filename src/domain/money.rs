use thiserror::Error;

/// Amounts and balances are integer cents, so 40.00 is stored as 4000.
pub type Cents = i64;

/// Format cents as a decimal string with two fraction digits.
/// Example: 4000 -> "40.00", -5 -> "-0.05"
///
/// Also takes `i128` so ledger-wide totals can be shown.
pub fn format_cents(cents: impl Into<i128>) -> String {
    let cents: i128 = cents.into();
    let sign = if cents < 0 { "-" } else { "" };
    let abs = cents.unsigned_abs();
    format!("{}{}.{:02}", sign, abs / 100, abs % 100)
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseCentsError {
    #[error("amount is empty")]
    Empty,
    #[error("'{0}' is not a valid amount, use a format like 50 or 50.25")]
    InvalidFormat(String),
    #[error("'{0}' has more than two decimal places")]
    TooPrecise(String),
    #[error("'{0}' is too large")]
    Overflow(String),
}

/// Parse a user-entered decimal string into cents.
///
/// Accepts `100`, `100.5`, `100.50`, `.5` and a leading sign. Input is
/// trimmed first. Sign is preserved so the caller decides whether a negative
/// amount is acceptable.
pub fn parse_cents(input: &str) -> Result<Cents, ParseCentsError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(ParseCentsError::Empty);
    }

    let (negative, digits) = match trimmed.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, trimmed.strip_prefix('+').unwrap_or(trimmed)),
    };

    let invalid = || ParseCentsError::InvalidFormat(trimmed.to_string());
    let overflow = || ParseCentsError::Overflow(trimmed.to_string());

    let (units_str, fraction_str) = match digits.split_once('.') {
        Some((units, fraction)) => (units, fraction),
        None => (digits, ""),
    };
    if units_str.is_empty() && fraction_str.is_empty() {
        return Err(invalid());
    }
    let all_digits = |s: &str| s.chars().all(|c| c.is_ascii_digit());
    if !all_digits(units_str) || !all_digits(fraction_str) {
        return Err(invalid());
    }
    if fraction_str.len() > 2 {
        return Err(ParseCentsError::TooPrecise(trimmed.to_string()));
    }

    let units: Cents = if units_str.is_empty() {
        0
    } else {
        units_str.parse().map_err(|_| overflow())?
    };
    let fraction: Cents = match fraction_str.len() {
        0 => 0,
        1 => fraction_str.parse::<Cents>().map_err(|_| invalid())? * 10,
        _ => fraction_str.parse().map_err(|_| invalid())?,
    };

    let cents = units
        .checked_mul(100)
        .and_then(|c| c.checked_add(fraction))
        .ok_or_else(overflow)?;
    Ok(if negative { -cents } else { cents })
}
