//! Parsing and formatting of monetary amounts and dates for quotes.
//!
//! Prices are stored as integer cents. The form accepts Brazilian locale
//! input such as "2.850,00" and every write path goes through the single
//! [parse_money_to_cents] function so the same string always normalizes to
//! the same amount.

use time::{OffsetDateTime, UtcOffset, macros::format_description};

use crate::Error;

/// Parse a labor price from form input into integer cents.
///
/// Accepts plain digits ("2850"), a comma decimal separator ("2850,00"), and
/// a dot thousands separator ("2.850,00"). Whitespace-only input means no
/// price was given and yields `None`.
///
/// # Errors
/// Returns an [Error::InvalidPrice] if the input does not normalize to a
/// finite, non-negative number.
pub fn parse_money_to_cents(raw: &str) -> Result<Option<i64>, Error> {
    let trimmed = raw.trim();

    if trimmed.is_empty() {
        return Ok(None);
    }

    let normalized = trimmed.replace('.', "").replace(',', ".");
    let value: f64 = normalized
        .parse()
        .map_err(|_| Error::InvalidPrice(trimmed.to_owned()))?;

    if !value.is_finite() || value < 0.0 {
        return Err(Error::InvalidPrice(trimmed.to_owned()));
    }

    Ok(Some((value * 100.0).round() as i64))
}

/// Format integer cents as a Brazilian currency string, e.g. "R$ 2.850,00".
///
/// `None` falls back to zero rather than failing, since quotes without a
/// price still need to render.
pub fn format_brl_from_cents(cents: Option<i64>) -> String {
    let cents = cents.unwrap_or(0);
    let sign = if cents < 0 { "-" } else { "" };
    let cents = cents.unsigned_abs();

    let whole = group_thousands(cents / 100);
    let fraction = cents % 100;

    format!("R$ {sign}{whole},{fraction:02}")
}

/// Insert a dot between every group of three digits, e.g. 1234567 becomes
/// "1.234.567".
fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);

    for (position, digit) in digits.chars().enumerate() {
        if position > 0 && (digits.len() - position) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(digit);
    }

    grouped
}

/// Format a timestamp as a Brazilian "dd/mm/yyyy" date in the given timezone
/// offset, falling back to "-" if formatting fails.
pub fn format_date(datetime: OffsetDateTime, local_offset: UtcOffset) -> String {
    let format = format_description!("[day]/[month]/[year]");

    datetime
        .to_offset(local_offset)
        .format(&format)
        .unwrap_or_else(|_| "-".to_owned())
}

#[cfg(test)]
mod parse_money_tests {
    use crate::Error;

    use super::parse_money_to_cents;

    #[test]
    fn parses_plain_digits() {
        assert_eq!(parse_money_to_cents("2850"), Ok(Some(285_000)));
    }

    #[test]
    fn parses_comma_decimal() {
        assert_eq!(parse_money_to_cents("2850,00"), Ok(Some(285_000)));
        assert_eq!(parse_money_to_cents("12,5"), Ok(Some(1_250)));
    }

    #[test]
    fn parses_dot_thousands_separator() {
        assert_eq!(parse_money_to_cents("2.850,00"), Ok(Some(285_000)));
        assert_eq!(parse_money_to_cents("1.234.567,89"), Ok(Some(123_456_789)));
    }

    #[test]
    fn rounds_to_nearest_cent() {
        assert_eq!(parse_money_to_cents("0,005"), Ok(Some(1)));
    }

    #[test]
    fn empty_input_means_no_price() {
        assert_eq!(parse_money_to_cents(""), Ok(None));
        assert_eq!(parse_money_to_cents("   "), Ok(None));
    }

    #[test]
    fn rejects_non_numeric_input() {
        assert_eq!(
            parse_money_to_cents("abc"),
            Err(Error::InvalidPrice("abc".to_owned()))
        );
    }

    #[test]
    fn rejects_negative_amounts() {
        assert_eq!(
            parse_money_to_cents("-10,00"),
            Err(Error::InvalidPrice("-10,00".to_owned()))
        );
    }
}

#[cfg(test)]
mod format_tests {
    use time::{UtcOffset, macros::datetime};

    use super::{format_brl_from_cents, format_date};

    #[test]
    fn formats_cents_as_brl() {
        assert_eq!(format_brl_from_cents(Some(285_000)), "R$ 2.850,00");
        assert_eq!(format_brl_from_cents(Some(1_250)), "R$ 12,50");
        assert_eq!(format_brl_from_cents(Some(5)), "R$ 0,05");
        assert_eq!(format_brl_from_cents(Some(123_456_789)), "R$ 1.234.567,89");
    }

    #[test]
    fn missing_price_falls_back_to_zero() {
        assert_eq!(format_brl_from_cents(None), "R$ 0,00");
    }

    #[test]
    fn formats_date_in_local_offset() {
        // 01:30 UTC is still the previous day in São Paulo (UTC-3).
        let datetime = datetime!(2025-06-02 01:30 UTC);
        let sao_paulo = UtcOffset::from_hms(-3, 0, 0).unwrap();

        assert_eq!(format_date(datetime, sao_paulo), "01/06/2025");
        assert_eq!(format_date(datetime, UtcOffset::UTC), "02/06/2025");
    }
}
