//! Decorated value parsing
//!
//! Mobile Alerts renders readings as a number followed by a unit with no
//! fixed delimiter: `"12.3 C"`, `"55%"`, `"1013.2 hPa"`, `"0,8 mm"`. A
//! decorated value is
//!
//! ```text
//! <ws>* <number> <suffix>
//! ```
//!
//! where `<number>` is `[-+]?digits([.,]digits)?` with ASCII digits and
//! `<suffix>` is everything after it. The unit is the trimmed suffix. The suffix length in
//! characters is what gets stripped from every other cell of the same column,
//! so it must be measured exactly, whitespace included.

use regex::Regex;
use std::sync::OnceLock;

use crate::error::{HistoryError, HistoryResult};

static DECORATED_VALUE: OnceLock<Regex> = OnceLock::new();

fn decorated_value_regex() -> &'static Regex {
    DECORATED_VALUE.get_or_init(|| {
        Regex::new(r"^\s*([-+]?[0-9]+(?:[.,][0-9]+)?)").expect("decorated value regex is valid")
    })
}

/// A reading split into its numeric part and unit
#[derive(Debug, Clone, PartialEq)]
pub struct DecoratedValue {
    pub value: f64,
    pub unit: String,
    /// Number of characters following the number
    pub suffix_len: usize,
}

/// Split a decorated string into value, unit and suffix length
pub fn parse_decorated(text: &str) -> HistoryResult<DecoratedValue> {
    let captures = decorated_value_regex()
        .captures(text)
        .ok_or_else(|| invalid(text, "no leading number"))?;
    // Group 1 always participates when the regex matches
    let number = captures
        .get(1)
        .ok_or_else(|| invalid(text, "no leading number"))?;

    let suffix = &text[number.end()..];
    if starts_with_grouped_digits(suffix) {
        return Err(invalid(text, "digit grouping is not supported"));
    }

    Ok(DecoratedValue {
        value: parse_number(number.as_str())?,
        unit: suffix.trim().to_string(),
        suffix_len: suffix.chars().count(),
    })
}

/// `"1.013,2 hPa"` stops the number at `1.013`, leaving `,2 hPa`
fn starts_with_grouped_digits(suffix: &str) -> bool {
    let mut chars = suffix.chars();
    matches!(
        (chars.next(), chars.next()),
        (Some('.' | ','), Some(c)) if c.is_ascii_digit()
    )
}

/// Value and unit of a decorated string, e.g. `"12.3 C"` -> `(12.3, "C")`
pub fn extract_value_unit(text: &str) -> HistoryResult<(f64, String)> {
    let parsed = parse_decorated(text)?;
    Ok((parsed.value, parsed.unit))
}

/// Number of trailing characters that hold the unit and its decoration
pub fn unit_suffix_len(text: &str) -> HistoryResult<usize> {
    parse_decorated(text).map(|parsed| parsed.suffix_len)
}

/// Drop the last `n` characters of `text`
///
/// Returns the whole string for `n == 0` and an empty string when `text` is
/// shorter than `n`.
pub fn strip_suffix_chars(text: &str, n: usize) -> &str {
    if n == 0 {
        return text;
    }
    match text.char_indices().rev().nth(n - 1) {
        Some((idx, _)) => &text[..idx],
        None => "",
    }
}

/// Parse a number that may use a decimal comma
pub fn parse_number(text: &str) -> HistoryResult<f64> {
    let trimmed = text.trim();
    trimmed
        .replace(',', ".")
        .parse::<f64>()
        .map_err(|e| invalid(trimmed, &e.to_string()))
}

fn invalid(text: &str, reason: &str) -> HistoryError {
    HistoryError::InvalidReading {
        text: text.to_string(),
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_common_readings() {
        assert_eq!(
            parse_decorated("12.3 C").unwrap(),
            DecoratedValue {
                value: 12.3,
                unit: "C".to_string(),
                suffix_len: 2,
            }
        );
        assert_eq!(extract_value_unit("55%").unwrap(), (55.0, "%".to_string()));
        assert_eq!(
            extract_value_unit("1013.2 hPa").unwrap(),
            (1013.2, "hPa".to_string())
        );
        assert_eq!(
            extract_value_unit("-4,5°C").unwrap(),
            (-4.5, "°C".to_string())
        );
    }

    #[test]
    fn test_suffix_len_counts_characters() {
        // '°' is two bytes but one character
        assert_eq!(unit_suffix_len("21.7°C").unwrap(), 2);
        assert_eq!(unit_suffix_len("0.0 mm").unwrap(), 3);
        assert_eq!(unit_suffix_len("3.6 m/s").unwrap(), 4);
    }

    #[test]
    fn test_no_unit() {
        let parsed = parse_decorated("42").unwrap();
        assert_eq!(parsed.value, 42.0);
        assert_eq!(parsed.unit, "");
        assert_eq!(parsed.suffix_len, 0);
    }

    #[test]
    fn test_not_a_number() {
        assert!(matches!(
            parse_decorated("---"),
            Err(HistoryError::InvalidReading { .. })
        ));
        assert!(matches!(
            parse_decorated(""),
            Err(HistoryError::InvalidReading { .. })
        ));
    }

    #[test]
    fn test_grouped_and_non_ascii_digits_rejected() {
        match parse_decorated("1.013,2 hPa") {
            Err(HistoryError::InvalidReading { text, reason }) => {
                assert_eq!(text, "1.013,2 hPa");
                assert_eq!(reason, "digit grouping is not supported");
            }
            other => panic!("unexpected result {:?}", other),
        }
        assert!(parse_decorated("1,013.2 hPa").is_err());

        // Arabic-Indic digits are not readings
        match parse_decorated("\u{0661}\u{0662} C") {
            Err(HistoryError::InvalidReading { reason, .. }) => {
                assert_eq!(reason, "no leading number")
            }
            other => panic!("unexpected result {:?}", other),
        }

        // A trailing separator without digits stays part of the unit
        assert_eq!(
            extract_value_unit("12.5. mm").unwrap(),
            (12.5, ". mm".to_string())
        );
    }

    #[test]
    fn test_strip_suffix_chars() {
        assert_eq!(strip_suffix_chars("21.7°C", 2), "21.7");
        assert_eq!(strip_suffix_chars("12.3 C", 2), "12.3");
        assert_eq!(strip_suffix_chars("12.3", 0), "12.3");
        assert_eq!(strip_suffix_chars("C", 2), "");
    }

    #[test]
    fn test_parse_number() {
        assert_eq!(parse_number(" 1,5 ").unwrap(), 1.5);
        assert!(parse_number("1.2.3").is_err());
    }
}
