//! Text formatting of scalar leaves and the type inference applied on decode.
//!
//! Inference order is fixed: date-time, number, boolean, empty, string.
//! Callers that need literal text back must not rely on a round trip.

use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};

use crate::value::Value;

/// Length of the `YYYY-MM-DDTHH:MM:SS` prefix that marks a date-time.
const DATE_TIME_PREFIX_LEN: usize = 19;

/// Infer a structured value from a transport text leaf.
pub fn infer_value(text: &str) -> Value {
    if let Some(date) = parse_date_time(text) {
        return Value::Date(date);
    }
    if !text.is_empty() {
        if let Some(number) = parse_number(text) {
            return Value::Number(number);
        }
    }
    match text {
        "true" => Value::Bool(true),
        "false" => Value::Bool(false),
        "" => Value::Null,
        _ => Value::String(text.to_string()),
    }
}

/// Format a date as ISO-8601 with millisecond precision in UTC.
pub fn format_date(date: &DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Format a number the way a JavaScript runtime prints it.
pub fn format_number(n: f64) -> String {
    if n.is_nan() {
        return "NaN".to_string();
    }
    if n.is_infinite() {
        return if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    if n == 0.0 {
        return "0".to_string();
    }
    let magnitude = n.abs();
    if !(1e-6..1e21).contains(&magnitude) {
        let exp = format!("{n:e}");
        return match exp.split_once('e') {
            Some((mantissa, power)) if !power.starts_with('-') => format!("{mantissa}e+{power}"),
            _ => exp,
        };
    }
    format!("{n}")
}

/// Returns true when `text` starts with `YYYY-MM-DDTHH:MM:SS`.
pub fn looks_like_date_time(text: &str) -> bool {
    let bytes = text.as_bytes();
    if bytes.len() < DATE_TIME_PREFIX_LEN {
        return false;
    }
    bytes[..DATE_TIME_PREFIX_LEN]
        .iter()
        .enumerate()
        .all(|(i, b)| match i {
            4 | 7 => *b == b'-',
            10 => *b == b'T',
            13 | 16 => *b == b':',
            _ => b.is_ascii_digit(),
        })
}

/// Parse an ISO-8601 date-time. Values without an offset are read as UTC.
pub fn parse_date_time(text: &str) -> Option<DateTime<Utc>> {
    if !looks_like_date_time(text) {
        return None;
    }
    if let Ok(date) = DateTime::parse_from_rfc3339(text) {
        return Some(date.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}

/// Parse numeric text with JavaScript `Number()` semantics.
///
/// Accepts surrounding whitespace, signed decimals with optional exponent,
/// `0x`/`0o`/`0b` integers and `Infinity`. Whitespace-only text is zero.
pub fn parse_number(text: &str) -> Option<f64> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Some(0.0);
    }

    match trimmed {
        "Infinity" | "+Infinity" => return Some(f64::INFINITY),
        "-Infinity" => return Some(f64::NEG_INFINITY),
        _ => {}
    }

    if let Some(number) = parse_radix_integer(trimmed) {
        return Some(number);
    }

    let is_decimal_literal = trimmed
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | '.' | 'e' | 'E'));
    if !is_decimal_literal {
        return None;
    }
    trimmed.parse::<f64>().ok()
}

fn parse_radix_integer(text: &str) -> Option<f64> {
    let (radix, digits) = match text.get(..2)? {
        "0x" | "0X" => (16, &text[2..]),
        "0o" | "0O" => (8, &text[2..]),
        "0b" | "0B" => (2, &text[2..]),
        _ => return None,
    };
    if digits.is_empty() || digits.starts_with(['+', '-']) {
        return None;
    }
    u128::from_str_radix(digits, radix).ok().map(|n| n as f64)
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn infers_in_priority_order() {
        assert_eq!(infer_value("30"), Value::Number(30.0));
        assert_eq!(infer_value("-1.5e3"), Value::Number(-1500.0));
        assert_eq!(infer_value("true"), Value::Bool(true));
        assert_eq!(infer_value("false"), Value::Bool(false));
        assert_eq!(infer_value(""), Value::Null);
        assert_eq!(infer_value("John"), Value::String("John".to_string()));
        assert_eq!(infer_value("TRUE"), Value::String("TRUE".to_string()));
    }

    #[test]
    fn infers_iso_date_time() {
        let expected = Utc.with_ymd_and_hms(2023, 12, 1, 10, 30, 0).unwrap();
        assert_eq!(infer_value("2023-12-01T10:30:00.000Z"), Value::Date(expected));
        assert_eq!(infer_value("2023-12-01T10:30:00"), Value::Date(expected));
        assert_eq!(infer_value("2023-12-01T11:30:00+01:00"), Value::Date(expected));
    }

    #[test]
    fn invalid_date_time_stays_text() {
        assert_eq!(
            infer_value("2023-13-45T99:99:99Z"),
            Value::String("2023-13-45T99:99:99Z".to_string())
        );
        assert_eq!(
            infer_value("2023-12-01"),
            Value::String("2023-12-01".to_string())
        );
    }

    #[test]
    fn number_parsing_follows_js_rules() {
        assert_eq!(parse_number(" 42 "), Some(42.0));
        assert_eq!(parse_number("0x1F"), Some(31.0));
        assert_eq!(parse_number("0b101"), Some(5.0));
        assert_eq!(parse_number(".5"), Some(0.5));
        assert_eq!(parse_number("-Infinity"), Some(f64::NEG_INFINITY));
        assert_eq!(parse_number("   "), Some(0.0));
        assert_eq!(parse_number("NaN"), None);
        assert_eq!(parse_number("inf"), None);
        assert_eq!(parse_number("-0x10"), None);
        assert_eq!(parse_number("1_000"), None);
        assert_eq!(parse_number("12px"), None);
    }

    #[test]
    fn formats_numbers_like_js() {
        assert_eq!(format_number(30.0), "30");
        assert_eq!(format_number(-0.0), "0");
        assert_eq!(format_number(1.25), "1.25");
        assert_eq!(format_number(1e21), "1e+21");
        assert_eq!(format_number(1.5e-7), "1.5e-7");
        assert_eq!(format_number(f64::NAN), "NaN");
        assert_eq!(format_number(f64::INFINITY), "Infinity");
    }

    #[test]
    fn formats_dates_with_millis() {
        let date = Utc.with_ymd_and_hms(2023, 12, 1, 10, 30, 0).unwrap();
        assert_eq!(format_date(&date), "2023-12-01T10:30:00.000Z");
    }
}
