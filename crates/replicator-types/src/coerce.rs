//! Value coercion: raw textual JSON value → SQL literal text.
//!
//! Message payloads carry untyped values. [`ValueCoercer::detect`] infers
//! the semantic type of each value by trying, in order:
//!
//! 1. timestamp (RFC 3339 with zone, or `YYYY-MM-DDTHH:MM:SS`)
//! 2. unsigned integer
//! 3. signed integer
//! 4. float (single precision first, double when single would lose digits)
//! 5. boolean token
//! 6. raw text
//!
//! The first match wins. Timestamps are digit-heavy and must be tried
//! before numbers; boolean tokens such as `1` and `0` overlap integers and
//! must not preempt them.
//!
//! The rendered text is unquoted; see [`crate::literal::quote_literal`].

use chrono::{DateTime, NaiveDateTime};
use std::fmt;

/// Fraction digits rendered for floats whose text has no decimal sign.
pub const DEFAULT_FLOAT_PRECISION: usize = 2;

/// Enough fraction digits for the smallest subnormal `f64`.
const MAX_FLOAT_PRECISION: usize = 1100;

/// Output format for timestamps. Fractional seconds and zone are dropped.
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Zone-less timestamp encoding accepted in addition to RFC 3339.
const NAIVE_TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

const TRUE_TOKENS: [&str; 6] = ["true", "on", "yes", "1", "-1", "t"];
const FALSE_TOKENS: [&str; 5] = ["false", "off", "no", "0", "f"];

/// Precision a float was rendered with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FloatWidth {
    Single,
    Double,
}

/// A raw value after type inference.
#[derive(Debug, Clone, PartialEq)]
pub enum Coerced {
    Timestamp(NaiveDateTime),
    /// Canonical digits, any magnitude.
    UnsignedInteger(String),
    /// Canonical digits with a leading `-` when negative.
    SignedInteger(String),
    Float {
        value: f64,
        /// Digits rendered after the decimal point.
        precision: usize,
        width: FloatWidth,
    },
    Boolean(bool),
    Raw(String),
}

impl Coerced {
    /// Short name of the inferred type, used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Coerced::Timestamp(_) => "timestamp",
            Coerced::UnsignedInteger(_) => "unsigned_integer",
            Coerced::SignedInteger(_) => "signed_integer",
            Coerced::Float { .. } => "float",
            Coerced::Boolean(_) => "boolean",
            Coerced::Raw(_) => "raw",
        }
    }
}

impl fmt::Display for Coerced {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Coerced::Timestamp(ts) => write!(f, "{}", ts.format(TIMESTAMP_FORMAT)),
            Coerced::UnsignedInteger(digits) => f.write_str(digits),
            Coerced::SignedInteger(digits) => f.write_str(digits),
            Coerced::Float {
                value,
                precision,
                width: FloatWidth::Single,
            } => write!(f, "{:.*}", *precision, *value as f32),
            Coerced::Float {
                value,
                precision,
                width: FloatWidth::Double,
            } => write!(f, "{:.*}", *precision, value),
            Coerced::Boolean(b) => f.write_str(if *b { "1" } else { "0" }),
            Coerced::Raw(s) => f.write_str(s),
        }
    }
}

/// Infers value types and renders them as SQL literal text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValueCoercer {
    decimal_sign: char,
    digit_separator: Option<char>,
}

impl Default for ValueCoercer {
    fn default() -> Self {
        Self {
            decimal_sign: '.',
            digit_separator: Some(','),
        }
    }
}

impl ValueCoercer {
    /// Create a coercer for the given number formatting.
    ///
    /// A separator equal to the decimal sign is ignored.
    pub fn new(decimal_sign: char, digit_separator: Option<char>) -> Self {
        Self {
            decimal_sign,
            digit_separator: digit_separator.filter(|sep| *sep != decimal_sign),
        }
    }

    pub fn decimal_sign(&self) -> char {
        self.decimal_sign
    }

    /// Infer the type of `raw` and render it as unquoted literal text.
    pub fn coerce(&self, raw: &str) -> String {
        self.detect(raw).to_string()
    }

    /// Infer the type of `raw`. The first matching detector wins.
    pub fn detect(&self, raw: &str) -> Coerced {
        let text = raw.trim();

        if let Some(ts) = parse_timestamp(text) {
            return Coerced::Timestamp(ts);
        }
        if let Some(digits) = canonical_digits(text) {
            return Coerced::UnsignedInteger(digits);
        }
        if let Some(digits) = parse_signed(text) {
            return Coerced::SignedInteger(digits);
        }
        if let Some(float) = self.parse_float(text) {
            return float;
        }
        if let Some(b) = parse_boolean(text) {
            return Coerced::Boolean(b);
        }
        Coerced::Raw(text.to_string())
    }

    fn parse_float(&self, text: &str) -> Option<Coerced> {
        let normalized = self.normalize_number(text)?;
        let value: f64 = normalized.parse().ok()?;
        if !value.is_finite() {
            return None;
        }

        let precision = self.precision(text);
        let width = match normalized.parse::<f32>() {
            Ok(single)
                if single.is_finite()
                    && format!("{single:.precision$}") == format!("{value:.precision$}") =>
            {
                FloatWidth::Single
            }
            _ => FloatWidth::Double,
        };

        Some(Coerced::Float {
            value,
            precision,
            width,
        })
    }

    /// Fraction digits to render for `text`.
    ///
    /// Digits after the decimal sign, shifted by the exponent so `1.5e-3`
    /// keeps `0.0015`. Plain numbers without a decimal sign get
    /// [`DEFAULT_FLOAT_PRECISION`].
    fn precision(&self, text: &str) -> usize {
        let exponent = text
            .find(['e', 'E'])
            .and_then(|pos| text[pos + 1..].parse::<i64>().ok());
        let written = match (self.fraction_digits(text), exponent) {
            (Some(digits), _) => digits,
            (None, Some(_)) => 0,
            (None, None) => DEFAULT_FLOAT_PRECISION,
        };
        let shifted = (written as i64).saturating_sub(exponent.unwrap_or(0));
        usize::try_from(shifted.clamp(0, MAX_FLOAT_PRECISION as i64)).unwrap_or(0)
    }

    /// Number of digits following the decimal sign in the original text.
    fn fraction_digits(&self, text: &str) -> Option<usize> {
        let pos = text.find(self.decimal_sign)?;
        let fraction = &text[pos + self.decimal_sign.len_utf8()..];
        Some(fraction.chars().take_while(|c| c.is_ascii_digit()).count())
    }

    /// Rewrite a locale-formatted number into Rust float syntax.
    ///
    /// Returns `None` unless `text` is a plain decimal number, optionally
    /// signed, grouped with the digit separator and with an exponent.
    fn normalize_number(&self, text: &str) -> Option<String> {
        let (mantissa, exponent) = match text.find(['e', 'E']) {
            Some(pos) => (&text[..pos], &text[pos..]),
            None => (text, ""),
        };
        if !valid_exponent(exponent) {
            return None;
        }

        let (integer, fraction) = match mantissa.find(self.decimal_sign) {
            Some(pos) => (
                &mantissa[..pos],
                Some(&mantissa[pos + self.decimal_sign.len_utf8()..]),
            ),
            None => (mantissa, None),
        };

        let (negative, integer) = match integer.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, integer.strip_prefix('+').unwrap_or(integer)),
        };
        let integer = self.ungroup(integer)?;

        let fraction = fraction.unwrap_or("");
        if !fraction.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        if integer.is_empty() && fraction.is_empty() {
            return None;
        }

        let mut normalized = String::with_capacity(text.len() + 1);
        if negative {
            normalized.push('-');
        }
        normalized.push_str(if integer.is_empty() { "0" } else { &integer });
        if !fraction.is_empty() {
            normalized.push('.');
            normalized.push_str(fraction);
        }
        normalized.push_str(exponent);
        Some(normalized)
    }

    /// Strip digit separators from an integer part such as `1,234,567`.
    fn ungroup(&self, integer: &str) -> Option<String> {
        if integer.bytes().all(|b| b.is_ascii_digit()) {
            return Some(integer.to_string());
        }

        let sep = self.digit_separator?;
        let mut groups = integer.split(sep);
        let first = groups.next()?;
        if first.is_empty() || first.len() > 3 || !first.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }

        let mut digits = first.to_string();
        for group in groups {
            if group.len() != 3 || !group.bytes().all(|b| b.is_ascii_digit()) {
                return None;
            }
            digits.push_str(group);
        }
        Some(digits)
    }
}

fn parse_timestamp(text: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.naive_local());
    }
    NaiveDateTime::parse_from_str(text, NAIVE_TIMESTAMP_FORMAT).ok()
}

/// Digits of an all-digit `text` without leading zeros.
fn canonical_digits(text: &str) -> Option<String> {
    if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let digits = text.trim_start_matches('0');
    Some(if digits.is_empty() { "0" } else { digits }.to_string())
}

fn parse_signed(text: &str) -> Option<String> {
    let negative = text.starts_with('-');
    let digits = canonical_digits(text.strip_prefix(['-', '+'])?)?;
    if negative && digits != "0" {
        Some(format!("-{digits}"))
    } else {
        Some(digits)
    }
}

fn parse_boolean(text: &str) -> Option<bool> {
    let token = text.to_lowercase();
    if TRUE_TOKENS.contains(&token.as_str()) {
        Some(true)
    } else if FALSE_TOKENS.contains(&token.as_str()) {
        Some(false)
    } else {
        None
    }
}

fn valid_exponent(exponent: &str) -> bool {
    if exponent.is_empty() {
        return true;
    }
    let digits = &exponent[1..];
    let digits = digits.strip_prefix(['-', '+']).unwrap_or(digits);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}
