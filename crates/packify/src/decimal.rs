//! Arbitrary-precision decimal numbers carried as canonical strings.
//!
//! The codec never does arithmetic on decimals; it only needs a stable
//! textual form. Parsing accepts the usual literal syntax
//! (`-12.50`, `.5`, `1e-7`, `Infinity`, `NaN`) and renders it in
//! *to-scientific-string* form: the coefficient loses its leading zeros
//! but keeps trailing ones, and scientific notation is used when the
//! exponent is positive or the number is smaller than `1E-6`.

use std::fmt;
use std::str::FromStr;

use crate::error::DecimalError;

/// A decimal number in canonical string form.
///
/// Two decimals are equal when their canonical strings are equal, so
/// `1.0` and `1.00` are distinct values (they also encode differently).
/// The same holds inside a [`Value::Set`](crate::Value::Set) or as a
/// [`Value::Mapping`](crate::Value::Mapping) key: duplicates are detected by
/// canonical string, not by numeric value, so `0` and `-0` are both kept.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Decimal(String);

impl Decimal {
    pub fn parse(literal: &str) -> Result<Self, DecimalError> {
        canonicalize(literal)
            .map(Decimal)
            .ok_or_else(|| DecimalError(literal.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    pub fn is_nan(&self) -> bool {
        self.0.trim_start_matches('-').contains("NaN")
    }

    pub fn is_infinite(&self) -> bool {
        self.0.ends_with("Infinity")
    }
}

impl FromStr for Decimal {
    type Err = DecimalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Decimal::parse(s)
    }
}

impl fmt::Display for Decimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<i64> for Decimal {
    fn from(n: i64) -> Self {
        Decimal(n.to_string())
    }
}

impl From<u64> for Decimal {
    fn from(n: u64) -> Self {
        Decimal(n.to_string())
    }
}

fn canonicalize(literal: &str) -> Option<String> {
    let s = literal.trim();
    let (negative, body) = match s.as_bytes().first()? {
        b'-' => (true, &s[1..]),
        b'+' => (false, &s[1..]),
        _ => (false, s),
    };
    let sign = if negative { "-" } else { "" };

    let lower = body.to_ascii_lowercase();
    if lower == "inf" || lower == "infinity" {
        return Some(format!("{sign}Infinity"));
    }
    if let Some(payload) = lower.strip_prefix("snan") {
        return nan_payload(payload).map(|p| format!("{sign}sNaN{p}"));
    }
    if let Some(payload) = lower.strip_prefix("nan") {
        return nan_payload(payload).map(|p| format!("{sign}NaN{p}"));
    }

    let (mantissa, exponent) = match body.find(|c: char| c == 'e' || c == 'E') {
        Some(i) => (&body[..i], parse_exponent(&body[i + 1..])?),
        None => (body, 0),
    };
    let (int_part, frac_part) = match mantissa.find('.') {
        Some(i) => (&mantissa[..i], &mantissa[i + 1..]),
        None => (mantissa, ""),
    };
    if int_part.is_empty() && frac_part.is_empty() {
        return None;
    }
    if !int_part.bytes().chain(frac_part.bytes()).all(|b| b.is_ascii_digit()) {
        return None;
    }

    let exp = exponent.checked_sub(i64::try_from(frac_part.len()).ok()?)?;
    let all_digits = format!("{int_part}{frac_part}");
    let digits = match all_digits.trim_start_matches('0') {
        "" => "0",
        rest => rest,
    };
    Some(format!("{sign}{}", to_sci_string(digits, exp)?))
}

fn nan_payload(payload: &str) -> Option<&str> {
    if !payload.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some(payload.trim_start_matches('0'))
}

fn parse_exponent(s: &str) -> Option<i64> {
    let digits = s
        .strip_prefix('+')
        .or_else(|| s.strip_prefix('-'))
        .unwrap_or(s);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

fn to_sci_string(digits: &str, exp: i64) -> Option<String> {
    let len = i64::try_from(digits.len()).ok()?;
    let left_digits = exp.checked_add(len)?;
    let dot_place = if exp <= 0 && left_digits > -6 {
        left_digits
    } else {
        1
    };

    let mut out = String::with_capacity(digits.len() + 8);
    if dot_place <= 0 {
        out.push_str("0.");
        out.extend(std::iter::repeat('0').take(usize::try_from(-dot_place).ok()?));
        out.push_str(digits);
    } else if dot_place >= len {
        out.push_str(digits);
        out.extend(std::iter::repeat('0').take(usize::try_from(dot_place - len).ok()?));
    } else {
        let split = usize::try_from(dot_place).ok()?;
        out.push_str(&digits[..split]);
        out.push('.');
        out.push_str(&digits[split..]);
    }
    if left_digits != dot_place {
        out.push_str(&format!("E{:+}", left_digits - dot_place));
    }
    Some(out)
}
