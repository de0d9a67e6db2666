//! Vietnamese dong amounts.
//!
//! The commerce API stores every price as a whole number of dong but is not
//! consistent on the wire: some serializers emit integers, others decimal
//! strings such as `"150000.00"`. [`Vnd`] accepts both.

use std::fmt;
use std::str::FromStr;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Deserializer, Serialize};

/// An amount of Vietnamese dong.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize)]
#[serde(transparent)]
pub struct Vnd(i64);

impl Vnd {
    /// Zero dong.
    pub const ZERO: Self = Self(0);

    /// Create an amount from whole dong.
    #[must_use]
    pub const fn new(amount: i64) -> Self {
        Self(amount)
    }

    /// The amount in whole dong.
    #[must_use]
    pub const fn amount(self) -> i64 {
        self.0
    }

    /// Multiply a unit price by a quantity, saturating on overflow.
    #[must_use]
    pub fn times(self, quantity: i32) -> Self {
        Self(self.0.saturating_mul(i64::from(quantity)))
    }

    /// Format with `.` thousands separators and a spaced `đ` suffix.
    ///
    /// ```
    /// # use boutique_core::Vnd;
    /// assert_eq!(Vnd::new(1_250_000).format(), "1.250.000 đ");
    /// ```
    #[must_use]
    pub fn format(self) -> String {
        format!("{} đ", group_thousands(self.0))
    }

    /// Parse a decimal string, rounding half away from zero to whole dong.
    /// Exponent notation (`1.5e6`) is accepted.
    #[must_use]
    pub fn parse_lenient(input: &str) -> Option<Self> {
        let input = input.trim();
        let decimal = if input.contains(['e', 'E']) {
            Decimal::from_scientific(input).ok()?
        } else {
            Decimal::from_str(input).ok()?
        };
        decimal
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
            .to_i64()
            .map(Self)
    }
}

impl fmt::Display for Vnd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format())
    }
}

impl From<i64> for Vnd {
    fn from(amount: i64) -> Self {
        Self(amount)
    }
}

impl std::ops::Add for Vnd {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0.saturating_add(rhs.0))
    }
}

impl std::ops::Sub for Vnd {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self(self.0.saturating_sub(rhs.0))
    }
}

impl std::iter::Sum for Vnd {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, |acc, v| acc + v)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum WireAmount {
    Int(i64),
    Float(f64),
    Text(String),
}

impl<'de> Deserialize<'de> for Vnd {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        match WireAmount::deserialize(deserializer)? {
            WireAmount::Int(v) => Ok(Self(v)),
            #[allow(clippy::cast_possible_truncation)]
            WireAmount::Float(v) => Ok(Self(v.round() as i64)),
            WireAmount::Text(s) => Self::parse_lenient(&s)
                .ok_or_else(|| serde::de::Error::custom(format!("invalid amount: {s:?}"))),
        }
    }
}

/// Format a raw amount string the way the order screens print totals.
///
/// The input is rounded to whole dong, grouped with `.` and suffixed with
/// `đ` without a space. Anything that is not a number yields an empty string.
///
/// ```
/// # use boutique_core::format_vnd_str;
/// assert_eq!(format_vnd_str("1500000.00"), "1.500.000đ");
/// assert_eq!(format_vnd_str("n/a"), "");
/// ```
#[must_use]
pub fn format_vnd_str(input: &str) -> String {
    Vnd::parse_lenient(input)
        .or_else(|| leading_number(input))
        .map_or_else(String::new, |v| format!("{}đ", group_thousands(v.0)))
}

/// Parse the longest numeric prefix (`"12.5kg"` → 13, `"1e5đ"` → 100000).
fn leading_number(input: &str) -> Option<Vnd> {
    let trimmed = input.trim_start();
    let bytes = trimmed.as_bytes();
    let mantissa = |from: usize| {
        from + bytes
            .get(from..)
            .unwrap_or_default()
            .iter()
            .take_while(|b| b.is_ascii_digit() || **b == b'.')
            .count()
    };

    let sign = usize::from(matches!(bytes.first(), Some(b'-' | b'+')));
    let mut end = mantissa(sign);
    if end == sign {
        return None;
    }

    // An exponent only counts when digits follow it.
    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let digits_from = end + 1 + usize::from(matches!(bytes.get(end + 1), Some(b'-' | b'+')));
        let digits = bytes
            .get(digits_from..)
            .unwrap_or_default()
            .iter()
            .take_while(|b| b.is_ascii_digit())
            .count();
        if digits > 0 {
            end = digits_from + digits;
        }
    }
    Vnd::parse_lenient(trimmed.get(..end)?)
}

fn group_thousands(value: i64) -> String {
    let digits = value.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if value < 0 {
        out.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push('.');
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_format_groups_thousands() {
        assert_eq!(Vnd::new(0).format(), "0 đ");
        assert_eq!(Vnd::new(999).format(), "999 đ");
        assert_eq!(Vnd::new(1000).format(), "1.000 đ");
        assert_eq!(Vnd::new(1_250_000).format(), "1.250.000 đ");
        assert_eq!(Vnd::new(-45_000).format(), "-45.000 đ");
    }

    #[test]
    fn test_format_vnd_str() {
        assert_eq!(format_vnd_str("150000"), "150.000đ");
        assert_eq!(format_vnd_str("150000.50"), "150.001đ");
        assert_eq!(format_vnd_str("  2500000.00 "), "2.500.000đ");
        assert_eq!(format_vnd_str("12abc"), "12đ");
        assert_eq!(format_vnd_str("1e5"), "100.000đ");
        assert_eq!(format_vnd_str("2.5E+3 VND"), "2.500đ");
        assert_eq!(format_vnd_str("7e"), "7đ");
        assert_eq!(format_vnd_str("-"), "");
        assert_eq!(format_vnd_str(""), "");
        assert_eq!(format_vnd_str("abc"), "");
    }

    #[test]
    fn test_deserialize_from_number_or_string() {
        let a: Vnd = serde_json::from_str("120000").unwrap();
        let b: Vnd = serde_json::from_str("\"120000.00\"").unwrap();
        let c: Vnd = serde_json::from_str("120000.4").unwrap();
        assert_eq!(a, Vnd::new(120_000));
        assert_eq!(a, b);
        assert_eq!(a, c);
        assert!(serde_json::from_str::<Vnd>("\"free\"").is_err());
    }

    #[test]
    fn test_times_and_sum() {
        let unit = Vnd::new(199_000);
        assert_eq!(unit.times(3), Vnd::new(597_000));
        let total: Vnd = [Vnd::new(1), Vnd::new(2), Vnd::new(3)].into_iter().sum();
        assert_eq!(total, Vnd::new(6));
    }
}
