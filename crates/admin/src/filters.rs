//! Custom Askama template filters.

#![allow(clippy::unnecessary_wraps)]

use std::fmt::Display;

/// Returns the current year.
///
/// Usage in templates: `{{ ""|current_year }}`
#[askama::filter_fn]
pub fn current_year(_value: impl Display, _env: &dyn askama::Values) -> askama::Result<i32> {
    use chrono::Datelike;
    Ok(chrono::Utc::now().year())
}

/// Formats a decimal amount string as dong (`"150000.00"` → `150.000đ`).
///
/// Non-numeric input renders as an empty string.
///
/// Usage in templates: `{{ amount|vnd }}`
#[askama::filter_fn]
pub fn vnd(value: impl Display, _env: &dyn askama::Values) -> askama::Result<String> {
    Ok(boutique_core::format_vnd_str(&value.to_string()))
}
