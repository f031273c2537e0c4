use chrono::NaiveDate;

use crate::error::{HabitError, Result};

pub(crate) const DATE_FORMAT: &str = "%Y-%m-%d";

/// Returns the trimmed value, treating absent and blank input alike.
pub(crate) fn required_text(
    field: &'static str,
    value: Option<&str>,
    message: &str,
) -> Result<String> {
    match value.map(str::trim) {
        Some(text) if !text.is_empty() => Ok(text.to_string()),
        _ => Err(HabitError::validation(field, message)),
    }
}

pub(crate) fn bounded_text(field: &'static str, value: Option<&str>, max_len: usize) -> Result<String> {
    let text = required_text(field, value, &format!("{field} is required"))?;
    if text.chars().count() > max_len {
        return Err(HabitError::validation(
            field,
            format!("{field} must be at most {max_len} characters"),
        ));
    }
    Ok(text)
}

pub(crate) fn required_date(field: &'static str, value: Option<&str>) -> Result<NaiveDate> {
    let raw = required_text(field, value, &format!("{field} is required"))?;
    parse_date(field, &raw)
}

pub(crate) fn parse_date(field: &'static str, raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT).map_err(|_| {
        HabitError::validation(field, format!("{field} must be a valid ISO date (YYYY-MM-DD)"))
    })
}

/// Parses an enumerated field with `parse`, listing the accepted values on
/// failure.
pub(crate) fn choice<T>(
    field: &'static str,
    raw: &str,
    parse: impl Fn(&str) -> Option<T>,
    accepted: &[&str],
) -> Result<T> {
    parse(raw.trim()).ok_or_else(|| {
        HabitError::validation(
            field,
            format!(
                "\"{}\" is not a valid {field}; expected one of: {}",
                raw,
                accepted.join(", ")
            ),
        )
    })
}
