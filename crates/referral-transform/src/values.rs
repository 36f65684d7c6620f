//! Polars `AnyValue` helpers.
//!
//! Row-level accessors used by the normalizer and rule evaluator. Missing
//! columns read as all-null so callers degrade instead of failing.

use polars::prelude::{AnyValue, DataFrame};

/// Converts a Polars AnyValue to a String representation.
/// Returns empty string for Null, properly formats numeric types.
pub fn any_to_string(value: AnyValue<'_>) -> String {
    match value {
        AnyValue::Null => String::new(),
        AnyValue::Int8(v) => v.to_string(),
        AnyValue::Int16(v) => v.to_string(),
        AnyValue::Int32(v) => v.to_string(),
        AnyValue::Int64(v) => v.to_string(),
        AnyValue::UInt8(v) => v.to_string(),
        AnyValue::UInt16(v) => v.to_string(),
        AnyValue::UInt32(v) => v.to_string(),
        AnyValue::UInt64(v) => v.to_string(),
        AnyValue::Float32(v) => format_numeric(f64::from(v)),
        AnyValue::Float64(v) => format_numeric(v),
        AnyValue::String(s) => s.to_string(),
        AnyValue::StringOwned(s) => s.to_string(),
        AnyValue::Boolean(b) => b.to_string(),
        other => other.to_string(),
    }
}

/// Converts AnyValue to String, returning None for null or blank text.
pub fn any_to_string_non_empty(value: AnyValue<'_>) -> Option<String> {
    let s = any_to_string(value);
    if s.trim().is_empty() { None } else { Some(s) }
}

/// Formats a floating-point number as a string without trailing zeros.
pub fn format_numeric(v: f64) -> String {
    let s = format!("{v}");
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.').to_string()
    } else {
        s
    }
}

/// True when the value is non-null and, for text, not blank.
pub fn is_present(value: &AnyValue<'_>) -> bool {
    match value {
        AnyValue::Null => false,
        AnyValue::String(s) => !s.trim().is_empty(),
        AnyValue::StringOwned(s) => !s.trim().is_empty(),
        _ => true,
    }
}

/// Interprets a value as a flag. Null and unrecognized text are false.
pub fn any_to_bool(value: AnyValue<'_>) -> bool {
    match value {
        AnyValue::Boolean(b) => b,
        AnyValue::String(s) => parse_flag(s),
        AnyValue::StringOwned(s) => parse_flag(&s),
        AnyValue::Null => false,
        other => any_to_f64(other).is_some_and(|v| v != 0.0),
    }
}

/// Parses boolean-like text (`true`, `1`, `yes`, `y`, `t`), case-insensitive.
pub fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "true" | "1" | "yes" | "y" | "t"
    )
}

/// Converts an AnyValue to f64, returning None for non-numeric or null values.
pub fn any_to_f64(value: AnyValue<'_>) -> Option<f64> {
    match value {
        AnyValue::Int8(v) => Some(f64::from(v)),
        AnyValue::Int16(v) => Some(f64::from(v)),
        AnyValue::Int32(v) => Some(f64::from(v)),
        AnyValue::Int64(v) => Some(v as f64),
        AnyValue::UInt8(v) => Some(f64::from(v)),
        AnyValue::UInt16(v) => Some(f64::from(v)),
        AnyValue::UInt32(v) => Some(f64::from(v)),
        AnyValue::UInt64(v) => Some(v as f64),
        AnyValue::Float32(v) => Some(f64::from(v)),
        AnyValue::Float64(v) => Some(v),
        AnyValue::String(s) => parse_f64(s),
        AnyValue::StringOwned(s) => parse_f64(&s),
        _ => None,
    }
}

/// Parses a string as f64, returning None for invalid or empty strings.
pub fn parse_f64(value: &str) -> Option<f64> {
    if value.trim().is_empty() {
        return None;
    }
    value.trim().parse::<f64>().ok()
}

/// Parses a string as i64, accepting integral floats such as `"12.0"`.
pub fn parse_i64(value: &str) -> Option<i64> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(v) = trimmed.parse::<i64>() {
        return Some(v);
    }
    let float = trimmed.parse::<f64>().ok()?;
    if float.is_finite() && float.fract() == 0.0 {
        Some(float as i64)
    } else {
        None
    }
}

/// Get a string value from a DataFrame column at the given row index.
pub fn column_value_string(df: &DataFrame, name: &str, idx: usize) -> String {
    match df.column(name) {
        Ok(column) => any_to_string(column.get(idx).unwrap_or(AnyValue::Null)),
        Err(_) => String::new(),
    }
}

/// Non-blank text values of a column, one per row.
pub fn column_text_values(df: &DataFrame, name: &str) -> Vec<Option<String>> {
    let Ok(column) = df.column(name) else {
        return vec![None; df.height()];
    };
    (0..df.height())
        .map(|idx| any_to_string_non_empty(column.get(idx).unwrap_or(AnyValue::Null)))
        .collect()
}

/// Presence flags of a column, one per row.
pub fn column_presence(df: &DataFrame, name: &str) -> Vec<bool> {
    let Ok(column) = df.column(name) else {
        return vec![false; df.height()];
    };
    (0..df.height())
        .map(|idx| is_present(&column.get(idx).unwrap_or(AnyValue::Null)))
        .collect()
}

/// Boolean flags of a column, one per row. Missing column reads as false.
pub fn column_flags(df: &DataFrame, name: &str) -> Vec<bool> {
    let Ok(column) = df.column(name) else {
        return vec![false; df.height()];
    };
    (0..df.height())
        .map(|idx| any_to_bool(column.get(idx).unwrap_or(AnyValue::Null)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_any_to_string_formats_numbers() {
        assert_eq!(any_to_string(AnyValue::Float64(50000.0)), "50000");
        assert_eq!(any_to_string(AnyValue::Float64(12.5)), "12.5");
        assert_eq!(any_to_string(AnyValue::Int64(7)), "7");
        assert_eq!(any_to_string(AnyValue::Null), "");
    }

    #[test]
    fn test_presence_treats_blank_text_as_absent() {
        assert!(!is_present(&AnyValue::Null));
        assert!(!is_present(&AnyValue::String("  ")));
        assert!(is_present(&AnyValue::String("tx-1")));
        assert!(is_present(&AnyValue::Int64(0)));
    }

    #[test]
    fn test_any_to_bool() {
        assert!(any_to_bool(AnyValue::Boolean(true)));
        assert!(any_to_bool(AnyValue::String("True")));
        assert!(any_to_bool(AnyValue::String("1")));
        assert!(!any_to_bool(AnyValue::String("False")));
        assert!(!any_to_bool(AnyValue::String("")));
        assert!(!any_to_bool(AnyValue::Null));
        assert!(any_to_bool(AnyValue::Int64(1)));
        assert!(!any_to_bool(AnyValue::Float64(0.0)));
    }

    #[test]
    fn test_parse_i64_accepts_integral_floats() {
        assert_eq!(parse_i64("12"), Some(12));
        assert_eq!(parse_i64(" 12.0 "), Some(12));
        assert_eq!(parse_i64("12.5"), None);
        assert_eq!(parse_i64("abc"), None);
        assert_eq!(parse_i64(""), None);
    }
}
