//! Text enrichment of the referral view.

use polars::prelude::*;
use tracing::debug;

use crate::error::Result;
use crate::values::column_text_values;

/// Column holding how the referral was made.
pub const REFERRAL_SOURCE_COLUMN: &str = "referral_source";
/// Lead category brought across from the lead log.
pub const SOURCE_CATEGORY_COLUMN: &str = "source_category";
/// Derived channel column.
pub const REFERRAL_SOURCE_CATEGORY_COLUMN: &str = "referral_source_category";

/// Title-case a string: the first letter after any non-letter is upper-cased
/// and every other letter lower-cased.
///
/// ```
/// use referral_transform::title_case;
/// assert_eq!(title_case("user sign up"), "User Sign Up");
/// assert_eq!(title_case("o'neil"), "O'Neil");
/// ```
pub fn title_case(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut after_letter = false;
    for ch in value.chars() {
        if ch.is_alphabetic() {
            if after_letter {
                out.extend(ch.to_lowercase());
            } else {
                out.extend(ch.to_uppercase());
            }
            after_letter = true;
        } else {
            out.push(ch);
            after_letter = false;
        }
    }
    out
}

/// Title-case every text column in place. Returns the columns rewritten.
pub fn apply_title_case(df: &mut DataFrame) -> Result<Vec<String>> {
    let targets: Vec<String> = df
        .get_columns()
        .iter()
        .filter(|c| c.dtype() == &DataType::String)
        .map(|c| c.name().to_string())
        .collect();

    for name in &targets {
        let text = df.column(name)?.str()?;
        let mut builder = StringChunkedBuilder::new(name.as_str().into(), text.len());
        for value in text {
            match value {
                Some(v) => builder.append_value(title_case(v)),
                None => builder.append_null(),
            }
        }
        df.with_column(builder.finish().into_series())?;
    }
    debug!(columns = targets.len(), "text columns title-cased");
    Ok(targets)
}

/// Channel a referral came through.
///
/// `User Sign Up` is online, `Draft Transaction` is offline, and a `Lead`
/// takes the lead's own category. Anything else is blank.
pub fn referral_source_category(source: Option<&str>, source_category: Option<&str>) -> String {
    match source {
        Some("User Sign Up") => "Online".to_string(),
        Some("Draft Transaction") => "Offline".to_string(),
        Some("Lead") => source_category.unwrap_or_default().to_string(),
        _ => String::new(),
    }
}

/// Append `referral_source_category` to the view.
///
/// Without a `referral_source` column every row gets the empty string.
pub fn add_referral_source_category(df: &mut DataFrame) -> Result<()> {
    let sources = column_text_values(df, REFERRAL_SOURCE_COLUMN);
    let categories = column_text_values(df, SOURCE_CATEGORY_COLUMN);
    let values: Vec<String> = sources
        .iter()
        .zip(&categories)
        .map(|(source, category)| referral_source_category(source.as_deref(), category.as_deref()))
        .collect();
    df.with_column(Series::new(REFERRAL_SOURCE_CATEGORY_COLUMN.into(), values))?;
    Ok(())
}
