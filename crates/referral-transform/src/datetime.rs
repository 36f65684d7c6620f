//! Timestamp parsing and the Asia/Jakarta target zone.
//!
//! Source tables carry timestamps as text in several layouts, with or
//! without an offset. Values without an offset are taken as UTC. Every
//! parsed value ends up in Asia/Jakarta, which observes a fixed UTC+7 offset
//! with no daylight saving, so a [`FixedOffset`] represents it exactly.
//!
//! In DataFrames, coerced columns are stored as
//! `Datetime(Microseconds, "Asia/Jakarta")`.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use polars::prelude::*;

use crate::values::any_to_string_non_empty;

/// IANA name of the target zone.
pub const JAKARTA_TZ: &str = "Asia/Jakarta";

/// UTC offset of Asia/Jakarta in seconds.
pub const JAKARTA_OFFSET_SECS: i32 = 7 * 3600;

const JAKARTA: FixedOffset = match FixedOffset::east_opt(JAKARTA_OFFSET_SECS) {
    Some(offset) => offset,
    None => panic!("UTC+7 is within the valid offset range"),
};

/// The Asia/Jakarta offset (UTC+7).
pub fn jakarta_offset() -> FixedOffset {
    JAKARTA
}

/// Converts any instant to Asia/Jakarta local time.
pub fn to_jakarta<Tz: chrono::TimeZone>(instant: &DateTime<Tz>) -> DateTime<FixedOffset> {
    instant.with_timezone(&JAKARTA)
}

/// Parses a timestamp, returning None when no known layout matches.
///
/// Offset-carrying layouts keep their offset; naive layouts are UTC.
pub fn parse_timestamp(value: &str) -> Option<DateTime<FixedOffset>> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Some(dt) = try_parse_with_offset(trimmed) {
        return Some(to_jakarta(&dt));
    }
    let naive = try_parse_naive_datetime(trimmed)
        .or_else(|| try_parse_date(trimmed).map(|d| d.and_time(NaiveTime::MIN)))?;
    Some(to_jakarta(&naive.and_utc()))
}

fn try_parse_with_offset(value: &str) -> Option<DateTime<FixedOffset>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt);
    }
    let formats = [
        "%Y-%m-%d %H:%M:%S%.f%:z",
        "%Y-%m-%d %H:%M:%S%:z",
        "%Y-%m-%d %H:%M:%S%.f%z",
        "%Y-%m-%d %H:%M:%S%z",
        "%Y-%m-%dT%H:%M:%S%.f%z",
        "%Y-%m-%dT%H:%M:%S%z",
        "%Y-%m-%d %H:%M:%S%.f %z",
        "%Y-%m-%d %H:%M:%S %z",
    ];
    formats
        .iter()
        .find_map(|fmt| DateTime::parse_from_str(value, fmt).ok())
}

fn try_parse_naive_datetime(value: &str) -> Option<NaiveDateTime> {
    let value = value.strip_suffix(" UTC").unwrap_or(value);
    let formats = [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
        "%Y/%m/%d %H:%M:%S",
        "%Y/%m/%d %H:%M",
        "%d-%b-%Y %H:%M:%S",
        "%m/%d/%Y %H:%M:%S",
        "%m/%d/%Y %H:%M",
    ];
    formats
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
}

fn try_parse_date(value: &str) -> Option<NaiveDate> {
    let formats = [
        "%Y-%m-%d",
        "%Y/%m/%d",
        "%d-%b-%Y",
        "%m/%d/%Y",
        "%Y%m%d",
        "%b %d, %Y",
        "%B %d, %Y",
    ];
    formats
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(value, fmt).ok())
}

/// The Asia/Jakarta polars time zone.
pub fn jakarta_time_zone() -> PolarsResult<Option<TimeZone>> {
    TimeZone::opt_try_new(Some(JAKARTA_TZ))
}

/// Builds a `Datetime(Microseconds, "Asia/Jakarta")` series.
pub fn timestamp_series(
    name: &str,
    values: &[Option<DateTime<FixedOffset>>],
) -> PolarsResult<Series> {
    let micros = Int64Chunked::from_iter_options(
        name.into(),
        values.iter().map(|v| v.map(|dt| dt.timestamp_micros())),
    );
    Ok(micros
        .into_datetime(TimeUnit::Microseconds, jakarta_time_zone()?)
        .into_series())
}

/// Returns true when the column already holds timestamps.
pub fn is_timestamp_column(column: &Column) -> bool {
    matches!(column.dtype(), DataType::Datetime(_, _))
}

/// Reads a column as Asia/Jakarta timestamps, whatever its current type.
///
/// `Datetime` columns are converted from their physical epoch values; any
/// other type is rendered to text and parsed. A missing column reads as all
/// null.
pub fn column_timestamps(
    df: &DataFrame,
    name: &str,
) -> PolarsResult<Vec<Option<DateTime<FixedOffset>>>> {
    let Ok(column) = df.column(name) else {
        return Ok(vec![None; df.height()]);
    };
    if let DataType::Datetime(unit, _) = column.dtype() {
        let unit = *unit;
        let physical = column.cast(&DataType::Int64)?;
        return Ok(physical
            .i64()?
            .into_iter()
            .map(|v| v.and_then(|raw| epoch_to_utc(raw, unit)).map(|dt| to_jakarta(&dt)))
            .collect());
    }
    Ok((0..df.height())
        .map(|idx| {
            column
                .get(idx)
                .ok()
                .and_then(any_to_string_non_empty)
                .and_then(|text| parse_timestamp(&text))
        })
        .collect())
}

fn epoch_to_utc(raw: i64, unit: TimeUnit) -> Option<DateTime<Utc>> {
    match unit {
        TimeUnit::Nanoseconds => Some(DateTime::from_timestamp_nanos(raw)),
        TimeUnit::Microseconds => DateTime::from_timestamp_micros(raw),
        TimeUnit::Milliseconds => DateTime::from_timestamp_millis(raw),
    }
}
