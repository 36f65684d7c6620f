//! Per-table normalization.
//!
//! Each table goes through four steps in a fixed order:
//!
//! 1. numeric nulls become `0` (text nulls are kept)
//! 2. configured text columns are parsed to Asia/Jakarta timestamps
//! 3. configured columns are cast to their declared integer width, and
//!    cells that did not convert are filled with `0`
//! 4. rows repeating the unique key are dropped, first occurrence wins
//!
//! Step 3 must follow step 1. Nothing here fails on bad data: unparseable
//! timestamps become null and duplicates are dropped with a warning. A
//! normalized table is a fixed point: normalizing it again changes nothing.

use std::collections::BTreeSet;

use polars::prelude::*;
use tracing::{debug, info_span, warn};

use referral_model::{IntWidth, SchemaRegistry, TableSchema};

use crate::datetime::{is_timestamp_column, parse_timestamp, timestamp_series};
use crate::error::Result;
use crate::frame::TableFrame;
use crate::values::{column_value_string, parse_i64};

/// What normalization changed in one table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NormalizeReport {
    pub table: String,
    pub rows_in: usize,
    pub rows_out: usize,
    /// Numeric nulls replaced with zero.
    pub nulls_filled: usize,
    /// Columns converted from text to timestamps.
    pub datetime_columns: Vec<String>,
    /// Non-blank cells that could not be parsed as timestamps.
    pub unparsed_timestamps: usize,
    /// Columns cast to their declared integer width.
    pub numeric_columns: Vec<String>,
    pub duplicates_dropped: usize,
}

/// Maps an [`IntWidth`] to its Polars type.
pub fn int_dtype(width: IntWidth) -> DataType {
    match width {
        IntWidth::Int8 => DataType::Int8,
        IntWidth::Int16 => DataType::Int16,
        IntWidth::Int32 => DataType::Int32,
        IntWidth::Int64 => DataType::Int64,
    }
}

/// Normalize one table in place using its registry entry.
///
/// Tables without an entry only get numeric null filling.
pub fn normalize_table(frame: &mut TableFrame, registry: &SchemaRegistry) -> Result<NormalizeReport> {
    let span = info_span!("normalize", table = %frame.name);
    let _guard = span.enter();

    let mut report = NormalizeReport {
        table: frame.name.clone(),
        rows_in: frame.data.height(),
        ..NormalizeReport::default()
    };

    report.nulls_filled = fill_numeric_nulls(&mut frame.data)?;

    match registry.get(&frame.name) {
        Some(schema) => apply_schema(&mut frame.data, schema, &mut report)?,
        None => debug!("no schema registered; only numeric nulls filled"),
    }

    report.rows_out = frame.data.height();
    debug!(
        rows_in = report.rows_in,
        rows_out = report.rows_out,
        nulls_filled = report.nulls_filled,
        duplicates_dropped = report.duplicates_dropped,
        "table normalized"
    );
    Ok(report)
}

fn apply_schema(df: &mut DataFrame, schema: &TableSchema, report: &mut NormalizeReport) -> Result<()> {
    let (converted, unparsed) = coerce_datetime_columns(df, &schema.datetime_columns)?;
    report.datetime_columns = converted;
    report.unparsed_timestamps = unparsed;
    report.numeric_columns = coerce_numeric_columns(df, schema)?;
    report.nulls_filled += fill_numeric_nulls(df)?;
    if let Some(key) = &schema.unique_key {
        report.duplicates_dropped = drop_duplicate_keys(df, key)?;
    }
    Ok(())
}

/// Replace nulls in every integer and float column with zero.
///
/// Returns the number of cells filled.
pub fn fill_numeric_nulls(df: &mut DataFrame) -> Result<usize> {
    let targets: Vec<(String, usize)> = df
        .get_columns()
        .iter()
        .filter(|c| c.dtype().is_integer() || c.dtype().is_float())
        .filter(|c| c.null_count() > 0)
        .map(|c| (c.name().to_string(), c.null_count()))
        .collect();

    let mut filled = 0usize;
    for (name, nulls) in targets {
        let series = df
            .column(&name)?
            .as_materialized_series()
            .fill_null(FillNullStrategy::Zero)?;
        df.with_column(series)?;
        filled += nulls;
    }
    Ok(filled)
}

/// Parse configured text columns to Asia/Jakarta timestamps.
///
/// Columns that are absent or not text typed are skipped, so running this on
/// an already normalized table changes nothing. Returns the converted column
/// names and the number of non-blank cells that failed to parse.
pub fn coerce_datetime_columns(df: &mut DataFrame, columns: &[String]) -> Result<(Vec<String>, usize)> {
    let mut converted = Vec::new();
    let mut unparsed = 0usize;
    for name in columns {
        let Ok(column) = df.column(name) else {
            continue;
        };
        if is_timestamp_column(column) || column.dtype() != &DataType::String {
            continue;
        }
        let text = column.str()?;
        let mut values = Vec::with_capacity(text.len());
        for raw in text {
            let parsed = raw.and_then(parse_timestamp);
            if parsed.is_none() && raw.is_some_and(|s| !s.trim().is_empty()) {
                unparsed += 1;
            }
            values.push(parsed);
        }
        let series = timestamp_series(name, &values)?;
        df.with_column(series)?;
        converted.push(name.clone());
    }
    if unparsed > 0 {
        debug!(unparsed, "unparseable timestamps set to null");
    }
    Ok((converted, unparsed))
}

/// Cast configured columns to their declared integer width.
///
/// Text cells are parsed (integral floats such as `"3.0"` are accepted);
/// anything unconvertible becomes null until [`fill_numeric_nulls`] runs
/// again. Returns the cast column names.
pub fn coerce_numeric_columns(df: &mut DataFrame, schema: &TableSchema) -> Result<Vec<String>> {
    let mut cast = Vec::new();
    for (name, width) in &schema.numeric_columns {
        let Ok(column) = df.column(name) else {
            continue;
        };
        let target = int_dtype(*width);
        if column.dtype() == &target {
            continue;
        }
        let series = if column.dtype() == &DataType::String {
            let parsed = Int64Chunked::from_iter_options(
                name.as_str().into(),
                column.str()?.into_iter().map(|v| v.and_then(parse_i64)),
            );
            parsed.into_series().cast(&target)?
        } else {
            column.as_materialized_series().cast(&target)?
        };
        df.with_column(series)?;
        cast.push(name.clone());
    }
    Ok(cast)
}

/// Keep the first row for every key value and drop the rest.
///
/// Rows with a blank key are always kept. A missing key column is a no-op.
/// Returns the number of rows dropped.
pub fn drop_duplicate_keys(df: &mut DataFrame, key: &str) -> Result<usize> {
    if df.height() == 0 || df.column(key).is_err() {
        return Ok(0);
    }
    let mut seen = BTreeSet::new();
    let mut keep = Vec::with_capacity(df.height());
    for idx in 0..df.height() {
        let value = column_value_string(df, key, idx);
        let value = value.trim();
        if value.is_empty() {
            keep.push(true);
            continue;
        }
        keep.push(seen.insert(value.to_string()));
    }
    let dropped = keep.iter().filter(|k| !**k).count();
    if dropped == 0 {
        return Ok(0);
    }
    warn!(key, dropped, "duplicate key values found; keeping first occurrence");
    let mask = BooleanChunked::from_slice("dedupe".into(), &keep);
    *df = df.filter(&mask)?;
    Ok(dropped)
}

/// Normalize every table, in order.
pub fn normalize_tables(tables: &mut [TableFrame], registry: &SchemaRegistry) -> Result<Vec<NormalizeReport>> {
    tables
        .iter_mut()
        .map(|frame| normalize_table(frame, registry))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datetime::JAKARTA_TZ;

    fn frame(name: &str, columns: Vec<Column>) -> TableFrame {
        TableFrame::new(name, DataFrame::new(columns).unwrap())
    }

    #[test]
    fn numeric_nulls_become_zero_text_nulls_stay() {
        let mut df = DataFrame::new(vec![
            Series::new("reward_value".into(), vec![Some(50000.0), None]).into(),
            Series::new("name".into(), vec![Some("ann"), None]).into(),
        ])
        .unwrap();

        let filled = fill_numeric_nulls(&mut df).unwrap();

        assert_eq!(filled, 1);
        let rewards = df.column("reward_value").unwrap().f64().unwrap();
        assert_eq!(rewards.get(1), Some(0.0));
        assert_eq!(df.column("name").unwrap().null_count(), 1);
    }

    #[test]
    fn datetime_columns_get_jakarta_zone() {
        let mut df = DataFrame::new(vec![
            Series::new("created_at".into(), vec![Some("2024-03-01 10:00:00"), Some("bad"), None]).into(),
        ])
        .unwrap();

        let (converted, unparsed) =
            coerce_datetime_columns(&mut df, &["created_at".to_string(), "absent".to_string()]).unwrap();

        assert_eq!(converted, vec!["created_at"]);
        assert_eq!(unparsed, 1);
        let column = df.column("created_at").unwrap();
        match column.dtype() {
            DataType::Datetime(TimeUnit::Microseconds, Some(tz)) => assert_eq!(tz.as_str(), JAKARTA_TZ),
            other => panic!("unexpected dtype {other:?}"),
        }
        assert_eq!(column.null_count(), 2);
    }

    #[test]
    fn numeric_columns_cast_to_declared_width() {
        let mut df = DataFrame::new(vec![
            Series::new("id".into(), vec![1.0, 2.0]).into(),
            Series::new("reward_type".into(), vec![Some("3"), Some("x")]).into(),
        ])
        .unwrap();
        let schema = TableSchema::new()
            .with_numeric_column("id", IntWidth::Int32)
            .with_numeric_column("reward_type", IntWidth::Int64);

        let cast = coerce_numeric_columns(&mut df, &schema).unwrap();

        assert_eq!(cast, vec!["id", "reward_type"]);
        assert_eq!(df.column("id").unwrap().dtype(), &DataType::Int32);
        let reward_type = df.column("reward_type").unwrap().i64().unwrap();
        assert_eq!(reward_type.get(0), Some(3));
        assert_eq!(reward_type.get(1), None);
    }

    #[test]
    fn duplicates_keep_first_occurrence() {
        let mut df = DataFrame::new(vec![
            Series::new("id".into(), vec![1i64, 2, 1, 3, 2]).into(),
            Series::new("name".into(), vec!["a", "b", "c", "d", "e"]).into(),
        ])
        .unwrap();

        let dropped = drop_duplicate_keys(&mut df, "id").unwrap();

        assert_eq!(dropped, 2);
        let names = df.column("name").unwrap().str().unwrap();
        let names: Vec<_> = names.into_iter().flatten().collect();
        assert_eq!(names, vec!["a", "b", "d"]);
    }

    #[test]
    fn blank_keys_are_not_deduplicated() {
        let mut df = DataFrame::new(vec![
            Series::new("transaction_id".into(), vec![None, None, Some("t1")]).into(),
        ])
        .unwrap();
        assert_eq!(drop_duplicate_keys(&mut df, "transaction_id").unwrap(), 0);
        assert_eq!(df.height(), 3);
    }

    #[test]
    fn unregistered_table_only_fills_nulls() {
        let mut table = frame(
            "extra",
            vec![
                Series::new("id".into(), vec![Some(1i64), None, Some(1)]).into(),
                Series::new("created_at".into(), vec!["2024-01-01", "2024-01-02", "2024-01-03"]).into(),
            ],
        );
        let report = normalize_table(&mut table, &SchemaRegistry::default()).unwrap();

        assert_eq!(report.nulls_filled, 1);
        assert_eq!(report.duplicates_dropped, 0);
        assert_eq!(table.data.height(), 3);
        assert_eq!(table.data.column("created_at").unwrap().dtype(), &DataType::String);
    }

    #[test]
    fn registered_table_runs_every_step() {
        let mut table = frame(
            "referral_rewards",
            vec![
                Series::new("id".into(), vec![Some(1.0), Some(1.0), None]).into(),
                Series::new("reward_value".into(), vec![Some(50000.0), Some(1.0), None]).into(),
                Series::new("reward_type".into(), vec![Some(1i64), Some(2), None]).into(),
                Series::new("created_at".into(), vec!["2024-01-01", "2024-01-02", "2024-01-03"]).into(),
            ],
        );
        let report = normalize_table(&mut table, &SchemaRegistry::default()).unwrap();

        assert_eq!(report.rows_in, 3);
        assert_eq!(report.rows_out, 2);
        assert_eq!(report.duplicates_dropped, 1);
        assert_eq!(report.nulls_filled, 3);
        assert_eq!(report.datetime_columns, vec!["created_at"]);
        assert_eq!(report.numeric_columns, vec!["id"]);
        let ids = table.data.column("id").unwrap().i64().unwrap();
        assert_eq!(ids.get(0), Some(1));
        assert_eq!(ids.get(1), Some(0));
    }

    #[test]
    fn unconvertible_integer_text_is_filled_with_zero() {
        let mut table = frame(
            "referral_rewards",
            vec![
                Series::new("id".into(), vec!["1", "x"]).into(),
                Series::new("reward_type".into(), vec![Some("2"), None]).into(),
            ],
        );
        let report = normalize_table(&mut table, &SchemaRegistry::default()).unwrap();

        assert_eq!(report.nulls_filled, 2);
        let ids: Vec<_> = table.data.column("id").unwrap().i64().unwrap().into_iter().collect();
        assert_eq!(ids, vec![Some(1), Some(0)]);
        assert_eq!(table.data.column("reward_type").unwrap().null_count(), 0);
    }
}
