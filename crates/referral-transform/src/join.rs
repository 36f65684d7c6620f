//! Referral view construction.
//!
//! The anchor table is left-joined against each dimension named by the
//! [`JoinPlan`], one step at a time. Anchor rows are never dropped and keep
//! their input order.

use std::time::Instant;

use polars::prelude::*;
use tracing::{debug, info, info_span, warn};

use referral_model::{ANCHOR_TABLE, JoinPlan, JoinStep};

use crate::error::{Result, TransformError};
use crate::frame::{TableFrame, find_table};

const ROW_ORDER_COLUMN: &str = "__anchor_row";

/// Outcome of one join step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    Joined,
    /// The dimension or one of the key columns was missing.
    Skipped,
}

/// Build the denormalized referral view from normalized tables.
pub fn build_referral_view(tables: &[TableFrame], plan: &JoinPlan) -> Result<DataFrame> {
    let span = info_span!("join");
    let _guard = span.enter();
    let start = Instant::now();

    let anchor = find_table(tables, ANCHOR_TABLE).ok_or_else(|| TransformError::MissingAnchorTable {
        table: ANCHOR_TABLE.to_string(),
    })?;

    let mut view = anchor.data.clone();
    let mut joined = 0usize;
    for step in plan.steps() {
        let Some(dimension) = find_table(tables, &step.table) else {
            warn!(table = %step.table, "dimension table missing; join step skipped");
            continue;
        };
        let (next, outcome) = apply_join_step(view, &dimension.data, step)?;
        view = next;
        if outcome == StepOutcome::Joined {
            joined += 1;
        }
    }

    info!(
        rows = view.height(),
        columns = view.width(),
        steps_joined = joined,
        duration_ms = start.elapsed().as_millis(),
        "referral view built"
    );
    Ok(view)
}

/// Left-join one dimension onto the view.
///
/// Projects the step's columns (missing non-key columns are skipped), casts
/// the dimension key to the view key's type, joins, then removes the step's
/// drop columns. When either key column is absent the view is returned
/// unchanged.
pub fn apply_join_step(view: DataFrame, dimension: &DataFrame, step: &JoinStep) -> Result<(DataFrame, StepOutcome)> {
    if view.column(&step.left_on).is_err() {
        warn!(table = %step.table, column = %step.left_on, "view has no join key; join step skipped");
        return Ok((view, StepOutcome::Skipped));
    }
    if dimension.column(&step.right_on).is_err() {
        warn!(table = %step.table, column = %step.right_on, "dimension has no join key; join step skipped");
        return Ok((view, StepOutcome::Skipped));
    }
    let key_dtype = view.column(&step.left_on)?.dtype().clone();

    let mut projected = Vec::new();
    for name in step.projection() {
        match dimension.column(&name) {
            Ok(column) => projected.push(column.clone()),
            Err(_) => debug!(table = %step.table, column = %name, "projected column missing"),
        }
    }
    for name in colliding_columns(&view, step, &projected) {
        warn!(
            table = %step.table,
            column = %name,
            "projected column already on the view; joined copy gets a _right suffix"
        );
    }
    let mut right = DataFrame::new(projected)?;
    let aligned = right.column(&step.right_on)?.cast(&key_dtype)?;
    right.with_column(aligned)?;

    let rows_before = view.height();
    let indexed = view.with_row_index(ROW_ORDER_COLUMN.into(), None)?;
    let merged = indexed
        .lazy()
        .join(
            right.lazy(),
            [col(step.left_on.as_str())],
            [col(step.right_on.as_str())],
            JoinArgs::new(JoinType::Left),
        )
        .collect()?;
    let sorted = merged.sort(
        [ROW_ORDER_COLUMN],
        SortMultipleOptions::default().with_maintain_order(true),
    )?;

    let mut out = sorted.drop(ROW_ORDER_COLUMN)?;
    for name in &step.drop {
        if name == &step.left_on {
            continue;
        }
        if out.column(name).is_ok() {
            out = out.drop(name)?;
        }
    }

    if out.height() != rows_before {
        warn!(
            table = %step.table,
            rows_before,
            rows_after = out.height(),
            "join changed the row count; dimension key is not unique"
        );
    }
    debug!(table = %step.table, columns = out.width(), "join step applied");
    Ok((out, StepOutcome::Joined))
}

/// Projected non-key columns whose names are already taken on the view.
pub fn colliding_columns(view: &DataFrame, step: &JoinStep, projected: &[Column]) -> Vec<String> {
    projected
        .iter()
        .map(|c| c.name().to_string())
        .filter(|name| name != &step.right_on && view.column(name).is_ok())
        .collect()
}

/// Replace nulls in text columns with the empty string.
///
/// Numeric, boolean and timestamp columns keep their nulls.
pub fn fill_text_sentinel(df: &mut DataFrame) -> Result<usize> {
    let targets: Vec<String> = df
        .get_columns()
        .iter()
        .filter(|c| c.dtype() == &DataType::String && c.null_count() > 0)
        .map(|c| c.name().to_string())
        .collect();

    let mut filled = 0usize;
    for name in targets {
        let column = df.column(&name)?;
        filled += column.null_count();
        let values: StringChunked = column
            .str()?
            .into_iter()
            .map(|v| Some(v.unwrap_or("")))
            .collect();
        df.with_column(values.with_name(name.as_str().into()).into_series())?;
    }
    Ok(filled)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn anchor() -> DataFrame {
        DataFrame::new(vec![
            Series::new("referral_id".into(), vec!["r3", "r1", "r2"]).into(),
            Series::new("user_referral_status_id".into(), vec![Some(2i64), Some(1), None]).into(),
        ])
        .unwrap()
    }

    fn statuses() -> DataFrame {
        DataFrame::new(vec![
            Series::new("id".into(), vec![1i32, 2]).into(),
            Series::new("description".into(), vec!["Berhasil", "Menunggu"]).into(),
            Series::new("created_at".into(), vec!["2024-01-01", "2024-01-01"]).into(),
        ])
        .unwrap()
    }

    fn status_step() -> JoinStep {
        JoinStep::new("user_referral_statuses", "user_referral_status_id", "id", &["id", "description"])
            .dropping(&["id"])
    }

    #[test]
    fn left_join_keeps_anchor_rows_and_order() {
        let (view, outcome) = apply_join_step(anchor(), &statuses(), &status_step()).unwrap();

        assert_eq!(outcome, StepOutcome::Joined);
        assert_eq!(view.height(), 3);
        let ids: Vec<_> = view.column("referral_id").unwrap().str().unwrap().into_iter().flatten().collect();
        assert_eq!(ids, vec!["r3", "r1", "r2"]);
        let descriptions: Vec<_> = view.column("description").unwrap().str().unwrap().into_iter().collect();
        assert_eq!(descriptions, vec![Some("Menunggu"), Some("Berhasil"), None]);
        assert!(view.column("id").is_err());
        assert!(view.column("created_at").is_err());
    }

    #[test]
    fn missing_dimension_key_skips_step() {
        let dimension = DataFrame::new(vec![Series::new("description".into(), vec!["x"]).into()]).unwrap();
        let (view, outcome) = apply_join_step(anchor(), &dimension, &status_step()).unwrap();
        assert_eq!(outcome, StepOutcome::Skipped);
        assert_eq!(view.width(), 2);
    }

    #[test]
    fn missing_projected_column_is_skipped() {
        let dimension = DataFrame::new(vec![Series::new("id".into(), vec![1i64]).into()]).unwrap();
        let (view, outcome) = apply_join_step(anchor(), &dimension, &status_step()).unwrap();
        assert_eq!(outcome, StepOutcome::Joined);
        assert!(view.column("description").is_err());
        assert_eq!(view.height(), 3);
    }

    #[test]
    fn shared_key_collapses_to_one_column() {
        let view = DataFrame::new(vec![
            Series::new("referral_id".into(), vec!["r1", "r2"]).into(),
            Series::new("transaction_id".into(), vec![Some("t1"), None]).into(),
        ])
        .unwrap();
        let transactions = DataFrame::new(vec![
            Series::new("transaction_id".into(), vec!["t1"]).into(),
            Series::new("transaction_status".into(), vec!["Paid"]).into(),
        ])
        .unwrap();
        let step = JoinStep::new(
            "paid_transactions",
            "transaction_id",
            "transaction_id",
            &["transaction_id", "transaction_status"],
        );

        let (view, _) = apply_join_step(view, &transactions, &step).unwrap();

        let names: Vec<String> = view.get_column_names().iter().map(|n| n.to_string()).collect();
        assert_eq!(names, vec!["referral_id", "transaction_id", "transaction_status"]);
        let status: Vec<_> = view.column("transaction_status").unwrap().str().unwrap().into_iter().collect();
        assert_eq!(status, vec![Some("Paid"), None]);
    }

    #[test]
    fn colliding_projection_is_reported() {
        let view = DataFrame::new(vec![
            Series::new("referral_id".into(), vec!["r1"]).into(),
            Series::new("user_referral_status_id".into(), vec![1i64]).into(),
            Series::new("description".into(), vec!["earlier"]).into(),
        ])
        .unwrap();
        let step = status_step();
        let projected: Vec<Column> = step
            .projection()
            .iter()
            .map(|name| statuses().column(name).unwrap().clone())
            .collect();

        assert_eq!(colliding_columns(&view, &step, &projected), vec!["description"]);

        let (joined, _) = apply_join_step(view, &statuses(), &step).unwrap();
        let names: Vec<String> = joined.get_column_names().iter().map(|n| n.to_string()).collect();
        assert_eq!(
            names,
            vec!["referral_id", "user_referral_status_id", "description", "description_right"]
        );
    }

    #[test]
    fn key_sharing_a_view_name_is_not_a_collision() {
        let view = DataFrame::new(vec![Series::new("transaction_id".into(), vec!["t1"]).into()]).unwrap();
        let step = JoinStep::new("paid_transactions", "transaction_id", "transaction_id", &["transaction_id"]);
        let projected = vec![Column::from(Series::new("transaction_id".into(), vec!["t1"]))];
        assert!(colliding_columns(&view, &step, &projected).is_empty());
    }

    #[test]
    fn missing_anchor_is_an_error() {
        let tables = vec![TableFrame::new("user_referral_statuses", statuses())];
        let err = build_referral_view(&tables, &JoinPlan::default()).unwrap_err();
        assert!(matches!(err, TransformError::MissingAnchorTable { .. }));
    }

    #[test]
    fn sentinel_fill_only_touches_text() {
        let mut df = DataFrame::new(vec![
            Series::new("name".into(), vec![Some("Ann"), None]).into(),
            Series::new("reward_value".into(), vec![Some(1.0), None]).into(),
        ])
        .unwrap();

        let filled = fill_text_sentinel(&mut df).unwrap();

        assert_eq!(filled, 1);
        assert_eq!(df.column("name").unwrap().str().unwrap().get(1), Some(""));
        assert_eq!(df.column("reward_value").unwrap().null_count(), 1);
    }
}
