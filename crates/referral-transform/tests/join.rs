//! Tests for the referral view join chain.

use polars::prelude::*;
use referral_model::{JoinPlan, JoinStep, SchemaRegistry};
use referral_transform::{
    StepOutcome, TableFrame, TransformError, apply_join_step, build_referral_view, normalize_tables,
};

fn frame(name: &str, columns: Vec<Column>) -> TableFrame {
    TableFrame::new(name, DataFrame::new(columns).unwrap())
}

fn tables() -> Vec<TableFrame> {
    vec![
        frame(
            "user_referrals",
            vec![
                Series::new("referral_id".into(), vec!["r2", "r1", "r3"]).into(),
                Series::new("referrer_id".into(), vec!["u1", "u2", "u9"]).into(),
                Series::new("referee_id".into(), vec![Some("l1"), None, Some("l2")]).into(),
                Series::new("transaction_id".into(), vec![Some("t1"), None, Some("t2")]).into(),
                Series::new("user_referral_status_id".into(), vec![1i64, 2, 3]).into(),
                Series::new("referral_reward_id".into(), vec![Some(10i64), None, Some(11)]).into(),
                Series::new("referral_at".into(), vec!["2024-03-01", "2024-03-02", "2024-03-03"]).into(),
            ],
        ),
        frame(
            "user_referral_statuses",
            vec![
                Series::new("id".into(), vec![1i64, 2, 3]).into(),
                Series::new("description".into(), vec!["Berhasil", "Menunggu", "Tidak Berhasil"]).into(),
            ],
        ),
        frame(
            "paid_transactions",
            vec![
                Series::new("transaction_id".into(), vec!["t1", "t2"]).into(),
                Series::new("transaction_status".into(), vec!["Paid", "Paid"]).into(),
                Series::new("transaction_at".into(), vec!["2024-03-05", "2024-02-01"]).into(),
                Series::new("transaction_type".into(), vec!["New", "New"]).into(),
            ],
        ),
        frame(
            "lead_log",
            vec![
                Series::new("id".into(), vec![1i64, 2]).into(),
                Series::new("lead_id".into(), vec!["l1", "l2"]).into(),
                Series::new("source_category".into(), vec!["Gym", "Event"]).into(),
            ],
        ),
        frame(
            "user_referral_logs",
            vec![
                Series::new("id".into(), vec![1i64, 2]).into(),
                Series::new("user_referral_id".into(), vec!["r2", "r3"]).into(),
                Series::new("source_transaction_id".into(), vec!["t1", "t2"]).into(),
                Series::new("is_reward_granted".into(), vec!["true", "false"]).into(),
            ],
        ),
        frame(
            "referral_rewards",
            vec![
                Series::new("id".into(), vec![10i64, 11]).into(),
                Series::new("reward_value".into(), vec![50000.0, 20000.0]).into(),
                Series::new("reward_type".into(), vec![1i64, 2]).into(),
            ],
        ),
        frame(
            "user_logs",
            vec![
                Series::new("id".into(), vec![1i64, 2]).into(),
                Series::new("user_id".into(), vec!["u1", "u2"]).into(),
                Series::new("name".into(), vec!["ann", "bob"]).into(),
                Series::new("membership_expired_date".into(), vec!["2030-01-01", "2030-01-01"]).into(),
                Series::new("is_deleted".into(), vec![false, false]).into(),
            ],
        ),
    ]
}

fn text(df: &DataFrame, name: &str) -> Vec<Option<String>> {
    df.column(name)
        .unwrap()
        .str()
        .unwrap()
        .into_iter()
        .map(|v| v.map(str::to_string))
        .collect()
}

#[test]
fn test_view_preserves_anchor_rows_and_order() {
    let mut tables = tables();
    normalize_tables(&mut tables, &SchemaRegistry::default()).unwrap();

    let view = build_referral_view(&tables, &JoinPlan::default()).unwrap();

    assert_eq!(view.height(), 3);
    assert_eq!(
        text(&view, "referral_id"),
        vec![Some("r2".into()), Some("r1".into()), Some("r3".into())]
    );
    assert_eq!(
        text(&view, "description"),
        vec![Some("Berhasil".into()), Some("Menunggu".into()), Some("Tidak Berhasil".into())]
    );
    assert_eq!(text(&view, "source_category"), vec![Some("Gym".into()), None, Some("Event".into())]);
    assert_eq!(text(&view, "name"), vec![Some("ann".into()), Some("bob".into()), None]);

    let reward = view.column("reward_value").unwrap().f64().unwrap();
    assert_eq!(reward.get(0), Some(50000.0));
    assert_eq!(reward.get(1), None);
}

#[test]
fn test_view_drops_redundant_keys() {
    let mut tables = tables();
    normalize_tables(&mut tables, &SchemaRegistry::default()).unwrap();

    let view = build_referral_view(&tables, &JoinPlan::default()).unwrap();

    for dropped in ["id", "lead_id", "user_referral_id", "user_id"] {
        assert!(view.column(dropped).is_err(), "{dropped} should not be in the view");
    }
    let transaction_columns = view
        .get_column_names()
        .iter()
        .filter(|n| n.as_str().starts_with("transaction_id"))
        .count();
    assert_eq!(transaction_columns, 1);
    assert!(view.column("source_transaction_id").is_ok());
}

#[test]
fn test_missing_dimension_is_skipped() {
    let mut tables = tables();
    tables.retain(|t| t.name != "referral_rewards");

    let view = build_referral_view(&tables, &JoinPlan::default()).unwrap();

    assert_eq!(view.height(), 3);
    assert!(view.column("reward_value").is_err());
    assert!(view.column("description").is_ok());
}

#[test]
fn test_missing_anchor_fails() {
    let mut tables = tables();
    tables.retain(|t| t.name != "user_referrals");

    let err = build_referral_view(&tables, &JoinPlan::default()).unwrap_err();
    match err {
        TransformError::MissingAnchorTable { table } => assert_eq!(table, "user_referrals"),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_key_types_are_aligned() {
    let view = DataFrame::new(vec![Series::new("referral_reward_id".into(), vec![Some(10i64), None]).into()]).unwrap();
    let rewards = DataFrame::new(vec![
        Series::new("id".into(), vec!["10"]).into(),
        Series::new("reward_value".into(), vec![50000.0]).into(),
    ])
    .unwrap();
    let step = JoinStep::new("referral_rewards", "referral_reward_id", "id", &["id", "reward_value"]).dropping(&["id"]);

    let (view, outcome) = apply_join_step(view, &rewards, &step).unwrap();

    assert_eq!(outcome, StepOutcome::Joined);
    let reward = view.column("reward_value").unwrap().f64().unwrap();
    assert_eq!(reward.get(0), Some(50000.0));
    assert_eq!(reward.get(1), None);
}
