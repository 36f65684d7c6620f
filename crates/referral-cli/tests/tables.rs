//! Tests for the `referral tables` listing.

use referral_cli::summary::table_rows;
use referral_model::{PipelineConfig, SchemaRegistry, TableSchema};

fn render(config: &PipelineConfig) -> String {
    table_rows(config)
        .into_iter()
        .map(|row| {
            format!(
                "{} | {} | {} | {} | {}",
                row.table, row.datetime_columns, row.numeric_columns, row.unique_key, row.join
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[test]
fn test_default_listing() {
    insta::assert_snapshot!(render(&PipelineConfig::default()), @r"
    lead_log | created_at | id:int64 | id | referee_id = lead_id
    paid_transactions | transaction_at | - | transaction_id | transaction_id = transaction_id
    referral_rewards | created_at | id:int64, reward_type:int64 | id | referral_reward_id = id
    user_logs | membership_expired_date | id:int64 | id | referrer_id = user_id
    user_referral_logs | created_at | id:int64 | id | referral_id = user_referral_id
    user_referral_statuses | created_at | id:int64 | id | user_referral_status_id = id
    user_referrals | referral_at, updated_at | referral_reward_id:int64, user_referral_status_id:int64 | referral_id | anchor
    ");
}

#[test]
fn test_extra_table_without_join() {
    let mut tables = SchemaRegistry::empty();
    tables.insert("notes", TableSchema::new());
    let config = PipelineConfig {
        tables,
        ..PipelineConfig::default()
    };
    insta::assert_snapshot!(render(&config), @"notes | - | - | - | -");
}
