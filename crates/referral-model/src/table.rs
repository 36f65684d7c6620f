//! Logical table names.

/// Referral fact table every join is rooted on.
pub const ANCHOR_TABLE: &str = "user_referrals";

/// Referral status dimension (`id`, `description`).
pub const STATUSES_TABLE: &str = "user_referral_statuses";

/// Paid transaction dimension.
pub const TRANSACTIONS_TABLE: &str = "paid_transactions";

/// Lead dimension, keyed by `lead_id` for joins.
pub const LEADS_TABLE: &str = "lead_log";

/// Referral log dimension, keyed by `user_referral_id` for joins.
pub const REFERRAL_LOGS_TABLE: &str = "user_referral_logs";

/// Reward dimension.
pub const REWARDS_TABLE: &str = "referral_rewards";

/// User dimension, joined on the referrer.
pub const USERS_TABLE: &str = "user_logs";

/// Logical name of the denormalized output table.
pub const JOINED_TABLE: &str = "main_table";

/// Every table name the pipeline knows how to normalize.
pub const RECOGNIZED_TABLES: &[&str] = &[
    ANCHOR_TABLE,
    STATUSES_TABLE,
    TRANSACTIONS_TABLE,
    LEADS_TABLE,
    REFERRAL_LOGS_TABLE,
    REWARDS_TABLE,
    USERS_TABLE,
];

/// Returns true when `name` is one of [`RECOGNIZED_TABLES`].
pub fn is_recognized_table(name: &str) -> bool {
    RECOGNIZED_TABLES.contains(&name)
}
