//! Declarative left-join plan for the referral view.
//!
//! Each [`JoinStep`] names a dimension table, the anchor and dimension key
//! columns, the dimension columns to bring across, and the dimension columns
//! to remove once merged. Steps run in order against the accumulated view.

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};
use crate::table::{
    LEADS_TABLE, REFERRAL_LOGS_TABLE, REWARDS_TABLE, STATUSES_TABLE, TRANSACTIONS_TABLE,
    USERS_TABLE,
};

/// One left join against a dimension table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinStep {
    /// Dimension table name.
    pub table: String,
    /// Key column on the accumulated view.
    pub left_on: String,
    /// Key column on the dimension table.
    pub right_on: String,
    /// Dimension columns projected before joining (must include `right_on`).
    pub columns: Vec<String>,
    /// Dimension columns dropped after joining.
    #[serde(default)]
    pub drop: Vec<String>,
}

impl JoinStep {
    pub fn new(table: &str, left_on: &str, right_on: &str, columns: &[&str]) -> Self {
        Self {
            table: table.to_string(),
            left_on: left_on.to_string(),
            right_on: right_on.to_string(),
            columns: columns.iter().map(|c| (*c).to_string()).collect(),
            drop: Vec::new(),
        }
    }

    #[must_use]
    pub fn dropping(mut self, columns: &[&str]) -> Self {
        self.drop = columns.iter().map(|c| (*c).to_string()).collect();
        self
    }

    /// True when both sides share the key name and collapse into one column.
    pub fn shares_key_name(&self) -> bool {
        self.left_on == self.right_on
    }

    /// Projected columns with the dimension key first and no duplicates.
    pub fn projection(&self) -> Vec<String> {
        let mut projected = vec![self.right_on.clone()];
        for column in &self.columns {
            if !projected.contains(column) {
                projected.push(column.clone());
            }
        }
        projected
    }
}

/// Ordered list of join steps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JoinPlan {
    steps: Vec<JoinStep>,
}

impl JoinPlan {
    pub fn new(steps: Vec<JoinStep>) -> Self {
        Self { steps }
    }

    pub fn steps(&self) -> &[JoinStep] {
        &self.steps
    }

    /// Find the step that joins `table`.
    pub fn step_for(&self, table: &str) -> Option<&JoinStep> {
        self.steps.iter().find(|step| step.table == table)
    }

    /// Reject steps that would drop the anchor-side key of a shared-name join.
    pub fn validate(&self) -> Result<()> {
        for step in &self.steps {
            if step.shares_key_name() && step.drop.contains(&step.left_on) {
                return Err(ConfigError::DropsAnchorKey {
                    table: step.table.clone(),
                    column: step.left_on.clone(),
                });
            }
        }
        Ok(())
    }
}

impl Default for JoinPlan {
    /// Statuses, transactions, leads, referral logs, rewards, users.
    fn default() -> Self {
        Self::new(vec![
            JoinStep::new(
                STATUSES_TABLE,
                "user_referral_status_id",
                "id",
                &["id", "description"],
            )
            .dropping(&["id"]),
            JoinStep::new(
                TRANSACTIONS_TABLE,
                "transaction_id",
                "transaction_id",
                &[
                    "transaction_id",
                    "transaction_status",
                    "transaction_at",
                    "transaction_location",
                    "timezone_transaction",
                    "transaction_type",
                ],
            ),
            JoinStep::new(
                LEADS_TABLE,
                "referee_id",
                "lead_id",
                &[
                    "lead_id",
                    "source_category",
                    "preferred_location",
                    "timezone_location",
                    "current_status",
                ],
            )
            .dropping(&["lead_id"]),
            JoinStep::new(
                REFERRAL_LOGS_TABLE,
                "referral_id",
                "user_referral_id",
                &[
                    "user_referral_id",
                    "source_transaction_id",
                    "is_reward_granted",
                ],
            )
            .dropping(&["user_referral_id"]),
            JoinStep::new(
                REWARDS_TABLE,
                "referral_reward_id",
                "id",
                &["id", "reward_value", "reward_type"],
            )
            .dropping(&["id"]),
            JoinStep::new(
                USERS_TABLE,
                "referrer_id",
                "user_id",
                &[
                    "user_id",
                    "name",
                    "phone_number",
                    "homeclub",
                    "timezone_homeclub",
                    "membership_expired_date",
                    "is_deleted",
                ],
            )
            .dropping(&["user_id"]),
        ])
    }
}
