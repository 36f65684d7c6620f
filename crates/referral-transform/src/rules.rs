//! Reward validity rules.
//!
//! A referral row is valid when at least one qualifying rule holds and no
//! disqualifying rule does. Disqualification always wins.
//!
//! Qualifying:
//! - **paid reward**: a reward with a successful status, a new paid
//!   transaction after the referral in the same Jakarta calendar month, a
//!   membership that has not expired, a live referrer account and a granted
//!   reward.
//! - **pending without reward**: status `Menunggu` or `Tidak Berhasil` and no
//!   reward.
//!
//! Disqualifying:
//! - reward but status is not `Berhasil`
//! - reward but no transaction
//! - no reward, a paid transaction, and the transaction precedes the referral
//! - status `Berhasil` but no reward
//! - transaction precedes the referral
//!
//! Comparisons involving a missing timestamp are false.

use std::time::Instant;

use chrono::{DateTime, Datelike, FixedOffset};
use polars::prelude::*;
use tracing::{debug, info, info_span};

use crate::clock::Clock;
use crate::datetime::{column_timestamps, timestamp_series};
use crate::error::Result;
use crate::values::{column_flags, column_presence, column_text_values};

/// Output column holding the verdict.
pub const VALIDITY_COLUMN: &str = "is_business_logic_valid";

const STATUS_SUCCESS: &str = "Berhasil";
const STATUS_PENDING: &str = "Menunggu";
const STATUS_FAILED: &str = "Tidak Berhasil";
const TRANSACTION_PAID: &str = "Paid";
const TRANSACTION_NEW: &str = "New";

const TIMESTAMP_COLUMNS: [&str; 3] = ["transaction_at", "referral_at", "membership_expired_date"];
const FLAG_COLUMNS: [&str; 2] = ["is_deleted", "is_reward_granted"];

/// The facts about one referral row that the rules look at.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReferralFacts {
    pub reward_value_present: bool,
    pub description: Option<String>,
    pub transaction_id_present: bool,
    pub transaction_status: Option<String>,
    pub transaction_type: Option<String>,
    pub transaction_at: Option<DateTime<FixedOffset>>,
    pub referral_at: Option<DateTime<FixedOffset>>,
    pub membership_expired_date: Option<DateTime<FixedOffset>>,
    pub is_deleted: bool,
    pub is_reward_granted: bool,
}

impl ReferralFacts {
    fn description_is(&self, expected: &str) -> bool {
        self.description.as_deref() == Some(expected)
    }

    fn transaction_is_paid(&self) -> bool {
        self.transaction_status.as_deref() == Some(TRANSACTION_PAID)
    }

    fn transaction_before_referral(&self) -> bool {
        matches!((self.transaction_at, self.referral_at), (Some(tx), Some(referral)) if tx < referral)
    }

    fn transaction_after_referral(&self) -> bool {
        matches!((self.transaction_at, self.referral_at), (Some(tx), Some(referral)) if tx > referral)
    }

    fn transaction_in_referral_month(&self) -> bool {
        match (self.transaction_at, self.referral_at) {
            (Some(tx), Some(referral)) => tx.year() == referral.year() && tx.month() == referral.month(),
            _ => false,
        }
    }

    fn membership_active(&self, now: DateTime<FixedOffset>) -> bool {
        self.membership_expired_date.is_some_and(|expires| expires >= now)
    }
}

/// Which rules fired for one row.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RuleOutcome {
    pub paid_reward: bool,
    pub pending_without_reward: bool,
    pub reward_without_success: bool,
    pub reward_without_transaction: bool,
    pub unrewarded_paid_before_referral: bool,
    pub success_without_reward: bool,
    pub transaction_before_referral: bool,
}

impl RuleOutcome {
    pub fn qualifies(&self) -> bool {
        self.paid_reward || self.pending_without_reward
    }

    pub fn disqualified(&self) -> bool {
        self.reward_without_success
            || self.reward_without_transaction
            || self.unrewarded_paid_before_referral
            || self.success_without_reward
            || self.transaction_before_referral
    }

    pub fn is_valid(&self) -> bool {
        self.qualifies() && !self.disqualified()
    }
}

/// Evaluate every rule against one row.
pub fn evaluate_row(facts: &ReferralFacts, now: DateTime<FixedOffset>) -> RuleOutcome {
    let has_reward = facts.reward_value_present;
    let has_transaction = facts.transaction_id_present;
    let success = facts.description_is(STATUS_SUCCESS);

    RuleOutcome {
        paid_reward: has_reward
            && success
            && has_transaction
            && facts.transaction_is_paid()
            && facts.transaction_type.as_deref() == Some(TRANSACTION_NEW)
            && facts.transaction_after_referral()
            && facts.transaction_in_referral_month()
            && facts.membership_active(now)
            && !facts.is_deleted
            && facts.is_reward_granted,
        pending_without_reward: !has_reward
            && (facts.description_is(STATUS_PENDING) || facts.description_is(STATUS_FAILED)),
        reward_without_success: has_reward && !success,
        reward_without_transaction: has_reward && !has_transaction,
        unrewarded_paid_before_referral: !has_reward
            && has_transaction
            && facts.transaction_is_paid()
            && facts.transaction_before_referral(),
        success_without_reward: success && !has_reward,
        transaction_before_referral: facts.transaction_before_referral(),
    }
}

/// Counts from one evaluation pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RuleSummary {
    /// Instant the rules were evaluated against.
    pub reference_time: DateTime<FixedOffset>,
    pub rows: usize,
    pub valid: usize,
    pub invalid: usize,
    pub reward_without_success: usize,
    pub reward_without_transaction: usize,
    pub unrewarded_paid_before_referral: usize,
    pub success_without_reward: usize,
    pub transaction_before_referral: usize,
}

impl RuleSummary {
    fn record(&mut self, outcome: &RuleOutcome) {
        self.rows += 1;
        if outcome.is_valid() {
            self.valid += 1;
        } else {
            self.invalid += 1;
        }
        self.reward_without_success += usize::from(outcome.reward_without_success);
        self.reward_without_transaction += usize::from(outcome.reward_without_transaction);
        self.unrewarded_paid_before_referral += usize::from(outcome.unrewarded_paid_before_referral);
        self.success_without_reward += usize::from(outcome.success_without_reward);
        self.transaction_before_referral += usize::from(outcome.transaction_before_referral);
    }
}

/// Read the rule inputs of every row.
///
/// Timestamp columns are accepted as `Datetime` or text, flag columns as
/// `Boolean`, text or numbers. Missing columns read as null.
pub fn collect_facts(df: &DataFrame) -> Result<Vec<ReferralFacts>> {
    let reward_value = column_presence(df, "reward_value");
    let description = column_text_values(df, "description");
    let transaction_id = column_presence(df, "transaction_id");
    let transaction_status = column_text_values(df, "transaction_status");
    let transaction_type = column_text_values(df, "transaction_type");
    let transaction_at = column_timestamps(df, "transaction_at")?;
    let referral_at = column_timestamps(df, "referral_at")?;
    let membership_expired_date = column_timestamps(df, "membership_expired_date")?;
    let is_deleted = column_flags(df, "is_deleted");
    let is_reward_granted = column_flags(df, "is_reward_granted");

    Ok((0..df.height())
        .map(|idx| ReferralFacts {
            reward_value_present: reward_value[idx],
            description: description[idx].clone(),
            transaction_id_present: transaction_id[idx],
            transaction_status: transaction_status[idx].clone(),
            transaction_type: transaction_type[idx].clone(),
            transaction_at: transaction_at[idx],
            referral_at: referral_at[idx],
            membership_expired_date: membership_expired_date[idx],
            is_deleted: is_deleted[idx],
            is_reward_granted: is_reward_granted[idx],
        })
        .collect())
}

/// Append `is_business_logic_valid` to the referral view.
///
/// Existing timestamp and flag inputs are rewritten with their typed form so
/// the output matches what the rules saw.
pub fn evaluate_business_logic(df: &mut DataFrame, clock: &dyn Clock) -> Result<RuleSummary> {
    let span = info_span!("rules");
    let _guard = span.enter();
    let start = Instant::now();

    let now = clock.now();
    let facts = collect_facts(df)?;
    coerce_rule_inputs(df)?;

    let mut summary = RuleSummary {
        reference_time: now,
        ..RuleSummary::default()
    };
    let mut verdicts = Vec::with_capacity(facts.len());
    for row in &facts {
        let outcome = evaluate_row(row, now);
        summary.record(&outcome);
        verdicts.push(outcome.is_valid());
    }
    df.with_column(Series::new(VALIDITY_COLUMN.into(), verdicts))?;

    info!(
        rows = summary.rows,
        valid = summary.valid,
        invalid = summary.invalid,
        reference = %now.to_rfc3339(),
        duration_ms = start.elapsed().as_millis(),
        "business rules evaluated"
    );
    debug!(
        reward_without_success = summary.reward_without_success,
        reward_without_transaction = summary.reward_without_transaction,
        unrewarded_paid_before_referral = summary.unrewarded_paid_before_referral,
        success_without_reward = summary.success_without_reward,
        transaction_before_referral = summary.transaction_before_referral,
        "disqualifier counts"
    );
    Ok(summary)
}

fn coerce_rule_inputs(df: &mut DataFrame) -> Result<()> {
    for name in TIMESTAMP_COLUMNS {
        if df.column(name).is_err() {
            continue;
        }
        let values = column_timestamps(df, name)?;
        df.with_column(timestamp_series(name, &values)?)?;
    }
    for name in FLAG_COLUMNS {
        if df.column(name).is_err() {
            continue;
        }
        let flags = column_flags(df, name);
        df.with_column(Series::new(name.into(), flags))?;
    }
    Ok(())
}
