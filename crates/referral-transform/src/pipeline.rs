//! Join, enrich and evaluate in one pass.

use polars::prelude::DataFrame;
use tracing::debug;

use referral_model::JoinPlan;

use crate::clock::Clock;
use crate::enrich::{add_referral_source_category, apply_title_case};
use crate::error::Result;
use crate::frame::TableFrame;
use crate::join::{build_referral_view, fill_text_sentinel};
use crate::rules::{RuleSummary, evaluate_business_logic};

/// The finished referral view and its rule counts.
#[derive(Debug, Clone)]
pub struct ReferralView {
    pub data: DataFrame,
    pub rules: RuleSummary,
}

/// Build the main table from normalized tables.
///
/// Rules are evaluated on the typed view; only afterwards are text nulls
/// replaced with the empty string.
pub fn build_main_table(tables: &[TableFrame], plan: &JoinPlan, clock: &dyn Clock) -> Result<ReferralView> {
    let mut data = build_referral_view(tables, plan)?;
    apply_title_case(&mut data)?;
    add_referral_source_category(&mut data)?;
    let rules = evaluate_business_logic(&mut data, clock)?;
    let filled = fill_text_sentinel(&mut data)?;
    debug!(filled, "text nulls replaced with empty string");
    Ok(ReferralView { data, rules })
}
