//! Referral transformations.
//!
//! - **normalize**: per-table null filling, timestamp and integer coercion,
//!   duplicate key removal
//! - **join**: the ordered left-join chain that builds the referral view
//! - **enrich**: title-casing and the referral channel column
//! - **rules**: reward validity evaluation
//! - **pipeline**: join, enrich and evaluate in one call
//!
//! ```ignore
//! use referral_model::{JoinPlan, SchemaRegistry};
//! use referral_transform::{SystemClock, build_main_table, normalize_tables};
//!
//! normalize_tables(&mut tables, &SchemaRegistry::default())?;
//! let view = build_main_table(&tables, &JoinPlan::default(), &SystemClock)?;
//! println!("{} valid of {}", view.rules.valid, view.rules.rows);
//! ```

pub mod clock;
pub mod datetime;
pub mod enrich;
pub mod error;
pub mod frame;
pub mod join;
pub mod normalize;
pub mod pipeline;
pub mod rules;
pub mod values;

pub use clock::{Clock, FixedClock, SystemClock};
pub use datetime::{JAKARTA_TZ, parse_timestamp};
pub use enrich::{add_referral_source_category, apply_title_case, referral_source_category, title_case};
pub use error::{Result, TransformError};
pub use frame::{TableFrame, find_table};
pub use join::{StepOutcome, apply_join_step, build_referral_view, fill_text_sentinel};
pub use normalize::{NormalizeReport, normalize_table, normalize_tables};
pub use pipeline::{ReferralView, build_main_table};
pub use rules::{RuleOutcome, RuleSummary, ReferralFacts, VALIDITY_COLUMN, evaluate_business_logic, evaluate_row};
