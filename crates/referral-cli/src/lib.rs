//! CLI library components for the referral pipeline.

pub mod logging;
pub mod pipeline;
pub mod summary;
pub mod types;
