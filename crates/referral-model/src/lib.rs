//! Data model for the referral reward pipeline.
//!
//! - **table**: logical table names recognized by the pipeline
//! - **schema**: per-table normalization schema and the registry holding them
//! - **join_plan**: the ordered, declarative left-join plan for the referral view
//! - **config**: JSON pipeline configuration overriding the defaults

pub mod config;
pub mod error;
pub mod join_plan;
pub mod schema;
pub mod table;

pub use config::PipelineConfig;
pub use error::{ConfigError, Result};
pub use join_plan::{JoinPlan, JoinStep};
pub use schema::{IntWidth, SchemaRegistry, TableSchema};
pub use table::{ANCHOR_TABLE, JOINED_TABLE, RECOGNIZED_TABLES, is_recognized_table};
