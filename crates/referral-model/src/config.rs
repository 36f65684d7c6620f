//! Pipeline configuration.
//!
//! The defaults describe the seven referral tables. A JSON file may override
//! individual table schemas and/or replace the join plan:
//!
//! ```json
//! {
//!   "tables": {
//!     "user_logs": { "datetime_columns": ["membership_expired_date"], "unique_key": "user_id" }
//!   },
//!   "join_plan": [
//!     { "table": "user_logs", "left_on": "referrer_id", "right_on": "user_id",
//!       "columns": ["user_id", "name"], "drop": ["user_id"] }
//!   ]
//! }
//! ```

use std::path::Path;

use serde::Deserialize;

use crate::error::{ConfigError, Result};
use crate::join_plan::JoinPlan;
use crate::schema::SchemaRegistry;

/// Schema registry and join plan consulted by every stage.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PipelineConfig {
    pub tables: SchemaRegistry,
    pub join_plan: JoinPlan,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ConfigFile {
    tables: Option<SchemaRegistry>,
    join_plan: Option<JoinPlan>,
}

impl PipelineConfig {
    /// Load defaults overlaid with the JSON file at `path`.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let file: ConfigFile =
            serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        let config = Self::default().with_overrides(file);
        config.join_plan.validate()?;
        Ok(config)
    }

    /// Load from `path` when given, otherwise return the defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    fn with_overrides(mut self, file: ConfigFile) -> Self {
        if let Some(tables) = file.tables {
            self.tables.merge(tables);
        }
        if let Some(plan) = file.join_plan {
            self.join_plan = plan;
        }
        self
    }
}
