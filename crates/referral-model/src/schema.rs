//! Per-table normalization schema.
//!
//! A [`TableSchema`] declares which columns hold timestamps, which columns
//! must be cast to a fixed integer width, and which column identifies a row.
//! The [`SchemaRegistry`] maps table names to schemas and is the only place
//! the normalizer looks these up.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::table::{
    ANCHOR_TABLE, LEADS_TABLE, REFERRAL_LOGS_TABLE, REWARDS_TABLE, STATUSES_TABLE,
    TRANSACTIONS_TABLE, USERS_TABLE,
};

/// Target integer width for numeric coercion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IntWidth {
    Int8,
    Int16,
    Int32,
    Int64,
}

impl IntWidth {
    pub fn as_str(self) -> &'static str {
        match self {
            IntWidth::Int8 => "int8",
            IntWidth::Int16 => "int16",
            IntWidth::Int32 => "int32",
            IntWidth::Int64 => "int64",
        }
    }
}

impl std::fmt::Display for IntWidth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Normalization schema for one table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableSchema {
    /// Columns parsed to timezone-aware timestamps.
    pub datetime_columns: Vec<String>,
    /// Columns cast to the given integer width.
    pub numeric_columns: BTreeMap<String, IntWidth>,
    /// Column whose values must be unique after normalization.
    pub unique_key: Option<String>,
}

impl TableSchema {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_datetime_columns(mut self, columns: &[&str]) -> Self {
        self.datetime_columns = columns.iter().map(|c| (*c).to_string()).collect();
        self
    }

    #[must_use]
    pub fn with_numeric_column(mut self, column: &str, width: IntWidth) -> Self {
        self.numeric_columns.insert(column.to_string(), width);
        self
    }

    #[must_use]
    pub fn with_unique_key(mut self, column: &str) -> Self {
        self.unique_key = Some(column.to_string());
        self
    }
}

/// Table name to [`TableSchema`] lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SchemaRegistry {
    tables: BTreeMap<String, TableSchema>,
}

impl SchemaRegistry {
    /// An empty registry (every table passes through with null handling only).
    pub fn empty() -> Self {
        Self {
            tables: BTreeMap::new(),
        }
    }

    pub fn get(&self, table: &str) -> Option<&TableSchema> {
        self.tables.get(table)
    }

    /// Insert or replace the schema for `table`.
    pub fn insert(&mut self, table: impl Into<String>, schema: TableSchema) {
        self.tables.insert(table.into(), schema);
    }

    /// Replace entries of `self` with every entry of `other`.
    pub fn merge(&mut self, other: SchemaRegistry) {
        self.tables.extend(other.tables);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &TableSchema)> {
        self.tables
            .iter()
            .map(|(name, schema)| (name.as_str(), schema))
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

impl Default for SchemaRegistry {
    /// Schemas for the seven referral tables.
    fn default() -> Self {
        let mut registry = Self::empty();
        registry.insert(
            ANCHOR_TABLE,
            TableSchema::new()
                .with_datetime_columns(&["referral_at", "updated_at"])
                .with_numeric_column("user_referral_status_id", IntWidth::Int64)
                .with_numeric_column("referral_reward_id", IntWidth::Int64)
                .with_unique_key("referral_id"),
        );
        registry.insert(
            USERS_TABLE,
            TableSchema::new()
                .with_datetime_columns(&["membership_expired_date"])
                .with_numeric_column("id", IntWidth::Int64)
                .with_unique_key("id"),
        );
        registry.insert(
            LEADS_TABLE,
            TableSchema::new()
                .with_datetime_columns(&["created_at"])
                .with_numeric_column("id", IntWidth::Int64)
                .with_unique_key("id"),
        );
        registry.insert(
            REWARDS_TABLE,
            TableSchema::new()
                .with_datetime_columns(&["created_at"])
                .with_numeric_column("id", IntWidth::Int64)
                .with_numeric_column("reward_type", IntWidth::Int64)
                .with_unique_key("id"),
        );
        registry.insert(
            REFERRAL_LOGS_TABLE,
            TableSchema::new()
                .with_datetime_columns(&["created_at"])
                .with_numeric_column("id", IntWidth::Int64)
                .with_unique_key("id"),
        );
        registry.insert(
            STATUSES_TABLE,
            TableSchema::new()
                .with_datetime_columns(&["created_at"])
                .with_numeric_column("id", IntWidth::Int64)
                .with_unique_key("id"),
        );
        registry.insert(
            TRANSACTIONS_TABLE,
            TableSchema::new()
                .with_datetime_columns(&["transaction_at"])
                .with_unique_key("transaction_id"),
        );
        registry
    }
}
