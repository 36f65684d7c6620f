//! Referral data ingestion.
//!
//! Finds `<table>.csv` files in a source directory and loads each into a
//! Polars DataFrame named after the file stem.
//!
//! ```ignore
//! use std::path::Path;
//! use referral_ingest::load_tables;
//!
//! let tables = load_tables(Path::new("csv_sources"))?;
//! for table in &tables {
//!     println!("{}: {} rows", table.name, table.data.height());
//! }
//! ```

mod csv;
mod discovery;
mod error;

pub use csv::{RawTable, load_tables, read_csv_table};
pub use discovery::{list_csv_files, table_name_for};
pub use error::{IngestError, Result};
