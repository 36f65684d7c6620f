//! Output writers for the referral pipeline.
//!
//! Cleaned tables go to `<output>/csv_cleaned/<table>.csv` and the joined
//! view to `<output>/csv_joined/main_table.csv`.

mod csv;
mod error;

pub use csv::{CLEANED_DIR, DATETIME_FORMAT, JOINED_DIR, ensure_output_dir, write_csv_table};
pub use error::{OutputError, Result};
