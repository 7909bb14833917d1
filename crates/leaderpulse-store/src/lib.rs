//! Flat-file persistence for the leaderpulse dataset.
//!
//! Four CSV tables live under the data directory: raw posts, cleaned posts,
//! word counts and phrase counts. Every table is read whole and written whole;
//! writes land in a sibling temp file that is renamed over the target.

pub mod merge;
pub mod stats;
pub mod tables;

pub use merge::{merge, MergeOutcome, MIN_NEW_RECORDS_TO_PERSIST};
pub use stats::{handle_stats, HandleStats};
pub use tables::{
    clean_columns, read_posts, read_posts_if_exists, write_cleaned, write_frequencies,
    write_posts, FREQUENCY_COLUMNS, RAW_COLUMNS,
};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error in {path}: {source}")]
    Csv {
        path: String,
        #[source]
        source: csv::Error,
    },

    /// The header row does not match the expected column list exactly.
    #[error("schema mismatch in {path}: expected columns [{expected}], found [{found}]")]
    SchemaMismatch {
        path: String,
        expected: String,
        found: String,
    },

    #[error("invalid row at {path}:{line}: {reason}")]
    InvalidRow {
        path: String,
        line: u64,
        reason: String,
    },
}
