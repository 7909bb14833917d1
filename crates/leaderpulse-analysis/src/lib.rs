//! Text analytics over collected posts.
//!
//! The [`Normalizer`] cleans raw text, [`sentiment`] scores it,
//! [`MentionMatcher`] flags cross-mentions, and [`frequency`] builds the word
//! and phrase tables. [`analyze`] runs all of them over a dataset.

pub mod frequency;
pub mod lemma;
pub mod mentions;
pub mod normalize;
pub mod pipeline;
pub mod sentiment;

mod stopwords;

pub use frequency::{count_terms, FrequencyOptions};
pub use mentions::MentionMatcher;
pub use normalize::{break_text, Normalizer, BREAK_MARKER};
pub use pipeline::{analyze, AnalysisOptions, AnalysisOutput};
pub use sentiment::{score_text, score_texts};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("invalid analysis options: {0}")]
    InvalidOptions(String),

    #[error("invalid mention pattern: {0}")]
    Pattern(#[from] regex::Error),
}
