use std::path::PathBuf;

use chrono::NaiveDate;

/// Which text-cleaning strategy the normalizer runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NormalizeMode {
    /// URL/punctuation/stopword stripping only.
    StripOnly,
    /// Stripping plus singularization and POS-aware lemmatization.
    Lemmatize,
}

impl std::fmt::Display for NormalizeMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NormalizeMode::StripOnly => write!(f, "strip"),
            NormalizeMode::Lemmatize => write!(f, "lemmatize"),
        }
    }
}

/// How entity aliases are matched against post text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MentionMatch {
    /// Case-insensitive substring match; "may" matches inside "mayor".
    Substring,
    /// Case-insensitive match on whole alphanumeric word boundaries.
    WordBoundary,
}

impl std::fmt::Display for MentionMatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MentionMatch::Substring => write!(f, "substring"),
            MentionMatch::WordBoundary => write!(f, "word"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub data_dir: PathBuf,
    pub entities_path: PathBuf,
    pub credentials_path: PathBuf,
    pub log_level: String,
    pub twitter_base_url: String,
    pub request_timeout_secs: u64,
    pub user_agent: String,
    pub max_retries: u32,
    pub retry_backoff_base_secs: u64,
    pub page_size: u32,
    pub max_iterations: usize,
    pub floor_date: NaiveDate,
    pub include_retweets: bool,
    pub normalize_mode: NormalizeMode,
    pub mention_match: MentionMatch,
    pub word_min_df: usize,
    pub phrase_ngram_min: usize,
    pub phrase_ngram_max: usize,
    pub phrase_min_df: usize,
    pub max_frequency_rows: usize,
}

impl AppConfig {
    #[must_use]
    pub fn raw_table_path(&self) -> PathBuf {
        self.data_dir.join("twitter-data-raw.csv")
    }

    #[must_use]
    pub fn clean_table_path(&self) -> PathBuf {
        self.data_dir.join("twitter-data-clean.csv")
    }

    #[must_use]
    pub fn word_count_path(&self) -> PathBuf {
        self.data_dir.join("word-count.csv")
    }

    #[must_use]
    pub fn phrase_count_path(&self) -> PathBuf {
        self.data_dir.join("phrase-count.csv")
    }
}
