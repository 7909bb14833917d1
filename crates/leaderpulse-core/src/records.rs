//! Record types shared by the collector, the store and the analysis pipeline.

use chrono::{DateTime, Datelike, Days, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// One collected post. Field order is the column order of the raw table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostRecord {
    /// Timeline id; unique across the dataset and increasing with creation time.
    pub id: u64,
    /// Tracked handle the post was collected for.
    pub handle: String,
    /// Author display name at collection time.
    pub user_name: String,
    pub created_at: DateTime<Utc>,
    /// UTC calendar date of `created_at`.
    pub date: NaiveDate,
    /// Monday of the week containing `date`.
    pub date_week: NaiveDate,
    /// Language code as reported by the API; not filtered here.
    pub lang: String,
    pub full_text: String,
    pub is_retweet: bool,
    pub retweet_count: u64,
    pub favorite_count: u64,
    pub location: String,
    pub place: String,
    /// Hashtags without `#`, space separated.
    pub hashtags: String,
}

impl PostRecord {
    /// Build a record, deriving `date` and `date_week` from `created_at`.
    #[must_use]
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: u64,
        handle: &str,
        user_name: &str,
        created_at: DateTime<Utc>,
        lang: &str,
        full_text: &str,
        is_retweet: bool,
        retweet_count: u64,
        favorite_count: u64,
    ) -> Self {
        let date = created_at.date_naive();
        Self {
            id,
            handle: handle.to_string(),
            user_name: user_name.to_string(),
            created_at,
            date,
            date_week: week_start(date),
            lang: lang.to_string(),
            full_text: full_text.to_string(),
            is_retweet,
            retweet_count,
            favorite_count,
            location: String::new(),
            place: String::new(),
            hashtags: String::new(),
        }
    }
}

/// Monday on or before `date`.
#[must_use]
pub fn week_start(date: NaiveDate) -> NaiveDate {
    let offset = u64::from(date.weekday().num_days_from_monday());
    date.checked_sub_days(Days::new(offset)).unwrap_or(date)
}

/// A post plus its derived analytic columns. The raw text is never modified.
#[derive(Debug, Clone, PartialEq)]
pub struct CleanedPost {
    pub post: PostRecord,
    /// Normalized token string; may be empty.
    pub clean_text: String,
    /// Raw text with display break markers inserted.
    pub break_text: String,
    /// In `[-1.0, 1.0]`.
    pub polarity: f64,
    /// In `[0.0, 1.0]`.
    pub subjectivity: f64,
    /// `(about_<key>, flag)` per roster entity, in roster order.
    pub mentions: Vec<(String, bool)>,
}

/// One `(term, handle)` row of a word or phrase frequency table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrequencyRecord {
    pub term: String,
    pub handle: String,
    /// Occurrences of `term` in this handle's texts.
    pub count: u64,
    /// Occurrences of `term` across all handles.
    pub total_count: u64,
    /// 1-based rank of `term` by `total_count`, ties in first-seen order.
    pub rank: usize,
}
