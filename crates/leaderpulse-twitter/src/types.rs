//! Wire types for the v1.1 `statuses/user_timeline` endpoint.
//!
//! Only the fields the dataset keeps are modelled; everything else in the
//! payload is ignored. `created_at` uses the fixed format
//! `Wed Oct 10 20:19:24 +0000 2018`.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use leaderpulse_core::PostRecord;

use crate::error::TwitterError;

const CREATED_AT_FORMAT: &str = "%a %b %d %H:%M:%S %z %Y";

/// Parameters of one timeline request. Exactly one handle per call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimelineQuery {
    pub screen_name: String,
    /// Page size, at most 200.
    pub count: u32,
    /// Only ids less than or equal to this ("older than" cursor).
    pub max_id: Option<u64>,
    /// Only ids strictly greater than this ("newer than" cursor).
    pub since_id: Option<u64>,
    pub exclude_replies: bool,
    pub include_retweets: bool,
}

impl TimelineQuery {
    #[must_use]
    pub fn new(screen_name: &str, count: u32, include_retweets: bool) -> Self {
        Self {
            screen_name: screen_name.to_string(),
            count,
            max_id: None,
            since_id: None,
            exclude_replies: true,
            include_retweets,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawTweet {
    pub id: u64,
    /// Present with `tweet_mode=extended`.
    pub full_text: Option<String>,
    /// Present in compatibility mode; used when `full_text` is absent.
    pub text: Option<String>,
    pub created_at: String,
    pub lang: Option<String>,
    #[serde(default)]
    pub retweet_count: u64,
    #[serde(default)]
    pub favorite_count: u64,
    #[serde(default)]
    pub user: RawUser,
    pub place: Option<RawPlace>,
    #[serde(default)]
    pub entities: RawEntities,
    pub retweeted_status: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawUser {
    #[serde(default)]
    pub id: u64,
    pub screen_name: Option<String>,
    pub name: Option<String>,
    pub location: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawPlace {
    pub full_name: Option<String>,
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawEntities {
    #[serde(default)]
    pub hashtags: Vec<RawHashtag>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawHashtag {
    pub text: String,
}

/// Parse the API's fixed `created_at` format into UTC.
///
/// # Errors
///
/// Returns the chrono parse error when the string does not match.
pub fn parse_created_at(raw: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    DateTime::parse_from_str(raw, CREATED_AT_FORMAT).map(|dt| dt.with_timezone(&Utc))
}

impl RawTweet {
    /// Text of the post, preferring the untruncated form.
    #[must_use]
    pub fn body(&self) -> &str {
        self.full_text
            .as_deref()
            .or(self.text.as_deref())
            .unwrap_or_default()
    }

    /// Convert into a dataset record attributed to `handle`.
    ///
    /// # Errors
    ///
    /// Returns [`TwitterError::MalformedTweet`] if `created_at` does not parse.
    pub fn into_post(self, handle: &str) -> Result<PostRecord, TwitterError> {
        let created_at =
            parse_created_at(&self.created_at).map_err(|e| TwitterError::MalformedTweet {
                id: self.id,
                reason: format!("unparseable created_at '{}': {e}", self.created_at),
            })?;

        let body = self.body().to_string();
        let is_retweet = self.retweeted_status.is_some() || body.starts_with("RT @");
        let user_name = self.user.name.clone().unwrap_or_default();

        let mut post = PostRecord::new(
            self.id,
            handle,
            &user_name,
            created_at,
            self.lang.as_deref().unwrap_or_default(),
            &body,
            is_retweet,
            self.retweet_count,
            self.favorite_count,
        );
        post.location = self.user.location.unwrap_or_default();
        post.place = self
            .place
            .and_then(|p| p.full_name.or(p.name))
            .unwrap_or_default();
        post.hashtags = self
            .entities
            .hashtags
            .into_iter()
            .map(|h| h.text)
            .collect::<Vec<_>>()
            .join(" ");

        Ok(post)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, TimeZone};

    use super::*;

    fn tweet_json() -> serde_json::Value {
        serde_json::json!({
            "id": 1_273_000_000_000_000_001_u64,
            "full_text": "Canada's plan for #jobs and #climate https://t.co/abc",
            "created_at": "Wed Jun 10 14:05:09 +0000 2020",
            "lang": "en",
            "retweet_count": 120,
            "favorite_count": 800,
            "user": {
                "id": 14_260_960,
                "screen_name": "JustinTrudeau",
                "name": "Justin Trudeau",
                "location": "Ottawa, Canada"
            },
            "place": { "full_name": "Ottawa, Ontario", "name": "Ottawa" },
            "entities": { "hashtags": [ { "text": "jobs" }, { "text": "climate" } ] },
            "extra_field": { "ignored": true }
        })
    }

    #[test]
    fn parse_created_at_fixed_format() {
        let dt = parse_created_at("Wed Jun 10 14:05:09 +0000 2020").unwrap();
        assert_eq!(dt, Utc.with_ymd_and_hms(2020, 6, 10, 14, 5, 9).unwrap());
    }

    #[test]
    fn parse_created_at_converts_offset_to_utc() {
        let dt = parse_created_at("Wed Jun 10 23:30:00 -0500 2020").unwrap();
        assert_eq!(dt, Utc.with_ymd_and_hms(2020, 6, 11, 4, 30, 0).unwrap());
    }

    #[test]
    fn parse_created_at_rejects_iso_format() {
        assert!(parse_created_at("2020-06-10T14:05:09Z").is_err());
    }

    #[test]
    fn into_post_maps_all_fields() {
        let tweet: RawTweet = serde_json::from_value(tweet_json()).unwrap();
        let post = tweet.into_post("JustinTrudeau").unwrap();
        assert_eq!(post.id, 1_273_000_000_000_000_001);
        assert_eq!(post.handle, "JustinTrudeau");
        assert_eq!(post.user_name, "Justin Trudeau");
        assert_eq!(post.lang, "en");
        assert_eq!(post.retweet_count, 120);
        assert_eq!(post.favorite_count, 800);
        assert_eq!(post.location, "Ottawa, Canada");
        assert_eq!(post.place, "Ottawa, Ontario");
        assert_eq!(post.hashtags, "jobs climate");
        assert!(!post.is_retweet);
        assert_eq!(post.date, NaiveDate::from_ymd_opt(2020, 6, 10).unwrap());
        assert_eq!(post.date_week, NaiveDate::from_ymd_opt(2020, 6, 8).unwrap());
    }

    #[test]
    fn into_post_falls_back_to_compat_text() {
        let mut json = tweet_json();
        json.as_object_mut().unwrap().remove("full_text");
        json["text"] = serde_json::json!("short text");
        let tweet: RawTweet = serde_json::from_value(json).unwrap();
        assert_eq!(tweet.into_post("JustinTrudeau").unwrap().full_text, "short text");
    }

    #[test]
    fn retweet_detected_from_payload_or_prefix() {
        let mut json = tweet_json();
        json["retweeted_status"] = serde_json::json!({ "id": 1 });
        let tweet: RawTweet = serde_json::from_value(json).unwrap();
        assert!(tweet.into_post("JustinTrudeau").unwrap().is_retweet);

        let mut json = tweet_json();
        json["full_text"] = serde_json::json!("RT @CanadianPM: statement");
        let tweet: RawTweet = serde_json::from_value(json).unwrap();
        assert!(tweet.into_post("JustinTrudeau").unwrap().is_retweet);
    }

    #[test]
    fn into_post_rejects_bad_timestamp() {
        let mut json = tweet_json();
        json["created_at"] = serde_json::json!("yesterday");
        let tweet: RawTweet = serde_json::from_value(json).unwrap();
        let err = tweet.into_post("JustinTrudeau").unwrap_err();
        assert!(matches!(err, TwitterError::MalformedTweet { id, .. } if id == 1_273_000_000_000_000_001));
    }

    #[test]
    fn trimmed_user_payload_still_deserializes() {
        let json = serde_json::json!({
            "id": 5,
            "full_text": "hi",
            "created_at": "Wed Jun 10 14:05:09 +0000 2020",
            "user": { "id": 1 }
        });
        let tweet: RawTweet = serde_json::from_value(json).unwrap();
        let post = tweet.into_post("ElizabethMay").unwrap();
        assert_eq!(post.user_name, "");
        assert_eq!(post.lang, "");
        assert_eq!(post.place, "");
    }

    #[test]
    fn query_defaults_exclude_replies() {
        let q = TimelineQuery::new("JustinTrudeau", 200, false);
        assert!(q.exclude_replies);
        assert!(q.max_id.is_none());
        assert!(q.since_id.is_none());
    }
}
