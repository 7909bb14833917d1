//! HTTP client for the v1.1 user-timeline endpoint.
//!
//! Authenticates once with an app-only bearer token and then issues one GET
//! per timeline page. Rate limits and transient server failures are retried
//! internally (see [`crate::retry`]), so callers only see final errors.

use std::time::Duration;

use reqwest::header::{HeaderMap, CONTENT_TYPE, RETRY_AFTER};
use reqwest::{Client, StatusCode, Url};
use serde::Deserialize;

use leaderpulse_core::{AppConfig, Credentials};

use crate::collector::TimelineSource;
use crate::error::TwitterError;
use crate::retry::retry_with_backoff;
use crate::types::{RawTweet, TimelineQuery};

const TOKEN_PATH: &str = "oauth2/token";
const TIMELINE_PATH: &str = "1.1/statuses/user_timeline.json";

/// Transport settings, usually taken from [`AppConfig`].
#[derive(Debug, Clone)]
pub struct ClientSettings {
    pub base_url: String,
    pub timeout_secs: u64,
    pub user_agent: String,
    pub max_retries: u32,
    pub backoff_base_secs: u64,
}

impl ClientSettings {
    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            base_url: config.twitter_base_url.clone(),
            timeout_secs: config.request_timeout_secs,
            user_agent: config.user_agent.clone(),
            max_retries: config.max_retries,
            backoff_base_secs: config.retry_backoff_base_secs,
        }
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    token_type: String,
    access_token: String,
}

/// Authenticated timeline client.
///
/// Construct with [`TwitterClient::connect`]; point `base_url` at a mock
/// server in tests.
pub struct TwitterClient {
    client: Client,
    base_url: Url,
    bearer_token: String,
    max_retries: u32,
    backoff_base_secs: u64,
}

impl std::fmt::Debug for TwitterClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TwitterClient")
            .field("base_url", &self.base_url.as_str())
            .field("max_retries", &self.max_retries)
            .finish_non_exhaustive()
    }
}

impl TwitterClient {
    /// Builds the HTTP client and exchanges the consumer key pair for a
    /// bearer token.
    ///
    /// # Errors
    ///
    /// - [`TwitterError::InvalidBaseUrl`] if `settings.base_url` does not parse.
    /// - [`TwitterError::Auth`] if the token endpoint rejects the credentials
    ///   or returns something other than a bearer token.
    /// - [`TwitterError::Http`] on network failure.
    pub async fn connect(
        credentials: &Credentials,
        settings: &ClientSettings,
    ) -> Result<Self, TwitterError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(settings.user_agent.as_str())
            .build()?;

        let base_url = parse_base_url(&settings.base_url)?;

        let bearer_token = retry_with_backoff(
            settings.max_retries,
            settings.backoff_base_secs,
            || request_bearer_token(&client, &base_url, credentials),
        )
        .await?;

        tracing::debug!(base_url = %base_url, "obtained bearer token");

        Ok(Self {
            client,
            base_url,
            bearer_token,
            max_retries: settings.max_retries,
            backoff_base_secs: settings.backoff_base_secs,
        })
    }

    /// Fetches one page of a user's timeline, newest first.
    ///
    /// # Errors
    ///
    /// - [`TwitterError::RateLimited`] or [`TwitterError::UnexpectedStatus`]
    ///   once retries are exhausted.
    /// - [`TwitterError::Auth`] on 401.
    /// - [`TwitterError::Deserialize`] if the body is not a list of tweets.
    pub async fn user_timeline(
        &self,
        query: &TimelineQuery,
    ) -> Result<Vec<RawTweet>, TwitterError> {
        let url = self.timeline_url(query)?;
        retry_with_backoff(self.max_retries, self.backoff_base_secs, || {
            self.fetch_page(&url, &query.screen_name)
        })
        .await
    }

    fn timeline_url(&self, query: &TimelineQuery) -> Result<Url, TwitterError> {
        let mut url = self
            .base_url
            .join(TIMELINE_PATH)
            .map_err(|e| TwitterError::InvalidBaseUrl {
                base_url: self.base_url.to_string(),
                reason: e.to_string(),
            })?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("screen_name", &query.screen_name);
            pairs.append_pair("count", &query.count.to_string());
            pairs.append_pair("exclude_replies", bool_param(query.exclude_replies));
            pairs.append_pair("include_rts", bool_param(query.include_retweets));
            pairs.append_pair("tweet_mode", "extended");
            pairs.append_pair("trim_user", "false");
            if let Some(max_id) = query.max_id {
                pairs.append_pair("max_id", &max_id.to_string());
            }
            if let Some(since_id) = query.since_id {
                pairs.append_pair("since_id", &since_id.to_string());
            }
        }
        Ok(url)
    }

    async fn fetch_page(&self, url: &Url, screen_name: &str) -> Result<Vec<RawTweet>, TwitterError> {
        let response = self
            .client
            .get(url.clone())
            .bearer_auth(&self.bearer_token)
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(TwitterError::RateLimited {
                retry_after_secs: retry_after_secs(response.headers()),
            });
        }
        if status == StatusCode::UNAUTHORIZED {
            return Err(TwitterError::Auth(format!(
                "timeline request for {screen_name} was unauthorized"
            )));
        }
        if !status.is_success() {
            return Err(TwitterError::UnexpectedStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| TwitterError::Deserialize {
            context: format!("user_timeline(screen_name={screen_name})"),
            source: e,
        })
    }
}

impl TimelineSource for TwitterClient {
    async fn user_timeline(&self, query: &TimelineQuery) -> Result<Vec<RawTweet>, TwitterError> {
        TwitterClient::user_timeline(self, query).await
    }
}

/// Ensure exactly one trailing slash so relative joins append to the path.
fn parse_base_url(base_url: &str) -> Result<Url, TwitterError> {
    let normalised = format!("{}/", base_url.trim_end_matches('/'));
    Url::parse(&normalised).map_err(|e| TwitterError::InvalidBaseUrl {
        base_url: base_url.to_owned(),
        reason: e.to_string(),
    })
}

async fn request_bearer_token(
    client: &Client,
    base_url: &Url,
    credentials: &Credentials,
) -> Result<String, TwitterError> {
    let url = base_url
        .join(TOKEN_PATH)
        .map_err(|e| TwitterError::InvalidBaseUrl {
            base_url: base_url.to_string(),
            reason: e.to_string(),
        })?;

    let response = client
        .post(url.clone())
        .basic_auth(&credentials.consumer_key, Some(&credentials.consumer_secret))
        .header(CONTENT_TYPE, "application/x-www-form-urlencoded;charset=UTF-8")
        .body("grant_type=client_credentials")
        .send()
        .await?;

    let status = response.status();
    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        return Err(TwitterError::Auth(format!(
            "token endpoint rejected credentials (HTTP {})",
            status.as_u16()
        )));
    }
    if status == StatusCode::TOO_MANY_REQUESTS {
        return Err(TwitterError::RateLimited {
            retry_after_secs: retry_after_secs(response.headers()),
        });
    }
    if !status.is_success() {
        return Err(TwitterError::UnexpectedStatus {
            status: status.as_u16(),
            url: url.to_string(),
        });
    }

    let body = response.text().await?;
    let token: TokenResponse =
        serde_json::from_str(&body).map_err(|e| TwitterError::Deserialize {
            context: "oauth2/token".to_owned(),
            source: e,
        })?;

    if !token.token_type.eq_ignore_ascii_case("bearer") {
        return Err(TwitterError::Auth(format!(
            "unexpected token type '{}'",
            token.token_type
        )));
    }
    if token.access_token.is_empty() {
        return Err(TwitterError::Auth("empty bearer token".to_owned()));
    }
    Ok(token.access_token)
}

fn bool_param(value: bool) -> &'static str {
    if value {
        "true"
    } else {
        "false"
    }
}

/// Seconds to wait, from `Retry-After` or else the `x-rate-limit-reset` epoch.
fn retry_after_secs(headers: &HeaderMap) -> Option<u64> {
    if let Some(secs) = headers
        .get(RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u64>().ok())
    {
        return Some(secs);
    }
    let reset = headers
        .get("x-rate-limit-reset")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<i64>().ok())?;
    let now = chrono::Utc::now().timestamp();
    Some(u64::try_from(reset.saturating_sub(now)).unwrap_or(0))
}
