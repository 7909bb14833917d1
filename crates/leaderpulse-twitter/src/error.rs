use thiserror::Error;

/// Errors returned by the timeline client and tweet conversion.
#[derive(Debug, Error)]
pub enum TwitterError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// HTTP 429. `retry_after_secs` comes from `Retry-After` or `x-rate-limit-reset`.
    #[error("rate limited by timeline API (retry after {retry_after_secs:?}s)")]
    RateLimited { retry_after_secs: Option<u64> },

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// Token exchange was refused or returned an unusable token.
    #[error("authentication failed: {0}")]
    Auth(String),

    #[error("invalid base URL \"{base_url}\": {reason}")]
    InvalidBaseUrl { base_url: String, reason: String },

    /// A tweet on an otherwise valid page could not be converted.
    #[error("malformed tweet {id}: {reason}")]
    MalformedTweet { id: u64, reason: String },
}
