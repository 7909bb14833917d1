//! Shared domain types and configuration for leaderpulse.
//!
//! Holds the post/frequency records that flow between the collector, the
//! store and the analysis crates, the tracked-entity roster, and the
//! environment-driven application config.

pub mod app_config;
pub mod config;
pub mod credentials;
pub mod entities;
pub mod records;

pub use app_config::{AppConfig, MentionMatch, NormalizeMode};
pub use config::{load_app_config, load_app_config_from_env};
pub use credentials::{load_credentials, Credentials};
pub use entities::{load_entities, EntitiesFile, EntityConfig};
pub use records::{week_start, CleanedPost, FrequencyRecord, PostRecord};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read entities file {path}: {source}")]
    EntitiesFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse entities file: {0}")]
    EntitiesFileParse(#[from] serde_yaml::Error),

    #[error("entities validation failed: {0}")]
    Validation(String),

    #[error("failed to read credentials file {path}: {reason}")]
    CredentialsFile { path: String, reason: String },

    #[error("missing credential {0}: not in credentials file or environment")]
    MissingCredential(String),
}
