//! Static API credentials for the timeline endpoint.
//!
//! Read once at startup from a local JSON file when present, otherwise from
//! process environment variables, and then handed to the client explicitly.

use std::path::Path;

use serde::Deserialize;

use crate::ConfigError;

const CREDENTIAL_KEYS: [&str; 4] = [
    "CONSUMER_KEY",
    "CONSUMER_SECRET",
    "ACCESS_TOKEN",
    "ACCESS_SECRET",
];

/// The four-secret credential set issued with a developer app.
///
/// The client authenticates app-only: the consumer pair is exchanged for a
/// bearer token and nothing else is sent. The access pair is only checked to
/// be present.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub consumer_key: String,
    pub consumer_secret: String,
    /// Required and validated, never sent.
    pub access_token: String,
    /// Required and validated, never sent.
    pub access_secret: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("consumer_key", &"[redacted]")
            .field("consumer_secret", &"[redacted]")
            .field("access_token", &"[redacted]")
            .field("access_secret", &"[redacted]")
            .finish()
    }
}

#[derive(Deserialize)]
#[allow(clippy::struct_field_names)]
struct CredentialsFile {
    #[serde(rename = "CONSUMER_KEY")]
    consumer_key: Option<String>,
    #[serde(rename = "CONSUMER_SECRET")]
    consumer_secret: Option<String>,
    #[serde(rename = "ACCESS_TOKEN")]
    access_token: Option<String>,
    #[serde(rename = "ACCESS_SECRET")]
    access_secret: Option<String>,
}

/// Load credentials from `path` if it exists, otherwise through `lookup`
/// (normally `std::env::var`).
///
/// # Errors
///
/// Returns [`ConfigError::CredentialsFile`] if the file exists but cannot be
/// read or parsed, and [`ConfigError::MissingCredential`] naming the first
/// absent or empty key.
pub fn load_credentials<F>(path: &Path, lookup: F) -> Result<Credentials, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let values: [Option<String>; 4] = if path.exists() {
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::CredentialsFile {
                path: path.display().to_string(),
                reason: e.to_string(),
            })?;
        let file: CredentialsFile =
            serde_json::from_str(&content).map_err(|e| ConfigError::CredentialsFile {
                path: path.display().to_string(),
                reason: e.to_string(),
            })?;
        [
            file.consumer_key,
            file.consumer_secret,
            file.access_token,
            file.access_secret,
        ]
    } else {
        CREDENTIAL_KEYS.map(|key| lookup(key).ok())
    };

    let [consumer_key, consumer_secret, access_token, access_secret] = values;
    Ok(Credentials {
        consumer_key: require(CREDENTIAL_KEYS[0], consumer_key)?,
        consumer_secret: require(CREDENTIAL_KEYS[1], consumer_secret)?,
        access_token: require(CREDENTIAL_KEYS[2], access_token)?,
        access_secret: require(CREDENTIAL_KEYS[3], access_secret)?,
    })
}

fn require(key: &str, value: Option<String>) -> Result<String, ConfigError> {
    value
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| ConfigError::MissingCredential(key.to_string()))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::env::VarError;

    use super::*;

    fn lookup_from_map<'a>(
        map: &'a HashMap<&'a str, &'a str>,
    ) -> impl Fn(&str) -> Result<String, VarError> + 'a {
        move |key| {
            map.get(key)
                .map(|v| (*v).to_string())
                .ok_or(VarError::NotPresent)
        }
    }

    fn full_env<'a>() -> HashMap<&'a str, &'a str> {
        let mut m = HashMap::new();
        m.insert("CONSUMER_KEY", "ck");
        m.insert("CONSUMER_SECRET", "cs");
        m.insert("ACCESS_TOKEN", "at");
        m.insert("ACCESS_SECRET", "as");
        m
    }

    #[test]
    fn reads_from_env_when_file_missing() {
        let map = full_env();
        let creds = load_credentials(Path::new("/no/such/creds.json"), lookup_from_map(&map))
            .expect("env credentials should load");
        assert_eq!(creds.consumer_key, "ck");
        assert_eq!(creds.consumer_secret, "cs");
        assert_eq!(creds.access_token, "at");
        assert_eq!(creds.access_secret, "as");
    }

    #[test]
    fn missing_env_var_is_named() {
        let mut map = full_env();
        map.remove("ACCESS_TOKEN");
        let result = load_credentials(Path::new("/no/such/creds.json"), lookup_from_map(&map));
        assert!(
            matches!(result, Err(ConfigError::MissingCredential(ref k)) if k == "ACCESS_TOKEN"),
            "expected MissingCredential(ACCESS_TOKEN), got: {result:?}"
        );
    }

    #[test]
    fn access_pair_is_required_alongside_consumer_pair() {
        let mut map = full_env();
        map.remove("ACCESS_SECRET");
        let result = load_credentials(Path::new("/no/such/creds.json"), lookup_from_map(&map));
        assert!(matches!(result, Err(ConfigError::MissingCredential(ref k)) if k == "ACCESS_SECRET"));
    }

    #[test]
    fn blank_env_var_counts_as_missing() {
        let mut map = full_env();
        map.insert("CONSUMER_SECRET", "   ");
        let result = load_credentials(Path::new("/no/such/creds.json"), lookup_from_map(&map));
        assert!(matches!(result, Err(ConfigError::MissingCredential(ref k)) if k == "CONSUMER_SECRET"));
    }

    #[test]
    fn file_takes_precedence_over_env() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("twitter-credentials.json");
        std::fs::write(
            &path,
            r#"{"CONSUMER_KEY":"fk","CONSUMER_SECRET":"fs","ACCESS_TOKEN":"ft","ACCESS_SECRET":"fa"}"#,
        )
        .unwrap();
        let map = full_env();
        let creds = load_credentials(&path, lookup_from_map(&map)).unwrap();
        assert_eq!(creds.consumer_key, "fk");
        assert_eq!(creds.access_secret, "fa");
    }

    #[test]
    fn file_with_missing_key_does_not_fall_back_to_env() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("twitter-credentials.json");
        std::fs::write(&path, r#"{"CONSUMER_KEY":"fk","CONSUMER_SECRET":"fs"}"#).unwrap();
        let map = full_env();
        let result = load_credentials(&path, lookup_from_map(&map));
        assert!(matches!(result, Err(ConfigError::MissingCredential(ref k)) if k == "ACCESS_TOKEN"));
    }

    #[test]
    fn malformed_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("twitter-credentials.json");
        std::fs::write(&path, "not json").unwrap();
        let map = full_env();
        let result = load_credentials(&path, lookup_from_map(&map));
        assert!(matches!(result, Err(ConfigError::CredentialsFile { .. })));
    }

    #[test]
    fn debug_redacts_secrets() {
        let mut map = full_env();
        map.insert("CONSUMER_SECRET", "hunter2-consumer");
        let creds =
            load_credentials(Path::new("/no/such/creds.json"), lookup_from_map(&map)).unwrap();
        let rendered = format!("{creds:?}");
        assert!(!rendered.contains("hunter2"));
        assert!(rendered.contains("[redacted]"));
    }
}
