use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// A tracked public handle and the keywords that count as mentioning it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityConfig {
    /// Timeline screen name, e.g. `JustinTrudeau`.
    pub handle: String,
    /// Display name, e.g. `Justin Trudeau`.
    pub name: String,
    /// Short key used in derived column names (`about_<key>`).
    pub key: String,
    /// Case-insensitive alias keywords for mention detection.
    pub aliases: Vec<String>,
}

impl EntityConfig {
    /// Column name of this entity's mention flag in the cleaned table.
    #[must_use]
    pub fn mention_column(&self) -> String {
        format!("about_{}", self.key.to_lowercase())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct EntitiesFile {
    pub entities: Vec<EntityConfig>,
}

impl EntitiesFile {
    /// Restrict the roster to one handle (case-insensitive). `None` if absent.
    #[must_use]
    pub fn only(&self, handle: &str) -> Option<EntityConfig> {
        self.entities
            .iter()
            .find(|e| e.handle.eq_ignore_ascii_case(handle))
            .cloned()
    }
}

/// Load and validate the entity roster from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_entities(path: &Path) -> Result<EntitiesFile, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::EntitiesFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    let entities_file: EntitiesFile =
        serde_yaml::from_str(&content).map_err(ConfigError::EntitiesFileParse)?;

    validate_entities(&entities_file)?;

    Ok(entities_file)
}

fn validate_entities(entities_file: &EntitiesFile) -> Result<(), ConfigError> {
    if entities_file.entities.is_empty() {
        return Err(ConfigError::Validation(
            "at least one entity must be configured".to_string(),
        ));
    }

    let mut seen_handles = HashSet::new();
    let mut seen_keys = HashSet::new();

    for entity in &entities_file.entities {
        if entity.handle.trim().is_empty() {
            return Err(ConfigError::Validation(
                "entity handle must be non-empty".to_string(),
            ));
        }

        if entity.key.trim().is_empty()
            || !entity
                .key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_')
        {
            return Err(ConfigError::Validation(format!(
                "entity '{}' has invalid key '{}'; use ascii letters, digits or '_'",
                entity.handle, entity.key
            )));
        }

        if entity.aliases.is_empty() || entity.aliases.iter().any(|a| a.trim().is_empty()) {
            return Err(ConfigError::Validation(format!(
                "entity '{}' needs at least one non-empty alias",
                entity.handle
            )));
        }

        if !seen_handles.insert(entity.handle.to_lowercase()) {
            return Err(ConfigError::Validation(format!(
                "duplicate entity handle: '{}'",
                entity.handle
            )));
        }

        if !seen_keys.insert(entity.key.to_lowercase()) {
            return Err(ConfigError::Validation(format!(
                "duplicate entity key: '{}' (from handle '{}')",
                entity.key, entity.handle
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
#[path = "entities_test.rs"]
mod tests;
