use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use crate::error::{Error, Result};

/// Environment variable consulted before the stored key.
pub const API_KEY_ENV: &str = "LINEAR_API_KEY";

/// Literal prefix every stored tracker API key must carry.
pub const API_KEY_PREFIX: &str = "lin_api_";

/// Default settings file location, relative to the working directory.
pub fn default_path() -> PathBuf {
    PathBuf::from(".todolink").join("config.toml")
}

/// Persistent settings. Every field is optional; a missing API key disables
/// all gateway operations.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    pub api_key: Option<String>,
    pub team_id: Option<String>,
    pub project_id: Option<String>,
    pub cycle_id: Option<String>,
    pub status_id: Option<String>,
}

impl Settings {
    /// Load settings from the given file. A missing file yields empty
    /// settings rather than an error.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let settings: Settings = toml::from_str(&content)?;
        Ok(settings)
    }

    /// Resolve the API key: environment variable first, then the stored key.
    pub fn resolve_api_key(&self) -> Result<String> {
        resolve_with_env(std::env::var(API_KEY_ENV).ok(), self.api_key.as_deref())
    }
}

fn resolve_with_env(env_key: Option<String>, stored: Option<&str>) -> Result<String> {
    if let Some(key) = env_key
        && !key.is_empty()
    {
        debug!("using API key from ${API_KEY_ENV}");
        return Ok(key);
    }
    stored.map(str::to_string).ok_or(Error::MissingApiKey)
}

/// Validate a key about to be stored: it must carry the tracker's literal
/// prefix. Keys injected via the environment bypass this check.
pub fn validate_api_key(key: &str) -> Result<()> {
    if !key.starts_with(API_KEY_PREFIX) {
        return Err(Error::ConfigValidation(format!(
            "API key must start with '{API_KEY_PREFIX}'"
        )));
    }
    Ok(())
}

/// Write a single settings key, preserving everything else in the file.
pub fn store_key(path: &Path, key: &str, value: &str) -> Result<()> {
    if let Some(dir) = path.parent()
        && !dir.as_os_str().is_empty()
        && !dir.exists()
    {
        std::fs::create_dir_all(dir)?;
    }

    let mut table = if path.exists() {
        let existing = std::fs::read_to_string(path)?;
        if existing.trim().is_empty() {
            toml::Table::new()
        } else {
            existing.parse::<toml::Table>().map_err(Error::ConfigParse)?
        }
    } else {
        toml::Table::new()
    };

    table.insert(key.to_string(), toml::Value::String(value.to_string()));

    let content = toml::to_string(&table).map_err(|e| {
        Error::ConfigValidation(format!("failed to serialize {}: {e}", path.display()))
    })?;
    std::fs::write(path, content)?;
    debug!(key, path = %path.display(), "settings updated");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_missing_file_is_empty() {
        let tmp = tempfile::tempdir().unwrap();
        let settings = Settings::load(&tmp.path().join("config.toml")).unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_load_parses_known_keys() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("config.toml");
        std::fs::write(&path, "api_key = \"lin_api_abc\"\nteam_id = \"team-1\"\n").unwrap();
        let settings = Settings::load(&path).unwrap();
        assert_eq!(settings.api_key.as_deref(), Some("lin_api_abc"));
        assert_eq!(settings.team_id.as_deref(), Some("team-1"));
        assert_eq!(settings.project_id, None);
    }

    #[test]
    fn test_load_rejects_unknown_keys() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("config.toml");
        std::fs::write(&path, "bogus = \"value\"\n").unwrap();
        let err = Settings::load(&path).unwrap_err();
        assert!(err.to_string().contains("unknown field"));
    }

    #[test]
    fn test_store_key_creates_file_and_dir() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("nested").join("config.toml");
        store_key(&path, "team_id", "team-1").unwrap();
        let settings = Settings::load(&path).unwrap();
        assert_eq!(settings.team_id.as_deref(), Some("team-1"));
    }

    #[test]
    fn test_store_key_preserves_other_keys() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("config.toml");
        store_key(&path, "api_key", "lin_api_abc").unwrap();
        store_key(&path, "team_id", "team-1").unwrap();
        store_key(&path, "team_id", "team-2").unwrap();

        let settings = Settings::load(&path).unwrap();
        assert_eq!(settings.api_key.as_deref(), Some("lin_api_abc"));
        assert_eq!(settings.team_id.as_deref(), Some("team-2"));
    }

    #[test]
    fn test_store_key_tolerates_empty_file() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("config.toml");
        std::fs::write(&path, "\n").unwrap();
        store_key(&path, "cycle_id", "cyc-9").unwrap();
        let settings = Settings::load(&path).unwrap();
        assert_eq!(settings.cycle_id.as_deref(), Some("cyc-9"));
    }

    #[test]
    fn test_validate_api_key_prefix() {
        assert!(validate_api_key("lin_api_abcdef").is_ok());
        let err = validate_api_key("sk-abcdef").unwrap_err();
        assert!(err.to_string().contains("lin_api_"));
        assert!(validate_api_key("").is_err());
    }

    #[test]
    fn test_resolve_prefers_env() {
        let key = resolve_with_env(Some("env-key".to_string()), Some("stored-key")).unwrap();
        assert_eq!(key, "env-key");
    }

    #[test]
    fn test_resolve_ignores_empty_env() {
        let key = resolve_with_env(Some(String::new()), Some("stored-key")).unwrap();
        assert_eq!(key, "stored-key");
    }

    #[test]
    fn test_resolve_falls_back_to_stored() {
        let key = resolve_with_env(None, Some("stored-key")).unwrap();
        assert_eq!(key, "stored-key");
    }

    #[test]
    fn test_resolve_missing_everywhere() {
        let err = resolve_with_env(None, None).unwrap_err();
        assert!(matches!(err, Error::MissingApiKey));
    }
}
