use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::api::query::{DEFAULT_ENDPOINT, QueryDefaults};

/// Environment variable holding the API credential. Wins over `api.key`.
pub const API_KEY_ENV: &str = "PIXABAY_API_KEY";

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
#[serde(default)]
pub struct AppConfig {
    pub api: ApiConfig,
    pub feed: FeedConfig,
    pub logging: LoggingConfig,
}

/// Search endpoint, credential and the query defaults sent with every request.
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct ApiConfig {
    pub endpoint: String,
    pub key: String,
    pub per_page: u32,
    pub safesearch: bool,
    pub editors_choice: bool,
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            key: String::new(),
            per_page: 25,
            safesearch: true,
            editors_choice: true,
            timeout_secs: 10,
        }
    }
}

impl ApiConfig {
    pub fn query_defaults(&self) -> QueryDefaults {
        QueryDefaults {
            key: self.key.clone(),
            per_page: self.per_page,
            safesearch: self.safesearch,
            editors_choice: self.editors_choice,
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct FeedConfig {
    /// Quiet period after the last keystroke before a search fires.
    pub debounce_ms: u64,
    /// Shortest search text that triggers a fetch.
    pub min_search_chars: usize,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 400,
            min_search_chars: 3,
        }
    }
}

impl FeedConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct LoggingConfig {
    /// Base level for the env filter (e.g. "info", "debug").
    pub level: String,
    /// Directory for the rolling log file. Defaults to "logs".
    pub log_directory: Option<String>,
    /// Per-module overrides, e.g. `{"tui_pix_app::internal::feed": "debug"}`.
    pub module_levels: HashMap<String, String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            log_directory: None,
            module_levels: HashMap::new(),
        }
    }
}

impl LoggingConfig {
    /// Filter directive string built from the base level and module overrides.
    pub fn filter_directives(&self) -> String {
        let mut modules: Vec<_> = self.module_levels.iter().collect();
        modules.sort();

        let mut filter_str = self.level.clone();
        for (module, level) in modules {
            filter_str.push_str(&format!(",{}={}", module, level));
        }
        filter_str
    }
}

impl AppConfig {
    pub fn load() -> Self {
        // Look for config.ron in the working directory, next to the executable,
        // then in the user config directory
        let mut candidates = vec![PathBuf::from("config.ron")];

        if let Ok(exe) = std::env::current_exe()
            && let Some(dir) = exe.parent()
        {
            candidates.push(dir.join("config.ron"));
        }

        if let Some(dir) = dirs::config_dir() {
            candidates.push(dir.join("tui-pix-app").join("config.ron"));
        }

        let mut config = candidates
            .iter()
            .filter(|path| path.exists())
            .find_map(|path| match Self::load_from(path) {
                Ok(config) => {
                    tracing::info!("Loaded config from {}", path.display());
                    Some(config)
                }
                Err(e) => {
                    tracing::error!("{:#}", e);
                    None
                }
            })
            .unwrap_or_else(|| {
                tracing::info!("No config file found, using defaults");
                Self::default()
            });

        config.apply_api_key_override(std::env::var(API_KEY_ENV).ok());
        if config.api.key.is_empty() {
            tracing::warn!(
                "No API key configured; set {} or api.key in config.ron",
                API_KEY_ENV
            );
        }
        config
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config at {}", path.display()))?;
        ron::from_str(&content)
            .with_context(|| format!("Failed to parse config at {}", path.display()))
    }

    /// Prefer a non-empty credential from the environment over the file.
    pub fn apply_api_key_override(&mut self, env_value: Option<String>) {
        if let Some(key) = env_value.filter(|k| !k.trim().is_empty()) {
            self.api.key = key.trim().to_string();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.api.endpoint, "https://pixabay.com/api/");
        assert_eq!(config.api.per_page, 25);
        assert!(config.api.safesearch);
        assert!(config.api.editors_choice);
        assert_eq!(config.feed.debounce(), Duration::from_millis(400));
        assert_eq!(config.feed.min_search_chars, 3);
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let config: AppConfig = ron::from_str(
            r#"(
    // Only override what matters
    api: (key: "abc123", per_page: 50),
    feed: (debounce_ms: 250),
)"#,
        )
        .unwrap();

        assert_eq!(config.api.key, "abc123");
        assert_eq!(config.api.per_page, 50);
        assert!(config.api.safesearch);
        assert_eq!(config.feed.debounce_ms, 250);
        assert_eq!(config.feed.min_search_chars, 3);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_load_from_file() {
        let path = std::env::temp_dir().join("tui_pix_app_config_test.ron");
        fs::write(&path, r#"(logging: (level: "debug", log_directory: Some("/tmp/pix")))"#)
            .unwrap();

        let config = AppConfig::load_from(&path).unwrap();
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.log_directory.as_deref(), Some("/tmp/pix"));

        let _ = fs::remove_file(path);
    }

    #[test]
    fn test_load_from_invalid_file_reports_path() {
        let path = std::env::temp_dir().join("tui_pix_app_config_invalid.ron");
        fs::write(&path, "(api: (per_page: \"many\"))").unwrap();

        let err = AppConfig::load_from(&path).unwrap_err();
        assert!(format!("{:#}", err).contains("Failed to parse config"));

        let _ = fs::remove_file(path);
    }

    #[test]
    fn test_env_key_overrides_file_key() {
        let mut config = AppConfig::default();
        config.api.key = "from-file".to_string();

        config.apply_api_key_override(None);
        assert_eq!(config.api.key, "from-file");

        config.apply_api_key_override(Some("   ".to_string()));
        assert_eq!(config.api.key, "from-file");

        config.apply_api_key_override(Some(" from-env ".to_string()));
        assert_eq!(config.api.key, "from-env");
    }

    #[test]
    fn test_filter_directives() {
        let mut logging = LoggingConfig::default();
        assert_eq!(logging.filter_directives(), "info");

        logging
            .module_levels
            .insert("tui_pix_app::internal::feed".to_string(), "debug".to_string());
        logging
            .module_levels
            .insert("reqwest".to_string(), "warn".to_string());
        assert_eq!(
            logging.filter_directives(),
            "info,reqwest=warn,tui_pix_app::internal::feed=debug"
        );
    }
}
