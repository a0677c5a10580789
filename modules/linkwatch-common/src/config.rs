use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::info;

use crate::error::LinkwatchError;

/// Credentials and output paths loaded from environment variables.
///
/// Every credential is optional at load time; which ones are actually
/// required depends on the entry point (a watch run needs a search backend,
/// the send binaries only need Telegram).
#[derive(Debug, Clone)]
pub struct Config {
    pub serpapi_key: Option<String>,
    pub google_api_key: Option<String>,
    pub google_engine_id: Option<String>,
    pub google_lang: String,
    pub telegram_bot_token: Option<String>,
    pub telegram_chat_id: Option<String>,
    pub output_dir: PathBuf,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self {
            serpapi_key: optional_env("SERPAPI_KEY"),
            google_api_key: optional_env("GOOGLE_SEARCH_API_KEY"),
            google_engine_id: optional_env("GOOGLE_SEARCH_ENGINE_ID"),
            google_lang: env::var("GOOGLE_SEARCH_LANG").unwrap_or_else(|_| "lang_en".to_string()),
            telegram_bot_token: optional_env("TELEGRAM_BOT_TOKEN"),
            telegram_chat_id: optional_env("TELEGRAM_GROUP_CHAT_ID"),
            output_dir: env::var("LINKWATCH_OUTPUT_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("output")),
        }
    }

    /// Log which credentials are present without leaking their values.
    pub fn log_redacted(&self) {
        info!(
            serpapi = self.serpapi_key.is_some(),
            google_cse = self.google_api_key.is_some() && self.google_engine_id.is_some(),
            telegram = self.has_telegram_credentials(),
            output_dir = %self.output_dir.display(),
            "Config loaded"
        );
    }

    pub fn has_telegram_credentials(&self) -> bool {
        self.telegram_bot_token.is_some() && self.telegram_chat_id.is_some()
    }

    pub fn history_dir(&self) -> PathBuf {
        self.output_dir.join("history")
    }

    pub fn activity_file(&self) -> PathBuf {
        self.output_dir.join("activity.json")
    }

    pub fn queue_file(&self) -> PathBuf {
        self.output_dir.join("telegram_queue.json")
    }
}

fn optional_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.is_empty())
}

fn default_results_per_keyword() -> usize {
    10
}

/// Keyword list and per-keyword result count, loaded from a JSON file.
#[derive(Debug, Clone, Deserialize)]
pub struct WatchConfig {
    pub keywords: Vec<String>,
    #[serde(default = "default_results_per_keyword")]
    pub results_per_keyword: usize,
}

impl WatchConfig {
    /// Load the watch config. A missing or malformed file is fatal; a run
    /// with a broken keyword list must not proceed to persist anything.
    pub fn load(path: &Path) -> Result<Self, LinkwatchError> {
        let raw = fs::read_to_string(path).map_err(|e| {
            LinkwatchError::Config(format!("Cannot read {}: {e}", path.display()))
        })?;
        let config: WatchConfig = serde_json::from_str(&raw).map_err(|e| {
            LinkwatchError::Config(format!("Malformed watch config {}: {e}", path.display()))
        })?;
        if config.results_per_keyword < 1 {
            return Err(LinkwatchError::Config(
                "results_per_keyword must be at least 1".to_string(),
            ));
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn watch_config_parses_and_defaults_count() {
        let dir = std::env::temp_dir().join("linkwatch-config-test");
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.json");
        fs::write(&path, r#"{"keywords": ["a", "b"]}"#).unwrap();

        let config = WatchConfig::load(&path).unwrap();
        assert_eq!(config.keywords, vec!["a", "b"]);
        assert_eq!(config.results_per_keyword, 10);
    }

    #[test]
    fn malformed_watch_config_is_fatal() {
        let dir = std::env::temp_dir().join("linkwatch-config-test");
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("bad.json");
        fs::write(&path, r#"{"keywords": "not a list"}"#).unwrap();

        assert!(matches!(
            WatchConfig::load(&path),
            Err(LinkwatchError::Config(_))
        ));
    }

    #[test]
    fn zero_results_per_keyword_is_rejected() {
        let dir = std::env::temp_dir().join("linkwatch-config-test");
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("zero.json");
        fs::write(&path, r#"{"keywords": ["a"], "results_per_keyword": 0}"#).unwrap();

        assert!(matches!(
            WatchConfig::load(&path),
            Err(LinkwatchError::Config(_))
        ));
    }
}
