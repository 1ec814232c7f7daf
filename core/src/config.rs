use crate::adapters::endpoint::validate_api_base;
use crate::error::{CoreError, CoreResult};
use crate::relief::extraction::DEFAULT_SEARCH_SOURCE;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

pub const CONFIG_FILE_NAME: &str = "relief_config.json";
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct AppConfig {
    pub model: String,
    pub api_base: String,
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    pub data_dir: PathBuf,
    pub search_source: String,
    pub request_timeout_secs: u64,
    pub journal_enabled: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            api_base: DEFAULT_API_BASE.to_string(),
            api_key: None,
            data_dir: PathBuf::from("relief_data"),
            search_source: DEFAULT_SEARCH_SOURCE.to_string(),
            request_timeout_secs: 60,
            journal_enabled: true,
        }
    }
}

impl AppConfig {
    /// Defaults, then `<data_dir>/relief_config.json`, then the process
    /// environment.
    pub fn resolve(fallback_data_dir: Option<PathBuf>) -> CoreResult<Self> {
        Self::resolve_with(|k| std::env::var(k).ok(), fallback_data_dir)
    }

    pub fn resolve_with(
        env: impl Fn(&str) -> Option<String>,
        fallback_data_dir: Option<PathBuf>,
    ) -> CoreResult<Self> {
        let data_dir = env("RELIEF_DATA_DIR")
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from)
            .or(fallback_data_dir)
            .unwrap_or_else(|| AppConfig::default().data_dir);

        let mut cfg = Self::from_file_or_default(&data_dir)?;
        cfg.data_dir = data_dir;

        if let Some(key) = env("GEMINI_API_KEY").or_else(|| env("API_KEY")) {
            cfg.api_key = Some(key);
        }
        if let Some(model) = env("RELIEF_MODEL") {
            cfg.model = model;
        }
        if let Some(base) = env("RELIEF_API_BASE") {
            cfg.api_base = base;
        }
        cfg.api_key = cfg.api_key.filter(|k| !k.trim().is_empty());

        cfg.validate()?;
        debug!(
            model = %cfg.model,
            data_dir = %cfg.data_dir.display(),
            has_api_key = cfg.api_key.is_some(),
            "config resolved"
        );
        Ok(cfg)
    }

    fn from_file_or_default(data_dir: &Path) -> CoreResult<Self> {
        let path = data_dir.join(CONFIG_FILE_NAME);
        if !path.exists() {
            return Ok(Self::default());
        }
        let bytes = fs::read(&path)?;
        serde_json::from_slice(&bytes)
            .map_err(|e| CoreError::Config(format!("{}: {}", path.display(), e)))
    }

    pub fn validate(&self) -> CoreResult<()> {
        validate_api_base(&self.api_base)?;
        if self.model.trim().is_empty() {
            return Err(CoreError::Config("model must not be empty".to_string()));
        }
        if self.search_source.trim().is_empty() {
            return Err(CoreError::Config(
                "search_source must not be empty".to_string(),
            ));
        }
        if self.request_timeout_secs == 0 {
            return Err(CoreError::Config(
                "request_timeout_secs must be > 0".to_string(),
            ));
        }
        Ok(())
    }

    pub fn write_to_data_dir(&self) -> CoreResult<PathBuf> {
        fs::create_dir_all(&self.data_dir)?;
        let path = self.data_dir.join(CONFIG_FILE_NAME);
        fs::write(&path, serde_json::to_vec_pretty(self)?)?;
        Ok(path)
    }
}
