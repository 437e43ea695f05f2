use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::domain::entities::table::DEFAULT_PAGE_SIZE;

pub const API_URL_ENV: &str = "GASTOS_API_URL";

/// Settings read from `config.toml` in the platform config directory. Every
/// field is optional in the file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub api_url: String,
    pub page_size: usize,
    pub search_debounce_ms: u64,
    pub request_timeout_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_url: "http://localhost:8000".to_string(),
            page_size: DEFAULT_PAGE_SIZE,
            search_debounce_ms: 300,
            request_timeout_secs: 15,
        }
    }
}

pub fn project_dirs() -> Result<ProjectDirs> {
    ProjectDirs::from("com", "gastos", "gastos")
        .ok_or_else(|| anyhow!("unable to resolve project directories"))
}

impl AppConfig {
    pub fn config_path() -> Result<PathBuf> {
        Ok(project_dirs()?.config_dir().join("config.toml"))
    }

    /// Defaults when the file is missing, then the environment override.
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        let config = Self::load_from(&path)?;
        config.with_api_url_override(std::env::var(API_URL_ENV).ok())
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read config: {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("invalid config: {}", path.display()))
    }

    pub fn parse(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).context("config is not valid TOML")?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_api_url_override(mut self, api_url: Option<String>) -> Result<Self> {
        if let Some(api_url) = api_url.filter(|url| !url.trim().is_empty()) {
            self.api_url = api_url.trim().to_string();
            self.validate()?;
        }
        Ok(self)
    }

    pub fn validate(&self) -> Result<()> {
        if self.api_url.trim().is_empty() {
            bail!("api_url must not be empty");
        }
        Url::parse(&self.api_url)
            .with_context(|| format!("api_url is not a valid URL: {}", self.api_url))?;
        if self.page_size == 0 {
            bail!("page_size must be greater than 0");
        }
        Ok(())
    }
}
