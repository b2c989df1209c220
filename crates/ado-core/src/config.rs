use anyhow::Context;
use directories::ProjectDirs;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_RETRIES: u32 = 30;
pub const DEFAULT_RETRY_DELAY_MS: u64 = 1000;

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub org_url: Option<String>,
    pub output_dir: Option<PathBuf>,
    pub log_file: Option<PathBuf>,
    pub timeout_secs: u64,
    pub retries: u32,
    pub retry_delay_ms: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            org_url: None,
            output_dir: None,
            log_file: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            retries: DEFAULT_RETRIES,
            retry_delay_ms: DEFAULT_RETRY_DELAY_MS,
        }
    }
}

impl AppConfig {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let data = fs::read_to_string(path)
            .with_context(|| format!("read config {}", path.display()))?;
        let config = serde_json::from_str(&data)
            .with_context(|| format!("parse config {}", path.display()))?;
        Ok(config)
    }

    pub fn org_url(&self) -> anyhow::Result<&str> {
        self.org_url
            .as_deref()
            .map(|url| url.trim_end_matches('/'))
            .filter(|url| !url.is_empty())
            .context("Azure DevOps organization URL is not configured (use --org-url or org_url in the config file)")
    }

    pub fn output_dir(&self) -> anyhow::Result<PathBuf> {
        match &self.output_dir {
            Some(dir) => Ok(dir.clone()),
            None => default_output_dir(),
        }
    }

    pub fn log_file(&self) -> anyhow::Result<PathBuf> {
        match &self.log_file {
            Some(path) => Ok(path.clone()),
            None => default_log_path(),
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }
}

fn project_dirs() -> anyhow::Result<ProjectDirs> {
    ProjectDirs::from("com", "ado-repos", "ado-repos").context("resolve project dirs")
}

pub fn default_config_path() -> anyhow::Result<PathBuf> {
    Ok(project_dirs()?.config_dir().join("config.json"))
}

pub fn default_output_dir() -> anyhow::Result<PathBuf> {
    Ok(project_dirs()?.data_local_dir().join("ADOFiles"))
}

pub fn default_log_path() -> anyhow::Result<PathBuf> {
    Ok(project_dirs()?
        .data_local_dir()
        .join("logs")
        .join("ado-repos.log"))
}
