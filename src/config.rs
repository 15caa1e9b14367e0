use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::error::{AppError, Result};

const APP_DIR: &str = "news-monitor";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_db_path")]
    pub db_path: String,

    #[serde(default = "default_log_path")]
    pub log_path: String,

    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,

    #[serde(default = "default_refresh_interval")]
    pub refresh_interval_minutes: u32,

    #[serde(default = "default_fetch_timeout")]
    pub fetch_timeout_secs: u64,
}

fn data_dir() -> PathBuf {
    let data_dir = dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR);
    std::fs::create_dir_all(&data_dir).ok();
    data_dir
}

fn default_db_path() -> String {
    data_dir()
        .join("news_monitor.db")
        .to_string_lossy()
        .to_string()
}

fn default_log_path() -> String {
    data_dir()
        .join("news_monitor.log")
        .to_string_lossy()
        .to_string()
}

fn default_listen_addr() -> String {
    "127.0.0.1:5000".to_string()
}

fn default_refresh_interval() -> u32 {
    10
}

fn default_fetch_timeout() -> u64 {
    30
}

impl Default for Config {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            log_path: default_log_path(),
            listen_addr: default_listen_addr(),
            refresh_interval_minutes: default_refresh_interval(),
            fetch_timeout_secs: default_fetch_timeout(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path();

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            Self::from_toml(&content)
        } else {
            let config = Config::default();
            config.save()?;
            Ok(config)
        }
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        if config.refresh_interval_minutes == 0 {
            return Err(AppError::Config(
                "refresh_interval_minutes must be at least 1".to_string(),
            ));
        }
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| AppError::Config(e.to_string()))?;
        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(APP_DIR)
            .join("config.toml")
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(u64::from(self.refresh_interval_minutes) * 60)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }
}
