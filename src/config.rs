use crate::model::ConfigError;
use crate::parser::MarkerSpec;
use chrono::NaiveDate;
use serde::Deserialize;
use std::fs;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    Files,
    Sqlite,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub urls_file: String,
    /// Performer slug leading the event path, as in `/{performer}-{city}-tickets-`.
    pub performer: String,
    pub storage_root: String,
    pub storage_backend: StorageBackend,
    pub database_path: String,
    pub start_date: NaiveDate,
    pub settle_delay_seconds: u64,
    pub request_timeout_seconds: u64,
    pub user_agent: String,
    pub markers: MarkerSpec,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            urls_file: "urls.txt".into(),
            performer: "twice".into(),
            storage_root: "captures".into(),
            storage_backend: StorageBackend::Files,
            database_path: "captures.db".into(),
            start_date: NaiveDate::from_ymd_opt(2021, 12, 25).unwrap_or_default(),
            settle_delay_seconds: 5,
            request_timeout_seconds: 30,
            user_agent: "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) TicketSniper/0.1".into(),
            markers: MarkerSpec::default(),
        }
    }
}

pub fn load_config(path: &str) -> Result<AppConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let config: AppConfig = serde_json::from_str(&content)?;
    Ok(config)
}
