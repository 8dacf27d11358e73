use anyhow::Context;
use boardpulse_ai::GeneratorConfig;
use boardpulse_board::{TrelloCredentials, DEFAULT_BASE_URL};
use boardpulse_common::ReportSchedule;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_http_port")]
    pub http_port: u16,
    /// Reports are written to `{data_dir}/reports`
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
    /// CORS origins; empty allows any origin
    #[serde(default)]
    pub cors_allowed_origins: Vec<String>,

    #[serde(default)]
    pub trello: TrelloConfig,
    #[serde(default)]
    pub ai: GeneratorConfig,
    #[serde(default)]
    pub schedule: ScheduleConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrelloConfig {
    #[serde(flatten)]
    pub credentials: TrelloCredentials,
    #[serde(default = "default_trello_base_url")]
    pub base_url: String,
    #[serde(default = "default_trello_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for TrelloConfig {
    fn default() -> Self {
        Self {
            credentials: TrelloCredentials::default(),
            base_url: default_trello_base_url(),
            timeout_secs: default_trello_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleConfig {
    #[serde(default = "default_true")]
    pub weekly: bool,
    #[serde(default = "default_true")]
    pub monthly: bool,
    /// Start the scheduled agent together with the server
    #[serde(default = "default_true")]
    pub autostart: bool,
    /// Seconds between due-checks
    #[serde(default = "default_schedule_tick_secs")]
    pub tick_secs: u64,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            weekly: true,
            monthly: true,
            autostart: true,
            tick_secs: default_schedule_tick_secs(),
        }
    }
}

impl ScheduleConfig {
    pub fn report_schedule(&self) -> ReportSchedule {
        ReportSchedule {
            weekly: self.weekly,
            monthly: self.monthly,
        }
    }
}

fn default_http_port() -> u16 {
    5001
}

fn default_data_dir() -> String {
    "data".to_string()
}

fn default_trello_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_trello_timeout_secs() -> u64 {
    30
}

fn default_true() -> bool {
    true
}

fn default_schedule_tick_secs() -> u64 {
    86400
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            http_port: default_http_port(),
            data_dir: default_data_dir(),
            cors_allowed_origins: Vec::new(),
            trello: TrelloConfig::default(),
            ai: GeneratorConfig::default(),
            schedule: ScheduleConfig::default(),
        }
    }
}

impl ServerConfig {
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {path}"))?;
        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {path}"))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.schedule.tick_secs == 0 {
            anyhow::bail!("schedule.tick_secs must be greater than 0");
        }
        Ok(())
    }

    pub fn reports_dir(&self) -> PathBuf {
        PathBuf::from(&self.data_dir).join("reports")
    }
}
