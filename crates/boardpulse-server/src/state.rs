use crate::agent::ReportAgent;
use crate::config::ServerConfig;
use chrono::{DateTime, Utc};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub agent: Arc<ReportAgent>,
    pub config: Arc<ServerConfig>,
    pub start_time: DateTime<Utc>,
}

impl AppState {
    pub fn new(agent: Arc<ReportAgent>, config: ServerConfig) -> Self {
        Self {
            agent,
            config: Arc::new(config),
            start_time: Utc::now(),
        }
    }
}
