use crate::error::{GenerationError, Result};
use crate::providers::azure::AzureFoundryProvider;
use crate::providers::openai::OpenAICompatibleProvider;
use async_trait::async_trait;
use boardpulse_common::{BoardSnapshot, ReportType};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Turns board snapshots into report narratives (multi-backend).
#[async_trait]
pub trait NarrativeGenerator: Send + Sync {
    /// Provider name
    fn provider(&self) -> &str;

    fn model_name(&self) -> &str;

    /// Markdown report for one board.
    async fn generate_narrative(
        &self,
        snapshot: &BoardSnapshot,
        report_type: ReportType,
    ) -> Result<String>;

    /// Free-form question answered by the assistant prompt.
    async fn send_simple_message(&self, text: &str) -> Result<String>;
}

/// `[ai]` section of the server configuration.
#[derive(Clone, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// azure | openai | mistral | openrouter
    #[serde(default = "default_provider")]
    pub provider: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    /// Azure AI Foundry only
    #[serde(default)]
    pub api_version: Option<String>,
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

fn default_provider() -> String {
    "azure".to_string()
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            api_key: String::new(),
            base_url: None,
            model: None,
            api_version: None,
            timeout_secs: None,
        }
    }
}

impl std::fmt::Debug for GeneratorConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeneratorConfig")
            .field("provider", &self.provider)
            .field("api_key", &"***")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("api_version", &self.api_version)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

/// Pick the backend adapter named by `config.provider`.
pub fn build_generator(config: &GeneratorConfig) -> Result<Arc<dyn NarrativeGenerator>> {
    if config.api_key.trim().is_empty() {
        return Err(GenerationError::ConfigError(
            "ai.api_key must not be empty".to_string(),
        ));
    }

    match config.provider.to_lowercase().as_str() {
        "azure" => {
            let base_url = config.base_url.clone().ok_or_else(|| {
                GenerationError::ConfigError("ai.base_url is required for azure".to_string())
            })?;
            Ok(Arc::new(AzureFoundryProvider::new(
                config.api_key.clone(),
                base_url,
                config.model.clone(),
                config.api_version.clone(),
                config.timeout_secs,
            )?))
        }
        name @ ("openai" | "mistral" | "openrouter") => {
            Ok(Arc::new(OpenAICompatibleProvider::new(
                name,
                config.api_key.clone(),
                config.model.clone(),
                config.base_url.clone(),
                config.timeout_secs,
            )?))
        }
        other => Err(GenerationError::UnsupportedProvider(other.to_string())),
    }
}
