use super::{execute_chat, http_client};
use crate::error::Result;
use crate::generator::NarrativeGenerator;
use crate::models::ChatRequest;
use crate::prompt;
use async_trait::async_trait;
use boardpulse_common::{BoardSnapshot, ReportType};
use reqwest::Client;

const DEFAULT_API_VERSION: &str = "2024-05-01-preview";
const DEFAULT_MODEL: &str = "Llama-4-Maverick-17B-128E-Instruct-FP8";

/// Azure AI Foundry model inference endpoint (`api-key` header, `api-version` query).
#[derive(Clone)]
pub struct AzureFoundryProvider {
    api_key: String,
    model: String,
    base_url: String,
    api_version: String,
    client: Client,
}

impl AzureFoundryProvider {
    pub fn new(
        api_key: String,
        base_url: String,
        model: Option<String>,
        api_version: Option<String>,
        timeout_secs: Option<u64>,
    ) -> Result<Self> {
        Ok(Self {
            api_key,
            model: model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_version: api_version.unwrap_or_else(|| DEFAULT_API_VERSION.to_string()),
            client: http_client(timeout_secs)?,
        })
    }

    async fn call_api(&self, body: ChatRequest) -> Result<String> {
        let request = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .query(&[("api-version", self.api_version.as_str())])
            .header("api-key", &self.api_key);
        execute_chat("azure", request, &body).await
    }
}

#[async_trait]
impl NarrativeGenerator for AzureFoundryProvider {
    fn provider(&self) -> &str {
        "azure"
    }

    fn model_name(&self) -> &str {
        &self.model
    }

    async fn generate_narrative(
        &self,
        snapshot: &BoardSnapshot,
        report_type: ReportType,
    ) -> Result<String> {
        self.call_api(prompt::build_report_request(&self.model, snapshot, report_type))
            .await
    }

    async fn send_simple_message(&self, text: &str) -> Result<String> {
        self.call_api(prompt::build_chat_request(&self.model, text))
            .await
    }
}
