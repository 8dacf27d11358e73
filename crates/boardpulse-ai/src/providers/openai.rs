use super::{execute_chat, http_client};
use crate::error::Result;
use crate::generator::NarrativeGenerator;
use crate::models::ChatRequest;
use crate::prompt;
use async_trait::async_trait;
use boardpulse_common::{BoardSnapshot, ReportType};
use reqwest::Client;

const OPENROUTER_REFERER: &str = "http://boardpulse.local";
const OPENROUTER_TITLE: &str = "boardpulse";

/// Bearer-token chat-completions backend (OpenAI, Mistral, OpenRouter).
#[derive(Clone)]
pub struct OpenAICompatibleProvider {
    provider: String,
    api_key: String,
    model: String,
    base_url: String,
    client: Client,
}

impl OpenAICompatibleProvider {
    pub fn new(
        provider: &str,
        api_key: String,
        model: Option<String>,
        base_url: Option<String>,
        timeout_secs: Option<u64>,
    ) -> Result<Self> {
        let (default_url, default_model) = match provider {
            "mistral" => ("https://api.mistral.ai/v1", "mistral-large-latest"),
            "openrouter" => ("https://openrouter.ai/api/v1", "mistralai/mistral-large"),
            _ => ("https://api.openai.com/v1", "gpt-4o-mini"),
        };

        Ok(Self {
            provider: provider.to_string(),
            api_key,
            model: model.unwrap_or_else(|| default_model.to_string()),
            base_url: base_url
                .unwrap_or_else(|| default_url.to_string())
                .trim_end_matches('/')
                .to_string(),
            client: http_client(timeout_secs)?,
        })
    }

    async fn call_api(&self, body: ChatRequest) -> Result<String> {
        let mut request = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key));
        if self.provider == "openrouter" {
            request = request
                .header("HTTP-Referer", OPENROUTER_REFERER)
                .header("X-Title", OPENROUTER_TITLE);
        }
        execute_chat(&self.provider, request, &body).await
    }
}

#[async_trait]
impl NarrativeGenerator for OpenAICompatibleProvider {
    fn provider(&self) -> &str {
        &self.provider
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
