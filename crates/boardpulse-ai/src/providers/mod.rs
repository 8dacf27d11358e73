pub mod azure;
pub mod openai;

use crate::error::{GenerationError, Result};
use crate::models::{ChatRequest, ChatResponse};
use reqwest::{Client, RequestBuilder};
use std::time::Duration;

pub(crate) fn http_client(timeout_secs: Option<u64>) -> Result<Client> {
    Ok(Client::builder()
        .timeout(Duration::from_secs(timeout_secs.unwrap_or(60)))
        .build()?)
}

/// Send one chat-completions request and return the first choice's content.
pub(crate) async fn execute_chat(
    provider: &str,
    request: RequestBuilder,
    body: &ChatRequest,
) -> Result<String> {
    tracing::debug!(
        provider,
        model = %body.model,
        messages = body.messages.len(),
        max_tokens = ?body.max_tokens,
        "Calling chat completions API"
    );

    let resp = request
        .header("Content-Type", "application/json")
        .json(body)
        .send()
        .await?;

    let status = resp.status();
    let text = resp.text().await?;
    if !status.is_success() {
        tracing::error!(
            provider,
            status = %status,
            body = %text,
            "Chat completions request failed"
        );
        return Err(GenerationError::HttpError {
            provider: provider.to_string(),
            status: status.as_u16(),
            body: text,
        });
    }

    let chat_resp: ChatResponse = serde_json::from_str(&text)?;

    tracing::debug!(
        provider,
        usage = ?chat_resp.usage,
        "Chat completions response received"
    );

    chat_resp
        .choices
        .into_iter()
        .next()
        .map(|c| c.message.content)
        .ok_or_else(|| GenerationError::EmptyResponse {
            provider: provider.to_string(),
        })
}
