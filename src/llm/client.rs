//! Async LLM client for storyboard parsing
//!
//! Speaks both the Anthropic messages API and OpenAI-compatible chat APIs
//! (DeepSeek, OpenAI, local gateways). The wire format is picked from the
//! endpoint URL.

use reqwest::{Client, RequestBuilder};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::core::config::LlmConfig;
use crate::core::error::{BbsError, Result};

const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Wire format of the configured endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiFormat {
    Anthropic,
    OpenAI,
}

impl ApiFormat {
    pub fn detect(url: &str) -> Self {
        if url.contains("anthropic.com") {
            ApiFormat::Anthropic
        } else {
            ApiFormat::OpenAI
        }
    }
}

pub struct LlmClient {
    client: Client,
    api_key: String,
    api_url: String,
    model: String,
    max_tokens: u32,
    timeout: Duration,
    format: ApiFormat,
}

impl LlmClient {
    /// Build a client from the `[llm]` config section
    ///
    /// Fails with [`BbsError::ConfigError`] when no API key is configured.
    pub fn new(config: &LlmConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .filter(|k| !k.is_empty())
            .ok_or_else(|| BbsError::ConfigError("LLM_API_KEY not set".into()))?;
        let timeout = Duration::from_secs(config.timeout_secs);
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| BbsError::ConfigError(format!("cannot build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_key,
            api_url: config.api_url.clone(),
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            timeout,
            format: ApiFormat::detect(&config.api_url),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn format(&self) -> ApiFormat {
        self.format
    }

    /// One system + user exchange; returns the model's text
    ///
    /// Every failure (transport, HTTP status, empty body) is a
    /// [`BbsError::ParseError`]. No retries.
    pub async fn complete(&self, system: &str, user: &str) -> Result<String> {
        tracing::debug!(model = %self.model, format = ?self.format, "sending completion request");

        let body = ChatRequest::new(self.format, &self.model, self.max_tokens, system, user);
        let response = self
            .authorized(self.client.post(&self.api_url))
            .json(&body)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(BbsError::ParseError(format!(
                "API error ({}): {}",
                status, detail
            )));
        }

        let completion: Completion = response
            .json()
            .await
            .map_err(|e| self.transport_error(e))?;
        completion
            .into_text()
            .ok_or_else(|| BbsError::ParseError("Empty response".into()))
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        match self.format {
            ApiFormat::Anthropic => request
                .header("x-api-key", &self.api_key)
                .header("anthropic-version", ANTHROPIC_VERSION),
            ApiFormat::OpenAI => request.bearer_auth(&self.api_key),
        }
    }

    fn transport_error(&self, e: reqwest::Error) -> BbsError {
        if e.is_timeout() {
            BbsError::ParseError(format!(
                "LLM request timed out after {}s",
                self.timeout.as_secs()
            ))
        } else {
            BbsError::ParseError(e.to_string())
        }
    }
}

/// Request body for either API
///
/// Anthropic takes the system prompt as a top-level field; OpenAI-style APIs
/// take it as the first message.
#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<&'a str>,
    messages: Vec<Message<'a>>,
}

impl<'a> ChatRequest<'a> {
    fn new(
        format: ApiFormat,
        model: &'a str,
        max_tokens: u32,
        system: &'a str,
        user: &'a str,
    ) -> Self {
        let user = Message {
            role: "user",
            content: user,
        };
        let (system, messages) = match format {
            ApiFormat::Anthropic => (Some(system), vec![user]),
            ApiFormat::OpenAI => (
                None,
                vec![
                    Message {
                        role: "system",
                        content: system,
                    },
                    user,
                ],
            ),
        };
        Self {
            model,
            max_tokens,
            system,
            messages,
        }
    }
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

/// Response body of either API
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Completion {
    Anthropic { content: Vec<ContentBlock> },
    OpenAI { choices: Vec<Choice> },
}

impl Completion {
    fn into_text(self) -> Option<String> {
        match self {
            Completion::Anthropic { content } => content.into_iter().find_map(|b| b.text),
            Completion::OpenAI { choices } => choices.into_iter().next().map(|c| c.message.content),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn config(url: &str, key: Option<&str>) -> LlmConfig {
        LlmConfig {
            api_key: key.map(String::from),
            api_url: url.into(),
            model: "test-model".into(),
            ..LlmConfig::default()
        }
    }

    #[test]
    fn test_client_creation() {
        let client = LlmClient::new(&config("https://api.example.com", Some("test-key"))).unwrap();
        assert_eq!(client.api_key, "test-key");
        assert_eq!(client.model(), "test-model");
        assert_eq!(client.format(), ApiFormat::OpenAI);
    }

    #[test]
    fn test_format_detection() {
        assert_eq!(
            ApiFormat::detect("https://api.anthropic.com/v1/messages"),
            ApiFormat::Anthropic
        );
        assert_eq!(
            ApiFormat::detect("https://api.deepseek.com/chat/completions"),
            ApiFormat::OpenAI
        );
    }

    #[test]
    fn test_missing_key_is_config_error() {
        let result = LlmClient::new(&config("https://api.example.com", None));
        assert!(matches!(result, Err(BbsError::ConfigError(_))));

        let result = LlmClient::new(&config("https://api.example.com", Some("")));
        assert!(result.is_err());
    }

    #[test]
    fn test_system_prompt_placement() {
        let anthropic = ChatRequest::new(ApiFormat::Anthropic, "m", 100, "sys", "story");
        assert_eq!(
            serde_json::to_value(&anthropic).unwrap(),
            json!({
                "model": "m",
                "max_tokens": 100,
                "system": "sys",
                "messages": [{"role": "user", "content": "story"}]
            })
        );

        let openai = serde_json::to_value(ChatRequest::new(
            ApiFormat::OpenAI,
            "m",
            100,
            "sys",
            "story",
        ))
        .unwrap();
        assert!(openai.get("system").is_none());
        assert_eq!(openai["messages"][0]["role"], "system");
        assert_eq!(openai["messages"][1]["content"], "story");
    }

    #[test]
    fn test_completion_text_extraction() {
        let anthropic: Completion = serde_json::from_value(json!({
            "content": [{"type": "text", "text": "{\"scenes\": []}"}]
        }))
        .unwrap();
        assert_eq!(anthropic.into_text().unwrap(), "{\"scenes\": []}");

        let openai: Completion = serde_json::from_value(json!({
            "choices": [{"message": {"role": "assistant", "content": "hi"}}]
        }))
        .unwrap();
        assert_eq!(openai.into_text().unwrap(), "hi");

        let empty: Completion = serde_json::from_value(json!({"choices": []})).unwrap();
        assert!(empty.into_text().is_none());
    }
}
