//! OpenRouter (OpenAI-compatible) chat completion client.

use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::{CompletionFuture, CompletionRequest, SummaryClient, SummaryConfig, SummaryError};

const TEMPERATURE: f32 = 0.3;
const MAX_TOKENS: u32 = 400;
const TOP_P: f32 = 0.9;

/// Request body for the chat completions endpoint.
#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    temperature: f32,
    max_tokens: u32,
    top_p: f32,
    stream: bool,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Completion client for OpenRouter.
pub struct OpenRouterClient {
    client: Client,
    config: SummaryConfig,
    api_key: String,
}

impl OpenRouterClient {
    /// Build the client. Fails with [`SummaryError::Disabled`] without a key.
    pub fn new(config: SummaryConfig) -> Result<Self, SummaryError> {
        let api_key = config.api_key.clone().ok_or(SummaryError::Disabled)?;
        let client = Client::builder().timeout(config.timeout).build()?;

        tracing::info!(
            "Summary API enabled: url={}, model={}",
            config.base_url,
            config.model
        );

        Ok(Self {
            client,
            config,
            api_key,
        })
    }

    /// Build a request with authentication and attribution headers.
    fn build_request(&self, endpoint: &str) -> reqwest::RequestBuilder {
        let url = format!("{}{}", self.config.base_url.trim_end_matches('/'), endpoint);
        self.client
            .post(url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("HTTP-Referer", &self.config.app_url)
            .header("X-Title", &self.config.app_title)
            .header("Content-Type", "application/json")
    }

    async fn chat(&self, request: &CompletionRequest) -> Result<String, SummaryError> {
        let body = ChatCompletionRequest {
            model: &self.config.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: &request.system,
                },
                ChatMessage {
                    role: "user",
                    content: &request.prompt,
                },
            ],
            temperature: TEMPERATURE,
            max_tokens: MAX_TOKENS,
            top_p: TOP_P,
            stream: false,
        };

        tracing::debug!(
            "Requesting summary from {}, prompt length: {}",
            self.config.model,
            request.prompt.len()
        );

        let response = self
            .build_request("/chat/completions")
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SummaryError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| SummaryError::MalformedResponse(e.to_string()))?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .map(|text| text.trim().to_string())
            .filter(|text| !text.is_empty())
            .ok_or_else(|| SummaryError::MalformedResponse("no completion text".to_string()))
    }
}

impl SummaryClient for OpenRouterClient {
    fn complete<'a>(&'a self, request: &'a CompletionRequest) -> CompletionFuture<'a> {
        Box::pin(self.chat(request))
    }
}
