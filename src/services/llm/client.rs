use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::provider::{GenerationRequest, GenerativeProvider, ProviderError};

const ERROR_BODY_LIMIT: usize = 300;

/// Chat-completions client for the OpenAI-style endpoints (Groq, OpenRouter,
/// Mistral, the HuggingFace router).
#[derive(Clone)]
pub struct OpenAiCompatibleClient {
    client: Client,
    name: String,
    endpoint: String,
    model: String,
    api_key: Option<String>,
    max_tokens: u32,
    temperature: f32,
    extra_headers: Vec<(String, String)>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
    stream: bool,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

pub(crate) fn http_client(timeout: Duration) -> Client {
    Client::builder()
        .timeout(timeout) // network-level bound, the chain adds its own
        .build()
        .unwrap_or_default()
}

pub(crate) fn truncate_body(body: &str) -> String {
    body.chars().take(ERROR_BODY_LIMIT).collect()
}

impl OpenAiCompatibleClient {
    pub fn new(
        name: impl Into<String>,
        endpoint: impl Into<String>,
        model: impl Into<String>,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            client: http_client(timeout),
            name: name.into(),
            endpoint: endpoint.into(),
            model: model.into(),
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            max_tokens: 1024,
            temperature: 0.3,
            extra_headers: Vec::new(),
        }
    }

    pub fn with_sampling(mut self, max_tokens: u32, temperature: f32) -> Self {
        self.max_tokens = max_tokens;
        self.temperature = temperature;
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra_headers.push((name.into(), value.into()));
        self
    }

    fn build_messages<'a>(&self, request: &'a GenerationRequest) -> Vec<ChatMessage<'a>> {
        let mut messages = Vec::with_capacity(request.history.len() + 2);
        messages.push(ChatMessage { role: "system", content: &request.system_prompt });
        for turn in &request.history {
            messages.push(ChatMessage { role: turn.role.as_str(), content: &turn.content });
        }
        messages.push(ChatMessage { role: "user", content: &request.user_message });
        messages
    }
}

#[async_trait]
impl GenerativeProvider for OpenAiCompatibleClient {
    fn name(&self) -> &str {
        &self.name
    }

    fn has_credential(&self) -> bool {
        self.api_key.is_some()
    }

    async fn generate(&self, request: &GenerationRequest) -> Result<String, ProviderError> {
        let api_key = self.api_key.as_deref().ok_or(ProviderError::MissingCredential)?;

        let body = ChatRequest {
            model: &self.model,
            messages: self.build_messages(request),
            max_tokens: self.max_tokens,
            temperature: self.temperature,
            stream: false,
        };

        let mut call = self.client.post(&self.endpoint).bearer_auth(api_key).json(&body);
        for (name, value) in &self.extra_headers {
            call = call.header(name.as_str(), value.as_str());
        }
        let response = call.send().await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(ProviderError::Http { status: status.as_u16(), body: truncate_body(&text) });
        }

        let parsed: ChatResponse = response.json().await?;
        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .map(|c| c.trim().to_string())
            .unwrap_or_default();

        if content.is_empty() {
            return Err(ProviderError::Malformed("empty completion".to_string()));
        }
        Ok(content)
    }
}
