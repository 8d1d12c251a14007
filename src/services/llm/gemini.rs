use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use std::time::Duration;

use super::client::{http_client, truncate_body};
use super::provider::{GenerationRequest, GenerativeProvider, ProviderError};
use crate::kernel::conversation::Role;

/// Google Generative Language `generateContent` client.
#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    name: String,
    base_url: String,
    model: String,
    api_key: Option<String>,
    max_tokens: u32,
    temperature: f32,
}

impl GeminiClient {
    pub fn new(
        name: impl Into<String>,
        base_url: impl Into<String>,
        model: impl Into<String>,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            client: http_client(timeout),
            name: name.into(),
            base_url: base_url.into(),
            model: model.into(),
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            max_tokens: 1024,
            temperature: 0.3,
        }
    }

    pub fn with_sampling(mut self, max_tokens: u32, temperature: f32) -> Self {
        self.max_tokens = max_tokens;
        self.temperature = temperature;
        self
    }

    fn build_body(&self, request: &GenerationRequest) -> Value {
        // Gemini names the assistant role "model".
        let mut contents: Vec<Value> = request
            .history
            .iter()
            .map(|turn| {
                let role = match turn.role {
                    Role::User => "user",
                    Role::Assistant => "model",
                };
                json!({ "role": role, "parts": [{ "text": turn.content }] })
            })
            .collect();
        contents.push(json!({ "role": "user", "parts": [{ "text": request.user_message }] }));

        json!({
            "systemInstruction": { "parts": [{ "text": request.system_prompt }] },
            "contents": contents,
            "generationConfig": {
                "temperature": self.temperature,
                "maxOutputTokens": self.max_tokens,
            },
        })
    }
}

fn extract_text(body: &Value) -> Option<String> {
    let parts = body.pointer("/candidates/0/content/parts")?.as_array()?;
    let text: String = parts
        .iter()
        .filter_map(|p| p.get("text").and_then(Value::as_str))
        .collect::<Vec<_>>()
        .join("");
    let text = text.trim();
    if text.is_empty() {
        None
    } else {
        Some(text.to_string())
    }
}

#[async_trait]
impl GenerativeProvider for GeminiClient {
    fn name(&self) -> &str {
        &self.name
    }

    fn has_credential(&self) -> bool {
        self.api_key.is_some()
    }

    async fn generate(&self, request: &GenerationRequest) -> Result<String, ProviderError> {
        let api_key = self.api_key.as_deref().ok_or(ProviderError::MissingCredential)?;
        let url = format!("{}/{}:generateContent", self.base_url.trim_end_matches('/'), self.model);

        let response = self
            .client
            .post(url)
            .header("x-goog-api-key", api_key)
            .json(&self.build_body(request))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(ProviderError::Http { status: status.as_u16(), body: truncate_body(&text) });
        }

        let body: Value = response.json().await?;
        extract_text(&body).ok_or_else(|| ProviderError::Malformed("no candidate text".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernel::conversation::ConversationTurn;

    #[test]
    fn body_maps_assistant_to_model_role() {
        let client = GeminiClient::new("g", "https://example", "m", Some("k".into()), Duration::from_secs(1));
        let request = GenerationRequest {
            system_prompt: "sys".into(),
            history: vec![ConversationTurn::assistant("earlier")],
            user_message: "now".into(),
        };
        let body = client.build_body(&request);
        assert_eq!(body["contents"][0]["role"], "model");
        assert_eq!(body["contents"][1]["parts"][0]["text"], "now");
        assert_eq!(body["systemInstruction"]["parts"][0]["text"], "sys");
    }

    #[test]
    fn candidate_parts_are_joined() {
        let body = json!({ "candidates": [{ "content": { "parts": [{ "text": "Hello " }, { "text": "there" }] } }] });
        assert_eq!(extract_text(&body).as_deref(), Some("Hello there"));
        assert_eq!(extract_text(&json!({ "candidates": [] })), None);
    }
}
