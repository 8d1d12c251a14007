use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    Gemini,
    OpenaiCompatible,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderConfig {
    pub name: String,
    pub kind: ProviderKind,
    pub model: String,
    pub endpoint: String,
    /// Environment variable holding the credential. Never the key itself.
    pub api_key_env: String,
    pub cooldown_secs: u64,
    pub priority: u32,
}

impl ProviderConfig {
    pub fn cooldown(&self) -> Duration {
        Duration::from_secs(self.cooldown_secs)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub institution: String,
    pub history_turns: usize,
    pub provider_timeout_secs: u64,
    pub request_deadline_secs: u64,
    pub max_tokens: u32,
    pub temperature: f32,
    pub knowledge_dir: Option<PathBuf>,
    pub providers: Vec<ProviderConfig>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            institution: "the Computer Engineering Department".to_string(),
            history_turns: 4,
            provider_timeout_secs: 30,
            request_deadline_secs: 45,
            max_tokens: 1024,
            temperature: 0.3,
            knowledge_dir: None,
            providers: default_providers(),
        }
    }
}

fn provider(
    name: &str,
    kind: ProviderKind,
    model: &str,
    endpoint: &str,
    api_key_env: &str,
    cooldown_secs: u64,
    priority: u32,
) -> ProviderConfig {
    ProviderConfig {
        name: name.to_string(),
        kind,
        model: model.to_string(),
        endpoint: endpoint.to_string(),
        api_key_env: api_key_env.to_string(),
        cooldown_secs,
        priority,
    }
}

/// The five-backend chain. Cooldowns track each backend's published reset window.
pub fn default_providers() -> Vec<ProviderConfig> {
    use ProviderKind::*;
    vec![
        provider(
            "Gemini",
            Gemini,
            "gemini-1.5-flash",
            "https://generativelanguage.googleapis.com/v1beta/models",
            "GEMINI_API_KEY",
            65,
            1,
        ),
        provider(
            "Groq",
            OpenaiCompatible,
            "llama-3.1-8b-instant",
            "https://api.groq.com/openai/v1/chat/completions",
            "GROQ_API_KEY",
            65,
            2,
        ),
        provider(
            "OpenRouter",
            OpenaiCompatible,
            "meta-llama/llama-3.2-3b-instruct:free",
            "https://openrouter.ai/api/v1/chat/completions",
            "OPENROUTER_API_KEY",
            65,
            3,
        ),
        provider(
            "Mistral",
            OpenaiCompatible,
            "open-mistral-nemo",
            "https://api.mistral.ai/v1/chat/completions",
            "MISTRAL_API_KEY",
            70,
            4,
        ),
        provider(
            "HuggingFace",
            OpenaiCompatible,
            "meta-llama/Llama-3.1-8B-Instruct",
            "https://router.huggingface.co/v1/chat/completions",
            "HF_TOKEN",
            310,
            5,
        ),
    ]
}

impl EngineConfig {
    /// Defaults when `path` is `None`, otherwise the TOML file with defaults filled in.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        Self::from_toml(&raw).with_context(|| format!("parsing config {}", path.display()))
    }

    pub fn from_toml(raw: &str) -> Result<Self> {
        let config: EngineConfig = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.provider_timeout_secs == 0 {
            anyhow::bail!("provider_timeout_secs must be positive");
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            anyhow::bail!("temperature {} outside 0..=2", self.temperature);
        }
        for p in &self.providers {
            if p.name.trim().is_empty() {
                anyhow::bail!("provider with empty name");
            }
        }
        Ok(())
    }

    pub fn provider_timeout(&self) -> Duration {
        Duration::from_secs(self.provider_timeout_secs)
    }

    pub fn request_deadline(&self) -> Duration {
        Duration::from_secs(self.request_deadline_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_cover_five_backends_in_order() {
        let config = EngineConfig::default();
        let names: Vec<_> = config.providers.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Gemini", "Groq", "OpenRouter", "Mistral", "HuggingFace"]);
        assert_eq!(config.providers[4].cooldown_secs, 310);
        assert_eq!(config.history_turns, 4);
    }

    #[test]
    fn partial_toml_keeps_other_defaults() {
        let config = EngineConfig::from_toml("institution = \"CE Dept\"\nhistory_turns = 6\n").unwrap();
        assert_eq!(config.institution, "CE Dept");
        assert_eq!(config.history_turns, 6);
        assert_eq!(config.provider_timeout_secs, 30);
        assert_eq!(config.providers.len(), 5);
    }

    #[test]
    fn explicit_provider_list_replaces_defaults() {
        let raw = r#"
[[providers]]
name = "Local"
kind = "openai_compatible"
model = "tiny"
endpoint = "http://localhost:8080/v1/chat/completions"
api_key_env = "LOCAL_KEY"
cooldown_secs = 10
priority = 1
"#;
        let config = EngineConfig::from_toml(raw).unwrap();
        assert_eq!(config.providers.len(), 1);
        assert_eq!(config.providers[0].kind, ProviderKind::OpenaiCompatible);
    }

    #[test]
    fn zero_timeout_is_rejected() {
        assert!(EngineConfig::from_toml("provider_timeout_secs = 0").is_err());
    }
}
