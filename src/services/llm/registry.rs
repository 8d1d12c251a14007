use std::sync::Arc;

use super::chain::{ProviderChain, ProviderSlot};
use super::client::OpenAiCompatibleClient;
use super::gemini::GeminiClient;
use super::provider::GenerativeProvider;
use crate::config::{EngineConfig, ProviderKind};
use crate::kernel::time::Clock;

/// Build the chain from config, reading credentials from the environment.
pub fn build_chain(config: &EngineConfig, clock: Arc<dyn Clock>) -> ProviderChain {
    build_chain_with(config, clock, |var| std::env::var(var).ok())
}

/// Same as [`build_chain`] with an explicit credential lookup.
pub fn build_chain_with<F>(config: &EngineConfig, clock: Arc<dyn Clock>, lookup: F) -> ProviderChain
where
    F: Fn(&str) -> Option<String>,
{
    let timeout = config.provider_timeout();
    let slots = config
        .providers
        .iter()
        .map(|p| {
            let key = lookup(&p.api_key_env).filter(|k| !k.trim().is_empty());
            if key.is_none() {
                tracing::info!("{} disabled: {} not set", p.name, p.api_key_env);
            }
            let provider: Arc<dyn GenerativeProvider> = match p.kind {
                ProviderKind::Gemini => Arc::new(
                    GeminiClient::new(&p.name, &p.endpoint, &p.model, key, timeout)
                        .with_sampling(config.max_tokens, config.temperature),
                ),
                ProviderKind::OpenaiCompatible => {
                    let mut client = OpenAiCompatibleClient::new(&p.name, &p.endpoint, &p.model, key, timeout)
                        .with_sampling(config.max_tokens, config.temperature);
                    if p.endpoint.contains("openrouter.ai") {
                        client = client.with_header("X-Title", config.institution.clone());
                    }
                    Arc::new(client)
                }
            };
            ProviderSlot::new(provider, p.priority, p.cooldown())
        })
        .collect();

    ProviderChain::new(slots, clock, timeout)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernel::time::ManualClock;

    #[test]
    fn blank_or_missing_keys_disable_providers() {
        let config = EngineConfig::default();
        let chain = build_chain_with(&config, Arc::new(ManualClock::new()), |var| match var {
            "GROQ_API_KEY" => Some("gsk-test".to_string()),
            "MISTRAL_API_KEY" => Some("   ".to_string()),
            _ => None,
        });
        let status = chain.status();
        assert_eq!(status.len(), 5);
        let with_key: Vec<_> = status.iter().filter(|s| s.has_credential).map(|s| s.name.as_str()).collect();
        assert_eq!(with_key, vec!["Groq"]);
        assert!(chain.is_available("Groq"));
        assert!(!chain.is_available("Mistral"));
    }
}
