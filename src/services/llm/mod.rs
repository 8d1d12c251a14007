//! Generative backends and the cooldown-aware chain that tries them in order.

pub mod chain;
pub mod client;
pub mod gemini;
pub mod provider;
pub mod registry;

pub use chain::*;
pub use client::OpenAiCompatibleClient;
pub use gemini::GeminiClient;
pub use provider::*;
pub use registry::build_chain;
