pub mod config;
pub mod kernel;
pub mod knowledge;
pub mod services;

pub use config::EngineConfig;
pub use kernel::engine::{Engine, ResponseResult, PATTERN_PROVIDER};
pub use kernel::intent::{Intent, IntentClassifier};
