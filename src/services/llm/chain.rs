use serde::Serialize;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use super::provider::{FailureKind, GenerationRequest, GenerativeProvider, ProviderError};
use crate::kernel::time::Clock;

/// Provider name reported when nothing answered.
pub const NO_PROVIDER: &str = "none";

/// One backend plus its cooldown state. Shared by every request for the
/// process lifetime.
pub struct ProviderSlot {
    provider: Arc<dyn GenerativeProvider>,
    priority: u32,
    cooldown: Duration,
    blocked_until: Mutex<Option<Instant>>,
}

impl ProviderSlot {
    pub fn new(provider: Arc<dyn GenerativeProvider>, priority: u32, cooldown: Duration) -> Self {
        Self {
            provider,
            priority,
            cooldown,
            blocked_until: Mutex::new(None),
        }
    }

    pub fn name(&self) -> &str {
        self.provider.name()
    }

    pub fn priority(&self) -> u32 {
        self.priority
    }

    pub fn cooldown(&self) -> Duration {
        self.cooldown
    }

    pub fn has_credential(&self) -> bool {
        self.provider.has_credential()
    }

    fn blocked_until(&self) -> Option<Instant> {
        *self.blocked_until.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn is_available(&self, now: Instant) -> bool {
        self.has_credential() && self.blocked_until().map_or(true, |until| now >= until)
    }

    /// Enter cooldown from `now`. Never moves an existing deadline backwards.
    pub fn block(&self, now: Instant) -> Instant {
        let candidate = now + self.cooldown;
        let mut guard = self.blocked_until.lock().unwrap_or_else(|e| e.into_inner());
        let until = match *guard {
            Some(existing) if existing > candidate => existing,
            _ => candidate,
        };
        *guard = Some(until);
        until
    }

    /// Whole seconds (rounded up) until the cooldown lapses.
    pub fn seconds_until_available(&self, now: Instant) -> u64 {
        match self.blocked_until() {
            Some(until) if until > now => {
                let left = until - now;
                left.as_secs() + u64::from(left.subsec_nanos() > 0)
            }
            _ => 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    NoCredential,
    CoolingDown { seconds_left: u64 },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptOutcome {
    Success,
    Skipped(SkipReason),
    RateLimited { cooldown: Duration },
    Failed(String),
}

#[derive(Debug, Clone)]
pub struct Attempt {
    pub provider: String,
    pub outcome: AttemptOutcome,
    pub elapsed: Duration,
}

/// Result of walking the chain once.
#[derive(Debug, Clone)]
pub struct ChainReply {
    pub text: Option<String>,
    /// Provider that answered, or [`NO_PROVIDER`].
    pub provider: String,
    pub attempts: Vec<Attempt>,
}

impl ChainReply {
    pub fn answered(&self) -> bool {
        self.text.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProviderStatus {
    pub priority: u32,
    pub name: String,
    pub available: bool,
    pub has_credential: bool,
    pub seconds_until_available: u64,
}

/// Ordered fallback chain over generative backends.
pub struct ProviderChain {
    slots: Vec<ProviderSlot>,
    clock: Arc<dyn Clock>,
    call_timeout: Duration,
}

impl ProviderChain {
    pub fn new(mut slots: Vec<ProviderSlot>, clock: Arc<dyn Clock>, call_timeout: Duration) -> Self {
        // Stable: equal priorities keep registration order.
        slots.sort_by_key(|s| s.priority);
        Self { slots, clock, call_timeout }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn slots(&self) -> &[ProviderSlot] {
        &self.slots
    }

    pub fn is_available(&self, name: &str) -> bool {
        let now = self.clock.now();
        self.slots.iter().any(|s| s.name() == name && s.is_available(now))
    }

    pub async fn try_all(&self, request: &GenerationRequest) -> ChainReply {
        self.try_all_until(request, None, &CancellationToken::new()).await
    }

    /// Walk providers in priority order until one answers. `deadline` bounds the
    /// whole walk; cancelling `cancel` abandons the in-flight call.
    pub async fn try_all_until(
        &self,
        request: &GenerationRequest,
        deadline: Option<tokio::time::Instant>,
        cancel: &CancellationToken,
    ) -> ChainReply {
        let mut attempts = Vec::with_capacity(self.slots.len());

        for slot in &self.slots {
            if cancel.is_cancelled() {
                debug!("Provider chain cancelled before {}", slot.name());
                break;
            }

            // 1. Availability
            let now = self.clock.now();
            if !slot.has_credential() {
                attempts.push(Attempt::skipped(slot, SkipReason::NoCredential));
                continue;
            }
            if !slot.is_available(now) {
                let seconds_left = slot.seconds_until_available(now);
                debug!("Skipping {} ({}s cooldown left)", slot.name(), seconds_left);
                attempts.push(Attempt::skipped(slot, SkipReason::CoolingDown { seconds_left }));
                continue;
            }

            // 2. Budget for this call
            let budget = match deadline {
                Some(d) => {
                    let left = d.saturating_duration_since(tokio::time::Instant::now());
                    if left.is_zero() {
                        warn!("Request deadline reached before trying {}", slot.name());
                        break;
                    }
                    left.min(self.call_timeout)
                }
                None => self.call_timeout,
            };

            // 3. Call, no lock held
            info!("Trying provider {}", slot.name());
            let started = Instant::now();
            let result = tokio::select! {
                _ = cancel.cancelled() => Err(ProviderError::Cancelled),
                r = tokio::time::timeout(budget, slot.provider.generate(request)) => {
                    r.unwrap_or(Err(ProviderError::Timeout(budget)))
                }
            };
            let result = result.and_then(|text| {
                if text.trim().is_empty() {
                    Err(ProviderError::Malformed("empty text".to_string()))
                } else {
                    Ok(text)
                }
            });
            let elapsed = started.elapsed();

            // 4. Outcome
            match result {
                Ok(text) => {
                    info!("Provider {} answered in {}ms", slot.name(), elapsed.as_millis());
                    attempts.push(Attempt {
                        provider: slot.name().to_string(),
                        outcome: AttemptOutcome::Success,
                        elapsed,
                    });
                    return ChainReply {
                        text: Some(text),
                        provider: slot.name().to_string(),
                        attempts,
                    };
                }
                Err(e) => {
                    let cancelled = matches!(e, ProviderError::Cancelled);
                    let outcome = match e.failure_kind() {
                        FailureKind::RateLimited => {
                            slot.block(self.clock.now());
                            warn!(
                                "Provider {} rate limited, cooling down for {}s: {}",
                                slot.name(),
                                slot.cooldown().as_secs(),
                                e
                            );
                            AttemptOutcome::RateLimited { cooldown: slot.cooldown() }
                        }
                        FailureKind::Transient => {
                            error!("Provider {} failed: {}", slot.name(), e);
                            AttemptOutcome::Failed(e.to_string())
                        }
                    };
                    attempts.push(Attempt { provider: slot.name().to_string(), outcome, elapsed });
                    if cancelled {
                        break;
                    }
                }
            }
        }

        warn!("No provider answered after {} attempts", attempts.len());
        ChainReply {
            text: None,
            provider: NO_PROVIDER.to_string(),
            attempts,
        }
    }

    pub fn status(&self) -> Vec<ProviderStatus> {
        let now = self.clock.now();
        self.slots
            .iter()
            .map(|s| ProviderStatus {
                priority: s.priority(),
                name: s.name().to_string(),
                available: s.is_available(now),
                has_credential: s.has_credential(),
                seconds_until_available: s.seconds_until_available(now),
            })
            .collect()
    }
}

impl Attempt {
    fn skipped(slot: &ProviderSlot, reason: SkipReason) -> Self {
        Self {
            provider: slot.name().to_string(),
            outcome: AttemptOutcome::Skipped(reason),
            elapsed: Duration::ZERO,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    struct Echo;

    #[async_trait]
    impl GenerativeProvider for Echo {
        fn name(&self) -> &str {
            "echo"
        }
        fn has_credential(&self) -> bool {
            true
        }
        async fn generate(&self, _: &GenerationRequest) -> Result<String, ProviderError> {
            Ok("ok".into())
        }
    }

    #[test]
    fn block_never_shortens_an_existing_cooldown() {
        let slot = ProviderSlot::new(Arc::new(Echo), 1, Duration::from_secs(60));
        let t0 = Instant::now();
        let first = slot.block(t0 + Duration::from_secs(30));
        let second = slot.block(t0);
        assert_eq!(first, second);
        assert!(!slot.is_available(t0 + Duration::from_secs(89)));
        assert!(slot.is_available(t0 + Duration::from_secs(90)));
        assert_eq!(slot.seconds_until_available(t0 + Duration::from_millis(89_500)), 1);
    }
}
