use serde::Serialize;
use std::collections::{BTreeMap, VecDeque};

use super::event::{ResponsePath, TelemetryEvent};

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TelemetrySnapshot {
    pub path_stats: PathStats,
    pub latency_stats: LatencyStats,
    pub provider_stats: BTreeMap<String, ProviderStats>,
    pub intent_counts: BTreeMap<String, u64>,
    pub chain_exhausted: u64,
    pub dropped_log_writes: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PathStats {
    pub messages: u64,
    pub deterministic: u64,
    pub generative: u64,
    pub fallback: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LatencyStats {
    pub total_ms: u64,
    pub avg_ms: f64,
    pub max_ms: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProviderStats {
    pub successes: u64,
    pub rate_limited: u64,
    pub failures: u64,
    pub skipped: u64,
}

/// Pure fold over the recorded events.
pub fn compute_snapshot(events: &VecDeque<TelemetryEvent>) -> TelemetrySnapshot {
    let mut snap = TelemetrySnapshot::default();

    for event in events {
        match event {
            TelemetryEvent::MessageProcessed { intent, path, provider, latency_ms, .. } => {
                snap.path_stats.messages += 1;
                match path {
                    ResponsePath::Deterministic => snap.path_stats.deterministic += 1,
                    ResponsePath::Generative => snap.path_stats.generative += 1,
                    ResponsePath::Fallback => snap.path_stats.fallback += 1,
                }
                if let (ResponsePath::Generative, Some(name)) = (path, provider) {
                    snap.provider_stats.entry(name.clone()).or_default().successes += 1;
                }
                *snap.intent_counts.entry(intent.clone()).or_insert(0) += 1;

                snap.latency_stats.total_ms += latency_ms;
                if *latency_ms > snap.latency_stats.max_ms {
                    snap.latency_stats.max_ms = *latency_ms;
                }
            }
            TelemetryEvent::ProviderSkipped { provider, .. } => {
                snap.provider_stats.entry(provider.clone()).or_default().skipped += 1;
            }
            TelemetryEvent::ProviderRateLimited { provider, .. } => {
                snap.provider_stats.entry(provider.clone()).or_default().rate_limited += 1;
            }
            TelemetryEvent::ProviderFailed { provider, .. } => {
                snap.provider_stats.entry(provider.clone()).or_default().failures += 1;
            }
            TelemetryEvent::ChainExhausted { .. } => snap.chain_exhausted += 1,
            TelemetryEvent::LogWriteDropped { .. } => snap.dropped_log_writes += 1,
        }
    }

    if snap.path_stats.messages > 0 {
        snap.latency_stats.avg_ms = snap.latency_stats.total_ms as f64 / snap.path_stats.messages as f64;
    }

    snap
}
