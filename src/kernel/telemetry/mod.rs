//! Request telemetry and query logging.
//!
//! # SAFETY INVARIANT
//! Telemetry is a write-only side channel. Nothing in classification, context
//! selection or provider routing may read it back.
//!
//! # PRIVACY INVARIANT
//! [`TelemetryEvent`]s never carry message or response text. Only ids, intent
//! names, provider names, durations and counts. User text goes exclusively to
//! the [`QueryLog`] sink, which stands in for the persistence layer.

pub mod event;
pub mod metrics;
pub mod recorder;
pub mod sink;

pub use event::*;
pub use metrics::{compute_snapshot, TelemetrySnapshot};
pub use recorder::TelemetryRecorder;
pub use sink::*;
