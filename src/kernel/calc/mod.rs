//! Exact arithmetic for attendance, grades and grade-point averages.
//!
//! Nothing here touches the network or the knowledge base. Every answer the
//! engine gives about numbers a student typed comes from these functions,
//! never from a generative backend.

pub mod attendance;
pub mod grading;
pub mod parse;

pub use attendance::*;
pub use grading::*;
pub use parse::*;

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CalcError {
    /// Malformed numeric input. The message is shown to the user as a correction request.
    #[error("{0}")]
    InvalidInput(String),
}

impl CalcError {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        CalcError::InvalidInput(msg.into())
    }
}

pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

// Float noise from percent arithmetic (e.g. 0.8 * 15) must not push a ceil/floor over a boundary.
const EPS: f64 = 1e-9;

pub(crate) fn ceil_tol(value: f64) -> f64 {
    (value - EPS).ceil()
}

pub(crate) fn floor_tol(value: f64) -> f64 {
    (value + EPS).floor()
}
