pub mod calc;
pub mod context;
pub mod conversation;
pub mod engine;
pub mod handlers;
pub mod intent;
pub mod responses;
pub mod telemetry;
pub mod time;
