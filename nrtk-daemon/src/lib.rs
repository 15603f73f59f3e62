//! Repeat scheduler and tracing setup for `nrtk-sync --every`.

mod error;
pub mod scheduler;
mod telemetry;

pub use error::DaemonError;
pub use scheduler::{run_every, start_blocking, RunStats};
pub use telemetry::init_tracing;
