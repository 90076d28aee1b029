// src/host/mod.rs - Interface to the printer host
pub mod display;
pub mod identity;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use display::display_command;
pub use identity::HostIdentity;

/// Transient failures talking to the host. A tick that hits one is skipped.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HostError {
    #[error("Telemetry query failed: {0}")]
    Telemetry(String),
    #[error("Command '{command}' rejected: {reason}")]
    Command { command: String, reason: String },
    #[error("Printer disconnected")]
    Disconnected,
}

/// Progress telemetry as reported by the host, before sanitizing.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct RawProgress {
    /// Percent complete, 0-100.
    pub completion: Option<f64>,
    pub print_time_left: Option<i64>,
    /// Which estimator produced `print_time_left` (e.g. "linear", "genius").
    pub print_time_left_origin: Option<String>,
    /// Whole-job estimate from file analysis, in seconds.
    pub estimated_print_time: Option<f64>,
    pub is_printing: bool,
}

/// The host side of the status display.
#[async_trait]
pub trait PrinterHost: Send + Sync {
    async fn current_progress(&self) -> Result<RawProgress, HostError>;

    /// Queue a G-code line for the printer. No acknowledgment is awaited.
    async fn send_command(&self, command: &str) -> Result<(), HostError>;

    /// Name and address shown when the printer connects.
    async fn identity(&self) -> HostIdentity {
        HostIdentity::discover().await
    }
}
