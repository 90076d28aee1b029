// src/session/mod.rs - Print lifecycle and the periodic status tick
pub mod controller;
pub mod handle;

use std::fmt;

use thiserror::Error;

use crate::config::ConfigError;
use crate::host::HostError;
use crate::status::{ProgressSnapshot, RotatorError};

pub use controller::{PrintSessionController, TickOutcome};
pub use handle::SessionHandle;

/// Failure reason the host uses when the user aborted the print.
pub const CANCELLED_REASON: &str = "cancelled";

/// Lifecycle notifications from the printer host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrintEvent {
    PrintStarted,
    PrintDone,
    PrintFailed { reason: String },
    PrintCancelled,
    Connected,
    LayerChanged { current: u32, total: u32 },
}

impl PrintEvent {
    pub fn name(&self) -> &'static str {
        match self {
            PrintEvent::PrintStarted => "PrintStarted",
            PrintEvent::PrintDone => "PrintDone",
            PrintEvent::PrintFailed { .. } => "PrintFailed",
            PrintEvent::PrintCancelled => "PrintCancelled",
            PrintEvent::Connected => "Connected",
            PrintEvent::LayerChanged { .. } => "LayerChanged",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Printing,
}

/// Why a print session ended; shown on the display as "Print <reason>".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndReason {
    Finished,
    Failed,
    Cancelled,
}

impl fmt::Display for EndReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            EndReason::Finished => "finished",
            EndReason::Failed => "failed",
            EndReason::Cancelled => "cancelled",
        })
    }
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Cannot start status display: {0}")]
    Config(#[from] ConfigError),
    #[error("Host error: {0}")]
    Host(#[from] HostError),
    #[error("Status controller is no longer running")]
    ControllerStopped,
}

/// A tick that produced nothing for the display. The session carries on.
#[derive(Debug, Error)]
pub enum TickError {
    #[error("Host error: {0}")]
    Host(#[from] HostError),
    #[error("Could not build status message from {snapshot:?}: {source}")]
    Rotation {
        snapshot: Box<ProgressSnapshot>,
        #[source]
        source: RotatorError,
    },
}
