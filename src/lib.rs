// krusty-status: rotating print progress messages for the printer display
pub mod config;
pub mod host;
pub mod session;
pub mod sim;
pub mod status;
pub mod template;

// Re-exports for host integrations
pub use crate::config::{Config, StatusConfig};
pub use crate::host::{PrinterHost, RawProgress};
pub use crate::session::{PrintEvent, PrintSessionController, SessionHandle, SessionState};
