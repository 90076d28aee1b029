//! Defines the channel handle host integrations use to deliver events.

use tokio::sync::mpsc;

use super::{PrintEvent, SessionError};

/// Cloneable sender side of the controller's dispatch lane.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    tx: mpsc::Sender<PrintEvent>,
}

impl SessionHandle {
    pub fn new(tx: mpsc::Sender<PrintEvent>) -> Self {
        Self { tx }
    }

    /// Queue an event for the controller. Events are handled in send order.
    pub async fn on_event(&self, event: PrintEvent) -> Result<(), SessionError> {
        self.tx
            .send(event)
            .await
            .map_err(|_| SessionError::ControllerStopped)
    }
}
