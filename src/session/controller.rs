// src/session/controller.rs - Owns all session state and the display tick
use std::sync::Arc;

use chrono::Local;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, Interval, MissedTickBehavior};
use uuid::Uuid;

use crate::config::{ConfigError, SettingsSource};
use crate::host::{display_command, PrinterHost};
use crate::session::{
    EndReason, PrintEvent, SessionError, SessionHandle, SessionState, TickError, CANCELLED_REASON,
};
use crate::status::{LayerProgress, MessageRotator, RotationState, TelemetrySanitizer};

/// Per-print state, rebuilt from fresh settings on every print start.
struct ActiveSession {
    id: Uuid,
    sanitizer: TelemetrySanitizer,
    rotator: MessageRotator,
}

/// What a tick did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    /// No print session is active.
    Idle,
    /// The host says nothing is printing right now (e.g. paused).
    NotPrinting,
    Displayed(String),
}

enum Step {
    Event(Option<PrintEvent>),
    Tick,
}

/// Reacts to print lifecycle events and drives the periodic status tick.
///
/// All mutation goes through `&mut self`; [`run`](Self::run) feeds events
/// and timer ticks through one task, so they never interleave.
pub struct PrintSessionController<H: PrinterHost> {
    host: Arc<H>,
    settings: Arc<dyn SettingsSource>,
    session: Option<ActiveSession>,
    ticker: Option<Interval>,
    layers: LayerProgress,
}

impl<H: PrinterHost + 'static> PrintSessionController<H> {
    pub fn new(host: Arc<H>, settings: Arc<dyn SettingsSource>) -> Self {
        Self {
            host,
            settings,
            session: None,
            ticker: None,
            layers: LayerProgress::default(),
        }
    }

    pub fn state(&self) -> SessionState {
        if self.session.is_some() {
            SessionState::Printing
        } else {
            SessionState::Idle
        }
    }

    pub fn is_ticking(&self) -> bool {
        self.ticker.is_some()
    }

    pub fn rotation_state(&self) -> Option<RotationState> {
        self.session.as_ref().map(|s| s.rotator.state())
    }

    pub fn layers(&self) -> LayerProgress {
        self.layers
    }

    /// Handle one lifecycle event.
    pub async fn on_event(&mut self, event: PrintEvent) -> Result<(), SessionError> {
        tracing::debug!("Status display got event {}", event.name());
        match event {
            PrintEvent::PrintStarted => self.start_session(),
            PrintEvent::PrintDone => self.end_session(EndReason::Finished).await,
            PrintEvent::PrintFailed { reason } if reason == CANCELLED_REASON => {
                // PrintCancelled is reported separately and already tore down.
                tracing::debug!("Ignoring print failure with reason '{}'", reason);
                Ok(())
            }
            PrintEvent::PrintFailed { reason } => {
                tracing::info!("Print failed: {}", reason);
                self.end_session(EndReason::Failed).await
            }
            PrintEvent::PrintCancelled => self.end_session(EndReason::Cancelled).await,
            PrintEvent::Connected => self.announce_host().await,
            PrintEvent::LayerChanged { current, total } => {
                self.layers = LayerProgress { current, total };
                if let Some(session) = self.session.as_mut() {
                    session.rotator.set_layer_info_available(true);
                }
                Ok(())
            }
        }
    }

    fn start_session(&mut self) -> Result<(), SessionError> {
        if let Some(previous) = self.session.take() {
            tracing::warn!("Print started while session {} was active; restarting", previous.id);
        }
        self.cancel_tick();
        self.layers = LayerProgress::default();

        let config = self.settings.load_status().inspect_err(|e| {
            tracing::error!("Failed to load status settings: {}", e);
        })?;
        if let Err(e) = config.validate() {
            tracing::error!("Status display not started: {}", e);
            return Err(ConfigError::from(e).into());
        }

        let session = ActiveSession {
            id: Uuid::new_v4(),
            sanitizer: TelemetrySanitizer::from_config(&config),
            rotator: MessageRotator::new(config.messages.clone()),
        };
        let period = config.tick_interval();
        let mut ticker = interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        tracing::info!(
            "Printing started, status display session {} rotating {} messages every {}s",
            session.id,
            config.messages.len(),
            config.time_to_change
        );
        self.session = Some(session);
        self.ticker = Some(ticker);
        Ok(())
    }

    async fn end_session(&mut self, reason: EndReason) -> Result<(), SessionError> {
        self.cancel_tick();
        match self.session.take() {
            Some(session) => tracing::info!("Printing {}. Status display session {} stopped.", reason, session.id),
            None => tracing::info!("Printing {}.", reason),
        }
        self.host.send_command(&display_command(&format!("Print {}", reason))).await?;
        Ok(())
    }

    /// Stop future ticks. Safe to call when nothing is scheduled.
    pub fn cancel_tick(&mut self) {
        if self.ticker.take().is_some() {
            tracing::debug!("Status tick cancelled");
        }
    }

    async fn announce_host(&self) -> Result<(), SessionError> {
        let identity = self.host.identity().await;
        tracing::info!("Printer connected; announcing {}", identity);
        self.host.send_command(&display_command(&identity.to_string())).await?;
        Ok(())
    }

    /// Push the next status message, if a print is running.
    pub async fn tick(&mut self) -> Result<TickOutcome, TickError> {
        let Some(session) = self.session.as_mut() else {
            return Ok(TickOutcome::Idle);
        };

        let raw = self.host.current_progress().await?;
        if !raw.is_printing {
            return Ok(TickOutcome::NotPrinting);
        }

        let snapshot = session.sanitizer.sanitize(&raw, self.layers, Local::now());
        let message = match session.rotator.next_message(&snapshot) {
            Ok(message) => message,
            Err(source) => {
                return Err(TickError::Rotation {
                    snapshot: Box::new(snapshot),
                    source,
                });
            }
        };

        self.host.send_command(&display_command(&message)).await?;
        Ok(TickOutcome::Displayed(message))
    }

    /// Serve events and ticks until every [`SessionHandle`] is dropped.
    pub async fn run(mut self, mut events: mpsc::Receiver<PrintEvent>) {
        tracing::info!("Status display controller running");
        loop {
            let step = tokio::select! {
                biased;
                event = events.recv() => Step::Event(event),
                _ = next_tick(&mut self.ticker) => Step::Tick,
            };

            match step {
                Step::Event(Some(event)) => {
                    if let Err(e) = self.on_event(event).await {
                        tracing::error!("Status display event failed: {}", e);
                    }
                }
                Step::Event(None) => break,
                Step::Tick => match self.tick().await {
                    Ok(TickOutcome::Displayed(message)) => tracing::debug!("Displayed '{}'", message),
                    Ok(_) => {}
                    Err(e) => tracing::warn!("Skipping status update: {}", e),
                },
            }
        }
        self.cancel_tick();
        tracing::info!("Status display controller stopped");
    }

    /// Move the controller onto its own task and return the event handle.
    pub fn spawn(self, buffer: usize) -> (SessionHandle, JoinHandle<()>) {
        let (tx, rx) = mpsc::channel(buffer);
        let task = tokio::spawn(self.run(rx));
        (SessionHandle::new(tx), task)
    }
}

async fn next_tick(ticker: &mut Option<Interval>) {
    match ticker {
        Some(ticker) => {
            ticker.tick().await;
        }
        None => std::future::pending::<()>().await,
    }
}
