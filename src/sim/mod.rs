// src/sim/mod.rs - Simulated printer host for demos and tests
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tokio::time::{sleep, Duration, Instant};

use crate::config::SimulationConfig;
use crate::host::{HostError, HostIdentity, PrinterHost, RawProgress};
use crate::session::{PrintEvent, SessionError, SessionHandle};

/// How often the simulated print checks for layer changes.
const POLL_INTERVAL: Duration = Duration::from_millis(100);

#[derive(Debug, Default)]
struct SimState {
    started: Option<Instant>,
    finished: bool,
    sent: Vec<String>,
}

/// A printer that "prints" in accelerated wall-clock time.
pub struct SimulatedHost {
    config: SimulationConfig,
    state: RwLock<SimState>,
    identity: Option<HostIdentity>,
}

impl SimulatedHost {
    pub fn new(config: SimulationConfig) -> Self {
        Self {
            config,
            state: RwLock::new(SimState::default()),
            identity: None,
        }
    }

    /// Report a fixed identity instead of discovering the real one.
    pub fn with_identity(mut self, identity: HostIdentity) -> Self {
        self.identity = Some(identity);
        self
    }

    pub async fn start_print(&self) {
        let mut state = self.state.write().await;
        state.started = Some(Instant::now());
        state.finished = false;
        tracing::info!(
            "Simulated print started: {}s over {} layers at {}x",
            self.config.print_seconds,
            self.config.layers,
            self.config.speedup
        );
    }

    pub async fn finish_print(&self) {
        self.state.write().await.finished = true;
    }

    /// Every command pushed to the simulated printer, in order.
    pub async fn sent_commands(&self) -> Vec<String> {
        self.state.read().await.sent.clone()
    }

    /// Simulated seconds printed so far, capped at the job length.
    async fn printed_seconds(&self) -> Option<f64> {
        let state = self.state.read().await;
        let started = state.started?;
        let total = self.config.print_seconds as f64;
        if state.finished {
            return Some(total);
        }
        Some((started.elapsed().as_secs_f64() * self.config.speedup).min(total))
    }

    pub async fn current_layer(&self) -> u32 {
        let total = self.config.print_seconds.max(1) as f64;
        match self.printed_seconds().await {
            Some(printed) => ((printed / total) * f64::from(self.config.layers)).ceil() as u32,
            None => 0,
        }
    }

    pub async fn is_done(&self) -> bool {
        matches!(self.printed_seconds().await, Some(p) if p >= self.config.print_seconds as f64)
    }
}

#[async_trait]
impl PrinterHost for SimulatedHost {
    async fn current_progress(&self) -> Result<RawProgress, HostError> {
        let finished = self.state.read().await.finished;
        let Some(printed) = self.printed_seconds().await else {
            return Ok(RawProgress::default());
        };
        let total = self.config.print_seconds.max(1) as f64;
        let completion = printed / total * 100.0;

        // Estimators only kick in after the first couple of percent.
        let (time_left, origin) = if completion < 2.0 {
            (None, None)
        } else {
            let jitter = 1.0 + (rand::random::<f64>() - 0.5) * 0.1;
            let origin = if completion < 10.0 {
                "linear"
            } else if completion < 50.0 {
                "mixed-analysis"
            } else {
                "genius"
            };
            (Some(((total - printed) * jitter).max(0.0) as i64), Some(origin.to_string()))
        };

        Ok(RawProgress {
            completion: Some(completion),
            print_time_left: time_left,
            print_time_left_origin: origin,
            estimated_print_time: Some(total),
            is_printing: !finished && printed < total,
        })
    }

    async fn send_command(&self, command: &str) -> Result<(), HostError> {
        tracing::info!("-> {}", command);
        self.state.write().await.sent.push(command.to_string());
        Ok(())
    }

    async fn identity(&self) -> HostIdentity {
        match &self.identity {
            Some(identity) => identity.clone(),
            None => HostIdentity::discover().await,
        }
    }
}

/// Drive one complete print on `host`, reporting lifecycle events through
/// `handle` the way a real host integration would.
pub async fn run_simulated_print(host: Arc<SimulatedHost>, handle: &SessionHandle) -> Result<(), SessionError> {
    let layer_info = host.config.layer_info;
    let total_layers = host.config.layers;

    handle.on_event(PrintEvent::Connected).await?;
    host.start_print().await;
    handle.on_event(PrintEvent::PrintStarted).await?;

    let mut last_layer = 0;
    while !host.is_done().await {
        sleep(POLL_INTERVAL).await;
        let layer = host.current_layer().await;
        if layer_info && layer != last_layer {
            last_layer = layer;
            handle
                .on_event(PrintEvent::LayerChanged { current: layer, total: total_layers })
                .await?;
        }
    }

    host.finish_print().await;
    handle.on_event(PrintEvent::PrintDone).await?;
    Ok(())
}
