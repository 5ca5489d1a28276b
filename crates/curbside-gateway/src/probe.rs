//! # Upstream Probe
//!
//! Periodically checks whether the upstream recognition feed is
//! reachable and publishes a [`PickupEvent::UpstreamStatus`] whenever the
//! answer changes. Probes are edge-triggered on the bus: a stretch of
//! identical results produces one event, not one per tick.
//!
//! The probe is a plain TCP connect. It says nothing about the health of
//! the service behind the socket, only whether something is accepting
//! connections at the configured address.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use curbside_bus::{EventPublisher, PickupEvent};
use curbside_registry::Clock;
use tokio::net::TcpStream;
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

use crate::error::GatewayError;

/// Settings for the upstream probe loop.
#[derive(Debug, Clone)]
pub struct ProbeConfig {
    /// Address of the upstream feed.
    pub target: SocketAddr,
    /// Time between probe attempts.
    pub interval: Duration,
    /// How long one connect attempt may take before it counts as down.
    pub timeout: Duration,
}

impl ProbeConfig {
    /// Probe `target` on the default cadence.
    #[must_use]
    pub fn new(target: SocketAddr) -> Self {
        Self {
            target,
            interval: Duration::from_secs(5),
            timeout: Duration::from_secs(2),
        }
    }

    /// Reject settings the probe loop cannot run with.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Config`] for a zero interval or timeout.
    pub fn validate(&self) -> Result<(), GatewayError> {
        if self.interval.is_zero() {
            return Err(GatewayError::Config(
                "probe interval must be non-zero".to_string(),
            ));
        }
        if self.timeout.is_zero() {
            return Err(GatewayError::Config(
                "probe timeout must be non-zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// Watches the upstream feed and reports reachability transitions.
pub struct UpstreamMonitor {
    config: ProbeConfig,
    bus: Arc<dyn EventPublisher>,
    clock: Arc<dyn Clock>,
}

impl UpstreamMonitor {
    #[must_use]
    pub fn new(config: ProbeConfig, bus: Arc<dyn EventPublisher>, clock: Arc<dyn Clock>) -> Self {
        Self { config, bus, clock }
    }

    /// Probe until the shutdown channel fires or its sender is dropped.
    ///
    /// The first probe always publishes, so subscribers learn the initial
    /// state without waiting for a transition.
    pub async fn run(self, mut shutdown: watch::Receiver<()>) {
        let mut ticker = tokio::time::interval(self.config.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut last_online: Option<bool> = None;

        info!(target = %self.config.target, "[gateway] Upstream monitor started");
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let online = self.probe_once().await;
                    if last_online != Some(online) {
                        info!(online, target = %self.config.target, "[gateway] Upstream status changed");
                        self.bus.publish(&PickupEvent::UpstreamStatus {
                            online,
                            probed_at: self.clock.now(),
                        });
                        last_online = Some(online);
                    }
                }
                _ = shutdown.changed() => break,
            }
        }
        info!("[gateway] Upstream monitor stopped");
    }

    async fn probe_once(&self) -> bool {
        match tokio::time::timeout(
            self.config.timeout,
            TcpStream::connect(self.config.target),
        )
        .await
        {
            Ok(Ok(_)) => true,
            Ok(Err(e)) => {
                debug!(target = %self.config.target, error = %e, "[gateway] Upstream probe failed");
                false
            }
            Err(_) => {
                debug!(target = %self.config.target, "[gateway] Upstream probe timed out");
                false
            }
        }
    }
}
