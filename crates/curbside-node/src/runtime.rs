//! # Node Runtime
//!
//! Wires the registry, the arrival pipeline, and the gateway transports
//! together, and owns the shutdown signal they all listen on.
//!
//! ## Startup Sequence
//!
//! 1. Validate configuration
//! 2. Build the plate store and load the registry
//! 3. Seed demo records (empty registry + seeding enabled only)
//! 4. Attach bus observers (staff log, client notifications)
//! 5. Start transports (HTTP, channel) and the optional upstream probe
//! 6. Signal ready

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use curbside_arrivals::ArrivalProcessor;
use curbside_bus::{InProcessEventBus, PickupEvent, SubscriptionToken};
use curbside_gateway::{
    CameraSimulator, ChannelTransport, GatewayError, HttpConfig, HttpTransport, IngressAdapter,
    NotificationChannel, ProbeConfig, UpstreamMonitor,
};
use curbside_registry::{JsonFileStore, MemoryStore, PlateRegistry, PlateStore, SystemClock};
use curbside_types::PlateNumber;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::config::{NodeConfig, StorageBackend};

/// Queue depth of the in-process channel transport.
const CHANNEL_CAPACITY: usize = 64;

/// Per-receiver backlog of the client notification channel.
const NOTIFICATION_CAPACITY: usize = 32;

/// How long shutdown waits for the HTTP transport to drain.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(2);

/// Records seeded into an empty registry so a fresh node is demoable.
const DEMO_RECORDS: [(&str, &str, Option<&str>); 3] = [
    ("ABC123", "Emma Johnson", Some("Pickup at east entrance")),
    ("XYZ789", "Noah Williams", None),
    ("DEF456", "Olivia Davis", Some("Has asthma medication in backpack")),
];

/// The running node: every subsystem wired and listening.
pub struct NodeRuntime {
    registry: Arc<PlateRegistry>,
    bus: Arc<InProcessEventBus>,
    ingress: Arc<IngressAdapter>,
    channel: ChannelTransport,
    notifications: NotificationChannel,
    staff_log_token: SubscriptionToken,
    shutdown_tx: watch::Sender<()>,
    http_handle: JoinHandle<Result<(), GatewayError>>,
}

impl NodeRuntime {
    /// Validate the configuration, wire every subsystem, and start the
    /// transports.
    ///
    /// # Errors
    ///
    /// Fails when the configuration is invalid, the store cannot be read,
    /// seeding cannot be persisted, or the HTTP listener cannot bind.
    pub async fn start(config: NodeConfig) -> Result<Self> {
        config.validate()?;

        info!("==========================================");
        info!("  Curbside Node v0.1.0");
        info!("  Arrival ingestion and notification");
        info!("==========================================");

        let store = build_store(&config);
        let registry = Arc::new(
            PlateRegistry::load(store)
                .await
                .context("Failed to load the plate registry")?,
        );
        seed_demo_records(&registry, &config).await?;

        let bus = Arc::new(InProcessEventBus::new());
        let staff_log_token = attach_staff_log(&bus);
        let notifications = NotificationChannel::attach(&bus, NOTIFICATION_CAPACITY);

        let processor = Arc::new(ArrivalProcessor::new(
            registry.clone(),
            bus.clone(),
            Arc::new(SystemClock),
        ));
        let ingress = Arc::new(IngressAdapter::new(processor));

        let (shutdown_tx, shutdown_rx) = watch::channel(());

        let http = HttpTransport::new(
            HttpConfig {
                listen_addr: config.listen_addr,
            },
            ingress.clone(),
            registry.clone(),
        );
        let http_handle = http
            .start(shutdown_rx.clone())
            .await
            .context("Failed to start the HTTP transport")?;

        let channel = ChannelTransport::start(ingress.clone(), CHANNEL_CAPACITY);

        if let Some(target) = config.upstream_addr {
            let mut probe = ProbeConfig::new(target);
            probe.interval = config.probe_interval;
            probe.validate().context("Invalid probe configuration")?;
            let monitor = UpstreamMonitor::new(probe, bus.clone(), Arc::new(SystemClock));
            tokio::spawn(monitor.run(shutdown_rx.clone()));
        } else {
            info!("[node] No upstream configured, probe disabled");
        }

        info!(plates = registry.len().await, "[node] All subsystems running");

        Ok(Self {
            registry,
            bus,
            ingress,
            channel,
            notifications,
            staff_log_token,
            shutdown_tx,
            http_handle,
        })
    }

    /// Signal every transport to stop and wait for the HTTP listener to
    /// drain.
    pub async fn shutdown(self) {
        info!("[node] Initiating graceful shutdown");
        if self.shutdown_tx.send(()).is_err() {
            warn!("[node] No transports were listening for the shutdown signal");
        }

        match tokio::time::timeout(SHUTDOWN_GRACE, self.http_handle).await {
            Ok(Ok(Ok(()))) => {}
            Ok(Ok(Err(e))) => error!(error = %e, "[node] HTTP transport failed during shutdown"),
            Ok(Err(e)) => error!(error = %e, "[node] HTTP transport task panicked"),
            Err(_) => warn!("[node] HTTP transport did not stop within the grace period"),
        }

        self.notifications.detach(&self.bus);
        self.bus.unsubscribe(self.staff_log_token);
        info!("[node] Shutdown complete");
    }

    /// Handle to the registry, for administrative tooling.
    #[must_use]
    pub fn registry(&self) -> Arc<PlateRegistry> {
        Arc::clone(&self.registry)
    }

    /// Handle to the in-process channel transport.
    #[must_use]
    pub fn channel(&self) -> ChannelTransport {
        self.channel.clone()
    }

    /// The client notification fan-out point.
    #[must_use]
    pub fn notifications(&self) -> &NotificationChannel {
        &self.notifications
    }

    /// A camera simulator feeding this node's pipeline.
    #[must_use]
    pub fn camera_simulator(&self) -> CameraSimulator {
        CameraSimulator::new(self.ingress.clone())
    }
}

/// Pick the plate store the configuration asks for.
fn build_store(config: &NodeConfig) -> Arc<dyn PlateStore> {
    match config.storage {
        StorageBackend::Memory => {
            info!("[node] Using the in-memory plate store");
            Arc::new(MemoryStore::new())
        }
        StorageBackend::File => {
            info!(dir = %config.data_dir.display(), "[node] Using the file-backed plate store");
            Arc::new(JsonFileStore::new(&config.data_dir))
        }
    }
}

/// Seed the demo records into an empty registry.
async fn seed_demo_records(registry: &PlateRegistry, config: &NodeConfig) -> Result<()> {
    if !config.seed_demo_data {
        return Ok(());
    }
    if !registry.is_empty().await {
        debug!("[node] Registry already has records, skipping demo seed");
        return Ok(());
    }

    for (raw, child, notes) in DEMO_RECORDS {
        let plate = PlateNumber::parse(raw).context("Demo plate failed to parse")?;
        registry
            .add(plate, child, notes.map(str::to_string))
            .await
            .with_context(|| format!("Failed to seed demo plate {raw}"))?;
    }
    info!(count = DEMO_RECORDS.len(), "[node] Seeded demo plate records");
    Ok(())
}

/// The staff-facing observer: arrivals and upstream transitions land in
/// the operator log.
fn attach_staff_log(bus: &InProcessEventBus) -> SubscriptionToken {
    bus.subscribe_fn(|event| {
        match event {
            PickupEvent::Arrival(arrival) => {
                info!(
                    "[staff] Plate {} recognized: {} is ready for pickup",
                    arrival.plate_number, arrival.child_name
                );
            }
            PickupEvent::UpstreamStatus { online: true, .. } => {
                info!("[staff] Upstream recognition feed is reachable");
            }
            PickupEvent::UpstreamStatus { online: false, .. } => {
                warn!("[staff] Upstream recognition feed is unreachable");
            }
        }
        Ok(())
    })
}
