//! # Camera Simulator
//!
//! Stand-in for the recognition camera during demos and tests. It
//! fabricates the exact submission a camera would POST and pushes it
//! through the ingress adapter, so simulated readings exercise the whole
//! pipeline rather than a shortcut.

use std::sync::Arc;

use serde_json::json;
use tracing::{info, warn};

use crate::ingress::{IngressAdapter, IngressReply};

/// Drives the ingress adapter with fabricated camera readings.
pub struct CameraSimulator {
    ingress: Arc<IngressAdapter>,
}

impl CameraSimulator {
    #[must_use]
    pub fn new(ingress: Arc<IngressAdapter>) -> Self {
        Self { ingress }
    }

    /// Submit one simulated reading, raw and unnormalized, exactly as a
    /// camera would report it.
    pub async fn submit(&self, raw_plate: &str) -> IngressReply {
        let body = serde_json::to_vec(&json!({ "plateNumber": raw_plate })).unwrap_or_default();
        let reply = self.ingress.handle("POST", &body).await;

        if reply.status.is_success() {
            info!(plate = raw_plate, "[gateway] Simulated reading accepted");
        } else {
            warn!(
                plate = raw_plate,
                status = ?reply.status,
                "[gateway] Simulated reading refused"
            );
        }
        reply
    }
}
