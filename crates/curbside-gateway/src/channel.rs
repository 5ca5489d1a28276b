//! # In-Process Channel Transport
//!
//! Submission path for co-located producers (kiosk processes, bridge
//! tasks) that talk to the gateway without a socket. Requests flow over
//! an mpsc channel to a single worker task; each carries a oneshot for
//! its reply, so callers see the same request/reply shape as HTTP
//! clients.
//!
//! The worker stops on its own once every handle to the transport has
//! been dropped.

use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::GatewayError;
use crate::ingress::{IngressAdapter, IngressReply};

/// One queued submission together with its reply slot.
struct ChannelRequest {
    method: String,
    body: Vec<u8>,
    reply: oneshot::Sender<IngressReply>,
}

/// Handle to the channel transport. Cheap to clone; all clones feed the
/// same worker.
#[derive(Clone)]
pub struct ChannelTransport {
    tx: mpsc::Sender<ChannelRequest>,
}

impl ChannelTransport {
    /// Spawn the worker task and return a submission handle.
    ///
    /// Must be called from within a Tokio runtime. `capacity` bounds the
    /// number of queued submissions; senders wait when it is full.
    #[must_use]
    pub fn start(ingress: Arc<IngressAdapter>, capacity: usize) -> Self {
        let (tx, mut rx) = mpsc::channel::<ChannelRequest>(capacity);

        tokio::spawn(async move {
            info!("[gateway] Channel transport worker started");
            while let Some(request) = rx.recv().await {
                let correlation_id = Uuid::new_v4();
                debug!(
                    %correlation_id,
                    method = %request.method,
                    bytes = request.body.len(),
                    "[gateway] Channel submission"
                );

                let reply = ingress.handle(&request.method, &request.body).await;
                if request.reply.send(reply).is_err() {
                    debug!(%correlation_id, "[gateway] Channel caller went away");
                }
            }
            info!("[gateway] Channel transport worker stopped");
        });

        Self { tx }
    }

    /// Submit one request and wait for its reply.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::ChannelClosed`] when the worker is gone.
    pub async fn submit(&self, method: &str, body: Vec<u8>) -> Result<IngressReply, GatewayError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        let request = ChannelRequest {
            method: method.to_string(),
            body,
            reply: reply_tx,
        };

        self.tx
            .send(request)
            .await
            .map_err(|_| GatewayError::ChannelClosed)?;
        reply_rx.await.map_err(|_| GatewayError::ChannelClosed)
    }
}
