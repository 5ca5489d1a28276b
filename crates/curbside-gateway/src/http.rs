//! # HTTP Transport
//!
//! Axum front end for the ingress adapter plus the administrative
//! registry routes.
//!
//! ## Routes
//!
//! | Route                  | Verbs          | Purpose                        |
//! |------------------------|----------------|--------------------------------|
//! | `/api/plate`           | any            | Plate submissions (camera)     |
//! | `/api/plates`          | GET, POST      | List / register plates         |
//! | `/api/plates/:plate`   | PATCH, DELETE  | Edit / remove one plate        |
//! | `/health`              | GET            | Liveness and registry size     |
//!
//! `/api/plate` hand-rolls its CORS headers because the submission
//! contract fixes them exactly (including a bodiless 204 preflight);
//! the administrative routes use a permissive [`CorsLayer`] instead.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::{header, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{any, get, patch};
use axum::{Json, Router};
use curbside_registry::{PlateRegistry, PlateUpdate};
use curbside_types::PlateNumber;
use serde_json::json;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

use crate::error::GatewayError;
use crate::ingress::{registry_error_reply, IngressAdapter, IngressReply, StatusCategory};
use crate::wire::{self, RegisterPlateRequest, UpdatePlateRequest, MISSING_PLATE_MESSAGE};

/// Default listen address for the HTTP transport.
pub const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:8787";

// =====================================================================
// CONFIGURATION AND STATE
// =====================================================================

/// HTTP transport settings.
#[derive(Debug, Clone)]
pub struct HttpConfig {
    /// Address the listener binds.
    pub listen_addr: SocketAddr,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            // The literal is a valid socket address, checked by the tests.
            listen_addr: DEFAULT_LISTEN_ADDR
                .parse()
                .unwrap_or_else(|_| SocketAddr::from(([127, 0, 0, 1], 8787))),
        }
    }
}

/// Shared state handed to every route handler.
#[derive(Clone)]
pub struct AppState {
    /// Submission entry point.
    pub ingress: Arc<IngressAdapter>,
    /// Registry used by the administrative routes.
    pub registry: Arc<PlateRegistry>,
}

// =====================================================================
// TRANSPORT LIFECYCLE
// =====================================================================

/// The HTTP front end. Construct it, then either [`Self::router`] for
/// in-process testing or [`Self::start`] to bind a real listener.
pub struct HttpTransport {
    config: HttpConfig,
    state: AppState,
}

impl HttpTransport {
    #[must_use]
    pub fn new(
        config: HttpConfig,
        ingress: Arc<IngressAdapter>,
        registry: Arc<PlateRegistry>,
    ) -> Self {
        Self {
            config,
            state: AppState { ingress, registry },
        }
    }

    /// The full route tree, ready to serve or to drive directly in tests.
    #[must_use]
    pub fn router(&self) -> Router {
        build_router(self.state.clone())
    }

    /// Bind the listener and serve on a spawned task until the shutdown
    /// channel fires or its sender is dropped.
    ///
    /// Binding happens before the task is spawned, so an unusable address
    /// fails startup instead of a background task.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Bind`] when the address cannot be bound.
    /// A later serve failure is reported through the returned handle as
    /// [`GatewayError::Serve`].
    pub async fn start(
        self,
        mut shutdown: watch::Receiver<()>,
    ) -> Result<JoinHandle<Result<(), GatewayError>>, GatewayError> {
        let listener = tokio::net::TcpListener::bind(self.config.listen_addr)
            .await
            .map_err(|source| GatewayError::Bind {
                addr: self.config.listen_addr,
                source,
            })?;
        info!(addr = %self.config.listen_addr, "[gateway] HTTP transport listening");

        let router = self.router();
        let handle = tokio::spawn(async move {
            axum::serve(listener, router)
                .with_graceful_shutdown(async move {
                    let _ = shutdown.changed().await;
                })
                .await?;
            info!("[gateway] HTTP transport stopped");
            Ok(())
        });
        Ok(handle)
    }
}

/// Assemble the route tree around shared state.
fn build_router(state: AppState) -> Router {
    let admin = Router::new()
        .route("/api/plates", get(list_plates).post(register_plate))
        .route("/api/plates/:plate", patch(update_plate).delete(remove_plate))
        .route("/health", get(health))
        .layer(ServiceBuilder::new().layer(admin_cors_layer()));

    Router::new()
        .route("/api/plate", any(submit_plate))
        .merge(admin)
        .with_state(state)
}

/// Permissive CORS for the administrative routes. The submission route
/// does not use this; its headers are part of the fixed wire contract.
fn admin_cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any)
}

// =====================================================================
// SUBMISSION ROUTE
// =====================================================================

async fn submit_plate(State(state): State<AppState>, method: Method, body: Bytes) -> Response {
    let reply = state.ingress.handle(method.as_str(), &body).await;
    plate_response(reply)
}

/// Render an ingress reply onto the fixed submission wire contract.
///
/// Every reply carries `Access-Control-Allow-Origin: *`. Preflight is a
/// bodiless 204 that additionally advertises the allowed method and
/// header; it must not carry a content type.
fn plate_response(reply: IngressReply) -> Response {
    if reply.is_preflight() {
        return (
            StatusCode::NO_CONTENT,
            [
                (header::ACCESS_CONTROL_ALLOW_ORIGIN, "*"),
                (header::ACCESS_CONTROL_ALLOW_METHODS, "POST, OPTIONS"),
                (header::ACCESS_CONTROL_ALLOW_HEADERS, "Content-Type"),
            ],
        )
            .into_response();
    }

    (
        status_code(reply.status),
        [(header::ACCESS_CONTROL_ALLOW_ORIGIN, "*")],
        Json(reply.payload),
    )
        .into_response()
}

fn status_code(category: StatusCategory) -> StatusCode {
    match category {
        StatusCategory::Ok => StatusCode::OK,
        StatusCategory::BadRequest => StatusCode::BAD_REQUEST,
        StatusCategory::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
        StatusCategory::NotFound => StatusCode::NOT_FOUND,
        StatusCategory::Conflict => StatusCode::CONFLICT,
        StatusCategory::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

// =====================================================================
// ADMINISTRATIVE ROUTES
// =====================================================================

fn admin_response(reply: IngressReply) -> Response {
    (status_code(reply.status), Json(reply.payload)).into_response()
}

fn admin_bad_request(message: impl Into<String>) -> Response {
    admin_response(IngressReply::new(
        StatusCategory::BadRequest,
        wire::failure(message),
    ))
}

async fn list_plates(State(state): State<AppState>) -> Response {
    let mut records = state.registry.list().await;
    // Recent arrivals first; the registry's plate ordering survives as the
    // tie break because the sort is stable.
    records.sort_by(|a, b| b.last_arrival.cmp(&a.last_arrival));

    admin_response(IngressReply::new(
        StatusCategory::Ok,
        wire::success_data(json!({ "plates": records })),
    ))
}

async fn register_plate(State(state): State<AppState>, body: Bytes) -> Response {
    let Ok(request) = serde_json::from_slice::<RegisterPlateRequest>(&body) else {
        return admin_bad_request("Request body must be a JSON object");
    };
    let Some(plate) = request
        .plate_number
        .as_deref()
        .and_then(|raw| PlateNumber::parse(raw).ok())
    else {
        return admin_bad_request(MISSING_PLATE_MESSAGE);
    };

    let child_name = request.child_name.unwrap_or_default();
    match state.registry.add(plate, &child_name, request.notes).await {
        Ok(record) => {
            let payload = wire::success(
                format!("Plate {} registered", record.plate_number),
                serde_json::to_value(&record).unwrap_or_default(),
            );
            (StatusCode::CREATED, Json(payload)).into_response()
        }
        Err(err) => admin_response(registry_error_reply(&err)),
    }
}

async fn update_plate(
    State(state): State<AppState>,
    Path(plate): Path<String>,
    body: Bytes,
) -> Response {
    let Ok(plate) = PlateNumber::parse(&plate) else {
        return admin_bad_request("Invalid plate number in path");
    };
    let Ok(request) = serde_json::from_slice::<UpdatePlateRequest>(&body) else {
        return admin_bad_request("Request body must be a JSON object");
    };

    let update = PlateUpdate {
        child_name: request.child_name,
        notes: request.notes,
    };
    match state.registry.update_fields(&plate, update).await {
        Ok(record) => admin_response(IngressReply::new(
            StatusCategory::Ok,
            wire::success_data(serde_json::to_value(&record).unwrap_or_default()),
        )),
        Err(err) => admin_response(registry_error_reply(&err)),
    }
}

async fn remove_plate(State(state): State<AppState>, Path(plate): Path<String>) -> Response {
    let Ok(plate) = PlateNumber::parse(&plate) else {
        return admin_bad_request("Invalid plate number in path");
    };

    match state.registry.remove(&plate).await {
        Ok(removed) => admin_response(IngressReply::new(
            StatusCategory::Ok,
            wire::success(
                format!("Plate {} removed", removed.plate_number),
                serde_json::to_value(&removed).unwrap_or_default(),
            ),
        )),
        Err(err) => admin_response(registry_error_reply(&err)),
    }
}

async fn health(State(state): State<AppState>) -> Response {
    let plates = state.registry.len().await;
    (
        StatusCode::OK,
        Json(json!({ "status": "ok", "plates": plates })),
    )
        .into_response()
}
