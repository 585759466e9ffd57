//! Application startup and lifecycle management.

use crate::config::Settings;
use crate::handlers::{
    app::{health_check, metrics_endpoint, readiness_check},
    bills::{
        add_item, auto_fill, cancel_bill, create_bill, get_bill, receipt, remove_item,
        submit_bill, update_metadata,
    },
};
use crate::services::{spawn_sweeper, BillStore, BillingBackend, HttpBillingBackend};
use axum::{
    middleware::from_fn,
    routing::{delete, get, post, put},
    Router,
};
use service_core::error::AppError;
use service_core::middleware::{metrics::metrics_middleware, tracing::request_id_middleware};
use service_core::observability::REQUEST_ID_HEADER;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub store: BillStore,
    pub backend: Arc<dyn BillingBackend>,
    pub settings: Arc<Settings>,
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/ready", get(readiness_check))
        .route("/metrics", get(metrics_endpoint))
        .route("/bills", post(create_bill))
        .route("/bills/:bill_id", get(get_bill).delete(cancel_bill))
        .route("/bills/:bill_id/metadata", put(update_metadata))
        .route("/bills/:bill_id/auto-fill", post(auto_fill))
        .route("/bills/:bill_id/items", post(add_item))
        .route("/bills/:bill_id/items/:item_id", delete(remove_item))
        .route("/bills/:bill_id/receipt", get(receipt))
        .route("/bills/:bill_id/submit", post(submit_bill))
        .layer(from_fn(metrics_middleware))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &axum::extract::Request| {
                let request_id = request
                    .headers()
                    .get(REQUEST_ID_HEADER)
                    .and_then(|value| value.to_str().ok())
                    .unwrap_or("-");
                tracing::info_span!(
                    "http_request",
                    method = %request.method(),
                    uri = %request.uri(),
                    request_id = %request_id,
                )
            }),
        )
        .layer(from_fn(request_id_middleware))
        .with_state(state)
}

/// Application container for managing server lifecycle.
pub struct Application {
    port: u16,
    listener: TcpListener,
    state: AppState,
}

impl Application {
    /// Build the application with the given configuration.
    ///
    /// Port 0 binds a random free port, which the tests rely on.
    pub async fn build(settings: Settings) -> Result<Self, AppError> {
        let tax_rate = settings.billing.tax_rate()?;
        let backend = HttpBillingBackend::new(settings.backend.clone())?;
        tracing::info!(
            backend_url = %backend.base_url(),
            tax_rate = %tax_rate,
            "Billing backend configured"
        );

        let state = AppState {
            store: BillStore::new(tax_rate),
            backend: Arc::new(backend),
            settings: Arc::new(settings.clone()),
        };

        let address = format!("{}:{}", settings.server.host, settings.server.port);
        let listener = TcpListener::bind(&address).await.map_err(|e| {
            tracing::error!("Failed to bind TCP listener to {}: {}", address, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!("billing-desk listening on port {}", port);

        Ok(Self {
            port,
            listener,
            state,
        })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn state(&self) -> AppState {
        self.state.clone()
    }

    /// Serve requests and sweep idle drafts until the server stops.
    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        let billing = &self.state.settings.billing;
        let sweeper = spawn_sweeper(
            self.state.store.clone(),
            billing.draft_idle_ttl(),
            billing.sweep_interval(),
        );

        let router = build_router(self.state);
        let result = axum::serve(self.listener, router).await.map_err(|e| {
            tracing::error!("HTTP server error: {}", e);
            std::io::Error::other(format!("HTTP server error: {}", e))
        });
        sweeper.abort();
        result
    }
}
