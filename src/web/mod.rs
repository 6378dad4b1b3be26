//! Web layer module
//!
//! This module provides the HTTP interface for the site icon service. Handlers
//! are thin: they parse the request, call into the [`IconStore`] and shape the
//! result as JSON or raw icon bytes.
//!
//! # Routes
//!
//! - `GET /siteinfo/{domain}`: icon metadata for a domain, optionally waiting
//!   for a lookup in progress (`?timeout=<ms>`)
//! - `GET /icondata?src=<url>`: cached bytes for a single icon
//! - `GET /health`: liveness and cache statistics
//!
//! Every response carries `Access-Control-Allow-Origin: *`.

use anyhow::Result;
use axum::{
    Router,
    extract::Request,
    http::{HeaderValue, header},
    routing::get,
};
use std::net::SocketAddr;
use tower_http::{cors::CorsLayer, set_header::SetResponseHeaderLayer, trace::TraceLayer};
use tracing::{Level, info, warn};

use crate::{config::Config, icon_store::IconStore, models::IconListFormat};

pub mod handlers;
pub mod responses;

pub use responses::{handle_error, message};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub icon_store: IconStore,
    pub icon_format: IconListFormat,
}

impl AppState {
    pub fn new(icon_store: IconStore, icon_format: IconListFormat) -> Self {
        Self {
            icon_store,
            icon_format,
        }
    }
}

/// Web server configuration and setup
pub struct WebServer {
    app: Router,
    addr: SocketAddr,
}

impl WebServer {
    pub fn new(config: &Config, icon_store: IconStore) -> Result<Self> {
        let app = Self::create_router(AppState::new(icon_store, config.response.icon_format));
        let addr: SocketAddr = format!("{}:{}", config.web.host, config.web.port).parse()?;

        Ok(Self { app, addr })
    }

    /// Create the router with all routes and middleware
    pub fn create_router(state: AppState) -> Router {
        Router::new()
            .route("/siteinfo/{domain}", get(handlers::siteinfo::get_site_info))
            .route("/icondata", get(handlers::icondata::get_icon_data))
            .route("/health", get(handlers::health::health_check))
            // Middleware (applied in reverse order)
            .layer(SetResponseHeaderLayer::if_not_present(
                header::ACCESS_CONTROL_ALLOW_ORIGIN,
                HeaderValue::from_static("*"),
            ))
            .layer(CorsLayer::permissive())
            .layer(
                TraceLayer::new_for_http().make_span_with(|request: &Request<_>| {
                    tracing::span!(
                        Level::INFO,
                        "http_request",
                        method = %request.method(),
                        path = %request.uri().path(),
                        query = request.uri().query().unwrap_or("")
                    )
                }),
            )
            .with_state(state)
    }

    /// Start the web server and run until SIGINT or SIGTERM
    pub async fn serve(self) -> Result<()> {
        let listener = tokio::net::TcpListener::bind(&self.addr)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to bind to {}: {}", self.addr, e))?;
        info!("Listening on {}", self.addr);

        axum::serve(listener, self.app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        info!("Web server stopped");
        Ok(())
    }

    /// Get the host address
    pub fn host(&self) -> String {
        self.addr.ip().to_string()
    }

    /// Get the port number
    pub fn port(&self) -> u16 {
        self.addr.port()
    }
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        match (
            signal(SignalKind::terminate()),
            signal(SignalKind::interrupt()),
        ) {
            (Ok(mut sigterm), Ok(mut sigint)) => {
                tokio::select! {
                    _ = sigterm.recv() => info!("Received SIGTERM, shutting down gracefully"),
                    _ = sigint.recv() => info!("Received SIGINT (Ctrl+C), shutting down gracefully"),
                }
            }
            _ => {
                warn!("Failed to install signal handlers, falling back to Ctrl+C");
                ctrl_c().await;
            }
        }
    }

    #[cfg(not(unix))]
    ctrl_c().await;
}

async fn ctrl_c() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Received Ctrl+C, shutting down gracefully"),
        Err(e) => {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    }
}
