//! HTTP server for the Prometheus metrics endpoint.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::extract::State;
use axum::http::StatusCode;
use axum::http::header::CONTENT_TYPE;
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use tokio::sync::watch;
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::exposition;
use crate::metrics::Collector;

/// Application state shared across handlers.
struct AppState<C> {
    collector: Arc<C>,
    landing_page: String,
}

/// Create the HTTP router.
pub fn create_router<C: Collector>(collector: Arc<C>, metrics_path: &str) -> Router {
    let state = Arc::new(AppState {
        collector,
        landing_page: landing_page(metrics_path),
    });

    Router::new()
        .route(metrics_path, get(metrics_handler::<C>))
        .route("/", get(landing_handler::<C>))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Handler for the metrics endpoint. Every request runs one scrape.
async fn metrics_handler<C: Collector>(State(state): State<Arc<AppState<C>>>) -> Response {
    let samples = state.collector.collect().await;
    let body = exposition::render(&samples);

    (
        StatusCode::OK,
        [(CONTENT_TYPE, exposition::CONTENT_TYPE)],
        body,
    )
        .into_response()
}

/// Handler for the landing page.
async fn landing_handler<C: Collector>(State(state): State<Arc<AppState<C>>>) -> Response {
    Html(state.landing_page.clone()).into_response()
}

fn landing_page(metrics_path: &str) -> String {
    format!(
        "<html>\n\
         <head><title>dotcom-monitor exporter</title></head>\n\
         <body>\n\
         <h1>dotcom-monitor exporter</h1>\n\
         <p><a href='{}'>Metrics</a></p>\n\
         </body>\n\
         </html>\n",
        metrics_path
    )
}

/// HTTP server configuration.
pub struct HttpServer<C> {
    collector: Arc<C>,
    listen_addr: SocketAddr,
    metrics_path: String,
}

impl<C: Collector> HttpServer<C> {
    /// Create a new HTTP server.
    pub fn new(collector: Arc<C>, listen_addr: SocketAddr, metrics_path: String) -> Self {
        Self {
            collector,
            listen_addr,
            metrics_path,
        }
    }

    /// Bind the listening socket.
    ///
    /// Failing to bind is the one fatal condition of the exporter.
    pub async fn bind(self) -> anyhow::Result<BoundServer> {
        let listener = tokio::net::TcpListener::bind(self.listen_addr)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to bind to {}: {}", self.listen_addr, e))?;

        let local_addr = listener.local_addr()?;
        info!(
            addr = %local_addr,
            path = %self.metrics_path,
            "HTTP server listening"
        );

        Ok(BoundServer {
            listener,
            router: create_router(self.collector, &self.metrics_path),
            local_addr,
        })
    }

    /// Bind and run the HTTP server until the shutdown signal is received.
    pub async fn run(self, shutdown: watch::Receiver<bool>) -> anyhow::Result<()> {
        self.bind().await?.serve(shutdown).await
    }
}

/// A server whose socket is bound but not yet serving.
pub struct BoundServer {
    listener: tokio::net::TcpListener,
    router: Router,
    local_addr: SocketAddr,
}

impl BoundServer {
    /// The address actually bound (useful with port 0).
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Serve requests until the shutdown signal is received.
    pub async fn serve(self, mut shutdown: watch::Receiver<bool>) -> anyhow::Result<()> {
        // Run server with graceful shutdown
        axum::serve(self.listener, self.router)
            .with_graceful_shutdown(async move {
                loop {
                    if shutdown.changed().await.is_err() {
                        break;
                    }
                    if *shutdown.borrow() {
                        break;
                    }
                }
                info!("HTTP server shutting down");
            })
            .await
            .map_err(|e| anyhow::anyhow!("HTTP server error: {}", e))?;

        info!("HTTP server stopped");
        Ok(())
    }
}
