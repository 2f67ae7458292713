//! API routes

mod health;
pub mod metrics;
mod protected;
mod session;
pub mod types;

use axum::Router;
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::services::{ServeDir, ServeFile};

use crate::state::{AppState, MetricsHandle};

/// Optional parts of the router
#[derive(Default)]
pub struct RouterOptions {
    /// Serve `/metrics` from this Prometheus handle
    pub metrics_handle: Option<Arc<MetricsHandle>>,
    /// Serve a client build from this directory, falling back to `index.html`
    pub static_dir: Option<PathBuf>,
}

/// Create the main router
pub fn create_router(state: AppState, options: RouterOptions) -> Router {
    let mut router = Router::new()
        .merge(health::routes())
        .merge(session::routes())
        .merge(protected::routes(&state))
        .with_state(state);

    if let Some(handle) = options.metrics_handle {
        router = router.merge(metrics::routes(handle));
    }

    // Static client files must be last to not interfere with API routes
    if let Some(dir) = options.static_dir {
        let index = dir.join("index.html");
        router = router.fallback_service(ServeDir::new(dir).fallback(ServeFile::new(index)));
    }

    router.layer(CorsLayer::permissive())
}
