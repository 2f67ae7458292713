//! Application state

use std::sync::Arc;
use tokengate_auth::TokenCodec;
use tokengate_core::SessionAuthority;

/// Prometheus render handle
pub type MetricsHandle = metrics_exporter_prometheus::PrometheusHandle;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub sessions: Arc<SessionAuthority>,
    /// Access-token codec handed to the authorization guard
    pub access_tokens: Arc<TokenCodec>,
}

impl AppState {
    pub fn new(sessions: Arc<SessionAuthority>) -> Self {
        let access_tokens = Arc::new(sessions.access_codec().clone());
        Self {
            sessions,
            access_tokens,
        }
    }
}
