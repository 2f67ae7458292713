//! Bearer-protected resource

use axum::{Json, Router, middleware, routing::get};
use tokengate_auth::{AuthUser, auth_middleware};

use crate::state::AppState;

use super::types::ProtectedResponse;

/// GET /protected
async fn protected(user: AuthUser) -> Json<ProtectedResponse> {
    metrics::counter!("tokengate_protected_requests_total").increment(1);

    Json(ProtectedResponse {
        title: "This is protected data".to_string(),
        user: user.claims,
    })
}

/// Create protected routes, guarded by the access-token codec
pub fn routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/protected", get(protected))
        .route_layer(middleware::from_fn_with_state(
            state.access_tokens.clone(),
            auth_middleware,
        ))
}
