//! Shared application state and HTTP router.

use std::sync::Arc;

use axum::{
    Router, middleware as axum_middleware,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use crate::{handlers, ledger::LedgerDataAccess, middleware};

/// State handed to every handler through `State` extraction.
#[derive(Clone)]
pub struct AppState {
    pub ledger: Arc<dyn LedgerDataAccess>,

    /// SHA-256 hex digest of the bearer token `/mcp` requires, if any
    pub auth_token_hash: Option<String>,
}

impl AppState {
    pub fn new(ledger: Arc<dyn LedgerDataAccess>, auth_token: Option<&str>) -> Self {
        Self {
            ledger,
            auth_token_hash: auth_token.map(middleware::auth::hash_token),
        }
    }
}

/// Build the router.
///
/// - `GET /health`: public liveness check
/// - `POST /mcp`: tool protocol endpoint, behind the bearer-token check
pub fn router(state: AppState) -> Router {
    let protected = Router::new()
        .route("/mcp", post(handlers::mcp::handle_rpc))
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::auth::auth_middleware,
        ));

    Router::new()
        .route("/health", get(handlers::health::health_check))
        .merge(protected)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::memory::InMemoryLedger;
    use axum::{
        body::Body,
        http::{Request, StatusCode, header},
    };
    use tower::ServiceExt;

    const PING: &str = r#"{"jsonrpc":"2.0","id":1,"method":"ping"}"#;

    fn app(token: Option<&str>) -> (Arc<InMemoryLedger>, Router) {
        let ledger = Arc::new(InMemoryLedger::household());
        let state = AppState::new(ledger.clone(), token);
        (ledger, router(state))
    }

    fn rpc(authorization: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder()
            .method("POST")
            .uri("/mcp")
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(value) = authorization {
            builder = builder.header(header::AUTHORIZATION, value);
        }
        builder.body(Body::from(PING)).unwrap()
    }

    #[tokio::test]
    async fn open_when_no_token_is_configured() {
        let (_, app) = app(None);
        let response = app.oneshot(rpc(None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn missing_bearer_token_is_rejected() {
        let (_, app) = app(Some("s3cret"));
        let response = app.oneshot(rpc(None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn wrong_bearer_token_is_rejected() {
        let (_, app) = app(Some("s3cret"));
        let response = app.oneshot(rpc(Some("Bearer guess"))).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn matching_bearer_token_is_accepted() {
        let (_, app) = app(Some("s3cret"));
        let response = app.oneshot(rpc(Some("Bearer s3cret"))).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn health_is_public() {
        let (_, app) = app(Some("s3cret"));
        let request = Request::builder()
            .uri("/health")
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn health_reports_unreachable_ledger() {
        let (ledger, app) = app(None);
        ledger.update(|s| s.fail_reads = true);
        let request = Request::builder()
            .uri("/health")
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }
}
