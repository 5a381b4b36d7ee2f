use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method},
    middleware,
    routing::{delete, get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::warn;

use crate::config::SecurityConfig;
use crate::handlers::{protected, public};
use crate::middleware::jwt_auth_middleware;
use crate::state::AppState;

pub fn app(state: AppState) -> Router {
    let body_limit = state.config.api.max_request_size_bytes;
    let mut router = Router::new()
        .merge(public_routes())
        .merge(protected_routes(state.clone()))
        .layer(DefaultBodyLimit::max(body_limit));

    if state.config.security.enable_cors {
        router = router.layer(cors_layer(&state.config.security));
    }
    if state.config.api.enable_request_logging {
        router = router.layer(TraceLayer::new_for_http());
    }

    router.with_state(state)
}

fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/ping", get(public::health::ping))
        .route("/health", get(public::health::health))
        .route("/auth/register", post(public::auth::register))
        .route("/auth/login", post(public::auth::login))
}

fn protected_routes(state: AppState) -> Router<AppState> {
    use protected::{bill, family, user};

    Router::new()
        .route("/user/info/:phone", get(user::info))
        .route("/user/update", post(user::update))
        .route("/user/list", get(user::list))
        .route("/family/create", post(family::create))
        .route("/family/join", post(family::join))
        .route("/family/list", get(family::list))
        .route("/family/:family_id/members", get(family::members))
        .route("/family/:family_id/bills", post(bill::create).get(bill::list))
        .route("/family/:family_id/bills/select", post(bill::select))
        .route("/family/:family_id/bills/:bill_id", delete(bill::delete))
        .route_layer(middleware::from_fn_with_state(state, jwt_auth_middleware))
}

fn cors_layer(security: &SecurityConfig) -> CorsLayer {
    if security.cors_origins.iter().any(|o| o == "*") {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = security
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin '{}'", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use serde_json::Value;
    use tower::ServiceExt;

    use super::*;
    use crate::config::AppConfig;
    use crate::state::NoopHealth;
    use crate::testing::MemoryStore;

    fn router() -> Router {
        let state = AppState::new(AppConfig::development(), MemoryStore::new(), Arc::new(NoopHealth));
        app(state)
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn ping_is_public() {
        let response = router()
            .oneshot(Request::builder().uri("/ping").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["message"], "pong");
    }

    #[tokio::test]
    async fn bill_routes_sit_behind_jwt() {
        let response = router()
            .oneshot(Request::builder().uri("/family/1/bills").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(body_json(response).await["errno"], 40100);
    }

    #[test]
    fn explicit_origins_build_a_restricted_layer() {
        let mut security = AppConfig::development().security;
        security.cors_origins = vec!["https://app.example.com".to_string(), "not a header\n".to_string()];
        let _ = cors_layer(&security);
    }
}
