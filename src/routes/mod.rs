use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use crate::config::{apply_security_headers, create_cors_layer};
use crate::handlers::{events, health_check, pricing};
use crate::state::AppState;

pub fn create_routes(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route(
            "/coaching/price",
            get(pricing::price).post(pricing::price),
        )
        .route(
            "/coaching/price-with-discount",
            get(pricing::price_with_discount).post(pricing::price_with_discount),
        )
        .route("/events/waitlist-promote", post(events::waitlist_promote))
        .route("/events/offer-accept", post(events::offer_accept))
        .layer(middleware::from_fn(apply_security_headers))
        .layer(create_cors_layer())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use axum::body::Body;
    use axum::http::{Method, Request, StatusCode};
    use sqlx::postgres::PgPoolOptions;
    use tower::util::ServiceExt;

    fn test_router() -> Router {
        // Lazy pool: no connection is made until a query runs.
        let pool = PgPoolOptions::new()
            .connect_lazy("postgres://localhost/pavilion_test")
            .unwrap();
        let config = Config {
            database_url: String::new(),
            port: 0,
            public_base_url: "http://localhost:3000".to_string(),
            payment_api_url: "http://localhost:9".to_string(),
            payment_api_key: String::new(),
        };
        create_routes(AppState::new(pool, config))
    }

    async fn status_for(method: Method, uri: &str) -> StatusCode {
        let response = test_router()
            .oneshot(
                Request::builder()
                    .method(method)
                    .uri(uri)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        response.status()
    }

    #[tokio::test]
    async fn health_is_routed() {
        assert_eq!(status_for(Method::GET, "/health").await, StatusCode::OK);
    }

    #[tokio::test]
    async fn price_endpoints_accept_get_and_post() {
        for uri in ["/coaching/price", "/coaching/price-with-discount"] {
            for method in [Method::GET, Method::POST] {
                let status = status_for(method.clone(), uri).await;
                assert_ne!(status, StatusCode::NOT_FOUND, "{method} {uri}");
                assert_ne!(status, StatusCode::METHOD_NOT_ALLOWED, "{method} {uri}");
            }
        }
    }
}
