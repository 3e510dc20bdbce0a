//! Server Implementation
//!
//! HTTP 服务器启动和管理。TLS 终结在上游网关，本服务只监听明文
//! HTTP。

use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::api;
use crate::core::{Config, ServerState};
use crate::utils::AppError;

pub struct Server {
    config: Config,
    state: Option<ServerState>,
}

impl Server {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            state: None,
        }
    }

    /// Create server with existing state (for tests)
    pub fn with_state(config: Config, state: ServerState) -> Self {
        Self {
            config,
            state: Some(state),
        }
    }

    pub async fn run(&self) -> Result<(), AppError> {
        let state = match &self.state {
            Some(s) => s.clone(),
            None => ServerState::initialize(&self.config).await?,
        };

        let app = build_router(state);

        let addr = std::net::SocketAddr::from(([0, 0, 0, 0], self.config.http_port));
        tracing::info!("Storefront server starting on {addr}");

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| AppError::internal(format!("Failed to bind {addr}: {e}")))?;

        axum::serve(listener, app)
            .with_graceful_shutdown(async {
                let _ = tokio::signal::ctrl_c().await;
                tracing::info!("Shutting down...");
            })
            .await
            .map_err(|e| AppError::internal(format!("Server error: {e}")))?;

        Ok(())
    }
}

/// Merge all API routers and attach the shared middleware stack
pub fn build_router(state: ServerState) -> Router {
    Router::new()
        .merge(api::health::router())
        .merge(api::products::router())
        .merge(api::categories::router())
        .merge(api::cart::router())
        .merge(api::wishlist::router())
        .merge(api::upload::router())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use http::{Request, StatusCode, header};
    use serde_json::{Value, json};
    use tower::ServiceExt;

    async fn app() -> Router {
        build_router(ServerState::for_tests().await)
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn post_json(uri: &str, user: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .header(crate::auth::USER_ID_HEADER, user)
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_json(response: http::Response<Body>) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn health_is_public() {
        let response = app().await.oneshot(get("/health")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn cart_requires_identity_header() {
        let response = app().await.oneshot(get("/api/cart")).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body = body_json(response).await;
        assert_eq!(body["code"], "E3001");
    }

    #[tokio::test]
    async fn invalid_cursor_yields_dedicated_error_code() {
        let response = app()
            .await
            .oneshot(get("/api/products?mode=cursor&cursor=%21%21garbage"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["code"], "E0007");
    }

    #[tokio::test]
    async fn cursor_mode_rejects_price_sort() {
        let response = app()
            .await
            .oneshot(get("/api/products?mode=cursor&sort=price_asc"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["code"], "E0002");
    }

    #[tokio::test]
    async fn add_to_cart_end_to_end() {
        let app = app().await;

        let response = app
            .clone()
            .oneshot(post_json(
                "/api/categories",
                "admin",
                json!({"name": "Drinks"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let category = body_json(response).await;
        let category_id = category["id"].as_str().unwrap().to_string();

        let response = app
            .clone()
            .oneshot(post_json(
                "/api/products",
                "admin",
                json!({
                    "name": "Latte",
                    "category": category_id,
                    "price": 3.5,
                    "stock": 2,
                }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let product = body_json(response).await;
        let product_id = product["id"].as_str().unwrap().to_string();

        let response = app
            .clone()
            .oneshot(post_json(
                "/api/cart/items",
                "u1",
                json!({"product_id": &product_id, "quantity": 2}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let item = body_json(response).await;
        assert_eq!(item["quantity"], 2);

        // one more unit would exceed the stock of 2
        let response = app
            .clone()
            .oneshot(post_json(
                "/api/cart/items",
                "u1",
                json!({"product_id": &product_id}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body = body_json(response).await;
        assert_eq!(body["code"], "E0005");
    }
}
