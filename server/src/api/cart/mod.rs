//! Cart API 模块

mod handler;

use axum::{
    Router,
    routing::{get, post, put},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/cart", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list).delete(handler::clear))
        .route("/items", post(handler::add))
        .route(
            "/items/{id}",
            put(handler::set_quantity).delete(handler::remove),
        )
}
