//! Upload API 模块

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new()
        .route(
            "/api/upload",
            post(handler::upload).delete(handler::delete_upload),
        )
        .route("/api/images/{filename}", get(handler::serve_image))
}
