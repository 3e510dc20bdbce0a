//! Identity Extractor
//!
//! Pulls the gateway-verified user id out of the request headers.

use axum::{extract::FromRequestParts, http::request::Parts};

use crate::auth::{CurrentUser, USER_ID_HEADER};
use crate::core::ServerState;
use crate::utils::AppError;

impl FromRequestParts<ServerState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &ServerState,
    ) -> Result<Self, Self::Rejection> {
        // Check if already extracted
        if let Some(user) = parts.extensions.get::<CurrentUser>() {
            return Ok(user.clone());
        }

        let id = parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|h| h.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty());

        match id {
            Some(id) => {
                let user = CurrentUser { id: id.to_string() };
                // Store in extensions for potential reuse
                parts.extensions.insert(user.clone());
                Ok(user)
            }
            None => {
                tracing::warn!(uri = %parts.uri, "request without user identity");
                Err(AppError::unauthorized())
            }
        }
    }
}
