//! Pagination Cursor Codec
//!
//! Encodes a `(created_at, record id)` pair into an opaque URL-safe
//! token. The token carries no direction; the caller's sort key
//! decides whether it is walked forwards or backwards.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::catalog::CatalogError;

/// Decoded cursor position
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageCursor {
    pub created_at: DateTime<Utc>,
    /// Full record id, "table:key"
    pub id: String,
}

/// Wire form of the token: epoch millis + record id
#[derive(Serialize, Deserialize)]
struct CursorToken {
    t: i64,
    id: String,
}

/// Encode a position into an opaque cursor token
pub fn encode(created_at: DateTime<Utc>, id: &str) -> String {
    let token = CursorToken {
        t: created_at.timestamp_millis(),
        id: id.to_string(),
    };
    let json = serde_json::to_string(&token).unwrap_or_default();
    URL_SAFE_NO_PAD.encode(json.as_bytes())
}

/// Decode a cursor token
///
/// Fails with [`CatalogError::InvalidCursor`] when the token is not
/// well-formed, the timestamp is not a valid instant, or the embedded
/// id is not a syntactically valid record id. Invalid cursors are
/// rejected, never clamped to some nearby position.
pub fn decode(token: &str) -> Result<PageCursor, CatalogError> {
    let bytes = URL_SAFE_NO_PAD
        .decode(token.as_bytes())
        .map_err(|_| CatalogError::InvalidCursor("cursor is not valid base64".to_string()))?;

    let parsed: CursorToken = serde_json::from_slice(&bytes)
        .map_err(|_| CatalogError::InvalidCursor("cursor payload is malformed".to_string()))?;

    let created_at = DateTime::<Utc>::from_timestamp_millis(parsed.t).ok_or_else(|| {
        CatalogError::InvalidCursor("cursor timestamp is out of range".to_string())
    })?;

    if !is_valid_record_id(&parsed.id) {
        return Err(CatalogError::InvalidCursor(
            "cursor id is not a valid record id".to_string(),
        ));
    }

    Ok(PageCursor {
        created_at,
        id: parsed.id,
    })
}

/// Record ids are "table:key" with both sides non-empty `[A-Za-z0-9_]`
fn is_valid_record_id(id: &str) -> bool {
    let Some((table, key)) = id.split_once(':') else {
        return false;
    };
    let valid_part =
        |s: &str| !s.is_empty() && s.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
    valid_part(table) && valid_part(key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_valid_pairs() {
        let ts = DateTime::<Utc>::from_timestamp_millis(1_700_000_123_456).unwrap();
        let token = encode(ts, "product:abc_123");
        let decoded = decode(&token).unwrap();
        assert_eq!(decoded.created_at, ts);
        assert_eq!(decoded.id, "product:abc_123");
    }

    #[test]
    fn rejects_garbage_tokens() {
        assert!(matches!(
            decode("!!not base64!!"),
            Err(CatalogError::InvalidCursor(_))
        ));
        // valid base64, not JSON
        let token = URL_SAFE_NO_PAD.encode(b"hello world");
        assert!(matches!(
            decode(&token),
            Err(CatalogError::InvalidCursor(_))
        ));
    }

    #[test]
    fn rejects_malformed_record_ids() {
        let cases = ["abc", ":abc", "product:", "product:ab cd", "product:a;b"];
        for id in cases {
            let token = URL_SAFE_NO_PAD.encode(format!(r#"{{"t":0,"id":"{id}"}}"#).as_bytes());
            assert!(
                matches!(decode(&token), Err(CatalogError::InvalidCursor(_))),
                "id {id:?} should be rejected"
            );
        }
    }

    #[test]
    fn rejects_out_of_range_timestamps() {
        let token = URL_SAFE_NO_PAD.encode(br#"{"t":9223372036854775807,"id":"product:a"}"#);
        assert!(matches!(
            decode(&token),
            Err(CatalogError::InvalidCursor(_))
        ));
    }
}
