//! API handlers.

pub mod admin;
pub mod health;
pub mod public;

use axum::body::Bytes;
use serde::de::DeserializeOwned;

use rehber_store::StoreError;

use crate::error::ApiError;
use crate::state::AppState;

/// Parse a JSON request body. An empty body reads as `{}`, so the handler
/// reports its own missing-field error (or applies its defaults).
pub(crate) fn json_body<T: DeserializeOwned + Default>(body: &Bytes) -> Result<T, ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }

    serde_json::from_slice(body).map_err(|e| ApiError::BadRequest(format!("Geçersiz JSON: {e}")))
}

/// Serve `fallback` in place of a failed read.
pub(crate) fn or_fallback<T>(
    state: &AppState,
    what: &'static str,
    result: Result<T, StoreError>,
    fallback: impl FnOnce() -> T,
) -> T {
    result.unwrap_or_else(|e| {
        state.failures.record_read_fallback();
        tracing::warn!(error = %e, read = what, "Store read failed, serving fallback");
        fallback()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Default, Deserialize, PartialEq)]
    struct Body {
        title: Option<String>,
    }

    #[test]
    fn empty_body_reads_as_default() {
        assert_eq!(json_body::<Body>(&Bytes::new()).unwrap(), Body::default());
        assert_eq!(
            json_body::<Body>(&Bytes::from_static(b" \n")).unwrap(),
            Body::default()
        );
    }

    #[test]
    fn broken_json_is_bad_request() {
        let err = json_body::<Body>(&Bytes::from_static(b"{not json")).unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(_)));
    }

    #[test]
    fn parses_fields() {
        let body: Body = json_body(&Bytes::from_static(br#"{"title":"t"}"#)).unwrap();
        assert_eq!(body.title.as_deref(), Some("t"));
    }
}
