use crate::session::SessionError;
use serde_json::Value;
use thiserror::Error;

/// Everything a backend call can fail with. None of these are retried.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Connection, TLS or timeout failure before any response arrived
    #[error("could not reach the backend at {url}: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    /// The backend rejected the stored token. The session has been cleared.
    #[error("not authenticated: please log in again")]
    Unauthorized,

    /// Non-2xx response; `message` is the backend's own text when it sent one
    #[error("backend returned {status}: {message}")]
    Status {
        status: u16,
        message: String,
        body: String,
    },

    /// A 2xx body that does not match the expected shape
    #[error("unexpected response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    /// Rejected locally before any request was sent
    #[error("{0}")]
    Validation(String),

    /// Reading or writing the stored session failed
    #[error(transparent)]
    Session(#[from] SessionError),
}

impl ApiError {
    /// Build the error for a non-2xx response, preferring the backend's own text.
    pub fn from_status(status: u16, body: String) -> Self {
        let message = extract_error_message(&body)
            .unwrap_or_else(|| format!("request failed with status {status}"));
        ApiError::Status {
            status,
            message,
            body,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Unauthorized)
    }
}

/// Pull a human-readable message out of an error body.
///
/// Looks at `error`, `message` and `detail` in that order, then falls back to
/// field validation errors of the form `{"field": ["text", ...]}`.
pub fn extract_error_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    let object = value.as_object()?;

    for key in ["error", "message", "detail"] {
        if let Some(text) = object.get(key).and_then(Value::as_str) {
            if !text.trim().is_empty() {
                return Some(text.trim().to_string());
            }
        }
    }

    let mut parts = Vec::new();
    for (field, value) in object {
        if let Value::Array(items) = value {
            let texts: Vec<&str> = items.iter().filter_map(Value::as_str).collect();
            if texts.is_empty() {
                continue;
            }
            if field == "non_field_errors" {
                parts.push(texts.join(" "));
            } else {
                parts.push(format!("{field}: {}", texts.join(" ")));
            }
        }
    }
    if parts.is_empty() {
        None
    } else {
        Some(parts.join("; "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_error_key_order() {
        let body = r#"{"error": "Kanal bulunamadı", "message": "ignored"}"#;
        assert_eq!(extract_error_message(body).unwrap(), "Kanal bulunamadı");

        let body = r#"{"success": false, "message": "Kullanıcı adı veya şifre hatalı"}"#;
        assert_eq!(
            extract_error_message(body).unwrap(),
            "Kullanıcı adı veya şifre hatalı"
        );

        let body = r#"{"detail": "Authentication credentials were not provided."}"#;
        assert!(extract_error_message(body).unwrap().starts_with("Authentication"));
    }

    #[test]
    fn test_extract_field_errors() {
        let body = r#"{"kanal": ["Bu alan zorunludur."], "tarih": ["Geçersiz tarih."]}"#;
        assert_eq!(
            extract_error_message(body).unwrap(),
            "kanal: Bu alan zorunludur.; tarih: Geçersiz tarih."
        );
        let body = r#"{"non_field_errors": ["Kayıt zaten var."]}"#;
        assert_eq!(extract_error_message(body).unwrap(), "Kayıt zaten var.");
    }

    #[test]
    fn test_unparseable_body_uses_generic_message() {
        let err = ApiError::from_status(502, String::from("<html>Bad Gateway</html>"));
        assert_eq!(err.to_string(), "backend returned 502: request failed with status 502");
        match err {
            ApiError::Status { body, .. } => assert!(body.contains("Bad Gateway")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_variant_messages() {
        assert_eq!(
            ApiError::Unauthorized.to_string(),
            "not authenticated: please log in again"
        );
        assert!(ApiError::Unauthorized.is_unauthorized());
        let err = ApiError::Validation(String::from("Yeni şifreler eşleşmiyor"));
        assert_eq!(err.to_string(), "Yeni şifreler eşleşmiyor");
        assert!(!err.is_unauthorized());
    }
}
