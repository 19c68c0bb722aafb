// ── Core error types ──
//
// User-facing errors from bizdash-core. The `From<bizdash_api::Error>`
// impl translates transport-layer errors into domain variants while
// keeping the HTTP status, which the presenter classifies for messaging.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot connect to backend at {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    #[error("Request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    // ── Data errors ──────────────────────────────────────────────────
    #[error("Resource not found")]
    NotFound { detail: String },

    #[error("Unexpected response from {endpoint} ({kind})")]
    UnexpectedShape { endpoint: String, kind: String },

    #[error("Record has no usable `id` field")]
    MissingId,

    // ── API errors (wrapped, not exposed raw) ────────────────────────
    #[error("API error: {message}")]
    Api {
        message: String,
        /// HTTP status code (if applicable).
        status: Option<u16>,
    },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },
}

/// Coarse classification used to pick a user-facing message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    NotFound,
    Server,
    Other,
}

impl ErrorClass {
    /// Classify by HTTP status: 404, >= 500, everything else. A record
    /// without an id counts as not found.
    pub fn classify(err: &CoreError) -> Self {
        if matches!(err, CoreError::MissingId) {
            return Self::NotFound;
        }
        match err.status() {
            Some(404) => Self::NotFound,
            Some(s) if s >= 500 => Self::Server,
            _ => Self::Other,
        }
    }
}

impl CoreError {
    /// The HTTP status behind this error, if it came from a response.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::NotFound { .. } => Some(404),
            Self::Api { status, .. } => *status,
            Self::AuthenticationFailed { .. } => Some(401),
            _ => None,
        }
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<bizdash_api::Error> for CoreError {
    fn from(err: bizdash_api::Error) -> Self {
        match err {
            bizdash_api::Error::Transport(ref e) => {
                if e.is_connect() {
                    CoreError::ConnectionFailed {
                        url: e
                            .url()
                            .map_or_else(|| "<unknown>".into(), ToString::to_string),
                        reason: e.to_string(),
                    }
                } else {
                    CoreError::Api {
                        message: e.to_string(),
                        status: e.status().map(|s| s.as_u16()),
                    }
                }
            }
            bizdash_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            bizdash_api::Error::Timeout { timeout_secs } => CoreError::Timeout { timeout_secs },
            bizdash_api::Error::Tls(msg) => CoreError::ConnectionFailed {
                url: String::new(),
                reason: format!("TLS error: {msg}"),
            },
            bizdash_api::Error::Http { status: 404, body } => CoreError::NotFound { detail: body },
            bizdash_api::Error::Http { status: 401, body } => {
                CoreError::AuthenticationFailed { message: body }
            }
            bizdash_api::Error::Http { status, body } => CoreError::Api {
                message: if body.is_empty() {
                    format!("HTTP error! status: {status}")
                } else {
                    format!("HTTP {status}: {body}")
                },
                status: Some(status),
            },
            bizdash_api::Error::Deserialization { message, body: _ } => CoreError::Api {
                message: format!("Deserialization error: {message}"),
                status: None,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_status_survives_translation() {
        let err = CoreError::from(bizdash_api::Error::Http {
            status: 503,
            body: String::new(),
        });
        assert_eq!(err.status(), Some(503));
        assert_eq!(ErrorClass::classify(&err), ErrorClass::Server);
    }

    #[test]
    fn not_found_classification() {
        let err = CoreError::from(bizdash_api::Error::Http {
            status: 404,
            body: "/employees/9/".into(),
        });
        assert!(matches!(err, CoreError::NotFound { .. }));
        assert_eq!(ErrorClass::classify(&err), ErrorClass::NotFound);
    }

    #[test]
    fn non_http_errors_are_other() {
        let err = CoreError::from(bizdash_api::Error::Timeout { timeout_secs: 8 });
        assert_eq!(ErrorClass::classify(&err), ErrorClass::Other);

        let err = CoreError::from(bizdash_api::Error::Http {
            status: 400,
            body: "{\"name\":[\"required\"]}".into(),
        });
        assert_eq!(ErrorClass::classify(&err), ErrorClass::Other);
    }

    #[test]
    fn timeout_keeps_configured_seconds() {
        let err = CoreError::from(bizdash_api::Error::Timeout { timeout_secs: 8 });
        assert!(matches!(err, CoreError::Timeout { timeout_secs: 8 }));
        assert_eq!(err.to_string(), "Request timed out after 8s");
    }
}
