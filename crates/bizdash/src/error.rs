//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` variants into user-facing errors with
//! actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use bizdash_config::ConfigError;
use bizdash_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not connect to backend at {url}")]
    #[diagnostic(
        code(bizdash::connection_failed),
        help(
            "Check that the backend is running and accessible.\n\
             URL: {url}\n\
             Override it with --api-url or: bizdash config set api_url <URL>"
        )
    )]
    ConnectionFailed {
        url: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    // ── Authentication ───────────────────────────────────────────────
    #[error("Authentication failed: {message}")]
    #[diagnostic(
        code(bizdash::auth_failed),
        help("Log in again with: bizdash login --profile {profile}")
    )]
    AuthFailed { profile: String, message: String },

    #[error("Not logged in (profile '{profile}')")]
    #[diagnostic(
        code(bizdash::not_logged_in),
        help(
            "Run: bizdash login\n\
             Or store credentials with: bizdash config set username <NAME> \
             and bizdash config set-password"
        )
    )]
    NotLoggedIn { profile: String },

    #[error("Session expired and could not be refreshed")]
    #[diagnostic(code(bizdash::session_expired), help("Run: bizdash login"))]
    SessionExpired,

    // ── Resources ────────────────────────────────────────────────────
    #[error("{resource_type} '{identifier}' not found")]
    #[diagnostic(
        code(bizdash::not_found),
        help("Run: bizdash {list_command} to see available records")
    )]
    NotFound {
        resource_type: String,
        identifier: String,
        list_command: String,
    },

    // ── API ──────────────────────────────────────────────────────────
    #[error("API error: {message}")]
    #[diagnostic(code(bizdash::api_error))]
    ApiError {
        status: Option<u16>,
        message: String,
    },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(bizdash::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(bizdash::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: bizdash config init"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error(transparent)]
    #[diagnostic(code(bizdash::config))]
    Config(#[from] ConfigError),

    // ── Interactive ──────────────────────────────────────────────────
    #[error("Destructive operation '{action}' requires confirmation")]
    #[diagnostic(
        code(bizdash::confirmation_required),
        help("Use --yes (-y) to skip confirmation in non-interactive contexts.")
    )]
    NonInteractiveRequiresYes { action: String },

    // ── Timeout ──────────────────────────────────────────────────────
    #[error("Request timed out after {seconds}s")]
    #[diagnostic(
        code(bizdash::timeout),
        help("Increase timeout with --timeout or check backend responsiveness.")
    )]
    Timeout { seconds: u64 },

    // ── IO / Serialization ───────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Invalid JSON payload: {0}")]
    #[diagnostic(code(bizdash::json), help("Check the JSON file contents and try again."))]
    Json(#[from] serde_json::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::AuthFailed { .. } | Self::NotLoggedIn { .. } | Self::SessionExpired => {
                exit_code::AUTH
            }
            Self::NotFound { .. } => exit_code::NOT_FOUND,
            Self::Timeout { .. } => exit_code::TIMEOUT,
            Self::Validation { .. } | Self::NonInteractiveRequiresYes { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }

    /// Like `From<CoreError>`, but names the record a 404 refers to.
    pub fn for_record(err: CoreError, resource: &str, identifier: &str) -> Self {
        match err {
            CoreError::NotFound { .. } | CoreError::MissingId => Self::NotFound {
                resource_type: resource.into(),
                identifier: identifier.into(),
                list_command: format!("{resource}s list"),
            },
            other => other.into(),
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ConnectionFailed { url, reason } => CliError::ConnectionFailed {
                url,
                source: reason.into(),
            },

            CoreError::AuthenticationFailed { message } => CliError::AuthFailed {
                profile: "current".into(),
                message: if message.is_empty() {
                    "HTTP 401".into()
                } else {
                    message
                },
            },

            CoreError::Timeout { timeout_secs } => CliError::Timeout {
                seconds: timeout_secs,
            },

            CoreError::NotFound { detail } => CliError::NotFound {
                resource_type: "record".into(),
                identifier: detail,
                list_command: "<resource> list".into(),
            },

            CoreError::MissingId => CliError::Validation {
                field: "id".into(),
                reason: "record has no usable id".into(),
            },

            CoreError::UnexpectedShape { endpoint, kind } => CliError::ApiError {
                status: None,
                message: format!("unexpected response from {endpoint} ({kind})"),
            },

            CoreError::Api { message, status } => CliError::ApiError { status, message },

            CoreError::Config { message } => CliError::Validation {
                field: "config".into(),
                reason: message,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_follow_error_kind() {
        let err = CliError::from(CoreError::Timeout { timeout_secs: 8 });
        assert_eq!(err.exit_code(), exit_code::TIMEOUT);

        let err = CliError::from(CoreError::AuthenticationFailed {
            message: String::new(),
        });
        assert_eq!(err.exit_code(), exit_code::AUTH);

        let err = CliError::from(CoreError::Api {
            message: "boom".into(),
            status: Some(500),
        });
        assert_eq!(err.exit_code(), exit_code::GENERAL);
    }

    #[test]
    fn record_not_found_names_the_record() {
        let err = CliError::for_record(
            CoreError::NotFound {
                detail: "Not found.".into(),
            },
            "employee",
            "42",
        );
        match err {
            CliError::NotFound {
                identifier,
                list_command,
                ..
            } => {
                assert_eq!(identifier, "42");
                assert_eq!(list_command, "employees list");
            }
            other => panic!("expected NotFound, got {other:?}"),
        }
        assert_eq!(
            CliError::for_record(CoreError::MissingId, "asset", "x").exit_code(),
            exit_code::NOT_FOUND
        );
    }
}
