// Async HTTP client for the bizdash REST backend.
//
// Base path: configurable, default http://localhost:8000/api
// Auth: `Authorization: Bearer <access>` when a token is attached

use std::sync::RwLock;
use std::time::Duration;

use reqwest::{Method, StatusCode};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, trace};
use url::Url;

use crate::error::Error;
use crate::transport::TransportConfig;

/// Backend root used when no profile overrides it.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000/api";

const BODY_PREVIEW_LEN: usize = 200;

// ── Client ───────────────────────────────────────────────────────────

/// Async client for the REST collections and auth endpoints.
///
/// Every verb returns a loosely typed [`serde_json::Value`]:
/// `Value::Null` for no-content, empty, or unparseable JSON bodies, and
/// `Value::String` for non-JSON text. Callers that expect a shape resolve
/// it themselves.
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
    timeout: Duration,
    /// Access token attached to every request while present.
    bearer: RwLock<Option<SecretString>>,
}

impl ApiClient {
    // ── Constructors ─────────────────────────────────────────────────

    /// Build a client for `base_url` using the given transport settings.
    pub fn new(base_url: &str, transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self::with_client(http, Url::parse(base_url)?, transport.timeout))
    }

    /// Wrap an existing `reqwest::Client` (caller manages TLS and headers).
    pub fn with_client(http: reqwest::Client, base_url: Url, timeout: Duration) -> Self {
        Self {
            http,
            base_url,
            timeout,
            bearer: RwLock::new(None),
        }
    }

    /// The backend base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ── Bearer token management ──────────────────────────────────────

    /// Attach an access token to all subsequent requests.
    pub fn set_bearer(&self, token: SecretString) {
        debug!("storing bearer token");
        *self.bearer.write().expect("bearer lock poisoned") = Some(token);
    }

    /// Stop sending an `Authorization` header.
    pub fn clear_bearer(&self) {
        debug!("clearing bearer token");
        *self.bearer.write().expect("bearer lock poisoned") = None;
    }

    pub fn has_bearer(&self) -> bool {
        self.bearer.read().expect("bearer lock poisoned").is_some()
    }

    fn apply_bearer(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        let guard = self.bearer.read().expect("bearer lock poisoned");
        match guard.as_ref() {
            Some(token) => builder.header(
                AUTHORIZATION,
                format!("Bearer {}", token.expose_secret()),
            ),
            None => builder,
        }
    }

    // ── URL builder ──────────────────────────────────────────────────

    /// Append an endpoint path (e.g. `"/employees/?page=2"`) to the base URL.
    ///
    /// Plain concatenation rather than `Url::join`, so a base path such as
    /// `/api` is kept.
    pub fn url(&self, path: &str) -> Result<Url, Error> {
        let base = self.base_url.as_str().trim_end_matches('/');
        let full = if path.starts_with('/') {
            format!("{base}{path}")
        } else {
            format!("{base}/{path}")
        };
        Ok(Url::parse(&full)?)
    }

    // ── HTTP verbs ───────────────────────────────────────────────────

    pub async fn get(&self, path: &str) -> Result<Value, Error> {
        let url = self.url(path)?;
        debug!("GET {url}");

        let resp = self.send(self.request(Method::GET, url)).await?;
        self.handle_response(resp).await
    }

    pub async fn post<B: Serialize + Sync + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<Value, Error> {
        let url = self.url(path)?;
        debug!("POST {url}");

        let resp = self.send(self.request(Method::POST, url).json(body)).await?;
        self.handle_response(resp).await
    }

    pub async fn put<B: Serialize + Sync + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<Value, Error> {
        let url = self.url(path)?;
        debug!("PUT {url}");

        let resp = self.send(self.request(Method::PUT, url).json(body)).await?;
        self.handle_response(resp).await
    }

    pub async fn delete(&self, path: &str) -> Result<Value, Error> {
        let url = self.url(path)?;
        debug!("DELETE {url}");

        let resp = self.send(self.request(Method::DELETE, url)).await?;
        self.handle_response(resp).await
    }

    // ── Response handling ────────────────────────────────────────────

    fn request(&self, method: Method, url: Url) -> reqwest::RequestBuilder {
        self.apply_bearer(
            self.http
                .request(method, url)
                .header(CONTENT_TYPE, "application/json"),
        )
    }

    async fn send(&self, builder: reqwest::RequestBuilder) -> Result<reqwest::Response, Error> {
        builder
            .send()
            .await
            .map_err(|e| self.transport_error(e))
    }

    fn transport_error(&self, err: reqwest::Error) -> Error {
        if err.is_timeout() {
            Error::Timeout {
                timeout_secs: self.timeout.as_secs(),
            }
        } else {
            Error::Transport(err)
        }
    }

    async fn handle_response(&self, resp: reqwest::Response) -> Result<Value, Error> {
        let status = resp.status();
        if !status.is_success() {
            return Err(Self::parse_error(status, resp).await);
        }

        if status == StatusCode::NO_CONTENT || status == StatusCode::RESET_CONTENT {
            return Ok(Value::Null);
        }

        let is_json = resp
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| ct.contains("application/json"));

        let body = resp.text().await.map_err(|e| self.transport_error(e))?;

        if is_json {
            if body.is_empty() {
                return Ok(Value::Null);
            }
            return Ok(serde_json::from_str(&body).unwrap_or_else(|e| {
                debug!(error = %e, "malformed JSON body, treating as null");
                Value::Null
            }));
        }

        if body.is_empty() {
            Ok(Value::Null)
        } else {
            trace!(len = body.len(), "non-JSON response body");
            Ok(Value::String(body))
        }
    }

    async fn parse_error(status: StatusCode, resp: reqwest::Response) -> Error {
        let raw = resp.text().await.unwrap_or_default();
        let body: String = raw.chars().take(BODY_PREVIEW_LEN).collect();
        debug!(status = status.as_u16(), %body, "request failed");
        Error::Http {
            status: status.as_u16(),
            body,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn client(base: &str) -> ApiClient {
        ApiClient::with_client(
            reqwest::Client::new(),
            Url::parse(base).unwrap(),
            Duration::from_secs(8),
        )
    }

    #[test]
    fn url_keeps_base_path() {
        let c = client("http://localhost:8000/api");
        assert_eq!(
            c.url("/employees/?page=2").unwrap().as_str(),
            "http://localhost:8000/api/employees/?page=2"
        );
    }

    #[test]
    fn url_tolerates_trailing_slash_and_relative_path() {
        let c = client("http://localhost:8000/api/");
        assert_eq!(
            c.url("assets/7/").unwrap().as_str(),
            "http://localhost:8000/api/assets/7/"
        );
    }

    #[test]
    fn bearer_lifecycle() {
        let c = client("http://localhost:8000/api");
        assert!(!c.has_bearer());
        c.set_bearer(SecretString::from("tok".to_string()));
        assert!(c.has_bearer());
        c.clear_bearer();
        assert!(!c.has_bearer());
    }
}
