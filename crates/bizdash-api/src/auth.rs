// Token authentication endpoints
//
// `POST /auth/login/` exchanges credentials for an access/refresh pair;
// `POST /auth/refresh/` trades a refresh token for a new access token.
// Attaching the returned token to the client is left to the caller.

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::debug;

use crate::client::ApiClient;
use crate::error::Error;

pub const LOGIN_PATH: &str = "/auth/login/";
pub const REFRESH_PATH: &str = "/auth/refresh/";

/// Token payload returned by the login and refresh endpoints.
///
/// Every field is optional: a response without `access` is a rejected
/// login, not a decoding failure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct TokenResponse {
    pub access: Option<String>,
    pub refresh: Option<String>,
    pub role: Option<String>,
    pub name: Option<String>,
    pub email: Option<String>,
}

impl TokenResponse {
    /// Decode a loosely typed response body.
    ///
    /// Bodies that are not JSON objects (null, text, arrays) carry no
    /// tokens and decode to an empty response.
    pub fn from_value(value: Value) -> Result<Self, Error> {
        if !value.is_object() {
            return Ok(Self::default());
        }
        serde_json::from_value(value.clone()).map_err(|e| Error::Deserialization {
            message: e.to_string(),
            body: value.to_string(),
        })
    }
}

impl ApiClient {
    /// Exchange username/password for an access/refresh token pair.
    pub async fn login(
        &self,
        username: &str,
        password: &SecretString,
    ) -> Result<TokenResponse, Error> {
        debug!(username, "logging in");

        let body = json!({
            "username": username,
            "password": password.expose_secret(),
        });
        let resp = self.post(LOGIN_PATH, &body).await?;
        TokenResponse::from_value(resp)
    }

    /// Trade a refresh token for a new access token.
    pub async fn refresh(&self, refresh_token: &SecretString) -> Result<TokenResponse, Error> {
        debug!("refreshing access token");

        let body = json!({ "refresh": refresh_token.expose_secret() });
        let resp = self.post(REFRESH_PATH, &body).await?;
        TokenResponse::from_value(resp)
    }
}
