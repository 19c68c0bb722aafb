// ── Session ──
//
// Explicit authentication context: the logged-in user, persisted through a
// `SessionVault`, with the access token attached to the shared `ApiClient`.
// Observers subscribe to a `watch` channel to react to login and logout.

use std::fmt;
use std::sync::{Arc, Mutex};

use bizdash_api::{ApiClient, TokenResponse};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::error::CoreError;

const DEFAULT_ROLE: &str = "user";
const EMAIL_DOMAIN: &str = "company.com";

// ── UserSession ──────────────────────────────────────────────────────

/// A logged-in user and their tokens.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSession {
    pub username: String,
    pub access: String,
    #[serde(default)]
    pub refresh: Option<String>,
    pub role: String,
    pub name: String,
    pub email: String,
}

impl UserSession {
    /// Build from a token response, filling profile defaults from `username`.
    /// `None` when the response carries no access token.
    pub fn from_tokens(username: &str, tokens: TokenResponse) -> Option<Self> {
        let access = tokens.access?;
        Some(Self {
            username: username.to_owned(),
            access,
            refresh: tokens.refresh,
            role: tokens.role.unwrap_or_else(|| DEFAULT_ROLE.into()),
            name: tokens.name.unwrap_or_else(|| username.to_owned()),
            email: tokens
                .email
                .unwrap_or_else(|| format!("{username}@{EMAIL_DOMAIN}")),
        })
    }

    fn access_secret(&self) -> SecretString {
        SecretString::from(self.access.clone())
    }
}

impl fmt::Debug for UserSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserSession")
            .field("username", &self.username)
            .field("access", &"[REDACTED]")
            .field("refresh", &self.refresh.as_ref().map(|_| "[REDACTED]"))
            .field("role", &self.role)
            .field("name", &self.name)
            .field("email", &self.email)
            .finish()
    }
}

/// Result of a login attempt, suitable for showing in a form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginOutcome {
    pub success: bool,
    pub error: Option<String>,
}

impl LoginOutcome {
    fn ok() -> Self {
        Self {
            success: true,
            error: None,
        }
    }

    fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(message.into()),
        }
    }
}

// ── Persistence ──────────────────────────────────────────────────────

/// Where a session survives between runs.
pub trait SessionVault: Send + Sync {
    fn load(&self) -> Option<UserSession>;
    fn store(&self, session: &UserSession) -> Result<(), CoreError>;
    fn clear(&self) -> Result<(), CoreError>;
}

/// Process-local vault; nothing outlives the process.
#[derive(Debug, Default)]
pub struct MemoryVault {
    slot: Mutex<Option<UserSession>>,
}

impl SessionVault for MemoryVault {
    fn load(&self) -> Option<UserSession> {
        self.slot.lock().expect("vault lock poisoned").clone()
    }

    fn store(&self, session: &UserSession) -> Result<(), CoreError> {
        *self.slot.lock().expect("vault lock poisoned") = Some(session.clone());
        Ok(())
    }

    fn clear(&self) -> Result<(), CoreError> {
        *self.slot.lock().expect("vault lock poisoned") = None;
        Ok(())
    }
}

// ── Session ──────────────────────────────────────────────────────────

/// Authentication context shared by whatever needs to know the user.
pub struct Session {
    client: Arc<ApiClient>,
    vault: Arc<dyn SessionVault>,
    state: watch::Sender<Option<UserSession>>,
}

impl Session {
    pub fn new(client: Arc<ApiClient>, vault: Arc<dyn SessionVault>) -> Self {
        let (state, _) = watch::channel(None);
        Self {
            client,
            vault,
            state,
        }
    }

    pub fn client(&self) -> &Arc<ApiClient> {
        &self.client
    }

    /// Restore a persisted session and attach its token. Returns whether a
    /// session was found.
    pub fn init(&self) -> bool {
        match self.vault.load() {
            Some(user) => {
                debug!(username = %user.username, "restored session");
                self.client.set_bearer(user.access_secret());
                self.state.send_replace(Some(user));
                true
            }
            None => false,
        }
    }

    pub async fn login(&self, username: &str, password: &SecretString) -> LoginOutcome {
        match self.client.login(username, password).await {
            Ok(tokens) => match UserSession::from_tokens(username, tokens) {
                Some(user) => {
                    info!(username, role = %user.role, "logged in");
                    self.establish(user);
                    LoginOutcome::ok()
                }
                None => LoginOutcome::failed("Invalid credentials"),
            },
            Err(e) => {
                warn!(username, error = %e, "login failed");
                let message = e.to_string();
                if message.is_empty() {
                    LoginOutcome::failed("Login failed")
                } else {
                    LoginOutcome::failed(message)
                }
            }
        }
    }

    /// Forget the user everywhere: state, vault and client.
    pub fn logout(&self) {
        if let Err(e) = self.vault.clear() {
            warn!(error = %e, "failed to clear persisted session");
        }
        self.client.clear_bearer();
        self.state.send_replace(None);
        debug!("logged out");
    }

    /// Trade the refresh token for a new access token. Any failure ends
    /// the session.
    pub async fn refresh_token(&self) -> bool {
        let Some(mut user) = self.user() else {
            return false;
        };
        let Some(refresh) = user.refresh.clone() else {
            return false;
        };

        match self.client.refresh(&SecretString::from(refresh)).await {
            Ok(TokenResponse {
                access: Some(access),
                refresh: rotated,
                ..
            }) => {
                user.access = access;
                if rotated.is_some() {
                    user.refresh = rotated;
                }
                debug!(username = %user.username, "access token refreshed");
                self.establish(user);
                true
            }
            Ok(_) => {
                warn!("refresh response carried no access token");
                self.logout();
                false
            }
            Err(e) => {
                warn!(error = %e, "token refresh failed");
                self.logout();
                false
            }
        }
    }

    pub fn user(&self) -> Option<UserSession> {
        self.state.borrow().clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.borrow().is_some()
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<UserSession>> {
        self.state.subscribe()
    }

    fn establish(&self, user: UserSession) {
        if let Err(e) = self.vault.store(&user) {
            warn!(error = %e, "failed to persist session");
        }
        self.client.set_bearer(user.access_secret());
        self.state.send_replace(Some(user));
    }
}
