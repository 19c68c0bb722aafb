// bizdash-api: Async Rust client for the bizdash REST backend

pub mod auth;
pub mod client;
pub mod error;
pub mod transport;

pub use auth::TokenResponse;
pub use client::ApiClient;
pub use error::Error;
pub use transport::{DEFAULT_TIMEOUT, TlsMode, TransportConfig};
