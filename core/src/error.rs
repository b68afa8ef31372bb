//! Error types for the country client, session layer, and durable storage.
//!
//! # Design
//! `NotFound` gets a dedicated variant because the country API answers an
//! empty search with 404, and callers distinguish "nothing matched" from
//! "the server misbehaved." All other non-2xx responses land in `HttpError`
//! with the raw status code and body.
//!
//! Read paths in `CountryService` swallow these errors after logging them;
//! only the credential operations in `SessionStore` hand an error back.

use thiserror::Error;

/// Errors returned by the `parse_*` methods of `CountryClient` and `AuthClient`.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The server returned 404.
    #[error("resource not found")]
    NotFound,

    /// The server returned a non-2xx status other than 404.
    #[error("HTTP {status}: {body}")]
    HttpError { status: u16, body: String },

    /// The response body could not be deserialized into the expected type.
    #[error("deserialization failed: {0}")]
    DeserializationError(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    SerializationError(String),
}

/// The request never produced an HTTP response (DNS, connect, TLS, read).
#[derive(Debug, Error)]
#[error("transport failed: {0}")]
pub struct TransportError(pub String);

/// Failures of the durable key/value store backing favorites and theme.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage I/O failed for key {key}: {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },

    #[error("storage lock poisoned")]
    Poisoned,
}

/// Errors surfaced by the credential operations of `SessionStore`.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The auth server refused the credentials. The payload is its error
    /// body, kept verbatim for display.
    #[error("rejected by server: {0}")]
    Rejected(serde_json::Value),

    /// Another login or register call is still outstanding.
    #[error("a credential request is already in flight")]
    InFlight,

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Invalid configuration values.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value {value:?} for {key}: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: &'static str,
    },
}
