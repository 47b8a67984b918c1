//! Error types raised while configuring and driving the delivery engine.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors detected while turning options into an engine.
///
/// These are raised once at construction and are never retried.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("endpoint_url is required")]
    MissingEndpoint,
    #[error("invalid endpoint_url {url:?}: {reason}")]
    InvalidEndpoint { url: String, reason: String },
    #[error("unsupported endpoint scheme {0:?}; expected http or https")]
    UnsupportedScheme(String),
    #[error("unknown {option} value {value:?}; expected one of {expected}")]
    UnknownVariant {
        option: &'static str,
        value: String,
        expected: &'static str,
    },
    #[error("basic authentication requires {0}")]
    MissingCredential(&'static str),
    #[error("{option} expects {expected}, got {value:?}")]
    InvalidValue {
        option: String,
        value: String,
        expected: &'static str,
    },
    #[error("{0} must be greater than zero")]
    NotPositive(&'static str),
    #[error("failed to load CA file {path}: {source}")]
    CaFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to build TLS connector: {0}")]
    Tls(#[from] native_tls::Error),
    #[error("failed to read configuration file {path}: {reason}")]
    ConfigFile { path: PathBuf, reason: String },
    #[error("configuration file {path} has no section [{section}]")]
    MissingSection { path: PathBuf, section: String },
}

/// A chunk could not be turned into a request body.
#[derive(Debug, Error)]
pub enum SerializationError {
    #[error("text serializer requires a `{0}` field")]
    MissingField(&'static str),
    #[error("field `{0}` holds a non-finite float, which JSON cannot represent")]
    NonFiniteFloat(String),
    #[error("JSON encoding failed: {0}")]
    Json(#[from] serde_json::Error),
}

/// Coarse classification of failures below the HTTP layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransportErrorKind {
    /// Name resolution failed.
    Dns,
    /// TCP connect or TLS handshake failed (including refused connections).
    Connect,
    /// The connect or read deadline expired.
    Timeout,
    /// Any other I/O or protocol failure before a status line was read.
    Io,
}

/// The request never produced an HTTP response.
#[derive(Clone, Debug, Error)]
#[error("{kind:?} failure sending to {url}: {message}")]
pub struct TransportError {
    pub kind: TransportErrorKind,
    pub url: String,
    pub message: String,
}

/// Failure returned from [`DeliveryEngine::deliver`](super::DeliveryEngine::deliver).
///
/// The host owns retries for these; application-level rejections and gated
/// attempts are reported as outcomes instead.
#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error(transparent)]
    Serialization(#[from] SerializationError),
    #[error(transparent)]
    Transport(#[from] TransportError),
}
