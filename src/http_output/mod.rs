//! HTTP delivery engine.
//!
//! This module defines [`DeliveryEngine`], which serialises a
//! [`Chunk`](crate::record::Chunk) into one HTTP request and sends it to a
//! configured endpoint over plain HTTP or TLS.
//!
//! # Serialization Formats
//!
//! - **Form** (default): `application/x-www-form-urlencoded` pairs built from
//!   the first record of the chunk.
//! - **JSON**: `application/json`, one object per record.
//! - **Text**: `text/plain`, the first record's `message` field verbatim.
//!
//! # Error Policy
//!
//! - **2xx**: delivered.
//! - **Any other status**: logged and dropped, never propagated. Redirects
//!   are not followed.
//! - **Transport failures**: propagated when `raise_on_error` is set
//!   (the default), otherwise logged and dropped.
//! - **Rate limited**: dropped silently and reported as
//!   [`DeliveryOutcome::Gated`].

mod config;
mod engine;
mod error;
mod request;
mod serialise;
mod transport;
mod url_encoding;


pub use config::{
    AuthConfig, DEFAULT_CONNECT_TIMEOUT, DEFAULT_READ_TIMEOUT, EndpointConfig, ErrorPolicy,
    HttpMethod, OutputConfig, Scheme, SerializerKind, TlsConfig, VerifyMode,
};
pub use engine::{DeliveryEngine, DeliveryOutcome, ResponseClass};
pub use error::{
    ConfigError, DeliveryError, SerializationError, TransportError, TransportErrorKind,
};
pub use request::{Request, RequestBuilder};
pub use serialise::{MESSAGE_FIELD, Payload};
pub use transport::{HttpTransport, Response, TlsSettings, Transport};
