//! Delivery engine for an HTTP log output.
//!
//! The host pipeline hands over [`Chunk`]s of [`Record`]s; a
//! [`DeliveryEngine`] serialises each chunk into one HTTP request and sends it
//! to the configured endpoint, applying authentication, a lossy rate limiter
//! and the transport error policy.

mod builder;
pub mod http_output;
mod options;
pub mod rate_limited_warner;
pub mod rate_limiter;
pub mod record;

pub use builder::{AuthKind, OutputBuilder};
pub use http_output::{
    AuthConfig, ConfigError, DeliveryEngine, DeliveryError, DeliveryOutcome, EndpointConfig,
    ErrorPolicy, HttpMethod, HttpTransport, OutputConfig, Request, Response, SerializationError,
    SerializerKind, TlsConfig, TlsSettings, Transport, TransportError, TransportErrorKind,
    VerifyMode,
};
pub use rate_limiter::RateLimiter;
pub use record::{Chunk, Record, Value};
