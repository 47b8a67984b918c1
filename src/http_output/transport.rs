//! Transport primitives for the delivery engine.
//!
//! [`HttpTransport`] performs one blocking HTTP/1.1 exchange per call using a
//! `ureq` agent. TLS is provided by `native-tls` and follows the configured
//! [`VerifyMode`].

use std::{
    error::Error as _,
    fs, io,
    path::{Path, PathBuf},
    sync::Arc,
};

use native_tls::{Certificate, TlsConnector};
use ureq::{Agent, AgentBuilder, ErrorKind};

use super::config::{OutputConfig, TlsConfig, VerifyMode};
use super::error::{ConfigError, TransportError, TransportErrorKind};
use super::request::Request;

/// Outcome of a completed HTTP exchange, whatever its status.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Response {
    pub status: u16,
    pub status_text: String,
}

/// Sends built requests to the endpoint.
///
/// Implementations return [`Response`] for every completed exchange,
/// including non-2xx statuses, and [`TransportError`] only when no response
/// was received.
pub trait Transport: Send + Sync {
    fn send(&self, request: &Request) -> Result<Response, TransportError>;
}

impl<T: Transport + ?Sized> Transport for Arc<T> {
    fn send(&self, request: &Request) -> Result<Response, TransportError> {
        (**self).send(request)
    }
}

/// Effective TLS options of an engine.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TlsSettings {
    /// Whether requests are sent over TLS (the endpoint scheme is `https`).
    pub use_tls: bool,
    pub verify_mode: VerifyMode,
    /// CA bundle path as configured, reported even when verification is off.
    pub ca_file: Option<PathBuf>,
}

impl TlsSettings {
    pub(crate) fn from_config(config: &OutputConfig) -> Self {
        Self {
            use_tls: config.endpoint.uses_tls(),
            verify_mode: config.tls.verify_mode,
            ca_file: config.tls.ca_file.clone(),
        }
    }
}

/// Blocking HTTP client backed by `ureq`.
///
/// Idle connections are not retained, so every call opens and closes its own
/// connection. Redirects are not followed: a 3xx status is returned as is,
/// so the only methods on the wire are the configured POST or PUT.
pub struct HttpTransport {
    agent: Agent,
}

impl HttpTransport {
    /// Build the client for `config`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the CA file cannot be loaded or the TLS
    /// connector cannot be built.
    pub fn new(config: &OutputConfig) -> Result<Self, ConfigError> {
        let mut builder = AgentBuilder::new()
            .timeout_connect(config.connect_timeout)
            .timeout_read(config.read_timeout)
            .timeout_write(config.read_timeout)
            .max_idle_connections(0)
            .max_idle_connections_per_host(0)
            .redirects(0);
        if config.endpoint.uses_tls() {
            builder = builder.tls_connector(Arc::new(tls_connector(&config.tls)?));
        }
        Ok(Self {
            agent: builder.build(),
        })
    }
}

impl Transport for HttpTransport {
    fn send(&self, request: &Request) -> Result<Response, TransportError> {
        let mut req = self.agent.request(request.method.as_str(), &request.url);
        for (key, value) in &request.headers {
            req = req.set(key, value);
        }
        match req.send_bytes(&request.body) {
            Ok(response) => Ok(Response {
                status: response.status(),
                status_text: response.status_text().to_owned(),
            }),
            Err(ureq::Error::Status(status, response)) => Ok(Response {
                status,
                status_text: response.status_text().to_owned(),
            }),
            Err(ureq::Error::Transport(transport)) => Err(TransportError {
                kind: classify_transport(&transport),
                url: request.url.clone(),
                message: transport.to_string(),
            }),
        }
    }
}

impl std::fmt::Debug for HttpTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpTransport").finish_non_exhaustive()
    }
}

fn classify_transport(transport: &ureq::Transport) -> TransportErrorKind {
    let timed_out = transport
        .source()
        .and_then(|source| source.downcast_ref::<io::Error>())
        .is_some_and(|err| {
            matches!(
                err.kind(),
                io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock
            )
        });
    if timed_out {
        return TransportErrorKind::Timeout;
    }
    match transport.kind() {
        ErrorKind::Dns => TransportErrorKind::Dns,
        ErrorKind::ConnectionFailed => TransportErrorKind::Connect,
        _ => TransportErrorKind::Io,
    }
}

fn tls_connector(tls: &TlsConfig) -> Result<TlsConnector, ConfigError> {
    let mut builder = TlsConnector::builder();
    match tls.verify_mode {
        VerifyMode::None => {
            builder.danger_accept_invalid_certs(true);
            builder.danger_accept_invalid_hostnames(true);
        }
        VerifyMode::Peer => {
            if let Some(path) = &tls.ca_file {
                builder.add_root_certificate(load_certificate(path)?);
            }
        }
    }
    Ok(builder.build()?)
}

fn load_certificate(path: &Path) -> Result<Certificate, ConfigError> {
    let ca_error = |source| ConfigError::CaFile {
        path: path.to_path_buf(),
        source,
    };
    let pem = fs::read(path).map_err(ca_error)?;
    Certificate::from_pem(&pem)
        .map_err(|err| ca_error(io::Error::new(io::ErrorKind::InvalidData, err)))
}
