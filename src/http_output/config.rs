//! Configuration structures consumed by the delivery engine.
//!
//! [`OutputBuilder`](crate::OutputBuilder) constructs these values before
//! passing them to [`DeliveryEngine`](super::DeliveryEngine). Everything here
//! is fixed for the lifetime of an engine.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use url::Url;

use crate::rate_limited_warner::DEFAULT_WARN_INTERVAL;

use super::error::ConfigError;

/// Default connection timeout applied when establishing HTTP connections.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
/// Default read/write timeout applied once connected.
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(5);

/// HTTP methods the engine issues.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum HttpMethod {
    #[default]
    Post,
    Put,
}

impl HttpMethod {
    /// Convert to the string representation used by ureq.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Post => "POST",
            Self::Put => "PUT",
        }
    }
}

impl FromStr for HttpMethod {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "post" => Ok(Self::Post),
            "put" => Ok(Self::Put),
            _ => Err(ConfigError::UnknownVariant {
                option: "http_method",
                value: s.to_owned(),
                expected: "post, put",
            }),
        }
    }
}

/// Body format used for outgoing requests.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SerializerKind {
    /// `application/x-www-form-urlencoded` pairs from the first record.
    #[default]
    Form,
    /// `application/json` object (one record) or array (several).
    Json,
    /// `text/plain` body taken from the `message` field.
    Text,
}

impl SerializerKind {
    pub fn content_type(&self) -> &'static str {
        match self {
            Self::Form => "application/x-www-form-urlencoded",
            Self::Json => "application/json",
            Self::Text => "text/plain",
        }
    }
}

impl FromStr for SerializerKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "form" => Ok(Self::Form),
            "json" => Ok(Self::Json),
            "text" => Ok(Self::Text),
            _ => Err(ConfigError::UnknownVariant {
                option: "serializer",
                value: s.to_owned(),
                expected: "form, json, text",
            }),
        }
    }
}

/// Authentication configuration for HTTP requests.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum AuthConfig {
    /// No authentication.
    #[default]
    None,
    /// HTTP Basic authentication with username and password.
    Basic { username: String, password: String },
}

/// TLS peer certificate validation policy.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum VerifyMode {
    /// Validate the certificate chain and hostname.
    #[default]
    Peer,
    /// Skip all certificate and hostname checks.
    None,
}

/// TLS options, consulted only for `https` endpoints.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TlsConfig {
    pub verify_mode: VerifyMode,
    /// PEM bundle added to the trust store when verifying peers.
    pub ca_file: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Scheme {
    Http,
    Https,
}

/// Parsed delivery target.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EndpointConfig {
    pub scheme: Scheme,
    pub host: String,
    pub port: u16,
    pub path: String,
    pub method: HttpMethod,
    url: String,
}

impl EndpointConfig {
    /// Parse `endpoint_url`, accepting only `http` and `https` targets with a host.
    pub fn parse(endpoint_url: &str, method: HttpMethod) -> Result<Self, ConfigError> {
        let trimmed = endpoint_url.trim();
        if trimmed.is_empty() {
            return Err(ConfigError::MissingEndpoint);
        }
        let parsed = Url::parse(trimmed).map_err(|err| ConfigError::InvalidEndpoint {
            url: trimmed.to_owned(),
            reason: err.to_string(),
        })?;
        let scheme = match parsed.scheme() {
            "http" => Scheme::Http,
            "https" => Scheme::Https,
            other => return Err(ConfigError::UnsupportedScheme(other.to_owned())),
        };
        let host = parsed
            .host_str()
            .filter(|h| !h.is_empty())
            .ok_or_else(|| ConfigError::InvalidEndpoint {
                url: trimmed.to_owned(),
                reason: "missing host".into(),
            })?
            .to_owned();
        let port = parsed
            .port_or_known_default()
            .ok_or_else(|| ConfigError::InvalidEndpoint {
                url: trimmed.to_owned(),
                reason: "missing port".into(),
            })?;
        Ok(Self {
            scheme,
            host,
            port,
            path: parsed.path().to_owned(),
            method,
            url: parsed.into(),
        })
    }

    /// Full target URL as sent on the wire.
    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn uses_tls(&self) -> bool {
        self.scheme == Scheme::Https
    }
}

/// Whether transport failures propagate to the host.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ErrorPolicy {
    pub raise_on_error: bool,
}

impl Default for ErrorPolicy {
    fn default() -> Self {
        Self {
            raise_on_error: true,
        }
    }
}

/// Configuration object describing how to construct a
/// [`DeliveryEngine`](super::DeliveryEngine).
#[derive(Clone, Debug)]
pub struct OutputConfig {
    pub endpoint: EndpointConfig,
    pub serializer: SerializerKind,
    pub auth: AuthConfig,
    pub tls: TlsConfig,
    /// Minimum spacing between attempts; `None` disables limiting.
    pub rate_limit: Option<Duration>,
    pub error_policy: ErrorPolicy,
    /// Additional HTTP headers to include in requests.
    pub headers: Vec<(String, String)>,
    pub connect_timeout: Duration,
    /// Read and write timeout once connected.
    pub read_timeout: Duration,
    /// Interval between summarised drop warnings.
    pub warn_interval: Duration,
}

impl OutputConfig {
    /// Configuration with every option at its default for `endpoint`.
    pub fn new(endpoint: EndpointConfig) -> Self {
        Self {
            endpoint,
            serializer: SerializerKind::default(),
            auth: AuthConfig::default(),
            tls: TlsConfig::default(),
            rate_limit: None,
            error_policy: ErrorPolicy::default(),
            headers: Vec::new(),
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            read_timeout: DEFAULT_READ_TIMEOUT,
            warn_interval: DEFAULT_WARN_INTERVAL,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn parses_plain_endpoint() {
        let endpoint = EndpointConfig::parse("http://127.0.0.1:5126/api/", HttpMethod::Post)
            .expect("valid endpoint");
        assert_eq!(endpoint.scheme, Scheme::Http);
        assert_eq!(endpoint.host, "127.0.0.1");
        assert_eq!(endpoint.port, 5126);
        assert_eq!(endpoint.path, "/api/");
        assert_eq!(endpoint.url(), "http://127.0.0.1:5126/api/");
        assert!(!endpoint.uses_tls());
    }

    #[rstest]
    fn https_defaults_to_port_443() {
        let endpoint =
            EndpointConfig::parse("https://logs.example.com/ingest", HttpMethod::Put).expect("valid");
        assert!(endpoint.uses_tls());
        assert_eq!(endpoint.port, 443);
        assert_eq!(endpoint.method, HttpMethod::Put);
    }

    #[rstest]
    #[case("")]
    #[case("not a url")]
    #[case("ftp://127.0.0.1/api/")]
    #[case("unix:/tmp/socket")]
    fn rejects_bad_endpoints(#[case] url: &str) {
        assert!(EndpointConfig::parse(url, HttpMethod::Post).is_err());
    }

    #[rstest]
    #[case("post", HttpMethod::Post)]
    #[case("PUT", HttpMethod::Put)]
    fn parses_methods(#[case] raw: &str, #[case] expected: HttpMethod) {
        assert_eq!(raw.parse::<HttpMethod>().expect("method"), expected);
    }

    #[rstest]
    fn rejects_other_methods() {
        assert!("get".parse::<HttpMethod>().is_err());
        assert!("delete".parse::<HttpMethod>().is_err());
    }

    #[rstest]
    #[case("form", "application/x-www-form-urlencoded")]
    #[case("json", "application/json")]
    #[case("text", "text/plain")]
    fn serializer_content_types(#[case] raw: &str, #[case] content_type: &str) {
        let kind: SerializerKind = raw.parse().expect("kind");
        assert_eq!(kind.content_type(), content_type);
    }

    #[rstest]
    fn unknown_serializer_is_a_config_error() {
        let err = "msgpack".parse::<SerializerKind>().expect_err("unknown");
        assert!(matches!(err, ConfigError::UnknownVariant { option: "serializer", .. }));
    }
}
