//! Builder for [`DeliveryEngine`](crate::http_output::DeliveryEngine).
//!
//! Exposes endpoint, serializer, authentication, TLS, rate limiting, error
//! policy and timeout settings. Validation happens once in
//! [`OutputBuilder::build`]; the resulting engine configuration is immutable.

use std::{path::PathBuf, sync::Arc, time::Duration};

use crate::http_output::{
    AuthConfig, ConfigError, DeliveryEngine, EndpointConfig, ErrorPolicy, HttpMethod,
    OutputConfig, SerializerKind, TlsConfig, Transport, VerifyMode,
};

macro_rules! ensure_positive {
    ($value:expr, $field:expr) => {{
        if $value == 0 {
            Err(ConfigError::NotPositive($field))
        } else {
            Ok($value)
        }
    }};
}

macro_rules! option_setter {
    ($(#[$meta:meta])* $fn_name:ident, $field:ident, $ty:ty) => {
        $(#[$meta])*
        pub fn $fn_name(mut self, value: $ty) -> Self {
            self.$field = Some(value);
            self
        }
    };
}

/// Authentication scheme selected before credentials are validated.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AuthKind {
    #[default]
    None,
    Basic,
}

/// Builder for constructing [`DeliveryEngine`] instances.
#[derive(Clone, Default)]
pub struct OutputBuilder {
    pub(crate) url: Option<String>,
    pub(crate) method: Option<HttpMethod>,
    pub(crate) serializer: Option<SerializerKind>,
    pub(crate) auth_kind: AuthKind,
    pub(crate) username: Option<String>,
    pub(crate) password: Option<String>,
    pub(crate) headers: Vec<(String, String)>,
    pub(crate) ssl_no_verify: bool,
    pub(crate) cacert_file: Option<PathBuf>,
    pub(crate) rate_limit_ms: Option<u64>,
    pub(crate) raise_on_error: Option<bool>,
    pub(crate) connect_timeout_ms: Option<u64>,
    pub(crate) read_timeout_ms: Option<u64>,
    transport: Option<Arc<dyn Transport>>,
}

impl OutputBuilder {
    /// Create a new builder with no URL configured.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the target URL (required).
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Set the HTTP method. Defaults to POST.
    pub fn with_method(mut self, method: HttpMethod) -> Self {
        self.method = Some(method);
        self
    }

    /// Select the body format. Defaults to form encoding.
    pub fn with_serializer(mut self, serializer: SerializerKind) -> Self {
        self.serializer = Some(serializer);
        self
    }

    /// Configure HTTP Basic authentication.
    pub fn with_basic_auth(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.auth_kind = AuthKind::Basic;
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }

    /// Add a single custom HTTP header.
    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((key.into(), value.into()));
        self
    }

    /// Skip TLS certificate and hostname verification.
    pub fn with_ssl_no_verify(mut self, no_verify: bool) -> Self {
        self.ssl_no_verify = no_verify;
        self
    }

    /// Trust the PEM certificate at `path` when verifying peers.
    pub fn with_cacert_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.cacert_file = Some(path.into());
        self
    }

    option_setter!(
        #[doc = "Set the minimum interval between attempts in milliseconds."]
        with_rate_limit_ms,
        rate_limit_ms,
        u64
    );
    option_setter!(
        #[doc = "Propagate transport failures to the caller (default `true`)."]
        with_raise_on_error,
        raise_on_error,
        bool
    );
    option_setter!(
        #[doc = "Set the connect timeout in milliseconds."]
        with_connect_timeout_ms,
        connect_timeout_ms,
        u64
    );
    option_setter!(
        #[doc = "Set the read/write timeout in milliseconds."]
        with_read_timeout_ms,
        read_timeout_ms,
        u64
    );

    /// Replace the default `ureq` transport.
    pub fn with_transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    fn validate_timeouts(&self) -> Result<(), ConfigError> {
        if let Some(timeout) = self.connect_timeout_ms {
            ensure_positive!(timeout, "connect_timeout_ms")?;
        }
        if let Some(timeout) = self.read_timeout_ms {
            ensure_positive!(timeout, "read_timeout_ms")?;
        }
        Ok(())
    }

    fn auth_config(&self) -> Result<AuthConfig, ConfigError> {
        match self.auth_kind {
            AuthKind::None => Ok(AuthConfig::None),
            AuthKind::Basic => Ok(AuthConfig::Basic {
                username: self
                    .username
                    .clone()
                    .ok_or(ConfigError::MissingCredential("username"))?,
                password: self
                    .password
                    .clone()
                    .ok_or(ConfigError::MissingCredential("password"))?,
            }),
        }
    }

    /// Validate the settings and produce the engine configuration.
    pub fn build_config(&self) -> Result<OutputConfig, ConfigError> {
        self.validate_timeouts()?;
        let url = self.url.as_deref().ok_or(ConfigError::MissingEndpoint)?;
        let endpoint = EndpointConfig::parse(url, self.method.unwrap_or_default())?;

        let mut config = OutputConfig::new(endpoint);
        config.serializer = self.serializer.unwrap_or_default();
        config.auth = self.auth_config()?;
        config.tls = TlsConfig {
            verify_mode: if self.ssl_no_verify {
                VerifyMode::None
            } else {
                VerifyMode::Peer
            },
            ca_file: self.cacert_file.clone(),
        };
        // A zero interval never refuses an attempt, so treat it as unlimited.
        config.rate_limit = self
            .rate_limit_ms
            .filter(|&ms| ms > 0)
            .map(Duration::from_millis);
        config.error_policy = ErrorPolicy {
            raise_on_error: self
                .raise_on_error
                .unwrap_or(ErrorPolicy::default().raise_on_error),
        };
        config.headers = self.headers.clone();
        if let Some(ms) = self.connect_timeout_ms {
            config.connect_timeout = Duration::from_millis(ms);
        }
        if let Some(ms) = self.read_timeout_ms {
            config.read_timeout = Duration::from_millis(ms);
        }
        Ok(config)
    }

    /// Build the engine.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] for an invalid or missing endpoint, missing
    /// credentials, zero timeouts or unusable TLS settings.
    pub fn build(&self) -> Result<DeliveryEngine, ConfigError> {
        let config = self.build_config()?;
        match &self.transport {
            Some(transport) => Ok(DeliveryEngine::with_transport(
                config,
                Box::new(Arc::clone(transport)),
            )),
            None => DeliveryEngine::new(config),
        }
    }
}

impl std::fmt::Debug for OutputBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OutputBuilder")
            .field("url", &self.url)
            .field("method", &self.method)
            .field("serializer", &self.serializer)
            .field("auth_kind", &self.auth_kind)
            .field("username", &self.username)
            .field("ssl_no_verify", &self.ssl_no_verify)
            .field("cacert_file", &self.cacert_file)
            .field("rate_limit_ms", &self.rate_limit_ms)
            .field("raise_on_error", &self.raise_on_error)
            .field("connect_timeout_ms", &self.connect_timeout_ms)
            .field("read_timeout_ms", &self.read_timeout_ms)
            .field("custom_transport", &self.transport.is_some())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    const URL: &str = "http://127.0.0.1:5126/api/";

    #[rstest]
    fn defaults_match_documented_options() {
        let config = OutputBuilder::new().with_url(URL).build_config().expect("config");
        assert_eq!(config.endpoint.url(), URL);
        assert_eq!(config.endpoint.method, HttpMethod::Post);
        assert_eq!(config.serializer, SerializerKind::Form);
        assert_eq!(config.auth, AuthConfig::None);
        assert_eq!(config.tls.verify_mode, VerifyMode::Peer);
        assert_eq!(config.rate_limit, None);
        assert!(config.error_policy.raise_on_error);
    }

    #[rstest]
    fn missing_url_is_rejected() {
        assert!(matches!(
            OutputBuilder::new().build_config(),
            Err(ConfigError::MissingEndpoint)
        ));
    }

    #[rstest]
    #[case(None, Some("pw"), "username")]
    #[case(Some("alice"), None, "password")]
    fn basic_auth_requires_both_credentials(
        #[case] username: Option<&str>,
        #[case] password: Option<&str>,
        #[case] missing: &str,
    ) {
        let mut builder = OutputBuilder::new().with_url(URL);
        builder.auth_kind = AuthKind::Basic;
        builder.username = username.map(str::to_owned);
        builder.password = password.map(str::to_owned);
        match builder.build_config() {
            Err(ConfigError::MissingCredential(field)) => assert_eq!(field, missing),
            other => panic!("expected missing credential, got {other:?}"),
        }
    }

    #[rstest]
    fn zero_timeout_is_rejected() {
        let err = OutputBuilder::new()
            .with_url(URL)
            .with_connect_timeout_ms(0)
            .build_config()
            .expect_err("zero timeout");
        assert!(matches!(err, ConfigError::NotPositive("connect_timeout_ms")));
    }

    #[rstest]
    fn tls_and_rate_limit_settings_are_applied() {
        let config = OutputBuilder::new()
            .with_url("https://127.0.0.1:5127/api/")
            .with_ssl_no_verify(true)
            .with_cacert_file("/tmp/ssl.cert")
            .with_rate_limit_ms(1200)
            .with_raise_on_error(false)
            .with_read_timeout_ms(250)
            .build_config()
            .expect("config");
        assert_eq!(config.tls.verify_mode, VerifyMode::None);
        assert_eq!(config.tls.ca_file, Some(PathBuf::from("/tmp/ssl.cert")));
        assert_eq!(config.rate_limit, Some(Duration::from_millis(1200)));
        assert!(!config.error_policy.raise_on_error);
        assert_eq!(config.read_timeout, Duration::from_millis(250));
    }

    #[rstest]
    fn zero_rate_limit_means_unlimited() {
        let config = OutputBuilder::new()
            .with_url(URL)
            .with_rate_limit_ms(0)
            .build_config()
            .expect("config");
        assert_eq!(config.rate_limit, None);
    }
}
