//! Per-chunk delivery orchestration and error policy.
//!
//! Each call to [`DeliveryEngine::deliver`] runs one attempt: gate, build,
//! send, classify. Transport failures follow [`ErrorPolicy`]; HTTP-level
//! rejections are always logged and absorbed.

use log::{debug, warn};

use crate::rate_limited_warner::RateLimitedWarner;
use crate::rate_limiter::RateLimiter;
use crate::record::Chunk;

use super::config::{ErrorPolicy, OutputConfig};
use super::error::{ConfigError, DeliveryError};
use super::request::RequestBuilder;
use super::transport::{HttpTransport, TlsSettings, Transport};

/// Classification of a completed HTTP exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseClass {
    /// 2xx responses.
    Accepted,
    /// Anything else; the chunk is dropped.
    Rejected,
}

/// Classifies an HTTP status code.
///
/// Only 2xx counts as delivered. Every other status is an application-level
/// rejection, never retried.
pub(crate) fn classify_status(status: u16) -> ResponseClass {
    match status {
        200..=299 => ResponseClass::Accepted,
        _ => ResponseClass::Rejected,
    }
}

/// How an attempt ended when no error was propagated.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DeliveryOutcome {
    /// The endpoint answered with a 2xx status.
    Delivered { status: u16 },
    /// The endpoint answered with a non-2xx status; the chunk was dropped.
    Rejected { status: u16 },
    /// The rate limiter refused the attempt; nothing was sent.
    Gated,
    /// A transport failure was swallowed because `raise_on_error` is off.
    Suppressed,
    /// The chunk held no records; nothing was sent.
    Empty,
}

impl DeliveryOutcome {
    /// Whether the chunk reached the endpoint and was accepted.
    pub fn is_delivered(&self) -> bool {
        matches!(self, Self::Delivered { .. })
    }

    /// Whether the host may advance past the chunk.
    ///
    /// Every outcome returned in `Ok` is final: the engine never retries or
    /// queues, so the chunk must not be handed over again.
    pub fn is_handled(&self) -> bool {
        match self {
            Self::Delivered { .. }
            | Self::Rejected { .. }
            | Self::Gated
            | Self::Suppressed
            | Self::Empty => true,
        }
    }

    /// Whether the chunk was dropped without reaching an accepting endpoint.
    pub fn is_dropped(&self) -> bool {
        matches!(self, Self::Rejected { .. } | Self::Gated | Self::Suppressed)
    }
}

/// Delivers chunks to one configured HTTP endpoint.
///
/// The engine is `Send + Sync`; concurrent callers share the rate limiter,
/// whose check-and-update runs under a lock.
pub struct DeliveryEngine {
    requests: RequestBuilder,
    transport: Box<dyn Transport>,
    limiter: RateLimiter,
    policy: ErrorPolicy,
    target: String,
    tls: TlsSettings,
    gated: RateLimitedWarner,
}

impl DeliveryEngine {
    /// Construct the engine with the default `ureq` transport.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the TLS configuration cannot be applied.
    pub fn new(config: OutputConfig) -> Result<Self, ConfigError> {
        let transport = HttpTransport::new(&config)?;
        Ok(Self::with_transport(config, Box::new(transport)))
    }

    /// Construct the engine around a caller supplied transport.
    pub fn with_transport(config: OutputConfig, transport: Box<dyn Transport>) -> Self {
        Self::with_parts(config, transport, None)
    }

    pub(crate) fn with_parts(
        config: OutputConfig,
        transport: Box<dyn Transport>,
        limiter: Option<RateLimiter>,
    ) -> Self {
        let limiter = limiter.unwrap_or_else(|| RateLimiter::new(config.rate_limit));
        Self {
            requests: RequestBuilder::new(&config),
            transport,
            limiter,
            policy: config.error_policy,
            target: config.endpoint.url().to_owned(),
            tls: TlsSettings::from_config(&config),
            gated: RateLimitedWarner::new(config.warn_interval),
        }
    }

    /// Attempt delivery of one chunk.
    ///
    /// Returns `Ok` whenever the host may consider the chunk handled, with the
    /// outcome describing whether it was actually delivered.
    ///
    /// # Errors
    ///
    /// * [`DeliveryError::Serialization`] - the chunk could not be serialised;
    ///   no request was sent.
    /// * [`DeliveryError::Transport`] - no response was received and
    ///   `raise_on_error` is enabled.
    pub fn deliver(&self, chunk: &Chunk) -> Result<DeliveryOutcome, DeliveryError> {
        if chunk.is_empty() {
            return Ok(DeliveryOutcome::Empty);
        }
        if !self.limiter.should_send() {
            self.gated.record_drop();
            self.gated.warn_if_due(|count| {
                warn!(
                    "HttpOutput {}: rate limit dropped {count} chunks in the last interval",
                    self.target
                );
            });
            return Ok(DeliveryOutcome::Gated);
        }

        let request = self.requests.build(chunk)?;
        match self.transport.send(&request) {
            Ok(response) => match classify_status(response.status) {
                ResponseClass::Accepted => {
                    debug!("HttpOutput {}: delivered chunk: {}", self.target, response.status);
                    Ok(DeliveryOutcome::Delivered {
                        status: response.status,
                    })
                }
                ResponseClass::Rejected => {
                    warn!(
                        "HttpOutput {}: endpoint rejected chunk: {} {}",
                        self.target, response.status, response.status_text
                    );
                    Ok(DeliveryOutcome::Rejected {
                        status: response.status,
                    })
                }
            },
            Err(err) if self.policy.raise_on_error => Err(err.into()),
            Err(err) => {
                warn!("HttpOutput {}: request failed, dropping chunk: {err}", self.target);
                Ok(DeliveryOutcome::Suppressed)
            }
        }
    }

    /// Effective TLS options.
    pub fn tls_settings(&self) -> &TlsSettings {
        &self.tls
    }

    pub fn error_policy(&self) -> ErrorPolicy {
        self.policy
    }

    /// Report any gated chunks not yet summarised in a warning.
    pub fn flush_warnings(&self) {
        self.gated.flush(|count| {
            warn!(
                "HttpOutput {}: rate limit dropped {count} chunks in the last interval",
                self.target
            );
        });
    }
}

impl std::fmt::Debug for DeliveryEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeliveryEngine")
            .field("requests", &self.requests)
            .field("limiter", &self.limiter)
            .field("policy", &self.policy)
            .field("tls", &self.tls)
            .finish_non_exhaustive()
    }
}

impl Drop for DeliveryEngine {
    fn drop(&mut self) {
        self.flush_warnings();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(200, ResponseClass::Accepted)]
    #[case(201, ResponseClass::Accepted)]
    #[case(204, ResponseClass::Accepted)]
    #[case(299, ResponseClass::Accepted)]
    #[case(301, ResponseClass::Rejected)]
    #[case(403, ResponseClass::Rejected)]
    #[case(405, ResponseClass::Rejected)]
    #[case(429, ResponseClass::Rejected)]
    #[case(500, ResponseClass::Rejected)]
    #[case(503, ResponseClass::Rejected)]
    fn status_classification(#[case] status: u16, #[case] expected: ResponseClass) {
        assert_eq!(classify_status(status), expected);
    }

    #[rstest]
    fn outcome_predicates() {
        assert!(DeliveryOutcome::Delivered { status: 200 }.is_delivered());
        assert!(DeliveryOutcome::Gated.is_dropped());
        assert!(DeliveryOutcome::Suppressed.is_dropped());
        assert!(DeliveryOutcome::Rejected { status: 403 }.is_dropped());
        assert!(!DeliveryOutcome::Empty.is_dropped());
        assert!(!DeliveryOutcome::Empty.is_delivered());
    }

    #[rstest]
    #[case(DeliveryOutcome::Delivered { status: 200 })]
    #[case(DeliveryOutcome::Rejected { status: 302 })]
    #[case(DeliveryOutcome::Rejected { status: 500 })]
    #[case(DeliveryOutcome::Gated)]
    #[case(DeliveryOutcome::Suppressed)]
    #[case(DeliveryOutcome::Empty)]
    fn every_outcome_lets_the_host_advance(#[case] outcome: DeliveryOutcome) {
        assert!(outcome.is_handled());
    }
}
