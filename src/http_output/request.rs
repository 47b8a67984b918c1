//! Composition of outbound HTTP requests from chunks.

use base64::{Engine, engine::general_purpose::STANDARD as BASE64_STANDARD};

use crate::record::Chunk;

use super::config::{AuthConfig, EndpointConfig, HttpMethod, OutputConfig, SerializerKind};
use super::error::SerializationError;

/// Fully built request, ready for a [`Transport`](super::Transport).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Request {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl Request {
    /// First header value matching `name`, compared case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Builds requests from the engine's fixed configuration.
#[derive(Clone, Debug)]
pub struct RequestBuilder {
    endpoint: EndpointConfig,
    serializer: SerializerKind,
    authorization: Option<String>,
    headers: Vec<(String, String)>,
}

impl RequestBuilder {
    pub fn new(config: &OutputConfig) -> Self {
        Self {
            endpoint: config.endpoint.clone(),
            serializer: config.serializer,
            authorization: authorization_header(&config.auth),
            headers: config.headers.clone(),
        }
    }

    /// Serialise `chunk` and attach method, target and headers.
    ///
    /// # Errors
    ///
    /// Fails only when the serializer fails.
    pub fn build(&self, chunk: &Chunk) -> Result<Request, SerializationError> {
        let payload = self.serializer.serialise(chunk)?;
        let mut headers = self.headers.clone();
        headers.push(("Content-Type".into(), payload.content_type.into()));
        if let Some(auth) = &self.authorization {
            headers.push(("Authorization".into(), auth.clone()));
        }
        Ok(Request {
            method: self.endpoint.method,
            url: self.endpoint.url().to_owned(),
            headers,
            body: payload.body,
        })
    }
}

fn authorization_header(auth: &AuthConfig) -> Option<String> {
    match auth {
        AuthConfig::None => None,
        AuthConfig::Basic { username, password } => {
            let credentials = format!("{username}:{password}");
            Some(format!("Basic {}", base64_encode(credentials.as_bytes())))
        }
    }
}

/// Base64-encode a byte slice for Basic auth.
fn base64_encode(input: &[u8]) -> String {
    BASE64_STANDARD.encode(input)
}
