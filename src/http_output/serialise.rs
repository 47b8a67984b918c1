//! Serialisation of chunks into HTTP request bodies.
//!
//! Each [`SerializerKind`] maps a [`Chunk`] to a content type and a byte body.
//! The form and text formats carry a single record per request; JSON carries
//! every record in the chunk.

use log::debug;

use crate::record::{Chunk, Record, Value};

use super::config::SerializerKind;
use super::error::SerializationError;
use super::url_encoding::{url_encode, url_encode_bytes};

/// Field read by the text serializer.
pub const MESSAGE_FIELD: &str = "message";

/// Serialised request body together with its content type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Payload {
    pub content_type: &'static str,
    pub body: Vec<u8>,
}

impl SerializerKind {
    /// Serialise `chunk` into a request body.
    ///
    /// # Errors
    ///
    /// Returns [`SerializationError::MissingField`] when the text format is
    /// selected and the record has no `message` field, or
    /// [`SerializationError::Json`] if JSON encoding fails.
    pub fn serialise(&self, chunk: &Chunk) -> Result<Payload, SerializationError> {
        let body = match self {
            Self::Form => serialise_form(chunk).into_bytes(),
            Self::Json => serialise_json(chunk)?,
            Self::Text => serialise_text(chunk)?,
        };
        Ok(Payload {
            content_type: self.content_type(),
            body,
        })
    }
}

fn single_record<'a>(chunk: &'a Chunk, format: &str) -> Option<&'a Record> {
    if chunk.len() > 1 {
        debug!(
            "{format} serializer sends one record per request; {} further records not sent",
            chunk.len() - 1
        );
    }
    chunk.first()
}

fn encode_value(value: &Value) -> String {
    match value {
        Value::Bytes(b) => url_encode_bytes(b),
        Value::Str(s) => url_encode(s),
        Value::Int(_) | Value::Float(_) => url_encode(&value.to_string()),
    }
}

/// Serialise the first record as `key=value` pairs joined by `&`.
pub fn serialise_form(chunk: &Chunk) -> String {
    let Some(record) = single_record(chunk, "form") else {
        return String::new();
    };
    record
        .iter()
        .map(|(k, v)| format!("{}={}", url_encode(k), encode_value(v)))
        .collect::<Vec<_>>()
        .join("&")
}

/// Serialise a chunk to JSON: an object for one record, an array otherwise.
///
/// NaN and infinities are refused rather than sent as `null`.
pub fn serialise_json(chunk: &Chunk) -> Result<Vec<u8>, SerializationError> {
    let non_finite = chunk
        .records()
        .iter()
        .flat_map(Record::iter)
        .find(|(_, value)| matches!(value, Value::Float(v) if !v.is_finite()));
    if let Some((field, _)) = non_finite {
        return Err(SerializationError::NonFiniteFloat(field.clone()));
    }
    let body = match chunk.records() {
        [record] => serde_json::to_vec(record)?,
        records => serde_json::to_vec(records)?,
    };
    Ok(body)
}

/// Use the first record's `message` field verbatim as the body.
pub fn serialise_text(chunk: &Chunk) -> Result<Vec<u8>, SerializationError> {
    single_record(chunk, "text")
        .and_then(|record| record.get(MESSAGE_FIELD))
        .map(Value::to_bytes)
        .ok_or(SerializationError::MissingField(MESSAGE_FIELD))
}
