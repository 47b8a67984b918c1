//! String option parsing for [`OutputBuilder`].
//!
//! Hosts usually hand over configuration as flat `key value` pairs. This
//! module maps those keys onto builder settings and can read them from one
//! section of an INI file using the `rust-ini` crate.

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use ini::Ini;
use log::warn;

use crate::builder::{AuthKind, OutputBuilder};
use crate::http_output::ConfigError;

impl OutputBuilder {
    /// Build from `key`/`value` pairs.
    ///
    /// Later keys override earlier ones. Unknown keys are logged and ignored.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if a recognised key carries an invalid value.
    pub fn from_options<I, K, V>(options: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        options
            .into_iter()
            .try_fold(Self::new(), |builder, (key, value)| {
                builder.apply_option(key.as_ref(), value.as_ref())
            })
    }

    /// Apply a single named option.
    pub fn apply_option(mut self, key: &str, value: &str) -> Result<Self, ConfigError> {
        let value = value.trim();
        match key.trim() {
            "endpoint_url" => self.url = Some(value.to_owned()),
            "http_method" => self.method = Some(value.parse()?),
            "serializer" => self.serializer = Some(value.parse()?),
            "authentication" => self.auth_kind = parse_auth_kind(value)?,
            "username" => self.username = Some(value.to_owned()),
            "password" => self.password = Some(value.to_owned()),
            "ssl_no_verify" => self.ssl_no_verify = parse_bool(key, value)?,
            "cacert_file" => self.cacert_file = Some(value.into()),
            "rate_limit_msec" => self.rate_limit_ms = Some(parse_u64(key, value)?),
            "raise_on_error" => self.raise_on_error = Some(parse_bool(key, value)?),
            "connect_timeout_ms" => self.connect_timeout_ms = Some(parse_u64(key, value)?),
            "read_timeout_ms" => self.read_timeout_ms = Some(parse_u64(key, value)?),
            other => warn!("HttpOutput ignoring unknown option {other:?}"),
        }
        Ok(self)
    }

    /// Build from one section of INI text.
    pub fn from_ini_str(path: &Path, text: &str, section: &str) -> Result<Self, ConfigError> {
        let ini = Ini::load_from_str(text).map_err(|err| ConfigError::ConfigFile {
            path: path.to_path_buf(),
            reason: format!("invalid INI: {err}"),
        })?;
        let props = ini
            .section(Some(section))
            .ok_or_else(|| ConfigError::MissingSection {
                path: path.to_path_buf(),
                section: section.to_owned(),
            })?;
        Self::from_options(props.iter())
    }

    /// Build from one section of the INI file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ConfigFile`] if the file cannot be read or
    /// parsed, [`ConfigError::MissingSection`] if `section` is absent, or any
    /// error raised by the options it contains.
    pub fn from_ini_file(path: impl AsRef<Path>, section: &str) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|err| ConfigError::ConfigFile {
            path: path.to_path_buf(),
            reason: match err.kind() {
                ErrorKind::NotFound => "file doesn't exist".to_owned(),
                _ => err.to_string(),
            },
        })?;
        Self::from_ini_str(path, &text, section)
    }
}

fn parse_auth_kind(value: &str) -> Result<AuthKind, ConfigError> {
    match value.to_ascii_lowercase().as_str() {
        "none" => Ok(AuthKind::None),
        "basic" => Ok(AuthKind::Basic),
        _ => Err(ConfigError::UnknownVariant {
            option: "authentication",
            value: value.to_owned(),
            expected: "none, basic",
        }),
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Ok(true),
        "false" | "no" | "off" | "0" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            option: key.to_owned(),
            value: value.to_owned(),
            expected: "a boolean",
        }),
    }
}

fn parse_u64(key: &str, value: &str) -> Result<u64, ConfigError> {
    value.parse().map_err(|_| ConfigError::InvalidValue {
        option: key.to_owned(),
        value: value.to_owned(),
        expected: "a non-negative integer",
    })
}
