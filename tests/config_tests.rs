//! Loading engine configuration from INI files.

use std::io::Write;

use http_output::{ConfigError, HttpMethod, OutputBuilder, SerializerKind, VerifyMode};
use rstest::rstest;
use tempfile::NamedTempFile;

fn write_ini(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("create temp ini file");
    file.write_all(contents.as_bytes()).expect("write ini contents");
    file
}

#[rstest]
fn loads_output_section_from_disk() {
    let file = write_ini(
        "[output]\n\
         endpoint_url = https://127.0.0.1:5127/api/\n\
         http_method = put\n\
         serializer = json\n\
         ssl_no_verify = true\n\
         cacert_file = /tmp/ssl.cert\n\
         rate_limit_msec = 1200\n\
         raise_on_error = false\n",
    );

    let config = OutputBuilder::from_ini_file(file.path(), "output")
        .expect("parse ini")
        .build_config()
        .expect("valid config");

    assert_eq!(config.endpoint.url(), "https://127.0.0.1:5127/api/");
    assert_eq!(config.endpoint.method, HttpMethod::Put);
    assert_eq!(config.serializer, SerializerKind::Json);
    assert_eq!(config.tls.verify_mode, VerifyMode::None);
    assert_eq!(
        config.tls.ca_file.as_deref(),
        Some(std::path::Path::new("/tmp/ssl.cert"))
    );
    assert!(!config.error_policy.raise_on_error);
}

#[rstest]
fn missing_file_is_a_config_error() {
    let err = OutputBuilder::from_ini_file("/nonexistent/http_output.ini", "output")
        .expect_err("missing file");
    assert!(matches!(err, ConfigError::ConfigFile { .. }));
}

#[rstest]
fn invalid_value_in_file_is_reported() {
    let file = write_ini("[output]\nendpoint_url = http://127.0.0.1:5126/api/\nserializer = yaml\n");
    let err = OutputBuilder::from_ini_file(file.path(), "output").expect_err("bad serializer");
    assert!(err.to_string().contains("yaml"));
}

#[rstest]
fn basic_auth_without_password_fails_to_build() {
    let file = write_ini(
        "[output]\nendpoint_url = http://127.0.0.1:5126/api/\nauthentication = basic\nusername = alice\n",
    );
    let err = OutputBuilder::from_ini_file(file.path(), "output")
        .expect("parse ini")
        .build()
        .expect_err("missing password");
    assert!(matches!(err, ConfigError::MissingCredential("password")));
}
