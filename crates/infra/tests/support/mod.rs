//! Shared fixtures for infrastructure integration tests

#![allow(dead_code)]

use conduit_common::observability::{init_tracing, LogFormat};
use conduit_domain::{ClientConfig, Credentials, EndpointConfig};

/// Base64 of `secret-api-key`.
pub const API_KEY: &str = "c2VjcmV0LWFwaS1rZXk=";
pub const USER: &str = "alice";

/// Route engine logs to the test output; later calls are no-ops.
pub fn init_test_tracing() {
    let _ = init_tracing(LogFormat::Text, Some("conduit_core=debug,conduit_infra=debug"));
}

/// Config pointed at a mock server, with millisecond delays everywhere.
pub fn test_config(server_uri: &str) -> ClientConfig {
    let mut config = ClientConfig {
        endpoints: EndpointConfig::single_host(server_uri),
        user_agent: Some("conduit-tests/1.0".into()),
        ..ClientConfig::default()
    };
    config.http.max_attempts = 3;
    config.http.base_backoff_ms = 5;
    config.http.timeout_ms = 5_000;
    config.upload.part_retry_delays_ms = vec![0, 5, 10];
    config.jobs.poll_interval_ms = 10;
    config
}

pub fn signed_config(server_uri: &str) -> ClientConfig {
    ClientConfig {
        credentials: Some(Credentials { user_name: USER.into(), api_key: API_KEY.into() }),
        ..test_config(server_uri)
    }
}

/// Deterministic bytes that differ between parts.
pub fn payload(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i * 31 % 251) as u8).collect()
}

pub fn header<'a>(request: &'a wiremock::Request, name: &str) -> Option<&'a str> {
    request.headers.get(name).and_then(|value| value.to_str().ok())
}

pub fn query<'a>(request: &'a wiremock::Request, name: &str) -> Option<String> {
    request.url.query_pairs().find(|(key, _)| key == name).map(|(_, value)| value.into_owned())
}
