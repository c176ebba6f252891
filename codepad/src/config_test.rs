use super::*;
use std::collections::HashMap;

fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs.iter().map(|(k, v)| ((*k).to_owned(), (*v).to_owned())).collect();
    move |key| map.get(key).cloned()
}

fn full_env() -> Vec<(&'static str, &'static str)> {
    vec![
        (ENV_API_BASE_URL, "https://api.example.test/"),
        (ENV_AUTOCOMPLETE_BASE_URL, "https://complete.example.test"),
        (ENV_SANDBOX_BASE_URL, "https://sandbox.example.test//"),
        (ENV_SANDBOX_API_KEY, "sandbox-key"),
    ]
}

// =============================================================================
// from_lookup
// =============================================================================

#[test]
fn from_lookup_applies_defaults() {
    let cfg = ServiceConfig::from_lookup(lookup_from(&full_env())).unwrap();
    assert_eq!(cfg.api_base_url.as_deref(), Some("https://api.example.test"));
    assert_eq!(cfg.sandbox_base_url.as_deref(), Some("https://sandbox.example.test"));
    assert_eq!(cfg.sandbox_key_header, DEFAULT_SANDBOX_KEY_HEADER);
    assert_eq!(cfg.sandbox_host, None);
    assert_eq!(cfg.timeouts, HttpTimeouts::default());
}

#[test]
fn from_lookup_parses_overrides() {
    let mut env = full_env();
    env.push((ENV_SANDBOX_KEY_HEADER, "X-Auth-Token"));
    env.push((ENV_SANDBOX_HOST, "judge0-ce.p.rapidapi.com"));
    env.push((ENV_HTTP_TIMEOUT_SECS, "45"));
    env.push((ENV_HTTP_CONNECT_TIMEOUT_SECS, "3"));

    let cfg = ServiceConfig::from_lookup(lookup_from(&env)).unwrap();
    assert_eq!(cfg.sandbox_key_header, "X-Auth-Token");
    assert_eq!(cfg.sandbox_host.as_deref(), Some("judge0-ce.p.rapidapi.com"));
    assert_eq!(cfg.timeouts, HttpTimeouts { request_secs: 45, connect_secs: 3 });
}

#[test]
fn from_lookup_treats_blank_values_as_missing() {
    let cfg = ServiceConfig::from_lookup(lookup_from(&[(ENV_SANDBOX_API_KEY, "   ")])).unwrap();
    assert_eq!(cfg.sandbox_api_key, None);
}

#[test]
fn from_lookup_rejects_bad_timeouts() {
    let err = ServiceConfig::from_lookup(lookup_from(&[(ENV_HTTP_TIMEOUT_SECS, "soon")])).unwrap_err();
    assert!(matches!(err, ConfigError::Invalid { key: ENV_HTTP_TIMEOUT_SECS, .. }));

    let err = ServiceConfig::from_lookup(lookup_from(&[(ENV_HTTP_CONNECT_TIMEOUT_SECS, "0")])).unwrap_err();
    assert!(matches!(err, ConfigError::Invalid { key: ENV_HTTP_CONNECT_TIMEOUT_SECS, .. }));
}

// =============================================================================
// validation
// =============================================================================

#[test]
fn endpoints_build_expected_urls() {
    let cfg = ServiceConfig::from_lookup(lookup_from(&full_env())).unwrap();
    let endpoints = cfg.endpoints().unwrap();
    assert_eq!(endpoints.lint, "https://api.example.test/api/lint");
    assert_eq!(endpoints.autocomplete, "https://complete.example.test/autocomplete");
    assert_eq!(
        endpoints.sandbox_submissions,
        "https://sandbox.example.test/submissions?base64_encoded=false&wait=true"
    );
    assert_eq!(endpoints.role_lookup, "https://api.example.test/api/users/me");
}

#[test]
fn validate_reports_each_missing_key() {
    for missing in [ENV_API_BASE_URL, ENV_AUTOCOMPLETE_BASE_URL, ENV_SANDBOX_BASE_URL, ENV_SANDBOX_API_KEY] {
        let env: Vec<_> = full_env().into_iter().filter(|(k, _)| *k != missing).collect();
        let cfg = ServiceConfig::from_lookup(lookup_from(&env)).unwrap();
        assert_eq!(cfg.validate(), Err(ConfigError::Missing { key: missing }));
    }
}

#[test]
fn validate_accepts_complete_config() {
    let cfg = ServiceConfig::from_lookup(lookup_from(&full_env())).unwrap();
    assert_eq!(cfg.validate(), Ok(()));
}

#[test]
fn debug_output_redacts_sandbox_key() {
    let cfg = ServiceConfig::from_lookup(lookup_from(&full_env())).unwrap();
    let rendered = format!("{cfg:?} {:?}", cfg.sandbox_credential().unwrap());
    assert!(!rendered.contains("sandbox-key"));
}
