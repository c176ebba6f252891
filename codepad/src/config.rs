//! Service configuration parsed from environment variables.
//!
//! Values are read once at process start into an immutable [`ServiceConfig`]
//! and injected into constructors. Required values are checked when a
//! component that needs them is built, so a missing key fails construction
//! instead of a later request.

use std::fmt;

use crate::error::ConfigError;

pub const ENV_API_BASE_URL: &str = "CODEPAD_API_BASE_URL";
pub const ENV_AUTOCOMPLETE_BASE_URL: &str = "CODEPAD_AUTOCOMPLETE_BASE_URL";
pub const ENV_SANDBOX_BASE_URL: &str = "CODEPAD_SANDBOX_BASE_URL";
pub const ENV_SANDBOX_API_KEY: &str = "CODEPAD_SANDBOX_API_KEY";
pub const ENV_SANDBOX_KEY_HEADER: &str = "CODEPAD_SANDBOX_KEY_HEADER";
pub const ENV_SANDBOX_HOST: &str = "CODEPAD_SANDBOX_HOST";
pub const ENV_HTTP_TIMEOUT_SECS: &str = "CODEPAD_HTTP_TIMEOUT_SECS";
pub const ENV_HTTP_CONNECT_TIMEOUT_SECS: &str = "CODEPAD_HTTP_CONNECT_TIMEOUT_SECS";

pub const DEFAULT_SANDBOX_KEY_HEADER: &str = "X-RapidAPI-Key";
pub const SANDBOX_HOST_HEADER: &str = "X-RapidAPI-Host";
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_HTTP_CONNECT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HttpTimeouts {
    pub request_secs: u64,
    pub connect_secs: u64,
}

impl Default for HttpTimeouts {
    fn default() -> Self {
        Self { request_secs: DEFAULT_HTTP_TIMEOUT_SECS, connect_secs: DEFAULT_HTTP_CONNECT_TIMEOUT_SECS }
    }
}

/// Raw service configuration. Required values stay optional here and are
/// validated by [`ServiceConfig::endpoints`] / [`ServiceConfig::sandbox_credential`].
#[derive(Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    pub api_base_url: Option<String>,
    pub autocomplete_base_url: Option<String>,
    pub sandbox_base_url: Option<String>,
    pub sandbox_api_key: Option<String>,
    pub sandbox_key_header: String,
    pub sandbox_host: Option<String>,
    pub timeouts: HttpTimeouts,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            api_base_url: None,
            autocomplete_base_url: None,
            sandbox_base_url: None,
            sandbox_api_key: None,
            sandbox_key_header: DEFAULT_SANDBOX_KEY_HEADER.to_owned(),
            sandbox_host: None,
            timeouts: HttpTimeouts::default(),
        }
    }
}

impl fmt::Debug for ServiceConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceConfig")
            .field("api_base_url", &self.api_base_url)
            .field("autocomplete_base_url", &self.autocomplete_base_url)
            .field("sandbox_base_url", &self.sandbox_base_url)
            .field("sandbox_api_key", &self.sandbox_api_key.as_ref().map(|_| ".."))
            .field("sandbox_key_header", &self.sandbox_key_header)
            .field("sandbox_host", &self.sandbox_host)
            .field("timeouts", &self.timeouts)
            .finish()
    }
}

impl ServiceConfig {
    /// Build config from the process environment.
    ///
    /// Required (checked at construction of the components that use them):
    /// - `CODEPAD_API_BASE_URL`: lint service and role lookup
    /// - `CODEPAD_AUTOCOMPLETE_BASE_URL`
    /// - `CODEPAD_SANDBOX_BASE_URL`
    /// - `CODEPAD_SANDBOX_API_KEY`
    ///
    /// Optional:
    /// - `CODEPAD_SANDBOX_KEY_HEADER`: default `X-RapidAPI-Key`
    /// - `CODEPAD_SANDBOX_HOST`: sent as `X-RapidAPI-Host` when set
    /// - `CODEPAD_HTTP_TIMEOUT_SECS`: default 30
    /// - `CODEPAD_HTTP_CONNECT_TIMEOUT_SECS`: default 10
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if a timeout is not a positive integer.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build config from an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if a timeout is not a positive integer.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let timeouts = HttpTimeouts {
            request_secs: parse_secs(&lookup, ENV_HTTP_TIMEOUT_SECS, DEFAULT_HTTP_TIMEOUT_SECS)?,
            connect_secs: parse_secs(&lookup, ENV_HTTP_CONNECT_TIMEOUT_SECS, DEFAULT_HTTP_CONNECT_TIMEOUT_SECS)?,
        };
        Ok(Self {
            api_base_url: non_empty(lookup(ENV_API_BASE_URL)).map(trim_base_url),
            autocomplete_base_url: non_empty(lookup(ENV_AUTOCOMPLETE_BASE_URL)).map(trim_base_url),
            sandbox_base_url: non_empty(lookup(ENV_SANDBOX_BASE_URL)).map(trim_base_url),
            sandbox_api_key: non_empty(lookup(ENV_SANDBOX_API_KEY)),
            sandbox_key_header: non_empty(lookup(ENV_SANDBOX_KEY_HEADER))
                .unwrap_or_else(|| DEFAULT_SANDBOX_KEY_HEADER.to_owned()),
            sandbox_host: non_empty(lookup(ENV_SANDBOX_HOST)),
            timeouts,
        })
    }

    /// Check every required value, reporting the first one missing.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Missing`] naming the absent key.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.endpoints()?;
        self.sandbox_credential()?;
        Ok(())
    }

    /// Full URL of the role lookup endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Missing`] if the API base URL is absent.
    pub fn role_endpoint(&self) -> Result<String, ConfigError> {
        let api = required(self.api_base_url.as_deref(), ENV_API_BASE_URL)?;
        Ok(format!("{api}/api/users/me"))
    }

    /// Resolve every backend URL.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Missing`] for the first absent base URL.
    pub fn endpoints(&self) -> Result<ServiceEndpoints, ConfigError> {
        let api = required(self.api_base_url.as_deref(), ENV_API_BASE_URL)?;
        let autocomplete = required(self.autocomplete_base_url.as_deref(), ENV_AUTOCOMPLETE_BASE_URL)?;
        let sandbox = required(self.sandbox_base_url.as_deref(), ENV_SANDBOX_BASE_URL)?;
        Ok(ServiceEndpoints {
            lint: format!("{api}/api/lint"),
            autocomplete: format!("{autocomplete}/autocomplete"),
            sandbox_submissions: format!("{sandbox}/submissions?base64_encoded=false&wait=true"),
            role_lookup: self.role_endpoint()?,
        })
    }

    /// The static credential for the execution sandbox.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Missing`] if the sandbox API key is absent.
    pub fn sandbox_credential(&self) -> Result<SandboxCredential, ConfigError> {
        let key = required(self.sandbox_api_key.as_deref(), ENV_SANDBOX_API_KEY)?;
        Ok(SandboxCredential {
            header: self.sandbox_key_header.clone(),
            key: key.to_owned(),
            host: self.sandbox_host.clone(),
        })
    }
}

/// Fully-qualified URLs for each backend operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceEndpoints {
    pub lint: String,
    pub autocomplete: String,
    pub sandbox_submissions: String,
    pub role_lookup: String,
}

/// Static API key for the execution sandbox.
#[derive(Clone, PartialEq, Eq)]
pub struct SandboxCredential {
    pub header: String,
    pub key: String,
    pub host: Option<String>,
}

impl fmt::Debug for SandboxCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SandboxCredential")
            .field("header", &self.header)
            .field("key", &"..")
            .field("host", &self.host)
            .finish()
    }
}

fn required<'a>(value: Option<&'a str>, key: &'static str) -> Result<&'a str, ConfigError> {
    value.ok_or(ConfigError::Missing { key })
}

fn non_empty(raw: Option<String>) -> Option<String> {
    raw.map(|v| v.trim().to_owned()).filter(|v| !v.is_empty())
}

fn trim_base_url(raw: String) -> String {
    raw.trim_end_matches('/').to_owned()
}

fn parse_secs<F>(lookup: &F, key: &'static str, default: u64) -> Result<u64, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let Some(raw) = non_empty(lookup(key)) else {
        return Ok(default);
    };
    match raw.parse::<u64>() {
        Ok(0) => Err(ConfigError::Invalid { key, reason: "must be greater than zero".to_owned() }),
        Ok(secs) => Ok(secs),
        Err(e) => Err(ConfigError::Invalid { key, reason: e.to_string() }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
