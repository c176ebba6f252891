//! HTTP transport seam shared by the role resolver and the gateway.
//!
//! DESIGN
//! ======
//! Requests are described as plain data ([`ApiRequest`]) so the header and body
//! contract of each backend can be asserted without a network. [`Transport`]
//! performs the exchange; `ReqwestTransport` is the native implementation and
//! the browser client supplies its own over `gloo-net`.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::TransportError;
use crate::identity::Token;

pub const AUTHORIZATION: &str = "Authorization";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

impl Method {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
        }
    }
}

/// One outgoing HTTP request.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<Value>,
}

impl ApiRequest {
    #[must_use]
    pub fn get(url: impl Into<String>) -> Self {
        Self { method: Method::Get, url: url.into(), headers: Vec::new(), body: None }
    }

    #[must_use]
    pub fn post_json(url: impl Into<String>, body: Value) -> Self {
        Self { method: Method::Post, url: url.into(), headers: Vec::new(), body: Some(body) }
    }

    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    #[must_use]
    pub fn bearer(self, token: &Token) -> Self {
        self.header(AUTHORIZATION, token.bearer())
    }

    /// First value of `name`, compared case-insensitively.
    #[must_use]
    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Token carried in the `Authorization: Bearer` header, if any.
    #[must_use]
    pub fn bearer_token(&self) -> Option<&str> {
        self.header_value(AUTHORIZATION)?.strip_prefix("Bearer ")
    }
}

/// Status and raw body of a completed exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: String,
}

impl ApiResponse {
    #[must_use]
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self { status, body: body.into() }
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Reject non-2xx responses, then decode the body.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Status`] for non-success statuses and
    /// [`TransportError::Decode`] if the body is not valid JSON for `T`.
    pub fn into_json<T: DeserializeOwned>(self) -> Result<T, TransportError> {
        if !self.is_success() {
            return Err(TransportError::Status { status: self.status, body: self.body });
        }
        serde_json::from_str(&self.body).map_err(|e| TransportError::Decode(e.to_string()))
    }
}

/// Performs a single HTTP exchange. Enables mocking in tests.
#[async_trait(?Send)]
pub trait Transport {
    /// Send `request` and return the response regardless of status.
    ///
    /// # Errors
    ///
    /// Returns a [`TransportError`] if the request could not be completed.
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, TransportError>;
}

#[cfg(feature = "reqwest")]
pub use native::ReqwestTransport;

#[cfg(feature = "reqwest")]
mod native {
    use std::time::Duration;

    use async_trait::async_trait;

    use super::{ApiRequest, ApiResponse, Method, Transport};
    use crate::config::HttpTimeouts;
    use crate::error::TransportError;

    /// [`Transport`] backed by a shared `reqwest::Client`.
    pub struct ReqwestTransport {
        http: reqwest::Client,
    }

    impl ReqwestTransport {
        /// # Errors
        ///
        /// Returns [`TransportError::ClientBuild`] if the client cannot be built.
        pub fn new(timeouts: HttpTimeouts) -> Result<Self, TransportError> {
            let http = reqwest::Client::builder()
                .timeout(Duration::from_secs(timeouts.request_secs))
                .connect_timeout(Duration::from_secs(timeouts.connect_secs))
                .build()
                .map_err(|e| TransportError::ClientBuild(e.to_string()))?;
            Ok(Self { http })
        }
    }

    fn map_error(e: reqwest::Error) -> TransportError {
        if e.is_timeout() {
            TransportError::Timeout
        } else {
            TransportError::Request(e.to_string())
        }
    }

    #[async_trait(?Send)]
    impl Transport for ReqwestTransport {
        async fn send(&self, request: ApiRequest) -> Result<ApiResponse, TransportError> {
            let mut builder = match request.method {
                Method::Get => self.http.get(&request.url),
                Method::Post => self.http.post(&request.url),
            };
            for (name, value) in &request.headers {
                builder = builder.header(name.as_str(), value.as_str());
            }
            if let Some(body) = &request.body {
                builder = builder.json(body);
            }

            let response = builder.send().await.map_err(map_error)?;
            let status = response.status().as_u16();
            let body = response.text().await.map_err(map_error)?;
            Ok(ApiResponse { status, body })
        }
    }
}

#[cfg(test)]
#[path = "http_test.rs"]
mod tests;
