//! `fetch`-backed [`Transport`] for the browser.
//!
//! Client-side (hydrate): real HTTP calls via `gloo-net`.
//! Server-side: a stub that fails every request, since the code services are
//! only reachable from the browser.
//!
//! ERROR HANDLING
//! ==============
//! `gloo-net` errors are flattened to strings. Non-2xx statuses are returned as
//! ordinary responses; `ApiResponse::into_json` classifies them.

#![allow(clippy::unused_async)]

#[cfg(test)]
#[path = "transport_test.rs"]
mod transport_test;

use async_trait::async_trait;
use codepad::TransportError;
use codepad::http::{ApiRequest, ApiResponse, Transport};

#[cfg(not(feature = "hydrate"))]
const UNAVAILABLE: &str = "http transport not available on server";

/// Sends requests with the browser's `fetch`. Timeouts are left to the browser.
#[derive(Clone, Copy, Debug, Default)]
pub struct GlooTransport;

#[cfg(feature = "hydrate")]
fn request_error(err: impl std::fmt::Display) -> TransportError {
    TransportError::Request(err.to_string())
}

#[async_trait(?Send)]
impl Transport for GlooTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, TransportError> {
        #[cfg(feature = "hydrate")]
        {
            use codepad::http::Method;
            use gloo_net::http::Request;

            let mut builder = match request.method {
                Method::Get => Request::get(&request.url),
                Method::Post => Request::post(&request.url),
            };
            for (name, value) in &request.headers {
                builder = builder.header(name, value);
            }
            let outgoing = match &request.body {
                Some(body) => builder.json(body),
                None => builder.build(),
            }
            .map_err(request_error)?;

            let response = outgoing.send().await.map_err(request_error)?;
            let status = response.status();
            let body = response
                .text()
                .await
                .map_err(|e| TransportError::Decode(e.to_string()))?;
            log::debug!("{} {} -> {status}", request.method.as_str(), request.url);
            Ok(ApiResponse::new(status, body))
        }
        #[cfg(not(feature = "hydrate"))]
        {
            let _ = request;
            Err(TransportError::Request(UNAVAILABLE.to_owned()))
        }
    }
}
