//! Code-service gateway: lint, sandboxed run, and autocomplete.
//!
//! DESIGN
//! ======
//! Three backends, three contracts:
//! - lint and autocomplete take the user's bearer token and `{code, language}`;
//! - run goes to a third-party sandbox with a static API key and
//!   `{source_code, language_id}`, and never carries the user's token.
//!
//! Request builders are pure functions so each contract can be checked
//! without a network. Responses are passed through as untouched JSON.
//!
//! ERROR HANDLING
//! ==============
//! A missing session fails before any request is built. Transport failures
//! are returned to the caller as-is; nothing is retried.

use std::rc::Rc;

use serde::Serialize;
use serde_json::Value;

use crate::auth::{self, AuthProvider};
use crate::config::{SANDBOX_HOST_HEADER, SandboxCredential, ServiceConfig, ServiceEndpoints};
use crate::error::{ConfigError, GatewayError};
use crate::http::{ApiRequest, Transport};
use crate::identity::Token;

/// Diagnostics JSON from the lint service.
pub type LintResult = Value;
/// Submission JSON from the execution sandbox (`stdout`, `stderr`, `status`, ...).
pub type ExecutionResult = Value;
/// Completion JSON from the autocomplete service.
pub type AutocompleteResult = Value;

/// Request body shared by lint and autocomplete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CodeOperationRequest<'a> {
    pub code: &'a str,
    pub language: &'a str,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
struct SubmissionRequest<'a> {
    source_code: &'a str,
    language_id: u32,
}

// =============================================================================
// REQUEST BUILDERS
// =============================================================================

fn session_request(url: &str, token: &Token, code: &str, language: &str) -> ApiRequest {
    let body = serde_json::json!(CodeOperationRequest { code, language });
    ApiRequest::post_json(url, body).bearer(token)
}

fn submission_request(url: &str, credential: &SandboxCredential, code: &str, language_id: u32) -> ApiRequest {
    let body = serde_json::json!(SubmissionRequest { source_code: code, language_id });
    let request = ApiRequest::post_json(url, body).header(credential.header.as_str(), credential.key.as_str());
    match &credential.host {
        Some(host) => request.header(SANDBOX_HOST_HEADER, host.as_str()),
        None => request,
    }
}

// =============================================================================
// GATEWAY
// =============================================================================

/// Routes code operations to their backends. Holds no mutable state.
pub struct CodeServiceGateway<P, T> {
    provider: Rc<P>,
    transport: Rc<T>,
    endpoints: ServiceEndpoints,
    sandbox: SandboxCredential,
}

impl<P, T> CodeServiceGateway<P, T>
where
    P: AuthProvider,
    T: Transport,
{
    /// Build the gateway, validating every required configuration value.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Missing`] for the first absent base URL or the
    /// sandbox API key.
    pub fn new(config: &ServiceConfig, provider: Rc<P>, transport: Rc<T>) -> Result<Self, ConfigError> {
        let endpoints = config.endpoints()?;
        let sandbox = config.sandbox_credential()?;
        Ok(Self { provider, transport, endpoints, sandbox })
    }

    #[must_use]
    pub fn endpoints(&self) -> &ServiceEndpoints {
        &self.endpoints
    }

    /// Lint `code` with the session's bearer token.
    ///
    /// # Errors
    ///
    /// [`GatewayError::Authentication`] before any request when no token is
    /// available; [`GatewayError::Transport`] if the call fails.
    pub async fn lint(&self, code: &str, language: &str) -> Result<LintResult, GatewayError> {
        self.post_with_session("lint", &self.endpoints.lint, code, language).await
    }

    /// Request a completion for `code` with the session's bearer token.
    ///
    /// # Errors
    ///
    /// Same as [`Self::lint`].
    pub async fn autocomplete(&self, code: &str, language: &str) -> Result<AutocompleteResult, GatewayError> {
        self.post_with_session("autocomplete", &self.endpoints.autocomplete, code, language)
            .await
    }

    /// Submit `code` to the execution sandbox and wait for the result.
    /// `language_id` is the sandbox's own numeric id and is not checked here.
    ///
    /// # Errors
    ///
    /// [`GatewayError::Transport`] if the call fails.
    pub async fn run(&self, code: &str, language_id: u32) -> Result<ExecutionResult, GatewayError> {
        let request = submission_request(&self.endpoints.sandbox_submissions, &self.sandbox, code, language_id);
        tracing::debug!(language_id, bytes = code.len(), "submitting code to sandbox");
        let response = self.transport.send(request).await.inspect_err(|e| {
            tracing::warn!(operation = "run", error = %e, "sandbox request failed");
        })?;
        Ok(response.into_json()?)
    }

    async fn post_with_session(
        &self,
        operation: &'static str,
        url: &str,
        code: &str,
        language: &str,
    ) -> Result<Value, GatewayError> {
        let token = auth::current_token(self.provider.as_ref()).await.inspect_err(|e| {
            tracing::debug!(operation, error = %e, "rejecting unauthenticated request");
        })?;
        let request = session_request(url, &token, code, language);
        tracing::debug!(operation, language, bytes = code.len(), "sending code request");
        let response = self.transport.send(request).await.inspect_err(|e| {
            tracing::warn!(operation, error = %e, "code service request failed");
        })?;
        Ok(response.into_json()?)
    }
}

#[cfg(test)]
#[path = "gateway_test.rs"]
mod tests;
