//! Role lookup against the `/api/users/me` backend.
//!
//! ERROR HANDLING
//! ==============
//! Every failure (transport, status, decode, unknown role, missing token) is
//! logged and mapped to "no role". The GUEST fallback is applied in exactly one
//! place, [`fallback_role`], which both `*_or_default` helpers go through.

use std::rc::Rc;

use serde::Deserialize;

use crate::auth::AuthProvider;
use crate::config::ServiceConfig;
use crate::error::ConfigError;
use crate::http::{ApiRequest, Transport};
use crate::identity::{Identity, Role, Token};

#[derive(Debug, Deserialize)]
struct MeResponse {
    #[serde(default)]
    role: Option<String>,
}

fn parse_role(body: MeResponse) -> Option<Role> {
    let raw = body.role?;
    match raw.parse::<Role>() {
        Ok(role) => Some(role),
        Err(e) => {
            tracing::warn!(error = %e, "role lookup returned an unrecognized role");
            None
        }
    }
}

fn fallback_role(resolved: Option<Role>) -> Role {
    resolved.unwrap_or_else(|| {
        tracing::debug!("role unresolved; defaulting to guest");
        Role::Guest
    })
}

/// Exchanges identity tokens for roles. Holds no cache: every call hits the
/// backend.
pub struct RoleResolver<T> {
    transport: Rc<T>,
    endpoint: String,
}

impl<T: Transport> RoleResolver<T> {
    /// `endpoint` is the full role lookup URL.
    pub fn new(endpoint: impl Into<String>, transport: Rc<T>) -> Self {
        Self { transport, endpoint: endpoint.into() }
    }

    /// # Errors
    ///
    /// Returns [`ConfigError::Missing`] if the API base URL is not configured.
    pub fn from_config(config: &ServiceConfig, transport: Rc<T>) -> Result<Self, ConfigError> {
        Ok(Self::new(config.role_endpoint()?, transport))
    }

    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn lookup_request(&self, token: &Token) -> ApiRequest {
        ApiRequest::get(&self.endpoint).bearer(token)
    }

    /// Look up the role for `token`. `None` on any failure.
    pub async fn resolve(&self, token: &Token) -> Option<Role> {
        let response = match self.transport.send(self.lookup_request(token)).await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(error = %e, "role lookup request failed");
                return None;
            }
        };
        match response.into_json::<MeResponse>() {
            Ok(body) => parse_role(body),
            Err(e) => {
                tracing::warn!(error = %e, "role lookup rejected");
                None
            }
        }
    }

    /// Role for the provider's current session. Returns `None` without a
    /// network call when nobody is signed in.
    pub async fn resolve_for_current_session<P: AuthProvider + ?Sized>(&self, provider: &P) -> Option<Role> {
        let identity = provider.current_identity()?;
        self.resolve_identity(provider, &identity).await
    }

    /// Fetch a fresh token for `identity`, then look up its role.
    pub async fn resolve_identity<P: AuthProvider + ?Sized>(&self, provider: &P, identity: &Identity) -> Option<Role> {
        match provider.id_token(identity).await {
            Ok(token) => self.resolve(&token).await,
            Err(e) => {
                tracing::warn!(uid = %identity.uid, error = %e, "token unavailable for role lookup");
                None
            }
        }
    }

    /// Like [`Self::resolve`], falling back to GUEST.
    pub async fn resolve_or_default(&self, token: &Token) -> Role {
        fallback_role(self.resolve(token).await)
    }

    /// Like [`Self::resolve_identity`], falling back to GUEST.
    pub async fn resolve_identity_or_default<P: AuthProvider + ?Sized>(&self, provider: &P, identity: &Identity) -> Role {
        fallback_role(self.resolve_identity(provider, identity).await)
    }
}

#[cfg(test)]
#[path = "role_test.rs"]
mod tests;
