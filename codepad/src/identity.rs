//! Identity, role, and credential types shared by every component.
//!
//! DESIGN
//! ======
//! `Identity` is owned by the external auth provider and treated as opaque
//! data. `AuthenticatedUser` pairs it with a `Role` that is always present:
//! callers never see a signed-in user without a role.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A signed-in identity as issued by the auth provider.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Provider-assigned unique user id.
    pub uid: String,
    /// Primary email, if the provider exposes one.
    pub email: Option<String>,
    /// Sign-in method that produced this identity (e.g. `"password"`, `"google.com"`).
    pub provider_id: String,
    /// Display name, if available.
    #[serde(default)]
    pub display_name: Option<String>,
    /// Avatar image URL, if available.
    #[serde(default)]
    pub photo_url: Option<String>,
}

impl Identity {
    /// Build an identity with only the fields every provider supplies.
    #[must_use]
    pub fn new(uid: impl Into<String>, email: Option<String>, provider_id: impl Into<String>) -> Self {
        Self { uid: uid.into(), email, provider_id: provider_id.into(), display_name: None, photo_url: None }
    }
}

/// Coarse authorization level attached to a signed-in user.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Admin,
    Manager,
    Developer,
    #[default]
    Guest,
}

impl Role {
    pub const ALL: [Role; 4] = [Role::Admin, Role::Manager, Role::Developer, Role::Guest];

    /// Upper-case wire name (`"ADMIN"`, ...).
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "ADMIN",
            Self::Manager => "MANAGER",
            Self::Developer => "DEVELOPER",
            Self::Guest => "GUEST",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a backend role string is not one of the four known roles.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown role: {0}")]
pub struct UnknownRole(pub String);

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let trimmed = raw.trim();
        Self::ALL
            .into_iter()
            .find(|role| role.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| UnknownRole(trimmed.to_owned()))
    }
}

/// An identity together with its resolved role.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthenticatedUser {
    #[serde(flatten)]
    pub identity: Identity,
    pub role: Role,
}

impl AuthenticatedUser {
    #[must_use]
    pub fn new(identity: Identity, role: Role) -> Self {
        Self { identity, role }
    }

    #[must_use]
    pub fn uid(&self) -> &str {
        &self.identity.uid
    }
}

/// Short-lived bearer credential for the current session.
///
/// Fetched from the provider for each outgoing request and dropped afterwards.
/// `Debug` never prints the secret.
#[derive(Clone, PartialEq, Eq)]
pub struct Token(String);

impl Token {
    #[must_use]
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// `Authorization` header value for this token.
    #[must_use]
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.0)
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Token(..)")
    }
}

#[cfg(test)]
#[path = "identity_test.rs"]
mod tests;
