//! # codepad
//!
//! Client-side core for the Codepad editor: tracks the signed-in identity,
//! augments it with a backend-resolved role, and routes lint / run /
//! autocomplete requests to their three backends.
//!
//! ARCHITECTURE
//! ============
//! Two seams isolate the outside world. [`auth::AuthProvider`] stands in for
//! the hosted identity provider and [`http::Transport`] performs one HTTP
//! exchange. Everything above them (`role`, `session`, `sync`, `gateway`) is
//! plain async code that runs on a single-threaded executor, which is why the
//! shared handles are `Rc` and the async traits are `?Send`.

pub mod auth;
pub mod config;
pub mod error;
pub mod gateway;
pub mod http;
pub mod identity;
pub mod role;
pub mod session;
pub mod sync;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use auth::{AuthEvent, AuthProvider, ListenerHandle, LocalAuthProvider};
pub use config::ServiceConfig;
pub use error::{AuthError, ConfigError, GatewayError, TransportError};
pub use gateway::CodeServiceGateway;
pub use http::Transport;
pub use identity::{AuthenticatedUser, Identity, Role, Token};
pub use role::RoleResolver;
pub use session::{IdentitySession, SessionSnapshot, Subscription};
pub use sync::{SessionSynchronizer, SyncEffects, SyncOutcome};
