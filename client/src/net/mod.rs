//! Networking modules for the browser.
//!
//! SYSTEM CONTEXT
//! ==============
//! `transport` carries `codepad` requests over `fetch`, and `session` wires the
//! identity session and post-login sync into Leptos signals.

#[cfg(feature = "hydrate")]
pub mod session;
pub mod transport;
