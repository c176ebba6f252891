//! Utility helpers shared across client UI modules.
//!
//! SYSTEM CONTEXT
//! ==============
//! Utility modules isolate routing decisions from page and component logic so
//! they can be tested without a browser.

pub mod auth;
