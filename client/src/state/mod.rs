//! Client-side reactive state.

pub mod auth;
