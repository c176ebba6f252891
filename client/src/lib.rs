//! Browser binding for the Codepad core.
//!
//! SYSTEM CONTEXT
//! ==============
//! The `codepad` crate owns session and gateway logic. This crate plugs it
//! into Leptos: snapshots become `RwSignal<AuthState>` updates, route guards
//! read that state, and HTTP goes through `gloo-net` in the browser.

pub mod net;
pub mod state;
pub mod util;

/// Install the panic hook and route `log`/`tracing` output to the console.
#[cfg(feature = "hydrate")]
#[wasm_bindgen::prelude::wasm_bindgen]
pub fn init_logging() {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Debug);
}
