//! Platform abstraction layer
//!
//! Handles browser/native differences for:
//! - Input events (keys and touch regions)
//! - The wasm-bindgen entry point and LocalStorage-backed session

pub mod input;
#[cfg(target_arch = "wasm32")]
pub mod web;

pub use input::{Command, InputState, touch_intent};
