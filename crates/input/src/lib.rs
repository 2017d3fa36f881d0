//! Camera controls driven by pointer input.
//!
//! # Invariants
//! - Hosts translate raw device events into [`ControlAction`]s; controls never
//!   see window-system types.
//! - Controls only move the camera inside `update`, which the frame loop calls
//!   once per frame.

pub mod action;
pub mod orbit;

pub use action::ControlAction;
pub use orbit::OrbitControls;

pub fn crate_info() -> &'static str {
    "showcase-input v0.1.0"
}
