//! Developer Tools: material parameter panel and scene inspector.
//!
//! # Invariants
//! - The inspector is read-only.
//! - The panel only writes material parameters, always clamped to the
//!   slider's range.

pub mod inspector;
pub mod panel;

pub use inspector::{ObjectInfo, SceneInspector, SceneSummary};
pub use panel::{PanelError, ParamBinding, ParameterPanel, Slider};

pub fn crate_info() -> &'static str {
    "showcase-tools v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_loads() {
        assert!(crate_info().contains("tools"));
    }
}
