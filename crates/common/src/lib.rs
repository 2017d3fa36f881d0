//! Shared types for the material showcase.

mod color;
mod types;

pub use color::Rgb;
pub use types::{ObjectId, Transform};

pub fn crate_info() -> &'static str {
    "showcase-common v0.1.0"
}
