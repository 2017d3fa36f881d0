//! Scene graph: every renderable object is a sibling under one root.
//!
//! # Invariants
//! - Objects are attached for the lifetime of the scene; there is no detach.
//! - Iteration order is deterministic (BTreeMap keyed by ObjectId).
//! - The scene owns materials and textures; objects reference them by handle.

pub mod scene;

pub use scene::{PointLight, Primitive, Scene, SceneError, SceneObject};
