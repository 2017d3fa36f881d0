//! Surface materials and the textures they reference.
//!
//! Materials are inert configuration: the renderer reads them, nothing in the
//! frame loop mutates them except the parameter panel.
//!
//! # Invariants
//! - Textures are opaque bytes. A material may reference a texture that is
//!   still pending or failed to load; consumers must fall back to the base color.
//! - Texture ids are a sha2 digest of the source path, so requesting the
//!   same file twice yields one slot.

mod material;
mod texture;

pub use material::{Material, MaterialHandle, MaterialKind, MaterialLibrary, MaterialMaps, Side};
pub use texture::{ColorSpace, Filter, LoadState, TextureCache, TextureError, TextureId, TextureSlot};

pub fn crate_info() -> &'static str {
    "showcase-materials v0.1.0"
}
