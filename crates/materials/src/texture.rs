use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Texture id keyed by a sha2 digest of the source path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TextureId(pub u64);

/// How texel values are interpreted by the sampler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorSpace {
    /// Color textures (albedo, matcap).
    Srgb,
    /// Data textures (ao, roughness, normals, gradients).
    #[default]
    Linear,
}

/// Minification/magnification filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Filter {
    #[default]
    Linear,
    Nearest,
}

/// Where a texture is in its load lifecycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadState {
    Pending,
    Ready { byte_len: usize, digest: [u8; 32] },
    Failed(String),
}

impl LoadState {
    pub fn label(&self) -> &'static str {
        match self {
            LoadState::Pending => "pending",
            LoadState::Ready { .. } => "ready",
            LoadState::Failed(_) => "failed",
        }
    }
}

/// A requested texture and its sampling parameters.
#[derive(Debug, Clone)]
pub struct TextureSlot {
    pub path: PathBuf,
    pub color_space: ColorSpace,
    pub filter: Filter,
    pub generate_mipmaps: bool,
    pub state: LoadState,
    bytes: Vec<u8>,
}

impl TextureSlot {
    /// Raw file contents once ready. Empty while pending or failed.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }
}

/// Errors from texture operations.
#[derive(Debug, thiserror::Error)]
pub enum TextureError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("texture not found: {0:?}")]
    NotFound(TextureId),
    #[error("texture file is empty: {0}")]
    Empty(PathBuf),
}

/// Path-addressed texture registry.
///
/// `request` registers a pending slot immediately so materials can reference
/// it before any bytes exist. `load_pending` resolves every pending slot;
/// failures are recorded on the slot rather than returned.
#[derive(Debug, Clone, Default)]
pub struct TextureCache {
    slots: BTreeMap<TextureId, TextureSlot>,
}

impl TextureCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a texture by path. Requesting a path twice returns the same id
    /// and keeps the first slot's state.
    pub fn request(&mut self, path: impl AsRef<Path>, color_space: ColorSpace) -> TextureId {
        let path = path.as_ref();
        let id = path_hash(path);
        self.slots.entry(id).or_insert_with(|| {
            tracing::debug!(id = id.0, path = %path.display(), "texture requested");
            TextureSlot {
                path: path.to_path_buf(),
                color_space,
                filter: Filter::Linear,
                generate_mipmaps: true,
                state: LoadState::Pending,
                bytes: Vec::new(),
            }
        });
        id
    }

    /// Switch filtering; nearest filtering also turns mipmaps off.
    pub fn set_filter(&mut self, id: TextureId, filter: Filter) -> Result<(), TextureError> {
        let slot = self.slots.get_mut(&id).ok_or(TextureError::NotFound(id))?;
        slot.filter = filter;
        slot.generate_mipmaps = filter == Filter::Linear;
        Ok(())
    }

    /// Read every pending texture relative to `root`. Returns how many became ready.
    pub fn load_pending(&mut self, root: impl AsRef<Path>) -> usize {
        let root = root.as_ref();
        let mut ready = 0;
        for (id, slot) in self.slots.iter_mut() {
            if slot.state != LoadState::Pending {
                continue;
            }
            match read_texture(&root.join(&slot.path)) {
                Ok(bytes) => {
                    let digest: [u8; 32] = Sha256::digest(&bytes).into();
                    slot.state = LoadState::Ready {
                        byte_len: bytes.len(),
                        digest,
                    };
                    slot.bytes = bytes;
                    ready += 1;
                    tracing::debug!(id = id.0, path = %slot.path.display(), "texture ready");
                }
                Err(e) => {
                    tracing::warn!(id = id.0, "texture failed to load: {e}");
                    slot.state = LoadState::Failed(e.to_string());
                }
            }
        }
        ready
    }

    pub fn get(&self, id: TextureId) -> Option<&TextureSlot> {
        self.slots.get(&id)
    }

    pub fn state(&self, id: TextureId) -> Option<&LoadState> {
        self.slots.get(&id).map(|s| &s.state)
    }

    pub fn is_ready(&self, id: TextureId) -> bool {
        matches!(self.state(id), Some(LoadState::Ready { .. }))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&TextureId, &TextureSlot)> {
        self.slots.iter()
    }

    /// Counts of (ready, pending, failed) slots.
    pub fn readiness(&self) -> (usize, usize, usize) {
        self.slots
            .values()
            .fold((0, 0, 0), |(r, p, f), slot| match slot.state {
                LoadState::Ready { .. } => (r + 1, p, f),
                LoadState::Pending => (r, p + 1, f),
                LoadState::Failed(_) => (r, p, f + 1),
            })
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

fn read_texture(path: &Path) -> Result<Vec<u8>, TextureError> {
    let bytes = std::fs::read(path).map_err(|source| TextureError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    if bytes.is_empty() {
        return Err(TextureError::Empty(path.to_path_buf()));
    }
    Ok(bytes)
}

fn path_hash(path: &Path) -> TextureId {
    let mut hasher = Sha256::new();
    hasher.update(path.to_string_lossy().as_bytes());
    let result = hasher.finalize();
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&result[..8]);
    TextureId(u64::from_le_bytes(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn request_is_pending() {
        let mut cache = TextureCache::new();
        let id = cache.request("textures/door/color.jpg", ColorSpace::Srgb);
        assert_eq!(cache.state(id), Some(&LoadState::Pending));
        assert!(!cache.is_ready(id));
        assert_eq!(cache.get(id).unwrap().color_space, ColorSpace::Srgb);
    }

    #[test]
    fn same_path_dedups() {
        let mut cache = TextureCache::new();
        let a = cache.request("textures/matcaps/3.png", ColorSpace::Srgb);
        let b = cache.request("textures/matcaps/3.png", ColorSpace::Linear);
        assert_eq!(a, b);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get(a).unwrap().color_space, ColorSpace::Srgb);
    }

    #[test]
    fn identical_files_keep_separate_ids() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.png"), b"same").unwrap();
        std::fs::write(dir.path().join("b.png"), b"same").unwrap();

        let mut cache = TextureCache::new();
        let a = cache.request("a.png", ColorSpace::Srgb);
        let b = cache.request("b.png", ColorSpace::Srgb);
        assert_eq!(cache.load_pending(dir.path()), 2);
        assert_ne!(a, b);
        assert_eq!(cache.len(), 2);
        // Content digests still agree.
        assert_eq!(cache.state(a), cache.state(b));
    }

    #[test]
    fn load_pending_resolves_existing_and_records_missing() {
        let dir = tempfile::tempdir().unwrap();
        let mut file = std::fs::File::create(dir.path().join("color.jpg")).unwrap();
        file.write_all(b"not really a jpeg").unwrap();

        let mut cache = TextureCache::new();
        let present = cache.request("color.jpg", ColorSpace::Srgb);
        let missing = cache.request("missing.jpg", ColorSpace::Linear);

        assert_eq!(cache.load_pending(dir.path()), 1);
        assert!(cache.is_ready(present));
        assert_eq!(cache.get(present).unwrap().bytes(), b"not really a jpeg");
        assert!(matches!(cache.state(missing), Some(LoadState::Failed(_))));
        assert_eq!(cache.readiness(), (1, 0, 1));
    }

    #[test]
    fn empty_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::File::create(dir.path().join("empty.png")).unwrap();

        let mut cache = TextureCache::new();
        let id = cache.request("empty.png", ColorSpace::Linear);
        assert_eq!(cache.load_pending(dir.path()), 0);
        assert_eq!(cache.state(id).unwrap().label(), "failed");
    }

    #[test]
    fn nearest_filter_disables_mipmaps() {
        let mut cache = TextureCache::new();
        let id = cache.request("textures/gradients/5.jpg", ColorSpace::Linear);
        cache.set_filter(id, Filter::Nearest).unwrap();
        let slot = cache.get(id).unwrap();
        assert_eq!(slot.filter, Filter::Nearest);
        assert!(!slot.generate_mipmaps);

        assert!(matches!(
            cache.set_filter(TextureId(1), Filter::Nearest),
            Err(TextureError::NotFound(_))
        ));
    }
}
