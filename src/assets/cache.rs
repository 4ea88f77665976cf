use std::{collections::HashMap, rc::Rc};

use crate::{texture::base::BaseTexture, texture::cache::TextureCache};

/// Raw skeleton descriptions keyed by the URL they were loaded from.
///
/// The data is kept as parsed JSON; interpreting it is up to the animation runtime.
#[derive(Clone, Debug, Default)]
pub struct AnimationCache {
    by_url: HashMap<String, serde_json::Value>,
}

impl AnimationCache {
    /// Empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store skeleton data for `url`.
    pub fn insert(&mut self, url: impl Into<String>, data: serde_json::Value) {
        self.by_url.insert(url.into(), data);
    }

    /// Skeleton data loaded from `url`.
    pub fn get(&self, url: &str) -> Option<&serde_json::Value> {
        self.by_url.get(url)
    }

    /// True when `url` is present.
    pub fn contains(&self, url: &str) -> bool {
        self.by_url.contains_key(url)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.by_url.len()
    }

    /// True when empty.
    pub fn is_empty(&self) -> bool {
        self.by_url.is_empty()
    }
}

/// Every cache the loader writes into, passed explicitly to [`crate::AssetLoader`] calls.
#[derive(Debug, Default)]
pub struct AssetCaches {
    /// Named texture regions (sheet frames, atlas regions).
    pub textures: TextureCache,
    /// Skeleton descriptions.
    pub animations: AnimationCache,
    base_textures: HashMap<String, Rc<BaseTexture>>,
}

impl AssetCaches {
    /// Empty caches.
    pub fn new() -> Self {
        Self::default()
    }

    /// Base texture loaded (or loading) from the normalized `path`.
    pub fn base_texture(&self, path: &str) -> Option<&Rc<BaseTexture>> {
        self.base_textures.get(path)
    }

    /// Number of base textures known, settled or not.
    pub fn base_texture_count(&self) -> usize {
        self.base_textures.len()
    }

    /// Existing base texture for `path`, or a new pending one registered under it.
    ///
    /// The flag is `true` when the texture was created by this call.
    pub(crate) fn base_texture_or_pending(&mut self, path: &str) -> (Rc<BaseTexture>, bool) {
        if let Some(existing) = self.base_textures.get(path) {
            return (existing.clone(), false);
        }
        let base = BaseTexture::pending(path);
        self.base_textures.insert(path.to_string(), base.clone());
        (base, true)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/cache.rs"]
mod tests;
