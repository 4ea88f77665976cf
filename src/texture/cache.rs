use std::collections::HashMap;

use crate::{
    foundation::error::{RopelineError, RopelineResult},
    texture::region::Texture,
};

/// Named texture regions, usually one per sprite-sheet frame.
#[derive(Clone, Debug, Default)]
pub struct TextureCache {
    by_name: HashMap<String, Texture>,
}

impl TextureCache {
    /// Empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `texture` under `name`, returning the texture it replaced.
    pub fn insert(&mut self, name: impl Into<String>, texture: Texture) -> Option<Texture> {
        let name = name.into();
        let prev = self.by_name.insert(name.clone(), texture);
        if prev.is_some() {
            tracing::debug!(%name, "texture cache entry replaced");
        }
        prev
    }

    /// Texture stored under `name`.
    pub fn get(&self, name: &str) -> Option<&Texture> {
        self.by_name.get(name)
    }

    /// Texture stored under `name`, or an error naming the missing key.
    pub fn require(&self, name: &str) -> RopelineResult<&Texture> {
        self.get(name)
            .ok_or_else(|| RopelineError::validation(format!("unknown texture '{name}'")))
    }

    /// Remove and return the texture stored under `name`.
    pub fn remove(&mut self, name: &str) -> Option<Texture> {
        self.by_name.remove(name)
    }

    /// True when `name` is present.
    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    /// True when empty.
    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }

    /// Entry names in lexicographic order.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.by_name.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

#[cfg(test)]
#[path = "../../tests/unit/texture/cache.rs"]
mod tests;
