use std::{
    collections::HashMap,
    path::{Path, PathBuf},
};

use anyhow::Context;

use crate::foundation::error::{RopelineError, RopelineResult};

/// Byte fetcher behind [`crate::AssetLoader`].
///
/// Paths are normalized relative paths (see [`normalize_rel_path`]).
pub trait AssetSource {
    /// Fetch the full contents of `path`.
    fn fetch(&self, path: &str) -> RopelineResult<Vec<u8>>;
}

/// Reads assets from a directory.
#[derive(Clone, Debug)]
pub struct FsSource {
    root: PathBuf,
}

impl FsSource {
    /// Source rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Root directory used to resolve relative paths.
    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl AssetSource for FsSource {
    fn fetch(&self, path: &str) -> RopelineResult<Vec<u8>> {
        let norm = normalize_rel_path(path)?;
        let full = self.root.join(Path::new(&norm));
        std::fs::read(&full)
            .with_context(|| format!("read asset bytes from '{}'", full.display()))
            .map_err(RopelineError::from)
    }
}

/// In-memory source keyed by normalized path.
#[derive(Clone, Debug, Default)]
pub struct MemorySource {
    files: HashMap<String, Vec<u8>>,
}

impl MemorySource {
    /// Empty source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `bytes` under `path`.
    pub fn insert(&mut self, path: &str, bytes: impl Into<Vec<u8>>) -> RopelineResult<()> {
        self.files.insert(normalize_rel_path(path)?, bytes.into());
        Ok(())
    }

    /// Builder-style [`MemorySource::insert`].
    pub fn with(mut self, path: &str, bytes: impl Into<Vec<u8>>) -> RopelineResult<Self> {
        self.insert(path, bytes)?;
        Ok(self)
    }
}

impl AssetSource for MemorySource {
    fn fetch(&self, path: &str) -> RopelineResult<Vec<u8>> {
        let norm = normalize_rel_path(path)?;
        self.files
            .get(&norm)
            .cloned()
            .ok_or_else(|| RopelineError::asset(format!("no asset at '{norm}'")))
    }
}

/// Normalize and validate a relative asset path.
///
/// The result uses `/` separators, drops `.` segments and rejects absolute paths or parent
/// traversals (`..`).
pub fn normalize_rel_path(source: &str) -> RopelineResult<String> {
    let s = source.replace('\\', "/");
    if s.starts_with('/') {
        return Err(RopelineError::validation("asset paths must be relative"));
    }

    let mut out = Vec::<&str>::new();
    for part in s.split('/') {
        if part.is_empty() || part == "." {
            continue;
        }
        if part == ".." {
            return Err(RopelineError::validation(
                "asset paths must not contain '..'",
            ));
        }
        out.push(part);
    }

    if out.is_empty() {
        return Err(RopelineError::validation(
            "asset path must contain a file name",
        ));
    }
    Ok(out.join("/"))
}

/// Resolve `rel` against the directory containing `url`.
pub(crate) fn sibling_path(url: &str, rel: &str) -> RopelineResult<String> {
    let url = normalize_rel_path(url)?;
    match url.rfind('/') {
        Some(slash) => normalize_rel_path(&format!("{}/{rel}", &url[..slash])),
        None => normalize_rel_path(rel),
    }
}

/// Replace the extension of the file name in `url` (or append one).
pub(crate) fn with_extension(url: &str, ext: &str) -> RopelineResult<String> {
    let url = normalize_rel_path(url)?;
    let name_start = url.rfind('/').map_or(0, |i| i + 1);
    let stem = match url[name_start..].rfind('.') {
        Some(dot) if dot > 0 => &url[..name_start + dot],
        _ => url.as_str(),
    };
    Ok(format!("{stem}.{ext}"))
}

#[cfg(test)]
#[path = "../../tests/unit/assets/source.rs"]
mod tests;
