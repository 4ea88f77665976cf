use std::{
    cell::RefCell,
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
    rc::Rc,
};

use crate::{
    assets::cache::AssetCaches,
    assets::loader::{AssetLoader, JsonAsset},
    assets::source::{AssetSource, FsSource, normalize_rel_path},
    foundation::core::{Point, Size},
    foundation::error::{RopelineError, RopelineResult},
    geometry::path::PointPath,
    mesh::rope::Rope,
    texture::base::{BaseTexture, BaseTextureStatus},
    texture::region::Texture,
};

/// JSON description of a rope: its control points and where its texture comes from.
///
/// ```json
/// { "points": [[0, 0], [10, 0]], "texture": { "sheet": "ropes.json", "frame": "rope" } }
/// ```
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct RopeConfig {
    /// Control points as `[x, y]` pairs.
    pub points: Vec<[f64; 2]>,
    /// Texture source.
    pub texture: TextureSource,
    /// Whether the per-frame hook refreshes the rope.
    #[serde(default = "default_true")]
    pub auto_update: bool,
}

/// Where a rope texture comes from.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(untagged)]
pub enum TextureSource {
    /// Blank texture of a fixed size; needs no assets.
    Size {
        /// Texture size in pixels.
        size: PixelSize,
    },
    /// Named frame of a sprite sheet.
    SheetFrame {
        /// Sheet JSON path.
        sheet: String,
        /// Frame name inside the sheet.
        frame: String,
    },
    /// Whole image.
    Image {
        /// Image path.
        image: String,
    },
}

/// Width and height in pixels.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PixelSize {
    /// Width.
    pub width: f64,
    /// Height.
    pub height: f64,
}

/// Options for the filesystem asset source.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct LoaderOptions {
    /// Directory relative asset paths resolve against.
    #[serde(default = "default_root")]
    pub root: PathBuf,
}

impl Default for LoaderOptions {
    fn default() -> Self {
        Self {
            root: default_root(),
        }
    }
}

impl LoaderOptions {
    /// Filesystem source rooted at [`LoaderOptions::root`].
    pub fn source(&self) -> FsSource {
        FsSource::new(self.root.clone())
    }
}

fn default_true() -> bool {
    true
}

fn default_root() -> PathBuf {
    PathBuf::from(".")
}

impl RopeConfig {
    /// Parse and validate a rope description from a JSON reader.
    pub fn from_reader<R: std::io::Read>(r: R) -> RopelineResult<Self> {
        let cfg: Self = serde_json::from_reader(r)
            .map_err(|e| RopelineError::validation(format!("parse rope JSON: {e}")))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Parse and validate a rope description from a JSON file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> RopelineResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            RopelineError::validation(format!("open rope JSON '{}': {e}", path.display()))
        })?;
        Self::from_reader(BufReader::new(f))
    }

    /// Check points are finite, sizes positive and asset paths relative.
    pub fn validate(&self) -> RopelineResult<()> {
        if let Some(i) = self
            .points
            .iter()
            .position(|p| !p[0].is_finite() || !p[1].is_finite())
        {
            return Err(RopelineError::validation(format!("points[{i}] must be finite")));
        }
        match &self.texture {
            TextureSource::Size { size } => {
                if !(size.width.is_finite()
                    && size.height.is_finite()
                    && size.width > 0.0
                    && size.height > 0.0)
                {
                    return Err(RopelineError::validation(
                        "texture.size must be finite and > 0",
                    ));
                }
            }
            TextureSource::SheetFrame { sheet, frame } => {
                normalize_rel_path(sheet)?;
                if frame.is_empty() {
                    return Err(RopelineError::validation("texture.frame must not be empty"));
                }
            }
            TextureSource::Image { image } => {
                normalize_rel_path(image)?;
            }
        }
        Ok(())
    }

    /// Control points as a fresh [`PointPath`].
    pub fn path(&self) -> PointPath {
        self.points.iter().map(|p| Point::new(p[0], p[1])).collect()
    }

    /// Load the texture (driving `loader` until idle) and build the rope over [`Self::path`].
    #[tracing::instrument(skip_all)]
    pub fn build<S: AssetSource>(
        &self,
        loader: &mut AssetLoader<S>,
        caches: &mut AssetCaches,
    ) -> RopelineResult<(Rope, PointPath)> {
        let texture = self.resolve_texture(loader, caches)?;
        let path = self.path();
        let mut rope = Rope::new(texture, &path);
        rope.auto_update = self.auto_update;
        Ok((rope, path))
    }

    fn resolve_texture<S: AssetSource>(
        &self,
        loader: &mut AssetLoader<S>,
        caches: &mut AssetCaches,
    ) -> RopelineResult<Texture> {
        match &self.texture {
            TextureSource::Size { size } => {
                let size = Size::new(size.width, size.height);
                let label = format!("size:{}x{}", size.width, size.height);
                let base = BaseTexture::from_size(label, size)?;
                Ok(Texture::from_base(base))
            }
            TextureSource::Image { image } => {
                let base = loader.load_image(image, caches)?;
                loader.run_until_idle(caches);
                match base.status() {
                    BaseTextureStatus::Failed(msg) => Err(RopelineError::asset(msg)),
                    _ => Ok(Texture::from_base(base)),
                }
            }
            TextureSource::SheetFrame { sheet, frame } => {
                let outcome: Rc<RefCell<Option<RopelineResult<JsonAsset>>>> =
                    Rc::new(RefCell::new(None));
                let slot = outcome.clone();
                loader.load_json(sheet, move |res| *slot.borrow_mut() = Some(res))?;
                loader.run_until_idle(caches);

                let res = outcome.borrow_mut().take().ok_or_else(|| {
                    RopelineError::asset(format!("sheet '{sheet}' did not finish loading"))
                })?;
                match res? {
                    JsonAsset::SpriteSheet { .. } => Ok(caches.textures.require(frame)?.clone()),
                    _ => Err(RopelineError::validation(format!(
                        "'{sheet}' is not a sprite sheet"
                    ))),
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "../tests/unit/config.rs"]
mod tests;
