use std::{collections::BTreeMap, rc::Rc};

use crate::{
    foundation::core::Rect,
    foundation::error::{RopelineError, RopelineResult},
    texture::base::BaseTexture,
    texture::region::Texture,
};

/// Pixel rect as written by sprite-sheet packers.
#[derive(Clone, Copy, Debug, PartialEq, serde::Deserialize)]
pub struct SheetRect {
    /// Left edge.
    pub x: f64,
    /// Top edge.
    pub y: f64,
    /// Width.
    pub w: f64,
    /// Height.
    pub h: f64,
}

impl SheetRect {
    fn to_rect(self) -> Rect {
        Rect::from_origin_size((self.x, self.y), (self.w, self.h))
    }
}

/// Pixel size as written by sprite-sheet packers.
#[derive(Clone, Copy, Debug, PartialEq, serde::Deserialize)]
pub struct SheetSize {
    /// Width.
    pub w: f64,
    /// Height.
    pub h: f64,
}

/// One frame descriptor.
#[derive(Clone, Debug, PartialEq, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SheetFrame {
    /// Packed rect inside the sheet image; entries without one are skipped.
    #[serde(default)]
    pub frame: Option<SheetRect>,
    /// Packed rotated by 90 degrees (not supported; sampled unrotated).
    #[serde(default)]
    pub rotated: bool,
    /// Transparent edges were stripped at packing time.
    #[serde(default)]
    pub trimmed: bool,
    /// Position and size of the kept pixels inside the untrimmed sprite.
    #[serde(default)]
    pub sprite_source_size: Option<SheetRect>,
    /// Untrimmed sprite size.
    #[serde(default)]
    pub source_size: Option<SheetSize>,
}

#[derive(Clone, Debug, serde::Deserialize)]
struct NamedFrame {
    filename: String,
    #[serde(flatten)]
    frame: SheetFrame,
}

#[derive(Clone, Debug, serde::Deserialize)]
#[serde(untagged)]
enum SheetFrames {
    Hash(BTreeMap<String, SheetFrame>),
    Array(Vec<NamedFrame>),
}

/// Sheet-level metadata.
#[derive(Clone, Debug, Default, PartialEq, serde::Deserialize)]
pub struct SheetMeta {
    /// Image path relative to the sheet JSON.
    #[serde(default)]
    pub image: Option<String>,
    /// Image size declared by the packer.
    #[serde(default)]
    pub size: Option<SheetSize>,
}

#[derive(Clone, Debug, serde::Deserialize)]
struct SheetDoc {
    frames: SheetFrames,
    #[serde(default)]
    meta: SheetMeta,
}

/// Sprite-sheet description in TexturePacker JSON form (hash or array of frames).
#[derive(Clone, Debug, PartialEq)]
pub struct SpriteSheet {
    /// Frames in name order.
    pub frames: BTreeMap<String, SheetFrame>,
    /// Sheet metadata.
    pub meta: SheetMeta,
}

impl SpriteSheet {
    /// Parse sheet JSON bytes.
    pub fn parse(bytes: &[u8]) -> RopelineResult<Self> {
        let doc: SheetDoc = serde_json::from_slice(bytes)?;
        Ok(Self::from_doc(doc))
    }

    /// Interpret an already parsed JSON document.
    pub fn from_value(value: serde_json::Value) -> RopelineResult<Self> {
        let doc: SheetDoc = serde_json::from_value(value)?;
        Ok(Self::from_doc(doc))
    }

    fn from_doc(doc: SheetDoc) -> Self {
        let frames = match doc.frames {
            SheetFrames::Hash(map) => map,
            SheetFrames::Array(list) => list.into_iter().map(|f| (f.filename, f.frame)).collect(),
        };
        Self {
            frames,
            meta: doc.meta,
        }
    }

    /// Build one texture per frame over `base`, in name order.
    ///
    /// A trimmed frame gets the trim rect `(spriteSourceSize.x, spriteSourceSize.y,
    /// sourceSize.w, sourceSize.h)`.
    pub fn build_textures(&self, base: &Rc<BaseTexture>) -> RopelineResult<Vec<(String, Texture)>> {
        let mut out = Vec::with_capacity(self.frames.len());
        for (name, data) in &self.frames {
            let Some(rect) = data.frame else {
                tracing::debug!(%name, "sheet entry without frame rect skipped");
                continue;
            };
            if data.rotated {
                tracing::warn!(%name, "rotated sheet frames are sampled unrotated");
            }

            let trim = if data.trimmed {
                let (Some(kept), Some(source)) = (data.sprite_source_size, data.source_size)
                else {
                    return Err(RopelineError::validation(format!(
                        "trimmed frame '{name}' needs spriteSourceSize and sourceSize"
                    )));
                };
                Some(Rect::from_origin_size((kept.x, kept.y), (source.w, source.h)))
            } else {
                None
            };

            let texture =
                Texture::new(base.clone(), rect.to_rect(), None, trim).map_err(|e| match e {
                    RopelineError::Validation(msg) => {
                        RopelineError::validation(format!("frame '{name}': {msg}"))
                    }
                    other => other,
                })?;
            out.push((name.clone(), texture));
        }
        Ok(out)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/sheet.rs"]
mod tests;
