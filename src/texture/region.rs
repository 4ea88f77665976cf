use std::rc::Rc;

use crate::{
    foundation::core::{Rect, Size, Vec2, rect_fits, validate_rect},
    foundation::error::{RopelineError, RopelineResult},
    texture::base::{BaseTexture, BaseTextureId, BaseTextureStatus},
};

/// Normalized texture coordinates of a region's four corners.
///
/// Corner order is top-left, top-right, bottom-right, bottom-left.
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize)]
pub struct TextureUvs {
    /// Top-left u.
    pub x0: f32,
    /// Top-left v.
    pub y0: f32,
    /// Top-right u.
    pub x1: f32,
    /// Top-right v.
    pub y1: f32,
    /// Bottom-right u.
    pub x2: f32,
    /// Bottom-right v.
    pub y2: f32,
    /// Bottom-left u.
    pub x3: f32,
    /// Bottom-left v.
    pub y3: f32,
}

impl TextureUvs {
    fn from_crop(crop: Rect, base: Size) -> Self {
        let x0 = (crop.x0 / base.width) as f32;
        let y0 = (crop.y0 / base.height) as f32;
        let x1 = (crop.x1 / base.width) as f32;
        let y2 = (crop.y1 / base.height) as f32;
        Self {
            x0,
            y0,
            x1,
            y1: y0,
            x2: x1,
            y2,
            x3: x0,
            y3: y2,
        }
    }

    /// Map a strip-space `(u, v)` in `[0, 1]` into this region.
    pub fn map(&self, u: f32, v: f32) -> (f32, f32) {
        (self.x0 + u * (self.x1 - self.x0), self.y0 + v * (self.y2 - self.y0))
    }
}

/// Identity of a texture's UV-relevant state.
///
/// Changes whenever the texture is swapped for another region, or its base image finishes
/// loading.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TextureStamp {
    base: BaseTextureId,
    generation: u64,
    status: u8,
    rects: [Option<[u64; 4]>; 3],
}

/// Rectangular view over a shared [`BaseTexture`].
///
/// `frame` is the region in base pixels (whole image when absent), `crop` the sampled part of
/// it (defaults to the frame) and `trim`, for packed sprite-sheet frames, the untrimmed
/// logical size with the offset of the kept pixels as its origin.
#[derive(Clone, Debug)]
pub struct Texture {
    base: Rc<BaseTexture>,
    frame: Option<Rect>,
    crop: Option<Rect>,
    trim: Option<Rect>,
}

impl Texture {
    /// Region over `base`. The crop must fit inside the base when its size is already known.
    pub fn new(
        base: Rc<BaseTexture>,
        frame: Rect,
        crop: Option<Rect>,
        trim: Option<Rect>,
    ) -> RopelineResult<Self> {
        validate_rect("texture frame", frame)?;
        if let Some(c) = crop {
            validate_rect("texture crop", c)?;
        }
        if let Some(t) = trim {
            validate_rect("texture trim", t)?;
        }

        let out = Self {
            base,
            frame: Some(frame),
            crop,
            trim,
        };
        if let (Some(size), Some(crop)) = (out.base.size(), out.crop()) {
            if !rect_fits(crop, size) {
                return Err(RopelineError::validation(format!(
                    "texture crop {crop:?} does not fit inside base '{}' of size {}x{}",
                    out.base.source(),
                    size.width,
                    size.height
                )));
            }
        }
        Ok(out)
    }

    /// Region covering the whole base image.
    pub fn from_base(base: Rc<BaseTexture>) -> Self {
        Self {
            base,
            frame: None,
            crop: None,
            trim: None,
        }
    }

    /// Shared base image.
    pub fn base(&self) -> &Rc<BaseTexture> {
        &self.base
    }

    /// Frame rect in base pixels; unknown while a whole-image texture waits for its base.
    pub fn frame(&self) -> Option<Rect> {
        match self.frame {
            Some(f) => Some(f),
            None => self.base.size().map(|s| s.to_rect()),
        }
    }

    /// Sampled rect in base pixels.
    pub fn crop(&self) -> Option<Rect> {
        self.crop.or_else(|| self.frame())
    }

    /// Untrimmed logical size and trim offset, when the frame was trimmed at packing time.
    pub fn trim(&self) -> Option<Rect> {
        self.trim
    }

    /// Offset to apply to rendered geometry to restore untrimmed bounds.
    pub fn trim_offset(&self) -> Vec2 {
        self.trim.map(|t| t.origin().to_vec2()).unwrap_or(Vec2::ZERO)
    }

    /// Frame width.
    pub fn width(&self) -> Option<f64> {
        self.frame().map(|f| f.width())
    }

    /// Frame height.
    pub fn height(&self) -> Option<f64> {
        self.frame().map(|f| f.height())
    }

    /// Size before trimming (the frame size for untrimmed textures).
    pub fn logical_size(&self) -> Option<Size> {
        match self.trim {
            Some(t) => Some(t.size()),
            None => self.frame().map(|f| f.size()),
        }
    }

    /// Corner UVs, or `None` until the base is ready (or when the crop does not fit it).
    pub fn uvs(&self) -> Option<TextureUvs> {
        let size = self.base.size()?;
        let crop = self.crop()?;
        if !rect_fits(crop, size) {
            tracing::debug!(
                source = %self.base.source(),
                ?crop,
                "texture crop does not fit inside its base; uvs unavailable"
            );
            return None;
        }
        Some(TextureUvs::from_crop(crop, size))
    }

    /// True when UVs are available.
    pub fn is_valid(&self) -> bool {
        self.uvs().is_some()
    }

    /// Current [`TextureStamp`].
    pub fn stamp(&self) -> TextureStamp {
        let bits = |r: Option<Rect>| r.map(|r| [r.x0, r.y0, r.x1, r.y1].map(f64::to_bits));
        TextureStamp {
            base: self.base.id(),
            generation: self.base.generation(),
            status: match self.base.status() {
                BaseTextureStatus::Pending => 0,
                BaseTextureStatus::Ready(_) => 1,
                BaseTextureStatus::Failed(_) => 2,
            },
            rects: [bits(self.frame), bits(self.crop), bits(self.trim)],
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/texture/region.rs"]
mod tests;
