use std::rc::Rc;

use crate::{
    foundation::core::{Rect, Size, Vec2},
    foundation::error::{RopelineError, RopelineResult},
    texture::base::BaseTexture,
    texture::region::Texture,
};

/// One packed region of a skeleton texture atlas.
#[derive(Clone, Debug, PartialEq)]
pub struct AtlasRegion {
    /// Attachment name.
    pub name: String,
    /// Packed rotated by 90 degrees (not supported; sampled unrotated).
    pub rotate: bool,
    /// Top-left of the packed pixels.
    pub xy: Vec2,
    /// Size of the packed pixels.
    pub size: Size,
    /// Untrimmed size; equals `size` when not trimmed.
    pub orig: Size,
    /// Offset of the packed pixels from the bottom-left of the untrimmed image.
    pub offset: Vec2,
    /// Frame index for sequences, `-1` otherwise.
    pub index: i32,
}

impl AtlasRegion {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            rotate: false,
            xy: Vec2::ZERO,
            size: Size::ZERO,
            orig: Size::ZERO,
            offset: Vec2::ZERO,
            index: -1,
        }
    }

    /// Packed rect inside the page image.
    pub fn frame(&self) -> Rect {
        Rect::from_origin_size(self.xy.to_point(), self.size)
    }

    /// Trim rect (untrimmed size, top-left offset of the kept pixels) when trimmed.
    pub fn trim(&self) -> Option<Rect> {
        let orig = if self.orig == Size::ZERO { self.size } else { self.orig };
        if orig == self.size && self.offset == Vec2::ZERO {
            return None;
        }
        let top = orig.height - self.size.height - self.offset.y;
        Some(Rect::from_origin_size((self.offset.x, top), orig))
    }
}

/// One atlas page: an image plus the regions packed into it.
#[derive(Clone, Debug, PartialEq)]
pub struct AtlasPage {
    /// Image path relative to the atlas file.
    pub name: String,
    /// Declared page size.
    pub size: Option<Size>,
    /// Regions in file order.
    pub regions: Vec<AtlasRegion>,
}

/// Skeleton texture atlas in the libGDX text format.
///
/// Only the fields needed to build texture regions are read; filter, format and repeat
/// settings are ignored.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Atlas {
    /// Pages in file order.
    pub pages: Vec<AtlasPage>,
}

impl Atlas {
    /// Parse atlas text.
    pub fn parse(text: &str) -> RopelineResult<Self> {
        let mut pages = Vec::new();
        let mut page: Option<AtlasPage> = None;
        let mut region: Option<AtlasRegion> = None;

        for (line_no, raw) in text.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() {
                close_page(&mut pages, &mut page, &mut region);
                continue;
            }

            if page.is_none() {
                page = Some(AtlasPage {
                    name: line.to_string(),
                    size: None,
                    regions: Vec::new(),
                });
                continue;
            }
            let Some(current) = page.as_mut() else {
                continue;
            };

            let indented = raw.starts_with([' ', '\t']);
            match line.split_once(':') {
                Some((key, value)) => match region.as_mut() {
                    // Page fields precede the first region, indented or not.
                    None => apply_page_field(current, key.trim(), value.trim())
                        .map_err(|msg| atlas_error(line_no, &msg))?,
                    Some(r) if indented => apply_region_field(r, key.trim(), value.trim())
                        .map_err(|msg| atlas_error(line_no, &msg))?,
                    Some(_) => {
                        return Err(atlas_error(line_no, "page field after the first region"));
                    }
                },
                None => {
                    if let Some(done) = region.take() {
                        current.regions.push(done);
                    }
                    region = Some(AtlasRegion::new(line));
                }
            }
        }
        close_page(&mut pages, &mut page, &mut region);

        Ok(Self { pages })
    }

    /// Number of regions across all pages.
    pub fn region_count(&self) -> usize {
        self.pages.iter().map(|p| p.regions.len()).sum()
    }
}

/// Build one texture per region of `page` over `base`.
pub(crate) fn page_textures(
    page: &AtlasPage,
    base: &Rc<BaseTexture>,
) -> RopelineResult<Vec<(String, Texture)>> {
    page.regions
        .iter()
        .map(|r| {
            if r.rotate {
                tracing::warn!(region = %r.name, "rotated atlas regions are sampled unrotated");
            }
            Texture::new(base.clone(), r.frame(), None, r.trim()).map(|t| (r.name.clone(), t))
        })
        .collect()
}

fn close_page(
    pages: &mut Vec<AtlasPage>,
    page: &mut Option<AtlasPage>,
    region: &mut Option<AtlasRegion>,
) {
    if let Some(mut p) = page.take() {
        if let Some(r) = region.take() {
            p.regions.push(r);
        }
        pages.push(p);
    }
}

fn apply_page_field(page: &mut AtlasPage, key: &str, value: &str) -> Result<(), String> {
    if key == "size" {
        let (w, h) = parse_pair(value)?;
        page.size = Some(Size::new(w, h));
    }
    Ok(())
}

fn apply_region_field(r: &mut AtlasRegion, key: &str, value: &str) -> Result<(), String> {
    match key {
        "rotate" => r.rotate = value == "true" || value == "90",
        "xy" => {
            let (x, y) = parse_pair(value)?;
            r.xy = Vec2::new(x, y);
        }
        "size" => {
            let (w, h) = parse_pair(value)?;
            r.size = Size::new(w, h);
        }
        "orig" => {
            let (w, h) = parse_pair(value)?;
            r.orig = Size::new(w, h);
        }
        "offset" => {
            let (x, y) = parse_pair(value)?;
            r.offset = Vec2::new(x, y);
        }
        "bounds" => {
            let [x, y, w, h] = parse_quad(value)?;
            r.xy = Vec2::new(x, y);
            r.size = Size::new(w, h);
        }
        "offsets" => {
            let [x, y, w, h] = parse_quad(value)?;
            r.offset = Vec2::new(x, y);
            r.orig = Size::new(w, h);
        }
        "index" => {
            r.index = value
                .parse()
                .map_err(|_| format!("invalid index '{value}'"))?;
        }
        _ => {}
    }
    Ok(())
}

fn parse_numbers(value: &str) -> Result<Vec<f64>, String> {
    value
        .split(',')
        .map(|part| {
            let part = part.trim();
            part.parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .ok_or_else(|| format!("invalid number '{part}'"))
        })
        .collect()
}

fn parse_pair(value: &str) -> Result<(f64, f64), String> {
    match parse_numbers(value)?.as_slice() {
        [a, b] => Ok((*a, *b)),
        _ => Err(format!("expected two numbers, got '{value}'")),
    }
}

fn parse_quad(value: &str) -> Result<[f64; 4], String> {
    match parse_numbers(value)?.as_slice() {
        [a, b, c, d] => Ok([*a, *b, *c, *d]),
        _ => Err(format!("expected four numbers, got '{value}'")),
    }
}

fn atlas_error(line_no: usize, msg: &str) -> RopelineError {
    RopelineError::validation(format!("atlas line {}: {msg}", line_no + 1))
}

#[cfg(test)]
#[path = "../../tests/unit/assets/atlas.rs"]
mod tests;
