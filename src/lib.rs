//! Ropeline builds textured rope (ribbon) meshes for 2D scene graphs.
//!
//! A [`Rope`] turns a [`PointPath`] plus a [`Texture`] into GPU-ready [`GeometryBuffers`]
//! (positions, UVs, per-vertex alpha and triangle-strip indices). The rope re-derives its
//! geometry each frame through [`Rope::update_transform`], rebuilding everything only when the
//! path length or the texture changed.
//!
//! Textures are rectangular regions of shared [`BaseTexture`]s that may still be loading. The
//! [`AssetLoader`] fills an [`AssetCaches`] from sprite-sheet JSON, skeleton JSON with a sibling
//! `.atlas`, or plain images, and is advanced from the host's frame loop.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod assets;
mod config;
mod foundation;
mod geometry;
mod mesh;
mod scene;
mod texture;

pub use crate::foundation::core::{Affine, Point, Rect, Size, Transform2D, Vec2};
pub use crate::foundation::error::{RopelineError, RopelineResult};

pub use crate::assets::atlas::{Atlas, AtlasPage, AtlasRegion};
pub use crate::assets::cache::{AnimationCache, AssetCaches};
pub use crate::assets::decode::{DecodedImage, decode_image};
pub use crate::assets::loader::{AssetLoader, JsonAsset, LoadDone};
pub use crate::assets::sheet::{SheetFrame, SheetMeta, SheetRect, SheetSize, SpriteSheet};
pub use crate::assets::source::{AssetSource, FsSource, MemorySource, normalize_rel_path};
pub use crate::config::{LoaderOptions, PixelSize, RopeConfig, TextureSource};
pub use crate::geometry::buffers::{
    Buffer, BufferKind, BufferSnapshot, BufferUploader, GeometryBuffers, InMemoryUploader,
    RecordedUpload,
};
pub use crate::geometry::path::PointPath;
pub use crate::mesh::rope::{RefreshOutcome, Rope, WidthScale};
pub use crate::mesh::strip::Strip;
pub use crate::scene::node::NodeTransform;
pub use crate::texture::base::{BaseTexture, BaseTextureId, BaseTextureStatus};
pub use crate::texture::cache::TextureCache;
pub use crate::texture::region::{Texture, TextureStamp, TextureUvs};
