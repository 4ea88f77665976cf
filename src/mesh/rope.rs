use std::fmt;

use crate::{
    foundation::core::{Point, Rect, Vec2},
    foundation::error::RopelineResult,
    foundation::math::strip_param,
    geometry::buffers::{BufferUploader, GeometryBuffers},
    geometry::path::PointPath,
    mesh::strip::Strip,
    scene::node::NodeTransform,
    texture::region::{Texture, TextureStamp},
};

/// Result of a rope refresh.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// Buffers (re)built: UVs, colors, indices and vertices.
    Rebuilt,
    /// Only vertex positions were recomputed.
    VerticesOnly,
    /// The path has no points; nothing to write.
    Empty,
    /// Texture metadata is not available yet; buffers untouched. Retry later.
    NotReady,
}

/// Multiplier applied to the ribbon half width at strip parameter `t` in `[0, 1]`.
pub type WidthScale = Box<dyn Fn(f64) -> f64>;

/// Ribbon mesh that follows a caller-owned [`PointPath`].
///
/// The rope never keeps the path: each call borrows it and the rope remembers the structural
/// version it last rebuilt for. Every point contributes two vertices, offset along the local
/// normal by half the texture height, with `u` running from 0 at the first point to 1 at the
/// last and `v` spanning the ribbon width.
pub struct Rope {
    strip: Strip,
    /// Recompute geometry from [`Rope::update_transform`].
    pub auto_update: bool,
    applied_version: Option<u64>,
    applied_stamp: Option<TextureStamp>,
    width_scale: Option<WidthScale>,
}

impl fmt::Debug for Rope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rope")
            .field("strip", &self.strip)
            .field("auto_update", &self.auto_update)
            .field("applied_version", &self.applied_version)
            .field("applied_stamp", &self.applied_stamp)
            .field("width_scale", &self.width_scale.is_some())
            .finish()
    }
}

impl Rope {
    /// Build a rope over `path` and run one full refresh.
    ///
    /// Buffers are sized for the path even when the texture is not ready yet; their contents
    /// stay zero until a later refresh succeeds.
    pub fn new(texture: Texture, path: &PointPath) -> Self {
        let mut rope = Self {
            strip: Strip::new(texture, path.len()),
            auto_update: true,
            applied_version: None,
            applied_stamp: None,
            width_scale: None,
        };
        rope.full_refresh(path);
        rope
    }

    /// Underlying strip mesh.
    pub fn strip(&self) -> &Strip {
        &self.strip
    }

    /// Texture sampled by the rope.
    pub fn texture(&self) -> &Texture {
        self.strip.texture()
    }

    /// Swap the texture. Takes effect on the next full refresh.
    pub fn set_texture(&mut self, texture: Texture) {
        self.strip.set_texture(texture);
    }

    /// Geometry buffers.
    pub fn buffers(&self) -> &GeometryBuffers {
        self.strip.buffers()
    }

    /// Scene-graph transform.
    pub fn node(&self) -> &NodeTransform {
        &self.strip.node
    }

    /// Mutable scene-graph transform.
    pub fn node_mut(&mut self) -> &mut NodeTransform {
        &mut self.strip.node
    }

    /// Install (or clear) a width multiplier hook. Default width is constant.
    pub fn set_width_scale(&mut self, scale: Option<WidthScale>) {
        self.width_scale = scale;
    }

    /// Upload dirty buffers through `uploader`.
    pub fn flush(&mut self, uploader: &mut dyn BufferUploader) -> RopelineResult<usize> {
        self.strip.flush(uploader)
    }

    /// Bounding box of the ribbon vertices in local space.
    pub fn local_bounds(&self) -> Option<Rect> {
        self.strip.local_bounds()
    }

    /// True when the path length/sequence or the texture changed since the last rebuild.
    pub fn is_stale(&self, path: &PointPath) -> bool {
        self.applied_version != Some(path.version())
            || self.applied_stamp != Some(self.strip.texture.stamp())
            || self.strip.buffers.point_capacity() != path.len()
    }

    /// Rebuild UVs, colors and indices from scratch, reallocating on a point-count change,
    /// then recompute vertices.
    #[tracing::instrument(level = "trace", skip_all, fields(points = path.len()))]
    pub fn full_refresh(&mut self, path: &PointPath) -> RefreshOutcome {
        let (Some(uvs), Some(half_width)) = (self.strip.texture.uvs(), self.half_width()) else {
            tracing::debug!(
                source = %self.strip.texture.base().source(),
                "rope texture not ready; full refresh skipped"
            );
            return RefreshOutcome::NotReady;
        };

        let n = path.len();
        let buffers = &mut self.strip.buffers;
        if buffers.point_capacity() != n {
            tracing::debug!(
                from = buffers.point_capacity(),
                to = n,
                "reallocating rope buffers"
            );
            buffers.reallocate_for_points(n);
        }

        {
            let out = buffers.uvs.as_mut_slice();
            for i in 0..n {
                let u = strip_param(i, n) as f32;
                let (u0, v0) = uvs.map(u, 0.0);
                let (u1, v1) = uvs.map(u, 1.0);
                out[i * 4..i * 4 + 4].copy_from_slice(&[u0, v0, u1, v1]);
            }
        }
        buffers.colors.as_mut_slice().fill(1.0);
        for (i, pair) in buffers.indices.as_mut_slice().chunks_exact_mut(2).enumerate() {
            let first = (i * 2) as u32;
            pair[0] = first;
            pair[1] = first + 1;
        }

        self.write_vertices(path, half_width);

        let buffers = &mut self.strip.buffers;
        buffers.uvs.mark_dirty();
        buffers.colors.mark_dirty();
        buffers.indices.mark_dirty();

        self.applied_version = Some(path.version());
        self.applied_stamp = Some(self.strip.texture.stamp());
        RefreshOutcome::Rebuilt
    }

    /// Recompute vertex positions only. Falls back to [`Rope::full_refresh`] when the buffers
    /// are not sized for `path`.
    pub fn refresh_vertices(&mut self, path: &PointPath) -> RefreshOutcome {
        if self.strip.buffers.point_capacity() != path.len() {
            return self.full_refresh(path);
        }
        if path.is_empty() {
            return RefreshOutcome::Empty;
        }
        let Some(half_width) = self.half_width() else {
            return RefreshOutcome::NotReady;
        };
        self.write_vertices(path, half_width);
        RefreshOutcome::VerticesOnly
    }

    /// Per-frame hook: with `auto_update`, rebuild when stale or recompute vertices otherwise,
    /// then propagate the scene-graph transform. Returns `None` when `auto_update` is off.
    pub fn update_transform(
        &mut self,
        path: &PointPath,
        parent: Option<&NodeTransform>,
    ) -> Option<RefreshOutcome> {
        let outcome = if self.auto_update {
            Some(if self.is_stale(path) {
                self.full_refresh(path)
            } else {
                self.refresh_vertices(path)
            })
        } else {
            None
        };
        self.strip.update_transform(parent);
        outcome
    }

    fn half_width(&self) -> Option<f64> {
        self.strip.texture.height().map(|h| h / 2.0)
    }

    fn write_vertices(&mut self, path: &PointPath, half_width: f64) {
        let points = path.points();
        let n = points.len();
        let out = self.strip.buffers.vertices.as_mut_slice();
        debug_assert_eq!(out.len(), n * 4);

        let mut prev = points.first().copied().unwrap_or(Point::ORIGIN);
        for (i, &p) in points.iter().enumerate() {
            let next = points.get(i + 1).copied().unwrap_or(p);
            let mut half = half_width;
            if let Some(scale) = &self.width_scale {
                half *= scale(strip_param(i, n));
            }
            let offset = unit_normal(next - prev) * half;
            out[i * 4..i * 4 + 4].copy_from_slice(&[
                (p.x + offset.x) as f32,
                (p.y + offset.y) as f32,
                (p.x - offset.x) as f32,
                (p.y - offset.y) as f32,
            ]);
            prev = p;
        }
        self.strip.buffers.vertices.mark_dirty();
    }
}

/// Unit normal `(d.y, -d.x) / |d|`; zero for a zero-length or non-finite direction.
fn unit_normal(d: Vec2) -> Vec2 {
    let len = d.hypot();
    if len > 0.0 && len.is_finite() {
        Vec2::new(d.y / len, -d.x / len)
    } else {
        Vec2::ZERO
    }
}

#[cfg(test)]
#[path = "../../tests/unit/mesh/rope.rs"]
mod tests;
