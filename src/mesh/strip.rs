use crate::{
    foundation::core::Rect,
    foundation::error::RopelineResult,
    geometry::buffers::{BufferUploader, GeometryBuffers},
    scene::node::NodeTransform,
    texture::region::Texture,
};

/// Textured triangle-strip mesh: a texture, its geometry buffers and a scene node.
///
/// Vertex `2i` and `2i + 1` are the two edges of strip row `i`; consecutive rows form quads
/// in standard strip winding.
#[derive(Clone, Debug)]
pub struct Strip {
    pub(crate) texture: Texture,
    pub(crate) buffers: GeometryBuffers,
    /// Scene-graph transform of the mesh.
    pub node: NodeTransform,
}

impl Strip {
    /// Strip with zeroed buffers sized for `rows` rows.
    pub fn new(texture: Texture, rows: usize) -> Self {
        Self {
            texture,
            buffers: GeometryBuffers::for_points(rows),
            node: NodeTransform::new(),
        }
    }

    /// Texture sampled by the strip.
    pub fn texture(&self) -> &Texture {
        &self.texture
    }

    /// Swap the texture; geometry is left as is.
    pub fn set_texture(&mut self, texture: Texture) {
        self.texture = texture;
    }

    /// Geometry buffers.
    pub fn buffers(&self) -> &GeometryBuffers {
        &self.buffers
    }

    /// Upload dirty buffers through `uploader`.
    pub fn flush(&mut self, uploader: &mut dyn BufferUploader) -> RopelineResult<usize> {
        self.buffers.flush(uploader)
    }

    /// Bounding box of the current vertices in local space.
    pub fn local_bounds(&self) -> Option<Rect> {
        let verts = self.buffers.vertices.as_slice();
        let mut pairs = verts.chunks_exact(2);
        let first = pairs.next()?;
        let (mut x0, mut y0) = (f64::from(first[0]), f64::from(first[1]));
        let (mut x1, mut y1) = (x0, y0);
        for xy in pairs {
            let (x, y) = (f64::from(xy[0]), f64::from(xy[1]));
            x0 = x0.min(x);
            y0 = y0.min(y);
            x1 = x1.max(x);
            y1 = y1.max(y);
        }
        Some(Rect::new(x0, y0, x1, y1))
    }

    /// Propagate the scene-graph transform update.
    pub fn update_transform(&mut self, parent: Option<&NodeTransform>) {
        self.node.update_transform(parent);
    }
}
