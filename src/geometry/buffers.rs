use crate::foundation::error::RopelineResult;

/// Identifies one buffer of a [`GeometryBuffers`] store.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BufferKind {
    /// Interleaved `x, y` vertex positions.
    Vertices,
    /// Interleaved `u, v` texture coordinates.
    Uvs,
    /// Per-vertex alpha.
    Colors,
    /// Triangle-strip index order.
    Indices,
}

impl BufferKind {
    /// All kinds in flush order.
    pub const ALL: [BufferKind; 4] = [
        BufferKind::Vertices,
        BufferKind::Uvs,
        BufferKind::Colors,
        BufferKind::Indices,
    ];
}

/// Typed buffer with a dirty flag and a version bumped on every change signal.
#[derive(Clone, Debug, Default)]
pub struct Buffer<T> {
    data: Vec<T>,
    dirty: bool,
    version: u64,
}

impl<T: bytemuck::Pod + Default> Buffer<T> {
    /// Number of scalars.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// True when the buffer holds no scalars.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Read access to the scalars.
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    /// Raw bytes in native endianness, as handed to an uploader.
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.data)
    }

    /// True when the contents changed since the last flush.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Number of update signals received so far.
    pub fn version(&self) -> u64 {
        self.version
    }

    pub(crate) fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.data
    }

    /// Drop the old contents and zero-fill `len` scalars.
    pub(crate) fn reallocate(&mut self, len: usize) {
        self.data = vec![T::default(); len];
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
        self.version += 1;
    }

    fn clear_dirty(&mut self) {
        self.dirty = false;
    }
}

/// Renderer-side consumer of buffer updates.
///
/// Implementations typically re-upload the bytes into a GPU buffer identified by `kind`.
pub trait BufferUploader {
    /// Receive the full contents of one dirty buffer.
    fn upload(&mut self, kind: BufferKind, version: u64, bytes: &[u8]) -> RopelineResult<()>;
}

/// One upload captured by [`InMemoryUploader`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RecordedUpload {
    /// Buffer that was uploaded.
    pub kind: BufferKind,
    /// Buffer version at upload time.
    pub version: u64,
    /// Copied bytes.
    pub bytes: Vec<u8>,
}

/// Uploader that keeps every upload in memory, for tests and tooling.
#[derive(Debug, Default)]
pub struct InMemoryUploader {
    uploads: Vec<RecordedUpload>,
}

impl InMemoryUploader {
    /// Create an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Borrow the recorded uploads in arrival order.
    pub fn uploads(&self) -> &[RecordedUpload] {
        &self.uploads
    }

    /// Kinds uploaded, in arrival order.
    pub fn kinds(&self) -> Vec<BufferKind> {
        self.uploads.iter().map(|u| u.kind).collect()
    }

    /// Forget everything recorded so far.
    pub fn clear(&mut self) {
        self.uploads.clear();
    }
}

impl BufferUploader for InMemoryUploader {
    fn upload(&mut self, kind: BufferKind, version: u64, bytes: &[u8]) -> RopelineResult<()> {
        self.uploads.push(RecordedUpload {
            kind,
            version,
            bytes: bytes.to_vec(),
        });
        Ok(())
    }
}

/// Buffer store of a two-row strip mesh.
///
/// Per strip point there are 4 vertex scalars, 4 uv scalars, 2 colors and 2 indices.
#[derive(Clone, Debug, Default)]
pub struct GeometryBuffers {
    pub(crate) vertices: Buffer<f32>,
    pub(crate) uvs: Buffer<f32>,
    pub(crate) colors: Buffer<f32>,
    pub(crate) indices: Buffer<u32>,
}

impl GeometryBuffers {
    /// Store sized for `points` strip points, all zero.
    pub fn for_points(points: usize) -> Self {
        let mut out = Self::default();
        out.reallocate_for_points(points);
        out
    }

    /// Vertex positions.
    pub fn vertices(&self) -> &Buffer<f32> {
        &self.vertices
    }

    /// Texture coordinates.
    pub fn uvs(&self) -> &Buffer<f32> {
        &self.uvs
    }

    /// Per-vertex alpha.
    pub fn colors(&self) -> &Buffer<f32> {
        &self.colors
    }

    /// Strip indices.
    pub fn indices(&self) -> &Buffer<u32> {
        &self.indices
    }

    /// Number of strip points the buffers are sized for.
    pub fn point_capacity(&self) -> usize {
        self.vertices.len() / 4
    }

    /// Resize every buffer for `points` strip points at once, discarding old contents.
    pub(crate) fn reallocate_for_points(&mut self, points: usize) {
        self.vertices.reallocate(points * 4);
        self.uvs.reallocate(points * 4);
        self.colors.reallocate(points * 2);
        self.indices.reallocate(points * 2);
    }

    /// True when `kind` changed since the last flush.
    pub fn is_dirty(&self, kind: BufferKind) -> bool {
        match kind {
            BufferKind::Vertices => self.vertices.is_dirty(),
            BufferKind::Uvs => self.uvs.is_dirty(),
            BufferKind::Colors => self.colors.is_dirty(),
            BufferKind::Indices => self.indices.is_dirty(),
        }
    }

    /// Kinds currently dirty, in flush order.
    pub fn dirty_kinds(&self) -> Vec<BufferKind> {
        BufferKind::ALL
            .into_iter()
            .filter(|k| self.is_dirty(*k))
            .collect()
    }

    /// Upload every dirty buffer and clear its flag. Returns the number of uploads.
    ///
    /// A failing upload leaves that buffer (and the ones after it) dirty.
    pub fn flush(&mut self, uploader: &mut dyn BufferUploader) -> RopelineResult<usize> {
        let mut uploaded = 0;
        for kind in BufferKind::ALL {
            if !self.is_dirty(kind) {
                continue;
            }
            match kind {
                BufferKind::Vertices => {
                    uploader.upload(kind, self.vertices.version(), self.vertices.as_bytes())?;
                    self.vertices.clear_dirty();
                }
                BufferKind::Uvs => {
                    uploader.upload(kind, self.uvs.version(), self.uvs.as_bytes())?;
                    self.uvs.clear_dirty();
                }
                BufferKind::Colors => {
                    uploader.upload(kind, self.colors.version(), self.colors.as_bytes())?;
                    self.colors.clear_dirty();
                }
                BufferKind::Indices => {
                    uploader.upload(kind, self.indices.version(), self.indices.as_bytes())?;
                    self.indices.clear_dirty();
                }
            }
            uploaded += 1;
        }
        tracing::trace!(uploaded, "flushed geometry buffers");
        Ok(uploaded)
    }

    /// Owned copy of the buffer contents.
    pub fn snapshot(&self) -> BufferSnapshot {
        BufferSnapshot {
            vertices: self.vertices.as_slice().to_vec(),
            uvs: self.uvs.as_slice().to_vec(),
            colors: self.colors.as_slice().to_vec(),
            indices: self.indices.as_slice().to_vec(),
        }
    }
}

/// Serializable copy of a [`GeometryBuffers`] store.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct BufferSnapshot {
    /// Interleaved vertex positions.
    pub vertices: Vec<f32>,
    /// Interleaved texture coordinates.
    pub uvs: Vec<f32>,
    /// Per-vertex alpha.
    pub colors: Vec<f32>,
    /// Strip indices.
    pub indices: Vec<u32>,
}

#[cfg(test)]
#[path = "../../tests/unit/geometry/buffers.rs"]
mod tests;
