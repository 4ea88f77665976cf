use crate::foundation::core::{Point, Vec2};

/// Caller-owned ordered point sequence driving a rope.
///
/// `version` changes on every structural edit (length change or whole-sequence swap) so a
/// generator holding no reference to the path can tell when its buffers need resizing.
/// Moving points in place keeps the version.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PointPath {
    points: Vec<Point>,
    version: u64,
}

impl PointPath {
    /// Empty path.
    pub fn new() -> Self {
        Self::default()
    }

    /// Path over the given points.
    pub fn from_points(points: Vec<Point>) -> Self {
        Self { points, version: 0 }
    }

    /// Number of points.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// True for a path without points.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Structural version.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Points in order.
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// Point at `index`.
    pub fn get(&self, index: usize) -> Option<Point> {
        self.points.get(index).copied()
    }

    /// Move the point at `index`. Returns `false` when out of range.
    pub fn set(&mut self, index: usize, p: Point) -> bool {
        match self.points.get_mut(index) {
            Some(slot) => {
                *slot = p;
                true
            }
            None => false,
        }
    }

    /// Mutable access to point values; the length cannot change through it.
    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, Point> {
        self.points.iter_mut()
    }

    /// Offset every point by `delta`.
    pub fn translate(&mut self, delta: Vec2) {
        for p in &mut self.points {
            *p += delta;
        }
    }

    /// Append a point.
    pub fn push(&mut self, p: Point) {
        self.points.push(p);
        self.bump();
    }

    /// Insert a point before `index` (clamped to the end).
    pub fn insert(&mut self, index: usize, p: Point) {
        let index = index.min(self.points.len());
        self.points.insert(index, p);
        self.bump();
    }

    /// Remove and return the point at `index`.
    pub fn remove(&mut self, index: usize) -> Option<Point> {
        if index >= self.points.len() {
            return None;
        }
        let p = self.points.remove(index);
        self.bump();
        Some(p)
    }

    /// Remove the last point.
    pub fn pop(&mut self) -> Option<Point> {
        let p = self.points.pop()?;
        self.bump();
        Some(p)
    }

    /// Shorten to `len` points; no-op when already shorter.
    pub fn truncate(&mut self, len: usize) {
        if len < self.points.len() {
            self.points.truncate(len);
            self.bump();
        }
    }

    /// Swap the whole sequence.
    pub fn replace(&mut self, points: Vec<Point>) {
        self.points = points;
        self.bump();
    }

    fn bump(&mut self) {
        self.version = self.version.wrapping_add(1);
    }
}

impl FromIterator<Point> for PointPath {
    fn from_iter<I: IntoIterator<Item = Point>>(iter: I) -> Self {
        Self::from_points(iter.into_iter().collect())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/geometry/path.rs"]
mod tests;
