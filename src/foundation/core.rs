use crate::foundation::error::{RopelineError, RopelineResult};

pub use kurbo::{Affine, Point, Rect, Size, Vec2};

/// Local transform of a scene node.
///
/// The pivot is the local-space point that lands on `position` after rotation and scale.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Transform2D {
    /// Translation in parent space.
    pub position: Vec2,
    /// Rotation in radians.
    pub rotation: f64,
    /// Non-uniform scale, default `(1, 1)`.
    pub scale: Vec2,
    /// Local-space pivot.
    pub pivot: Vec2,
}

impl Default for Transform2D {
    fn default() -> Self {
        Self {
            position: Vec2::ZERO,
            rotation: 0.0,
            scale: Vec2::new(1.0, 1.0),
            pivot: Vec2::ZERO,
        }
    }
}

impl Transform2D {
    /// Local matrix: `T(position) * R(rotation) * S(scale) * T(-pivot)`.
    pub fn to_affine(self) -> Affine {
        Affine::translate(self.position)
            * Affine::rotate(self.rotation)
            * Affine::scale_non_uniform(self.scale.x, self.scale.y)
            * Affine::translate(-self.pivot)
    }
}

/// Reject rects with non-finite coordinates or negative extents.
pub(crate) fn validate_rect(what: &str, r: Rect) -> RopelineResult<()> {
    let finite = [r.x0, r.y0, r.x1, r.y1].iter().all(|v| v.is_finite());
    if !finite {
        return Err(RopelineError::validation(format!(
            "{what} must have finite coordinates"
        )));
    }
    if r.x1 < r.x0 || r.y1 < r.y0 {
        return Err(RopelineError::validation(format!(
            "{what} must have non-negative width and height"
        )));
    }
    Ok(())
}

/// True when `r` lies inside `(0, 0, size.width, size.height)`.
pub(crate) fn rect_fits(r: Rect, size: Size) -> bool {
    r.x0 >= 0.0 && r.y0 >= 0.0 && r.x1 <= size.width && r.y1 <= size.height
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
