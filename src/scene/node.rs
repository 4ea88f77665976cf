use crate::foundation::core::{Affine, Transform2D};

/// Transform state of one scene-graph node.
///
/// `update_transform` composes the local transform onto the parent's world matrix; display-list
/// traversal (calling it parent-first) belongs to the host renderer.
#[derive(Clone, Debug, PartialEq)]
pub struct NodeTransform {
    /// Local transform relative to the parent.
    pub local: Transform2D,
    /// Local opacity in `[0, 1]`.
    pub alpha: f64,
    /// Hidden nodes keep updating transforms but are skipped by renderers.
    pub visible: bool,
    world: Affine,
    world_alpha: f64,
}

impl Default for NodeTransform {
    fn default() -> Self {
        Self {
            local: Transform2D::default(),
            alpha: 1.0,
            visible: true,
            world: Affine::IDENTITY,
            world_alpha: 1.0,
        }
    }
}

impl NodeTransform {
    /// Identity node.
    pub fn new() -> Self {
        Self::default()
    }

    /// Node with the given local transform.
    pub fn with_local(local: Transform2D) -> Self {
        Self {
            local,
            ..Self::default()
        }
    }

    /// World matrix computed by the last [`NodeTransform::update_transform`].
    pub fn world(&self) -> Affine {
        self.world
    }

    /// Accumulated opacity computed by the last [`NodeTransform::update_transform`].
    pub fn world_alpha(&self) -> f64 {
        self.world_alpha
    }

    /// Recompute world matrix and alpha from `parent` (root when `None`).
    pub fn update_transform(&mut self, parent: Option<&NodeTransform>) {
        let alpha = self.alpha.clamp(0.0, 1.0);
        match parent {
            Some(p) => {
                self.world = p.world * self.local.to_affine();
                self.world_alpha = p.world_alpha * alpha;
            }
            None => {
                self.world = self.local.to_affine();
                self.world_alpha = alpha;
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/node.rs"]
mod tests;
