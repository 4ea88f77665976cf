use super::*;
use crate::{Point, Vec2};

#[test]
fn root_world_equals_local() {
    let mut n = NodeTransform::with_local(Transform2D {
        position: Vec2::new(3.0, 4.0),
        ..Transform2D::default()
    });
    n.alpha = 0.5;
    n.update_transform(None);
    assert_eq!(n.world(), Affine::translate(Vec2::new(3.0, 4.0)));
    assert_eq!(n.world_alpha(), 0.5);
}

#[test]
fn child_composes_onto_parent() {
    let mut parent = NodeTransform::with_local(Transform2D {
        position: Vec2::new(10.0, 0.0),
        scale: Vec2::new(2.0, 2.0),
        ..Transform2D::default()
    });
    parent.alpha = 0.5;
    parent.update_transform(None);

    let mut child = NodeTransform::with_local(Transform2D {
        position: Vec2::new(1.0, 1.0),
        ..Transform2D::default()
    });
    child.alpha = 0.5;
    child.update_transform(Some(&parent));

    assert_eq!(child.world() * Point::ORIGIN, Point::new(12.0, 2.0));
    assert_eq!(child.world_alpha(), 0.25);
}

#[test]
fn alpha_is_clamped() {
    let mut n = NodeTransform::new();
    n.alpha = 3.0;
    n.update_transform(None);
    assert_eq!(n.world_alpha(), 1.0);
}
