//! Axis-aligned box collision
//!
//! Boxes that only touch along an edge do not collide.

use super::entities::{Body, Spatial};
use crate::tuning::Playfield;

/// Penetration extent of two overlapping boxes
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Overlap {
    pub x: f32,
    pub y: f32,
}

/// Strict AABB overlap test
#[inline]
pub fn overlaps(a: &Body, b: &Body) -> bool {
    a.pos.x < b.right() && a.right() > b.pos.x && a.pos.y < b.bottom() && a.bottom() > b.pos.y
}

/// Overlap metrics, if the boxes intersect
pub fn overlap(a: &Body, b: &Body) -> Option<Overlap> {
    if !overlaps(a, b) {
        return None;
    }
    Some(Overlap {
        x: a.right().min(b.right()) - a.pos.x.max(b.pos.x),
        y: a.bottom().min(b.bottom()) - a.pos.y.max(b.pos.y),
    })
}

/// Collision between two entities, with a debug trace on hit
pub fn collide(a: &dyn Spatial, b: &dyn Spatial) -> bool {
    match overlap(a.body(), b.body()) {
        Some(o) => {
            log::debug!(
                target: "collisions",
                "{:?} at ({:.0}, {:.0}) hit {:?} at ({:.0}, {:.0}), overlap {:.1}x{:.1}",
                a.kind(),
                a.body().pos.x,
                a.body().pos.y,
                b.kind(),
                b.body().pos.x,
                b.body().pos.y,
                o.x,
                o.y
            );
            true
        }
        None => false,
    }
}

/// Which edges a body can still move toward without leaving the playfield
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundsCheck {
    pub left: bool,
    pub right: bool,
    pub top: bool,
    pub bottom: bool,
}

pub fn check_bounds(body: &Body, field: Playfield) -> BoundsCheck {
    BoundsCheck {
        left: body.pos.x > 0.0,
        right: body.pos.x < field.width - body.size.x,
        top: body.pos.y > 0.0,
        bottom: body.pos.y < field.height - body.size.y,
    }
}
