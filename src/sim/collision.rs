//! Pairwise collision detection between entities
//!
//! Detection uses the exact shapes. The response inputs (overlap rectangle,
//! center distance, contact normal) use bounding boxes.

use glam::DVec2;

use super::entity::Entity;
use super::geometry::Rect;
use crate::distance;

/// Normal used when two bounding-box centers coincide
pub const DEFAULT_NORMAL: DVec2 = DVec2::X;

/// Response inputs for an overlapping pair
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contact {
    /// Unit vector from the first entity's center toward the second's
    pub normal: DVec2,
    /// Total displacement to apply between the two entities
    pub separation: f64,
    /// Intersection of the two bounding boxes
    pub overlap: Rect,
}

/// Whether the two entities' shapes intersect. An entity never overlaps itself.
pub fn overlaps(a: &Entity, b: &Entity) -> bool {
    if a.id() == b.id() {
        return false;
    }
    a.shape().intersects(&b.shape())
}

/// Intersection of the two bounding boxes, `None` if they do not overlap
pub fn overlap_bounds(a: &Entity, b: &Entity) -> Option<Rect> {
    a.bounds().intersection(&b.bounds())
}

/// Distance between bounding-box centers
pub fn separation_distance(a: &Entity, b: &Entity) -> f64 {
    distance(a.bounds().center(), b.bounds().center())
}

/// Unit normal from `a` toward `b`, falling back to +X for coincident centers
pub fn contact_normal(a: &Entity, b: &Entity) -> DVec2 {
    let delta = b.bounds().center() - a.bounds().center();
    let dist = delta.length();
    if dist == 0.0 || !dist.is_finite() {
        DEFAULT_NORMAL
    } else {
        delta / dist
    }
}

/// Build the response for an overlapping pair.
///
/// Separation is half the overlap rectangle's diagonal. Returns `None` when
/// the bounding boxes have no common area (shapes merely touching).
pub fn contact(a: &Entity, b: &Entity) -> Option<Contact> {
    let overlap = overlap_bounds(a, b)?;
    Some(Contact {
        normal: contact_normal(a, b),
        separation: overlap.diagonal() * 0.5,
        overlap,
    })
}
