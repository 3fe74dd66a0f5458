//! Two-ray ground and ceiling detection.
//!
//! Rays are cast from the left and right edges of the collider along a shared
//! direction. Both rays must agree on the surface orientation before a contact is
//! allowed to re-align the body (`snap`), so a single ray catching a ledge or seam
//! cannot tip it over.

use glam::Vec2;

use crate::api::CollisionQuery;
use crate::body::KinematicBody;
use crate::config::Bounds;
use crate::types::{ContactInfo, LayerMask};

/// Minimum `dot(normal_a, normal_b)` for the two probes to count as one surface.
pub const NORMAL_AGREEMENT: f32 = 0.8;

#[derive(Debug, Clone, Copy)]
pub struct GroundDetector {
    bounds: Bounds,
}

impl GroundDetector {
    pub fn new(bounds: Bounds) -> Self {
        Self { bounds }
    }

    /// Ray origins `(left, right)` at collider-centre height.
    pub fn ray_origins(&self, body: &KinematicBody) -> (Vec2, Vec2) {
        let center = body.position + body.up * self.bounds.height;
        let side = body.right() * self.bounds.half_extents.x;
        (center - side, center + side)
    }

    /// Ray reach: half the collider height, the snap distance while grounded, and this
    /// tick's displacement so fast bodies cannot skip past a surface.
    pub fn probe_distance(&self, body: &KinematicBody) -> f32 {
        let snap = if body.grounded { self.bounds.snap_distance } else { 0.0 };
        self.bounds.half_extents.y + snap + (body.position - body.previous_position).length()
    }

    pub fn probe<Q: CollisionQuery + ?Sized>(
        &self,
        query: &Q,
        body: &KinematicBody,
        direction: Vec2,
        mask: LayerMask,
    ) -> Option<ContactInfo> {
        self.probe_within(query, body, direction, mask, self.probe_distance(body))
    }

    /// [`GroundDetector::probe`] with an explicit ray length.
    pub fn probe_within<Q: CollisionQuery + ?Sized>(
        &self,
        query: &Q,
        body: &KinematicBody,
        direction: Vec2,
        mask: LayerMask,
        distance: f32,
    ) -> Option<ContactInfo> {
        let (left, right) = self.ray_origins(body);
        let a = query.cast(left, direction, distance, mask);
        let b = query.cast(right, direction, distance, mask);
        combine(a, b, body.position)
    }
}

/// Merges the two edge probe results into one contact.
///
/// `reference` decides which hit is "closer" when the normals disagree.
pub fn combine(a: Option<ContactInfo>, b: Option<ContactInfo>, reference: Vec2) -> Option<ContactInfo> {
    match (a, b) {
        (Some(a), Some(b)) => {
            let closest = if a.point.distance_squared(reference) > b.point.distance_squared(reference) {
                b
            } else {
                a
            };
            if a.normal.dot(b.normal) >= NORMAL_AGREEMENT {
                // Agreement bounds |a + b| well away from zero
                Some(ContactInfo {
                    point: (a.point + b.point) * 0.5,
                    normal: (a.normal + b.normal).normalize(),
                    distance: (a.distance + b.distance) * 0.5,
                    surface: closest.surface,
                    snap: true,
                })
            } else {
                Some(ContactInfo { snap: false, ..closest })
            }
        }
        (Some(hit), None) | (None, Some(hit)) => Some(ContactInfo { snap: false, ..hit }),
        (None, None) => None,
    }
}
