//! Solid-only ray probe on top of the raw world raycasts.

use glam::Vec2;

use crate::api::{CollisionQuery, PhysicsWorldApi};
use crate::types::{ContactInfo, LayerMask, RayHit, SurfaceRef};
use crate::world::PhysicsWorld;

pub struct RayProbe;

impl RayProbe {
    /// Closest non-trigger hit to `origin`, by squared distance of the hit point.
    /// Equal distances keep the earlier hit, so `FrameId`-ordered input resolves
    /// ties to the lowest id.
    pub fn closest_solid(origin: Vec2, hits: &[RayHit]) -> Option<&RayHit> {
        hits.iter().filter(|h| !h.trigger).fold(None, |best: Option<&RayHit>, h| match best {
            Some(b)
                if b.hit.contact.distance_squared(origin) <= h.hit.contact.distance_squared(origin) =>
            {
                Some(b)
            }
            _ => Some(h),
        })
    }

    /// Converts a raw hit into a contact. A ray starting inside a solid reports no normal;
    /// the contact then faces back along the ray.
    pub fn contact(hit: &RayHit, direction: Vec2) -> ContactInfo {
        let normal = if hit.hit.normal == Vec2::ZERO {
            -direction.normalize_or_zero()
        } else {
            hit.hit.normal
        };
        ContactInfo {
            point: hit.hit.contact,
            normal,
            distance: hit.hit.toi,
            surface: SurfaceRef {
                id: hit.id,
                key: hit.key,
                layer: hit.layer,
            },
            snap: false,
        }
    }
}

impl CollisionQuery for PhysicsWorld {
    fn cast(
        &self,
        origin: Vec2,
        direction: Vec2,
        max_distance: f32,
        mask: LayerMask,
    ) -> Option<ContactInfo> {
        let hits = self.raycast_all(origin, direction, mask, max_distance);
        RayProbe::closest_solid(origin, &hits).map(|h| RayProbe::contact(h, direction))
    }
}
