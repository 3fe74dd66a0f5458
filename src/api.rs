use glam::Vec2;

use crate::types::*;

/// Public API contract for the host collision world.
pub trait PhysicsWorldApi {
    /// Construct a new world with the given configuration.
    fn new(cfg: WorldConfig) -> Self
    where
        Self: Sized;

    // --- Frame lifecycle ---------------------------------------------------

    /// Begin a new frame. Clears ephemeral storage used for the previous frame.
    fn begin_frame(&mut self);

    /// Insert a collider for this frame and return its frame-local handle.
    fn push(&mut self, desc: ColliderDesc) -> FrameId;

    /// Convenience: push a solid AABB collider (center + half extents).
    fn push_aabb(
        &mut self,
        center: Vec2,
        half_extents: Vec2,
        layer: LayerMask,
        user_key: Option<ColKey>,
    ) -> FrameId;

    /// Convenience: push a solid circle collider.
    fn push_circle(
        &mut self,
        center: Vec2,
        radius: f32,
        layer: LayerMask,
        user_key: Option<ColKey>,
    ) -> FrameId;

    /// Convenience: push a solid segment collider between two world points.
    fn push_segment(
        &mut self,
        a: Vec2,
        b: Vec2,
        layer: LayerMask,
        user_key: Option<ColKey>,
    ) -> FrameId;

    /// Finalize insertions and build the uniform grid.
    fn end_frame(&mut self);

    // --- Queries -----------------------------------------------------------

    /// Every hit along the ray within `max_t` whose layer intersects `mask`,
    /// triggers included, ordered by `FrameId`.
    fn raycast_all(&self, origin: Vec2, dir: Vec2, mask: LayerMask, max_t: f32) -> Vec<RayHit>;

    /// Closest hit of [`PhysicsWorldApi::raycast_all`], trigger or not.
    fn raycast(&self, origin: Vec2, dir: Vec2, mask: LayerMask, max_t: f32) -> Option<RayHit>;
}

/// Ray primitive tests.
///
/// `dir` is expected normalized, so `toi` is a distance.
pub trait NarrowphaseApi {
    fn ray_aabb(origin: Vec2, dir: Vec2, aabb_min: Vec2, aabb_max: Vec2) -> Option<SweepHit>;
    fn ray_circle(origin: Vec2, dir: Vec2, center: Vec2, r: f32) -> Option<SweepHit>;
    fn ray_segment(origin: Vec2, dir: Vec2, a: Vec2, b: Vec2) -> Option<SweepHit>;
}

/// Collision query capability consumed by the controller.
///
/// Returns the closest **solid** surface along the ray, or `None` if nothing solid
/// intersects within `max_distance`.
pub trait CollisionQuery {
    fn cast(
        &self,
        origin: Vec2,
        direction: Vec2,
        max_distance: f32,
        mask: LayerMask,
    ) -> Option<ContactInfo>;
}
