use glam::Vec2;
use serde::{Deserialize, Serialize};

/// User-defined opaque key carried through query results (e.g., pack your entity id).
pub type ColKey = u64;

/// Bitmask-based layer filtering.
///
/// Colliders carry the layer bit(s) they belong to; queries carry the set of layers
/// they want to see. A query sees a collider iff the two sets intersect.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LayerMask(pub u32);

impl LayerMask {
    pub const NONE: LayerMask = LayerMask(0);
    pub const ALL: LayerMask = LayerMask(u32::MAX);

    /// Mask with the single layer `n` set (`n` is taken modulo 32).
    pub const fn bit(n: u32) -> Self {
        Self(1 << (n % 32))
    }

    pub fn intersects(self, other: LayerMask) -> bool {
        (self.0 & other.0) != 0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl core::ops::BitOr for LayerMask {
    type Output = LayerMask;

    fn bitor(self, rhs: Self) -> Self::Output {
        LayerMask(self.0 | rhs.0)
    }
}

/// Supported collider shapes.
#[derive(Copy, Clone, Debug)]
pub enum ColliderKind {
    /// Centered axis-aligned box (half extents along X/Y).
    Aabb { half_extents: Vec2 },
    /// Centered circle.
    Circle { radius: f32 },
    /// Line segment from `center - half_delta` to `center + half_delta`.
    /// Two-sided: the reported normal always faces the incoming ray.
    Segment { half_delta: Vec2 },
}

/// One collider instance to be considered for **this frame**.
#[derive(Copy, Clone, Debug)]
pub struct ColliderDesc {
    pub kind: ColliderKind,
    pub center: Vec2,
    pub layer: LayerMask,
    /// Non-solid surface. Reported by raw queries, skipped by contact probes.
    pub trigger: bool,
    /// Optional user key echoed in query results.
    pub user_key: Option<ColKey>,
}

/// Ray impact against a single primitive.
#[derive(Copy, Clone, Debug)]
pub struct SweepHit {
    /// Distance along the (normalized) ray where the impact occurs.
    pub toi: f32,
    /// Surface normal at impact, facing the ray origin. `(0,0)` if the ray starts inside.
    pub normal: Vec2,
    /// Impact point.
    pub contact: Vec2,
}

/// Frame-local handle for colliders inserted this frame.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FrameId(pub u32);

/// One raw raycast result from the world.
#[derive(Copy, Clone, Debug)]
pub struct RayHit {
    pub id: FrameId,
    pub key: Option<ColKey>,
    pub layer: LayerMask,
    pub trigger: bool,
    pub hit: SweepHit,
}

/// Opaque reference to the surface a contact was made with.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct SurfaceRef {
    pub id: FrameId,
    pub key: Option<ColKey>,
    pub layer: LayerMask,
}

/// Solid surface contact, produced fresh by every probe query.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ContactInfo {
    pub point: Vec2,
    /// Unit surface normal.
    pub normal: Vec2,
    /// Distance from the ray origin to `point`.
    pub distance: f32,
    pub surface: SurfaceRef,
    /// True iff both edge probes agreed on the surface orientation.
    pub snap: bool,
}

/// World-level configuration for the ephemeral collision world.
#[derive(Clone, Debug)]
pub struct WorldConfig {
    /// Grid cell size in world units (typ. 1–4 for tile-sized platforms).
    pub cell_size: f32,
    /// Upper bound on grid cells visited by one raycast.
    pub max_ray_steps: usize,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            cell_size: 1.0,
            max_ray_steps: 10_000,
        }
    }
}

/// Debug statistics for a built frame.
#[derive(Copy, Clone, Debug, Default)]
pub struct WorldStats {
    pub entries: usize,
    pub cells: usize,
    pub triggers: usize,
}
