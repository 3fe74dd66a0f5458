use glam::Vec2;

use std::collections::{HashMap, HashSet};

use crate::api::{NarrowphaseApi, PhysicsWorldApi};
use crate::narrowphase::Narrowphase;
use crate::types::*;

/// Ephemeral collision world: the host rebuilds it every frame and the controller
/// queries it with rays.
pub struct PhysicsWorld {
    pub cfg: WorldConfig,
    pub frame_counter: u32,

    // Frame-local storage
    entries: Vec<ColliderDesc>,
    aabbs: Vec<(Vec2, Vec2)>, // (min, max) per entry

    // Uniform grid: cell coord -> list of indices into `entries`
    grid: HashMap<(i32, i32), Vec<usize>>,
}

impl PhysicsWorldApi for PhysicsWorld {
    fn new(cfg: WorldConfig) -> Self {
        Self {
            cfg,
            frame_counter: 0,
            entries: Vec::new(),
            aabbs: Vec::new(),
            grid: HashMap::new(),
        }
    }

    fn begin_frame(&mut self) {
        self.entries.clear();
        self.aabbs.clear();
        self.grid.clear();
        self.frame_counter = self.frame_counter.wrapping_add(1);
    }

    fn push(&mut self, desc: ColliderDesc) -> FrameId {
        let id = FrameId(self.entries.len() as u32);
        self.entries.push(desc);
        id
    }

    fn push_aabb(
        &mut self,
        center: Vec2,
        half_extents: Vec2,
        layer: LayerMask,
        user_key: Option<ColKey>,
    ) -> FrameId {
        self.push(ColliderDesc {
            kind: ColliderKind::Aabb { half_extents },
            center,
            layer,
            trigger: false,
            user_key,
        })
    }

    fn push_circle(
        &mut self,
        center: Vec2,
        radius: f32,
        layer: LayerMask,
        user_key: Option<ColKey>,
    ) -> FrameId {
        self.push(ColliderDesc {
            kind: ColliderKind::Circle { radius },
            center,
            layer,
            trigger: false,
            user_key,
        })
    }

    fn push_segment(
        &mut self,
        a: Vec2,
        b: Vec2,
        layer: LayerMask,
        user_key: Option<ColKey>,
    ) -> FrameId {
        self.push(ColliderDesc {
            kind: ColliderKind::Segment { half_delta: (b - a) * 0.5 },
            center: (a + b) * 0.5,
            layer,
            trigger: false,
            user_key,
        })
    }

    fn end_frame(&mut self) {
        self.aabbs = self.entries.iter().map(Self::bounds_of).collect();
        let cs = self.cell_size();
        for (idx, &(min, max)) in self.aabbs.iter().enumerate() {
            let (ix0, iy0) = Self::world_to_cell(min, cs);
            let (ix1, iy1) = Self::world_to_cell(max, cs);
            for iy in iy0..=iy1 {
                for ix in ix0..=ix1 {
                    self.grid.entry((ix, iy)).or_default().push(idx);
                }
            }
        }
    }

    fn raycast_all(&self, origin: Vec2, dir: Vec2, mask: LayerMask, max_t: f32) -> Vec<RayHit> {
        let mut out = Vec::new();
        let dir = dir.normalize_or_zero();
        if dir == Vec2::ZERO || max_t.is_nan() || max_t < 0.0 {
            return out;
        }
        let mut tested: HashSet<usize> = HashSet::new();
        let walk = GridWalk::new(origin, dir, self.cell_size(), max_t).take(self.cfg.max_ray_steps);
        for cell in walk {
            let Some(list) = self.grid.get(&cell) else {
                continue;
            };
            for &idx in list {
                let e = &self.entries[idx];
                if !mask.intersects(e.layer) || !tested.insert(idx) {
                    continue;
                }
                match self.ray_entry(idx, origin, dir) {
                    Some(h) if h.toi <= max_t => out.push(RayHit {
                        id: FrameId(idx as u32),
                        key: e.user_key,
                        layer: e.layer,
                        trigger: e.trigger,
                        hit: h,
                    }),
                    _ => {}
                }
            }
        }

        out.sort_by_key(|h| h.id);
        out
    }

    fn raycast(&self, origin: Vec2, dir: Vec2, mask: LayerMask, max_t: f32) -> Option<RayHit> {
        self.raycast_all(origin, dir, mask, max_t)
            .into_iter()
            .fold(None, |best: Option<RayHit>, h| match best {
                Some(b) if h.hit.toi >= b.hit.toi => Some(b),
                _ => Some(h),
            })
    }
}

/// Grid cells crossed by a ray, nearest first, up to distance `max_t` (2D DDA).
struct GridWalk {
    cell: (i32, i32),
    step: (i32, i32),
    // Ray distance to the next x / y cell boundary
    t_next: Vec2,
    t_delta: Vec2,
    t_entry: f32,
    max_t: f32,
}

impl GridWalk {
    fn new(origin: Vec2, dir: Vec2, cs: f32, max_t: f32) -> Self {
        let cell = PhysicsWorld::world_to_cell(origin, cs);
        let axis = |o: f32, d: f32, c: i32| -> (i32, f32, f32) {
            if d > 0.0 {
                (1, ((c + 1) as f32 * cs - o) / d, cs / d)
            } else if d < 0.0 {
                (-1, (c as f32 * cs - o) / d, -cs / d)
            } else {
                (0, f32::INFINITY, f32::INFINITY)
            }
        };
        let (sx, nx, dx) = axis(origin.x, dir.x, cell.0);
        let (sy, ny, dy) = axis(origin.y, dir.y, cell.1);
        Self {
            cell,
            step: (sx, sy),
            t_next: Vec2::new(nx, ny),
            t_delta: Vec2::new(dx, dy),
            t_entry: 0.0,
            max_t,
        }
    }
}

impl Iterator for GridWalk {
    type Item = (i32, i32);

    fn next(&mut self) -> Option<Self::Item> {
        if self.t_entry > self.max_t {
            return None;
        }
        let current = self.cell;
        if self.t_next.x < self.t_next.y {
            self.cell.0 += self.step.0;
            self.t_entry = self.t_next.x;
            self.t_next.x += self.t_delta.x;
        } else {
            self.cell.1 += self.step.1;
            self.t_entry = self.t_next.y;
            self.t_next.y += self.t_delta.y;
        }
        Some(current)
    }
}

impl PhysicsWorld {
    fn cell_size(&self) -> f32 {
        self.cfg.cell_size.max(1e-5)
    }

    fn bounds_of(e: &ColliderDesc) -> (Vec2, Vec2) {
        let half = match e.kind {
            ColliderKind::Aabb { half_extents } => half_extents,
            ColliderKind::Circle { radius } => Vec2::splat(radius),
            ColliderKind::Segment { half_delta } => half_delta.abs(),
        };
        (e.center - half, e.center + half)
    }

    fn world_to_cell(p: Vec2, cs: f32) -> (i32, i32) {
        ((p.x / cs).floor() as i32, (p.y / cs).floor() as i32)
    }

    fn ray_entry(&self, idx: usize, origin: Vec2, dir: Vec2) -> Option<SweepHit> {
        let e = &self.entries[idx];
        match e.kind {
            ColliderKind::Aabb { .. } => {
                let (min, max) = self.aabbs[idx];
                Narrowphase::ray_aabb(origin, dir, min, max)
            }
            ColliderKind::Circle { radius } => Narrowphase::ray_circle(origin, dir, e.center, radius),
            ColliderKind::Segment { half_delta } => {
                Narrowphase::ray_segment(origin, dir, e.center - half_delta, e.center + half_delta)
            }
        }
    }

    /// Collider description by frame-local handle.
    pub fn collider(&self, id: FrameId) -> Option<&ColliderDesc> {
        self.entries.get(id.0 as usize)
    }

    /// Return debug stats for the current built frame.
    pub fn debug_stats(&self) -> WorldStats {
        WorldStats {
            entries: self.entries.len(),
            cells: self.grid.len(),
            triggers: self.entries.iter().filter(|e| e.trigger).count(),
        }
    }
}
