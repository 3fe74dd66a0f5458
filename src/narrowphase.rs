use glam::Vec2;

use crate::api::NarrowphaseApi;
use crate::types::*;

/// Narrowphase ray primitives.
pub struct Narrowphase;

/// One slab of the slab method. Narrows `[tmin, tmax]` and tracks the entering normal.
/// Returns `false` once the interval is empty.
#[allow(clippy::too_many_arguments)]
fn clip_slab(
    origin: f32,
    dir: f32,
    lo: f32,
    hi: f32,
    axis: Vec2,
    tmin: &mut f32,
    tmax: &mut f32,
    n_enter: &mut Vec2,
) -> bool {
    if dir.abs() < f32::EPSILON {
        return origin >= lo && origin <= hi;
    }
    let inv = 1.0 / dir;
    let mut t1 = (lo - origin) * inv;
    let mut t2 = (hi - origin) * inv;
    let mut sign = -1.0;
    if t1 > t2 {
        core::mem::swap(&mut t1, &mut t2);
        sign = 1.0;
    }
    if t1 > *tmin {
        *tmin = t1;
        *n_enter = axis * sign;
    }
    if t2 < *tmax {
        *tmax = t2;
    }
    *tmin <= *tmax
}

impl NarrowphaseApi for Narrowphase {
    fn ray_aabb(origin: Vec2, dir: Vec2, aabb_min: Vec2, aabb_max: Vec2) -> Option<SweepHit> {
        let mut tmin = f32::NEG_INFINITY;
        let mut tmax = f32::INFINITY;
        let mut n_enter = Vec2::ZERO;

        if !clip_slab(origin.x, dir.x, aabb_min.x, aabb_max.x, Vec2::X, &mut tmin, &mut tmax, &mut n_enter) {
            return None;
        }
        if !clip_slab(origin.y, dir.y, aabb_min.y, aabb_max.y, Vec2::Y, &mut tmin, &mut tmax, &mut n_enter) {
            return None;
        }
        // Box entirely behind the ray
        if tmax < 0.0 {
            return None;
        }

        // Origin inside: immediate hit with undefined normal
        let (toi, normal) = if tmin < 0.0 { (0.0, Vec2::ZERO) } else { (tmin, n_enter) };
        Some(SweepHit {
            toi,
            normal,
            contact: origin + dir * toi,
        })
    }

    fn ray_circle(origin: Vec2, dir: Vec2, center: Vec2, r: f32) -> Option<SweepHit> {
        // Solve ||origin + t*dir - center||^2 = r^2 for t >= 0
        let m = origin - center;
        let a = dir.length_squared();
        if a == 0.0 {
            return None;
        }
        let c = m.length_squared() - r * r;
        if c <= 0.0 {
            return Some(SweepHit {
                toi: 0.0,
                normal: Vec2::ZERO,
                contact: origin,
            });
        }
        let b = 2.0 * m.dot(dir);
        let disc = b * b - 4.0 * a * c;
        if disc < 0.0 {
            return None;
        }
        let t = (-b - disc.sqrt()) / (2.0 * a);
        if t < 0.0 {
            return None;
        }
        let contact = origin + dir * t;
        Some(SweepHit {
            toi: t,
            normal: (contact - center).normalize_or_zero(),
            contact,
        })
    }

    fn ray_segment(origin: Vec2, dir: Vec2, a: Vec2, b: Vec2) -> Option<SweepHit> {
        // origin + t*dir = a + s*e, t >= 0, s in [0,1]
        let e = b - a;
        let denom = dir.perp_dot(e);
        if denom.abs() < f32::EPSILON {
            // Parallel or degenerate segment
            return None;
        }
        let w = a - origin;
        let t = w.perp_dot(e) / denom;
        let s = w.perp_dot(dir) / denom;
        if t < 0.0 || !(0.0..=1.0).contains(&s) {
            return None;
        }
        let mut normal = e.perp().normalize_or_zero();
        if normal.dot(dir) > 0.0 {
            normal = -normal;
        }
        Some(SweepHit {
            toi: t,
            normal,
            contact: origin + dir * t,
        })
    }
}
