use glam::Vec2;
use kinebonk::*;

const DT: f32 = 1.0 / 60.0;
const EPS: f32 = 1e-4;

const GROUND: LayerMask = LayerMask::bit(0);
const WALL: LayerMask = LayerMask::bit(1);
const OBSTACLE: LayerMask = LayerMask::bit(3);

fn world(build: impl FnOnce(&mut PhysicsWorld)) -> PhysicsWorld {
    let mut w = PhysicsWorld::new(WorldConfig::default());
    w.begin_frame();
    build(&mut w);
    w.end_frame();
    w
}

fn push_floor(w: &mut PhysicsWorld) {
    w.push_aabb(Vec2::new(0.0, -0.5), Vec2::new(50.0, 0.5), GROUND, None);
}

fn slope_normal(deg: f32) -> Vec2 {
    let r = deg.to_radians();
    Vec2::new(-r.sin(), r.cos())
}

/// Stepper resting on the floor at `x`.
fn grounded_at(w: &PhysicsWorld, config: ControllerConfig, x: f32) -> PhysicsStepper {
    let mut s = PhysicsStepper::new(config, Vec2::ZERO).unwrap();
    assert!(s.spawn_at(w, Vec2::new(x, 0.0)));
    s
}

fn airborne_at(config: ControllerConfig, position: Vec2, velocity: Vec2) -> PhysicsStepper {
    let mut s = PhysicsStepper::new(config, position).unwrap();
    s.body_mut().velocity = velocity;
    s
}

#[test]
fn velocity_never_exceeds_max_speed() {
    let empty = world(|_| {});
    for v in [
        Vec2::new(30.0, 40.0),
        Vec2::new(-100.0, 0.0),
        Vec2::new(0.0, -16.0),
        Vec2::new(14.0, 14.0),
    ] {
        let mut s = airborne_at(ControllerConfig::default(), Vec2::ZERO, v);
        for _ in 0..5 {
            let out = s.tick(&empty, &InputSnapshot::run(1.0), DT);
            assert!(out.velocity.length() <= 15.0 + EPS, "{:?}", out.velocity);
        }
    }

    let floor = world(push_floor);
    let mut s = grounded_at(&floor, ControllerConfig::default(), 0.0);
    s.body_mut().velocity.x = 40.0;
    let out = s.tick(&floor, &InputSnapshot::idle(), DT);
    assert!(out.velocity.length() <= 15.0 + EPS);
    assert!(out.grounded);
}

#[test]
fn running_on_flat_ground_reaches_top_speed() {
    let floor = world(push_floor);
    let mut s = grounded_at(&floor, ControllerConfig::default(), 0.0);
    let mut out = s.output();
    for _ in 0..60 {
        out = s.tick(&floor, &InputSnapshot::run(1.0), DT);
        assert!(out.grounded);
        assert!(s.body().position.y.abs() < EPS);
    }
    assert!((out.velocity.x - 10.0).abs() < EPS);
    assert_eq!(out.state, StateKind::Normal);
    assert_eq!(out.facing, Facing::Right);
    assert!((out.run_animation_multiplier - 2.0).abs() < EPS);
}

#[test]
fn turning_around_at_speed_enters_brake_with_kick() {
    let floor = world(push_floor);
    let mut s = grounded_at(&floor, ControllerConfig::default(), 0.0);
    s.body_mut().velocity.x = 5.0;

    let out = s.tick(&floor, &InputSnapshot::run(-1.0), DT);
    assert_eq!(out.state, StateKind::Brake);
    assert_eq!(out.velocity.x, -0.1);
    assert_eq!(out.facing, Facing::Left);
    assert!(out.grounded);
}

#[test]
fn brake_request_is_dropped_when_unregistered() {
    let floor = world(push_floor);
    let machine = StateMachine::with_states(
        &[StateKind::Normal, StateKind::Jump, StateKind::Fall],
        StateKind::Normal,
    )
    .unwrap();
    let mut s = PhysicsStepper::with_state_machine(ControllerConfig::default(), Vec2::ZERO, machine).unwrap();
    assert!(s.spawn_at(&floor, Vec2::ZERO));
    s.body_mut().velocity.x = 5.0;

    let out = s.tick(&floor, &InputSnapshot::run(-1.0), DT);
    assert_eq!(out.state, StateKind::Normal);
    assert_eq!(out.velocity.x, -0.1);
}

#[test]
fn unregistered_initial_state_is_rejected() {
    let err = StateMachine::with_states(&[StateKind::Normal], StateKind::Fall).unwrap_err();
    assert_eq!(err, ConfigError::UnregisteredInitialState { state: StateKind::Fall });
}

#[test]
fn jump_press_sets_impulse_and_locks() {
    let floor = world(push_floor);
    let mut s = grounded_at(&floor, ControllerConfig::default(), 0.0);
    let mut sampler = InputSampler::new();

    let out = s.tick(&floor, &sampler.sample(0.0, 0.0, true), DT);
    assert_eq!(out.state, StateKind::Jump);
    assert_eq!(out.velocity.y, 12.0);
    assert!(!out.grounded);
    // Locked on entry, then counted down by this tick's jump-edge step
    assert!((s.body().jump_lock_timer - (0.2 - DT)).abs() < 1e-6);
}

#[test]
fn releasing_jump_clamps_once() {
    let empty = world(|_| {});
    let floor = world(push_floor);
    let mut s = grounded_at(&floor, ControllerConfig::default(), 0.0);
    let mut sampler = InputSampler::new();

    s.tick(&floor, &sampler.sample(0.0, 0.0, true), DT);
    let out = s.tick(&empty, &sampler.sample(0.0, 0.0, true), DT);
    assert!((out.velocity.y - (12.0 - 25.0 * DT)).abs() < EPS);

    let out = s.tick(&empty, &sampler.sample(0.0, 0.0, false), DT);
    assert_eq!(out.state, StateKind::Jump);
    assert_eq!(out.velocity.y, 1.0);

    // Still ascending fast: a later release in the same jump leaves it alone
    s.body_mut().velocity.y = 5.0;
    s.tick(&empty, &sampler.sample(0.0, 0.0, true), DT);
    let out = s.tick(&empty, &sampler.sample(0.0, 0.0, false), DT);
    assert!((out.velocity.y - (5.0 - 2.0 * 25.0 * DT)).abs() < EPS);
}

#[test]
fn full_jump_returns_to_normal() {
    let floor = world(push_floor);
    let mut s = grounded_at(&floor, ControllerConfig::default(), 0.0);
    let mut sampler = InputSampler::new();

    let mut landed_at = None;
    for frame in 0..200 {
        let out = s.tick(&floor, &sampler.sample(0.0, 0.0, frame < 5), DT);
        assert!(out.velocity.length() <= 15.0 + EPS);
        assert!(s.body().jump_lock_timer >= 0.0);
        if frame > 0 && out.grounded {
            landed_at = Some(frame);
            break;
        }
    }
    assert!(landed_at.is_some());
    assert!(s.body().position.y.abs() < EPS);

    let out = s.tick(&floor, &sampler.sample(0.0, 0.0, false), DT);
    assert_eq!(out.state, StateKind::Normal);
    assert!(s.body().can_jump());
}

#[test]
fn slow_body_falls_off_steep_slope() {
    let empty = world(|_| {});
    let mut s = PhysicsStepper::new(ControllerConfig::default(), Vec2::ZERO).unwrap();
    let body = s.body_mut();
    body.grounded = true;
    body.up = slope_normal(70.0);
    body.velocity = Vec2::new(1.0, 0.0);

    let out = s.tick(&empty, &InputSnapshot::idle(), DT);
    assert!(!out.grounded);
    assert_eq!(out.up, Vec2::Y);
    assert_eq!(out.state, StateKind::Fall);
}

#[test]
fn steep_wall_stops_grounded_body_at_margin() {
    let w = world(|w| {
        push_floor(w);
        w.push_aabb(Vec2::new(1.5, 1.0), Vec2::new(0.5, 1.0), WALL, None);
    });
    let mut s = grounded_at(&w, ControllerConfig::default(), 0.7);
    s.body_mut().velocity.x = 5.0;

    let out = s.tick(&w, &InputSnapshot::run(1.0), DT);
    assert_eq!(out.velocity.x, 0.0);
    assert_eq!(out.wall_normal, Vec2::NEG_X);
    assert!(out.grounded);
    let gap = 1.0 - s.body().position.x;
    assert!((gap - (0.25 + 0.01)).abs() < 1e-5, "gap {gap}");
}

#[test]
fn shallow_wall_is_walked_onto() {
    let w = world(|w| {
        push_floor(w);
        w.push_segment(Vec2::new(1.0, 0.0), Vec2::new(3.0, 1.0), WALL, None);
    });
    let mut s = grounded_at(&w, ControllerConfig::default(), 1.7);
    s.body_mut().velocity.x = 5.0;

    let out = s.tick(&w, &InputSnapshot::run(1.0), DT);
    assert!(out.velocity.x > 5.0);
    assert!(out.wall_normal.dot(Vec2::Y) >= 0.7);
}

#[test]
fn airborne_body_is_stopped_by_any_wall() {
    let w = world(|w| {
        w.push_aabb(Vec2::new(1.5, 5.0), Vec2::new(0.5, 1.0), WALL, None);
    });
    let mut s = airborne_at(ControllerConfig::default(), Vec2::new(0.7, 4.5), Vec2::new(5.0, 0.0));
    let out = s.tick(&w, &InputSnapshot::idle(), DT);
    assert_eq!(out.velocity.x, 0.0);
    assert!((s.body().position.x - 0.74).abs() < 1e-5);
}

#[test]
fn obstacle_contact_bounces_back() {
    let w = world(|w| {
        push_floor(w);
        w.push_aabb(Vec2::new(1.5, 0.5), Vec2::new(0.5, 0.5), OBSTACLE, Some(99));
    });
    let mut s = grounded_at(&w, ControllerConfig::default(), 0.7);
    s.body_mut().velocity.x = 5.0;

    let out = s.tick(&w, &InputSnapshot::run(1.0), DT);
    let expected = -(5.0 + 20.0 * DT) * 0.5;
    assert!((out.velocity.x - expected).abs() < EPS);
    assert!((s.body().position.x - (1.0 - 0.26 - 0.1)).abs() < 1e-5);
    assert_eq!(out.wall_normal, Vec2::ZERO);
}

#[test]
fn wall_behind_body_is_ignored() {
    let w = world(|w| {
        push_floor(w);
        w.push_aabb(Vec2::new(-0.5, 1.0), Vec2::new(0.5, 1.0), WALL, None);
    });
    let mut s = grounded_at(&w, ControllerConfig::default(), 0.26);
    s.body_mut().velocity.x = 3.0;
    let out = s.tick(&w, &InputSnapshot::run(1.0), DT);
    assert!(out.velocity.x > 3.0);
    assert_eq!(out.wall_normal, Vec2::ZERO);
}

#[test]
fn ceiling_stops_upward_motion() {
    let w = world(|w| {
        w.push_aabb(Vec2::new(0.0, 3.5), Vec2::new(5.0, 0.5), GROUND, None);
    });
    let mut s = airborne_at(ControllerConfig::default(), Vec2::new(0.0, 1.9), Vec2::new(0.0, 10.0));

    let out = s.tick(&w, &InputSnapshot::idle(), DT);
    assert_eq!(out.velocity.y, 0.0);
    assert_eq!(out.ceiling_normal, Vec2::NEG_Y);
    assert!((s.body().position.y - 2.0).abs() < 1e-5);
    assert!(!out.grounded);
}

fn sloped_ceiling(w: &mut PhysicsWorld) {
    w.push_segment(Vec2::new(-3.0, 4.0), Vec2::new(3.0, 1.0), GROUND, None);
}

#[test]
fn shallow_ceiling_is_reacquired_as_ground() {
    let w = world(sloped_ceiling);
    let mut cfg = ControllerConfig::default();
    cfg.tunables.allow_ceiling_reacquisition = true;
    cfg.tunables.min_ceiling_angle = 170.0;
    let mut s = airborne_at(cfg, Vec2::new(0.0, 1.5), Vec2::new(0.0, 10.0));

    let out = s.tick(&w, &InputSnapshot::idle(), DT);
    assert!(out.grounded);
    assert_eq!(out.velocity.y, 0.0);
    assert!(out.up.y < 0.0);
    assert!((out.up - out.ceiling_normal).length() < 1e-5);
    assert!((out.up.length() - 1.0).abs() < 1e-5);
}

#[test]
fn ceiling_is_a_hard_stop_without_reacquisition() {
    let w = world(sloped_ceiling);
    let mut s = airborne_at(ControllerConfig::default(), Vec2::new(0.0, 1.5), Vec2::new(0.0, 10.0));

    let out = s.tick(&w, &InputSnapshot::idle(), DT);
    assert!(!out.grounded);
    assert_eq!(out.velocity.y, 0.0);
    assert!((s.body().position.y - 1.5).abs() < 1e-4);
}

#[test]
fn landing_on_slope_keeps_tangent_speed() {
    let n = slope_normal((0.5f32).atan().to_degrees());
    let w = world(|w| {
        w.push_segment(Vec2::new(-5.0, -2.5), Vec2::new(5.0, 2.5), GROUND, None);
    });
    let mut s = airborne_at(ControllerConfig::default(), Vec2::new(0.0, 0.1), Vec2::new(0.0, -5.0));

    let out = s.tick(&w, &InputSnapshot::idle(), DT);
    assert!(out.grounded);
    assert_eq!(out.velocity.y, 0.0);
    assert!((out.up - n).length() < 1e-4);
    let right = Vec2::new(n.y, -n.x);
    let expected = Vec2::new(0.0, -5.0 - 25.0 * DT).dot(right);
    assert!((out.velocity.x - expected).abs() < EPS);
    assert!((s.body().position.y - 0.125).abs() < 1e-4);
}

#[test]
fn landing_without_ground_rotation_keeps_world_up() {
    let w = world(|w| {
        w.push_segment(Vec2::new(-5.0, -2.5), Vec2::new(5.0, 2.5), GROUND, None);
    });
    let mut cfg = ControllerConfig::default();
    cfg.tunables.rotate_to_ground = false;
    let mut s = airborne_at(cfg, Vec2::new(0.0, 0.1), Vec2::new(0.0, -5.0));

    let out = s.tick(&w, &InputSnapshot::idle(), DT);
    assert!(out.grounded);
    assert_eq!(out.up, Vec2::Y);
}

#[test]
fn walking_off_a_ledge_ungrounds() {
    let w = world(|w| {
        w.push_aabb(Vec2::new(-5.0, -0.5), Vec2::new(5.0, 0.5), GROUND, None);
    });
    let mut s = grounded_at(&w, ControllerConfig::default(), -1.0);
    let mut out = s.output();
    for _ in 0..60 {
        out = s.tick(&w, &InputSnapshot::run(1.0), DT);
        if !out.grounded {
            break;
        }
    }
    assert!(!out.grounded);
    assert!(s.body().position.x > 0.0);
    assert_eq!(out.up, Vec2::Y);
}

/// Flat ground up to x = 0, then a ramp rising at 1:2.
fn flat_then_ramp(w: &mut PhysicsWorld) {
    w.push_aabb(Vec2::new(-25.0, -0.5), Vec2::new(25.0, 0.5), GROUND, None);
    w.push_segment(Vec2::ZERO, Vec2::new(10.0, 5.0), GROUND, None);
}

#[test]
fn running_onto_ramp_aligns_up_while_grounded() {
    let ramp = slope_normal((0.5f32).atan().to_degrees());
    let w = world(flat_then_ramp);
    let mut s = grounded_at(&w, ControllerConfig::default(), -1.0);

    let mut tilted = false;
    let mut out = s.output();
    for _ in 0..120 {
        out = s.tick(&w, &InputSnapshot::run(1.0), DT);
        assert!(out.grounded, "left the ground at {:?}", s.body().position);
        // Straddling the seam averages the flat and ramp normals
        if out.up != Vec2::Y && (out.up - ramp).length() > 1e-3 {
            tilted = true;
        }
        if s.body().position.x > 3.0 {
            break;
        }
    }
    assert!(tilted);
    assert!(s.body().position.x > 3.0);
    assert!((out.up - ramp).length() < 1e-3, "up {:?}", out.up);
    let p = s.body().position;
    assert!((p.y - 0.5 * p.x).abs() < 1e-3, "{p:?}");
}

#[test]
fn ramp_without_ground_rotation_keeps_world_up() {
    let w = world(flat_then_ramp);
    let mut cfg = ControllerConfig::default();
    cfg.tunables.rotate_to_ground = false;
    let mut s = grounded_at(&w, cfg, -1.0);

    for _ in 0..120 {
        let out = s.tick(&w, &InputSnapshot::run(1.0), DT);
        assert!(out.grounded);
        assert_eq!(out.up, Vec2::Y);
        if s.body().position.x > 3.0 {
            break;
        }
    }
    let p = s.body().position;
    assert!(p.x > 3.0);
    assert!((p.y - 0.5 * p.x).abs() < 1e-3, "{p:?}");
}

#[test]
fn disagreeing_edge_rays_leave_up_untouched() {
    let w = world(|w| {
        push_floor(w);
        w.push_segment(Vec2::ZERO, Vec2::new(2.0, 2.0 * 3f32.sqrt()), GROUND, None);
    });
    let cfg = ControllerConfig::default();
    let detector = GroundDetector::new(cfg.bounds);
    let mut s = grounded_at(&w, cfg, -0.3);

    let mut straddled = 0;
    for _ in 0..30 {
        let out = s.tick(&w, &InputSnapshot::run(1.0), DT);
        assert!(out.grounded);
        assert_eq!(out.up, Vec2::Y);
        let contact = detector.probe(&w, s.body(), Vec2::NEG_Y, GROUND).unwrap();
        if !contact.snap {
            straddled += 1;
            // An unsnapped contact must not let the body sink into the floor
            assert!(s.body().position.y.abs() < 1e-6, "{:?}", s.body().position);
        }
        if s.body().position.x > 0.1 {
            break;
        }
    }
    assert!(straddled > 0);
}
