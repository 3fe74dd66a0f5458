use glam::Vec2;
use kinebonk::*;

const DT: f32 = 1.0 / 60.0;

fn build(world: &mut PhysicsWorld, layers: &CollisionLayers) {
    world.begin_frame();
    // Flat run-up, a ramp, a plateau and a wall at its end
    world.push_aabb(Vec2::new(0.0, -0.5), Vec2::new(5.0, 0.5), layers.ground, Some(1));
    world.push_segment(Vec2::new(5.0, 0.0), Vec2::new(10.0, 2.0), layers.ground, Some(2));
    world.push_aabb(Vec2::new(13.0, 1.5), Vec2::new(3.0, 0.5), layers.ground, Some(3));
    world.push_aabb(Vec2::new(15.0, 3.0), Vec2::new(0.5, 1.0), layers.wall, Some(4));
    world.end_frame();
}

fn main() {
    let config = ControllerConfig::default();
    let layers = config.layers;
    let mut world = PhysicsWorld::new(WorldConfig::default());
    let mut stepper = match PhysicsStepper::new(config, Vec2::ZERO) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("invalid config: {e}");
            return;
        }
    };
    let mut sampler = InputSampler::new();

    build(&mut world, &layers);
    let landed = stepper.spawn_at(&world, Vec2::new(-4.0, 0.05));
    println!("spawned grounded={landed} at {:?}", stepper.body().position);

    for frame in 0..180 {
        // Host rebuilds its world every frame
        build(&mut world, &layers);
        let jump = (150..160).contains(&frame);
        let input = sampler.sample(1.0, 0.0, jump);
        let out = stepper.tick(&world, &input, DT);
        if frame % 10 == 0 || input.jump_down {
            let p = stepper.body().position;
            println!(
                "frame={frame:3} state={:?} pos=({:.2},{:.2}) v=({:.2},{:.2}) grounded={} angle={:.1} wall=({:.1},{:.1})",
                out.state,
                p.x,
                p.y,
                out.world_velocity.x,
                out.world_velocity.y,
                out.grounded,
                out.display_angle,
                out.wall_normal.x,
                out.wall_normal.y,
            );
        }
    }
}
