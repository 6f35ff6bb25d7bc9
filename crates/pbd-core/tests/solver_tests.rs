use glam::{Quat, Vec3};
use pbd_core::{ParticleGroupDesc, Plane, RigidBodyDesc, SceneDescription, Solver};

const DT: f32 = 1.0 / 60.0;

fn boxed_scene(radius: f32) -> SceneDescription {
    SceneDescription {
        max_particles: 4096,
        max_rigid_bodies: 8,
        particle_radius: radius,
        bounds_min: Vec3::new(-1.5, -0.5, -1.5),
        bounds_max: Vec3::new(1.5, 2.0, 1.5),
        planes: vec![
            Plane::ground(),
            Plane::new(Vec3::new(-1.0, 0.0, 0.0), Vec3::X),
            Plane::new(Vec3::new(1.0, 0.0, 0.0), Vec3::NEG_X),
            Plane::new(Vec3::new(0.0, 0.0, -1.0), Vec3::Z),
            Plane::new(Vec3::new(0.0, 0.0, 1.0), Vec3::NEG_Z),
        ],
        ..SceneDescription::default()
    }
}

fn particle_block(origin: Vec3, nx: usize, ny: usize, nz: usize, spacing: f32) -> Vec<Vec3> {
    let mut positions = Vec::new();
    for ix in 0..nx {
        for iy in 0..ny {
            for iz in 0..nz {
                positions.push(
                    origin
                        + Vec3::new(
                            ix as f32 * spacing,
                            iy as f32 * spacing,
                            iz as f32 * spacing,
                        ),
                );
            }
        }
    }
    positions
}

#[test]
fn test_dropped_particle_comes_to_rest_on_ground() {
    let radius = 0.05;
    let mut scene = boxed_scene(radius);
    scene.fluid_groups.push(ParticleGroupDesc {
        positions: vec![Vec3::new(0.0, 1.0, 0.0)],
        mass_per_particle: 1.0,
    });

    let mut solver = Solver::new(&scene).expect("scene fits");
    for _ in 0..60 {
        solver.update(DT);
    }

    let pos = solver.particles.position[0];
    let vel = solver.particles.velocity[0];
    assert!(
        (pos.y - radius).abs() < 0.01,
        "particle should rest at contact height, got y={}",
        pos.y
    );
    assert!(
        vel.y.abs() < 0.05,
        "resting particle should have near-zero vertical velocity, got {}",
        vel.y
    );
}

#[test]
fn test_rigid_box_rests_stably() {
    let radius = 0.05;
    let mut scene = boxed_scene(radius);

    // 2x1x2 block of particles resting exactly at contact height
    let rest = vec![
        Vec3::new(-0.05, 0.0, -0.05),
        Vec3::new(-0.05, 0.0, 0.05),
        Vec3::new(0.05, 0.0, -0.05),
        Vec3::new(0.05, 0.0, 0.05),
    ];
    let spawn: Vec<Vec3> = rest.iter().map(|p| *p + Vec3::new(0.0, radius, 0.0)).collect();
    scene.rigid_bodies.push(RigidBodyDesc {
        positions: spawn.clone(),
        rest_positions: rest,
        mass_per_particle: 1.0,
    });

    let mut solver = Solver::new(&scene).expect("scene fits");
    for _ in 0..120 {
        solver.update(DT);
    }

    let body = &solver.particles.bodies[0];
    let centroid_drift = (body.center_of_mass - Vec3::new(0.0, radius, 0.0)).length();
    assert!(
        centroid_drift < 0.02,
        "resting rigid body drifted by {}",
        centroid_drift
    );
    assert!(
        body.rotation.angle_between(Quat::IDENTITY) < 0.05,
        "resting rigid body rotated by {}",
        body.rotation.angle_between(Quat::IDENTITY)
    );
}

#[test]
fn test_rigid_body_stays_rigid_after_drop() {
    let radius = 0.05;
    let mut scene = boxed_scene(radius);

    let rest = vec![
        Vec3::new(-0.05, -0.05, -0.05),
        Vec3::new(-0.05, -0.05, 0.05),
        Vec3::new(0.05, -0.05, -0.05),
        Vec3::new(0.05, -0.05, 0.05),
        Vec3::new(-0.05, 0.05, -0.05),
        Vec3::new(-0.05, 0.05, 0.05),
        Vec3::new(0.05, 0.05, -0.05),
        Vec3::new(0.05, 0.05, 0.05),
    ];
    let spawn: Vec<Vec3> = rest.iter().map(|p| *p + Vec3::new(0.0, 0.5, 0.0)).collect();
    scene.rigid_bodies.push(RigidBodyDesc {
        positions: spawn,
        rest_positions: rest.clone(),
        mass_per_particle: 1.0,
    });

    let mut solver = Solver::new(&scene).expect("scene fits");
    for _ in 0..90 {
        solver.update(DT);
    }

    // Pairwise distances must survive the fall and landing
    let range = solver.particles.bodies[0].range.clone();
    for i in range.clone() {
        for j in range.clone().skip(i + 1 - range.start) {
            let got = (solver.particles.position[i] - solver.particles.position[j]).length();
            let want = (rest[i - range.start] - rest[j - range.start]).length();
            assert!(
                (got - want).abs() < 0.01,
                "pair ({}, {}): distance {} drifted from reference {}",
                i,
                j,
                got,
                want
            );
        }
    }
}

#[test]
fn test_granular_particle_sleeps_on_ground() {
    let radius = 0.05;
    let mut scene = boxed_scene(radius);
    scene.granular_groups.push(ParticleGroupDesc {
        positions: vec![Vec3::new(0.0, radius, 0.0)],
        mass_per_particle: 1.0,
    });

    let mut solver = Solver::new(&scene).expect("scene fits");
    let start = solver.particles.position[0];
    let mut max_drift = 0.0_f32;
    for _ in 0..600 {
        solver.update(DT);
        max_drift = max_drift.max((solver.particles.position[0] - start).length());
    }

    assert!(
        max_drift < 5.0e-4,
        "sleeping granular particle drifted by {}",
        max_drift
    );
}

#[test]
fn test_zero_force_update_is_identity() {
    let mut scene = boxed_scene(0.05);
    scene.planes.clear();
    scene.granular_groups.push(ParticleGroupDesc {
        positions: vec![Vec3::new(0.3, 0.5, 0.0)],
        mass_per_particle: 1.0,
    });
    scene.fluid_groups.push(ParticleGroupDesc {
        positions: vec![Vec3::new(-0.5, 0.8, 0.2)],
        mass_per_particle: 1.0,
    });

    let mut solver = Solver::new(&scene).expect("scene fits");
    solver.config.gravity = Vec3::ZERO;

    let before_pos: Vec<Vec3> = solver.particles.position[..2].to_vec();
    for _ in 0..10 {
        solver.update(DT);
    }

    for i in 0..2 {
        assert!(
            (solver.particles.position[i] - before_pos[i]).length() < 1e-6,
            "particle {} moved without forces: {:?}",
            i,
            solver.particles.position[i]
        );
        assert!(
            solver.particles.velocity[i].length() < 1e-6,
            "particle {} gained velocity without forces",
            i
        );
    }
}

#[test]
fn test_free_fall_matches_gravity() {
    let mut scene = boxed_scene(0.05);
    scene.planes.clear();
    scene.bounds_min = Vec3::new(-1.0, -3.0, -1.0);
    scene.bounds_max = Vec3::new(1.0, 3.0, 1.0);
    scene.fluid_groups.push(ParticleGroupDesc {
        positions: vec![Vec3::new(0.0, 1.0, 0.0)],
        mass_per_particle: 1.0,
    });

    let mut solver = Solver::new(&scene).expect("scene fits");
    for _ in 0..30 {
        solver.update(DT);
    }

    let t = 30.0 * DT;
    let vel = solver.particles.velocity[0];
    assert!(
        (vel.y - (-9.8 * t)).abs() < 0.01,
        "free-fall velocity should match gravity * t: got {}, want {}",
        vel.y,
        -9.8 * t
    );
    // Sub-stepped semi-implicit Euler lands slightly below the analytic arc
    let analytic = 1.0 - 0.5 * 9.8 * t * t;
    assert!(
        (solver.particles.position[0].y - analytic).abs() < 0.05,
        "free-fall position {} too far from analytic {}",
        solver.particles.position[0].y,
        analytic
    );
}

/// Mean vertical momentum of an isolated blob drifts only through gravity;
/// the internal passes exchange momentum pairwise.
#[test]
fn test_fluid_blob_conserves_momentum_in_free_fall() {
    let mut scene = boxed_scene(0.05);
    scene.planes.clear();
    scene.bounds_min = Vec3::new(-2.0, -3.0, -2.0);
    scene.bounds_max = Vec3::new(2.0, 3.0, 2.0);
    scene.rest_density = 1120.0;
    scene.fluid_groups.push(ParticleGroupDesc {
        positions: particle_block(Vec3::new(-0.1, 0.8, -0.1), 3, 3, 3, 0.1),
        mass_per_particle: 1.0,
    });

    let mut solver = Solver::new(&scene).expect("scene fits");
    for _ in 0..30 {
        solver.update(DT);
    }

    let t = 30.0 * DT;
    let mean_vy: f32 = (0..solver.particles.count)
        .map(|i| solver.particles.velocity[i].y)
        .sum::<f32>()
        / solver.particles.count as f32;
    let expected = -9.8 * t;
    assert!(
        (mean_vy - expected).abs() < 0.05 * expected.abs(),
        "blob momentum drifted: mean v.y {} vs expected {}",
        mean_vy,
        expected
    );
}

#[test]
fn test_fluid_column_collapses_and_stays_contained() {
    let radius = 0.05;
    let mut scene = boxed_scene(radius);
    scene.rest_density = 1120.0;
    // 6x6x6 column, one diameter spacing, standing on the ground
    scene.fluid_groups.push(ParticleGroupDesc {
        positions: particle_block(Vec3::new(-0.25, radius, -0.25), 6, 6, 6, 0.1),
        mass_per_particle: 1.0,
    });

    let mut solver = Solver::new(&scene).expect("scene fits");

    let max_y = |solver: &Solver| -> f32 {
        (0..solver.particles.count)
            .map(|i| solver.particles.position[i].y)
            .fold(f32::MIN, f32::max)
    };
    let initial_max_y = max_y(&solver);

    let mut max_seen = initial_max_y;
    for _ in 0..90 {
        solver.update(DT);
        max_seen = max_seen.max(max_y(&solver));
    }
    assert!(
        max_seen < initial_max_y + 0.3,
        "column should never gain significant height, peaked at {}",
        max_seen
    );

    let final_max_y = max_y(&solver);
    assert!(
        final_max_y < 0.7 * initial_max_y,
        "column should collapse by at least 30%: {} -> {}",
        initial_max_y,
        final_max_y
    );

    for i in 0..solver.particles.count {
        let p = solver.particles.position[i];
        assert!(
            p.x.abs() <= 0.97 && p.z.abs() <= 0.97 && p.y >= radius - 0.02,
            "particle {} escaped the box: {:?}",
            i,
            p
        );
    }
}

#[test]
fn test_mixed_scene_stays_finite() {
    let radius = 0.05;
    let mut scene = boxed_scene(radius);
    scene.rest_density = 1120.0;

    let rest = vec![
        Vec3::new(-0.05, 0.0, 0.0),
        Vec3::new(0.05, 0.0, 0.0),
    ];
    scene.rigid_bodies.push(RigidBodyDesc {
        positions: rest.iter().map(|p| *p + Vec3::new(0.4, 0.6, 0.0)).collect(),
        rest_positions: rest,
        mass_per_particle: 1.0,
    });
    scene.granular_groups.push(ParticleGroupDesc {
        positions: particle_block(Vec3::new(-0.5, radius, -0.5), 3, 2, 3, 0.11),
        mass_per_particle: 0.8,
    });
    scene.fluid_groups.push(ParticleGroupDesc {
        positions: particle_block(Vec3::new(-0.1, 0.3, -0.1), 4, 4, 4, 0.1),
        mass_per_particle: 1.0,
    });

    let mut solver = Solver::new(&scene).expect("scene fits");
    for _ in 0..60 {
        solver.update(DT);
    }

    for i in 0..solver.particles.count {
        assert!(
            solver.particles.position[i].is_finite(),
            "particle {} has non-finite position",
            i
        );
        assert!(
            solver.particles.velocity[i].is_finite(),
            "particle {} has non-finite velocity",
            i
        );
    }
}

#[test]
fn test_update_reports_stats() {
    let mut scene = boxed_scene(0.05);
    scene.fluid_groups.push(ParticleGroupDesc {
        positions: vec![Vec3::new(0.0, 0.5, 0.0)],
        mass_per_particle: 1.0,
    });

    let mut solver = Solver::new(&scene).expect("scene fits");
    let stats = solver.update(DT);
    assert_eq!(stats.substeps, 2);
    assert_eq!(stats.constraint_iterations, 2);
    assert_eq!(stats.particle_count, 1);
    assert_eq!(stats.rigid_body_count, 0);
}
