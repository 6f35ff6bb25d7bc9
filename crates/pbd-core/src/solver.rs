use crate::config::{SolverConfig, MASS_SCALING};
use crate::constraints::plane::{self, Plane};
use crate::constraints::{contact, density, shape_matching};
use crate::error::SceneError;
use crate::fluids::{cohesion, viscosity, vorticity};
use crate::grid::UniformGrid;
use crate::particle::ParticleSet;
use crate::render::{self, PackedPosition};
use crate::scene::SceneDescription;

/// Counters from a single `update` call.
#[derive(Clone, Copy, Debug, Default)]
pub struct StepStats {
    pub substeps: u32,
    pub constraint_iterations: u32,
    pub particle_count: u32,
    pub rigid_body_count: u32,
}

/// The unified particle solver.
///
/// Owns every buffer; two instances can coexist. Matter is appended from
/// the scene description at construction and never removed. Each `update`
/// advances all particles through the sub-stepped constraint projection
/// pipeline and refreshes the renderer-facing packed position view.
pub struct Solver {
    pub particles: ParticleSet,
    pub config: SolverConfig,
    planes: Vec<Plane>,
    grid: UniformGrid,
    particle_radius: f32,
    /// SPH support radius h; also the grid cell size. Fixed at
    /// construction.
    smoothing_radius: f32,
    rest_density: f32,
    render_buffer: Vec<PackedPosition>,
}

impl Solver {
    /// Build a solver from a scene description, with default tunables.
    /// Fails only on capacity violations, off-center rigid reference
    /// shapes, or allocation failure; once constructed, `update` cannot
    /// fail.
    pub fn new(scene: &SceneDescription) -> Result<Self, SceneError> {
        let config = SolverConfig::default();
        let mut particles = ParticleSet::new(scene.max_particles, scene.max_rigid_bodies)?;

        for body in &scene.rigid_bodies {
            particles.add_rigid_body(
                &body.positions,
                &body.rest_positions,
                body.mass_per_particle,
            )?;
        }
        for group in &scene.granular_groups {
            particles.add_granulars(&group.positions, group.mass_per_particle)?;
        }
        for group in &scene.fluid_groups {
            particles.add_fluids(&group.positions, group.mass_per_particle)?;
        }

        let smoothing_radius = config.smoothing_radius_factor * scene.particle_radius;
        let grid = UniformGrid::new(
            scene.bounds_min,
            scene.bounds_max,
            smoothing_radius,
            scene.max_particles,
        );

        tracing::debug!(
            particles = particles.count,
            rigid_bodies = particles.bodies.len(),
            planes = scene.planes.len(),
            grid_dims = ?grid.dims(),
            "unified solver constructed"
        );

        let render_buffer = vec![PackedPosition::default(); scene.max_particles];
        Ok(Self {
            particles,
            config,
            planes: scene.planes.clone(),
            grid,
            particle_radius: scene.particle_radius,
            smoothing_radius,
            rest_density: scene.rest_density,
            render_buffer,
        })
    }

    pub fn particle_radius(&self) -> f32 {
        self.particle_radius
    }

    pub fn smoothing_radius(&self) -> f32 {
        self.smoothing_radius
    }

    pub fn planes(&self) -> &[Plane] {
        &self.planes
    }

    /// Renderer contract: the committed positions of the live particles as
    /// tightly packed 4-vectors (xyz, w = 0). Valid until the next
    /// `update`; the solver never writes it in between.
    pub fn mapped_positions(&self) -> &[PackedPosition] {
        &self.render_buffer[..self.particles.count]
    }

    /// Raw byte view of [`Self::mapped_positions`] for buffer uploads.
    pub fn mapped_position_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(self.mapped_positions())
    }

    /// Advance the simulation by `dt`, split into the configured number of
    /// substeps. Runtime passes never fail; numerical anomalies are
    /// absorbed by the next substep's stabilization and projection.
    pub fn update(&mut self, dt: f32) -> StepStats {
        let substeps = self.config.substeps.max(1);
        let sdt = dt / substeps as f32;

        for _ in 0..substeps {
            self.substep(sdt, dt);
        }

        render::write_packed(
            &mut self.render_buffer,
            &self.particles.position,
            self.particles.count,
        );

        StepStats {
            substeps,
            constraint_iterations: self.config.grid_iterations * self.config.constraint_iterations,
            particle_count: self.particles.count as u32,
            rigid_body_count: self.particles.bodies.len() as u32,
        }
    }

    fn substep(&mut self, sdt: f32, frame_dt: f32) {
        self.integrate(sdt);
        self.compute_shock_masses();
        plane::stabilize(
            &mut self.particles,
            &self.planes,
            self.particle_radius,
            self.config.stabilization_iterations,
        );

        for _ in 0..self.config.grid_iterations {
            self.grid
                .build(&self.particles.predicted, self.particles.count);

            for _ in 0..self.config.constraint_iterations {
                plane::project(&mut self.particles, &self.planes, self.particle_radius);

                if self.config.collisions_enabled {
                    let p = &mut self.particles;
                    contact::project_contacts(
                        &self.grid,
                        &p.predicted,
                        &p.phase,
                        &p.inv_scaled_mass,
                        &mut p.temp,
                        p.count,
                        self.particle_radius,
                    );
                    std::mem::swap(&mut p.predicted, &mut p.temp);
                }

                {
                    let p = &mut self.particles;
                    density::compute_lambdas(
                        &self.grid,
                        &p.predicted,
                        &p.phase,
                        &p.mass,
                        &mut p.density,
                        &mut p.lambda,
                        p.count,
                        self.rest_density,
                        self.smoothing_radius,
                    );
                    density::project_density(
                        &self.grid,
                        &p.predicted,
                        &p.phase,
                        &p.lambda,
                        &mut p.temp,
                        p.count,
                        self.rest_density,
                        self.smoothing_radius,
                    );
                    std::mem::swap(&mut p.predicted, &mut p.temp);
                }

                if !self.particles.bodies.is_empty() {
                    let p = &mut self.particles;
                    shape_matching::project_shape_matching(&mut p.bodies, &mut p.predicted);
                }
            }
        }

        self.update_velocities(sdt);
        self.commit_positions();

        {
            let p = &mut self.particles;
            vorticity::compute_vorticity(
                &self.grid,
                &p.predicted,
                &p.velocity,
                &p.phase,
                &mut p.vorticity,
                p.count,
                self.smoothing_radius,
            );
            vorticity::apply_vorticity_confinement(
                &self.grid,
                &p.predicted,
                &p.vorticity,
                &p.phase,
                &mut p.velocity,
                p.count,
                self.config.vorticity_strength,
                self.smoothing_radius,
                sdt,
            );
        }

        if self.config.cohesion_enabled {
            let p = &mut self.particles;
            cohesion::compute_normals(
                &self.grid,
                &p.predicted,
                &p.phase,
                &p.mass,
                &p.density,
                &mut p.normal,
                p.count,
                self.smoothing_radius,
            );
            cohesion::apply_cohesion(
                &self.grid,
                &p.predicted,
                &p.phase,
                &p.mass,
                &p.density,
                &p.normal,
                &p.velocity,
                &mut p.temp_velocity,
                p.count,
                self.rest_density,
                self.config.cohesion_strength,
                frame_dt,
                self.smoothing_radius,
            );
            std::mem::swap(&mut p.velocity, &mut p.temp_velocity);
        }

        {
            let p = &mut self.particles;
            viscosity::apply_xsph_viscosity(
                &self.grid,
                &p.predicted,
                &p.phase,
                &p.mass,
                &p.density,
                &p.velocity,
                &mut p.temp_velocity,
                p.count,
                self.config.xsph_viscosity,
                self.smoothing_radius,
            );
            std::mem::swap(&mut p.velocity, &mut p.temp_velocity);
        }
    }

    /// Gravity plus position prediction.
    fn integrate(&mut self, sdt: f32) {
        let gravity = self.config.gravity;
        let p = &mut self.particles;
        for i in 0..p.count {
            p.velocity[i] += gravity * sdt;
            p.predicted[i] = p.position[i] + p.velocity[i] * sdt;
        }
    }

    /// Shock-propagation mass scaling: lower particles get a smaller
    /// effective inverse mass, so stacks settle from the bottom up.
    /// The scale factor is clamped away from zero so particles far above
    /// the origin keep a finite inverse mass.
    fn compute_shock_masses(&mut self) {
        let p = &mut self.particles;
        for i in 0..p.count {
            let scale = (-MASS_SCALING * p.position[i].y).exp().max(1e-30);
            p.inv_scaled_mass[i] = 1.0 / (scale * p.mass[i]);
        }
    }

    /// Rebuild velocities from the projected position delta.
    fn update_velocities(&mut self, sdt: f32) {
        let inv_dt = 1.0 / sdt;
        let p = &mut self.particles;
        for i in 0..p.count {
            p.velocity[i] = (p.predicted[i] - p.position[i]) * inv_dt;
        }
    }

    /// Commit predicted positions. Fluids always commit; solids commit
    /// only when they moved past the sleep threshold, so resting stacks
    /// stay put.
    fn commit_positions(&mut self) {
        let threshold_sq = self.config.sleep_threshold * self.config.sleep_threshold;
        let p = &mut self.particles;
        for i in 0..p.count {
            if p.phase[i] < 0
                || (p.predicted[i] - p.position[i]).length_squared() >= threshold_sq
            {
                p.position[i] = p.predicted[i];
            }
        }
    }
}
