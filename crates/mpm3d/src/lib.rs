//! 3D Material Point Method simulation with surface-tension coupling.
//!
//! A hybrid particle/grid solver for water, elastic solids, and snow. Each
//! substep rebuilds a triangulated liquid surface from the particle set and
//! feeds the resulting tension impulses back into the transfer cycle:
//!
//! 1. **Surface rebuild**: union-of-spheres level set, gradient/Laplacian
//!    fields, marching-cubes triangulation, triangle discretization into
//!    surface particles
//! 2. **Tension scatter**: surface particles deposit tension on grid nodes
//! 3. **Grid reset** and **tension injection** into particle velocities
//! 4. **P2G**: constitutive update + mass/momentum scatter
//! 5. **Grid operator**: momentum normalization, gravity, wall boundaries
//! 6. **G2P**: velocity/affine gather and advection
//!
//! # Example
//!
//! ```
//! use mpm3d::{Material, MpmSimulation, SimParams};
//! use glam::Vec3;
//!
//! let mut sim = MpmSimulation::new(SimParams::new(32, 17, 1000));
//! sim.add_cube(Vec3::new(0.4, 0.5, 0.4), 0.2, 1000, Material::Water);
//! sim.substep();
//! assert!(sim.surface.triangles.len() > 0);
//! ```

pub mod arena;
pub mod constants;
pub mod constitutive;
pub mod export;
pub mod grid;
pub mod kernels;
pub mod params;
pub mod particle;
pub mod surface;
pub mod tension;
pub mod transfer;

pub use glam::{Mat3, Vec3};
pub use grid::{GridNode, SimGrid};
pub use params::SimParams;
pub use particle::{Material, Particle, ParticleStore};
pub use surface::FluidSurface;

/// The full simulation state: particles, the scratch grid, and the surface
/// reconstruction solver.
///
/// Particles are the only state with cross-substep identity; the grid and
/// the surface lattice are rebuilt inside every substep.
pub struct MpmSimulation {
    pub params: SimParams,
    pub particles: ParticleStore,
    pub grid: SimGrid,
    pub surface: FluidSurface,
}

impl MpmSimulation {
    pub fn new(params: SimParams) -> Self {
        let particles = ParticleStore::new(params.max_particles);
        let grid = SimGrid::new(params.grid_num);
        let surface = FluidSurface::new(
            params.surface_grid_num,
            params.particle_radius,
            params.max_triangles,
            params.max_surface_particles,
        );
        Self {
            params,
            particles,
            grid,
            surface,
        }
    }

    /// Seed `count` particles of `material` uniformly inside the cube
    /// `[origin, origin + extent]^3`, at rest.
    pub fn add_cube(&mut self, origin: Vec3, extent: f32, count: usize, material: Material) {
        let mass = self.params.p_vol() * material.density();
        self.particles
            .add_cube(origin, extent, count, material, mass);
    }

    /// Advance the simulation by one substep, running every phase in order.
    pub fn substep(&mut self) {
        self.surface.rebuild(self.particles.as_slice());
        tension::add_tension(&mut self.grid, &self.surface, &self.params);
        self.grid.reset_mass_and_velocity();
        transfer::add_tension_to_particles(&self.grid, &mut self.particles, &self.params);
        transfer::particles_to_grid(&mut self.grid, &mut self.particles, &self.params);
        transfer::grid_operator(&mut self.grid, &self.params);
        transfer::grid_to_particles(&self.grid, &mut self.particles, &self.params);
    }

    /// Advance by one rendered frame (`params.substeps` substeps).
    pub fn step_frame(&mut self) {
        for _ in 0..self.params.substeps {
            self.substep();
        }
    }

    /// Current particle positions, for export.
    pub fn particle_positions(&self) -> Vec<Vec3> {
        self.particles.as_slice().iter().map(|p| p.position).collect()
    }
}
