//! Simulation parameters and derived quantities.

use serde::{Deserialize, Serialize};

/// Configuration surface consumed by the solver.
///
/// Lengths are normalized: the simulation domain is the unit cube, so grid
/// spacing follows directly from the node counts.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SimParams {
    /// Simulation grid nodes per axis.
    pub grid_num: usize,
    /// Surface (level set) lattice nodes per axis, typically coarser than the
    /// simulation grid.
    pub surface_grid_num: usize,
    /// Hard capacity of the particle store.
    pub max_particles: usize,
    /// Hard capacity of the rebuilt-per-substep surface particle buffer.
    pub max_surface_particles: usize,
    /// Hard capacity of the marching-cubes triangle buffer.
    pub max_triangles: usize,
    /// Radius of the sphere contributed by each water particle to the level
    /// set union.
    pub particle_radius: f32,
    /// Young's modulus.
    pub young_modulus: f32,
    /// Poisson ratio.
    pub poisson_ratio: f32,
    /// Substep length (s).
    pub dt: f32,
    /// Substeps per rendered frame.
    pub substeps: usize,
    /// Surface tension coefficient.
    pub tension_coefficient: f32,
    /// Wall thickness in grid cells; velocities pointing into a wall are
    /// zeroed within this band.
    pub bound: usize,
}

impl SimParams {
    /// Build a parameter set for the given resolutions, deriving the surface
    /// particle radius from the surface lattice spacing.
    pub fn new(grid_num: usize, surface_grid_num: usize, max_particles: usize) -> Self {
        assert!(grid_num > 1, "grid_num must be at least 2, got {}", grid_num);
        assert!(
            surface_grid_num > 1,
            "surface_grid_num must be at least 2, got {}",
            surface_grid_num
        );
        let surface_dx = 1.0 / (surface_grid_num - 1) as f32;
        Self {
            grid_num,
            surface_grid_num,
            max_particles,
            max_surface_particles: 80_000,
            max_triangles: surface_grid_num * surface_grid_num * surface_grid_num,
            particle_radius: surface_dx * 0.8,
            young_modulus: 1000.0,
            poisson_ratio: 0.2,
            dt: 1e-4,
            substeps: 32,
            tension_coefficient: 0.07,
            bound: 3,
        }
    }

    /// Simulation grid spacing.
    #[inline]
    pub fn dx(&self) -> f32 {
        1.0 / self.grid_num as f32
    }

    #[inline]
    pub fn inv_dx(&self) -> f32 {
        self.grid_num as f32
    }

    /// Surface lattice spacing (the lattice spans the unit cube with
    /// `surface_grid_num` nodes per axis).
    #[inline]
    pub fn surface_dx(&self) -> f32 {
        1.0 / (self.surface_grid_num - 1) as f32
    }

    /// Reference particle volume.
    #[inline]
    pub fn p_vol(&self) -> f32 {
        let half_dx = self.dx() * 0.5;
        half_dx * half_dx
    }

    /// Initial shear modulus (before hardening).
    #[inline]
    pub fn mu_0(&self) -> f32 {
        self.young_modulus / (2.0 * (1.0 + self.poisson_ratio))
    }

    /// Initial Lame lambda (before hardening).
    #[inline]
    pub fn lambda_0(&self) -> f32 {
        self.young_modulus * self.poisson_ratio
            / ((1.0 + self.poisson_ratio) * (1.0 - 2.0 * self.poisson_ratio))
    }
}

impl Default for SimParams {
    fn default() -> Self {
        Self::new(128, 80, 30_000)
    }
}
