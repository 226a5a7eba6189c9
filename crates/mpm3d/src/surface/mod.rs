//! Liquid surface reconstruction.
//!
//! Every substep the water surface is rebuilt from scratch: the union of
//! particle spheres is rasterized into a signed-distance lattice, the zero
//! isosurface is triangulated by marching cubes, and the triangles are
//! discretized into surface particles that carry tension back to the grid.

pub mod fields;
pub mod level_set;
pub mod marching_cubes;
pub mod sampling;
pub mod tables;

use glam::Vec3;

use crate::arena::AppendArena;
use crate::particle::Particle;

/// One extracted isosurface triangle (three world-space vertices).
pub type Triangle = [Vec3; 3];

/// Signed-distance lattice and the per-substep surface buffers derived from
/// it.
///
/// The lattice has `grid_num` nodes per axis spanning the unit cube, so its
/// spacing is `1 / (grid_num - 1)` - independent of (and typically coarser
/// than) the simulation grid. All contents are scratch state, logically
/// destroyed and rebuilt by `rebuild`.
///
/// The union-of-spheres field is not re-normalized to a true distance after
/// the union, so values are only a lower bound to the real signed distance;
/// the derivative fields inherit that approximation.
pub struct FluidSurface {
    /// Lattice nodes per axis.
    pub grid_num: usize,
    /// Lattice spacing.
    pub dx: f32,
    pub inv_dx: f32,
    /// Radius of the sphere contributed by each water particle.
    pub radius: f32,

    /// Signed distance per node.
    pub sdf: Vec<f32>,
    /// Cached world position per node.
    pub node_position: Vec<Vec3>,
    /// Unit normal per node (normalized SDF gradient).
    pub gradient: Vec<Vec3>,
    /// Mean-curvature proxy per node (SDF Laplacian).
    pub laplacian: Vec<f32>,

    /// Triangles from the latest extraction pass.
    pub triangles: AppendArena<Triangle>,
    /// Surface particles sampled from the latest triangle set.
    pub surface_particles: AppendArena<Vec3>,
}

impl FluidSurface {
    pub fn new(
        grid_num: usize,
        radius: f32,
        max_triangles: usize,
        max_surface_particles: usize,
    ) -> Self {
        assert!(
            grid_num > 1,
            "surface lattice needs at least 2 nodes per axis, got {}",
            grid_num
        );
        let dx = 1.0 / (grid_num - 1) as f32;
        let node_count = grid_num * grid_num * grid_num;

        let mut node_position = vec![Vec3::ZERO; node_count];
        for i in 0..grid_num {
            for j in 0..grid_num {
                for k in 0..grid_num {
                    node_position[(i * grid_num + j) * grid_num + k] =
                        Vec3::new(i as f32, j as f32, k as f32) * dx;
                }
            }
        }

        Self {
            grid_num,
            dx,
            inv_dx: (grid_num - 1) as f32,
            radius,
            sdf: vec![0.0; node_count],
            node_position,
            gradient: vec![Vec3::ZERO; node_count],
            laplacian: vec![0.0; node_count],
            triangles: AppendArena::new(max_triangles),
            surface_particles: AppendArena::new(max_surface_particles),
        }
    }

    #[inline]
    pub fn node_index(&self, i: usize, j: usize, k: usize) -> usize {
        (i * self.grid_num + j) * self.grid_num + k
    }

    /// Rebuild the whole surface state from the current particle set:
    /// level set, derivative fields, triangulation, surface sampling.
    pub fn rebuild(&mut self, particles: &[Particle]) {
        self.surface_particles.clear();
        level_set::create_level_set(self, particles);
        fields::calculate_gradient(self);
        fields::calculate_laplacian(self);
        marching_cubes::extract_isosurface(self);
        sampling::discretize_triangles(self);
    }
}
