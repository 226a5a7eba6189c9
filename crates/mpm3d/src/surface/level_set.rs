//! Union-of-spheres level set rasterization.

use rayon::prelude::*;

use crate::constants::SDF_SENTINEL;
use crate::particle::Particle;

use super::FluidSurface;

/// Rebuild the signed-distance field from the water particles.
///
/// Every lattice node takes the minimum over all water particles of
/// (distance to particle center - particle radius). Brute force over the
/// full particle set per node, parallel over nodes; the union of spheres is
/// only a lower bound to the true signed distance and is consumed as such.
pub fn create_level_set(surface: &mut FluidSurface, particles: &[Particle]) {
    let radius = surface.radius;
    let node_positions = &surface.node_position;

    surface
        .sdf
        .par_iter_mut()
        .enumerate()
        .for_each(|(idx, sdf)| {
            let node_pos = node_positions[idx];
            let mut min_dis = SDF_SENTINEL;
            for particle in particles {
                if !particle.material.is_fluid() {
                    continue;
                }
                let distance = (particle.position - node_pos).length() - radius;
                if distance < min_dis {
                    min_dis = distance;
                }
            }
            *sdf = min_dis;
        });
}
