//! Surface tension scatter: from surface particles onto the simulation grid.

use glam::IVec3;

use crate::grid::SimGrid;
use crate::kernels::quadratic_weights;
use crate::params::SimParams;
use crate::surface::{fields, FluidSurface};

/// Accumulate surface-tension impulses on the grid.
///
/// Node tensions are zeroed, then every surface particle interpolates the
/// unit normal and curvature at its position and scatters
/// `-normal * curvature * tension_coefficient * dt` over its 3x3x3 stencil
/// with quadratic weights. The scatter runs serially, like P2G.
pub fn add_tension(grid: &mut SimGrid, surface: &FluidSurface, params: &SimParams) {
    grid.reset_tension();

    let inv_dx = params.inv_dx();
    let scale = params.tension_coefficient * params.dt;

    for &position in surface.surface_particles.as_slice() {
        let normal = fields::interpolate_normal(surface, position);
        let curvature = fields::interpolate_curvature(surface, position);
        let tension = normal * curvature * scale;

        let wq = quadratic_weights(position, inv_dx);
        for di in 0..3 {
            for dj in 0..3 {
                for dk in 0..3 {
                    let coord = wq.base + IVec3::new(di as i32, dj as i32, dk as i32);
                    if !grid.contains(coord) {
                        continue;
                    }
                    grid.node_mut(coord).tension -= wq.weight(di, dj, dk) * tension;
                }
            }
        }
    }
}
