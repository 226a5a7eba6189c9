//! Particle-grid transfer operators.
//!
//! P2G: scatter mass and APIC momentum to the 3x3x3 node stencil.
//! Grid operator: momentum -> velocity, gravity, wall boundary conditions.
//! G2P: gather velocity and the affine matrix back, advect positions.
//!
//! Scatters run as plain serial loops; gathers are parallel over particles.

use glam::{IVec3, Mat3, Vec3};
use rayon::prelude::*;

use crate::constants::GRAVITY;
use crate::constitutive;
use crate::grid::SimGrid;
use crate::kernels::{apic_d_inverse, quadratic_weights};
use crate::params::SimParams;
use crate::particle::ParticleStore;

/// Scatter particle mass and momentum onto the grid.
///
/// Runs the constitutive update for each particle first; the resulting
/// affine matrix carries both stress and the APIC velocity gradient.
pub fn particles_to_grid(grid: &mut SimGrid, particles: &mut ParticleStore, params: &SimParams) {
    let dx = params.dx();
    let inv_dx = params.inv_dx();

    for particle in particles.as_mut_slice() {
        let wq = quadratic_weights(particle.position, inv_dx);
        let affine = constitutive::affine_momentum(particle, params);
        let momentum = particle.velocity * particle.mass;

        for di in 0..3 {
            for dj in 0..3 {
                for dk in 0..3 {
                    let coord = wq.base + IVec3::new(di as i32, dj as i32, dk as i32);
                    if !grid.contains(coord) {
                        continue;
                    }
                    let dpos =
                        (Vec3::new(di as f32, dj as f32, dk as f32) - wq.fx) * dx;
                    let weight = wq.weight(di, dj, dk);

                    let node = grid.node_mut(coord);
                    node.velocity += weight * (momentum + affine * dpos);
                    node.mass += weight * particle.mass;
                }
            }
        }
    }
}

/// Normalize momentum, apply gravity, and enforce the wall boundaries.
///
/// Nodes within `bound` cells of a domain face lose the velocity component
/// pointing into that face, per axis.
pub fn grid_operator(grid: &mut SimGrid, params: &SimParams) {
    let num = grid.num();
    let bound = params.bound as i32;
    let gravity_dv = params.dt * GRAVITY;
    let high = num as i32 - bound;

    grid.nodes_mut()
        .par_iter_mut()
        .enumerate()
        .for_each(|(idx, node)| {
            if node.mass > 0.0 {
                node.velocity /= node.mass;
            }
            node.velocity.y += gravity_dv;

            let k = (idx % num) as i32;
            let j = ((idx / num) % num) as i32;
            let i = (idx / (num * num)) as i32;
            let coord = [i, j, k];
            for axis in 0..3 {
                let inward_low = coord[axis] < bound && node.velocity[axis] < 0.0;
                let inward_high = coord[axis] > high && node.velocity[axis] > 0.0;
                if inward_low || inward_high {
                    node.velocity[axis] = 0.0;
                }
            }
        });
}

/// Gather grid velocities back onto particles and advect them.
///
/// Reconstructs the APIC affine matrix from the weighted outer products of
/// node velocity and offset.
pub fn grid_to_particles(grid: &SimGrid, particles: &mut ParticleStore, params: &SimParams) {
    let dx = params.dx();
    let inv_dx = params.inv_dx();
    let dt = params.dt;
    let d_inv = apic_d_inverse(dx);

    particles.as_mut_slice().par_iter_mut().for_each(|particle| {
        let wq = quadratic_weights(particle.position, inv_dx);

        let mut new_velocity = Vec3::ZERO;
        let mut new_affine = Mat3::ZERO;

        for di in 0..3 {
            for dj in 0..3 {
                for dk in 0..3 {
                    let coord = wq.base + IVec3::new(di as i32, dj as i32, dk as i32);
                    if !grid.contains(coord) {
                        continue;
                    }
                    let dpos =
                        (Vec3::new(di as f32, dj as f32, dk as f32) - wq.fx) * dx;
                    let weight = wq.weight(di, dj, dk);
                    let node_velocity = grid.node(coord).velocity;

                    new_velocity += weight * node_velocity;
                    new_affine += outer_product(node_velocity, dpos) * (weight * d_inv);
                }
            }
        }

        particle.velocity = new_velocity;
        particle.position += dt * particle.velocity;
        particle.affine_velocity = new_affine;
    });
}

/// Gather the accumulated node tensions at each particle and inject them as
/// a velocity kick.
///
/// The kick is added to velocity directly, bypassing mass-weighted momentum
/// transfer; the tension vector already carries the dt factor.
pub fn add_tension_to_particles(grid: &SimGrid, particles: &mut ParticleStore, params: &SimParams) {
    let inv_dx = params.inv_dx();

    particles.as_mut_slice().par_iter_mut().for_each(|particle| {
        let wq = quadratic_weights(particle.position, inv_dx);
        let mut kick = Vec3::ZERO;
        for di in 0..3 {
            for dj in 0..3 {
                for dk in 0..3 {
                    let coord = wq.base + IVec3::new(di as i32, dj as i32, dk as i32);
                    if !grid.contains(coord) {
                        continue;
                    }
                    kick += wq.weight(di, dj, dk) * grid.node(coord).tension;
                }
            }
        }
        particle.velocity += kick;
    });
}

/// Outer product u * v^T as a column-major matrix.
#[inline]
fn outer_product(u: Vec3, v: Vec3) -> Mat3 {
    Mat3::from_cols(u * v.x, u * v.y, u * v.z)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::particle::Material;

    fn setup(grid_num: usize) -> (SimGrid, ParticleStore, SimParams) {
        let params = SimParams::new(grid_num, 21, 4096);
        let grid = SimGrid::new(grid_num);
        let store = ParticleStore::new(params.max_particles);
        (grid, store, params)
    }

    #[test]
    fn p2g_conserves_mass_away_from_walls() {
        let (mut grid, mut particles, params) = setup(32);
        particles.add_cube(Vec3::splat(0.4), 0.2, 500, Material::Water, 1e-4);

        let particle_mass = particles.total_mass();
        grid.reset_mass_and_velocity();
        particles_to_grid(&mut grid, &mut particles, &params);

        assert!(
            (grid.total_mass() - particle_mass).abs() < 1e-5,
            "grid mass {} != particle mass {}",
            grid.total_mass(),
            particle_mass
        );
    }

    #[test]
    fn p2g_conserves_momentum_for_moving_particles() {
        let (mut grid, mut particles, params) = setup(32);
        particles.add_cube(Vec3::splat(0.45), 0.1, 64, Material::Water, 1e-4);
        for p in particles.as_mut_slice() {
            p.velocity = Vec3::new(1.0, -0.5, 0.25);
        }

        grid.reset_mass_and_velocity();
        particles_to_grid(&mut grid, &mut particles, &params);

        let grid_momentum: Vec3 = grid.nodes().iter().map(|n| n.velocity).sum();
        let expected = Vec3::new(1.0, -0.5, 0.25) * particles.total_mass();
        assert!(
            (grid_momentum - expected).length() < 1e-5,
            "grid momentum {:?} != particle momentum {:?}",
            grid_momentum,
            expected
        );
    }

    #[test]
    fn grid_operator_zeroes_inward_wall_velocities() {
        let (mut grid, _, params) = setup(16);
        for node in grid.nodes_mut() {
            node.mass = 1.0;
            node.velocity = Vec3::new(-1.0, 1.0, -1.0);
        }
        grid_operator(&mut grid, &params);

        let num = grid.num() as i32;
        let bound = params.bound as i32;
        for i in 0..num {
            for j in 0..num {
                for k in 0..num {
                    let v = grid.node(IVec3::new(i, j, k)).velocity;
                    if i < bound {
                        assert!(v.x >= 0.0, "node ({},{},{}) keeps x into wall", i, j, k);
                    }
                    if j > num - bound {
                        assert!(v.y <= 0.0, "node ({},{},{}) keeps y into wall", i, j, k);
                    }
                    if k < bound {
                        assert!(v.z >= 0.0, "node ({},{},{}) keeps z into wall", i, j, k);
                    }
                }
            }
        }
    }

    #[test]
    fn grid_operator_applies_gravity() {
        let (mut grid, _, params) = setup(16);
        let mid = IVec3::new(8, 8, 8);
        grid.node_mut(mid).mass = 2.0;
        grid.node_mut(mid).velocity = Vec3::new(0.0, 2.0, 0.0);
        grid_operator(&mut grid, &params);

        let v = grid.node(mid).velocity;
        assert!((v.y - (1.0 + params.dt * GRAVITY)).abs() < 1e-6);
    }

    #[test]
    fn g2p_picks_up_uniform_grid_velocity() {
        let (mut grid, mut particles, params) = setup(32);
        particles.add_cube(Vec3::splat(0.45), 0.1, 16, Material::Water, 1e-4);
        for node in grid.nodes_mut() {
            node.velocity = Vec3::new(0.5, 0.0, -0.5);
        }

        grid_to_particles(&grid, &mut particles, &params);
        for p in particles.as_slice() {
            assert!((p.velocity - Vec3::new(0.5, 0.0, -0.5)).length() < 1e-4);
            // Uniform field: the velocity gradient (and thus C) vanishes.
            for c in 0..3 {
                assert!(p.affine_velocity.col(c).length() < 1e-2);
            }
        }
    }

    #[test]
    fn tension_gather_adds_velocity_kick() {
        let (mut grid, mut particles, params) = setup(32);
        particles.add_cube(Vec3::splat(0.5), 0.01, 1, Material::Water, 1e-4);
        for node in grid.nodes_mut() {
            node.tension = Vec3::new(0.0, 1e-3, 0.0);
        }

        add_tension_to_particles(&grid, &mut particles, &params);
        let v = particles.as_slice()[0].velocity;
        // Weights sum to one away from walls, so the full kick lands.
        assert!((v.y - 1e-3).abs() < 1e-6);
    }
}
