//! Surface pipeline integration tests: case-table completeness, level-set
//! semantics, and interpolation behavior on the lattice.

use glam::Vec3;
use mpm3d::surface::tables::{EDGE_TABLE, TRIANGLE_TABLE};
use mpm3d::surface::{fields, level_set, FluidSurface};
use mpm3d::{Material, MpmSimulation, Particle, SimParams};

/// Every triangle-table row must reference exactly the zero-crossing edges
/// the edge table activates for that configuration: a referenced inactive
/// edge (or an unused active one) would open the local patch.
#[test]
fn case_tables_are_mutually_complete() {
    for config in 0..256 {
        let active: Vec<usize> = (0..12)
            .filter(|&edge| (EDGE_TABLE[config] >> edge) & 1 == 1)
            .collect();

        let mut used: Vec<usize> = TRIANGLE_TABLE[config]
            .iter()
            .copied()
            .take_while(|&e| e != -1)
            .map(|e| e as usize)
            .collect();
        assert_eq!(
            used.len() % 3,
            0,
            "config {} has a truncated triangle triple",
            config
        );
        assert!(used.len() <= 12, "config {} exceeds 4 triangles", config);

        used.sort_unstable();
        used.dedup();
        assert_eq!(
            used, active,
            "config {}: referenced edges differ from active edges",
            config
        );
    }
}

#[test]
fn complementary_configs_activate_the_same_edges() {
    // Flipping inside/outside leaves the crossing edges unchanged.
    for config in 0..256 {
        assert_eq!(EDGE_TABLE[config], EDGE_TABLE[255 - config]);
    }
}

#[test]
fn lone_particle_reads_negative_radius_at_its_position() {
    let mut params = SimParams::new(64, 40, 10);
    params.particle_radius = 0.01;
    let mut surface = FluidSurface::new(
        params.surface_grid_num,
        params.particle_radius,
        params.max_triangles,
        params.max_surface_particles,
    );

    // One particle, no neighbors: the level set at its exact position is
    // the sphere-surface value -radius from the single contributor. Placing
    // the particle on a lattice node makes the rasterized value exact.
    let node = surface.node_position[surface.node_index(16, 20, 15)];
    let particle = Particle::new(node, 1e-4, Material::Water);
    level_set::create_level_set(&mut surface, &[particle]);

    assert_eq!(
        surface.sdf[surface.node_index(16, 20, 15)],
        -0.01,
        "level set at the particle must be exactly -radius"
    );
    // Neighboring nodes see the sphere's positive exterior.
    let neighbor = surface.sdf[surface.node_index(17, 20, 15)];
    assert!((neighbor - (surface.dx - 0.01)).abs() < 1e-6);
}

#[test]
fn interpolation_matches_stored_values_on_the_lattice() {
    let mut surface = FluidSurface::new(40, 0.01, 64, 64);
    for idx in 0..surface.sdf.len() {
        let p = surface.node_position[idx];
        surface.sdf[idx] = (p - Vec3::splat(0.5)).length() - 0.2;
    }

    for &(i, j, k) in &[(0, 0, 0), (39, 39, 39), (13, 7, 21), (20, 20, 20)] {
        let idx = surface.node_index(i, j, k);
        let sampled = fields::interpolate_sdf(&surface, surface.node_position[idx]);
        assert_eq!(
            sampled, surface.sdf[idx],
            "interpolation at node ({},{},{}) is not exact",
            i, j, k
        );
    }
}

#[test]
fn surface_rebuild_is_idempotent_for_static_particles() {
    let mut sim = MpmSimulation::new(SimParams::new(32, 21, 1000));
    sim.add_cube(Vec3::new(0.4, 0.4, 0.4), 0.2, 1000, Material::Water);

    sim.surface.rebuild(sim.particles.as_slice());
    let triangles_first = sim.surface.triangles.len();
    let samples_first = sim.surface.surface_particles.len();
    assert!(triangles_first > 0);

    sim.surface.rebuild(sim.particles.as_slice());
    assert_eq!(sim.surface.triangles.len(), triangles_first);
    assert_eq!(sim.surface.surface_particles.len(), samples_first);
}

#[test]
fn normals_of_a_particle_ball_point_outward() {
    let mut surface = FluidSurface::new(21, 0.08, 8192, 80_000);
    let center = Vec3::splat(0.5);
    let mut particles = Vec::new();
    for i in -1..=1 {
        for j in -1..=1 {
            for k in -1..=1 {
                let pos = center + Vec3::new(i as f32, j as f32, k as f32) * 0.04;
                particles.push(Particle::new(pos, 1e-4, Material::Water));
            }
        }
    }

    level_set::create_level_set(&mut surface, &particles);
    fields::calculate_gradient(&mut surface);

    // Sample the normal a little outside the blob on each axis.
    for dir in [Vec3::X, Vec3::Y, Vec3::Z, -Vec3::X, -Vec3::Y, -Vec3::Z] {
        let sample = center + dir * 0.2;
        let normal = fields::interpolate_normal(&surface, sample);
        assert!(
            normal.dot(dir) > 0.0,
            "normal {:?} at {:?} does not point away from the blob",
            normal,
            sample
        );
    }
}
