//! Discretization of extracted triangles into surface particles.

use rayon::prelude::*;
use std::sync::atomic::{AtomicBool, Ordering};

use super::FluidSurface;

/// Barycentric subdivision parameter: each triangle yields the lattice of
/// points i + j <= DISCRETE_NUM.
pub const DISCRETE_NUM: usize = 3;

/// Sample every extracted triangle into surface particles.
///
/// For triangle (A, B, C) the emitted points are
/// `A + (i/n)(B-A) + (j/n)(C-A)` for all i, j >= 0 with i + j <= n. The
/// lattice includes the triangle's vertices and is independent of triangle
/// size: sampling density intentionally varies with triangle area.
///
/// Emission reserves slots by atomic append; overflowing the surface
/// particle buffer is fatal and reported.
pub fn discretize_triangles(surface: &mut FluidSurface) {
    surface.surface_particles.clear();

    let overflowed = AtomicBool::new(false);
    let surface_particles = &surface.surface_particles;
    let n = DISCRETE_NUM as f32;

    surface.triangles.as_slice().par_iter().for_each(|tri| {
        let [a, b, c] = *tri;
        let ab = b - a;
        let ac = c - a;
        for i in 0..=DISCRETE_NUM {
            for j in 0..=DISCRETE_NUM - i {
                let position = a + (i as f32 / n) * ab + (j as f32 / n) * ac;
                if surface_particles.push(position).is_none() {
                    overflowed.store(true, Ordering::Relaxed);
                }
            }
        }
    });

    assert!(
        !overflowed.load(Ordering::Relaxed),
        "surface particle buffer overflow: capacity {} is too small for this surface",
        surface.surface_particles.capacity()
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    fn points_per_triangle() -> usize {
        // i + j <= n over non-negative integers
        (0..=DISCRETE_NUM).map(|i| DISCRETE_NUM - i + 1).sum()
    }

    #[test]
    fn sample_count_is_fixed_per_triangle() {
        let mut surface = FluidSurface::new(9, 0.02, 16, 1024);
        surface
            .triangles
            .push([Vec3::ZERO, Vec3::X, Vec3::Y])
            .unwrap();
        surface
            .triangles
            .push([Vec3::ZERO, Vec3::X * 0.01, Vec3::Y * 0.01])
            .unwrap();

        discretize_triangles(&mut surface);
        // Density does not depend on triangle size.
        assert_eq!(surface.surface_particles.len(), 2 * points_per_triangle());
    }

    #[test]
    fn samples_include_vertices_and_stay_inside() {
        let mut surface = FluidSurface::new(9, 0.02, 16, 1024);
        let (a, b, c) = (
            Vec3::new(0.2, 0.3, 0.1),
            Vec3::new(0.5, 0.3, 0.1),
            Vec3::new(0.2, 0.6, 0.1),
        );
        surface.triangles.push([a, b, c]).unwrap();
        discretize_triangles(&mut surface);

        let samples = surface.surface_particles.as_slice();
        for vertex in [a, b, c] {
            assert!(
                samples.iter().any(|p| (*p - vertex).length() < 1e-6),
                "vertex {:?} missing from samples",
                vertex
            );
        }
        // All samples lie in the triangle plane and inside its bounds.
        for p in samples {
            assert!((p.z - 0.1).abs() < 1e-6);
            assert!(p.x >= 0.2 - 1e-6 && p.x <= 0.5 + 1e-6);
            assert!(p.y >= 0.3 - 1e-6 && p.y <= 0.6 + 1e-6);
        }
    }

    #[test]
    fn rebuild_clears_previous_samples() {
        let mut surface = FluidSurface::new(9, 0.02, 16, 1024);
        surface
            .triangles
            .push([Vec3::ZERO, Vec3::X, Vec3::Y])
            .unwrap();
        discretize_triangles(&mut surface);
        let first = surface.surface_particles.len();

        discretize_triangles(&mut surface);
        assert_eq!(surface.surface_particles.len(), first);
    }

    #[test]
    #[should_panic(expected = "surface particle buffer overflow")]
    fn overflow_is_fatal_and_reported() {
        let mut surface = FluidSurface::new(9, 0.02, 16, 4);
        surface
            .triangles
            .push([Vec3::ZERO, Vec3::X, Vec3::Y])
            .unwrap();
        discretize_triangles(&mut surface);
    }
}
