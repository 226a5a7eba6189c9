//! Property-based tests for kernel and interpolation invariants across
//! random positions.

use glam::Vec3;
use mpm3d::kernels::quadratic_weights;
use mpm3d::surface::{fields, FluidSurface};
use proptest::prelude::*;

proptest! {
    /// Quadratic B-spline stencil weights always form a partition of unity.
    #[test]
    fn stencil_weights_sum_to_one(
        x in 0.05f32..0.95,
        y in 0.05f32..0.95,
        z in 0.05f32..0.95,
    ) {
        let wq = quadratic_weights(Vec3::new(x, y, z), 64.0);
        let mut sum = 0.0;
        for di in 0..3 {
            for dj in 0..3 {
                for dk in 0..3 {
                    let w = wq.weight(di, dj, dk);
                    prop_assert!(w >= 0.0, "negative weight {}", w);
                    sum += w;
                }
            }
        }
        prop_assert!((sum - 1.0).abs() < 1e-4, "weights sum to {}", sum);
    }

    /// Trilinear interpolation of a bounded field stays within its bounds.
    #[test]
    fn interpolation_stays_within_field_bounds(
        x in 0.0f32..1.0,
        y in 0.0f32..1.0,
        z in 0.0f32..1.0,
    ) {
        let mut surface = FluidSurface::new(9, 0.02, 16, 16);
        let mut lo = f32::MAX;
        let mut hi = f32::MIN;
        for idx in 0..surface.sdf.len() {
            let p = surface.node_position[idx];
            let v = (p - Vec3::splat(0.5)).length() - 0.3;
            surface.sdf[idx] = v;
            lo = lo.min(v);
            hi = hi.max(v);
        }

        let sampled = fields::interpolate_sdf(&surface, Vec3::new(x, y, z));
        prop_assert!(sampled >= lo - 1e-5 && sampled <= hi + 1e-5,
            "sample {} escapes [{}, {}]", sampled, lo, hi);
    }

    /// Interpolated normals of a normalized gradient field never exceed unit
    /// length (convex combination of unit vectors).
    #[test]
    fn interpolated_normals_are_at_most_unit_length(
        x in 0.0f32..1.0,
        y in 0.0f32..1.0,
        z in 0.0f32..1.0,
    ) {
        let mut surface = FluidSurface::new(9, 0.02, 16, 16);
        for idx in 0..surface.sdf.len() {
            let p = surface.node_position[idx];
            surface.sdf[idx] = (p - Vec3::splat(0.5)).length() - 0.3;
        }
        fields::calculate_gradient(&mut surface);

        let normal = fields::interpolate_normal(&surface, Vec3::new(x, y, z));
        prop_assert!(normal.length() <= 1.0 + 1e-5,
            "interpolated normal length {}", normal.length());
    }
}
