//! Quadratic B-spline kernel weights for particle-grid transfers.

use glam::{IVec3, Vec3};

/// Stencil data for one particle: base node index, fractional offset, and the
/// per-axis weight triple.
pub struct QuadraticWeights {
    /// Lowest node of the 3x3x3 stencil.
    pub base: IVec3,
    /// Fractional offset of the particle from `base`, in cell units.
    /// Always lies in [0.5, 1.5) per axis.
    pub fx: Vec3,
    /// Per-axis weights for stencil offsets 0, 1, 2.
    pub w: [Vec3; 3],
}

/// Quadratic kernels [http://mpm.graphics Eqn. 123, with x=fx, fx-1, fx-2]
#[inline]
pub fn quadratic_weights(position: Vec3, inv_dx: f32) -> QuadraticWeights {
    let xp = position * inv_dx;
    let base = (xp - Vec3::splat(0.5)).floor();
    let fx = xp - base;

    let a = Vec3::splat(1.5) - fx;
    let b = fx - Vec3::ONE;
    let c = fx - Vec3::splat(0.5);
    let w = [0.5 * a * a, Vec3::splat(0.75) - b * b, 0.5 * c * c];

    QuadraticWeights {
        base: base.as_ivec3(),
        fx,
        w,
    }
}

impl QuadraticWeights {
    /// Combined weight of the stencil node at offset (di, dj, dk).
    #[inline]
    pub fn weight(&self, di: usize, dj: usize, dk: usize) -> f32 {
        self.w[di].x * self.w[dj].y * self.w[dk].z
    }
}

/// APIC D matrix inverse for quadratic B-splines.
/// D = (1/4) * dx^2 * I, so D_inv = 4 / dx^2
#[inline]
pub fn apic_d_inverse(dx: f32) -> f32 {
    4.0 / (dx * dx)
}
