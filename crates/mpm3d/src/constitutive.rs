//! Per-particle constitutive update: trial elastic deformation, hardening,
//! plasticity projection, and the stress contribution folded into the APIC
//! affine transfer matrix.

use glam::{Mat3, Vec3};
use nalgebra::Matrix3;

use crate::constants::{HARDENING, SNOW_COMPRESSION, SNOW_STRETCH, SOLID_SOFTENING};
use crate::particle::{Material, Particle};
use crate::params::SimParams;

/// Singular value decomposition F = U * diag(sigma) * V^T of a 3x3 matrix.
///
/// A decomposition that fails to produce both factors (numerically degenerate
/// input) falls back to identity rotations with the input treated as already
/// diagonal; the simulation continues rather than failing mid-substep.
pub fn svd3(m: Mat3) -> (Mat3, Vec3, Mat3) {
    let a = Matrix3::new(
        m.x_axis.x, m.y_axis.x, m.z_axis.x,
        m.x_axis.y, m.y_axis.y, m.z_axis.y,
        m.x_axis.z, m.y_axis.z, m.z_axis.z,
    );
    let svd = a.svd(true, true);
    let sigma = Vec3::new(
        svd.singular_values[0],
        svd.singular_values[1],
        svd.singular_values[2],
    );
    match (svd.u, svd.v_t) {
        (Some(u), Some(v_t)) => {
            let u = from_nalgebra(&u);
            let v = from_nalgebra(&v_t).transpose();
            (u, sigma, v)
        }
        _ => (Mat3::IDENTITY, sigma, Mat3::IDENTITY),
    }
}

fn from_nalgebra(m: &Matrix3<f32>) -> Mat3 {
    Mat3::from_cols(
        Vec3::new(m[(0, 0)], m[(1, 0)], m[(2, 0)]),
        Vec3::new(m[(0, 1)], m[(1, 1)], m[(2, 1)]),
        Vec3::new(m[(0, 2)], m[(1, 2)], m[(2, 2)]),
    )
}

/// Advance a particle's deformation state by one substep and return the
/// affine matrix (stress + mass * C) scattered by P2G.
///
/// Updates `deformation_gradient` and, for snow, `plastic_ratio` in place.
pub fn affine_momentum(particle: &mut Particle, params: &SimParams) -> Mat3 {
    let dt = params.dt;
    let dx = params.dx();

    // Trial elastic update from the affine velocity field.
    let f_trial = (Mat3::IDENTITY + particle.affine_velocity * dt) * particle.deformation_gradient;

    // Hardening: snow stiffens when compressed; solids use a fixed softening.
    let mut h = (HARDENING * (1.0 - particle.plastic_ratio)).exp();
    if particle.material == Material::Solid {
        h = SOLID_SOFTENING;
    }
    let mut mu = params.mu_0() * h;
    let lambda = params.lambda_0() * h;
    if particle.material == Material::Water {
        mu = 0.0;
    }

    let (u, mut sigma, v) = svd3(f_trial);

    let mut j = 1.0;
    for d in 0..3 {
        let old_sigma = sigma[d];
        let new_sigma = if particle.material.is_plastic() {
            old_sigma.clamp(1.0 - SNOW_COMPRESSION, 1.0 + SNOW_STRETCH)
        } else {
            old_sigma
        };
        particle.plastic_ratio *= old_sigma / new_sigma;
        sigma[d] = new_sigma;
        j *= new_sigma;
    }

    let f = match particle.material {
        // Water keeps only its volume: shape is discarded entirely.
        Material::Water => Mat3::from_diagonal(Vec3::new(j, 1.0, 1.0)),
        // Snow reconstructs the elastic gradient after the plastic clamp.
        Material::Snow => u * Mat3::from_diagonal(sigma) * v.transpose(),
        Material::Solid => f_trial,
    };
    particle.deformation_gradient = f;

    // Corotated stress plus the volumetric term, scaled into the affine
    // momentum contribution of the quadratic kernel.
    let r = u * v.transpose();
    let stress =
        2.0 * mu * (f - r) * f.transpose() + Mat3::IDENTITY * (lambda * j * (j - 1.0));
    let stress = stress * (-dt * params.p_vol() * 4.0 / (dx * dx));

    stress + particle.affine_velocity * particle.mass
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> SimParams {
        SimParams::new(64, 41, 1000)
    }

    #[test]
    fn svd_reconstructs_input() {
        let m = Mat3::from_cols(
            Vec3::new(1.1, 0.2, 0.0),
            Vec3::new(-0.1, 0.9, 0.3),
            Vec3::new(0.05, 0.0, 1.05),
        );
        let (u, sigma, v) = svd3(m);
        let rebuilt = u * Mat3::from_diagonal(sigma) * v.transpose();
        for c in 0..3 {
            assert!((rebuilt.col(c) - m.col(c)).length() < 1e-4);
        }
    }

    #[test]
    fn svd_of_identity_is_trivial() {
        let (u, sigma, v) = svd3(Mat3::IDENTITY);
        assert!((sigma - Vec3::ONE).length() < 1e-6);
        // U and V must agree up to sign so that U * V^T is the identity.
        let r = u * v.transpose();
        for c in 0..3 {
            assert!((r.col(c) - Mat3::IDENTITY.col(c)).length() < 1e-5);
        }
    }

    #[test]
    fn water_resets_shape_but_keeps_volume() {
        let params = params();
        let mut p = Particle::new(Vec3::splat(0.5), 1e-4, Material::Water);
        // A shearing affine velocity would deform any solid.
        p.affine_velocity = Mat3::from_cols(
            Vec3::new(0.0, 50.0, 0.0),
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(0.0, 0.0, 0.0),
        );
        affine_momentum(&mut p, &params);

        let f = p.deformation_gradient;
        // Shape-free: off-diagonals vanish, volume sits in the first entry.
        assert_eq!(f.x_axis.y, 0.0);
        assert_eq!(f.x_axis.z, 0.0);
        assert_eq!(f.y_axis.y, 1.0);
        assert_eq!(f.z_axis.z, 1.0);
    }

    #[test]
    fn snow_singular_values_stay_clamped() {
        let params = params();
        let mut p = Particle::new(Vec3::splat(0.5), 1e-4, Material::Snow);
        // Strong compression along x.
        p.affine_velocity = Mat3::from_diagonal(Vec3::new(-4000.0, 0.0, 0.0));
        affine_momentum(&mut p, &params);

        let (_, sigma, _) = svd3(p.deformation_gradient);
        for d in 0..3 {
            assert!(
                sigma[d] >= 1.0 - SNOW_COMPRESSION - 1e-5
                    && sigma[d] <= 1.0 + SNOW_STRETCH + 1e-5,
                "singular value {} escaped the plasticity clamp",
                sigma[d]
            );
        }
        // The clamp ratio moved into Jp.
        assert!(p.plastic_ratio < 1.0);
    }

    #[test]
    fn resting_particle_produces_zero_stress() {
        let params = params();
        let mut p = Particle::new(Vec3::splat(0.5), 1e-4, Material::Solid);
        let affine = affine_momentum(&mut p, &params);
        for c in 0..3 {
            assert!(affine.col(c).length() < 1e-6);
        }
    }
}
