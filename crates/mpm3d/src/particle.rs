//! Material points and their fixed-capacity store.

use glam::{Mat3, Vec3};
use rand::Rng;

use crate::arena::AppendArena;

/// Continuum material simulated by a particle.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
#[repr(u8)]
pub enum Material {
    /// Liquid - no shear resistance, shape-free volume tracking.
    #[default]
    Water,
    /// Soft elastic solid (jelly).
    Solid,
    /// Elastoplastic snow with a hardening response.
    Snow,
}

impl Material {
    /// Rest density relative to water.
    #[inline]
    pub const fn density(self) -> f32 {
        match self {
            Material::Water => 1.0,
            Material::Solid => 1.0,
            Material::Snow => 1.0,
        }
    }

    /// Whether this material contributes to the reconstructed liquid surface.
    #[inline]
    pub const fn is_fluid(self) -> bool {
        matches!(self, Material::Water)
    }

    /// Whether singular values of F are clamped by plasticity.
    #[inline]
    pub const fn is_plastic(self) -> bool {
        matches!(self, Material::Snow)
    }
}

/// A single material point.
///
/// `material` is fixed at seed time; every other field is rewritten each
/// substep by the constitutive model and the transfer operators.
#[derive(Clone, Copy, Debug)]
pub struct Particle {
    /// World position.
    pub position: Vec3,
    /// Velocity.
    pub velocity: Vec3,
    /// Elastic deformation gradient F.
    pub deformation_gradient: Mat3,
    /// APIC affine velocity matrix C.
    pub affine_velocity: Mat3,
    /// Accumulated plastic volume ratio Jp.
    pub plastic_ratio: f32,
    /// Mass.
    pub mass: f32,
    /// Material tag, immutable after creation.
    pub material: Material,
}

impl Particle {
    /// Create a resting particle with an undeformed configuration.
    pub fn new(position: Vec3, mass: f32, material: Material) -> Self {
        Self {
            position,
            velocity: Vec3::ZERO,
            deformation_gradient: Mat3::IDENTITY,
            affine_velocity: Mat3::ZERO,
            plastic_ratio: 1.0,
            mass,
            material,
        }
    }
}

impl Default for Particle {
    fn default() -> Self {
        Self::new(Vec3::ZERO, 0.0, Material::Water)
    }
}

/// Fixed-capacity particle store.
///
/// Particles are created once during seeding and live for the whole run; the
/// count only grows. Creation reserves slots through the arena's atomic
/// counter.
pub struct ParticleStore {
    particles: AppendArena<Particle>,
}

impl ParticleStore {
    pub fn new(capacity: usize) -> Self {
        Self {
            particles: AppendArena::new(capacity),
        }
    }

    /// Seed `count` particles of `material` uniformly inside the axis-aligned
    /// cube `[origin, origin + extent]^3`, at rest.
    ///
    /// Panics if the store cannot hold `count` more particles; overflowing the
    /// store would silently corrupt neighbours otherwise.
    pub fn add_cube(
        &mut self,
        origin: Vec3,
        extent: f32,
        count: usize,
        material: Material,
        particle_mass: f32,
    ) {
        assert!(
            self.len() + count <= self.capacity(),
            "particle store overflow: {} + {} exceeds capacity {}",
            self.len(),
            count,
            self.capacity()
        );

        let mut rng = rand::thread_rng();
        for _ in 0..count {
            let jitter = Vec3::new(rng.gen::<f32>(), rng.gen::<f32>(), rng.gen::<f32>());
            let position = origin + jitter * extent;
            self.particles
                .push(Particle::new(position, particle_mass, material))
                .expect("capacity checked above");
        }
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.particles.capacity()
    }

    pub fn as_slice(&self) -> &[Particle] {
        self.particles.as_slice()
    }

    pub fn as_mut_slice(&mut self) -> &mut [Particle] {
        self.particles.as_mut_slice()
    }

    /// Total mass of all live particles.
    pub fn total_mass(&self) -> f32 {
        self.as_slice().iter().map(|p| p.mass).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_cube_seeds_inside_bounds() {
        let mut store = ParticleStore::new(256);
        let origin = Vec3::new(0.4, 0.5, 0.4);
        store.add_cube(origin, 0.2, 256, Material::Water, 1e-4);

        assert_eq!(store.len(), 256);
        for p in store.as_slice() {
            assert!(p.position.cmpge(origin).all());
            assert!(p.position.cmple(origin + Vec3::splat(0.2)).all());
            assert_eq!(p.material, Material::Water);
            assert_eq!(p.deformation_gradient, Mat3::IDENTITY);
            assert_eq!(p.plastic_ratio, 1.0);
            assert_eq!(p.velocity, Vec3::ZERO);
        }
    }

    #[test]
    #[should_panic(expected = "particle store overflow")]
    fn add_cube_rejects_overflow() {
        let mut store = ParticleStore::new(10);
        store.add_cube(Vec3::ZERO, 0.1, 11, Material::Water, 1e-4);
    }

    #[test]
    fn total_mass_sums_all_particles() {
        let mut store = ParticleStore::new(100);
        store.add_cube(Vec3::splat(0.3), 0.1, 100, Material::Snow, 2e-4);
        assert!((store.total_mass() - 100.0 * 2e-4).abs() < 1e-6);
    }
}
