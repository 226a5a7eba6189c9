//! Physical constants and numerical thresholds shared across the solver.

/// Gravity acceleration (m/s^2) - negative Y direction
pub const GRAVITY: f32 = -9.8;

/// Snow plasticity: singular values of the elastic deformation gradient are
/// clamped to [1 - SNOW_COMPRESSION, 1 + SNOW_STRETCH].
pub const SNOW_COMPRESSION: f32 = 2.5e-2;
pub const SNOW_STRETCH: f32 = 4.5e-3;

/// Hardening exponent scale: h = exp(HARDENING * (1 - Jp))
pub const HARDENING: f32 = 10.0;

/// Elastic softening factor applied to solid (jelly) particles.
pub const SOLID_SOFTENING: f32 = 0.3;

/// Far-field value the level set starts from before taking the union of
/// particle spheres. Must stay well above the zero isosurface so lattice
/// regions with no water nearby never triangulate.
pub const SDF_SENTINEL: f32 = 10.0;

/// Snapping threshold for marching-cubes edge interpolation and for
/// fractional offsets in trilinear sampling.
pub const SURFACE_EPS: f32 = 1e-5;
