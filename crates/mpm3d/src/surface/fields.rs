//! Finite-difference derivative fields of the signed-distance lattice and
//! trilinear sampling of all surface fields.

use glam::Vec3;
use rayon::prelude::*;

use crate::constants::SURFACE_EPS;

use super::FluidSurface;

/// Rebuild the unit-normal field as the normalized SDF gradient.
///
/// Central differences in the interior, one-sided at lattice boundaries so no
/// stencil ever leaves the lattice. A vanishing gradient yields a zero normal
/// instead of a NaN direction.
pub fn calculate_gradient(surface: &mut FluidSurface) {
    let num = surface.grid_num;
    let inv_dx = surface.inv_dx;
    let sdf = &surface.sdf;

    surface
        .gradient
        .par_iter_mut()
        .enumerate()
        .for_each(|(idx, normal)| {
            let (i, j, k) = delinearize(idx, num);
            let raw = Vec3::new(
                axis_difference(sdf, num, [i, j, k], 0) * 0.5 * inv_dx,
                axis_difference(sdf, num, [i, j, k], 1) * 0.5 * inv_dx,
                axis_difference(sdf, num, [i, j, k], 2) * 0.5 * inv_dx,
            );
            *normal = raw.normalize_or_zero();
        });
}

/// Rebuild the Laplacian field (mean-curvature proxy).
///
/// Second central differences in the interior, one-sided first differences at
/// lattice boundaries.
pub fn calculate_laplacian(surface: &mut FluidSurface) {
    let num = surface.grid_num;
    let inv_dx2 = surface.inv_dx * surface.inv_dx;
    let sdf = &surface.sdf;

    surface
        .laplacian
        .par_iter_mut()
        .enumerate()
        .for_each(|(idx, laplacian)| {
            let (i, j, k) = delinearize(idx, num);
            let mut sum = 0.0;
            for axis in 0..3 {
                sum += axis_second_difference(sdf, num, [i, j, k], axis) * inv_dx2;
            }
            *laplacian = sum;
        });
}

#[inline]
fn delinearize(idx: usize, num: usize) -> (usize, usize, usize) {
    let k = idx % num;
    let j = (idx / num) % num;
    let i = idx / (num * num);
    (i, j, k)
}

#[inline]
fn linearize(coord: [usize; 3], num: usize) -> usize {
    (coord[0] * num + coord[1]) * num + coord[2]
}

/// First difference along `axis`, one-sided at the lattice boundary.
#[inline]
fn axis_difference(sdf: &[f32], num: usize, coord: [usize; 3], axis: usize) -> f32 {
    let c = coord[axis];
    let mut lo = coord;
    let mut hi = coord;
    if c > 0 {
        lo[axis] = c - 1;
    }
    if c < num - 1 {
        hi[axis] = c + 1;
    }
    sdf[linearize(hi, num)] - sdf[linearize(lo, num)]
}

/// Second difference along `axis`; falls back to a one-sided first
/// difference at the lattice boundary.
#[inline]
fn axis_second_difference(sdf: &[f32], num: usize, coord: [usize; 3], axis: usize) -> f32 {
    let c = coord[axis];
    let center = sdf[linearize(coord, num)];
    if c == 0 {
        let mut hi = coord;
        hi[axis] = 1;
        sdf[linearize(hi, num)] - center
    } else if c == num - 1 {
        let mut lo = coord;
        lo[axis] = c - 1;
        sdf[linearize(lo, num)] - center
    } else {
        let mut lo = coord;
        let mut hi = coord;
        lo[axis] = c - 1;
        hi[axis] = c + 1;
        sdf[linearize(hi, num)] + sdf[linearize(lo, num)] - 2.0 * center
    }
}

/// Corner weights of the trilinear cell containing `position`.
///
/// The base corner is clamped to keep the full 2x2x2 cell on the lattice, and
/// fractional offsets within `SURFACE_EPS` of an integer snap to it, so a
/// query exactly at a node concentrates all weight on that node.
fn trilinear_cell(surface: &FluidSurface, position: Vec3) -> ([usize; 3], Vec3) {
    let num = surface.grid_num;
    let q = position * surface.inv_dx;
    let mut base = [0usize; 3];
    let mut frac = Vec3::ZERO;
    for axis in 0..3 {
        let b = q[axis].floor().clamp(0.0, (num - 2) as f32);
        let mut f = (q[axis] - b).clamp(0.0, 1.0);
        if f < SURFACE_EPS {
            f = 0.0;
        } else if f > 1.0 - SURFACE_EPS {
            f = 1.0;
        }
        base[axis] = b as usize;
        frac[axis] = f;
    }
    (base, frac)
}

macro_rules! trilinear_sum {
    ($surface:expr, $field:ident, $position:expr, $zero:expr) => {{
        let (base, frac) = trilinear_cell($surface, $position);
        let num = $surface.grid_num;
        let mut result = $zero;
        for di in 0..2 {
            for dj in 0..2 {
                for dk in 0..2 {
                    let wx = if di == 0 { 1.0 - frac.x } else { frac.x };
                    let wy = if dj == 0 { 1.0 - frac.y } else { frac.y };
                    let wz = if dk == 0 { 1.0 - frac.z } else { frac.z };
                    let idx = linearize([base[0] + di, base[1] + dj, base[2] + dk], num);
                    result += $surface.$field[idx] * (wx * wy * wz);
                }
            }
        }
        result
    }};
}

/// Trilinearly interpolated signed distance at `position`.
pub fn interpolate_sdf(surface: &FluidSurface, position: Vec3) -> f32 {
    trilinear_sum!(surface, sdf, position, 0.0f32)
}

/// Trilinearly interpolated surface normal at `position`.
pub fn interpolate_normal(surface: &FluidSurface, position: Vec3) -> Vec3 {
    trilinear_sum!(surface, gradient, position, Vec3::ZERO)
}

/// Trilinearly interpolated curvature at `position`.
pub fn interpolate_curvature(surface: &FluidSurface, position: Vec3) -> f32 {
    trilinear_sum!(surface, laplacian, position, 0.0f32)
}
