//! Marching-cubes extraction of the zero isosurface.

use glam::Vec3;
use rayon::prelude::*;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::constants::SURFACE_EPS;

use super::tables::TRIANGLE_TABLE;
use super::{FluidSurface, Triangle};

/// Corner order of the classical case tables: bottom face counter-clockwise,
/// then the top face, bit b set when corner b is inside (sdf < 0).
const CORNER_OFFSETS: [[usize; 3]; 8] = [
    [0, 0, 0],
    [1, 0, 0],
    [1, 0, 1],
    [0, 0, 1],
    [0, 1, 0],
    [1, 1, 0],
    [1, 1, 1],
    [0, 1, 1],
];

/// Corner pairs spanned by the 12 cube edges.
const EDGE_ENDPOINTS: [[usize; 2]; 12] = [
    [0, 1],
    [1, 2],
    [2, 3],
    [3, 0],
    [4, 5],
    [5, 6],
    [6, 7],
    [7, 4],
    [0, 4],
    [1, 5],
    [2, 6],
    [3, 7],
];

/// Sweep every cube of 8 adjacent lattice nodes and triangulate the zero
/// crossing through it.
///
/// Cubes are processed in parallel; each triangle reserves its slot in the
/// triangle arena by atomic append. Overflowing the arena is a fatal,
/// reported condition - a truncated surface would silently lose tension.
pub fn extract_isosurface(surface: &mut FluidSurface) {
    surface.triangles.clear();

    let num = surface.grid_num;
    let cells = num - 1;
    let overflowed = AtomicBool::new(false);

    let sdf = &surface.sdf;
    let node_position = &surface.node_position;
    let triangles = &surface.triangles;

    (0..cells * cells * cells)
        .into_par_iter()
        .for_each(|cell_idx| {
            let k = cell_idx % cells;
            let j = (cell_idx / cells) % cells;
            let i = cell_idx / (cells * cells);

            let mut corner_values = [0.0f32; 8];
            let mut corner_positions = [Vec3::ZERO; 8];
            let mut config = 0usize;
            for (corner, offset) in CORNER_OFFSETS.iter().enumerate() {
                let idx = ((i + offset[0]) * num + (j + offset[1])) * num + (k + offset[2]);
                corner_values[corner] = sdf[idx];
                corner_positions[corner] = node_position[idx];
                config |= usize::from(sdf[idx] < 0.0) << corner;
            }

            let row = &TRIANGLE_TABLE[config];
            for t in 0..4 {
                if row[t * 3] == -1 {
                    break;
                }
                let triangle: Triangle = [
                    edge_crossing(row[t * 3] as usize, &corner_positions, &corner_values),
                    edge_crossing(row[t * 3 + 1] as usize, &corner_positions, &corner_values),
                    edge_crossing(row[t * 3 + 2] as usize, &corner_positions, &corner_values),
                ];
                if triangles.push(triangle).is_none() {
                    overflowed.store(true, Ordering::Relaxed);
                }
            }
        });

    assert!(
        !overflowed.load(Ordering::Relaxed),
        "triangle buffer overflow: capacity {} is too small for this surface",
        surface.triangles.capacity()
    );
}

/// Zero crossing on a cube edge by linear interpolation of its endpoint
/// values, with degenerate-case snapping to an endpoint (avoids division
/// blow-up near zero gradients).
fn edge_crossing(edge: usize, positions: &[Vec3; 8], values: &[f32; 8]) -> Vec3 {
    let [a, b] = EDGE_ENDPOINTS[edge];
    let (p1, p2) = (positions[a], positions[b]);
    let (v1, v2) = (values[a], values[b]);

    if (v1 - v2).abs() < SURFACE_EPS {
        p1
    } else if v2.abs() < SURFACE_EPS {
        p2
    } else if v1.abs() < SURFACE_EPS {
        p1
    } else {
        p1 + (-v1 / (v2 - v1)) * (p2 - p1)
    }
}
