//! Point-cloud export of particle positions, one ASCII PLY file per frame.

use std::fs::File;
use std::io::{BufWriter, Result, Write};
use std::path::Path;

use glam::Vec3;

/// Write `positions` as an ASCII PLY vertex cloud at `path`.
pub fn write_ply(path: &Path, positions: &[Vec3]) -> Result<()> {
    let file = File::create(path)?;
    let mut out = BufWriter::new(file);

    writeln!(out, "ply")?;
    writeln!(out, "format ascii 1.0")?;
    writeln!(out, "element vertex {}", positions.len())?;
    writeln!(out, "property float x")?;
    writeln!(out, "property float y")?;
    writeln!(out, "property float z")?;
    writeln!(out, "end_header")?;
    for p in positions {
        writeln!(out, "{} {} {}", p.x, p.y, p.z)?;
    }
    out.flush()
}

/// Conventional frame file name, e.g. `water_0042.ply`.
pub fn frame_file_name(frame: usize) -> String {
    format!("water_{:04}.ply", frame)
}
