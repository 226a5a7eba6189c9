//! Falling water cube demo.
//!
//! Seeds a block of water above the floor, runs the simulation, and writes
//! one PLY point cloud per frame into `frames/`.
//!
//! Usage: dam_fall [frames]

use std::path::PathBuf;

use glam::Vec3;
use mpm3d::{export, Material, MpmSimulation, SimParams};

fn main() -> std::io::Result<()> {
    let frames: usize = std::env::args()
        .nth(1)
        .and_then(|arg| arg.parse().ok())
        .unwrap_or(500);

    let params = SimParams::new(128, 80, 30_000);
    let mut sim = MpmSimulation::new(params);
    sim.add_cube(Vec3::new(0.35, 0.5, 0.35), 0.23, 30_000, Material::Water);

    let out_dir = PathBuf::from("frames");
    std::fs::create_dir_all(&out_dir)?;

    println!(
        "dam_fall: {} particles, {} frames x {} substeps",
        sim.particles.len(),
        frames,
        sim.params.substeps
    );

    for frame in 1..=frames {
        sim.step_frame();
        let positions = sim.particle_positions();
        export::write_ply(&out_dir.join(export::frame_file_name(frame)), &positions)?;
        println!(
            "frame {:4}: {} triangles, {} surface particles",
            frame,
            sim.surface.triangles.len(),
            sim.surface.surface_particles.len()
        );
    }

    Ok(())
}
