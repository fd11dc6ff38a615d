//! Creates a small vertical stack of netCDF reconstructions for trying out `tomoprep combine`.
//!
//! Writes `demo_Arecon.nc`, `demo_Brecon.nc` and `demo_Crecon.nc`, each 40 slices of
//! 64 × 64 `int16` voxels. Consecutive volumes share 8 slices, so
//!
//! ```text
//! tomoprep combine demo 3 8 -s .nc
//! ```
//!
//! produces `democombined_recon.nc` with 40 + 2 * 32 = 104 slices.

use ndarray::Array3;
use std::path::Path;
use tomo_prep::{Volume, VolumeFormat, VolumeWriter};

const NZ: usize = 40;
const NXY: usize = 64;
const OVERLAP: usize = 8;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut format = VolumeFormat::NetCdf;

    for (index, token) in ["A", "B", "C"].iter().enumerate() {
        let name = format!("demo_{}recon.nc", token);
        // Global slice number so the seams are easy to check after combining
        let offset = index * (NZ - OVERLAP);
        let data = Array3::from_shape_fn((NZ, NXY, NXY), |(z, y, x)| {
            let r2 = (y as i32 - 32).pow(2) + (x as i32 - 32).pow(2);
            if r2 < 24 * 24 {
                (offset + z) as i16
            } else {
                -1
            }
        });

        println!("🔨 Writing {} ({} x {} x {})", name, NZ, NXY, NXY);
        format.write_volume(Path::new(&name), &Volume::from(data))?;
    }

    println!("✅ Done. Try: tomoprep combine demo 3 {} -s .nc", OVERLAP);
    Ok(())
}
