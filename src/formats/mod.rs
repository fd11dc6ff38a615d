//! Volume file formats
//!
//! Two on-disk layouts are supported:
//! - [`VolumeFormat::Hdf5`]: the data exchange layout, array at `/exchange/data`
//! - [`VolumeFormat::NetCdf`]: a `VOLUME` variable with dimensions `NZ, NY, NX`
//!
//! The format is chosen once from the file suffix with [`VolumeFormat::from_path`]
//! and handed to the algorithms as a [`VolumeReader`] / [`VolumeWriter`].

pub mod hdf5_io;
pub mod netcdf_io;

use crate::errors::Result;
use crate::volume::Volume;
use std::fmt;
use std::path::Path;

/// Loads volumes
pub trait VolumeReader {
    /// Reads the volume stored at `path` with its element type preserved.
    fn read_volume(&self, path: &Path) -> Result<Volume>;
}

/// Persists volumes
pub trait VolumeWriter {
    /// Writes `volume` to `path`, replacing any existing file.
    fn write_volume(&mut self, path: &Path, volume: &Volume) -> Result<()>;
}

/// Supported volume layouts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VolumeFormat {
    Hdf5,
    NetCdf,
}

impl VolumeFormat {
    /// Names ending in `h5` are HDF5, everything else is netCDF.
    pub fn from_path(path: impl AsRef<Path>) -> Self {
        if path.as_ref().to_string_lossy().ends_with("h5") {
            Self::Hdf5
        } else {
            Self::NetCdf
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Hdf5 => "HDF5",
            Self::NetCdf => "netCDF",
        }
    }
}

impl fmt::Display for VolumeFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl VolumeReader for VolumeFormat {
    fn read_volume(&self, path: &Path) -> Result<Volume> {
        match self {
            Self::Hdf5 => hdf5_io::read_dataset(path, hdf5_io::DATA_PATH),
            Self::NetCdf => netcdf_io::read_volume(path),
        }
    }
}

impl VolumeWriter for VolumeFormat {
    fn write_volume(&mut self, path: &Path, volume: &Volume) -> Result<()> {
        match self {
            Self::Hdf5 => hdf5_io::write_volume(path, volume),
            Self::NetCdf => netcdf_io::write_volume(path, volume),
        }
    }
}
