//! tomo_prep: preprocessing tools for synchrotron tomography
//!
//! Stitches vertically overlapping reconstructions into one volume, normalizes
//! projections against flat and dark fields, removes zingers, and repairs flat
//! fields in HDF5 exchange files.
//!
//! ## Module Organization
//!
//! - [`combine`]: vertical stack combination
//! - [`rebin`]: block reduction of n-dimensional arrays, element type preserved
//! - [`volume`]: the dynamically-typed [`Volume`] and the [`Voxel`] element trait
//! - [`formats`]: HDF5 and netCDF volume readers/writers
//! - [`corrections`]: flat/dark normalization, zinger removal, flat-field shifts
//! - [`pipelines`]: the per-dataset preprocessing commands
//! - [`logging`]: log subscriber setup
//! - [`errors`]: centralized error handling
//!
//! ## Usage
//!
//! ```rust,no_run
//! use tomo_prep::prelude::*;
//!
//! // Reads sample_Arecon.h5 .. sample_Crecon.h5, writes samplecombined_recon.h5
//! let mut format = VolumeFormat::from_path(".h5");
//! let options = CombineOptions::default();
//! let combined = combine_vertical_stack(&mut format, "sample", 3, 20, &options).unwrap();
//! println!("combined shape: {:?}", combined.shape());
//! ```

pub mod combine;
pub mod corrections;
pub mod errors;
pub mod formats;
pub mod logging;
pub mod pipelines;
pub mod rebin;
pub mod volume;

pub use combine::{combine_vertical_stack, CombineOptions, StackLayout};
pub use errors::{Result, TomoError};
pub use formats::{VolumeFormat, VolumeReader, VolumeWriter};
pub use rebin::{rebin, rebin_with, RebinFactor, Reduction};
pub use volume::{Volume, Voxel};

pub mod prelude {
    //! Commonly used imports for convenience
    pub use crate::combine::{combine_vertical_stack, CombineOptions, StackLayout};
    pub use crate::errors::{Result, TomoError};
    pub use crate::formats::{VolumeFormat, VolumeReader, VolumeWriter};
    pub use crate::pipelines::{NormalizeOptions, PreprocessOptions};
    pub use crate::rebin::{rebin, RebinFactor, Reduction};
    pub use crate::volume::{Volume, Voxel};
}
