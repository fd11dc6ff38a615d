//! Defines command-line interface options using `clap` for the tomoprep application.

use clap::{Args as ClapArgs, Parser, Subcommand};
use std::path::PathBuf;
use tomo_prep::combine::{DEFAULT_EXTENSION, DEFAULT_TOKENS};
use tomo_prep::pipelines::{DEFAULT_ZINGER_FILTER_SIZE, DEFAULT_ZINGER_THRESHOLD};
use tomo_prep::Reduction;

/// Tomography preprocessing for synchrotron beamline data
#[derive(Parser, Debug)]
#[command(
    version,
    name = "tomoprep",
    about = "Stitch, normalize and clean tomography datasets"
)]
pub struct Args {
    /// Enable debug logging.
    #[arg(short, long, global = true, default_value_t = false)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Combine vertically overlapping reconstructions into one volume
    Combine(CombineArgs),
    /// Normalize radiographs against the flat fields of another file
    Normalize(NormalizeArgs),
    /// Normalize, remove zingers and convert an APS 13-BM file to a netCDF volume
    Preprocess(PreprocessArgs),
    /// Overwrite the flat fields of one HDF5 file with those of another
    ReplaceFlats(ReplaceFlatsArgs),
}

#[derive(ClapArgs, Debug)]
pub struct CombineArgs {
    /// Base file name
    pub base_file: String,

    /// Number of files
    pub num_files: usize,

    /// Number of overlapped pixels
    pub pixel_overlap: usize,

    /// First z value in second and subsequent files
    #[arg(short, long, default_value_t = 0)]
    pub zstart: usize,

    /// Rebin every volume by this factor on each axis before combining
    #[arg(short, long, default_value_t = 1)]
    pub binning: usize,

    /// Block reduction used when binning: mean, sum, min or max
    #[arg(short, long, default_value_t = Reduction::Mean, value_parser = parse_reduction)]
    pub reduction: Reduction,

    /// File suffix
    #[arg(short, long, default_value = DEFAULT_EXTENSION)]
    pub suffix: String,

    /// File extensions (name tokens), whitespace separated
    #[arg(short, long, default_value_t = DEFAULT_TOKENS.join(" "))]
    pub extensions: String,
}

fn parse_reduction(s: &str) -> Result<Reduction, String> {
    s.parse().map_err(|e: tomo_prep::TomoError| e.to_string())
}

#[derive(ClapArgs, Debug)]
pub struct NormalizeArgs {
    /// File for flat fields, without the .h5 suffix
    pub flat_file: String,

    /// File for radiographs, without the .h5 suffix
    pub radiography_file: String,

    /// First image to process
    #[arg(short, long)]
    pub first_image: Option<usize>,

    /// Last image to process (exclusive)
    #[arg(short, long)]
    pub last_image: Option<usize>,

    /// Number of pixels to shift flat field horizontally
    #[arg(short, long, default_value_t = 0, allow_negative_numbers = true)]
    pub xshift: isize,

    /// Number of pixels to shift flat field vertically
    #[arg(short, long, default_value_t = 0, allow_negative_numbers = true)]
    pub yshift: isize,

    /// Dark field value
    #[arg(short, long)]
    pub dark_value: Option<f32>,

    /// Zinger threshold, 0 disables zinger removal
    #[arg(short = 't', long, default_value_t = DEFAULT_ZINGER_THRESHOLD)]
    pub zinger_threshold: f32,

    /// Zinger filter size
    #[arg(short = 's', long, default_value_t = DEFAULT_ZINGER_FILTER_SIZE)]
    pub zinger_filter_size: usize,
}

#[derive(ClapArgs, Debug)]
pub struct PreprocessArgs {
    /// Name of the HDF5 file, without the .h5 suffix
    pub filename: String,

    /// Dark field value
    #[arg(short, long)]
    pub dark_value: Option<f32>,

    /// Zinger threshold
    #[arg(short = 't', long, default_value_t = DEFAULT_ZINGER_THRESHOLD)]
    pub zinger_threshold: f32,

    /// Zinger filter size
    #[arg(short = 's', long, default_value_t = DEFAULT_ZINGER_FILTER_SIZE)]
    pub zinger_filter_size: usize,
}

#[derive(ClapArgs, Debug)]
pub struct ReplaceFlatsArgs {
    /// HDF5 file whose flat fields are replaced
    pub bad_file: PathBuf,

    /// HDF5 file providing the flat fields
    pub good_file: PathBuf,
}
