//! Per-dataset preprocessing pipelines
//!
//! Sequential glue between the HDF5/netCDF readers and the corrections in
//! [`crate::corrections`]. Each pipeline reads its inputs, transforms them in
//! memory and writes a single output file.

use crate::corrections::{min_max, normalize, remove_outliers, roll, to_scaled_i16, INT16_SCALE};
use crate::errors::{Result, TomoError};
use crate::formats::hdf5_io::{self, DARK_FIELD_VALUE_PATH, DARK_PATH, DATA_PATH, FLAT_PATH, THETA_PATH};
use crate::formats::{VolumeFormat, VolumeWriter};
use crate::volume::Volume;
use ndarray::{s, Array3, Axis};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Default zinger threshold
pub const DEFAULT_ZINGER_THRESHOLD: f32 = 0.2;

/// Default zinger median filter size
pub const DEFAULT_ZINGER_FILTER_SIZE: usize = 3;

/// Options of [`normalize_radiographs`]
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizeOptions {
    /// First image to process, default 0
    pub first_image: Option<usize>,
    /// One past the last image to process, default the whole stack
    pub last_image: Option<usize>,
    /// Horizontal flat-field shift in pixels
    pub xshift: isize,
    /// Vertical flat-field shift in pixels
    pub yshift: isize,
    /// Overrides the dark level recorded in the flat file
    pub dark_value: Option<f32>,
    /// Zinger threshold; 0 disables zinger removal
    pub zinger_threshold: f32,
    pub zinger_filter_size: usize,
}

impl Default for NormalizeOptions {
    fn default() -> Self {
        Self {
            first_image: None,
            last_image: None,
            xshift: 0,
            yshift: 0,
            dark_value: None,
            zinger_threshold: DEFAULT_ZINGER_THRESHOLD,
            zinger_filter_size: DEFAULT_ZINGER_FILTER_SIZE,
        }
    }
}

/// Options of [`preprocess_13bm`]
#[derive(Debug, Clone, PartialEq)]
pub struct PreprocessOptions {
    /// Replaces every dark field pixel with this value
    pub dark_value: Option<f32>,
    pub zinger_threshold: f32,
    pub zinger_filter_size: usize,
}

impl Default for PreprocessOptions {
    fn default() -> Self {
        Self {
            dark_value: None,
            zinger_threshold: DEFAULT_ZINGER_THRESHOLD,
            zinger_filter_size: DEFAULT_ZINGER_FILTER_SIZE,
        }
    }
}

/// `<radio_file>_normalized.h5`
#[must_use]
pub fn normalized_output_name(radio_file: &str) -> String {
    format!("{}_normalized.h5", radio_file)
}

/// `<radio_file>_normalized.log`
#[must_use]
pub fn normalized_log_name(radio_file: &str) -> String {
    format!("{}_normalized.log", radio_file)
}

fn log_range(stage: &str, stack: &Array3<f32>) {
    match min_max(stack) {
        Some((min, max)) => info!("After {}, min: {}, max: {}", stage, min, max),
        None => warn!("After {}, no finite values", stage),
    }
}

/// Normalizes a stack of radiographs against the flat fields of another file.
///
/// Reads `<flat_file>.h5:/exchange/data_white` and the dark level from
/// `/process/acquisition/dark_fields/dark_field_value`, and
/// `<radio_file>.h5:/exchange/data_white` images `[first_image, last_image)`.
/// The result is scaled by 10000, stored as `i16` in `<radio_file>_normalized.h5`,
/// and that path is returned.
///
/// # Errors
///
/// Returns [`TomoError::InvalidArgument`] for an empty or out-of-range image range,
/// plus any read, shape or write error.
pub fn normalize_radiographs(flat_file: &str, radio_file: &str, options: &NormalizeOptions) -> Result<PathBuf> {
    info!("Reading data");
    let flat_path = PathBuf::from(format!("{}.h5", flat_file));
    let radio_path = PathBuf::from(format!("{}.h5", radio_file));

    let mut flat = hdf5_io::read_dataset(&flat_path, FLAT_PATH)?.to_f32();
    let recorded_dark = hdf5_io::read_first_f64(&flat_path, DARK_FIELD_VALUE_PATH)?;

    let radio = hdf5_io::read_dataset(&radio_path, FLAT_PATH)?.to_f32();
    let first = options.first_image.unwrap_or(0);
    let last = options.last_image.unwrap_or(radio.len_of(Axis(0)));
    info!("first image: {}", first);
    info!("last image: {}", last);
    if first >= last || last > radio.len_of(Axis(0)) {
        return Err(TomoError::invalid(format!(
            "image range {}..{} is empty or exceeds the {} radiographs in {}",
            first,
            last,
            radio.len_of(Axis(0)),
            radio_path.display()
        )));
    }
    let radio = radio.slice(s![first..last, .., ..]).to_owned();

    if options.xshift != 0 {
        flat = roll(&flat, options.xshift, Axis(2));
    }
    if options.yshift != 0 {
        flat = roll(&flat, options.yshift, Axis(1));
    }
    info!("xshift: {}", options.xshift);
    info!("yshift: {}", options.yshift);
    info!("radio.shape: {:?}", radio.shape());
    info!("flat.shape: {:?}", flat.shape());

    #[allow(clippy::cast_possible_truncation)]
    let dark_level = options.dark_value.unwrap_or(recorded_dark as f32);
    let (_, ny, nx) = flat.dim();
    let dark = Array3::from_elem((1, ny, nx), dark_level);
    info!("dark.shape: {:?}", dark.shape());
    info!("dark[0]: {}", dark_level);

    info!("Normalizing");
    let mut radio = normalize(&radio, &flat, &dark)?;
    log_range("normalizing", &radio);

    if options.zinger_threshold != 0.0 {
        info!(
            "Removing zingers. threshold:{}, size:{}",
            options.zinger_threshold, options.zinger_filter_size
        );
        radio = remove_outliers(&radio, options.zinger_threshold, options.zinger_filter_size)?;
        log_range("remove_outlier", &radio);
    }

    info!("Converting to integer");
    let scaled = Volume::from(to_scaled_i16(&radio, INT16_SCALE));

    info!("Writing normalized file");
    let output = PathBuf::from(normalized_output_name(radio_file));
    VolumeFormat::Hdf5.write_volume(&output, &scaled)?;
    info!("Normalized file written");
    Ok(output)
}

/// Preprocesses an APS 13-BM exchange file into a netCDF volume.
///
/// Reads projections, flats, darks and angles from `<fname>.h5`, normalizes, removes
/// zingers, scales by 10000 to `i16` and writes `<fname>.volume`, returning its path.
///
/// # Errors
///
/// Any read, shape or write error.
pub fn preprocess_13bm(fname: &str, options: &PreprocessOptions) -> Result<PathBuf> {
    info!("Reading data");
    let input = PathBuf::from(format!("{}.h5", fname));
    let proj = hdf5_io::read_dataset(&input, DATA_PATH)?.to_f32();
    let flat = hdf5_io::read_dataset(&input, FLAT_PATH)?.to_f32();
    let mut dark = hdf5_io::read_dataset(&input, DARK_PATH)?.to_f32();
    let theta = hdf5_io::read_values_f64(&input, THETA_PATH)?;
    info!("proj.shape: {:?}", proj.shape());
    info!("flat.shape: {:?}", flat.shape());
    info!("dark.shape: {:?}", dark.shape());

    if let Some(value) = options.dark_value {
        dark.fill(value);
    }
    if let Some(first) = dark.iter().next() {
        info!("dark[0]: {}", first);
    }
    match theta.last() {
        Some(last) => info!("last theta: {}", last),
        None => warn!("{} has no projection angles", input.display()),
    }

    info!("Normalizing");
    let proj = normalize(&proj, &flat, &dark)?;
    log_range("normalizing", &proj);

    info!(
        "Removing zingers. threshold={}, size={}",
        options.zinger_threshold, options.zinger_filter_size
    );
    let proj = remove_outliers(&proj, options.zinger_threshold, options.zinger_filter_size)?;
    log_range("remove_outlier", &proj);

    info!("Converting to integer");
    let scaled = Volume::from(to_scaled_i16(&proj, INT16_SCALE));

    info!("Writing volume file");
    let output = PathBuf::from(format!("{}.volume", fname));
    VolumeFormat::NetCdf.write_volume(&output, &scaled)?;
    info!("Volume file written");
    Ok(output)
}

/// Overwrites the flat fields of `bad_file` with those of `good_file`.
///
/// # Errors
///
/// Returns [`TomoError::ShapeMismatch`] if the two flat-field stacks differ in shape,
/// plus any read or write error.
pub fn replace_flat_fields(bad_file: &Path, good_file: &Path) -> Result<()> {
    info!("Reading flat fields from {}", good_file.display());
    let good = hdf5_io::read_dataset(good_file, FLAT_PATH)?;
    info!(
        "Replacing flat fields in {}, shape {:?}, datatype={}",
        bad_file.display(),
        good.shape(),
        good.dtype()
    );
    hdf5_io::overwrite_dataset(bad_file, FLAT_PATH, &good)
}
