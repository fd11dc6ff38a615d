//! HDF5 I/O for the data exchange layout
//!
//! Projections, flats and darks live under the `exchange` group; reconstructed
//! volumes are written as `/exchange/data`. All reads go through raw buffers so the
//! stored element type is kept.

use crate::errors::{Result, TomoError};
use crate::volume::{contiguous, volume_dims, with_volume, Volume, Voxel};
use hdf5::types::{FloatSize, IntSize, TypeDescriptor};
use hdf5::{Dataset, File, Group, H5Type};
use ndarray::Array3;
use std::path::Path;
use tracing::debug;

/// Projections, or the reconstructed volume
pub const DATA_PATH: &str = "/exchange/data";
/// Flat (white) fields
pub const FLAT_PATH: &str = "/exchange/data_white";
/// Dark fields
pub const DARK_PATH: &str = "/exchange/data_dark";
/// Projection angles
pub const THETA_PATH: &str = "/exchange/theta";
/// Scalar dark level recorded by the acquisition software
pub const DARK_FIELD_VALUE_PATH: &str = "/process/acquisition/dark_fields/dark_field_value";

const EXCHANGE_GROUP: &str = "exchange";
const DATA_NAME: &str = "data";

fn open_dataset(file: &File, file_path: &Path, dataset: &str) -> Result<Dataset> {
    if !file.link_exists(dataset) {
        return Err(TomoError::DatasetNotFound {
            file: file_path.to_path_buf(),
            path: dataset.to_string(),
        });
    }
    Ok(file.dataset(dataset)?)
}

fn read_typed<T>(dataset: &Dataset, dims: (usize, usize, usize)) -> Result<Volume>
where
    T: Voxel + H5Type,
    Volume: From<Array3<T>>,
{
    let raw = dataset.read_raw::<T>()?;
    Ok(Volume::from(Array3::from_shape_vec(dims, raw)?))
}

/// Reads the 3-D dataset at `dataset` from the file at `path`.
///
/// # Errors
///
/// Fails if the file cannot be opened, the dataset is missing or not 3-D, or its
/// element type has no [`Volume`] variant.
pub fn read_dataset(path: &Path, dataset: &str) -> Result<Volume> {
    let file = File::open(path)?;
    let ds = open_dataset(&file, path, dataset)?;
    let dims = volume_dims(&ds.shape(), &format!("{}:{}", path.display(), dataset))?;
    let descriptor = ds.dtype()?.to_descriptor()?;
    debug!("Reading {}:{} as {:?}, shape {:?}", path.display(), dataset, descriptor, dims);

    match descriptor {
        TypeDescriptor::Unsigned(IntSize::U1) => read_typed::<u8>(&ds, dims),
        TypeDescriptor::Integer(IntSize::U1) => read_typed::<i8>(&ds, dims),
        TypeDescriptor::Unsigned(IntSize::U2) => read_typed::<u16>(&ds, dims),
        TypeDescriptor::Integer(IntSize::U2) => read_typed::<i16>(&ds, dims),
        TypeDescriptor::Unsigned(IntSize::U4) => read_typed::<u32>(&ds, dims),
        TypeDescriptor::Integer(IntSize::U4) => read_typed::<i32>(&ds, dims),
        TypeDescriptor::Unsigned(IntSize::U8) => read_typed::<u64>(&ds, dims),
        TypeDescriptor::Integer(IntSize::U8) => read_typed::<i64>(&ds, dims),
        TypeDescriptor::Float(FloatSize::U4) => read_typed::<f32>(&ds, dims),
        TypeDescriptor::Float(FloatSize::U8) => read_typed::<f64>(&ds, dims),
        other => Err(TomoError::UnsupportedType(format!(
            "{:?} in {}:{}",
            other,
            path.display(),
            dataset
        ))),
    }
}

/// Reads a numeric dataset of any rank as a flat `f64` vector.
pub fn read_values_f64(path: &Path, dataset: &str) -> Result<Vec<f64>> {
    let file = File::open(path)?;
    let ds = open_dataset(&file, path, dataset)?;
    Ok(ds.read_raw::<f64>()?)
}

/// Reads the first element of a scalar or 1-D dataset as `f64`.
pub fn read_first_f64(path: &Path, dataset: &str) -> Result<f64> {
    read_values_f64(path, dataset)?
        .first()
        .copied()
        .ok_or_else(|| TomoError::invalid(format!("dataset {}:{} is empty", path.display(), dataset)))
}

fn create_typed<T: H5Type>(group: &Group, name: &str, data: &Array3<T>) -> Result<()> {
    let ds = group.new_dataset::<T>().shape(data.dim()).create(name)?;
    ds.write_raw(&*contiguous(data))?;
    Ok(())
}

/// Writes `volume` as `/exchange/data`, truncating any existing file.
pub fn write_volume(path: &Path, volume: &Volume) -> Result<()> {
    let file = File::create(path)?;
    let group = file.create_group(EXCHANGE_GROUP)?;
    debug!("Writing {} {:?} to {}:{}", volume.dtype(), volume.shape(), path.display(), DATA_PATH);
    with_volume!(volume, data => create_typed(&group, DATA_NAME, data))
}

fn overwrite_typed<T: H5Type>(dataset: &Dataset, data: &Array3<T>) -> Result<()> {
    dataset.write_raw(&*contiguous(data))?;
    Ok(())
}

/// Replaces the contents of an existing dataset in place.
///
/// The dataset keeps its stored element type; values are converted by HDF5 on write.
///
/// # Errors
///
/// Returns [`TomoError::ShapeMismatch`] if `volume` does not have the dataset's shape.
pub fn overwrite_dataset(path: &Path, dataset: &str, volume: &Volume) -> Result<()> {
    let file = File::open_rw(path)?;
    let ds = open_dataset(&file, path, dataset)?;
    let stored = ds.shape();
    if stored != volume.shape() {
        return Err(TomoError::ShapeMismatch {
            context: format!("{}:{}", path.display(), dataset),
            expected: stored,
            found: volume.shape().to_vec(),
        });
    }
    with_volume!(volume, data => overwrite_typed(&ds, data))
}
