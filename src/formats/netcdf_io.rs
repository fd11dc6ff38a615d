//! netCDF I/O for `VOLUME` files
//!
//! Reconstruction software stores integer volumes together with `scale_factor`
//! attributes. The netCDF crate never applies those attributes, so values come
//! back with exactly the stored element type; the z/slice arithmetic of the
//! combiner depends on that.

use crate::errors::{Result, TomoError};
use crate::volume::{contiguous, volume_dims, Volume};
use chrono::Utc;
use ndarray::Array3;
use netcdf::types::{FloatType, IntType, NcVariableType};
use std::{fs, path::Path};
use tracing::debug;

/// Name of the variable holding the volume
pub const VOLUME_VARIABLE: &str = "VOLUME";

/// Dimension names of the volume variable, slowest first
pub const DIMENSION_NAMES: [&str; 3] = ["NZ", "NY", "NX"];

macro_rules! read_as {
    ($var:expr, $dims:expr, $t:ty) => {{
        let raw: Vec<$t> = $var.get_values::<$t, _>(..)?;
        Volume::from(Array3::from_shape_vec($dims, raw)?)
    }};
}

macro_rules! put_as {
    ($file:expr, $data:expr, $t:ty) => {{
        let mut var = $file.add_variable::<$t>(VOLUME_VARIABLE, &DIMENSION_NAMES)?;
        var.put_values(&*contiguous($data), ..)?;
    }};
}

/// Reads the `VOLUME` variable of the netCDF file at `path`.
///
/// # Errors
///
/// Fails if the file cannot be opened, has no `VOLUME` variable, the variable is not
/// 3-D, or its type has no [`Volume`] variant.
pub fn read_volume(path: &Path) -> Result<Volume> {
    let file = netcdf::open(path)?;
    let var = file
        .variable(VOLUME_VARIABLE)
        .ok_or_else(|| TomoError::DatasetNotFound {
            file: path.to_path_buf(),
            path: VOLUME_VARIABLE.to_string(),
        })?;

    let shape: Vec<usize> = var.dimensions().iter().map(|d| d.len()).collect();
    let dims = volume_dims(&shape, &format!("{}:{}", path.display(), VOLUME_VARIABLE))?;
    let vartype = var.vartype();
    debug!("Reading {}:{} as {:?}, shape {:?}", path.display(), VOLUME_VARIABLE, vartype, dims);

    let volume = match vartype {
        NcVariableType::Int(IntType::U8) => read_as!(var, dims, u8),
        NcVariableType::Int(IntType::I8) => read_as!(var, dims, i8),
        NcVariableType::Int(IntType::U16) => read_as!(var, dims, u16),
        NcVariableType::Int(IntType::I16) => read_as!(var, dims, i16),
        NcVariableType::Int(IntType::U32) => read_as!(var, dims, u32),
        NcVariableType::Int(IntType::I32) => read_as!(var, dims, i32),
        NcVariableType::Int(IntType::U64) => read_as!(var, dims, u64),
        NcVariableType::Int(IntType::I64) => read_as!(var, dims, i64),
        NcVariableType::Float(FloatType::F32) => read_as!(var, dims, f32),
        NcVariableType::Float(FloatType::F64) => read_as!(var, dims, f64),
        other => {
            return Err(TomoError::UnsupportedType(format!(
                "{:?} in {}:{}",
                other,
                path.display(),
                VOLUME_VARIABLE
            )))
        }
    };
    Ok(volume)
}

/// Writes `volume` as the `VOLUME` variable, replacing any existing file.
pub fn write_volume(path: &Path, volume: &Volume) -> Result<()> {
    if path.exists() {
        fs::remove_file(path)?;
    }

    let mut file = netcdf::create(path)?;
    for (name, len) in DIMENSION_NAMES.iter().zip(volume.shape()) {
        file.add_dimension(name, len)?;
    }
    debug!("Writing {} {:?} to {}:{}", volume.dtype(), volume.shape(), path.display(), VOLUME_VARIABLE);

    match volume {
        Volume::U8(data) => put_as!(file, data, u8),
        Volume::I8(data) => put_as!(file, data, i8),
        Volume::U16(data) => put_as!(file, data, u16),
        Volume::I16(data) => put_as!(file, data, i16),
        Volume::U32(data) => put_as!(file, data, u32),
        Volume::I32(data) => put_as!(file, data, i32),
        Volume::U64(data) => put_as!(file, data, u64),
        Volume::I64(data) => put_as!(file, data, i64),
        Volume::F32(data) => put_as!(file, data, f32),
        Volume::F64(data) => put_as!(file, data, f64),
    }

    file.add_attribute(
        "history",
        format!("Created by tomo_prep on {}", Utc::now().to_rfc3339()),
    )?;

    Ok(())
}
