//! Dynamically-typed 3-D volumes
//!
//! Reconstructions arrive as 8/16/32-bit integers or floats depending on the
//! beamline software that wrote them. [`Volume`] keeps the stored element type
//! exactly; generic code works on `Array3<T>` with `T: Voxel` and is reached
//! through [`with_volume!`](crate::volume::with_volume).

use crate::errors::{Result, TomoError};
use ndarray::Array3;
use std::borrow::Cow;
use std::fmt::Debug;

/// Element types a [`Volume`] can hold.
///
/// `to_f64` is the working precision used by reductions. `from_f64` is the
/// deliberate narrowing back to the stored type: integer types truncate toward
/// zero and saturate at their bounds (NaN becomes 0), floating types round to the
/// nearest representable value.
pub trait Voxel: Copy + Default + PartialOrd + Debug + Send + Sync + 'static {
    /// Name of the element type, numpy style
    const DTYPE: &'static str;

    fn to_f64(self) -> f64;

    fn from_f64(value: f64) -> Self;

    /// Unwraps the matching [`Volume`] variant.
    ///
    /// # Errors
    ///
    /// Returns [`TomoError::TypeMismatch`] when the volume holds another element type.
    fn from_volume(volume: Volume) -> Result<Array3<Self>>;
}

/// A dense `(z, y, x)` volume with its stored element type preserved
#[derive(Debug, Clone, PartialEq)]
pub enum Volume {
    U8(Array3<u8>),
    I8(Array3<i8>),
    U16(Array3<u16>),
    I16(Array3<i16>),
    U32(Array3<u32>),
    I32(Array3<i32>),
    U64(Array3<u64>),
    I64(Array3<i64>),
    F32(Array3<f32>),
    F64(Array3<f64>),
}

/// Runs `$body` with `$arr` bound to the typed array inside a [`Volume`].
///
/// Works on owned volumes and on references (match ergonomics).
macro_rules! with_volume {
    ($volume:expr, $arr:ident => $body:expr) => {
        match $volume {
            $crate::volume::Volume::U8($arr) => $body,
            $crate::volume::Volume::I8($arr) => $body,
            $crate::volume::Volume::U16($arr) => $body,
            $crate::volume::Volume::I16($arr) => $body,
            $crate::volume::Volume::U32($arr) => $body,
            $crate::volume::Volume::I32($arr) => $body,
            $crate::volume::Volume::U64($arr) => $body,
            $crate::volume::Volume::I64($arr) => $body,
            $crate::volume::Volume::F32($arr) => $body,
            $crate::volume::Volume::F64($arr) => $body,
        }
    };
}
pub(crate) use with_volume;

macro_rules! impl_voxel {
    ($($t:ty => $variant:ident, $name:literal;)*) => {
        $(
            impl Voxel for $t {
                const DTYPE: &'static str = $name;

                #[inline]
                fn to_f64(self) -> f64 {
                    self as f64
                }

                #[inline]
                #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
                fn from_f64(value: f64) -> Self {
                    // `as` from a float truncates toward zero and saturates
                    value as $t
                }

                fn from_volume(volume: Volume) -> Result<Array3<Self>> {
                    match volume {
                        Volume::$variant(data) => Ok(data),
                        other => Err(TomoError::TypeMismatch {
                            expected: $name,
                            found: other.dtype(),
                        }),
                    }
                }
            }

            impl From<Array3<$t>> for Volume {
                fn from(data: Array3<$t>) -> Self {
                    Volume::$variant(data)
                }
            }
        )*
    };
}

impl_voxel! {
    u8 => U8, "uint8";
    i8 => I8, "int8";
    u16 => U16, "uint16";
    i16 => I16, "int16";
    u32 => U32, "uint32";
    i32 => I32, "int32";
    u64 => U64, "uint64";
    i64 => I64, "int64";
    f32 => F32, "float32";
    f64 => F64, "float64";
}

impl Volume {
    /// Name of the stored element type
    #[must_use]
    pub fn dtype(&self) -> &'static str {
        fn name_of<T: Voxel>(_: &Array3<T>) -> &'static str {
            T::DTYPE
        }
        with_volume!(self, data => name_of(data))
    }

    /// `[nz, ny, nx]`
    #[must_use]
    pub fn shape(&self) -> [usize; 3] {
        with_volume!(self, data => {
            let (nz, ny, nx) = data.dim();
            [nz, ny, nx]
        })
    }

    /// Converts every voxel to `f32`, the working type of the flat-field corrections.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn to_f32(&self) -> Array3<f32> {
        with_volume!(self, data => data.mapv(|v| v.to_f64() as f32))
    }
}

/// Row-major contiguous view of the array data, copying only when the layout requires it.
pub(crate) fn contiguous<T: Copy>(data: &Array3<T>) -> Cow<'_, [T]> {
    match data.as_slice() {
        Some(slice) => Cow::Borrowed(slice),
        None => Cow::Owned(data.iter().copied().collect()),
    }
}

/// Validates that a stored shape is 3-D and returns it as `(nz, ny, nx)`.
pub(crate) fn volume_dims(shape: &[usize], context: &str) -> Result<(usize, usize, usize)> {
    match *shape {
        [nz, ny, nx] => Ok((nz, ny, nx)),
        _ => Err(TomoError::RankMismatch {
            context: context.to_string(),
            expected: 3,
            found: shape.to_vec(),
        }),
    }
}
