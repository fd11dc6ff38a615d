//! Block reduction (rebinning) of n-dimensional arrays
//!
//! Each axis is cut into contiguous blocks of a fixed size and every block is
//! folded into one value. Partial blocks at the end of an axis are dropped. The
//! element type of the result is the element type of the input: reductions run in
//! `f64` and are narrowed back with [`Voxel::from_f64`].

use crate::errors::{Result, TomoError};
use crate::volume::Voxel;
use ndarray::{Array, ArrayBase, ArrayView, Axis, Data, Dimension};
use std::fmt;
use std::str::FromStr;

/// Reduction factor: one size for every axis, or one size per axis
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RebinFactor {
    Uniform(usize),
    PerAxis(Vec<usize>),
}

impl RebinFactor {
    /// Expands the factor to one block size per axis.
    ///
    /// # Errors
    ///
    /// Returns [`TomoError::InvalidArgument`] for a zero block size or when a
    /// per-axis factor does not have `ndim` entries.
    pub fn per_axis(&self, ndim: usize) -> Result<Vec<usize>> {
        let factors = match self {
            Self::Uniform(f) => vec![*f; ndim],
            Self::PerAxis(factors) => {
                if factors.len() != ndim {
                    return Err(TomoError::invalid(format!(
                        "rebin factor has {} entries but the array has {} dimensions",
                        factors.len(),
                        ndim
                    )));
                }
                factors.clone()
            }
        };
        if factors.contains(&0) {
            return Err(TomoError::invalid(format!(
                "rebin factors must be positive, got {:?}",
                factors
            )));
        }
        Ok(factors)
    }

    /// True when every block size is 1
    #[must_use]
    pub fn is_identity(&self) -> bool {
        match self {
            Self::Uniform(f) => *f == 1,
            Self::PerAxis(factors) => factors.iter().all(|&f| f == 1),
        }
    }
}

/// Reduction applied to each block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Reduction {
    /// Arithmetic mean
    #[default]
    Mean,
    /// Sum of values
    Sum,
    /// Minimum value
    Min,
    /// Maximum value
    Max,
}

impl Reduction {
    /// Every reduction, in command-line order
    pub const ALL: [Self; 4] = [Self::Mean, Self::Sum, Self::Min, Self::Max];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Mean => "mean",
            Self::Sum => "sum",
            Self::Min => "min",
            Self::Max => "max",
        }
    }

    /// Folds the values of one block in `f64`.
    pub fn reduce<I: IntoIterator<Item = f64>>(self, values: I) -> f64 {
        let mut values = values.into_iter();
        match self {
            Self::Sum => values.sum(),
            Self::Mean => {
                let (sum, count) = values.fold((0.0_f64, 0_usize), |(s, n), v| (s + v, n + 1));
                if count == 0 {
                    f64::NAN
                } else {
                    sum / count as f64
                }
            }
            Self::Min => match values.next() {
                Some(first) => values.fold(first, f64::min),
                None => f64::NAN,
            },
            Self::Max => match values.next() {
                Some(first) => values.fold(first, f64::max),
                None => f64::NAN,
            },
        }
    }
}

impl fmt::Display for Reduction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parses `mean`, `sum`, `min` or `max`.
impl FromStr for Reduction {
    type Err = TomoError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|r| r.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                TomoError::invalid(format!(
                    "unknown reduction '{}', expected one of mean, sum, min, max",
                    s.trim()
                ))
            })
    }
}

/// Rebins `data` by `factor`, reducing each block with `reduction`.
///
/// The result has `data.shape()[i] / factor[i]` elements along axis `i` and the same
/// element type as `data`. A factor of 1 on every axis returns an exact copy.
///
/// # Errors
///
/// Returns [`TomoError::InvalidArgument`] when the factor is zero or its length does
/// not match the number of dimensions.
pub fn rebin<S, T, D>(data: &ArrayBase<S, D>, factor: &RebinFactor, reduction: Reduction) -> Result<Array<T, D>>
where
    S: Data<Elem = T>,
    T: Voxel,
    D: Dimension,
{
    if factor.is_identity() {
        factor.per_axis(data.ndim())?;
        return Ok(data.to_owned());
    }
    rebin_with(data, factor, |block| {
        T::from_f64(reduction.reduce(block.iter().map(|v| v.to_f64())))
    })
}

/// Rebins `data` by `factor` with an arbitrary block reduction.
///
/// `reduce` receives a view of each complete block in row-major block order.
///
/// # Errors
///
/// Same as [`rebin`].
pub fn rebin_with<S, T, D, F>(data: &ArrayBase<S, D>, factor: &RebinFactor, mut reduce: F) -> Result<Array<T, D>>
where
    S: Data<Elem = T>,
    D: Dimension,
    F: FnMut(ArrayView<'_, T, D>) -> T,
{
    let factors = factor.per_axis(data.ndim())?;

    let mut block = data.raw_dim();
    let mut reduced = data.raw_dim();
    for (axis, &f) in factors.iter().enumerate() {
        block.slice_mut()[axis] = f;
        reduced.slice_mut()[axis] = data.len_of(Axis(axis)) / f;
    }

    let values: Vec<T> = data.exact_chunks(block).into_iter().map(&mut reduce).collect();
    Ok(Array::from_shape_vec(reduced, values)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_reduction_names() {
        assert_eq!("mean".parse::<Reduction>().unwrap(), Reduction::Mean);
        assert_eq!(" MAX".parse::<Reduction>().unwrap(), Reduction::Max);
        for reduction in Reduction::ALL {
            assert_eq!(reduction.to_string().parse::<Reduction>().unwrap(), reduction);
        }
        assert!(matches!("median".parse::<Reduction>(), Err(TomoError::InvalidArgument(_))));
    }

    #[test]
    fn reductions_fold_in_f64() {
        let values = [1.0, 4.0, 2.0, 5.0];
        assert_eq!(Reduction::Mean.reduce(values), 3.0);
        assert_eq!(Reduction::Sum.reduce(values), 12.0);
        assert_eq!(Reduction::Min.reduce(values), 1.0);
        assert_eq!(Reduction::Max.reduce(values), 5.0);
        assert!(Reduction::Mean.reduce(std::iter::empty()).is_nan());
    }
}
