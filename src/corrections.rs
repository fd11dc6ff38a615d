//! Flat-field corrections on projection stacks
//!
//! Stacks are `(image, row, column)` arrays of `f32`.

use crate::errors::{Result, TomoError};
use ndarray::{Array2, Array3, ArrayView2, Axis, Slice};

/// Smallest flat-minus-dark denominator used by [`normalize`]
pub const DENOMINATOR_CUTOFF: f32 = 1e-6;

/// Scale applied before storing normalized data as 16-bit integers
pub const INT16_SCALE: f32 = 10000.0;

/// Average of a stack over its first axis.
///
/// # Errors
///
/// Returns [`TomoError::InvalidArgument`] for an empty stack.
pub fn mean_frame(stack: &Array3<f32>) -> Result<Array2<f32>> {
    stack
        .mean_axis(Axis(0))
        .ok_or_else(|| TomoError::invalid("cannot average an empty image stack"))
}

fn check_frames(what: &str, stack: &Array3<f32>, expected: (usize, usize)) -> Result<()> {
    let (_, ny, nx) = stack.dim();
    if (ny, nx) != expected {
        return Err(TomoError::ShapeMismatch {
            context: format!("{} frames", what),
            expected: vec![expected.0, expected.1],
            found: vec![ny, nx],
        });
    }
    Ok(())
}

/// Flat/dark normalization: `(proj - dark) / (flat - dark)`.
///
/// `flat` and `dark` are averaged over their first axis. Denominators below
/// [`DENOMINATOR_CUTOFF`] are raised to it.
///
/// # Errors
///
/// Returns [`TomoError::ShapeMismatch`] if the frame sizes differ, or
/// [`TomoError::InvalidArgument`] if `flat` or `dark` is empty.
pub fn normalize(proj: &Array3<f32>, flat: &Array3<f32>, dark: &Array3<f32>) -> Result<Array3<f32>> {
    let (_, ny, nx) = proj.dim();
    check_frames("flat", flat, (ny, nx))?;
    check_frames("dark", dark, (ny, nx))?;

    let flat = mean_frame(flat)?;
    let dark = mean_frame(dark)?;
    let denominator = (&flat - &dark).mapv(|d| d.max(DENOMINATOR_CUTOFF));

    let mut normalized = proj.clone();
    for mut frame in normalized.axis_iter_mut(Axis(0)) {
        frame -= &dark;
        frame /= &denominator;
    }
    Ok(normalized)
}

/// Index of `index` mirrored into `0..len`, repeating the edge sample (`d c b a | a b c d | d c b a`).
fn reflect(index: isize, len: usize) -> usize {
    let n = len as isize;
    let period = 2 * n;
    let i = index.rem_euclid(period);
    (if i >= n { period - 1 - i } else { i }) as usize
}

/// `size × size` median filter of one image, reflecting at the borders.
pub fn median_filter_2d(image: ArrayView2<'_, f32>, size: usize) -> Array2<f32> {
    let (ny, nx) = image.dim();
    let half = (size / 2) as isize;
    let mut window = Vec::with_capacity(size * size);

    Array2::from_shape_fn((ny, nx), |(y, x)| {
        window.clear();
        for dy in -half..=half {
            let row = reflect(y as isize + dy, ny);
            for dx in -half..=half {
                window.push(image[[row, reflect(x as isize + dx, nx)]]);
            }
        }
        let mid = window.len() / 2;
        *window.select_nth_unstable_by(mid, f32::total_cmp).1
    })
}

/// Zinger removal.
///
/// Each image is median filtered with a `size × size` kernel; a pixel that exceeds
/// its median by at least `threshold` is replaced with the median.
///
/// # Errors
///
/// Returns [`TomoError::InvalidArgument`] unless `size` is odd.
pub fn remove_outliers(stack: &Array3<f32>, threshold: f32, size: usize) -> Result<Array3<f32>> {
    if size % 2 == 0 {
        return Err(TomoError::invalid(format!(
            "zinger filter size must be odd, got {}",
            size
        )));
    }

    let mut cleaned = stack.clone();
    for mut image in cleaned.axis_iter_mut(Axis(0)) {
        let median = median_filter_2d(image.view(), size);
        image.zip_mut_with(&median, |value, &m| {
            if *value - m >= threshold {
                *value = m;
            }
        });
    }
    Ok(cleaned)
}

/// `scale * value` narrowed to `i16`, truncating toward zero and saturating.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn to_scaled_i16(stack: &Array3<f32>, scale: f32) -> Array3<i16> {
    stack.mapv(|v| (scale * v) as i16)
}

/// Cyclic shift along `axis`; positive shifts move data toward higher indices.
#[must_use]
pub fn roll<T: Clone>(data: &Array3<T>, shift: isize, axis: Axis) -> Array3<T> {
    let len = data.len_of(axis);
    if len == 0 {
        return data.clone();
    }
    let k = shift.rem_euclid(len as isize) as usize;
    if k == 0 {
        return data.clone();
    }

    let mut rolled = data.clone();
    rolled
        .slice_axis_mut(axis, Slice::from(k..))
        .assign(&data.slice_axis(axis, Slice::from(..len - k)));
    rolled
        .slice_axis_mut(axis, Slice::from(..k))
        .assign(&data.slice_axis(axis, Slice::from(len - k..)));
    rolled
}

/// Smallest and largest finite value, `None` if there are none.
#[must_use]
pub fn min_max(stack: &Array3<f32>) -> Option<(f32, f32)> {
    stack
        .iter()
        .copied()
        .filter(|v| v.is_finite())
        .fold(None, |acc, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
}
