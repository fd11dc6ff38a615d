//! Vertical stack combination
//!
//! A tall sample is scanned at several vertical positions. Each position is
//! reconstructed separately into a volume `<base>_<token>recon<ext>`, and
//! consecutive volumes share `pixel_overlap` slices. This module assembles them
//! into one volume `<base>combined_recon<ext>`.
//!
//! The output buffer is sized up front from [`StackLayout`]; each input is copied
//! into its window in order, so in overlap regions the later input wins.

use crate::errors::{Result, TomoError};
use crate::formats::{VolumeReader, VolumeWriter};
use crate::rebin::{rebin, RebinFactor, Reduction};
use crate::volume::{with_volume, Volume, Voxel};
use ndarray::{s, Array3};
use std::ops::Range;
use std::path::Path;
use tracing::{debug, info, warn};

/// Name tokens used when none are given
pub const DEFAULT_TOKENS: [&str; 9] = ["A", "B", "C", "D", "E", "F", "G", "H", "I"];

/// File suffix used when none is given
pub const DEFAULT_EXTENSION: &str = ".h5";

/// Optional parameters of [`combine_vertical_stack`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CombineOptions {
    /// Leading slices dropped from every input after the first, in unbinned pixels
    pub zstart: usize,
    /// Uniform block size applied to every axis of every input; 1 disables rebinning
    pub binning: usize,
    /// Block reduction used when rebinning
    pub reduction: Reduction,
    /// File suffix, including the dot
    pub extension: String,
    /// Per-input name tokens, one per scan position
    pub tokens: Vec<String>,
}

impl Default for CombineOptions {
    fn default() -> Self {
        Self {
            zstart: 0,
            binning: 1,
            reduction: Reduction::Mean,
            extension: DEFAULT_EXTENSION.to_string(),
            tokens: DEFAULT_TOKENS.iter().map(|t| (*t).to_string()).collect(),
        }
    }
}

impl CombineOptions {
    /// Replaces the name tokens with the whitespace-separated entries of `tokens`.
    #[must_use]
    pub fn with_tokens(mut self, tokens: &str) -> Self {
        self.tokens = tokens.split_whitespace().map(str::to_string).collect();
        self
    }
}

/// `<base>_<token>recon<extension>`
#[must_use]
pub fn input_name(base_name: &str, token: &str, extension: &str) -> String {
    format!("{}_{}recon{}", base_name, token, extension)
}

/// `<base>combined_recon<extension>`
#[must_use]
pub fn output_name(base_name: &str, extension: &str) -> String {
    format!("{}combined_recon{}", base_name, extension)
}

/// Slice arithmetic of a vertical stack.
///
/// All quantities are in the pixel units of the (possibly rebinned) volumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StackLayout {
    nz: usize,
    num_inputs: usize,
    overlap: usize,
    zstart: usize,
}

impl StackLayout {
    /// # Errors
    ///
    /// Returns [`TomoError::InvalidArgument`] when there are no inputs, when
    /// `overlap >= nz` (the windows would not advance), or when `zstart >= nz`
    /// (nothing of the later inputs would remain).
    pub fn new(nz: usize, num_inputs: usize, overlap: usize, zstart: usize) -> Result<Self> {
        if num_inputs == 0 {
            return Err(TomoError::invalid("at least one input volume is required"));
        }
        if overlap >= nz {
            return Err(TomoError::invalid(format!(
                "pixel overlap {} must be smaller than the volume depth {}",
                overlap, nz
            )));
        }
        if zstart >= nz {
            return Err(TomoError::invalid(format!(
                "zstart {} must be smaller than the volume depth {}",
                zstart, nz
            )));
        }
        Ok(Self {
            nz,
            num_inputs,
            overlap,
            zstart,
        })
    }

    /// `nz + (num_inputs - 1) * (nz - overlap)`
    #[must_use]
    pub fn total_slices(&self) -> usize {
        self.nz + (self.num_inputs - 1) * self.stride()
    }

    fn stride(&self) -> usize {
        self.nz - self.overlap
    }

    /// Output slices written by input `index`.
    ///
    /// Input 0 fills `[0, nz)`. Input `i > 0` nominally starts at
    /// `(nz - overlap) * i`; with `zstart` its window starts `zstart` slices later
    /// and still ends at `(nz - overlap) * i + nz`, which for the last input is the
    /// end of the output.
    #[must_use]
    pub fn window(&self, index: usize) -> Range<usize> {
        if index == 0 {
            return 0..self.nz;
        }
        let first = self.stride() * index;
        (first + self.zstart)..(first + self.nz)
    }

    /// Slices of input `index` that are copied into [`window`](Self::window).
    #[must_use]
    pub fn source(&self, index: usize) -> Range<usize> {
        if index == 0 {
            0..self.nz
        } else {
            self.zstart..self.nz
        }
    }

    /// Output slices that no input covers, when `zstart` exceeds the overlap
    #[must_use]
    pub fn unfilled_slices(&self) -> usize {
        (self.num_inputs - 1) * self.zstart.saturating_sub(self.overlap)
    }
}

/// Combines `num_inputs` vertically overlapping volumes into one.
///
/// Input `i` is read from `<base_name>_<tokens[i]>recon<extension>`. With
/// `binning > 1` every input is rebinned by that factor on every axis with
/// `options.reduction` (element type kept), and `pixel_overlap` and `zstart` are
/// divided by it. The assembled volume is written to `<base_name>combined_recon<extension>` and also
/// returned.
///
/// # Errors
///
/// - [`TomoError::InvalidArgument`] for zero inputs, zero binning, fewer tokens than
///   inputs, or an overlap/zstart not smaller than the volume depth
/// - [`TomoError::ShapeMismatch`] / [`TomoError::TypeMismatch`] when a later input
///   does not match the first one
/// - any read or write error from `store`
///
/// Nothing is written unless every input was read and inserted.
pub fn combine_vertical_stack<S>(
    store: &mut S,
    base_name: &str,
    num_inputs: usize,
    pixel_overlap: usize,
    options: &CombineOptions,
) -> Result<Volume>
where
    S: VolumeReader + VolumeWriter + ?Sized,
{
    if num_inputs == 0 {
        return Err(TomoError::invalid("at least one input volume is required"));
    }
    if options.binning == 0 {
        return Err(TomoError::invalid("binning must be at least 1"));
    }
    if options.tokens.len() < num_inputs {
        return Err(TomoError::invalid(format!(
            "{} input files requested but only {} name tokens given",
            num_inputs,
            options.tokens.len()
        )));
    }
    info!("Extensions = {:?}", options.tokens);

    let names: Vec<String> = options.tokens[..num_inputs]
        .iter()
        .map(|token| input_name(base_name, token, &options.extension))
        .collect();

    info!("Reading file {}", names[0]);
    let first = store.read_volume(Path::new(&names[0]))?;
    let [nz, ny, nx] = first.shape();
    info!(
        "Read file {}, dimensions={} {} {}, datatype={}",
        names[0],
        nz,
        ny,
        nx,
        first.dtype()
    );

    let combined: Volume = with_volume!(first, data => {
        assemble(&*store, data, &names, pixel_overlap, options)?.into()
    });

    let output = output_name(base_name, &options.extension);
    info!("Writing combined volume {}", output);
    store.write_volume(Path::new(&output), &combined)?;

    Ok(combined)
}

fn assemble<T, R>(
    reader: &R,
    first: Array3<T>,
    names: &[String],
    pixel_overlap: usize,
    options: &CombineOptions,
) -> Result<Array3<T>>
where
    T: Voxel,
    R: VolumeReader + ?Sized,
{
    let binning = RebinFactor::Uniform(options.binning);
    let bin = |data: Array3<T>| -> Result<Array3<T>> {
        if binning.is_identity() {
            Ok(data)
        } else {
            rebin(&data, &binning, options.reduction)
        }
    };

    let first = bin(first)?;
    let (overlap, zstart) = (pixel_overlap / options.binning, options.zstart / options.binning);
    if !binning.is_identity() {
        let (nz, ny, nx) = first.dim();
        info!(
            "Binned by {} ({}), dimensions={} {} {}, pixel_overlap={}, zstart={}",
            options.binning,
            options.reduction,
            nz,
            ny,
            nx,
            overlap,
            zstart
        );
    }

    let (nz, ny, nx) = first.dim();
    let layout = StackLayout::new(nz, names.len(), overlap, zstart)?;
    if layout.unfilled_slices() > 0 {
        warn!(
            "zstart {} exceeds pixel overlap {}: {} slices will not be covered by any input and stay zero",
            zstart,
            overlap,
            layout.unfilled_slices()
        );
    }

    let nz_total = layout.total_slices();
    info!("Creating empty array, dimensions = {} {} {}", nz_total, ny, nx);
    let mut combined = Array3::<T>::default((nz_total, ny, nx));

    let window = layout.window(0);
    info!("Inserting into volume array from slice {} to {}", window.start, window.end);
    combined.slice_mut(s![window, .., ..]).assign(&first);
    drop(first);

    for (index, name) in names.iter().enumerate().skip(1) {
        info!("Reading file {}", name);
        let volume = bin(T::from_volume(reader.read_volume(Path::new(name))?)?)?;
        if volume.dim() != (nz, ny, nx) {
            let (fz, fy, fx) = volume.dim();
            return Err(TomoError::ShapeMismatch {
                context: format!("input {}", name),
                expected: vec![nz, ny, nx],
                found: vec![fz, fy, fx],
            });
        }

        let window = layout.window(index);
        let source = layout.source(index);
        debug!("Copying source slices {}..{}", source.start, source.end);
        info!("Inserting in volume array from slice {} to {}", window.start, window.end);
        combined
            .slice_mut(s![window, .., ..])
            .assign(&volume.slice(s![source, .., ..]));
    }

    Ok(combined)
}
