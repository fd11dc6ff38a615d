//! Centralized error handling for tomo_prep
//!
//! Every operation in the crate returns [`Result`]. Nothing is retried: an error
//! at any step aborts the whole command before any output file is written.

use std::fmt;
use std::path::PathBuf;

/// Main error type for tomo_prep operations
#[derive(Debug)]
pub enum TomoError {
    /// Malformed argument: bad rebin factor, too few name tokens, overlap too large, ...
    InvalidArgument(String),

    /// I/O operation errors
    IoError(std::io::Error),

    /// HDF5 file operation errors
    Hdf5Error(hdf5::Error),

    /// NetCDF file operation errors
    NetCDFError(netcdf::Error),

    /// Dataset or variable missing from a file
    DatasetNotFound { file: PathBuf, path: String },

    /// Array shapes that must agree do not
    ShapeMismatch {
        context: String,
        expected: Vec<usize>,
        found: Vec<usize>,
    },

    /// Stored array does not have the number of axes a volume needs
    RankMismatch {
        context: String,
        expected: usize,
        found: Vec<usize>,
    },

    /// Element type of an input differs from the one established by the first input
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },

    /// Stored element type has no `Volume` counterpart
    UnsupportedType(String),

    /// Array shape or dimension error
    ArrayError(ndarray::ShapeError),
}

impl fmt::Display for TomoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TomoError::InvalidArgument(msg) => write!(f, "Invalid argument: {}", msg),
            TomoError::IoError(e) => write!(f, "I/O error: {}", e),
            TomoError::Hdf5Error(e) => write!(f, "HDF5 error: {}", e),
            TomoError::NetCDFError(e) => write!(f, "NetCDF error: {}", e),
            TomoError::DatasetNotFound { file, path } => {
                write!(f, "Dataset '{}' not found in {}", path, file.display())
            }
            TomoError::ShapeMismatch {
                context,
                expected,
                found,
            } => write!(
                f,
                "Shape mismatch in {}: expected {:?}, found {:?}",
                context, expected, found
            ),
            TomoError::RankMismatch {
                context,
                expected,
                found,
            } => write!(
                f,
                "Rank mismatch in {}: expected a {}-D array, found shape {:?}",
                context, expected, found
            ),
            TomoError::TypeMismatch { expected, found } => {
                write!(f, "Element type mismatch: expected {}, found {}", expected, found)
            }
            TomoError::UnsupportedType(desc) => write!(f, "Unsupported element type: {}", desc),
            TomoError::ArrayError(e) => write!(f, "Array error: {}", e),
        }
    }
}

impl std::error::Error for TomoError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TomoError::IoError(e) => Some(e),
            TomoError::Hdf5Error(e) => Some(e),
            TomoError::NetCDFError(e) => Some(e),
            TomoError::ArrayError(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for TomoError {
    fn from(error: std::io::Error) -> Self {
        TomoError::IoError(error)
    }
}

impl From<hdf5::Error> for TomoError {
    fn from(error: hdf5::Error) -> Self {
        TomoError::Hdf5Error(error)
    }
}

impl From<netcdf::Error> for TomoError {
    fn from(error: netcdf::Error) -> Self {
        TomoError::NetCDFError(error)
    }
}

impl From<ndarray::ShapeError> for TomoError {
    fn from(error: ndarray::ShapeError) -> Self {
        TomoError::ArrayError(error)
    }
}

impl TomoError {
    /// Shorthand for [`TomoError::InvalidArgument`]
    pub fn invalid(msg: impl Into<String>) -> Self {
        TomoError::InvalidArgument(msg.into())
    }
}

/// Result type alias for tomo_prep operations
pub type Result<T> = std::result::Result<T, TomoError>;
