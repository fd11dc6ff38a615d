//! Shared helpers for the integration tests

#![allow(dead_code)]

use ndarray::{concatenate, s, Array3, Axis};
use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use tomo_prep::{Result, TomoError, Volume, VolumeReader, VolumeWriter};

/// In-memory volume store keyed by file name
#[derive(Debug, Default)]
pub struct MemoryStore {
    pub volumes: HashMap<PathBuf, Volume>,
    pub written: Vec<PathBuf>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: &str, volume: impl Into<Volume>) {
        self.volumes.insert(PathBuf::from(name), volume.into());
    }

    pub fn get(&self, name: &str) -> Option<&Volume> {
        self.volumes.get(Path::new(name))
    }
}

impl VolumeReader for MemoryStore {
    fn read_volume(&self, path: &Path) -> Result<Volume> {
        self.volumes.get(path).cloned().ok_or_else(|| {
            TomoError::IoError(io::Error::new(
                io::ErrorKind::NotFound,
                format!("{} does not exist", path.display()),
            ))
        })
    }
}

impl VolumeWriter for MemoryStore {
    fn write_volume(&mut self, path: &Path, volume: &Volume) -> Result<()> {
        self.volumes.insert(path.to_path_buf(), volume.clone());
        self.written.push(path.to_path_buf());
        Ok(())
    }
}

/// Volume of `shape` with every voxel equal to `value`
pub fn constant<T: Clone>(shape: (usize, usize, usize), value: T) -> Array3<T> {
    Array3::from_elem(shape, value)
}

/// Volume whose voxels encode their position: `base + 100 * z + 10 * y + x`
pub fn ramp(shape: (usize, usize, usize), base: i32) -> Array3<i32> {
    Array3::from_shape_fn(shape, |(z, y, x)| base + 100 * z as i32 + 10 * y as i32 + x as i32)
}

/// The incremental formulation of the vertical stack: insert each input into a
/// growing accumulator at `(nz - overlap) * i`, then keep the first
/// `nz + (n - 1) * (nz - overlap)` slices.
pub fn insert_then_trim<T: Clone>(inputs: &[Array3<T>], overlap: usize) -> Array3<T> {
    let nz = inputs[0].len_of(Axis(0));
    let mut accumulator = inputs[0].clone();
    for (i, input) in inputs.iter().enumerate().skip(1) {
        let at = (nz - overlap) * i;
        let grown = concatenate(
            Axis(0),
            &[
                accumulator.slice(s![..at, .., ..]),
                input.view(),
                accumulator.slice(s![at.., .., ..]),
            ],
        )
        .expect("frames of all inputs agree");
        accumulator = grown;
    }
    let nz_total = nz + (inputs.len() - 1) * (nz - overlap);
    accumulator.slice(s![..nz_total, .., ..]).to_owned()
}
