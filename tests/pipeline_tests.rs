//! End-to-end preprocessing pipelines on small HDF5 exchange files

use hdf5::{File, Group, H5Type};
use ndarray::Array3;
use std::path::Path;
use tempfile::tempdir;
use tomo_prep::formats::{hdf5_io, netcdf_io};
use tomo_prep::pipelines::{
    normalize_radiographs, preprocess_13bm, replace_flat_fields, NormalizeOptions, PreprocessOptions,
};
use tomo_prep::{TomoError, Voxel};

fn put<T: H5Type + Copy>(group: &Group, name: &str, data: &Array3<T>) -> hdf5::Result<()> {
    let flat: Vec<T> = data.iter().copied().collect();
    group
        .new_dataset::<T>()
        .shape(data.dim())
        .create(name)?
        .write_raw(&flat)
}

fn write_exchange(path: &Path, datasets: &[(&str, &Array3<u16>)]) -> hdf5::Result<File> {
    let file = File::create(path)?;
    let exchange = file.create_group("exchange")?;
    for (name, data) in datasets {
        put(&exchange, name, *data)?;
    }
    Ok(file)
}

fn base(dir: &Path, name: &str) -> String {
    dir.join(name).to_str().expect("utf-8 temp path").to_string()
}

/// Flat file with a recorded dark level of 10
fn write_flat_file(flats: &str, flat: &Array3<u16>) -> hdf5::Result<()> {
    let file = write_exchange(Path::new(&format!("{}.h5", flats)), &[("data_white", flat)])?;
    file.create_group("process")?
        .create_group("acquisition")?
        .create_group("dark_fields")?
        .new_dataset::<f64>()
        .shape(1)
        .create("dark_field_value")?
        .write_raw(&[10.0_f64])
}

#[test]
fn normalize_radiographs_writes_scaled_int16() -> tomo_prep::Result<()> {
    let dir = tempdir().expect("Failed to create temp dir");
    let flats = base(dir.path(), "flats");
    let radios = base(dir.path(), "radios");

    write_flat_file(&flats, &Array3::from_elem((2, 4, 4), 110_u16))?;
    let mut radio = Array3::from_elem((5, 4, 4), 60_u16);
    radio[[2, 1, 1]] = 100;
    write_exchange(Path::new(&format!("{}.h5", radios)), &[("data_white", &radio)])?;

    let options = NormalizeOptions {
        first_image: Some(1),
        last_image: Some(4),
        ..NormalizeOptions::default()
    };
    let output = normalize_radiographs(&flats, &radios, &options)?;
    assert_eq!(output, Path::new(&format!("{}_normalized.h5", radios)));

    let normalized = i16::from_volume(hdf5_io::read_dataset(&output, hdf5_io::DATA_PATH)?)?;
    assert_eq!(normalized.dim(), (3, 4, 4));
    // (60 - 10) / (110 - 10) scaled by 10000; the zinger in image 2 is removed
    assert!(normalized.iter().all(|&v| v == 5000), "{:?}", normalized);
    Ok(())
}

#[test]
fn normalize_radiographs_applies_shift_and_dark_override() -> tomo_prep::Result<()> {
    let dir = tempdir().expect("Failed to create temp dir");
    let flats = base(dir.path(), "flats");
    let radios = base(dir.path(), "radios");

    // Left column of the flat is brighter; shifting right by one moves it to column 1
    let mut flat = Array3::from_elem((1, 2, 3), 60_u16);
    flat.slice_mut(ndarray::s![.., .., 0]).fill(110);
    write_flat_file(&flats, &flat)?;
    write_exchange(
        Path::new(&format!("{}.h5", radios)),
        &[("data_white", &Array3::from_elem((2, 2, 3), 35_u16))],
    )?;

    let options = NormalizeOptions {
        xshift: 1,
        dark_value: Some(10.0),
        zinger_threshold: 0.0,
        ..NormalizeOptions::default()
    };
    let output = normalize_radiographs(&flats, &radios, &options)?;
    let normalized = i16::from_volume(hdf5_io::read_dataset(&output, hdf5_io::DATA_PATH)?)?;
    // (35 - 10) / (60 - 10) and (35 - 10) / (110 - 10)
    assert_eq!(normalized[[0, 0, 0]], 5000);
    assert_eq!(normalized[[0, 0, 1]], 2500);
    assert_eq!(normalized[[1, 1, 2]], 5000);
    Ok(())
}

#[test]
fn normalize_radiographs_rejects_bad_image_range() -> tomo_prep::Result<()> {
    let dir = tempdir().expect("Failed to create temp dir");
    let flats = base(dir.path(), "flats");
    let radios = base(dir.path(), "radios");

    write_flat_file(&flats, &Array3::from_elem((1, 2, 2), 110_u16))?;
    write_exchange(
        Path::new(&format!("{}.h5", radios)),
        &[("data_white", &Array3::from_elem((3, 2, 2), 60_u16))],
    )?;

    for (first, last) in [(Some(2), Some(2)), (None, Some(4))] {
        let options = NormalizeOptions {
            first_image: first,
            last_image: last,
            ..NormalizeOptions::default()
        };
        let err = normalize_radiographs(&flats, &radios, &options).unwrap_err();
        assert!(matches!(err, TomoError::InvalidArgument(_)), "{}", err);
    }
    Ok(())
}

#[test]
fn normalize_radiographs_requires_recorded_dark_level() -> tomo_prep::Result<()> {
    let dir = tempdir().expect("Failed to create temp dir");
    let flats = base(dir.path(), "flats");
    let radios = base(dir.path(), "radios");

    write_exchange(
        Path::new(&format!("{}.h5", flats)),
        &[("data_white", &Array3::from_elem((1, 2, 2), 110_u16))],
    )?;
    write_exchange(
        Path::new(&format!("{}.h5", radios)),
        &[("data_white", &Array3::from_elem((3, 2, 2), 60_u16))],
    )?;

    let err = normalize_radiographs(&flats, &radios, &NormalizeOptions::default()).unwrap_err();
    assert!(matches!(err, TomoError::DatasetNotFound { .. }), "{}", err);
    Ok(())
}

#[test]
fn preprocess_13bm_writes_netcdf_volume() -> tomo_prep::Result<()> {
    let dir = tempdir().expect("Failed to create temp dir");
    let scan = base(dir.path(), "scan");

    let proj = Array3::from_elem((3, 4, 4), 60_u16);
    let flat = Array3::from_elem((2, 4, 4), 110_u16);
    let dark = Array3::from_elem((2, 4, 4), 10_u16);
    let file = write_exchange(
        Path::new(&format!("{}.h5", scan)),
        &[("data", &proj), ("data_white", &flat), ("data_dark", &dark)],
    )?;
    file.group("exchange")?
        .new_dataset::<f32>()
        .shape(3)
        .create("theta")?
        .write_raw(&[0.0_f32, 90.0, 180.0])?;
    drop(file);

    let output = preprocess_13bm(&scan, &PreprocessOptions::default())?;
    assert_eq!(output, Path::new(&format!("{}.volume", scan)));
    let volume = i16::from_volume(netcdf_io::read_volume(&output)?)?;
    assert_eq!(volume.dim(), (3, 4, 4));
    assert!(volume.iter().all(|&v| v == 5000));

    let options = PreprocessOptions {
        dark_value: Some(35.0),
        ..PreprocessOptions::default()
    };
    let output = preprocess_13bm(&scan, &options)?;
    let volume = i16::from_volume(netcdf_io::read_volume(&output)?)?;
    // (60 - 35) / (110 - 35)
    assert!(volume.iter().all(|&v| v == 3333));
    Ok(())
}

#[test]
fn replace_flat_fields_copies_good_flats() -> tomo_prep::Result<()> {
    let dir = tempdir().expect("Failed to create temp dir");
    let bad = dir.path().join("bad.h5");
    let good = dir.path().join("good.h5");

    let projections = Array3::from_elem((4, 3, 3), 500_u16);
    write_exchange(
        &bad,
        &[("data", &projections), ("data_white", &Array3::zeros((2, 3, 3)))],
    )?;
    write_exchange(&good, &[("data_white", &Array3::from_elem((2, 3, 3), 7_u16))])?;

    replace_flat_fields(&bad, &good)?;

    let flats = u16::from_volume(hdf5_io::read_dataset(&bad, hdf5_io::FLAT_PATH)?)?;
    assert!(flats.iter().all(|&v| v == 7));
    // Other datasets untouched
    let data = u16::from_volume(hdf5_io::read_dataset(&bad, hdf5_io::DATA_PATH)?)?;
    assert_eq!(data, projections);
    Ok(())
}

#[test]
fn replace_flat_fields_rejects_shape_mismatch() -> tomo_prep::Result<()> {
    let dir = tempdir().expect("Failed to create temp dir");
    let bad = dir.path().join("bad.h5");
    let good = dir.path().join("good.h5");

    write_exchange(&bad, &[("data_white", &Array3::zeros((2, 3, 3)))])?;
    write_exchange(&good, &[("data_white", &Array3::zeros((3, 3, 3)))])?;

    let err = replace_flat_fields(&bad, &good).unwrap_err();
    assert!(matches!(err, TomoError::ShapeMismatch { .. }), "{}", err);
    Ok(())
}
