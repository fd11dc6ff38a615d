//! Block reduction shape, type and value behaviour

use ndarray::{arr2, Array, Array3, ArrayD, IxDyn};
use tomo_prep::{rebin, rebin_with, RebinFactor, Reduction, TomoError};

#[test]
fn shape_is_floor_of_extent_over_factor() {
    let data = Array3::<f32>::zeros((7, 5, 9));

    let uniform = rebin(&data, &RebinFactor::Uniform(2), Reduction::Mean).unwrap();
    assert_eq!(uniform.shape(), &[3, 2, 4]);

    let per_axis = rebin(&data, &RebinFactor::PerAxis(vec![3, 1, 4]), Reduction::Mean).unwrap();
    assert_eq!(per_axis.shape(), &[2, 5, 2]);

    let too_large = rebin(&data, &RebinFactor::Uniform(6), Reduction::Mean).unwrap();
    assert_eq!(too_large.shape(), &[1, 0, 1]);
}

#[test]
fn remainder_is_dropped_not_padded() {
    // Last column (values 9 and 90) does not fill a block
    let data = arr2(&[[1_u16, 3, 5, 7, 9], [10, 30, 50, 70, 90]]);
    let reduced = rebin(&data, &RebinFactor::PerAxis(vec![1, 2]), Reduction::Mean).unwrap();
    assert_eq!(reduced, arr2(&[[2_u16, 6], [20, 60]]));
}

#[test]
fn mean_is_truncated_back_to_integer_type() {
    let data = arr2(&[[1_u8, 2], [2, 2]]);
    // mean 1.75 truncates toward zero
    let reduced = rebin(&data, &RebinFactor::Uniform(2), Reduction::Mean).unwrap();
    assert_eq!(reduced, arr2(&[[1_u8]]));

    let negative = arr2(&[[-1_i16, -2], [-2, -2]]);
    let reduced = rebin(&negative, &RebinFactor::Uniform(2), Reduction::Mean).unwrap();
    assert_eq!(reduced, arr2(&[[-1_i16]]));
}

#[test]
fn sum_saturates_at_type_bounds() {
    let data = Array3::from_elem((2, 2, 2), 200_u8);
    let reduced = rebin(&data, &RebinFactor::Uniform(2), Reduction::Sum).unwrap();
    assert_eq!(reduced[[0, 0, 0]], u8::MAX);
}

#[test]
fn element_type_is_preserved() {
    let ints = Array3::<i32>::from_elem((4, 4, 4), 3);
    let reduced: Array3<i32> = rebin(&ints, &RebinFactor::Uniform(2), Reduction::Mean).unwrap();
    assert!(reduced.iter().all(|&v| v == 3));

    let floats = Array3::<f32>::from_shape_fn((2, 2, 2), |(z, y, x)| (z + y + x) as f32);
    let reduced: Array3<f32> = rebin(&floats, &RebinFactor::Uniform(2), Reduction::Mean).unwrap();
    assert_eq!(reduced[[0, 0, 0]], 1.5);
}

#[test]
fn factor_one_is_identity() {
    let data = Array3::from_shape_fn((3, 4, 5), |(z, y, x)| (z * 20 + y * 5 + x) as i64 * 1_000_000_007);
    let reduced = rebin(&data, &RebinFactor::Uniform(1), Reduction::Mean).unwrap();
    assert_eq!(reduced, data);

    let reduced = rebin(&data, &RebinFactor::PerAxis(vec![1, 1, 1]), Reduction::Max).unwrap();
    assert_eq!(reduced, data);
}

#[test]
fn min_and_max_select_block_extremes() {
    let data = arr2(&[[4_i32, -1, 7, 7], [2, 9, 0, 3]]);
    let min = rebin(&data, &RebinFactor::Uniform(2), Reduction::Min).unwrap();
    let max = rebin(&data, &RebinFactor::Uniform(2), Reduction::Max).unwrap();
    assert_eq!(min, arr2(&[[-1, 0]]));
    assert_eq!(max, arr2(&[[9, 7]]));
}

#[test]
fn works_on_dynamic_dimensionality() {
    let data = ArrayD::<f64>::from_shape_fn(IxDyn(&[4, 2, 2, 6]), |idx| idx[3] as f64);
    let reduced = rebin(&data, &RebinFactor::PerAxis(vec![2, 2, 2, 3]), Reduction::Mean).unwrap();
    assert_eq!(reduced.shape(), &[2, 1, 1, 2]);
    assert_eq!(reduced[IxDyn(&[0, 0, 0, 0])], 1.0);
    assert_eq!(reduced[IxDyn(&[1, 0, 0, 1])], 4.0);
}

#[test]
fn custom_reduction_receives_whole_blocks() {
    let data = Array::from_shape_vec((2, 4), vec![1_u32, 2, 3, 4, 5, 6, 7, 8]).unwrap();
    let reduced = rebin_with(&data, &RebinFactor::Uniform(2), |block| {
        assert_eq!(block.shape(), &[2, 2]);
        block[[1, 1]]
    })
    .unwrap();
    assert_eq!(reduced, arr2(&[[6, 8]]));
}

#[test]
fn invalid_factors_are_rejected() {
    let data = Array3::<u16>::zeros((4, 4, 4));

    let err = rebin(&data, &RebinFactor::PerAxis(vec![2, 2]), Reduction::Mean).unwrap_err();
    assert!(matches!(err, TomoError::InvalidArgument(_)));

    let err = rebin(&data, &RebinFactor::Uniform(0), Reduction::Mean).unwrap_err();
    assert!(matches!(err, TomoError::InvalidArgument(_)));

    let err = rebin(&data, &RebinFactor::PerAxis(vec![1, 1, 1, 1]), Reduction::Mean).unwrap_err();
    assert!(matches!(err, TomoError::InvalidArgument(_)));

}
