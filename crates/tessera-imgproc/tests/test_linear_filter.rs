use rand::{rngs::StdRng, Rng, SeedableRng};
use tessera_image::{ElementType, Image, ImageSize};
use tessera_imgproc::filter::{
    apply_linear_filter, apply_linear_filter_with_options, kernels, FilterOptions, Kernel2d,
    Stride,
};
use tessera_imgproc::parallel::ExecutionStrategy;
use tessera_imgproc::FilterError;

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn random_image(size: ImageSize, channels: usize, seed: u64) -> Result<Image<f32>, FilterError> {
    let mut rng = StdRng::seed_from_u64(seed);
    let data = (0..size.area() * channels)
        .map(|_| rng.random_range(0.0..255.0))
        .collect();
    Ok(Image::new(size, channels, data)?)
}

/// Direct zero-padded cross-correlation, one output pixel at a time.
fn reference_filter(image: &Image<f32>, kernel: &Kernel2d, stride: Stride) -> Vec<f32> {
    let (kh, kw) = kernel.half_size();
    let out = stride.output_size(image.size());
    let channels = image.num_channels();
    let mut dst = Vec::with_capacity(out.area() * channels);
    for i in 0..out.height {
        for j in 0..out.width {
            for c in 0..channels {
                let mut acc = 0.0;
                for dy in 0..kernel.rows() {
                    for dx in 0..kernel.cols() {
                        let y = (i * stride.y + dy) as isize - kh as isize;
                        let x = (j * stride.x + dx) as isize - kw as isize;
                        if y < 0 || x < 0 {
                            continue;
                        }
                        // out of range reads as zero padding
                        let v = image
                            .get([y as usize, x as usize, c])
                            .copied()
                            .unwrap_or_default();
                        acc += kernel.get(dy, dx).unwrap_or_default() * v;
                    }
                }
                dst.push(acc);
            }
        }
    }
    dst
}

fn assert_close(actual: &[f32], expected: &[f32], rtol: f32) {
    assert_eq!(actual.len(), expected.len());
    for (idx, (a, e)) in actual.iter().zip(expected).enumerate() {
        assert!(
            (a - e).abs() <= rtol * e.abs().max(1.0),
            "element {idx}: got {a}, expected {e}"
        );
    }
}

fn no_border() -> FilterOptions {
    FilterOptions {
        suppress_border: false,
        ..Default::default()
    }
}

#[test]
fn test_identity_kernel() -> Result<(), FilterError> {
    init_logger();
    let image = random_image([9, 7].into(), 3, 1)?;
    let kernel = Kernel2d::from_rows(&[[0.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 0.0]])?;

    let out = apply_linear_filter_with_options(
        &image,
        &kernel,
        Stride::default(),
        false,
        false,
        &no_border(),
    )?
    .into_f32();
    assert_eq!(out.as_slice(), image.as_slice());

    // the default options zero a one pixel frame
    let out = apply_linear_filter(&image, &kernel, Stride::default(), false, false)?.into_f32();
    for y in 0..7 {
        for x in 0..9 {
            for c in 0..3 {
                let border = y == 0 || y == 6 || x == 0 || x == 8;
                let expected = if border {
                    0.0
                } else {
                    image.get([y, x, c]).copied().unwrap_or_default()
                };
                assert_eq!(out.get([y, x, c]), Some(&expected));
            }
        }
    }
    Ok(())
}

#[test]
fn test_box_scenario_4x4() -> Result<(), FilterError> {
    init_logger();
    let image = Image::<u8>::new([4, 4].into(), 1, (0..16).collect())?;
    let kernel = Kernel2d::new(3, 3, vec![1.0 / 9.0; 9])?;

    let out = apply_linear_filter(&image, &kernel, Stride::default(), false, false)?.into_f32();
    assert_eq!(out.shape(), [4, 4, 1]);

    let expected = [
        0.0, 0.0, 0.0, 0.0, //
        0.0, 5.0, 6.0, 0.0, //
        0.0, 9.0, 10.0, 0.0, //
        0.0, 0.0, 0.0, 0.0,
    ];
    for (a, e) in out.as_slice().iter().zip(expected.iter()) {
        approx::assert_abs_diff_eq!(a, e, epsilon = 1e-4);
    }
    Ok(())
}

#[test]
fn test_separable_matches_dense() -> Result<(), FilterError> {
    init_logger();
    let image = random_image([23, 17].into(), 3, 7)?;
    let kernel = kernels::outer_kernel(&[1.0, -2.0, 0.5, 3.0, 1.0], &[0.25, 0.5, 0.25])?;

    for stride in [Stride::new(1, 1), Stride::new(2, 3), Stride::new(4, 1)] {
        let fast = FilterOptions {
            tile_size: Some(8),
            strategy: ExecutionStrategy::Fixed(3),
            ..no_border()
        };
        let slow = FilterOptions {
            allow_separable: false,
            ..fast.clone()
        };

        let a = apply_linear_filter_with_options(&image, &kernel, stride, false, false, &fast)?;
        let b = apply_linear_filter_with_options(&image, &kernel, stride, false, false, &slow)?;
        let (a, b) = (a.into_f32(), b.into_f32());
        assert_eq!(a.shape(), b.shape());
        assert_close(a.as_slice(), b.as_slice(), 1e-3);
    }
    Ok(())
}

#[test]
fn test_dense_matches_reference() -> Result<(), FilterError> {
    init_logger();
    let image = random_image([13, 11].into(), 2, 3)?;
    // not separable
    let kernel = Kernel2d::from_rows(&[
        [0.0, 1.0, -1.0, 2.0, 0.5],
        [1.0, -4.0, 1.0, 0.0, 0.0],
        [0.0, 1.0, 0.0, -3.0, 1.0],
    ])?;

    for stride in [Stride::new(1, 1), Stride::new(2, 3)] {
        let options = FilterOptions {
            tile_size: Some(4),
            ..no_border()
        };
        let out =
            apply_linear_filter_with_options(&image, &kernel, stride, false, false, &options)?
                .into_f32();
        assert_close(out.as_slice(), &reference_filter(&image, &kernel, stride), 1e-4);
    }
    Ok(())
}

#[test]
fn test_output_shape() -> Result<(), FilterError> {
    let image = Image::<u8>::from_size_val([10, 7].into(), 3, 1)?;
    let kernel = kernels::box_kernel_2d(3, 5)?;

    for (sy, sx) in [(1, 1), (2, 2), (3, 4), (7, 10), (8, 11)] {
        let out = apply_linear_filter(&image, &kernel, Stride::new(sy, sx), false, false)?;
        let expected = ImageSize {
            width: 10usize.div_ceil(sx),
            height: 7usize.div_ceil(sy),
        };
        assert_eq!(out.size(), expected);
        assert_eq!(out.num_channels(), 3);
    }
    Ok(())
}

#[test]
fn test_stride_subsamples_full_output() -> Result<(), FilterError> {
    init_logger();
    let image = random_image([15, 12].into(), 1, 11)?;
    let kernel = kernels::gaussian_kernel_2d(5, 1.2)?;

    let full = apply_linear_filter_with_options(
        &image,
        &kernel,
        Stride::default(),
        false,
        false,
        &no_border(),
    )?
    .into_f32();
    let stride = Stride::new(2, 3);
    let strided =
        apply_linear_filter_with_options(&image, &kernel, stride, false, false, &no_border())?
            .into_f32();

    assert_eq!(strided.shape(), [6, 5, 1]);
    for i in 0..strided.height() {
        for j in 0..strided.width() {
            let a = strided.get([i, j, 0]).copied().unwrap_or_default();
            let b = full.get([i * stride.y, j * stride.x, 0]).copied().unwrap_or_default();
            approx::assert_abs_diff_eq!(a, b, epsilon = 1e-3);
        }
    }
    Ok(())
}

#[test]
fn test_tiling_does_not_change_result() -> Result<(), FilterError> {
    init_logger();
    let image = random_image([21, 19].into(), 3, 5)?;
    let kernel = kernels::gaussian_kernel_2d(3, 0.8)?;

    let reference = apply_linear_filter_with_options(
        &image,
        &kernel,
        Stride::default(),
        false,
        false,
        &FilterOptions::serial(),
    )?;

    for tile_size in [1, 5, 64] {
        let options = FilterOptions::default()
            .with_tile_size(tile_size)
            .with_strategy(ExecutionStrategy::Fixed(4));
        let out = apply_linear_filter_with_options(
            &image,
            &kernel,
            Stride::default(),
            false,
            false,
            &options,
        )?;
        assert_eq!(out, reference);
    }
    Ok(())
}

#[test]
fn test_equal_channels_are_replicated() -> Result<(), FilterError> {
    let gray = random_image([8, 6].into(), 1, 21)?;
    let data = gray
        .as_slice()
        .iter()
        .flat_map(|&v| [v, v, v])
        .collect();
    let color = Image::new(gray.size(), 3, data)?;
    let kernel = kernels::box_kernel_2d(3, 3)?;

    let single = apply_linear_filter(&gray, &kernel, Stride::default(), false, false)?.into_f32();
    let triple = apply_linear_filter(&color, &kernel, Stride::default(), false, false)?.into_f32();

    assert_eq!(triple.num_channels(), 3);
    for (px, &v) in triple.as_slice().chunks_exact(3).zip(single.as_slice()) {
        assert_eq!(px, &[v, v, v]);
    }
    Ok(())
}

#[test]
fn test_edge_mode_reduces_to_luma() -> Result<(), FilterError> {
    let image = Image::<f32>::new([2, 1].into(), 3, vec![10.0, 20.0, 30.0, 0.0, 0.0, 100.0])?;
    let identity = Kernel2d::from_rows(&[[1.0f32]])?;

    let out = apply_linear_filter(&image, &identity, Stride::default(), true, false)?.into_f32();
    assert_eq!(out.shape(), [1, 2, 1]);
    let luma = 0.114 * 10.0 + 0.587 * 20.0 + 0.299 * 30.0;
    approx::assert_abs_diff_eq!(out.as_slice()[0], luma, epsilon = 1e-4);
    approx::assert_abs_diff_eq!(out.as_slice()[1], 29.9, epsilon = 1e-4);

    // two channels keep the first one
    let two = Image::<u8>::new([2, 1].into(), 2, vec![4, 7, 9, 1])?;
    let out = apply_linear_filter(&two, &identity, Stride::default(), true, false)?.into_f32();
    assert_eq!(out.as_slice(), &[4.0, 9.0]);
    Ok(())
}

#[test]
fn test_display_conversion() -> Result<(), FilterError> {
    let image = Image::<u8>::new([3, 1].into(), 2, vec![1, 2, 200, 3, 0, 60])?;
    let kernel = Kernel2d::from_rows(&[[-2.0f32]])?;

    let out = apply_linear_filter(&image, &kernel, Stride::default(), false, true)?;
    assert_eq!(out.element_type(), ElementType::U8);
    let out = out.as_u8().expect("display output is u8");
    assert_eq!(out.as_slice(), &[2, 4, 255, 6, 0, 120]);
    Ok(())
}

#[test]
fn test_display_rounds_half_to_even() -> Result<(), FilterError> {
    let image = Image::<u8>::new([5, 1].into(), 1, vec![0, 1, 2, 3, 4])?;
    let kernel = Kernel2d::from_rows(&[[-1.25f32, 0.0, 1.25]])?;

    let raw = apply_linear_filter(&image, &kernel, Stride::default(), true, false)?.into_f32();
    assert_eq!(raw.as_slice(), &[0.0, 2.5, 2.5, 2.5, 0.0]);

    let out = apply_linear_filter(&image, &kernel, Stride::default(), true, true)?;
    let out = out.as_u8().expect("display output is u8");
    assert_eq!(out.as_slice(), &[0, 2, 2, 2, 0]);
    Ok(())
}

#[test]
fn test_configuration_errors() -> Result<(), FilterError> {
    let image = Image::<u8>::from_size_val([4, 4].into(), 1, 0)?;
    let kernel = kernels::box_kernel_2d(3, 3)?;

    assert_eq!(
        apply_linear_filter(&image, &kernel, Stride::new(0, 1), false, false),
        Err(FilterError::InvalidStride(0, 1))
    );

    let wide = Image::<u16>::from_size_val([4, 4].into(), 1, 0)?;
    assert_eq!(
        apply_linear_filter(&wide, &kernel, Stride::default(), false, false),
        Err(FilterError::UnsupportedElementType(ElementType::U16))
    );

    assert_eq!(
        Kernel2d::new(3, 4, vec![0.0; 12]),
        Err(FilterError::EvenKernelDimensions { rows: 3, cols: 4 })
    );
    Ok(())
}
