use tessera_image::{DynamicImage, Image, Pixel};

use super::dense::dense_tile;
use super::finalize::{suppress_border, to_display_u8};
use super::kernel::{check_element_type, InclusionKernel, Kernel2d, Stride};
use super::options::FilterOptions;
use super::rank::{rank_tile, RankMode};
use super::separability::{factorize, SEPARABILITY_TOLERANCE};
use super::separable_filter::SeparableFilter;
use super::stage::{stage, ChannelPlan, PaddedInput, Staged};
use crate::color::{channels_equal, to_single_channel};
use crate::error::FilterError;
use crate::padding::PaddingMode;
use crate::parallel::execute_jobs;
use crate::tiling::{plan_tiles, DEFAULT_LINEAR_TILE_SIZE, DEFAULT_RANK_TILE_SIZE};

/// Cross-correlate an image with a 2-D kernel.
///
/// Runs with the default [`FilterOptions`]. See [`apply_linear_filter_with_options`].
///
/// # Arguments
///
/// * `image` - The source image with shape (H, W, C), `u8` or `f32`.
/// * `kernel` - The kernel, odd on both axes.
/// * `stride` - The output downsampling.
/// * `edge_mode` - Reduce the image to a single channel before filtering.
/// * `want_display_u8` - Return a saturated `u8` image instead of the float accumulator.
///
/// # Returns
///
/// An image with shape (⌈H / stride.y⌉, ⌈W / stride.x⌉, C), or C = 1 in edge mode.
///
/// # Example
///
/// ```
/// use tessera_image::Image;
/// use tessera_imgproc::filter::{apply_linear_filter, Kernel2d, Stride};
///
/// let image = Image::<u8>::new([3, 3].into(), 1, (1..=9).collect()).unwrap();
/// let kernel = Kernel2d::from_rows(&[[1.0f32]]).unwrap();
///
/// let out = apply_linear_filter(&image, &kernel, Stride::new(2, 2), false, false).unwrap();
/// assert_eq!(out.as_f32().unwrap().as_slice(), &[1.0, 3.0, 7.0, 9.0]);
/// ```
pub fn apply_linear_filter<T: Pixel>(
    image: &Image<T>,
    kernel: &Kernel2d,
    stride: Stride,
    edge_mode: bool,
    want_display_u8: bool,
) -> Result<DynamicImage, FilterError> {
    apply_linear_filter_with_options(
        image,
        kernel,
        stride,
        edge_mode,
        want_display_u8,
        &FilterOptions::default(),
    )
}

/// Cross-correlate an image with a 2-D kernel.
///
/// Output pixel `(i, j)` is the weighted sum of the zero-padded input window
/// centered at `(i * stride.y, j * stride.x)`; the kernel is not flipped.
/// Separable kernels take a two-pass path whose result matches the direct
/// sum up to floating point error.
///
/// With `options.suppress_border` the outer half-kernel rows and columns of
/// the output are zeroed.
///
/// # Errors
///
/// Configuration errors (stride, element type, tile size, thread count) are
/// raised before any buffer is allocated. A failing worker fails the call.
pub fn apply_linear_filter_with_options<T: Pixel>(
    image: &Image<T>,
    kernel: &Kernel2d,
    stride: Stride,
    edge_mode: bool,
    want_display_u8: bool,
    options: &FilterOptions,
) -> Result<DynamicImage, FilterError> {
    stride.validate()?;
    check_element_type::<T>()?;
    let tile_size = options.resolve_tile_size(DEFAULT_LINEAR_TILE_SIZE)?;
    let num_workers = options.strategy.num_workers(options.reserved_workers)?;

    let mut src = image.to_f32();
    if edge_mode {
        src = to_single_channel(&src)?;
    }
    let plan = ChannelPlan::new(src.num_channels(), channels_equal(&src));

    let half = kernel.half_size();
    let Staged {
        padded,
        mut output,
    } = stage(&src, half, PaddingMode::Constant, stride)?;
    let input = PaddedInput::new(&padded);
    let tiles = plan_tiles(output.size(), tile_size)?;

    let separable = if options.allow_separable {
        factorize(kernel, SEPARABILITY_TOLERANCE)
    } else {
        None
    };

    log::debug!(
        "linear filter {}x{} on {}: {} path, {} tiles, {} workers",
        kernel.rows(),
        kernel.cols(),
        src.size(),
        if separable.is_some() { "separable" } else { "dense" },
        tiles.len(),
        num_workers
    );

    let views = output.partition(&tiles);
    match separable {
        Some(sep) => {
            let filter = SeparableFilter::new(sep);
            execute_jobs(options.strategy, num_workers, views, |view| {
                let tile = view.tile();
                filter.apply_tile(&input, stride, plan, view)?;
                log::trace!("separable tile {tile:?} done");
                Ok(())
            })?;
        }
        None => {
            let taps = kernel.taps();
            execute_jobs(options.strategy, num_workers, views, |view| {
                let tile = view.tile();
                dense_tile(&input, &taps, stride, plan, view)?;
                log::trace!("dense tile {tile:?} done");
                Ok(())
            })?;
        }
    }

    let mut result = output.into_image()?;
    if options.suppress_border {
        suppress_border(&mut result, half.0, half.1);
    }

    if want_display_u8 {
        Ok(DynamicImage::U8(to_display_u8(&result)?))
    } else {
        Ok(DynamicImage::F32(result))
    }
}

/// Apply an order-statistic filter to an image.
///
/// Runs with the default [`FilterOptions`]. See [`apply_rank_filter_with_options`].
///
/// # Arguments
///
/// * `image` - The source image with shape (H, W, C), `u8` or `f32`.
/// * `kernel` - The window; excluded cells take no part in the statistic.
/// * `mode` - The order statistic to take.
/// * `stride` - The output downsampling.
/// * `pad_mode` - How the border of the input is extended.
///
/// # Returns
///
/// A float image with shape (⌈H / stride.y⌉, ⌈W / stride.x⌉, C).
///
/// # Example
///
/// ```
/// use tessera_image::Image;
/// use tessera_imgproc::filter::{apply_rank_filter, InclusionKernel, RankMode, Stride};
/// use tessera_imgproc::padding::PaddingMode;
///
/// let image = Image::<u8>::new([3, 1].into(), 1, vec![1, 9, 2]).unwrap();
/// let window = InclusionKernel::full(1, 3).unwrap();
///
/// let out = apply_rank_filter(
///     &image,
///     &window,
///     RankMode::Median,
///     Stride::default(),
///     PaddingMode::Replicate,
/// )
/// .unwrap();
/// assert_eq!(out.as_slice(), &[1.0, 2.0, 2.0]);
/// ```
pub fn apply_rank_filter<T: Pixel>(
    image: &Image<T>,
    kernel: &InclusionKernel,
    mode: RankMode,
    stride: Stride,
    pad_mode: PaddingMode,
) -> Result<Image<f32>, FilterError> {
    apply_rank_filter_with_options(
        image,
        kernel,
        mode,
        stride,
        pad_mode,
        &FilterOptions::default(),
    )
}

/// Apply an order-statistic filter to an image.
///
/// Every included cell contributes `weight * pixel` to the window of an
/// output pixel. A window with no included cell yields an all-zero output
/// of the downsampled shape. The border is never suppressed.
///
/// # Errors
///
/// Configuration errors (stride, element type, tile size, thread count) are
/// raised before any buffer is allocated. A failing worker fails the call.
pub fn apply_rank_filter_with_options<T: Pixel>(
    image: &Image<T>,
    kernel: &InclusionKernel,
    mode: RankMode,
    stride: Stride,
    pad_mode: PaddingMode,
    options: &FilterOptions,
) -> Result<Image<f32>, FilterError> {
    stride.validate()?;
    check_element_type::<T>()?;
    let tile_size = options.resolve_tile_size(DEFAULT_RANK_TILE_SIZE)?;
    let num_workers = options.strategy.num_workers(options.reserved_workers)?;

    let taps = kernel.taps();
    if taps.is_empty() {
        log::debug!("rank window excludes every cell, returning zeros");
        let out_size = stride.output_size(image.size());
        return Ok(Image::from_size_val(out_size, image.num_channels(), 0.0)?);
    }

    let plan = ChannelPlan::new(image.num_channels(), channels_equal(image));
    let Staged {
        padded,
        mut output,
    } = stage(image, kernel.half_size(), pad_mode, stride)?;
    let input = PaddedInput::new(&padded);
    let tiles = plan_tiles(output.size(), tile_size)?;

    log::debug!(
        "{mode} filter over {} of {} cells on {}: {} tiles, {} workers",
        taps.len(),
        kernel.rows() * kernel.cols(),
        image.size(),
        tiles.len(),
        num_workers
    );

    let views = output.partition(&tiles);
    execute_jobs(options.strategy, num_workers, views, |view| {
        let tile = view.tile();
        rank_tile(&input, &taps, mode, stride, plan, view)?;
        log::trace!("rank tile {tile:?} done");
        Ok(())
    })?;

    output.into_image()
}
