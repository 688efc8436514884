use tessera_image::{DynamicImage, Image, Pixel};
use tessera_imgproc::filter::{
    apply_linear_filter_with_options, apply_rank_filter_with_options, FilterOptions, RankMode,
};
use tessera_imgproc::padding::PaddingMode;

use crate::definition::{FilterDefinition, FilterKind};
use crate::error::ActionError;

/// The rank mode of a rank filter kind.
pub fn rank_mode(kind: FilterKind) -> Option<RankMode> {
    match kind {
        FilterKind::Median => Some(RankMode::Median),
        FilterKind::Minimum => Some(RankMode::Minimum),
        FilterKind::Maximum => Some(RankMode::Maximum),
        FilterKind::Quantile25 => Some(RankMode::Quantile25),
        FilterKind::Quantile75 => Some(RankMode::Quantile75),
        FilterKind::Smoothing | FilterKind::EdgeDetection | FilterKind::Custom => None,
    }
}

/// Apply one filter definition to an image.
///
/// Rank kinds run a rank filter over the enabled cells with reflect-101
/// padding. Smoothing and edge detection run a linear filter on the float
/// accumulator, edge detection on the single channel version of the image.
/// Custom definitions return the image unchanged.
///
/// # Arguments
///
/// * `image` - The image to filter, `u8` or `f32`.
/// * `definition` - The filter to apply.
/// * `options` - Engine tunables.
pub fn apply_filter(
    image: &DynamicImage,
    definition: &FilterDefinition,
    options: &FilterOptions,
) -> Result<DynamicImage, ActionError> {
    match image {
        DynamicImage::U8(img) => apply_typed(img, definition, options),
        DynamicImage::F32(img) => apply_typed(img, definition, options),
    }
}

fn apply_typed<T: Pixel>(
    image: &Image<T>,
    definition: &FilterDefinition,
    options: &FilterOptions,
) -> Result<DynamicImage, ActionError>
where
    Image<T>: Into<DynamicImage>,
{
    let kind = definition.settings.kind;
    let stride = definition.stride();

    if let Some(mode) = rank_mode(kind) {
        let window = definition.inclusion_kernel()?;
        let out = apply_rank_filter_with_options(
            image,
            &window,
            mode,
            stride,
            PaddingMode::Reflect101,
            options,
        )?;
        return Ok(DynamicImage::F32(out));
    }

    let edge_mode = match kind {
        FilterKind::Smoothing => false,
        FilterKind::EdgeDetection => true,
        _ => {
            log::debug!("{kind:?} filter leaves the image unchanged");
            return Ok(image.clone().into());
        }
    };

    let kernel = definition.linear_kernel()?;
    Ok(apply_linear_filter_with_options(
        image, &kernel, stride, edge_mode, false, options,
    )?)
}
