use rayon::prelude::*;
use tessera_image::{Image, ImageError, Pixel};

/// Define the BGR weights for the grayscale conversion.
const BW: f32 = 0.114;
const GW: f32 = 0.587;
const RW: f32 = 0.299;

/// Absolute tolerance of [`channels_equal`].
const CHANNEL_ATOL: f32 = 1e-6;

/// Relative tolerance of [`channels_equal`].
const CHANNEL_RTOL: f32 = 1e-5;

/// Convert a BGR(A) image to grayscale using the formula:
///
/// Y = 0.114 * B + 0.587 * G + 0.299 * R
///
/// Channels past the third are ignored.
///
/// # Arguments
///
/// * `src` - The input image with at least 3 channels in BGR order.
///
/// # Errors
///
/// Returns [`ImageError::ChannelIndexOutOfBounds`] if the image has fewer than 3 channels.
///
/// # Example
///
/// ```
/// use tessera_image::{Image, ImageSize};
/// use tessera_imgproc::color::gray_from_bgr;
///
/// let image = Image::<f32>::new(
///     ImageSize {
///         width: 4,
///         height: 5,
///     },
///     3,
///     vec![0f32; 4 * 5 * 3],
/// )
/// .unwrap();
///
/// let gray = gray_from_bgr(&image).unwrap();
/// assert_eq!(gray.num_channels(), 1);
/// assert_eq!(gray.size().width, 4);
/// assert_eq!(gray.size().height, 5);
/// ```
pub fn gray_from_bgr(src: &Image<f32>) -> Result<Image<f32>, ImageError> {
    let channels = src.num_channels();
    if channels < 3 {
        return Err(ImageError::ChannelIndexOutOfBounds(2, channels));
    }

    let mut dst = Image::from_size_val(src.size(), 1, 0.0f32)?;
    if src.size().area() == 0 {
        return Ok(dst);
    }

    // parallelize the grayscale conversion by rows
    src.as_slice()
        .par_chunks_exact(src.row_stride())
        .zip(dst.as_slice_mut().par_chunks_exact_mut(src.cols()))
        .for_each(|(src_row, dst_row)| {
            src_row
                .chunks_exact(channels)
                .zip(dst_row.iter_mut())
                .for_each(|(px, gray)| {
                    *gray = BW * px[0] + GW * px[1] + RW * px[2];
                });
        });

    Ok(dst)
}

/// Check whether every channel equals channel 0 within tolerance.
///
/// Two values match when `|a - b| <= 1e-6 + 1e-5 * |b|`; for integer element
/// types this is exact equality. Single channel images are trivially equal.
pub fn channels_equal<T: Pixel>(src: &Image<T>) -> bool {
    let channels = src.num_channels();
    if channels < 2 {
        return true;
    }

    src.as_slice().par_chunks_exact(channels).all(|px| {
        let b = px[0].to_f32();
        px[1..]
            .iter()
            .all(|&a| (a.to_f32() - b).abs() <= CHANNEL_ATOL + CHANNEL_RTOL * b.abs())
    })
}

/// Reduce an image to a single channel for edge filtering.
///
/// - 1 channel: returned as is.
/// - channels numerically equal, or exactly 2 channels: channel 0.
/// - 3 or more channels: BGR luma of the first three channels.
pub fn to_single_channel(src: &Image<f32>) -> Result<Image<f32>, ImageError> {
    match src.num_channels() {
        1 => Ok(src.clone()),
        2 => src.channel(0),
        _ if channels_equal(src) => src.channel(0),
        _ => gray_from_bgr(src),
    }
}
