use tessera_image::Image;

use crate::error::FilterError;

/// Zero the outer `rows` rows and `cols` columns of an image.
///
/// Applied to linear filter outputs so the zero-padding seam along the
/// border never shows up in the result.
pub fn suppress_border(image: &mut Image<f32>, rows: usize, cols: usize) {
    let (height, width, channels) = (image.height(), image.width(), image.num_channels());
    let row_stride = image.row_stride();
    if row_stride == 0 {
        return;
    }

    for (y, row) in image.as_slice_mut().chunks_exact_mut(row_stride).enumerate() {
        if y < rows || y + rows >= height {
            row.fill(0.0);
            continue;
        }
        let left = cols.min(width) * channels;
        row[..left].fill(0.0);
        let right = width.saturating_sub(cols) * channels;
        row[right.max(left)..].fill(0.0);
    }
}

/// Convert a float image into a displayable 8-bit image.
///
/// Each value is mapped to `saturate(round(|x|))` in `0..=255`, with ties
/// rounded to even.
///
/// # Example
///
/// ```
/// use tessera_image::Image;
/// use tessera_imgproc::filter::to_display_u8;
///
/// let image = Image::<f32>::new([4, 1].into(), 1, vec![-3.4, 2.5, 300.0, 0.49]).unwrap();
/// let display = to_display_u8(&image).unwrap();
/// assert_eq!(display.as_slice(), &[3, 2, 255, 0]);
/// ```
pub fn to_display_u8(image: &Image<f32>) -> Result<Image<u8>, FilterError> {
    let data = image
        .as_slice()
        .iter()
        // float to int casts saturate
        .map(|&v| v.abs().round_ties_even() as u8)
        .collect();
    Ok(Image::new(image.size(), image.num_channels(), data)?)
}
