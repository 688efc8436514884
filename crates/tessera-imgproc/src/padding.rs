use rayon::prelude::*;
use tessera_image::{Image, ImageError, ImageSize};

/// How samples outside the image are filled when it is padded.
///
/// The examples show the last four pixels `a b c d` of a row followed by
/// the padded border.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PaddingMode {
    /// Zeros: `a b c d | 0 0 0`.
    Constant,

    /// The edge pixel repeated: `a b c d | d d d`.
    Replicate,

    /// Mirrored around the edge pixel, which is not repeated: `a b c d | c b a`.
    #[default]
    Reflect101,

    /// Mirrored with the edge pixel repeated: `a b c d | d c b`.
    Reflect,

    /// Continued from the opposite side: `a b c d | a b c`.
    Wrap,
}

impl PaddingMode {
    /// The source index sampled at position `i` of an axis of length `len`.
    ///
    /// Positions inside `[0, len)` map to themselves. Positions outside are
    /// folded back into range, any distance away; `None` means the sample is
    /// the constant zero fill. `len` must be non-zero.
    pub fn source_index(&self, i: isize, len: usize) -> Option<usize> {
        let n = len as isize;
        if (0..n).contains(&i) {
            return Some(i as usize);
        }

        let folded = match self {
            PaddingMode::Constant => return None,
            PaddingMode::Replicate => i.clamp(0, n - 1),
            PaddingMode::Wrap => i.rem_euclid(n),
            PaddingMode::Reflect => {
                let m = i.rem_euclid(2 * n);
                if m < n {
                    m
                } else {
                    2 * n - 1 - m
                }
            }
            PaddingMode::Reflect101 if n == 1 => 0,
            PaddingMode::Reflect101 => {
                let period = 2 * (n - 1);
                let m = i.rem_euclid(period);
                if m < n {
                    m
                } else {
                    period - m
                }
            }
        };
        Some(folded as usize)
    }
}

/// Margins added around an image, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Padding2D {
    /// Rows added above.
    pub top: usize,
    /// Rows added below.
    pub bottom: usize,
    /// Columns added on the left.
    pub left: usize,
    /// Columns added on the right.
    pub right: usize,
}

impl Padding2D {
    /// `rows` above and below, `cols` left and right.
    pub fn symmetric(rows: usize, cols: usize) -> Self {
        Self {
            top: rows,
            bottom: rows,
            left: cols,
            right: cols,
        }
    }

    /// Size of an image of `size` with the margins added.
    pub fn padded_size(&self, size: ImageSize) -> ImageSize {
        ImageSize {
            width: size.width + self.left + self.right,
            height: size.height + self.top + self.bottom,
        }
    }
}

/// Build a copy of `src` enlarged by `padding` on the spatial axes.
///
/// Every padded pixel is gathered from the source position given by
/// [`PaddingMode::source_index`] on each axis, so margins wider than the
/// image are filled as well. Channels are copied as a unit. An empty source
/// yields an all-zero image of the padded size.
///
/// # Example
///
/// ```rust
/// use tessera_image::Image;
/// use tessera_imgproc::padding::{pad_image, Padding2D, PaddingMode};
///
/// let src = Image::<u8>::new([2, 2].into(), 1, vec![1, 2, 3, 4]).unwrap();
/// let dst = pad_image(&src, Padding2D::symmetric(1, 1), PaddingMode::Replicate).unwrap();
///
/// assert_eq!(dst.shape(), [4, 4, 1]);
/// assert_eq!(&dst.as_slice()[..4], &[1, 1, 2, 2]);
/// ```
pub fn pad_image<T>(
    src: &Image<T>,
    padding: Padding2D,
    padding_mode: PaddingMode,
) -> Result<Image<T>, ImageError>
where
    T: Copy + Default + Send + Sync,
{
    let channels = src.num_channels();
    let size = src.size();
    let mut dst = Image::from_size_val(padding.padded_size(size), channels, T::default())?;

    let src_stride = src.row_stride();
    if src_stride == 0 || size.height == 0 {
        return Ok(dst);
    }

    let columns: Vec<Option<usize>> = (0..dst.width())
        .map(|x| padding_mode.source_index(x as isize - padding.left as isize, size.width))
        .collect();
    let src_data = src.as_slice();
    let dst_stride = dst.row_stride();

    dst.as_slice_mut()
        .par_chunks_exact_mut(dst_stride)
        .enumerate()
        .for_each(|(y, dst_row)| {
            let Some(sy) = padding_mode.source_index(y as isize - padding.top as isize, size.height)
            else {
                return;
            };
            let src_row = &src_data[sy * src_stride..(sy + 1) * src_stride];
            for (px, sx) in dst_row.chunks_exact_mut(channels).zip(&columns) {
                if let Some(sx) = sx {
                    px.copy_from_slice(&src_row[sx * channels..(sx + 1) * channels]);
                }
            }
        });

    Ok(dst)
}
