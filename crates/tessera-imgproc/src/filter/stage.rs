use tessera_image::{Image, ImageSize, Pixel};

use super::kernel::Stride;
use crate::error::FilterError;
use crate::padding::{pad_image, Padding2D, PaddingMode};
use crate::tiling::Tile;

/// The padded input, read-only to every worker.
pub(crate) struct PaddedInput<'a, T> {
    data: &'a [T],
    row_stride: usize,
    channels: usize,
}

impl<'a, T: Pixel> PaddedInput<'a, T> {
    pub(crate) fn new(image: &'a Image<T>) -> Self {
        Self {
            data: image.as_slice(),
            row_stride: image.row_stride(),
            channels: image.num_channels(),
        }
    }

    pub(crate) fn channels(&self) -> usize {
        self.channels
    }

    /// One padded row, all columns and channels interleaved.
    #[inline]
    pub(crate) fn row(&self, row: usize) -> &'a [T] {
        &self.data[row * self.row_stride..(row + 1) * self.row_stride]
    }
}

/// Which channels a worker computes.
///
/// When every input channel equals channel 0, only channel 0 is computed and
/// then copied into the others.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct ChannelPlan {
    pub channels: usize,
    pub replicate: bool,
}

impl ChannelPlan {
    pub(crate) fn new(channels: usize, replicate: bool) -> Self {
        Self {
            channels,
            replicate: replicate && channels > 1,
        }
    }

    /// Number of channels actually computed.
    pub(crate) fn computed(&self) -> usize {
        if self.replicate {
            1
        } else {
            self.channels
        }
    }

    /// Copy channel 0 of every pixel of an output row into its other channels.
    pub(crate) fn finish_row(&self, row: &mut [f32]) {
        if !self.replicate {
            return;
        }
        row.chunks_exact_mut(self.channels).for_each(|px| {
            let first = px[0];
            px[1..].fill(first);
        });
    }
}

/// A worker's exclusive window into the output buffer.
///
/// Holds one mutable slice per tile row, each `tile.width() * channels` long.
pub(crate) struct TileView<'a> {
    tile: Tile,
    rows: Vec<&'a mut [f32]>,
}

impl<'a> TileView<'a> {
    pub(crate) fn tile(&self) -> Tile {
        self.tile
    }

    /// Check the view spans exactly the rows of its tile.
    pub(crate) fn check(&self) -> Result<(), FilterError> {
        if self.rows.len() != self.tile.height() {
            return Err(FilterError::TileShapeMismatch {
                expected: self.tile.height(),
                got: self.rows.len(),
            });
        }
        Ok(())
    }

    #[inline]
    pub(crate) fn row_mut(&mut self, i: usize) -> &mut [f32] {
        &mut self.rows[i][..]
    }
}

/// The float output buffer of one filter call.
pub(crate) struct OutputBuffer {
    size: ImageSize,
    channels: usize,
    data: Vec<f32>,
}

impl OutputBuffer {
    pub(crate) fn new(size: ImageSize, channels: usize) -> Self {
        Self {
            size,
            channels,
            data: vec![0.0; size.area() * channels],
        }
    }

    pub(crate) fn size(&self) -> ImageSize {
        self.size
    }

    /// Split the buffer into one disjoint view per tile.
    ///
    /// Tiles must come from [`crate::tiling::plan_tiles`]: within a band they
    /// are ordered left to right and do not overlap.
    pub(crate) fn partition(&mut self, tiles: &[Tile]) -> Vec<TileView<'_>> {
        let channels = self.channels;
        let row_len = self.size.width * channels;

        let mut views: Vec<TileView<'_>> = tiles
            .iter()
            .map(|&tile| TileView {
                tile,
                rows: Vec::with_capacity(tile.height()),
            })
            .collect();

        if row_len == 0 {
            return views;
        }

        for (y, row) in self.data.chunks_exact_mut(row_len).enumerate() {
            let mut rest: &mut [f32] = row;
            let mut consumed = 0;
            for view in views.iter_mut().filter(|v| v.tile.contains_row(y)) {
                let start = view.tile.col_start * channels;
                let len = view.tile.width() * channels;
                let (_, tail) = std::mem::take(&mut rest).split_at_mut(start - consumed);
                let (segment, tail) = tail.split_at_mut(len);
                view.rows.push(segment);
                rest = tail;
                consumed = start + len;
            }
        }

        views
    }

    pub(crate) fn into_image(self) -> Result<Image<f32>, FilterError> {
        Ok(Image::new(self.size, self.channels, self.data)?)
    }
}

/// Everything a filter call hands to its workers.
pub(crate) struct Staged<T> {
    pub padded: Image<T>,
    pub output: OutputBuffer,
}

/// Pad the input by the half-kernel margins and allocate the output.
///
/// # Arguments
///
/// * `src` - The image to filter.
/// * `half` - The half kernel margins `(kh, kw)`.
/// * `mode` - The border policy of the padded margins.
/// * `stride` - The output downsampling, already validated.
pub(crate) fn stage<T: Pixel>(
    src: &Image<T>,
    half: (usize, usize),
    mode: PaddingMode,
    stride: Stride,
) -> Result<Staged<T>, FilterError> {
    let padded = pad_image(src, Padding2D::symmetric(half.0, half.1), mode)?;
    let output = OutputBuffer::new(stride.output_size(src.size()), src.num_channels());

    log::trace!(
        "staged padded input {}x{}x{} and output {}",
        padded.height(),
        padded.width(),
        padded.num_channels(),
        output.size
    );

    Ok(Staged { padded, output })
}
