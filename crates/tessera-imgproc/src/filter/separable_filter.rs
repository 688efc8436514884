use super::kernel::Stride;
use super::separability::SeparableKernel;
use super::stage::{ChannelPlan, PaddedInput, TileView};
use crate::error::FilterError;

/// A separable 2D filter that applies a horizontal and a vertical 1D pass per tile.
///
/// The horizontal pass only touches the padded rows a tile reads, so tiles
/// stay independent and no intermediate image is shared between workers.
pub(crate) struct SeparableFilter {
    kernel_x: Vec<f32>,
    kernel_y: Vec<f32>,
}

impl SeparableFilter {
    /// Create a new separable filter from a factored kernel.
    pub(crate) fn new(kernel: SeparableKernel) -> Self {
        Self {
            kernel_x: kernel.kernel_x,
            kernel_y: kernel.kernel_y,
        }
    }

    /// Compute one output tile.
    ///
    /// # Arguments
    ///
    /// * `input` - The padded input.
    /// * `stride` - The output downsampling.
    /// * `plan` - Which channels to compute.
    /// * `view` - The tile's slice of the output buffer.
    pub(crate) fn apply_tile(
        &self,
        input: &PaddedInput<'_, f32>,
        stride: Stride,
        plan: ChannelPlan,
        mut view: TileView<'_>,
    ) -> Result<(), FilterError> {
        view.check()?;
        let tile = view.tile();
        let channels = input.channels();
        let computed = plan.computed();
        let width = tile.width();
        if tile.height() == 0 || width == 0 {
            return Ok(());
        }

        // padded rows row_start * sy ..= (row_end - 1) * sy + rows - 1
        let first_row = tile.row_start * stride.y;
        let num_rows = (tile.height() - 1) * stride.y + self.kernel_y.len();
        let row_len = width * channels;

        // Horizontal
        let mut temp = vec![0.0f32; num_rows * row_len];
        for (r, temp_row) in temp.chunks_exact_mut(row_len).enumerate() {
            let src_row = input.row(first_row + r);
            for (j, px) in temp_row.chunks_exact_mut(channels).enumerate() {
                let base = (tile.col_start + j) * stride.x;
                for (dx, &k) in self.kernel_x.iter().enumerate() {
                    if k == 0.0 {
                        continue;
                    }
                    let src = (base + dx) * channels;
                    for c in 0..computed {
                        px[c] += k * src_row[src + c];
                    }
                }
            }
        }

        // Vertical
        for i in 0..tile.height() {
            let dst = view.row_mut(i);
            dst.fill(0.0);
            for (dy, &k) in self.kernel_y.iter().enumerate() {
                if k == 0.0 {
                    continue;
                }
                let start = (i * stride.y + dy) * row_len;
                let temp_row = &temp[start..start + row_len];
                for (d, t) in dst
                    .chunks_exact_mut(channels)
                    .zip(temp_row.chunks_exact(channels))
                {
                    for c in 0..computed {
                        d[c] += k * t[c];
                    }
                }
            }
            plan.finish_row(dst);
        }

        Ok(())
    }
}
