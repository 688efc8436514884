use super::kernel::{Stride, Tap};
use super::stage::{ChannelPlan, PaddedInput, TileView};
use crate::error::FilterError;

/// Compute one output tile as a direct weighted sum over the kernel taps.
///
/// Output pixel `(i, j)` of channel `c` is
/// `sum(tap.weight * padded[i * stride.y + tap.dy][j * stride.x + tap.dx][c])`
/// over every nonzero tap.
pub(crate) fn dense_tile(
    input: &PaddedInput<'_, f32>,
    taps: &[Tap],
    stride: Stride,
    plan: ChannelPlan,
    mut view: TileView<'_>,
) -> Result<(), FilterError> {
    view.check()?;
    let tile = view.tile();
    let channels = input.channels();
    let computed = plan.computed();

    let mut acc = vec![0.0f32; tile.width() * channels];

    for i in 0..tile.height() {
        acc.fill(0.0);
        let base_row = (tile.row_start + i) * stride.y;

        for tap in taps {
            let src_row = input.row(base_row + tap.dy);
            for (j, px) in acc.chunks_exact_mut(channels).enumerate() {
                let src = ((tile.col_start + j) * stride.x + tap.dx) * channels;
                for c in 0..computed {
                    px[c] += tap.weight * src_row[src + c];
                }
            }
        }

        let dst = view.row_mut(i);
        dst.copy_from_slice(&acc);
        plan.finish_row(dst);
    }

    Ok(())
}
