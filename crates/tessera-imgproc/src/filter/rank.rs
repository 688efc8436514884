use std::fmt;

use tessera_image::Pixel;

use super::kernel::{Stride, Tap};
use super::stage::{ChannelPlan, PaddedInput, TileView};
use crate::error::FilterError;

/// The order statistic a rank filter takes over its window.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RankMode {
    /// Smallest value in the window.
    Minimum,
    /// Largest value in the window.
    Maximum,
    /// Middle value; the mean of the two middle values for an even count.
    Median,
    /// Value at sorted index `(n - 1) / 4`.
    Quantile25,
    /// Value at sorted index `3 * (n - 1) / 4`.
    Quantile75,
}

impl RankMode {
    /// Reduce `values` to the order statistic, reordering them in place.
    ///
    /// PRECONDITION: `values` is not empty.
    pub fn select(&self, values: &mut [f32]) -> f32 {
        let n = values.len();
        match self {
            RankMode::Minimum => values.iter().copied().fold(f32::INFINITY, f32::min),
            RankMode::Maximum => values.iter().copied().fold(f32::NEG_INFINITY, f32::max),
            RankMode::Median if n % 2 == 1 => nth(values, n / 2),
            RankMode::Median => {
                let (lower, upper, _) = values.select_nth_unstable_by(n / 2, f32::total_cmp);
                let upper = *upper;
                // the lower middle value is the largest of the left partition
                let lower = lower.iter().copied().fold(f32::NEG_INFINITY, f32::max);
                0.5 * (lower + upper)
            }
            RankMode::Quantile25 => nth(values, (n - 1) / 4),
            RankMode::Quantile75 => nth(values, 3 * (n - 1) / 4),
        }
    }

    fn needs_scratch(&self) -> bool {
        !matches!(self, RankMode::Minimum | RankMode::Maximum)
    }
}

impl fmt::Display for RankMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RankMode::Minimum => "minimum",
            RankMode::Maximum => "maximum",
            RankMode::Median => "median",
            RankMode::Quantile25 => "25% quantile",
            RankMode::Quantile75 => "75% quantile",
        };
        f.write_str(name)
    }
}

fn nth(values: &mut [f32], k: usize) -> f32 {
    *values.select_nth_unstable_by(k, f32::total_cmp).1
}

/// Compute one output tile of a rank filter.
///
/// Each included tap contributes `tap.weight * pixel` and the tile value is
/// the order statistic of those contributions. Minimum and maximum keep a
/// running accumulator per output row; the other modes gather the window of
/// every output pixel into a scratch buffer.
pub(crate) fn rank_tile<T: Pixel>(
    input: &PaddedInput<'_, T>,
    taps: &[Tap],
    mode: RankMode,
    stride: Stride,
    plan: ChannelPlan,
    mut view: TileView<'_>,
) -> Result<(), FilterError> {
    view.check()?;
    let tile = view.tile();
    let channels = input.channels();
    let computed = plan.computed();

    if taps.is_empty() {
        for i in 0..tile.height() {
            view.row_mut(i).fill(0.0);
        }
        return Ok(());
    }

    if mode.needs_scratch() {
        let mut scratch = vec![0.0f32; taps.len()];
        for i in 0..tile.height() {
            let base_row = (tile.row_start + i) * stride.y;
            let dst = view.row_mut(i);
            for (j, px) in dst.chunks_exact_mut(channels).enumerate() {
                let base_col = (tile.col_start + j) * stride.x;
                for c in 0..computed {
                    for (slot, tap) in scratch.iter_mut().zip(taps) {
                        let src = (base_col + tap.dx) * channels + c;
                        *slot = tap.weight * input.row(base_row + tap.dy)[src].to_f32();
                    }
                    px[c] = mode.select(&mut scratch);
                }
            }
            plan.finish_row(dst);
        }
        return Ok(());
    }

    let (init, pick) = match mode {
        RankMode::Maximum => (f32::NEG_INFINITY, f32::max as fn(f32, f32) -> f32),
        _ => (f32::INFINITY, f32::min as fn(f32, f32) -> f32),
    };

    for i in 0..tile.height() {
        let base_row = (tile.row_start + i) * stride.y;
        let dst = view.row_mut(i);
        dst.fill(init);
        for tap in taps {
            let src_row = input.row(base_row + tap.dy);
            for (j, px) in dst.chunks_exact_mut(channels).enumerate() {
                let src = ((tile.col_start + j) * stride.x + tap.dx) * channels;
                for c in 0..computed {
                    px[c] = pick(px[c], tap.weight * src_row[src + c].to_f32());
                }
            }
        }
        plan.finish_row(dst);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_select_odd() {
        let values = [5.0, 1.0, 4.0, 2.0, 3.0];
        let mut scratch = values;
        assert_eq!(RankMode::Minimum.select(&mut scratch), 1.0);
        assert_eq!(RankMode::Maximum.select(&mut scratch), 5.0);
        assert_eq!(RankMode::Median.select(&mut scratch), 3.0);
        // (5 - 1) / 4 = 1 and 3 * (5 - 1) / 4 = 3
        assert_eq!(RankMode::Quantile25.select(&mut scratch), 2.0);
        assert_eq!(RankMode::Quantile75.select(&mut scratch), 4.0);
    }

    #[test]
    fn test_select_even() {
        let mut scratch = [4.0, 1.0, 3.0, 2.0];
        assert_eq!(RankMode::Median.select(&mut scratch), 2.5);
        // (4 - 1) / 4 = 0 and 3 * (4 - 1) / 4 = 2
        assert_eq!(RankMode::Quantile25.select(&mut scratch), 1.0);
        assert_eq!(RankMode::Quantile75.select(&mut scratch), 3.0);

        let mut pair = [7.0, -1.0];
        assert_eq!(RankMode::Median.select(&mut pair), 3.0);
    }

    #[test]
    fn test_select_single() {
        for mode in [
            RankMode::Minimum,
            RankMode::Maximum,
            RankMode::Median,
            RankMode::Quantile25,
            RankMode::Quantile75,
        ] {
            assert_eq!(mode.select(&mut [9.0]), 9.0);
        }
    }

    #[test]
    fn test_display() {
        assert_eq!(RankMode::Quantile75.to_string(), "75% quantile");
        assert_eq!(RankMode::Median.to_string(), "median");
    }
}
