//! Percentile-based linear contrast stretch

use std::cmp::Ordering;

use tracing::debug;

use crate::image_pipeline::common::frame::RawFrame;

/// Clips a frame at its `p` and `100 - p` percentiles and rescales the
/// clipped range onto `[0, 1]` (onto `[-1, 1]` when the low bound is negative).
#[derive(Debug, Clone, Copy)]
pub struct PercentileStretch {
    percentile: f32,
}

impl PercentileStretch {
    pub fn new(percentile: f32) -> Self {
        Self { percentile }
    }

    /// Low/high input bounds over all samples of all channels.
    pub fn bounds(&self, samples: &[f32]) -> Option<(f32, f32)> {
        let p = self.percentile as f64;
        percentile_pair(samples, p, 100.0 - p)
    }

    pub fn apply(&self, frame: &mut RawFrame) {
        let Some((low, high)) = self.bounds(&frame.data) else {
            return;
        };
        debug!(
            "Stretching p{}/p{}: [{}, {}]",
            self.percentile,
            100.0 - self.percentile,
            low,
            high
        );
        rescale_intensity(&mut frame.data, low, high);
    }
}

fn total_order(a: &f32, b: &f32) -> Ordering {
    a.total_cmp(b)
}

/// Value at percentile `q` of `values`, interpolating linearly between the
/// two closest ranks. Reorders `values`.
fn percentile_of(values: &mut [f32], q: f64) -> f32 {
    let rank = q * (values.len() - 1) as f64 / 100.0;
    let below = rank.floor() as usize;
    let fraction = (rank - below as f64) as f32;

    let (_, nth, above) = values.select_nth_unstable_by(below, total_order);
    let low = *nth;
    if fraction == 0.0 || above.is_empty() {
        return low;
    }
    let next = above.iter().copied().min_by(total_order).unwrap_or(low);
    low + (next - low) * fraction
}

/// Percentiles `low_q` and `high_q` (0-100) of the non-NaN samples.
pub fn percentile_pair(samples: &[f32], low_q: f64, high_q: f64) -> Option<(f32, f32)> {
    let mut values: Vec<f32> = samples.iter().copied().filter(|v| !v.is_nan()).collect();
    if values.is_empty() {
        return None;
    }
    let low = percentile_of(&mut values, low_q.clamp(0.0, 100.0));
    let high = percentile_of(&mut values, high_q.clamp(0.0, 100.0));
    Some((low, high))
}

/// Clips to `[low, high]` and maps that interval linearly onto the output
/// range. A degenerate interval collapses every sample to `low`.
pub fn rescale_intensity(samples: &mut [f32], low: f32, high: f32) {
    let (out_min, out_max) = if low < 0.0 { (-1.0, 1.0) } else { (0.0, 1.0) };

    if low == high {
        let level = low.clamp(out_min, out_max);
        samples
            .iter_mut()
            .filter(|v| !v.is_nan())
            .for_each(|v| *v = level);
        return;
    }

    let range = high - low;
    samples
        .iter_mut()
        .for_each(|v| *v = ((*v).clamp(low, high) - low) / range * (out_max - out_min) + out_min);
}
