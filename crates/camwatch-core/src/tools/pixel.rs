use std::path::Path;

use rayon::prelude::*;

use crate::config::MetricKind;
use crate::consts::PARALLEL_SAMPLE_THRESHOLD;
use crate::error::{CamwatchError, Result};

use super::ImageDistance;

/// In-process frame distance over RGB channels normalized to [0, 1].
///
/// Matches the normalized `Total` that `gm compare` reports closely enough to
/// share its baseline caps and thresholds.
#[derive(Clone, Copy, Debug)]
pub struct PixelDistance {
    pub metric: MetricKind,
}

impl PixelDistance {
    pub fn new(metric: MetricKind) -> Self {
        Self { metric }
    }
}

impl ImageDistance for PixelDistance {
    fn compare(&self, a: &Path, b: &Path) -> Result<f64> {
        let a = image::open(a)?.to_rgb32f();
        let b = image::open(b)?.to_rgb32f();
        if a.dimensions() != b.dimensions() {
            return Err(CamwatchError::DimensionMismatch {
                left: a.dimensions(),
                right: b.dimensions(),
            });
        }
        Ok(sample_distance(a.as_raw(), b.as_raw(), self.metric))
    }
}

/// MAE or RMSE between two equally long sample buffers.
pub fn sample_distance(a: &[f32], b: &[f32], metric: MetricKind) -> f64 {
    let n = a.len().min(b.len());
    if n == 0 {
        return 0.0;
    }
    let term = |(x, y): (&f32, &f32)| -> f64 {
        let d = (*x as f64) - (*y as f64);
        match metric {
            MetricKind::Mae => d.abs(),
            MetricKind::Rmse => d * d,
        }
    };

    let sum: f64 = if n >= PARALLEL_SAMPLE_THRESHOLD {
        a[..n].par_iter().zip(b[..n].par_iter()).map(term).sum()
    } else {
        a[..n].iter().zip(b[..n].iter()).map(term).sum()
    };

    let mean = sum / n as f64;
    match metric {
        MetricKind::Mae => mean,
        MetricKind::Rmse => mean.sqrt(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_buffers_have_zero_distance() {
        let a = vec![0.25f32; 12];
        assert_eq!(sample_distance(&a, &a, MetricKind::Mae), 0.0);
        assert_eq!(sample_distance(&a, &a, MetricKind::Rmse), 0.0);
    }

    #[test]
    fn mae_and_rmse_differ_on_uneven_error() {
        let a = [0.0f32, 0.0, 0.0, 0.0];
        let b = [1.0f32, 0.0, 0.0, 0.0];
        assert!((sample_distance(&a, &b, MetricKind::Mae) - 0.25).abs() < 1e-12);
        assert!((sample_distance(&a, &b, MetricKind::Rmse) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn parallel_path_matches_serial() {
        let n = PARALLEL_SAMPLE_THRESHOLD + 7;
        let a: Vec<f32> = (0..n).map(|i| (i % 17) as f32 / 16.0).collect();
        let b: Vec<f32> = (0..n).map(|i| (i % 13) as f32 / 12.0).collect();
        let par = sample_distance(&a, &b, MetricKind::Rmse);
        let serial = {
            let s: f64 = a
                .iter()
                .zip(&b)
                .map(|(x, y)| ((*x as f64) - (*y as f64)).powi(2))
                .sum();
            (s / n as f64).sqrt()
        };
        assert!((par - serial).abs() < 1e-9);
    }
}
