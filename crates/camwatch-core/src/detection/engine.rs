use chrono::{DateTime, Local};

use crate::config::CaptureConfig;

use super::baseline::Baseline;

/// Decision for one incoming frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    /// Change detected: retain the previous candidate.
    Save,
    /// No change, but `max_delta` elapsed: retain the previous candidate anyway.
    Sync,
    /// No change: discard the incoming frame.
    Drop,
    /// Distance could not be computed: discard the incoming frame.
    Error,
}

impl Action {
    /// Whether the previous candidate is promoted and the incoming frame
    /// becomes the new candidate.
    pub fn promotes(&self) -> bool {
        matches!(self, Self::Save | Self::Sync)
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Save => write!(f, "SAVE"),
            Self::Sync => write!(f, "SYNC"),
            Self::Drop => write!(f, "drop"),
            Self::Error => write!(f, "ERROR"),
        }
    }
}

/// Outcome of [`ChangeDetector::evaluate`], with the numbers behind it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Evaluation {
    pub action: Action,
    /// Raw, uncapped distance.
    pub metric: Option<f64>,
    /// Baseline average after folding in this sample.
    pub average: Option<f64>,
    /// `metric - average`, signed.
    pub diff: Option<f64>,
}

impl Evaluation {
    fn error() -> Self {
        Self {
            action: Action::Error,
            metric: None,
            average: None,
            diff: None,
        }
    }
}

/// Adaptive change detector.
///
/// Keeps a rolling baseline of capped frame-to-frame distances and flags a
/// frame as changed when its raw distance exceeds the baseline by more than
/// `threshold_pct` of the baseline.
#[derive(Clone, Debug)]
pub struct ChangeDetector {
    window_size: usize,
    baseline_cap: f64,
    threshold_pct: f64,
    max_delta: f64,
    baseline: Option<Baseline>,
    last_retained: Option<DateTime<Local>>,
}

impl ChangeDetector {
    pub fn new(config: &CaptureConfig) -> Self {
        Self {
            window_size: config.window_size,
            baseline_cap: config.baseline_cap,
            threshold_pct: config.threshold_pct,
            max_delta: config.max_delta,
            baseline: None,
            last_retained: None,
        }
    }

    /// Record the arrival of the very first candidate frame. It is retained
    /// without evaluation and starts the `max_delta` clock.
    pub fn prime(&mut self, at: DateTime<Local>) {
        self.last_retained = Some(at);
    }

    /// Classify a frame given its distance to the previous candidate.
    ///
    /// `metric` is `None` when the distance could not be computed.
    pub fn evaluate(&mut self, metric: Option<f64>, now: DateTime<Local>) -> Evaluation {
        let metric = match metric {
            Some(m) if m.is_finite() && m >= 0.0 => m,
            _ => return Evaluation::error(),
        };

        let capped = metric.min(self.baseline_cap);
        let average = match self.baseline.as_mut() {
            Some(baseline) => {
                baseline.push(capped);
                baseline.average()
            }
            None => {
                let baseline = Baseline::seeded(capped, self.window_size);
                let average = baseline.average();
                self.baseline = Some(baseline);
                average
            }
        };

        let diff = metric - average;
        let action = if diff > average * self.threshold_pct {
            Action::Save
        } else if self.elapsed_since_retained(now) > self.max_delta {
            Action::Sync
        } else {
            Action::Drop
        };

        if action.promotes() {
            self.last_retained = Some(now);
        }

        Evaluation {
            action,
            metric: Some(metric),
            average: Some(average),
            diff: Some(diff),
        }
    }

    /// Forget the baseline; the next sample re-seeds it.
    pub fn reset(&mut self) {
        self.baseline = None;
    }

    pub fn baseline(&self) -> Option<&Baseline> {
        self.baseline.as_ref()
    }

    pub fn last_retained(&self) -> Option<DateTime<Local>> {
        self.last_retained
    }

    fn elapsed_since_retained(&mut self, now: DateTime<Local>) -> f64 {
        let anchor = *self.last_retained.get_or_insert(now);
        (now - anchor).num_milliseconds() as f64 / 1000.0
    }
}
