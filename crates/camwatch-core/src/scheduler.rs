use std::time::Duration;

use chrono::{DateTime, Local, NaiveDate};
use tracing::info;

use crate::consts::SLEEP_SLICE;
use crate::error::Result;
use crate::supervisor::signals::ControlSignals;
use crate::sun::{SunCalculator, SunTimes};

/// Wall-clock time and blocking sleep.
pub trait Clock {
    fn now(&self) -> DateTime<Local>;
    fn sleep(&self, duration: Duration);
}

/// The real clock.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }

    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// Drift-corrected fixed-period pacing.
///
/// Each wait is measured from the start of the previous iteration, so time
/// spent working is absorbed. An overrun yields a zero wait: missed periods
/// are skipped, never made up.
#[derive(Clone, Debug)]
pub struct Pacer {
    period: chrono::Duration,
    last_start: Option<DateTime<Local>>,
}

impl Pacer {
    pub fn new(period: Duration) -> Self {
        Self {
            period: chrono::Duration::from_std(period).unwrap_or(chrono::Duration::MAX),
            last_start: None,
        }
    }

    /// How long to wait at `now` before starting the next iteration.
    pub fn wait_at(&self, now: DateTime<Local>) -> Duration {
        let Some(last) = self.last_start else {
            return Duration::ZERO;
        };
        match last.checked_add_signed(self.period) {
            Some(next) => (next - now).to_std().unwrap_or(Duration::ZERO),
            // Next start lies past the calendar range.
            None => self.period.to_std().unwrap_or(Duration::MAX),
        }
    }

    /// Mark the start of an iteration's work.
    pub fn started(&mut self, at: DateTime<Local>) {
        self.last_start = Some(at);
    }
}

/// Sunrise/sunset, recomputed once per calendar day.
pub struct DailySun {
    calculator: Box<dyn SunCalculator>,
    cached: Option<(NaiveDate, SunTimes)>,
}

impl DailySun {
    pub fn new(calculator: Box<dyn SunCalculator>) -> Self {
        Self {
            calculator,
            cached: None,
        }
    }

    /// Sun times for the day containing `now`.
    pub fn for_time(&mut self, now: DateTime<Local>) -> Result<SunTimes> {
        let today = now.date_naive();
        match self.cached {
            Some((day, times)) if day == today => Ok(times),
            _ => {
                let times = self.calculator.sun_times(today)?;
                info!(
                    sunrise = %times.sunrise.format("%H:%M:%S"),
                    sunset = %times.sunset.format("%H:%M:%S"),
                    "Sun times for {today}"
                );
                self.cached = Some((today, times));
                Ok(times)
            }
        }
    }
}

/// Sleep for `total` in short slices, returning early once quit is requested.
///
/// Returns `false` if the sleep was cut short.
pub fn sleep_unless_quit(clock: &dyn Clock, total: Duration, signals: &ControlSignals) -> bool {
    let mut remaining = total;
    while !remaining.is_zero() {
        if signals.quit_requested() {
            return false;
        }
        let slice = remaining.min(SLEEP_SLICE);
        clock.sleep(slice);
        remaining -= slice;
    }
    !signals.quit_requested()
}
