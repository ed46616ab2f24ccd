use tracing::{error, info, warn};

use crate::camera::FrameSource;
use crate::config::CaptureConfig;
use crate::consts::{FETCH_FAILURE_COOLDOWN, FETCH_FAILURE_WARN_LIMIT};
use crate::daynight::{ControlOutcome, DayNightController, DeviceMode};
use crate::detection::{Action, ChangeDetector, Evaluation};
use crate::error::{CamwatchError, Result};
use crate::logsink::LogSink;
use crate::scheduler::{sleep_unless_quit, Clock, DailySun, Pacer};
use crate::store::{FrameRecord, FrameStore};
use crate::sun::SunCalculator;
use crate::supervisor::{ControlSignals, PidFileGuard};
use crate::tools::{Annotator, ImageDistance};

/// External collaborators the capture loop drives.
pub struct Collaborators {
    pub camera: Box<dyn FrameSource>,
    pub distance: Box<dyn ImageDistance>,
    pub annotator: Box<dyn Annotator>,
    pub sun: Box<dyn SunCalculator>,
    pub clock: Box<dyn Clock>,
}

/// What one iteration of the loop did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StepOutcome {
    /// Quit was requested before any work started.
    Quit,
    /// The illumination command failed; no frame was fetched.
    ModePending,
    FetchFailed,
    /// First frame: kept as the initial candidate without evaluation.
    Primed,
    Evaluated(Action),
}

/// Counters reported when the loop ends.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SessionStats {
    pub fetched: u64,
    pub saved: u64,
    pub synced: u64,
    pub dropped: u64,
    pub errors: u64,
    pub fetch_failures: u64,
}

/// All mutable state of one camera's capture loop.
pub struct CaptureSession {
    camera_name: String,
    store: FrameStore,
    detector: ChangeDetector,
    controller: DayNightController,
    pacer: Pacer,
    sun: DailySun,
    camera: Box<dyn FrameSource>,
    distance: Box<dyn ImageDistance>,
    annotator: Box<dyn Annotator>,
    clock: Box<dyn Clock>,
    signals: ControlSignals,
    log: Option<LogSink>,
    pid_guard: Option<PidFileGuard>,
    candidate: Option<FrameRecord>,
    consecutive_failures: u32,
    stats: SessionStats,
}

impl CaptureSession {
    pub fn new(
        camera_name: &str,
        config: &CaptureConfig,
        store: FrameStore,
        collab: Collaborators,
        signals: ControlSignals,
    ) -> Self {
        let Collaborators {
            camera,
            distance,
            annotator,
            sun,
            clock,
        } = collab;
        Self {
            camera_name: camera_name.to_string(),
            store,
            detector: ChangeDetector::new(config),
            controller: DayNightController::new(),
            pacer: Pacer::new(config.period_duration()),
            sun: DailySun::new(sun),
            camera,
            distance,
            annotator,
            clock,
            signals,
            log: None,
            pid_guard: None,
            candidate: None,
            consecutive_failures: 0,
            stats: SessionStats::default(),
        }
    }

    /// Reopen this sink when SIGHUP arrives.
    pub fn with_log_sink(mut self, sink: LogSink) -> Self {
        self.log = Some(sink);
        self
    }

    /// Own the PID file: record mode changes in it and remove it when the
    /// session is dropped.
    pub fn with_pid_guard(mut self, guard: PidFileGuard) -> Self {
        self.pid_guard = Some(guard);
        self
    }

    pub fn candidate(&self) -> Option<&FrameRecord> {
        self.candidate.as_ref()
    }

    pub fn detector(&self) -> &ChangeDetector {
        &self.detector
    }

    pub fn mode(&self) -> DeviceMode {
        self.controller.mode()
    }

    pub fn stats(&self) -> SessionStats {
        self.stats
    }

    /// Run until quit is requested, then promote the last candidate.
    ///
    /// A failing iteration ends the loop but still goes through the same
    /// cleanup as a normal quit.
    pub fn run(&mut self) -> Result<SessionStats> {
        info!(camera = %self.camera_name, "Capture started");
        let result = self.run_loop();
        if let Err(e) = &result {
            error!(camera = %self.camera_name, "Capture loop failed: {e}");
        }
        self.finish();
        result.map(|()| self.stats)
    }

    fn run_loop(&mut self) -> Result<()> {
        while !self.signals.quit_requested() {
            if self.step()? == StepOutcome::Quit {
                break;
            }
        }
        Ok(())
    }

    /// One iteration: pace, control illumination, fetch, evaluate, store.
    pub fn step(&mut self) -> Result<StepOutcome> {
        self.checkpoint();

        let wait = self.pacer.wait_at(self.clock.now());
        if !sleep_unless_quit(self.clock.as_ref(), wait, &self.signals) {
            return Ok(StepOutcome::Quit);
        }
        let now = self.clock.now();
        self.pacer.started(now);

        let sun = self.sun.for_time(now)?;
        let control = self
            .controller
            .tick(now, &sun, self.camera.as_mut());
        if let ControlOutcome::Switched(mode) = control {
            self.record_mode(mode);
        }
        if !control.capture_allowed() {
            return Ok(StepOutcome::ModePending);
        }

        let bytes = match self.camera.fetch_snapshot() {
            Ok(bytes) => {
                self.consecutive_failures = 0;
                bytes
            }
            Err(e) => {
                self.on_fetch_failure(e);
                return Ok(StepOutcome::FetchFailed);
            }
        };
        self.stats.fetched += 1;

        let frame = self.store.write_candidate(&bytes, now)?;
        let Some(previous) = self.candidate.take() else {
            self.detector.prime(now);
            self.candidate = Some(frame);
            return Ok(StepOutcome::Primed);
        };

        let metric = match self.distance.compare(&previous.path, &frame.path) {
            Ok(m) => Some(m),
            Err(e) => {
                error!(frame = %frame.stem(), "Frame comparison failed: {e}");
                None
            }
        };
        let evaluation = self.detector.evaluate(metric, now);
        self.log_evaluation(&previous, &frame, &evaluation);

        match evaluation.action {
            Action::Save | Action::Sync => {
                let promoted = self.store.promote(previous, self.annotator.as_ref());
                self.candidate = Some(frame);
                promoted?;
            }
            Action::Drop | Action::Error => {
                self.candidate = Some(previous);
                self.store.discard(frame)?;
            }
        }
        self.count(evaluation.action);
        Ok(StepOutcome::Evaluated(evaluation.action))
    }

    /// Promote the pending candidate so the last frame seen is kept.
    pub fn finish(&mut self) {
        if let Some(last) = self.candidate.take() {
            if let Err(e) = self.store.promote(last, self.annotator.as_ref()) {
                error!("Failed to keep last candidate: {e}");
            }
        }
        let s = &self.stats;
        info!(
            fetched = s.fetched,
            saved = s.saved,
            synced = s.synced,
            dropped = s.dropped,
            errors = s.errors,
            "Exiting"
        );
    }

    /// Handle requests raised by signals since the last iteration.
    fn checkpoint(&mut self) {
        if !self.signals.take_reopen() {
            return;
        }
        info!("SIGHUP received");
        let Some(sink) = &self.log else {
            return;
        };
        info!("Closing and reopening log file");
        match sink.reopen() {
            Ok(_) => info!("Log file reopened"),
            Err(e) => error!("Failed to reopen log file: {e}"),
        }
    }

    fn on_fetch_failure(&mut self, e: CamwatchError) {
        self.stats.fetch_failures += 1;
        self.consecutive_failures += 1;
        if self.consecutive_failures > FETCH_FAILURE_WARN_LIMIT {
            error!(
                failures = self.consecutive_failures,
                "Snapshot failed: {e}; cooling down for {}s",
                FETCH_FAILURE_COOLDOWN.as_secs()
            );
            sleep_unless_quit(
                self.clock.as_ref(),
                FETCH_FAILURE_COOLDOWN,
                &self.signals,
            );
        } else {
            warn!(failures = self.consecutive_failures, "Snapshot failed: {e}");
        }
    }

    fn record_mode(&mut self, mode: DeviceMode) {
        if let Some(guard) = self.pid_guard.as_mut() {
            if let Err(e) = guard.set_mode(mode) {
                warn!("Failed to record mode in PID file: {e}");
            }
        }
    }

    fn log_evaluation(&self, previous: &FrameRecord, frame: &FrameRecord, eval: &Evaluation) {
        let ir = if self.controller.mode() == DeviceMode::Night {
            "IR "
        } else {
            ""
        };
        match (eval.metric, eval.average, eval.diff) {
            (Some(metric), Some(average), Some(diff)) => info!(
                action = %eval.action,
                "{ir}compare [{} vs {}] metric:{metric:.4} avg:{average:.4} diff:{diff:.4} -> {}",
                previous.stem(),
                frame.stem(),
                eval.action
            ),
            _ => info!(
                action = %eval.action,
                "{ir}compare [{} vs {}] -> {}",
                previous.stem(),
                frame.stem(),
                eval.action
            ),
        }
    }

    fn count(&mut self, action: Action) {
        match action {
            Action::Save => self.stats.saved += 1,
            Action::Sync => self.stats.synced += 1,
            Action::Drop => self.stats.dropped += 1,
            Action::Error => self.stats.errors += 1,
        }
    }
}
