#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::time::Duration;

use camwatch_core::camera::FrameSource;
use camwatch_core::config::CaptureConfig;
use camwatch_core::daynight::Illumination;
use camwatch_core::error::{CamwatchError, Result};
use camwatch_core::scheduler::Clock;
use camwatch_core::session::{CaptureSession, Collaborators};
use camwatch_core::store::FrameStore;
use camwatch_core::sun::{SunCalculator, SunTimes};
use camwatch_core::supervisor::{ControlSignals, ProcessControl, StopSignal};
use camwatch_core::tools::{Annotator, ImageDistance};
use chrono::{DateTime, Local, NaiveDate, TimeZone};
use tempfile::TempDir;

/// Local time on 2024-06-01.
pub fn at(h: u32, m: u32, s: u32) -> DateTime<Local> {
    Local.with_ymd_and_hms(2024, 6, 1, h, m, s).unwrap()
}

pub fn secs(s: f64) -> chrono::Duration {
    chrono::Duration::milliseconds((s * 1000.0).round() as i64)
}

pub fn test_failure(what: &str) -> CamwatchError {
    CamwatchError::Tool {
        tool: "fake".to_string(),
        message: what.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Clock
// ---------------------------------------------------------------------------

/// Clock that only moves when slept on.
#[derive(Clone)]
pub struct FakeClock {
    now: Rc<Cell<DateTime<Local>>>,
    slept: Rc<Cell<Duration>>,
}

impl FakeClock {
    pub fn starting_at(start: DateTime<Local>) -> Self {
        Self {
            now: Rc::new(Cell::new(start)),
            slept: Rc::new(Cell::new(Duration::ZERO)),
        }
    }

    pub fn advance(&self, by: chrono::Duration) {
        self.now.set(self.now.get() + by);
    }

    pub fn total_slept(&self) -> Duration {
        self.slept.get()
    }
}

impl Clock for FakeClock {
    fn now(&self) -> DateTime<Local> {
        self.now.get()
    }

    fn sleep(&self, duration: Duration) {
        self.slept.set(self.slept.get() + duration);
        self.advance(chrono::Duration::from_std(duration).unwrap());
    }
}

// ---------------------------------------------------------------------------
// Camera
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct CameraScript {
    /// Number of upcoming snapshot requests that fail.
    pub failing_fetches: u32,
    /// Number of upcoming illumination commands that fail.
    pub failing_commands: u32,
    pub fetches: u32,
    /// Every illumination command attempted, including failed ones.
    pub commands: Vec<Illumination>,
}

#[derive(Clone, Default)]
pub struct ScriptedCamera {
    pub script: Rc<RefCell<CameraScript>>,
}

impl FrameSource for ScriptedCamera {
    fn fetch_snapshot(&mut self) -> Result<Vec<u8>> {
        let mut script = self.script.borrow_mut();
        if script.failing_fetches > 0 {
            script.failing_fetches -= 1;
            return Err(CamwatchError::Http("connection refused".to_string()));
        }
        script.fetches += 1;
        Ok(format!("frame {}", script.fetches).into_bytes())
    }

    fn set_illumination(&mut self, mode: Illumination) -> Result<()> {
        let mut script = self.script.borrow_mut();
        script.commands.push(mode);
        if script.failing_commands > 0 {
            script.failing_commands -= 1;
            return Err(CamwatchError::Http("503 Service Unavailable".to_string()));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Distance
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct DistanceScript {
    /// Upcoming results; `None` makes the comparison fail.
    pub queue: VecDeque<Option<f64>>,
    /// Returned once the queue is empty.
    pub fallback: f64,
    /// File names of every compared pair.
    pub pairs: Vec<(String, String)>,
}

#[derive(Clone, Default)]
pub struct ScriptedDistance {
    pub script: Rc<RefCell<DistanceScript>>,
}

impl ScriptedDistance {
    pub fn constant(value: f64) -> Self {
        let d = Self::default();
        d.script.borrow_mut().fallback = value;
        d
    }

    pub fn then(&self, results: &[Option<f64>]) {
        self.script.borrow_mut().queue.extend(results.iter().copied());
    }
}

impl ImageDistance for ScriptedDistance {
    fn compare(&self, a: &Path, b: &Path) -> Result<f64> {
        let mut script = self.script.borrow_mut();
        script.pairs.push((file_name(a), file_name(b)));
        let next = script.queue.pop_front().unwrap_or(Some(script.fallback));
        next.ok_or_else(|| test_failure("compare"))
    }
}

// ---------------------------------------------------------------------------
// Annotator
// ---------------------------------------------------------------------------

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AnnotateMode {
    /// Copy the source with an "annotated" marker appended.
    #[default]
    Annotate,
    /// Fail without touching the destination.
    Fail,
    /// Write the destination, then report failure.
    WriteThenFail,
}

#[derive(Clone, Default)]
pub struct RecordingAnnotator {
    pub mode: AnnotateMode,
    pub written: Rc<RefCell<Vec<PathBuf>>>,
}

impl RecordingAnnotator {
    pub fn with_mode(mode: AnnotateMode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }
}

impl Annotator for RecordingAnnotator {
    fn overlay_timestamp(&self, src: &Path, dest: &Path, _at: DateTime<Local>) -> Result<()> {
        match self.mode {
            AnnotateMode::Fail => Err(test_failure("overlay")),
            AnnotateMode::Annotate | AnnotateMode::WriteThenFail => {
                let mut bytes = fs::read(src)?;
                bytes.extend_from_slice(b" annotated");
                fs::write(dest, bytes)?;
                self.written.borrow_mut().push(dest.to_path_buf());
                if self.mode == AnnotateMode::WriteThenFail {
                    Err(test_failure("overlay"))
                } else {
                    Ok(())
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Sun
// ---------------------------------------------------------------------------

/// Sunrise at 06:00 and sunset at 20:00 every day.
pub struct FixedSun;

impl SunCalculator for FixedSun {
    fn sun_times(&self, date: NaiveDate) -> Result<SunTimes> {
        let local = |h| {
            Local
                .from_local_datetime(&date.and_hms_opt(h, 0, 0).unwrap())
                .single()
                .unwrap()
        };
        Ok(SunTimes {
            sunrise: local(6),
            sunset: local(20),
        })
    }
}

// ---------------------------------------------------------------------------
// Processes
// ---------------------------------------------------------------------------

/// Scripted target for the stop protocol.
#[derive(Default)]
pub struct FakeProcesses {
    /// Whether the process exists when the first signal is sent.
    pub running: bool,
    /// Exits on its own once this many probes follow the first signal.
    pub exits_after: Option<u32>,
    pub dies_on_kill: bool,
    calls: Cell<u32>,
    dead: Cell<bool>,
    pub sent: RefCell<Vec<StopSignal>>,
}

impl FakeProcesses {
    pub fn running() -> Self {
        Self {
            running: true,
            ..Self::default()
        }
    }

    pub fn exiting_after(mut self, polls: u32) -> Self {
        self.exits_after = Some(polls);
        self
    }

    pub fn dying_on_kill(mut self) -> Self {
        self.dies_on_kill = true;
        self
    }

    pub fn sent_count(&self, signal: StopSignal) -> usize {
        self.sent.borrow().iter().filter(|s| **s == signal).count()
    }

    fn observe(&self, signal: Option<StopSignal>) -> bool {
        let n = self.calls.get();
        self.calls.set(n + 1);
        if let Some(signal) = signal {
            self.sent.borrow_mut().push(signal);
        }
        if !self.running || self.dead.get() {
            return false;
        }
        if self.exits_after.is_some_and(|e| n >= e) {
            self.dead.set(true);
            return false;
        }
        if signal == Some(StopSignal::Kill) && self.dies_on_kill {
            // The signal is delivered; the next probe finds it gone.
            self.dead.set(true);
        }
        true
    }
}

impl ProcessControl for FakeProcesses {
    fn is_alive(&self, _pid: i32) -> Result<bool> {
        Ok(self.observe(None))
    }

    fn signal(&self, _pid: i32, signal: StopSignal) -> Result<bool> {
        Ok(self.observe(Some(signal)))
    }
}

// ---------------------------------------------------------------------------
// Session harness
// ---------------------------------------------------------------------------

pub const CAMERA: &str = "alley";

/// A capture session wired to fakes, with handles to inspect them.
pub struct Harness {
    pub dir: TempDir,
    pub clock: FakeClock,
    pub camera: ScriptedCamera,
    pub distance: ScriptedDistance,
    pub annotator: RecordingAnnotator,
    pub signals: ControlSignals,
}

impl Harness {
    pub fn new(start: DateTime<Local>, distance: ScriptedDistance) -> Self {
        Self {
            dir: tempfile::tempdir().unwrap(),
            clock: FakeClock::starting_at(start),
            camera: ScriptedCamera::default(),
            distance,
            annotator: RecordingAnnotator::default(),
            signals: ControlSignals::new(),
        }
    }

    pub fn work_dir(&self) -> PathBuf {
        self.dir.path().join("work")
    }

    pub fn save_dir(&self) -> PathBuf {
        self.dir.path().join("save")
    }

    pub fn store(&self) -> FrameStore {
        FrameStore::open(CAMERA, self.work_dir(), self.save_dir()).unwrap()
    }

    pub fn session(&self, config: &CaptureConfig) -> CaptureSession {
        let collab = Collaborators {
            camera: Box::new(self.camera.clone()),
            distance: Box::new(self.distance.clone()),
            annotator: Box::new(self.annotator.clone()),
            sun: Box::new(FixedSun),
            clock: Box::new(self.clock.clone()),
        };
        CaptureSession::new(CAMERA, config, self.store(), collab, self.signals.clone())
    }
}

pub fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Sorted file names in `dir`.
pub fn list(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}
