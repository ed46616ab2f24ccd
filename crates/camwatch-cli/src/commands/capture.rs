use std::path::Path;

use anyhow::{Context, Result};
use camwatch_core::camera::HttpCamera;
use camwatch_core::config::DistanceBackend;
use camwatch_core::logsink::LogSink;
use camwatch_core::scheduler::SystemClock;
use camwatch_core::session::{CaptureSession, Collaborators};
use camwatch_core::store::FrameStore;
use camwatch_core::sun::SiteSun;
use camwatch_core::supervisor::{
    detach, displace_previous, ControlSignals, DaemonRecord, HandoverPolicy, PidFile,
    PidFileGuard, SystemProcesses,
};
use camwatch_core::tools::{GraphicsMagick, ImageDistance, PixelDistance};
use clap::Args;
use tracing::info;

use crate::settings::load_config;
use crate::summary::{print_capture_summary, print_session_stats};

#[derive(Args)]
pub struct CaptureArgs {
    /// Camera name as listed under [cameras] in the config
    pub camera: String,

    /// Replace a running instance, detach and log to the camera's log file
    #[arg(short, long)]
    pub daemon: bool,
}

pub fn run(args: &CaptureArgs, config_path: &Path, sink: LogSink) -> Result<()> {
    let config = load_config(config_path)?;
    let camera = config.camera(&args.camera)?;
    let capture = config.capture.resolve()?;
    let paths = &config.paths;

    let span = tracing::info_span!("capture", camera = %args.camera);
    let _enter = span.enter();

    let mut pid_guard = None;
    if args.daemon {
        let pid_file = PidFile::new(paths.pid_file(&args.camera));
        displace_previous(
            &pid_file,
            &SystemProcesses,
            &HandoverPolicy::default(),
            &std::thread::sleep,
        )?;

        let log_path = paths.log_file(&args.camera);
        sink.redirect_to(&log_path)
            .with_context(|| format!("Failed to open log file {}", log_path.display()))?;
        detach().context("Failed to detach from terminal")?;
        info!(pid = std::process::id(), "Daemon started");
        pid_guard = Some(PidFileGuard::acquire(pid_file, DaemonRecord::current())?);
    } else {
        print_capture_summary(&args.camera, &config, &capture);
    }

    let signals = ControlSignals::new();
    signals.register().context("Failed to install signal handlers")?;

    let store = FrameStore::open(
        &args.camera,
        paths.work_dir(&args.camera),
        paths.save_dir(&args.camera),
    )?;

    let gm = GraphicsMagick::new(&config.tools, capture.metric);
    let distance: Box<dyn ImageDistance> = match config.tools.distance {
        DistanceBackend::GraphicsMagick => Box::new(gm.clone()),
        DistanceBackend::Builtin => Box::new(PixelDistance::new(capture.metric)),
    };
    let collab = Collaborators {
        camera: Box::new(HttpCamera::new(camera)),
        distance,
        annotator: Box::new(gm),
        sun: Box::new(SiteSun::from(&config.site)),
        clock: Box::new(SystemClock),
    };

    let mut session = CaptureSession::new(&args.camera, &capture, store, collab, signals)
        .with_log_sink(sink);
    if let Some(guard) = pid_guard {
        session = session.with_pid_guard(guard);
    }

    let stats = session.run()?;
    if !args.daemon {
        print_session_stats(&stats);
    }
    Ok(())
}
