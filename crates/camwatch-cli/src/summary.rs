use std::path::Path;

use camwatch_core::config::{AppConfig, CaptureConfig};
use camwatch_core::session::SessionStats;
use camwatch_core::supervisor::DaemonRecord;
use console::Style;

struct Styles {
    title: Style,
    label: Style,
    value: Style,
    good: Style,
    bad: Style,
    path: Style,
}

impl Styles {
    fn new() -> Self {
        Self {
            title: Style::new().cyan().bold(),
            label: Style::new().dim(),
            value: Style::new().bold().white(),
            good: Style::new().green(),
            bad: Style::new().dim().yellow(),
            path: Style::new().underlined(),
        }
    }
}

fn title(s: &Styles, text: &str) {
    println!();
    println!("  {}", s.title.apply_to(text));
    println!("  {}", s.title.apply_to("\u{2550}".repeat(text.chars().count())));
    println!();
}

pub fn print_capture_summary(camera: &str, config: &AppConfig, capture: &CaptureConfig) {
    let s = Styles::new();
    title(&s, &format!("camwatch {camera}"));

    println!(
        "  {:<14}{}",
        s.label.apply_to("Work dir"),
        s.path.apply_to(config.paths.work_dir(camera).display())
    );
    println!(
        "  {:<14}{}",
        s.label.apply_to("Save dir"),
        s.path.apply_to(config.paths.save_dir(camera).display())
    );
    println!(
        "  {:<14}{}",
        s.label.apply_to("Distance"),
        s.good.apply_to(config.tools.distance)
    );
    println!(
        "  {:<14}{}",
        s.label.apply_to("Metric"),
        s.value.apply_to(capture.metric)
    );
    println!(
        "  {:<14}{}",
        s.label.apply_to("Period"),
        s.value.apply_to(format!("{}s", capture.period))
    );
    println!(
        "  {:<14}{}",
        s.label.apply_to("Max delta"),
        s.value.apply_to(format!("{}s", capture.max_delta))
    );
    println!(
        "  {:<14}{}",
        s.label.apply_to("Window"),
        s.value.apply_to(capture.window_size)
    );
    println!(
        "  {:<14}{}",
        s.label.apply_to("Cap"),
        s.value.apply_to(capture.baseline_cap)
    );
    println!(
        "  {:<14}{}",
        s.label.apply_to("Threshold"),
        s.value.apply_to(format!("{:.1}%", capture.threshold_pct * 100.0))
    );
    println!();
}

pub fn print_session_stats(stats: &SessionStats) {
    let s = Styles::new();
    println!();
    for (label, value) in [
        ("Fetched", stats.fetched),
        ("Saved", stats.saved),
        ("Synced", stats.synced),
        ("Dropped", stats.dropped),
        ("Errors", stats.errors),
        ("Fetch fails", stats.fetch_failures),
    ] {
        println!("  {:<14}{}", s.label.apply_to(label), s.value.apply_to(value));
    }
}

/// Liveness of the instance a PID file names.
pub enum DaemonState {
    NotRunning,
    Running(DaemonRecord),
    Stale(DaemonRecord),
}

pub fn print_status(camera: &str, pid_path: &Path, state: &DaemonState) {
    let s = Styles::new();
    title(&s, &format!("camwatch {camera}"));
    println!(
        "  {:<14}{}",
        s.label.apply_to("PID file"),
        s.path.apply_to(pid_path.display())
    );

    let record = match state {
        DaemonState::NotRunning => {
            println!("  {:<14}{}", s.label.apply_to("State"), s.bad.apply_to("not running"));
            println!();
            return;
        }
        DaemonState::Running(record) => {
            println!("  {:<14}{}", s.label.apply_to("State"), s.good.apply_to("running"));
            record
        }
        DaemonState::Stale(record) => {
            println!(
                "  {:<14}{}",
                s.label.apply_to("State"),
                s.bad.apply_to("stale (process gone)")
            );
            record
        }
    };

    println!("  {:<14}{}", s.label.apply_to("PID"), s.value.apply_to(record.pid));
    if let Some(started) = record.started {
        println!(
            "  {:<14}{}",
            s.label.apply_to("Started"),
            s.value.apply_to(started.format("%Y-%m-%d %H:%M:%S"))
        );
    }
    if let Some(mode) = record.mode {
        println!("  {:<14}{}", s.label.apply_to("Mode"), s.value.apply_to(mode));
    }
    println!();
}
