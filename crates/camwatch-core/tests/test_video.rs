use std::fs;
use std::path::{Path, PathBuf};

use camwatch_core::tools::ffmpeg::assemble_args;
use camwatch_core::tools::VideoAssembler;
use camwatch_core::video::{plan_video, VideoWindow};
use chrono::NaiveDate;

fn touch_all(dir: &Path, names: &[&str]) {
    for name in names {
        fs::write(dir.join(name), b"jpeg").unwrap();
    }
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn sample_dir() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    touch_all(
        dir.path(),
        &[
            "alley-20240531-195959_000.jpg",
            "alley-20240531-230000_000.jpg",
            "alley-20240601-075959_999.jpg",
            "alley-20240601-080000_000.jpg",
            "alley-20240601-135000_500.jpg",
            "alley-20240601-195959_999.jpg",
            "alley-20240601-200000_000.jpg",
            "yard-20240601-090000_000.jpg",
            "alley-20240601-100000_000.png",
        ],
    );
    dir
}

#[test]
fn test_day_plan_selects_daytime_frames() {
    let dir = sample_dir();
    let plan = plan_video(
        "alley",
        date(2024, 6, 1),
        VideoWindow::Day,
        dir.path(),
        Path::new("/videos"),
    )
    .unwrap();

    let counts: Vec<usize> = plan.groups.iter().map(|g| g.frames).collect();
    assert_eq!(counts, vec![1, 2]);
    assert_eq!(plan.frame_count(), 3);
    assert_eq!(
        plan.globs(),
        vec![
            dir.path().join("alley-20240601-0[89]*.jpg"),
            dir.path().join("alley-20240601-1*.jpg"),
        ]
    );
    assert_eq!(
        plan.output,
        PathBuf::from("/videos/2024/06/alley-20240601-08:00_19:59.mp4")
    );
}

#[test]
fn test_night_plan_spans_previous_evening() {
    let dir = sample_dir();
    let plan = plan_video(
        "alley",
        date(2024, 6, 1),
        VideoWindow::Night,
        dir.path(),
        Path::new("/videos"),
    )
    .unwrap();

    assert_eq!(plan.groups[0].date, date(2024, 5, 31));
    assert_eq!(plan.groups[0].frames, 1);
    assert_eq!(plan.groups[1].date, date(2024, 6, 1));
    assert_eq!(plan.groups[1].frames, 1);
    assert_eq!(
        plan.output,
        PathBuf::from("/videos/2024/05/alley-20240531-20:00_07:59.mp4")
    );
}

#[test]
fn test_night_plan_crosses_leap_day() {
    let dir = tempfile::tempdir().unwrap();
    touch_all(dir.path(), &["alley-20240229-213000_000.jpg"]);
    let plan = plan_video(
        "alley",
        date(2024, 3, 1),
        VideoWindow::Night,
        dir.path(),
        Path::new("/videos"),
    )
    .unwrap();
    assert_eq!(plan.frame_count(), 1);
    assert_eq!(plan.globs(), vec![dir.path().join("alley-20240229-2*.jpg")]);
}

#[test]
fn test_empty_directory_yields_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let plan = plan_video(
        "alley",
        date(2024, 6, 1),
        VideoWindow::Day,
        dir.path(),
        Path::new("/videos"),
    )
    .unwrap();
    assert_eq!(plan.frame_count(), 0);
    assert!(plan.globs().is_empty());
}

#[test]
fn test_missing_directory_is_error() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("nope");
    assert!(plan_video(
        "alley",
        date(2024, 6, 1),
        VideoWindow::Day,
        &missing,
        Path::new("/videos")
    )
    .is_err());
}

#[test]
fn test_assembler_refuses_empty_input() {
    let assembler = VideoAssembler::new("ffmpeg");
    assert!(assembler.assemble(&[], Path::new("/tmp/out.mp4")).is_err());
}

#[test]
fn test_ffmpeg_argv_is_not_shell_quoted() {
    let args = assemble_args(
        &[PathBuf::from("/img/alley-20240601-0[89]*.jpg")],
        Path::new("/videos/out file.mp4"),
    );
    assert!(args.iter().any(|a| a == "/img/alley-20240601-0[89]*.jpg"));
    assert_eq!(args.last().unwrap(), "/videos/out file.mp4");
}
