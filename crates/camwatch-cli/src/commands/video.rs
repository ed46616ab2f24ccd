use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use camwatch_core::tools::VideoAssembler;
use camwatch_core::video::{plan_video, VideoWindow};
use chrono::{Local, NaiveDate};
use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};

use crate::settings::load_config;

#[derive(Args)]
pub struct VideoArgs {
    /// Camera name as listed under [cameras] in the config
    pub camera: String,

    /// Daytime video, 08:00-19:59 of the date
    #[arg(long, conflicts_with = "night", required_unless_present = "night")]
    pub day: bool,

    /// Nighttime video, 20:00 of the previous day until 07:59 of the date
    #[arg(long)]
    pub night: bool,

    /// Date (YYYY-MM-DD), defaults to today
    #[arg(long)]
    pub date: Option<NaiveDate>,
}

pub fn run(args: &VideoArgs, config_path: &Path) -> Result<()> {
    let config = load_config(config_path)?;
    config.camera(&args.camera)?;

    let window = if args.night {
        VideoWindow::Night
    } else {
        VideoWindow::Day
    };
    let date = args.date.unwrap_or_else(|| Local::now().date_naive());
    let image_dir = config.paths.save_dir(&args.camera);

    let plan = plan_video(
        &args.camera,
        date,
        window,
        &image_dir,
        &config.paths.video_root(),
    )
    .with_context(|| format!("Failed to list frames in {}", image_dir.display()))?;

    for group in &plan.groups {
        println!(
            "  {} {:02}-{:02}h: {} frame(s)",
            group.date,
            group.hours.start(),
            group.hours.end(),
            group.frames
        );
    }
    if plan.frame_count() == 0 {
        println!("No frames for {window} video of {date}, nothing to do");
        return Ok(());
    }

    if let Some(parent) = plan.output.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }

    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner} {msg} [{elapsed}]")?);
    pb.set_message(format!("Encoding {} frames", plan.frame_count()));
    pb.enable_steady_tick(Duration::from_millis(120));

    let result = VideoAssembler::new(&config.tools.ffmpeg).assemble(&plan.globs(), &plan.output);
    pb.finish_and_clear();
    result?;

    println!("{window} video saved to {}", plan.output.display());
    Ok(())
}
