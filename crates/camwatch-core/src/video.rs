use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};

use chrono::{Days, NaiveDate};

use crate::error::Result;

/// Portion of the day a video covers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VideoWindow {
    /// 08:00-19:59 of the given date.
    Day,
    /// 20:00-23:59 of the previous date, then 00:00-07:59 of the given date.
    Night,
}

impl VideoWindow {
    fn label(&self) -> &'static str {
        match self {
            Self::Day => "08:00_19:59",
            Self::Night => "20:00_07:59",
        }
    }
}

impl std::fmt::Display for VideoWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Day => write!(f, "Daytime"),
            Self::Night => write!(f, "Nighttime"),
        }
    }
}

/// Saved frames of one date within an hour range, addressed by a glob.
#[derive(Clone, Debug)]
pub struct FrameGroup {
    pub date: NaiveDate,
    pub hours: RangeInclusive<u32>,
    pub glob: PathBuf,
    pub frames: usize,
}

#[derive(Clone, Debug)]
pub struct VideoPlan {
    pub groups: Vec<FrameGroup>,
    pub output: PathBuf,
}

impl VideoPlan {
    /// Globs of the non-empty groups, in playback order.
    pub fn globs(&self) -> Vec<PathBuf> {
        self.groups
            .iter()
            .filter(|g| g.frames > 0)
            .map(|g| g.glob.clone())
            .collect()
    }

    pub fn frame_count(&self) -> usize {
        self.groups.iter().map(|g| g.frames).sum()
    }
}

/// Work out which saved frames make up a video and where it goes.
pub fn plan_video(
    camera: &str,
    date: NaiveDate,
    window: VideoWindow,
    image_dir: &Path,
    video_root: &Path,
) -> Result<VideoPlan> {
    // Hour ranges must line up exactly with the glob suffixes.
    let (start_date, specs): (NaiveDate, Vec<(NaiveDate, &str, RangeInclusive<u32>)>) =
        match window {
            VideoWindow::Day => (date, vec![(date, "0[89]", 8..=9), (date, "1", 10..=19)]),
            VideoWindow::Night => {
                let prev = date.checked_sub_days(Days::new(1)).unwrap_or(date);
                (prev, vec![(prev, "2", 20..=23), (date, "0[0-7]", 0..=7)])
            }
        };

    let names: Vec<String> = std::fs::read_dir(image_dir)?
        .filter_map(|entry| entry.ok())
        .filter_map(|entry| entry.file_name().into_string().ok())
        .collect();

    let groups = specs
        .into_iter()
        .map(|(group_date, suffix, hours)| {
            let day = group_date.format("%Y%m%d").to_string();
            let frames = names
                .iter()
                .filter_map(|n| frame_hour(n, camera, &day))
                .filter(|h| hours.contains(h))
                .count();
            FrameGroup {
                date: group_date,
                glob: image_dir.join(format!("{camera}-{day}-{suffix}*.jpg")),
                hours,
                frames,
            }
        })
        .collect();

    let output = video_root
        .join(start_date.format("%Y").to_string())
        .join(start_date.format("%m").to_string())
        .join(format!(
            "{camera}-{}-{}.mp4",
            start_date.format("%Y%m%d"),
            window.label()
        ));

    Ok(VideoPlan { groups, output })
}

/// Hour of a `<camera>-<YYYYmmdd>-<HHMMSS>_<mmm>.jpg` frame taken on `day`.
fn frame_hour(name: &str, camera: &str, day: &str) -> Option<u32> {
    let rest = name
        .strip_prefix(camera)?
        .strip_prefix('-')?
        .strip_prefix(day)?
        .strip_prefix('-')?;
    if !rest.ends_with(".jpg") {
        return None;
    }
    rest.get(..2)?.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_hour_parses_own_camera_only() {
        assert_eq!(
            frame_hour("alley-20240601-081500_123.jpg", "alley", "20240601"),
            Some(8)
        );
        assert_eq!(
            frame_hour("yard-20240601-081500_123.jpg", "alley", "20240601"),
            None
        );
        assert_eq!(
            frame_hour("alley-20240602-081500_123.jpg", "alley", "20240601"),
            None
        );
        assert_eq!(
            frame_hour("alley-20240601-081500_123.png", "alley", "20240601"),
            None
        );
    }
}
