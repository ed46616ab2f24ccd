use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};

use crate::config::{MetricKind, ToolsConfig};
use crate::consts::{OVERLAY_OFFSET, OVERLAY_POINT_SIZE, OVERLAY_TIME_FORMAT};
use crate::error::{CamwatchError, Result};

use super::{run_tool, Annotator, ImageDistance};

/// GraphicsMagick (`gm`) as distance tool and annotator.
#[derive(Clone, Debug)]
pub struct GraphicsMagick {
    binary: PathBuf,
    font: PathBuf,
    metric: MetricKind,
}

impl GraphicsMagick {
    pub fn new(tools: &ToolsConfig, metric: MetricKind) -> Self {
        Self {
            binary: tools.gm.clone(),
            font: tools.font.clone(),
            metric,
        }
    }

    fn tool_name(&self) -> String {
        self.binary.display().to_string()
    }
}

impl ImageDistance for GraphicsMagick {
    fn compare(&self, a: &Path, b: &Path) -> Result<f64> {
        let output = run_tool(
            &self.binary,
            [
                OsStr::new("compare"),
                OsStr::new("-metric"),
                OsStr::new(self.metric.gm_name()),
                a.as_os_str(),
                b.as_os_str(),
            ],
            true,
        )?;
        let stdout = String::from_utf8_lossy(&output.stdout);
        parse_total(&stdout).ok_or_else(|| CamwatchError::MalformedToolOutput {
            tool: self.tool_name(),
            output: stdout.trim().to_string(),
        })
    }
}

impl Annotator for GraphicsMagick {
    fn overlay_timestamp(&self, src: &Path, dest: &Path, at: DateTime<Local>) -> Result<()> {
        let (x, y) = OVERLAY_OFFSET;
        let draw = format!("text {x},{y} '{}'", at.format(OVERLAY_TIME_FORMAT));
        let point_size = OVERLAY_POINT_SIZE.to_string();
        run_tool(
            &self.binary,
            [
                OsStr::new("convert"),
                OsStr::new("-font"),
                self.font.as_os_str(),
                OsStr::new("-pointsize"),
                OsStr::new(&point_size),
                OsStr::new("-fill"),
                OsStr::new("white"),
                OsStr::new("-draw"),
                OsStr::new(&draw),
                src.as_os_str(),
                dest.as_os_str(),
            ],
            true,
        )?;
        Ok(())
    }
}

/// Extract the normalized `Total:` distance from `gm compare` output.
pub fn parse_total(stdout: &str) -> Option<f64> {
    stdout.lines().find_map(|line| {
        let rest = line.trim_start().strip_prefix("Total:")?;
        let value: f64 = rest.split_whitespace().next()?.parse().ok()?;
        (value.is_finite() && value >= 0.0).then_some(value)
    })
}
