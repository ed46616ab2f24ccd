use chrono::{DateTime, Local};
use tracing::{error, warn};

use crate::camera::FrameSource;
use crate::sun::SunTimes;

/// Illumination mode the camera has confirmed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DeviceMode {
    /// IR illuminator off.
    Day,
    /// IR illuminator on.
    Night,
    /// No command has been acknowledged yet.
    #[default]
    Unknown,
}

impl DeviceMode {
    /// Mode the camera should be in at `now`.
    pub fn desired(now: DateTime<Local>, sun: &SunTimes) -> Self {
        if sun.is_daytime(now) {
            Self::Day
        } else {
            Self::Night
        }
    }

    pub fn illumination(&self) -> Option<Illumination> {
        match self {
            Self::Day => Some(Illumination::Off),
            Self::Night => Some(Illumination::On),
            Self::Unknown => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Day => "day",
            Self::Night => "night",
            Self::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for DeviceMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for DeviceMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "day" => Ok(Self::Day),
            "night" => Ok(Self::Night),
            "unknown" => Ok(Self::Unknown),
            other => Err(format!("unknown device mode: {other}")),
        }
    }
}

/// IR illuminator command.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Illumination {
    On,
    Off,
}

impl std::fmt::Display for Illumination {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::On => write!(f, "on"),
            Self::Off => write!(f, "off"),
        }
    }
}

/// Result of one controller tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ControlOutcome {
    /// Already in the desired mode; no command sent.
    Steady,
    /// Command acknowledged; the camera is now in this mode.
    Switched(DeviceMode),
    /// Command for this mode failed; it is retried next tick.
    Failed(DeviceMode),
}

impl ControlOutcome {
    /// Frames are only captured once the illumination is confirmed.
    pub fn capture_allowed(&self) -> bool {
        !matches!(self, Self::Failed(_))
    }
}

/// Drives the IR illuminator from sunrise/sunset.
///
/// A command is sent only when the desired mode differs from the last
/// acknowledged one, so the camera never sees two identical commands in a row
/// unless the first failed.
#[derive(Clone, Debug, Default)]
pub struct DayNightController {
    mode: DeviceMode,
}

impl DayNightController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> DeviceMode {
        self.mode
    }

    pub fn tick<S>(&mut self, now: DateTime<Local>, sun: &SunTimes, camera: &mut S) -> ControlOutcome
    where
        S: FrameSource + ?Sized,
    {
        let desired = DeviceMode::desired(now, sun);
        if desired == self.mode {
            return ControlOutcome::Steady;
        }
        let Some(illumination) = desired.illumination() else {
            return ControlOutcome::Steady;
        };

        match camera.set_illumination(illumination) {
            Ok(()) => {
                warn!(mode = %desired, "IR {illumination}");
                self.mode = desired;
                ControlOutcome::Switched(desired)
            }
            Err(e) => {
                error!(mode = %desired, "IR control {illumination} failed: {e}");
                ControlOutcome::Failed(desired)
            }
        }
    }
}
