use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::consts::{
    DEFAULT_MAX_DELTA_SECS, DEFAULT_PERIOD_SECS, DEFAULT_WINDOW_SIZE, MAE_BASELINE_CAP,
    MAE_THRESHOLD_PCT, MAX_INTERVAL_SECS, RMSE_BASELINE_CAP, RMSE_THRESHOLD_PCT,
};
use crate::error::{CamwatchError, Result};

/// Full application configuration, loaded once at startup.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub site: SiteConfig,
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub capture: CaptureSettings,
    #[serde(default)]
    pub tools: ToolsConfig,
    #[serde(default)]
    pub cameras: BTreeMap<String, CameraConfig>,
}

impl AppConfig {
    /// Look up a camera by name.
    pub fn camera(&self, name: &str) -> Result<&CameraConfig> {
        self.cameras
            .get(name)
            .ok_or_else(|| CamwatchError::UnknownCamera {
                name: name.to_string(),
                known: self.cameras.keys().cloned().collect(),
            })
    }
}

/// Observer location used for sunrise/sunset.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct SiteConfig {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Root for promoted images (`<root>/images/<camera>`).
    pub root: PathBuf,
    /// Root for unpromoted candidates (`<work_root>/<camera>`).
    pub work_root: PathBuf,
    pub pid_dir: PathBuf,
    /// Defaults to `<root>/logs`.
    pub log_dir: Option<PathBuf>,
    /// Defaults to `<root>`.
    pub video_root: Option<PathBuf>,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("/data/security-cam"),
            work_root: PathBuf::from("/tmp/security-cam/images"),
            pid_dir: PathBuf::from("/var/run"),
            log_dir: None,
            video_root: None,
        }
    }
}

impl PathsConfig {
    pub fn save_dir(&self, camera: &str) -> PathBuf {
        self.root.join("images").join(camera)
    }

    pub fn work_dir(&self, camera: &str) -> PathBuf {
        self.work_root.join(camera)
    }

    pub fn pid_file(&self, camera: &str) -> PathBuf {
        self.pid_dir.join(format!("camwatch-{camera}.pid"))
    }

    pub fn log_file(&self, camera: &str) -> PathBuf {
        self.log_dir
            .clone()
            .unwrap_or_else(|| self.root.join("logs"))
            .join(format!("camwatch-{camera}.log"))
    }

    pub fn video_root(&self) -> PathBuf {
        self.video_root.clone().unwrap_or_else(|| self.root.clone())
    }
}

/// Distance metric computed between consecutive frames.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MetricKind {
    Mae,
    #[default]
    Rmse,
}

impl MetricKind {
    /// Name understood by `gm compare -metric`.
    pub fn gm_name(&self) -> &'static str {
        match self {
            Self::Mae => "MAE",
            Self::Rmse => "RMSE",
        }
    }

    /// Baseline cap and save threshold tuned for this metric.
    pub fn profile(&self) -> (f64, f64) {
        match self {
            Self::Mae => (MAE_BASELINE_CAP, MAE_THRESHOLD_PCT),
            Self::Rmse => (RMSE_BASELINE_CAP, RMSE_THRESHOLD_PCT),
        }
    }
}

impl std::fmt::Display for MetricKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Mae => write!(f, "mae"),
            Self::Rmse => write!(f, "rmse"),
        }
    }
}

/// `[capture]` section as written by the operator. Unset tuning values fall
/// back to the metric's profile.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureSettings {
    pub period_secs: f64,
    pub max_delta_secs: f64,
    pub metric: MetricKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub window_size: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub baseline_cap: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub threshold_pct: Option<f64>,
}

impl Default for CaptureSettings {
    fn default() -> Self {
        Self {
            period_secs: DEFAULT_PERIOD_SECS,
            max_delta_secs: DEFAULT_MAX_DELTA_SECS,
            metric: MetricKind::default(),
            window_size: None,
            baseline_cap: None,
            threshold_pct: None,
        }
    }
}

impl CaptureSettings {
    /// Fill in the metric profile and validate.
    pub fn resolve(&self) -> Result<CaptureConfig> {
        let (cap, threshold) = self.metric.profile();
        let config = CaptureConfig {
            period: self.period_secs,
            max_delta: self.max_delta_secs,
            metric: self.metric,
            window_size: self.window_size.unwrap_or(DEFAULT_WINDOW_SIZE),
            baseline_cap: self.baseline_cap.unwrap_or(cap),
            threshold_pct: self.threshold_pct.unwrap_or(threshold),
        };
        config.validate()?;
        Ok(config)
    }
}

/// Immutable capture parameters.
#[derive(Clone, Debug, PartialEq)]
pub struct CaptureConfig {
    /// Seconds between capture attempts.
    pub period: f64,
    /// Seconds without a retained frame before one is forced.
    pub max_delta: f64,
    pub metric: MetricKind,
    pub window_size: usize,
    /// Ceiling applied to samples before they enter the baseline.
    pub baseline_cap: f64,
    /// Relative excess over the baseline that counts as change.
    pub threshold_pct: f64,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        let (baseline_cap, threshold_pct) = MetricKind::Rmse.profile();
        Self {
            period: DEFAULT_PERIOD_SECS,
            max_delta: DEFAULT_MAX_DELTA_SECS,
            metric: MetricKind::Rmse,
            window_size: DEFAULT_WINDOW_SIZE,
            baseline_cap,
            threshold_pct,
        }
    }
}

impl CaptureConfig {
    pub fn validate(&self) -> Result<()> {
        let invalid = |msg: String| Err(CamwatchError::InvalidConfig(msg));
        if !(self.period > 0.0 && self.period <= MAX_INTERVAL_SECS) {
            return invalid(format!(
                "period must be in (0, {MAX_INTERVAL_SECS}], got {}",
                self.period
            ));
        }
        if !(self.max_delta >= 0.0 && self.max_delta <= MAX_INTERVAL_SECS) {
            return invalid(format!(
                "max_delta must be in [0, {MAX_INTERVAL_SECS}], got {}",
                self.max_delta
            ));
        }
        if self.window_size == 0 {
            return invalid("window_size must be at least 1".to_string());
        }
        if !(self.baseline_cap.is_finite() && self.baseline_cap > 0.0) {
            return invalid(format!(
                "baseline_cap must be > 0, got {}",
                self.baseline_cap
            ));
        }
        if !(self.threshold_pct.is_finite() && self.threshold_pct >= 0.0) {
            return invalid(format!(
                "threshold_pct must be >= 0, got {}",
                self.threshold_pct
            ));
        }
        Ok(())
    }

    pub fn period_duration(&self) -> Duration {
        Duration::from_secs_f64(self.period)
    }
}

/// Which implementation computes frame distances.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DistanceBackend {
    #[default]
    GraphicsMagick,
    Builtin,
}

impl std::fmt::Display for DistanceBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::GraphicsMagick => write!(f, "GraphicsMagick"),
            Self::Builtin => write!(f, "Builtin"),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolsConfig {
    pub gm: PathBuf,
    pub ffmpeg: PathBuf,
    pub font: PathBuf,
    pub distance: DistanceBackend,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            gm: PathBuf::from("gm"),
            ffmpeg: PathBuf::from("ffmpeg"),
            font: PathBuf::from("/usr/share/fonts/truetype/freefont/FreeMono.ttf"),
            distance: DistanceBackend::default(),
        }
    }
}

/// One network camera.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CameraConfig {
    /// Base URL, e.g. `http://alley-cam.local`.
    pub url: String,
    #[serde(default)]
    pub user: String,
    #[serde(default)]
    pub password: String,
}
