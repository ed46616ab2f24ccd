use std::time::Duration;

/// Default capture period in seconds.
pub const DEFAULT_PERIOD_SECS: f64 = 0.5;

/// Default maximum gap (seconds) between retained frames during a static scene.
pub const DEFAULT_MAX_DELTA_SECS: f64 = 120.0;

/// Upper bound (seconds) accepted for the capture period and max delta.
pub const MAX_INTERVAL_SECS: f64 = 86_400.0;

/// Default number of samples in the rolling baseline window.
pub const DEFAULT_WINDOW_SIZE: usize = 600;

/// Baseline cap for MAE (1.7%).
pub const MAE_BASELINE_CAP: f64 = 0.017;

/// Relative excess over the MAE baseline that triggers a save (8%).
pub const MAE_THRESHOLD_PCT: f64 = 0.08;

/// Baseline cap for RMSE (2.5%).
pub const RMSE_BASELINE_CAP: f64 = 0.025;

/// Relative excess over the RMSE baseline that triggers a save (15%).
pub const RMSE_THRESHOLD_PCT: f64 = 0.15;

/// Consecutive fetch failures tolerated as warnings before cooling down.
pub const FETCH_FAILURE_WARN_LIMIT: u32 = 5;

/// Pause after a fetch failure once the warning limit is exceeded.
pub const FETCH_FAILURE_COOLDOWN: Duration = Duration::from_secs(60);

/// Longest single sleep slice; bounds how long a quit request goes unnoticed.
pub const SLEEP_SLICE: Duration = Duration::from_millis(250);

/// Interval between liveness probes while waiting for a prior instance.
pub const HANDOVER_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Polls after which the graceful signal is replaced by SIGKILL.
pub const HANDOVER_KILL_AFTER_POLLS: u32 = 120;

/// The stop signal is re-sent every this many polls.
pub const HANDOVER_RESEND_EVERY_POLLS: u32 = 30;

/// Polls after which the handover is abandoned.
pub const HANDOVER_GIVE_UP_POLLS: u32 = 150;

/// HTTP request timeout for snapshot and control requests.
pub const HTTP_TIMEOUT: Duration = Duration::from_secs(10);

/// Upper bound on a single snapshot body.
pub const MAX_SNAPSHOT_BYTES: u64 = 16 * 1024 * 1024;

/// Camera CGI endpoints.
pub const SNAPSHOT_PATH: &str = "/snapshot.cgi";
pub const DECODER_CONTROL_PATH: &str = "/decoder_control.cgi";

/// Decoder control command codes for the IR illuminator.
pub const IR_ON_COMMAND: &str = "95";
pub const IR_OFF_COMMAND: &str = "94";

/// Timestamp embedded in frame file names.
pub const FRAME_NAME_TIME_FORMAT: &str = "%Y%m%d-%H%M%S_%3f";

/// Timestamp burned into promoted frames.
pub const OVERLAY_TIME_FORMAT: &str = "%Y/%m/%d %H:%M:%S%.3f";

/// Overlay text size and position.
pub const OVERLAY_POINT_SIZE: u32 = 16;
pub const OVERLAY_OFFSET: (u32, u32) = (10, 10);

/// Minimum sample count (pixels x channels) for parallel distance reduction.
pub const PARALLEL_SAMPLE_THRESHOLD: usize = 65_536;

/// Frame rate of assembled videos.
pub const VIDEO_FRAMERATE: u32 = 5;
