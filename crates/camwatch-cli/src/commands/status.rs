use std::path::Path;

use anyhow::Result;
use camwatch_core::supervisor::{PidFile, ProcessControl, SystemProcesses};
use clap::Args;

use crate::settings::load_config;
use crate::summary::{print_status, DaemonState};

#[derive(Args)]
pub struct StatusArgs {
    /// Camera name as listed under [cameras] in the config
    pub camera: String,
}

pub fn run(args: &StatusArgs, config_path: &Path) -> Result<()> {
    let config = load_config(config_path)?;
    config.camera(&args.camera)?;

    let pid_file = PidFile::new(config.paths.pid_file(&args.camera));
    let state = match pid_file.read()? {
        None => DaemonState::NotRunning,
        Some(record) if SystemProcesses.is_alive(record.pid)? => DaemonState::Running(record),
        Some(record) => DaemonState::Stale(record),
    };

    print_status(&args.camera, pid_file.path(), &state);
    Ok(())
}
