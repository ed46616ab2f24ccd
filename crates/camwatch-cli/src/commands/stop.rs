use std::path::Path;

use anyhow::Result;
use camwatch_core::supervisor::{
    displace_previous, HandoverOutcome, HandoverPolicy, PidFile, SystemProcesses,
};
use clap::Args;

use crate::settings::load_config;

#[derive(Args)]
pub struct StopArgs {
    /// Camera name as listed under [cameras] in the config
    pub camera: String,
}

pub fn run(args: &StopArgs, config_path: &Path) -> Result<()> {
    let config = load_config(config_path)?;
    config.camera(&args.camera)?;

    let pid_file = PidFile::new(config.paths.pid_file(&args.camera));
    let outcome = displace_previous(
        &pid_file,
        &SystemProcesses,
        &HandoverPolicy::default(),
        &std::thread::sleep,
    )?;

    let stopped_pid = match outcome {
        HandoverOutcome::NoPrevious => {
            println!("No running instance for {}", args.camera);
            return Ok(());
        }
        HandoverOutcome::AlreadyStopped { pid } => {
            println!("Process {pid} was not running");
            pid
        }
        HandoverOutcome::Stopped { pid, polls } => {
            println!("Stopped {pid} after {polls} poll(s)");
            pid
        }
    };

    // A graceful exit removes the file itself; a killed or vanished one does not.
    if let Some(record) = pid_file.read()? {
        if record.pid == stopped_pid {
            pid_file.remove()?;
        }
    }
    Ok(())
}
