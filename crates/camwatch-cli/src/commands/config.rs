use std::path::PathBuf;

use anyhow::{Context, Result};
use camwatch_core::config::{AppConfig, CameraConfig};
use clap::Args;

#[derive(Args)]
pub struct ConfigArgs {
    /// Write config to a file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Print or save a default AppConfig with one example camera as TOML.
pub fn run(args: &ConfigArgs) -> Result<()> {
    let toml_str = toml::to_string_pretty(&default_config())?;

    if let Some(ref path) = args.output {
        std::fs::write(path, &toml_str)
            .with_context(|| format!("Failed to write config to {}", path.display()))?;
        println!("Default config saved to {}", path.display());
    } else {
        print!("{}", toml_str);
    }

    Ok(())
}

fn default_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.cameras.insert(
        "alley".to_string(),
        CameraConfig {
            url: "http://alley-cam.local".to_string(),
            user: "admin".to_string(),
            password: String::new(),
        },
    );
    config
}
