mod commands;
mod settings;
mod summary;

use std::path::PathBuf;

use anyhow::Result;
use camwatch_core::logsink::LogSink;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "camwatch", about = "Network camera change-capture daemon")]
#[command(version)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Configuration file (TOML)
    #[arg(short, long, global = true, default_value = settings::DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Poll a camera and keep frames that show change
    Capture(commands::capture::CaptureArgs),
    /// Show whether a capture daemon is running for a camera
    Status(commands::status::StatusArgs),
    /// Stop the capture daemon for a camera
    Stop(commands::stop::StopArgs),
    /// Assemble saved frames into a daytime or nighttime video
    Video(commands::video::VideoArgs),
    /// Print or save a default configuration file
    Config(commands::config::ConfigArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    let daemon = matches!(&cli.command, Commands::Capture(args) if args.daemon);
    let sink = LogSink::stderr();
    let writer = sink.clone();
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(!daemon)
        .with_writer(move || writer.clone())
        .init();

    match &cli.command {
        Commands::Capture(args) => commands::capture::run(args, &cli.config, sink),
        Commands::Status(args) => commands::status::run(args, &cli.config),
        Commands::Stop(args) => commands::stop::run(args, &cli.config),
        Commands::Video(args) => commands::video::run(args, &cli.config),
        Commands::Config(args) => commands::config::run(args),
    }
}
