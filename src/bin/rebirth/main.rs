//! rebirth - terminal control surface for the two-voice rack
//!
//! Run with: cargo run -- --bpm 132 --log-file rebirth.log

mod app;
mod ui;

use std::{fs::File, path::PathBuf};

use clap::Parser;
use color_eyre::eyre::{Result as EyreResult, WrapErr};
use rebirth_rack::{config::RackConfig, engine::SoftEngine, Rack};

use app::App;

#[derive(Debug, Parser)]
#[command(name = "rebirth", version, about = "Bass + kick step rack in the terminal")]
struct Args {
    /// Starting tempo (clamped to 40..=240)
    #[arg(long, default_value_t = 128.0)]
    bpm: f64,

    /// Steps per pattern
    #[arg(long, default_value_t = 16)]
    steps: usize,

    /// Write logs to this file (the terminal belongs to the UI)
    #[arg(long)]
    log_file: Option<PathBuf>,
}

fn init_logging(path: Option<&PathBuf>) -> EyreResult<()> {
    let Some(path) = path else {
        return Ok(());
    };
    let file = File::create(path)
        .wrap_err_with(|| format!("failed to create log file {}", path.display()))?;
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug"))
        .target(env_logger::Target::Pipe(Box::new(file)))
        .init();
    Ok(())
}

fn main() -> EyreResult<()> {
    color_eyre::install()?;
    let args = Args::parse();
    init_logging(args.log_file.as_ref())?;

    let config = RackConfig::new().bpm(args.bpm).steps(args.steps);
    let mut engine = SoftEngine::new();
    let rack = Rack::new(config, &mut engine).wrap_err("failed to assemble the rack")?;

    let mut terminal = ratatui::init();
    let result = App::new(rack, engine).run(&mut terminal);
    ratatui::restore();
    result
}
