//! shoegaze - live guitar effect with a terminal front end
//!
//! Run with: cargo run --release -- --preset "Heaven Delay"

mod app;
mod ui;

use std::{fs::File, path::PathBuf, sync::Mutex};

use clap::Parser;
use color_eyre::eyre::{Result as EyreResult, WrapErr};
use tracing_subscriber::EnvFilter;

use app::App;
use shoegaze_fx::{
    config::Settings,
    session::{cpal_backend::list_devices, CpalBackend},
    EffectSession, PresetTable, SessionConfig,
};

#[derive(Parser)]
#[command(name = "shoegaze")]
#[command(about = "Gated delay, fuzz and reverb for a live input", long_about = None)]
struct Cli {
    /// Input device name (default device when omitted)
    #[arg(short, long)]
    input: Option<String>,

    /// Output device name (default device when omitted)
    #[arg(short, long)]
    output: Option<String>,

    /// TOML settings file with [gate], [visual] and [[preset]] tables
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Preset to load once the session is running
    #[arg(short, long)]
    preset: Option<String>,

    /// Run without the visualizer
    #[arg(long)]
    no_visualizer: bool,

    /// Write logs here (RUST_LOG sets the filter)
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Print the available audio devices and exit
    #[arg(long)]
    list_devices: bool,
}

fn main() -> EyreResult<()> {
    color_eyre::install()?;
    let cli = Cli::parse();

    init_logging(cli.log_file.as_ref())?;

    if cli.list_devices {
        let devices = list_devices().wrap_err("failed to enumerate audio devices")?;
        println!("Inputs:");
        for name in &devices.inputs {
            println!("  {name}");
        }
        println!("Outputs:");
        for name in &devices.outputs {
            println!("  {name}");
        }
        return Ok(());
    }

    let (mut config, presets) = match &cli.config {
        Some(path) => {
            let settings = Settings::from_path(path)
                .wrap_err_with(|| format!("failed to load {}", path.display()))?;
            let presets = if settings.presets.is_empty() {
                PresetTable::builtin()
            } else {
                PresetTable::new(settings.presets.clone())
            };
            (settings.session_config(), presets)
        }
        None => (SessionConfig::new(), PresetTable::builtin()),
    };
    if let Some(name) = cli.input {
        config = config.input_device(name);
    }
    if let Some(name) = cli.output {
        config = config.output_device(name);
    }
    if cli.no_visualizer {
        config = config.headless();
    }

    let mut session = EffectSession::new(CpalBackend::new(), config).with_presets(presets);
    session.start().wrap_err("failed to start audio")?;
    if let Some(name) = &cli.preset {
        session
            .load_preset(name)
            .wrap_err_with(|| format!("failed to load preset `{name}`"))?;
    }

    let terminal = ratatui::init();
    let res = App::new(session).run(terminal);
    ratatui::restore();
    res
}

/// Logs never go to the terminal, which belongs to the UI.
fn init_logging(path: Option<&PathBuf>) -> EyreResult<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false);

    match path {
        Some(path) => {
            let file = File::create(path)
                .wrap_err_with(|| format!("failed to create log file {}", path.display()))?;
            builder.with_writer(Mutex::new(file)).init();
        }
        None => builder.with_writer(std::io::sink).init(),
    }
    Ok(())
}
