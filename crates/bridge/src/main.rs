//! padhapticsd - rFactor 2 to DualSense haptic bridge

#![deny(static_mut_refs)]

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use padhaptics_bridge::{
    Bridge, BridgeConfig, OutputMode, create_sink, default_config_path, log_startup,
};
use padhaptics_telemetry::Rf2SharedMemorySource;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "padhapticsd")]
#[command(about = "Drive DualSense rumble and adaptive triggers from rFactor 2 telemetry")]
#[command(version)]
struct Cli {
    /// Configuration file (JSON, or YAML by extension)
    #[arg(short, long, global = true, env = "PADHAPTICS_CONFIG")]
    config: Option<PathBuf>,

    /// Output sink, overrides the config file
    #[arg(long, value_enum)]
    output: Option<OutputMode>,

    /// Loop rate in Hz, overrides the config file
    #[arg(long)]
    update_hz: Option<u32>,

    /// Verbose logging
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Load and validate the configuration, print it as JSON and exit
    CheckConfig,
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let default_filter = format!(
        "padhapticsd={level},padhaptics_bridge={level},padhaptics_telemetry={level},padhaptics_effects={level}"
    );

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();
}

fn load_config(cli: &Cli) -> Result<BridgeConfig> {
    let path = cli.config.clone().unwrap_or_else(default_config_path);
    let mut config = BridgeConfig::load(&path)?;
    config.apply_overrides(cli.output, cli.update_hz);
    config
        .validate()
        .with_context(|| format!("invalid configuration in {}", path.display()))?;
    Ok(config)
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = load_config(&cli)?;

    if let Some(Command::CheckConfig) = cli.command {
        let json =
            serde_json::to_string_pretty(&config).context("failed to serialize configuration")?;
        println!("{json}");
        return Ok(());
    }

    log_startup(&config);
    let sink = create_sink(&config);
    let mut bridge = Bridge::new(config, Rf2SharedMemorySource::new(), sink);
    bridge.run().await;
    Ok(())
}
