use clap::Parser;
use reach_cli::cli::{Cli, Commands};
use reach_cli::config::{load_config, ReachConfig};
use tracing::{error, warn};
use tracing_subscriber::FmtSubscriber;

mod commands;

fn main() {
    let cli = Cli::parse();
    let config = load_config();

    // CLI flag, then config file, then "info"
    let config_level = config.as_ref().ok().map(ReachConfig::log_level);
    let level = match (cli.log_level, &config_level) {
        (Some(level), _) => level,
        (None, Some(Ok(level))) => *level,
        _ => tracing::Level::INFO,
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .finish();
    if let Err(err) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("setting default subscriber failed: {err}");
    }

    let config = match config {
        Ok(config) => config,
        Err(err) => {
            error!("{err:#}");
            std::process::exit(2);
        }
    };
    if let Some(Err(err)) = config_level {
        warn!("{err}; using {level}");
    }

    let result = match &cli.command {
        Commands::Zones {
            snapshot,
            zone1_percent,
            arc_angle,
            format,
        } => commands::zones::handle(
            snapshot,
            *zone1_percent,
            *arc_angle,
            format.unwrap_or(config.output.format),
            &config,
        ),
        Commands::Validate { snapshot, format } => {
            commands::validate::handle(snapshot, format.unwrap_or(config.output.format))
        }
        Commands::Completions { shell, out } => {
            commands::completions::handle(*shell, out.as_deref())
        }
    };

    if let Err(err) = result {
        error!("{err:#}");
        std::process::exit(1);
    }
}
