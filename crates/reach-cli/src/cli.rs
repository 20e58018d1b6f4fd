use crate::common::OutputFormat;
use clap::{CommandFactory, Parser, Subcommand, ValueHint};
use clap_complete::Shell;
use reach_core::ArcAngle;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "reach", author, version, about = "Distance-protection zone reach settings", long_about = None)]
pub struct Cli {
    /// Set the logging level (overrides `[logging] level` in the config file)
    #[arg(long, global = true)]
    pub log_level: Option<tracing::Level>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Compute Zone 1-4 reach settings for the protected line of a snapshot
    Zones {
        /// Network snapshot (.toml or .json)
        #[arg(value_hint = ValueHint::FilePath)]
        snapshot: PathBuf,
        /// Zone 1 coverage of the protected line, in percent (0-100)
        #[arg(long)]
        zone1_percent: Option<i64>,
        /// Arc-resistance operating angle in degrees (45, 60 or 75)
        #[arg(long)]
        arc_angle: Option<ArcAngle>,
        /// Output format (defaults to `[output] format` in the config file)
        #[arg(long, value_enum)]
        format: Option<OutputFormat>,
    },
    /// Check a snapshot's topology without computing zones
    Validate {
        /// Network snapshot (.toml or .json)
        #[arg(value_hint = ValueHint::FilePath)]
        snapshot: PathBuf,
        /// Output format (defaults to `[output] format` in the config file)
        #[arg(long, value_enum)]
        format: Option<OutputFormat>,
    },
    /// Generate shell completion scripts
    Completions {
        /// Shell type
        #[arg(value_enum)]
        shell: Shell,
        /// Write output to a file instead of stdout
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
}

pub fn build_cli_command() -> clap::Command {
    Cli::command()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_cli() {
        build_cli_command().debug_assert();
    }

    #[test]
    fn parses_zone_overrides() {
        let cli = Cli::try_parse_from([
            "reach",
            "zones",
            "net.toml",
            "--zone1-percent",
            "80",
            "--arc-angle",
            "75",
            "--format",
            "json",
        ])
        .unwrap();
        match cli.command {
            Commands::Zones {
                zone1_percent,
                arc_angle,
                format,
                ..
            } => {
                assert_eq!(zone1_percent, Some(80));
                assert_eq!(arc_angle, Some(ArcAngle::Deg75));
                assert_eq!(format, Some(OutputFormat::Json));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn rejects_unsupported_arc_angle() {
        assert!(Cli::try_parse_from(["reach", "zones", "net.toml", "--arc-angle", "30"]).is_err());
    }
}
