use std::io::{self, Write};
use std::path::Path;

use anyhow::{Context, Result};
use reach_algo::{run_snapshot, ProtectionReport, ZoneEntry};
use reach_cli::common::{load_snapshot, write_json, OutputFormat};
use reach_cli::config::ReachConfig;
use reach_core::{ArcAngle, NetworkSnapshot, ProtectionSettings};
use tabwriter::TabWriter;
use tracing::info;

pub fn handle(
    snapshot_path: &Path,
    zone1_percent: Option<i64>,
    arc_angle: Option<ArcAngle>,
    format: OutputFormat,
    config: &ReachConfig,
) -> Result<()> {
    info!("Computing zone reaches for {}", snapshot_path.display());
    let snapshot = load_snapshot(snapshot_path)?;
    let settings = resolve_settings(config, &snapshot, zone1_percent, arc_angle)?;
    let report = run_snapshot(&snapshot, &settings)
        .with_context(|| format!("computing reaches for {}", snapshot_path.display()))?;
    match format {
        OutputFormat::Json => write_json(&report),
        OutputFormat::Table => write_table(io::stdout(), &report),
    }
}

/// Command line over snapshot over user config over built-in defaults.
fn resolve_settings(
    config: &ReachConfig,
    snapshot: &NetworkSnapshot,
    zone1_percent: Option<i64>,
    arc_angle: Option<ArcAngle>,
) -> Result<ProtectionSettings> {
    let mut settings = config
        .protection_settings()
        .context("invalid [defaults] in config")?;
    settings = snapshot
        .settings
        .apply(settings)
        .context("invalid [settings] in snapshot")?;
    if let Some(percent) = zone1_percent {
        settings = settings.with_zone1_percent(percent)?;
    }
    if let Some(angle) = arc_angle {
        settings = settings.with_arc_angle(angle);
    }
    Ok(settings)
}

fn write_table<W: Write>(out: W, report: &ProtectionReport) -> Result<()> {
    let mut writer = TabWriter::new(out);
    writeln!(
        writer,
        "Protected line {} ({} -> {})",
        report.protected_line, report.near, report.far
    )?;
    writeln!(writer, "  Zline\t{}", report.line_impedance)?;
    writeln!(writer, "  Relay current\t{}", report.relay_current)?;
    if let Some(ratio) = report.instrument_ratio {
        writeln!(writer, "  RTC/RTP\t{ratio:.4}")?;
    }
    writeln!(writer, "  Zone 1 coverage\t{} %", report.settings.zone1_percent())?;
    writeln!(writer, "  Arc angle\t{}", report.settings.arc_angle())?;
    writeln!(writer)?;

    writeln!(writer, "ZONE\tSELECTED\tRAW\tSETTING (ARC-ADJUSTED)\tK\tINFEED-CORRECTED\tOPERATING TIME")?;
    for entry in &report.zones {
        match entry {
            ZoneEntry::Computed(zone) => {
                let k = zone
                    .infeed
                    .as_ref()
                    .map_or_else(|| "-".to_string(), |i| format!("{:.4}", i.infeed_factor));
                let corrected = zone
                    .infeed_corrected()
                    .map_or_else(|| "-".to_string(), |z| z.to_string());
                writeln!(
                    writer,
                    "{}\t{}\t{}\t{}\t{}\t{}\t{}",
                    zone.zone,
                    zone.selected,
                    zone.raw,
                    zone.setting(),
                    k,
                    corrected,
                    zone.operating_time
                )?;
            }
            ZoneEntry::Failed { zone, error } => {
                writeln!(writer, "{zone}\tfailed: {error}\t\t\t\t\t")?;
            }
        }
    }
    writeln!(writer)?;

    writeln!(writer, "ZONE\tCANDIDATE\tREACH\tBRANCH")?;
    for zone in report.zones.iter().filter_map(ZoneEntry::reach) {
        for candidate in &zone.candidates {
            let marker = if candidate.label == zone.selected { "*" } else { " " };
            let branch = candidate
                .branch
                .as_ref()
                .map_or_else(|| "-".to_string(), |b| b.id.to_string());
            writeln!(
                writer,
                "{}\t{}{}\t{}\t{}",
                zone.zone, marker, candidate.label, candidate.reach, branch
            )?;
        }
    }
    writeln!(writer)?;

    writeln!(writer, "ZONE\tMHO CENTRE (R, X)\tRADIUS")?;
    for zone in report.zones.iter().filter_map(ZoneEntry::reach) {
        match &zone.characteristic {
            Some(circle) => writeln!(
                writer,
                "{}\t({:.4}, {:.4})\t{}",
                zone.zone,
                circle.center_r.value(),
                circle.center_x.value(),
                circle.radius
            )?,
            None => writeln!(writer, "{}\t-\tunbounded", zone.zone)?,
        }
    }

    if report.diagnostics.has_issues() {
        writeln!(writer)?;
        writeln!(writer, "Warnings:")?;
        for issue in &report.diagnostics.issues {
            writeln!(writer, "  {issue}")?;
        }
    }
    writer.flush()?;
    Ok(())
}
