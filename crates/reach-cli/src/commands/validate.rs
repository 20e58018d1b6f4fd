use std::io::{self, Write};
use std::path::Path;

use anyhow::{bail, Result};
use reach_cli::common::{load_snapshot, write_json, OutputFormat};
use reach_core::{graph_stats, GraphStats, TopologyReport, TopologyStatus};
use serde::Serialize;
use tabwriter::TabWriter;
use tracing::info;

#[derive(Serialize)]
struct ValidationOutput<'a> {
    #[serde(flatten)]
    topology: &'a TopologyReport,
    #[serde(skip_serializing_if = "Option::is_none")]
    stats: Option<GraphStats>,
}

/// Prints the validation result, then fails if the topology is fatal.
pub fn handle(snapshot_path: &Path, format: OutputFormat) -> Result<()> {
    info!("Validating topology of {}", snapshot_path.display());
    let snapshot = load_snapshot(snapshot_path)?;
    let report = snapshot.validate()?;
    let stats = if report.is_ready() {
        Some(graph_stats(&snapshot.build_network()?))
    } else {
        None
    };

    let output = ValidationOutput {
        topology: &report,
        stats,
    };
    match format {
        OutputFormat::Json => write_json(&output)?,
        OutputFormat::Table => write_table(io::stdout(), &output)?,
    }

    if let TopologyStatus::Aborted { reason } = &report.status {
        bail!("topology check failed: {reason}");
    }
    Ok(())
}

fn write_table<W: Write>(out: W, output: &ValidationOutput<'_>) -> Result<()> {
    let report = output.topology;
    let mut writer = TabWriter::new(out);
    match &report.status {
        TopologyStatus::Ready => writeln!(writer, "Status\tready")?,
        TopologyStatus::Aborted { reason } => writeln!(writer, "Status\taborted: {reason}")?,
    }
    if report.conflicts.is_empty() {
        writeln!(writer, "Conflicting pairs\tnone")?;
    } else {
        let pairs: Vec<String> = report.conflicts.iter().map(ToString::to_string).collect();
        writeln!(writer, "Conflicting pairs\t{}", pairs.join(", "))?;
    }
    if let Some(stats) = &output.stats {
        writeln!(writer, "Nodes\t{}", stats.node_count)?;
        writeln!(
            writer,
            "Lines / transformers\t{} / {}",
            stats.line_count, stats.transformer_count
        )?;
        writeln!(writer, "Components\t{}", stats.connected_components)?;
        writeln!(
            writer,
            "Degree [min/avg/max]\t{}/{:.2}/{}",
            stats.min_degree, stats.avg_degree, stats.max_degree
        )?;
        writeln!(writer, "Density\t{:.4}", stats.density)?;
    }
    if report.diagnostics.has_issues() {
        writeln!(writer, "Diagnostics\t{}", report.diagnostics.summary())?;
        for issue in &report.diagnostics.issues {
            writeln!(writer, "  {issue}")?;
        }
    }
    writer.flush()?;
    Ok(())
}
