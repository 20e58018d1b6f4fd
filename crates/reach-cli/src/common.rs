//! Common CLI types and utilities shared across commands.

use anyhow::{Context, Result};
use clap::ValueEnum;
use reach_core::NetworkSnapshot;
use serde::{Deserialize, Serialize};
use std::io::{self, Write};
use std::path::Path;

/// Output format for reports.
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable table (default for interactive use)
    #[default]
    Table,
    /// Pretty-printed JSON (pipe-friendly, structured)
    Json,
}

/// Read a snapshot, choosing the parser from the file extension. Files that
/// are neither `.json` nor `.toml` are read as TOML.
pub fn load_snapshot(path: &Path) -> Result<NetworkSnapshot> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("reading snapshot {}", path.display()))?;
    let is_json = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    let snapshot = if is_json {
        NetworkSnapshot::from_json_str(&contents)
    } else {
        NetworkSnapshot::from_toml_str(&contents)
    };
    snapshot.with_context(|| format!("parsing snapshot {}", path.display()))
}

/// Pretty-print `value` as JSON on stdout.
pub fn write_json<T: Serialize>(value: &T) -> Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    serde_json::to_writer_pretty(&mut handle, value).context("serializing report")?;
    writeln!(handle)?;
    Ok(())
}
