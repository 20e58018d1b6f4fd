use std::{fs, io::Write, path::Path};

use anyhow::{Context, Result};
use clap_complete::{generate, Shell};
use tracing::info;

use reach_cli::cli::build_cli_command;

/// Print the completion script for `shell`, or write it to `out`.
pub fn handle(shell: Shell, out: Option<&Path>) -> Result<()> {
    match out {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)
                    .with_context(|| format!("creating {}", parent.display()))?;
            }
            let mut file = fs::File::create(path)
                .with_context(|| format!("creating {}", path.display()))?;
            write_script(shell, &mut file)?;
            info!(?shell, path = %path.display(), "completion script written");
            println!("Wrote {shell} completion to {}", path.display());
        }
        None => write_script(shell, &mut std::io::stdout().lock())?,
    }
    Ok(())
}

fn write_script<W: Write>(shell: Shell, writer: &mut W) -> Result<()> {
    let mut cmd = build_cli_command();
    let bin = cmd.get_name().to_string();
    generate(shell, &mut cmd, bin, writer);
    writer.flush().context("flushing completion script")?;
    Ok(())
}
