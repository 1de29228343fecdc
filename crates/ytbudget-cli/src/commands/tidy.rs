use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use ytbudget_core::{config::Config, sanitize::sanitize_directory};

pub async fn run(dir: Option<PathBuf>, ext: &str, config_path: Option<&Path>) -> Result<()> {
    let dir = match dir {
        Some(dir) => dir,
        None => Config::load(config_path)?.output.directory,
    };
    let ext = ext.trim_start_matches('.');

    println!("Sanitizing *.{} file names in {}", ext, dir.display());

    let renames = sanitize_directory(&dir, ext)
        .with_context(|| format!("Failed to tidy {}", dir.display()))?;

    for rename in &renames {
        println!(
            "Renamed: {} -> {}",
            rename.from.file_name().unwrap_or_default().to_string_lossy(),
            rename.to.file_name().unwrap_or_default().to_string_lossy()
        );
    }

    if renames.is_empty() {
        println!("No filenames needed sanitizing.");
    } else {
        println!("Sanitized {} filenames.", renames.len());
    }

    Ok(())
}
