use anyhow::Result;
use std::path::Path;
use ytbudget_core::config::Config;

pub async fn run(config_path: Option<&Path>) -> Result<()> {
    let config = Config::load(config_path)?;

    println!("ytbudget configuration\n");
    println!("{}", toml::to_string_pretty(&config)?);

    if config.paths.yt_dlp.is_none() {
        println!("# yt_dlp: (auto-detect)");
    }
    if config.paths.ffmpeg.is_none() {
        println!("# ffmpeg: (auto-detect)");
    }
    if config.temp.directory.is_none() {
        println!("# temp directory: (system temp)");
    }

    // Show config file locations
    println!("\nConfig file locations (in priority order):");
    if let Some(p) = config_path {
        println!("  1. {} (specified)", p.display());
    }
    if let Some(default) = Config::default_path() {
        println!("  2. {}", default.display());
    }
    println!("  3. Environment variables (YTBUDGET_<SECTION>__<KEY>)");

    Ok(())
}
