use anyhow::Result;
use std::path::{Path, PathBuf};
use std::process::Command;
use ytbudget_core::config::Config;

pub async fn run(config_path: Option<&Path>) -> Result<()> {
    let config = Config::load(config_path)?;

    println!("ytbudget dependency check\n");

    let mut all_ok = true;

    // yt-dlp prints a bare version string
    print!("yt-dlp:  ");
    all_ok &= report(
        config.yt_dlp_path().ok(),
        "--version",
        |out| out.trim().to_string(),
        "pip install yt-dlp",
    );

    // ffmpeg prints "ffmpeg version N ..." on its first line
    print!("ffmpeg:  ");
    all_ok &= report(
        config.ffmpeg_path().ok(),
        "-version",
        |out| {
            out.lines()
                .next()
                .and_then(|line| line.split_whitespace().nth(2))
                .unwrap_or("unknown")
                .to_string()
        },
        "brew install ffmpeg",
    );

    println!();
    if all_ok {
        println!("All dependencies OK!");
    } else {
        println!("Some dependencies are missing. See above for installation instructions.");
    }

    Ok(())
}

fn report(
    path: Option<PathBuf>,
    version_flag: &str,
    parse_version: impl Fn(&str) -> String,
    install_hint: &str,
) -> bool {
    let Some(path) = path else {
        println!("NOT FOUND");
        println!("         Install with: {}", install_hint);
        return false;
    };

    match Command::new(&path).arg(version_flag).output() {
        Ok(out) if out.status.success() => {
            let version = parse_version(&String::from_utf8_lossy(&out.stdout));
            println!("OK ({}, {})", version, path.display());
            true
        }
        _ => {
            println!("FOUND at {} but failed to get version", path.display());
            false
        }
    }
}
