use anyhow::{bail, Result};
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{BufRead, IsTerminal, Write};
use std::path::Path;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::debug;

use super::{print_entry, truncate};
use crate::args::FetchOptions;
use crate::prompt::Prompter;
use ytbudget_core::{
    budget::format_duration,
    config::Config,
    pipeline::{Pipeline, PipelineConfig, PipelineStage},
};

pub async fn run(url: Option<&str>, options: &FetchOptions, config_path: Option<&Path>) -> Result<()> {
    let config = Config::load(config_path)?;
    let pipeline_config = build_config(url, options, &config)?;
    debug!("Pipeline config: {:?}", pipeline_config);

    println!("Source:   {}", pipeline_config.url);
    println!("Budget:   {}", pipeline_config.budget);
    println!("Audio:    {}", pipeline_config.audio);
    println!("Output:   {}\n", pipeline_config.output_dir.display());

    // Create progress channel
    let (tx, mut rx) = mpsc::channel(32);

    let pb = ProgressBar::new_spinner();
    pb.enable_steady_tick(Duration::from_millis(100));

    // Spawn progress handler
    let bar = pb.clone();
    let progress_handle = tokio::spawn(async move {
        while let Some(stage) = rx.recv().await {
            match stage {
                PipelineStage::Listing { url } => {
                    bar.set_message(format!("Reading metadata for {}", truncate(&url, 50)));
                }
                PipelineStage::Planned { videos, .. } => {
                    bar.set_length(videos as u64);
                    bar.set_position(0);
                }
                PipelineStage::Downloading { index, total, title } => {
                    bar.set_message(format!("[{}/{}] Downloading: {}", index, total, truncate(&title, 40)));
                }
                PipelineStage::Transcoding { index, total, title } => {
                    bar.set_message(format!("[{}/{}] Converting: {}", index, total, truncate(&title, 40)));
                }
                PipelineStage::Finished { output, .. } => {
                    bar.inc(1);
                    bar.println(format!("  saved {}", output.display()));
                }
                PipelineStage::Failed { title, error, .. } => {
                    bar.inc(1);
                    bar.println(format!("  failed {}: {}", truncate(&title, 40), error));
                }
                PipelineStage::Tidied { renamed } => {
                    if renamed > 0 {
                        bar.println(format!("  sanitized {} file names", renamed));
                    }
                }
                PipelineStage::Complete { duration, .. } => {
                    bar.finish_with_message(format!("Done ({:.1}s)", duration.as_secs_f32()));
                }
            }
        }
    });

    let pipeline = Pipeline::new(pipeline_config, tx);

    let plan = match pipeline.plan().await {
        Ok(plan) => plan,
        Err(e) => {
            pb.abandon_with_message("Could not read video information");
            drop(pipeline);
            progress_handle.await?;
            return Err(e.into());
        }
    };

    if plan.is_empty() {
        pb.finish_and_clear();
        drop(pipeline);
        progress_handle.await?;
        println!("Could not determine video durations or no videos found. Nothing to download.");
        return Ok(());
    }

    pb.suspend(|| {
        println!(
            "Selected {} of {} videos, {} total:",
            plan.selection.len(),
            plan.listed,
            format_duration(plan.selection.total_seconds)
        );
        for (i, entry) in plan.selection.entries.iter().enumerate() {
            print_entry(i + 1, entry);
        }
        println!();
    });
    pb.set_style(
        ProgressStyle::with_template("{spinner:.cyan} [{elapsed_precise}] {bar:30.cyan/blue} {pos}/{len} {msg}")?
            .progress_chars("=>-"),
    );

    let result = pipeline.execute(&plan).await;
    let output_dir = pipeline.config().output_dir.clone();
    let audio = pipeline.config().audio;

    // Close the channel and wait for progress handler
    drop(pipeline);
    progress_handle.await?;

    let summary = result?;

    println!("\n=== Download Complete ===");
    println!("Converted: {}", summary.completed.len());
    println!("Failed:    {}", summary.failures.len());
    println!("Audio:     {}", format_duration(summary.audio_seconds()));

    if !summary.failures.is_empty() {
        println!("\nFailed videos:");
        for failure in &summary.failures {
            println!("  {} - {}", failure.url, failure.error);
        }
    }

    println!("\nAudio files have been saved to {}", output_dir.display());
    println!("Format: {}", audio);

    Ok(())
}

fn build_config(url: Option<&str>, options: &FetchOptions, config: &Config) -> Result<PipelineConfig> {
    let interactive = options.interactive || std::io::stdin().is_terminal();
    resolve_inputs(url, options, config, interactive, &mut Prompter::stdio())
}

/// Fill in missing inputs (prompting when allowed) and validate everything.
///
/// Sample rate and channels are asked for with `-i`, or once the URL or
/// budget had to be prompted for on a terminal.
fn resolve_inputs<R: BufRead, W: Write>(
    url: Option<&str>,
    options: &FetchOptions,
    config: &Config,
    interactive: bool,
    prompter: &mut Prompter<R, W>,
) -> Result<PipelineConfig> {
    let ask_audio =
        options.interactive || (interactive && (url.is_none() || options.budget.is_none()));

    let url = match url {
        Some(url) => url.to_string(),
        None if interactive => prompter.url()?,
        None => bail!("no URL given"),
    };

    let budget = match options.budget {
        Some(budget) => budget,
        None if interactive => prompter.budget()?,
        None => bail!("no time budget given (use --budget, e.g. --budget 2h)"),
    };

    let mut pipeline_config = PipelineConfig::new(&url, budget, config)?;
    pipeline_config.strategy = options.strategy.into();

    pipeline_config.audio.sample_rate = match options.rate {
        Some(rate) => rate,
        None if ask_audio => prompter.sample_rate(config.output.sample_rate)?,
        None => config.output.sample_rate,
    };

    pipeline_config.audio.channels = match options.channels {
        Some(channels) => channels.into(),
        None if ask_audio => prompter.channels(config.output.channels)?,
        None => config.output.channels,
    };

    if let Some(ref output) = options.output {
        pipeline_config.output_dir = output.clone();
    }
    if options.keep_temp {
        pipeline_config.keep_temp = true;
    }
    if options.stop_on_error {
        pipeline_config.continue_on_error = false;
    }

    Ok(pipeline_config)
}
