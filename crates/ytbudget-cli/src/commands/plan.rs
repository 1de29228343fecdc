use anyhow::Result;
use std::path::Path;
use tokio::sync::mpsc;

use super::print_entry;
use crate::args::StrategyArg;
use ytbudget_core::{
    budget::format_duration,
    config::Config,
    pipeline::{Pipeline, PipelineConfig, Strategy},
    Budget,
};

pub async fn run(url: &str, budget: Budget, strategy: StrategyArg, config_path: Option<&Path>) -> Result<()> {
    let config = Config::load(config_path)?;

    let mut pipeline_config = PipelineConfig::new(url, budget, &config)?;
    pipeline_config.strategy = strategy.into();

    // Dry run: nobody listens for progress
    let (tx, _rx) = mpsc::channel(8);
    let pipeline = Pipeline::new(pipeline_config, tx);

    eprintln!("Reading video information...");
    let plan = pipeline.plan().await?;

    if plan.is_empty() {
        println!("Could not determine video durations or no videos found.");
        return Ok(());
    }

    println!(
        "Budget {} ({} strategy): {} of {} videos\n",
        plan.budget,
        plan.strategy,
        plan.selection.len(),
        plan.listed
    );

    for (i, entry) in plan.selection.entries.iter().enumerate() {
        print_entry(i + 1, entry);
    }

    println!("\nTotal: {}", format_duration(plan.selection.total_seconds));
    if plan.strategy == Strategy::Accumulate && !plan.selection.budget_reached {
        println!("The listing is shorter than the budget; every video would be downloaded.");
    }

    Ok(())
}
