mod args;
mod commands;
mod prompt;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use args::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    let filter = match cli.verbose {
        0 => "ytbudget=warn,ytbudget_core=warn",
        1 => "ytbudget=info,ytbudget_core=info",
        2 => "ytbudget=debug,ytbudget_core=debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).without_time().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .init();

    // Handle commands
    match cli.command {
        Some(Commands::Fetch { url, options }) => {
            commands::fetch::run(url.as_deref(), &options, cli.config.as_deref()).await
        }
        Some(Commands::Plan {
            url,
            budget,
            strategy,
        }) => commands::plan::run(&url, budget, strategy, cli.config.as_deref()).await,
        Some(Commands::Tidy { dir, ext }) => {
            commands::tidy::run(dir, &ext, cli.config.as_deref()).await
        }
        Some(Commands::Doctor) => commands::doctor::run(cli.config.as_deref()).await,
        Some(Commands::Config) => commands::config::run(cli.config.as_deref()).await,
        None => {
            // If URL provided directly (or -i), treat as fetch command
            if cli.url.is_some() || cli.options.interactive {
                commands::fetch::run(cli.url.as_deref(), &cli.options, cli.config.as_deref()).await
            } else {
                // No URL, print help
                use clap::CommandFactory;
                Cli::command().print_help()?;
                println!();
                Ok(())
            }
        }
    }
}
