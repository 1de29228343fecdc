use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use ytbudget_core::audio::{Channels, SampleRate};
use ytbudget_core::pipeline::Strategy;
use ytbudget_core::Budget;

#[derive(Parser)]
#[command(name = "ytbudget")]
#[command(author, version, about = "Download a playlist or channel as normalized audio, up to a time budget")]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Video, playlist or channel URL (shorthand for `fetch <URL>`)
    #[arg(value_name = "URL")]
    pub url: Option<String>,

    #[command(flatten)]
    pub options: FetchOptions,

    /// Verbose output (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Config file path
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Select videos up to the budget, then download and convert them
    Fetch {
        /// Video, playlist or channel URL (prompted for if omitted)
        url: Option<String>,

        #[command(flatten)]
        options: FetchOptions,
    },

    /// Show which videos would be downloaded, without downloading
    Plan {
        /// Video, playlist or channel URL
        url: String,

        /// Time budget, e.g. 2h, 90m, 1.5 hours
        #[arg(short, long)]
        budget: Budget,

        /// How to pick the cutoff
        #[arg(short, long, value_enum, default_value = "accumulate")]
        strategy: StrategyArg,
    },

    /// Sanitize file names in an output directory
    Tidy {
        /// Directory to tidy (defaults to the configured output directory)
        dir: Option<PathBuf>,

        /// Only rename files with this extension
        #[arg(long, default_value = "wav")]
        ext: String,
    },

    /// Check that yt-dlp and ffmpeg are installed
    Doctor,

    /// Show configuration
    Config,
}

#[derive(clap::Args, Clone, Debug)]
pub struct FetchOptions {
    /// Time budget, e.g. 2h, 90m, 1.5 hours (prompted for if omitted)
    #[arg(short, long)]
    pub budget: Option<Budget>,

    /// Output sample rate in Hz
    #[arg(short, long, value_parser = parse_sample_rate)]
    pub rate: Option<SampleRate>,

    /// Output channels
    #[arg(short, long, value_enum)]
    pub channels: Option<ChannelsArg>,

    /// Output directory
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// How to pick the cutoff
    #[arg(short, long, value_enum, default_value = "accumulate")]
    pub strategy: StrategyArg,

    /// Prompt for every setting not given on the command line
    #[arg(short, long)]
    pub interactive: bool,

    /// Abort at the first video that fails
    #[arg(long)]
    pub stop_on_error: bool,

    /// Keep intermediate files (for debugging)
    #[arg(long)]
    pub keep_temp: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChannelsArg {
    /// One channel
    Mono,
    /// Two channels
    Stereo,
}

impl From<ChannelsArg> for Channels {
    fn from(arg: ChannelsArg) -> Self {
        match arg {
            ChannelsArg::Mono => Channels::Mono,
            ChannelsArg::Stereo => Channels::Stereo,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum StrategyArg {
    /// Add up real durations until the budget is reached
    Accumulate,
    /// Assume every video has the average duration of the listing
    Estimate,
}

impl From<StrategyArg> for Strategy {
    fn from(arg: StrategyArg) -> Self {
        match arg {
            StrategyArg::Accumulate => Strategy::Accumulate,
            StrategyArg::Estimate => Strategy::Estimate,
        }
    }
}

fn parse_sample_rate(s: &str) -> Result<SampleRate, String> {
    let hz: u32 = s
        .trim()
        .parse()
        .map_err(|_| format!("'{}' is not a number", s))?;
    SampleRate::try_from(hz)
}
