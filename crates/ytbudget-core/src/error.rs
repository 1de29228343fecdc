//! Error types for ytbudget-core

use thiserror::Error;

pub type Result<T> = std::result::Result<T, YtBudgetError>;

#[derive(Error, Debug)]
pub enum YtBudgetError {
    #[error("Metadata lookup failed: {0}")]
    Metadata(#[from] MetadataError),

    #[error("Download failed: {0}")]
    Download(#[from] DownloadError),

    #[error("Transcode failed: {0}")]
    Transcode(#[from] TranscodeError),

    #[error("Invalid budget: {0}")]
    Budget(#[from] BudgetError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Pipeline error: {0}")]
    Pipeline(String),
}

#[derive(Error, Debug)]
pub enum MetadataError {
    #[error("yt-dlp not found. Install with: pip install yt-dlp")]
    YtDlpNotFound,

    #[error("yt-dlp listing failed with exit code {code:?}: {stderr}")]
    ListingFailed { code: Option<i32>, stderr: String },

    #[error("Failed to parse metadata: {0}")]
    Parse(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Error, Debug)]
pub enum DownloadError {
    #[error("yt-dlp failed with exit code: {0:?}")]
    YtDlpFailed(Option<i32>),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Unsupported host (expected YouTube or Twitch): {0}")]
    UnsupportedHost(String),

    #[error("Video unavailable or private: {0}")]
    VideoUnavailable(String),

    #[error("File exceeds the maximum download size: {0}")]
    TooLarge(String),

    #[error("No audio file produced for video {0}")]
    NoAudioStream(String),

    #[error("Failed to parse metadata: {0}")]
    MetadataParse(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Error, Debug)]
pub enum TranscodeError {
    #[error("FFmpeg not found. Install with: brew install ffmpeg")]
    FfmpegNotFound,

    #[error("FFmpeg failed with exit code: {0:?}")]
    FfmpegFailed(Option<i32>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Error, Debug, PartialEq)]
pub enum BudgetError {
    #[error("'{0}' is not a number")]
    NotANumber(String),

    #[error("amount must be positive, got {0}")]
    NotPositive(f64),

    #[error("{0} is too large for a time budget")]
    TooLarge(f64),

    #[error("unknown time unit '{0}' (use h, m or s)")]
    UnknownUnit(String),

    #[error("empty duration")]
    Empty,
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load config: {0}")]
    LoadError(String),

    #[error("Invalid config value: {0}")]
    InvalidValue(String),
}
