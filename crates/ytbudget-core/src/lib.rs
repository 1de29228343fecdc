//! ytbudget-core: duration-budgeted audio extraction from playlists and channels

pub mod audio;
pub mod budget;
pub mod config;
pub mod downloader;
pub mod error;
pub mod metadata;
pub mod pipeline;
pub mod sanitize;
pub mod selector;
pub mod transcoder;

pub use budget::Budget;
pub use config::Config;
pub use error::{Result, YtBudgetError};
pub use selector::{select, select_stream, SelectionResult, VideoEntry};
