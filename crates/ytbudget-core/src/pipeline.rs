//! Pipeline orchestration: plan a selection, then download and transcode it

use crate::audio::{AudioSpec, OUTPUT_EXTENSION};
use crate::budget::Budget;
use crate::config::Config;
use crate::downloader::{validate_source_url, DownloadOptions, Downloader};
use crate::error::YtBudgetError;
use crate::metadata::{known_totals, MetadataProbe};
use crate::sanitize::{output_filename, sanitize_directory, unique_path, Rename};
use crate::selector::{estimate_count, select_stream, Estimate, SelectionResult, VideoEntry};
use crate::transcoder::Transcoder;

use std::path::PathBuf;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// How the cutoff is chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Strategy {
    /// Walk the listing and stop once real durations reach the budget
    #[default]
    Accumulate,
    /// Take `budget / average duration` entries from the flat listing
    Estimate,
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Strategy::Accumulate => write!(f, "accumulate"),
            Strategy::Estimate => write!(f, "estimate"),
        }
    }
}

/// Pipeline configuration, built once every input has been validated
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub url: String,
    pub budget: Budget,
    pub strategy: Strategy,
    pub audio: AudioSpec,
    pub output_dir: PathBuf,
    pub yt_dlp_path: PathBuf,
    pub ffmpeg_path: PathBuf,
    pub download: DownloadOptions,
    pub continue_on_error: bool,
    pub keep_temp: bool,
    pub temp_root: PathBuf,
}

impl PipelineConfig {
    /// Validate the user input and resolve tool paths from `config`.
    pub fn new(url: &str, budget: Budget, config: &Config) -> Result<Self, YtBudgetError> {
        let url = validate_source_url(url)?;

        if !budget.is_positive() {
            return Err(YtBudgetError::Pipeline(format!(
                "budget must be positive, got {} seconds",
                budget.as_secs()
            )));
        }

        Ok(Self {
            url,
            budget,
            strategy: Strategy::default(),
            audio: config.audio_spec(),
            output_dir: config.output.directory.clone(),
            yt_dlp_path: config.yt_dlp_path()?,
            ffmpeg_path: config.ffmpeg_path()?,
            download: config.download_options(),
            continue_on_error: config.download.continue_on_error,
            keep_temp: !config.temp.cleanup,
            temp_root: config.temp_dir(),
        })
    }
}

/// Pipeline progress stages
#[derive(Debug, Clone)]
pub enum PipelineStage {
    Listing { url: String },
    Planned { videos: usize, total_seconds: f64 },
    Downloading { index: usize, total: usize, title: String },
    Transcoding { index: usize, total: usize, title: String },
    Finished { index: usize, total: usize, output: PathBuf },
    Failed { index: usize, total: usize, title: String, error: String },
    Tidied { renamed: usize },
    Complete { completed: usize, failed: usize, duration: Duration },
}

/// What a run will fetch
#[derive(Debug, Clone, PartialEq)]
pub struct Plan {
    pub strategy: Strategy,
    pub budget: Budget,
    /// Entries in the flat listing
    pub listed: usize,
    pub selection: SelectionResult,
}

impl Plan {
    pub fn is_empty(&self) -> bool {
        self.selection.is_empty()
    }
}

/// One converted video
#[derive(Debug, Clone)]
pub struct Completed {
    pub url: String,
    pub title: String,
    pub output: PathBuf,
    pub duration: Option<f64>,
}

/// One video that could not be fetched
#[derive(Debug, Clone)]
pub struct Failure {
    pub url: String,
    pub title: String,
    pub error: String,
}

#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    pub completed: Vec<Completed>,
    pub failures: Vec<Failure>,
    pub renamed: Vec<Rename>,
    pub elapsed: Duration,
}

impl RunSummary {
    /// Seconds of audio written, as reported by yt-dlp
    pub fn audio_seconds(&self) -> f64 {
        self.completed.iter().filter_map(|c| c.duration).sum()
    }
}

/// Build a plan from a flat listing using the estimate strategy
pub fn plan_estimate(flat: Vec<VideoEntry>, budget: Budget) -> Plan {
    let listed = flat.len();
    let (total, count) = known_totals(&flat);

    let take = match estimate_count(total, count, budget) {
        Estimate::Nothing => 0,
        Estimate::All => listed,
        Estimate::First(n) => n.min(listed),
    };

    let entries: Vec<VideoEntry> = flat.into_iter().take(take).collect();
    let (total_seconds, _) = known_totals(&entries);

    Plan {
        strategy: Strategy::Estimate,
        budget,
        listed,
        selection: SelectionResult {
            seen: entries.len(),
            budget_reached: total_seconds >= budget.as_secs(),
            entries,
            total_seconds,
        },
    }
}

/// Main processing pipeline
pub struct Pipeline {
    config: PipelineConfig,
    progress_tx: mpsc::Sender<PipelineStage>,
}

impl Pipeline {
    pub fn new(config: PipelineConfig, progress_tx: mpsc::Sender<PipelineStage>) -> Self {
        Self { config, progress_tx }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Query metadata and decide what to fetch
    pub async fn plan(&self) -> Result<Plan, YtBudgetError> {
        let _ = self
            .progress_tx
            .send(PipelineStage::Listing {
                url: self.config.url.clone(),
            })
            .await;

        let probe = MetadataProbe::new(
            self.config.yt_dlp_path.clone(),
            self.config.download.socket_timeout,
        );
        let flat = probe.list(&self.config.url).await?;
        let listed = flat.len();

        let plan = match self.config.strategy {
            Strategy::Accumulate => Plan {
                strategy: Strategy::Accumulate,
                budget: self.config.budget,
                listed,
                selection: select_stream(probe.resolve_all(flat), self.config.budget).await,
            },
            Strategy::Estimate => plan_estimate(flat, self.config.budget),
        };

        info!(
            "Planned {} of {} videos ({:.0}s) with {} strategy",
            plan.selection.len(),
            listed,
            plan.selection.total_seconds,
            plan.strategy
        );

        let _ = self
            .progress_tx
            .send(PipelineStage::Planned {
                videos: plan.selection.len(),
                total_seconds: plan.selection.total_seconds,
            })
            .await;

        Ok(plan)
    }

    /// Download and transcode every planned video, one at a time
    pub async fn execute(&self, plan: &Plan) -> Result<RunSummary, YtBudgetError> {
        let start_time = Instant::now();
        let mut summary = RunSummary::default();

        if plan.is_empty() {
            info!("Nothing to download");
            return Ok(summary);
        }

        tokio::fs::create_dir_all(&self.config.output_dir).await?;

        let temp_dir = tempfile::Builder::new()
            .prefix("ytbudget-")
            .tempdir_in(&self.config.temp_root)?;
        let temp_path = temp_dir.path().to_path_buf();
        debug!("Temp directory: {}", temp_path.display());

        let downloader = Downloader::new(
            self.config.yt_dlp_path.clone(),
            temp_path.clone(),
            self.config.download.clone(),
        );
        let transcoder = Transcoder::new(self.config.ffmpeg_path.clone());

        let total = plan.selection.len();
        for (i, entry) in plan.selection.entries.iter().enumerate() {
            let index = i + 1;
            match self.fetch_one(index, total, entry, &downloader, &transcoder).await {
                Ok(done) => {
                    let _ = self
                        .progress_tx
                        .send(PipelineStage::Finished {
                            index,
                            total,
                            output: done.output.clone(),
                        })
                        .await;
                    summary.completed.push(done);
                }
                Err(e) => {
                    warn!("Failed {}: {}", entry.url, e);
                    let _ = self
                        .progress_tx
                        .send(PipelineStage::Failed {
                            index,
                            total,
                            title: entry.title.clone(),
                            error: e.to_string(),
                        })
                        .await;

                    if !self.config.continue_on_error {
                        if self.config.keep_temp {
                            std::mem::forget(temp_dir);
                            debug!("Temp files kept at: {}", temp_path.display());
                        }
                        return Err(e);
                    }

                    summary.failures.push(Failure {
                        url: entry.url.clone(),
                        title: entry.title.clone(),
                        error: e.to_string(),
                    });
                }
            }
        }

        summary.renamed = sanitize_directory(&self.config.output_dir, OUTPUT_EXTENSION)?;
        for rename in &summary.renamed {
            info!("Renamed {} -> {}", rename.from.display(), rename.to.display());
        }
        let _ = self
            .progress_tx
            .send(PipelineStage::Tidied {
                renamed: summary.renamed.len(),
            })
            .await;

        summary.elapsed = start_time.elapsed();
        info!(
            "Pipeline complete: {} converted, {} failed ({:.1}s)",
            summary.completed.len(),
            summary.failures.len(),
            summary.elapsed.as_secs_f32()
        );

        let _ = self
            .progress_tx
            .send(PipelineStage::Complete {
                completed: summary.completed.len(),
                failed: summary.failures.len(),
                duration: summary.elapsed,
            })
            .await;

        // Cleanup temp directory (unless keep_temp is set)
        if self.config.keep_temp {
            // Prevent cleanup by forgetting the temp dir
            std::mem::forget(temp_dir);
            debug!("Temp files kept at: {}", temp_path.display());
        }

        Ok(summary)
    }

    async fn fetch_one(
        &self,
        index: usize,
        total: usize,
        entry: &VideoEntry,
        downloader: &Downloader,
        transcoder: &Transcoder,
    ) -> Result<Completed, YtBudgetError> {
        let _ = self
            .progress_tx
            .send(PipelineStage::Downloading {
                index,
                total,
                title: entry.title.clone(),
            })
            .await;

        let download = downloader.download(&entry.url).await?;
        let title = download.metadata.title.clone();

        let _ = self
            .progress_tx
            .send(PipelineStage::Transcoding {
                index,
                total,
                title: title.clone(),
            })
            .await;

        let output = unique_path(
            &self.config.output_dir,
            &output_filename(&title, OUTPUT_EXTENSION),
        );
        transcoder
            .transcode(&download.audio_path, &output, &self.config.audio)
            .await?;

        if !self.config.keep_temp {
            if let Err(e) = tokio::fs::remove_file(&download.audio_path).await {
                debug!("Could not remove {}: {}", download.audio_path.display(), e);
            }
        }

        Ok(Completed {
            url: entry.url.clone(),
            title,
            output,
            duration: download.metadata.duration.or(entry.known_duration()),
        })
    }
}
