//! Audio downloader using yt-dlp

use crate::error::DownloadError;
use serde::Deserialize;
use std::path::PathBuf;
use tokio::process::Command;
use tracing::{debug, info};
use url::Url;

/// Short video used when the user types `test` instead of a URL
pub const TEST_VIDEO_URL: &str = "https://youtube.com/shorts/Zxe4n0QEj_s";

#[derive(Debug)]
pub struct Downloader {
    yt_dlp_path: PathBuf,
    temp_dir: PathBuf,
    options: DownloadOptions,
}

/// Limits passed through to yt-dlp
#[derive(Debug, Clone)]
pub struct DownloadOptions {
    /// yt-dlp size string, e.g. `1000M`
    pub max_filesize: String,
    /// Seconds
    pub socket_timeout: u32,
    /// Passed as `--ffmpeg-location` when set
    pub ffmpeg_location: Option<PathBuf>,
}

impl Default for DownloadOptions {
    fn default() -> Self {
        Self {
            max_filesize: "1000M".to_string(),
            socket_timeout: 30,
            ffmpeg_location: None,
        }
    }
}

#[derive(Debug)]
pub struct DownloadResult {
    pub audio_path: PathBuf,
    pub metadata: VideoMetadata,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VideoMetadata {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub duration: Option<f64>,
    #[serde(default)]
    pub uploader: Option<String>,
    #[serde(default)]
    pub ext: String,
}

impl Downloader {
    pub fn new(yt_dlp_path: PathBuf, temp_dir: PathBuf, options: DownloadOptions) -> Self {
        Self {
            yt_dlp_path,
            temp_dir,
            options,
        }
    }

    /// yt-dlp arguments for downloading the best audio of a single video
    pub fn build_args(&self, url: &str) -> Vec<String> {
        let output_template = self.temp_dir.join("%(id)s.%(ext)s");

        let mut args: Vec<String> = vec![
            // Best audio-only stream, falling back to the best muxed one
            "-f".into(),
            "bestaudio/best".into(),
            "--no-playlist".into(),
            "--max-filesize".into(),
            self.options.max_filesize.clone(),
            "--socket-timeout".into(),
            self.options.socket_timeout.to_string(),
            "-o".into(),
            output_template.to_string_lossy().into_owned(),
            // Print JSON to stdout for metadata parsing
            "--print-json".into(),
            "--no-progress".into(),
        ];

        if let Some(ref ffmpeg) = self.options.ffmpeg_location {
            args.push("--ffmpeg-location".into());
            args.push(ffmpeg.to_string_lossy().into_owned());
        }

        args.push(url.to_string());
        args
    }

    /// Download the audio stream of one video into the temp directory
    pub async fn download(&self, url: &str) -> Result<DownloadResult, DownloadError> {
        info!("Downloading audio from: {}", url);

        let args = self.build_args(url);
        debug!("yt-dlp {}", args.join(" "));

        let output = Command::new(&self.yt_dlp_path).args(&args).output().await?;

        let stderr = String::from_utf8_lossy(&output.stderr);
        if !output.status.success() {
            debug!("yt-dlp stderr: {}", stderr);

            if stderr.contains("Video unavailable") || stderr.contains("Private video") {
                return Err(DownloadError::VideoUnavailable(url.to_string()));
            }
            if stderr.contains("is not a valid URL") {
                return Err(DownloadError::InvalidUrl(url.to_string()));
            }

            return Err(DownloadError::YtDlpFailed(output.status.code()));
        }

        // yt-dlp exits 0 when --max-filesize skips a file
        if stderr.contains("larger than max-filesize") {
            return Err(DownloadError::TooLarge(url.to_string()));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let metadata = parse_print_json(&stdout)?;

        debug!("Downloaded: {} ({})", metadata.title, metadata.id);

        let audio_path = self.find_audio_file(&metadata)?;

        Ok(DownloadResult {
            audio_path,
            metadata,
        })
    }

    fn find_audio_file(&self, metadata: &VideoMetadata) -> Result<PathBuf, DownloadError> {
        if !metadata.ext.is_empty() {
            let path = self.temp_dir.join(format!("{}.{}", metadata.id, metadata.ext));
            if path.exists() {
                return Ok(path);
            }
        }

        // Look for common audio extensions
        let extensions = ["opus", "m4a", "webm", "mp3", "ogg", "aac", "mp4", "mkv"];

        for ext in extensions {
            let path = self.temp_dir.join(format!("{}.{}", metadata.id, ext));
            if path.exists() {
                debug!("Found audio file: {}", path.display());
                return Ok(path);
            }
        }

        Err(DownloadError::NoAudioStream(metadata.id.clone()))
    }
}

/// Last JSON object printed by `--print-json`
fn parse_print_json(stdout: &str) -> Result<VideoMetadata, DownloadError> {
    let line = stdout
        .lines()
        .rev()
        .map(str::trim)
        .find(|l| l.starts_with('{'))
        .ok_or_else(|| DownloadError::MetadataParse("yt-dlp printed no JSON".to_string()))?;

    serde_json::from_str(line).map_err(|e| DownloadError::MetadataParse(e.to_string()))
}

/// Resolve user input to a supported source URL.
///
/// `test` maps to a short built-in video. Anything else must be an http(s)
/// URL on YouTube or Twitch.
pub fn validate_source_url(input: &str) -> Result<String, DownloadError> {
    let input = input.trim();
    if input.eq_ignore_ascii_case("test") {
        return Ok(TEST_VIDEO_URL.to_string());
    }

    let parsed = Url::parse(input).map_err(|_| DownloadError::InvalidUrl(input.to_string()))?;

    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(DownloadError::InvalidUrl(input.to_string()));
    }

    let host = parsed
        .host_str()
        .ok_or_else(|| DownloadError::InvalidUrl(input.to_string()))?
        .to_lowercase();

    let supported = ["youtube.com", "youtu.be", "twitch.tv"]
        .iter()
        .any(|domain| host == *domain || host.ends_with(&format!(".{}", domain)));

    if !supported {
        return Err(DownloadError::UnsupportedHost(host));
    }

    Ok(channel_videos_url(parsed).to_string())
}

/// Point a bare YouTube channel URL at its `/videos` tab.
///
/// yt-dlp lists a bare channel as its tabs (videos, shorts, live), and a
/// tab is a playlist, not a video. Any other URL is returned unchanged.
pub fn normalize_channel_url(input: &str) -> String {
    match Url::parse(input) {
        Ok(parsed) => channel_videos_url(parsed).to_string(),
        Err(_) => input.to_string(),
    }
}

fn channel_videos_url(mut url: Url) -> Url {
    let is_youtube = url
        .host_str()
        .map(|host| {
            let host = host.to_lowercase();
            host == "youtube.com" || host.ends_with(".youtube.com")
        })
        .unwrap_or(false);
    if !is_youtube {
        return url;
    }

    let segments: Vec<String> = url
        .path_segments()
        .map(|segments| segments.filter(|s| !s.is_empty()).map(str::to_string).collect())
        .unwrap_or_default();

    let bare_channel = match segments.as_slice() {
        [handle] => handle.starts_with('@'),
        [kind, _] => matches!(kind.as_str(), "channel" | "c" | "user"),
        _ => false,
    };

    if bare_channel {
        url.set_path(&format!("/{}/videos", segments.join("/")));
    }
    url
}
