//! Listing and per-video metadata via yt-dlp
//!
//! The flat listing enumerates a playlist or channel cheaply but often omits
//! durations. Entries without one are looked up individually, lazily, as the
//! selector pulls them from [`MetadataProbe::resolve_all`].

use crate::downloader::normalize_channel_url;
use crate::error::MetadataError;
use crate::selector::VideoEntry;
use futures::stream::{self, Stream, StreamExt};
use serde::Deserialize;
use serde_json::Value;
use std::io::ErrorKind;
use std::path::PathBuf;
use tokio::process::Command;
use tracing::{debug, info, warn};

#[derive(Debug, Clone)]
pub struct MetadataProbe {
    yt_dlp_path: PathBuf,
    socket_timeout: u32,
}

/// One JSON line of `yt-dlp --dump-json`
#[derive(Debug, Deserialize)]
struct InfoLine {
    #[serde(default, rename = "_type")]
    kind: Option<String>,
    #[serde(default)]
    ie_key: Option<String>,
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    webpage_url: Option<String>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    duration: Option<Value>,
}

impl InfoLine {
    /// Channel tabs and nested playlists list many videos under one URL
    fn is_container(&self) -> bool {
        self.kind.as_deref() == Some("playlist")
            || matches!(self.ie_key.as_deref(), Some("YoutubeTab" | "YoutubePlaylist"))
    }

    fn into_entry(self) -> Option<VideoEntry> {
        let url = self
            .webpage_url
            .or(self.url)
            .or_else(|| self.id.as_ref().map(|id| watch_url(id)))?;
        let id = self.id.unwrap_or_else(|| url.clone());
        let title = self.title.unwrap_or_else(|| id.clone());
        let duration = self.duration.as_ref().and_then(parse_duration);

        Some(VideoEntry {
            id,
            url,
            title,
            duration,
        })
    }
}

impl MetadataProbe {
    pub fn new(yt_dlp_path: PathBuf, socket_timeout: u32) -> Self {
        Self {
            yt_dlp_path,
            socket_timeout,
        }
    }

    /// Lazy stream over a flat listing with durations resolved on demand.
    ///
    /// A failed per-video lookup yields the entry with an unknown duration.
    pub fn resolve_all(&self, flat: Vec<VideoEntry>) -> impl Stream<Item = VideoEntry> + '_ {
        stream::iter(flat).then(move |entry| self.resolve(entry))
    }

    /// Flat listing, in source order
    pub async fn list(&self, url: &str) -> Result<Vec<VideoEntry>, MetadataError> {
        let url = normalize_channel_url(url);
        info!("Listing videos for: {}", url);

        let output = Command::new(&self.yt_dlp_path)
            .args(["--flat-playlist", "--dump-json", "--no-warnings"])
            .args(["--socket-timeout", &self.socket_timeout.to_string()])
            .arg(&url)
            .output()
            .await
            .map_err(spawn_error)?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            debug!("yt-dlp stderr: {}", stderr);
            return Err(MetadataError::ListingFailed {
                code: output.status.code(),
                stderr,
            });
        }

        let entries = parse_listing(&String::from_utf8_lossy(&output.stdout));
        info!("Found {} entries", entries.len());
        Ok(entries)
    }

    /// Full metadata for a single video
    pub async fn lookup(&self, url: &str) -> Result<VideoEntry, MetadataError> {
        debug!("Looking up metadata: {}", url);

        let output = Command::new(&self.yt_dlp_path)
            .args(["--dump-json", "--skip-download", "--no-playlist", "--no-warnings"])
            .args(["--socket-timeout", &self.socket_timeout.to_string()])
            .arg(url)
            .output()
            .await
            .map_err(spawn_error)?;

        if !output.status.success() {
            return Err(MetadataError::ListingFailed {
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let mut entries = parse_listing(&stdout);
        match entries.len() {
            1 => Ok(entries.remove(0)),
            0 => Err(MetadataError::Parse(format!("no metadata returned for {}", url))),
            n => Err(MetadataError::Parse(format!(
                "{} lists {} videos, not a single video",
                url, n
            ))),
        }
    }

    /// Fill in a missing duration. Never fails: errors leave the duration unknown.
    pub async fn resolve(&self, entry: VideoEntry) -> VideoEntry {
        if entry.known_duration().is_some() {
            return entry;
        }

        match self.lookup(&entry.url).await {
            Ok(detail) => VideoEntry {
                title: if detail.title.is_empty() { entry.title } else { detail.title },
                duration: detail.duration,
                ..entry
            },
            Err(e) => {
                warn!("Skipping {}: {}", entry.url, e);
                VideoEntry {
                    duration: None,
                    ..entry
                }
            }
        }
    }
}

fn spawn_error(e: std::io::Error) -> MetadataError {
    if e.kind() == ErrorKind::NotFound {
        MetadataError::YtDlpNotFound
    } else {
        MetadataError::Io(e)
    }
}

/// Parse `--dump-json` output: one JSON object per line, bad lines skipped
pub fn parse_listing(stdout: &str) -> Vec<VideoEntry> {
    stdout
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter_map(|line| match serde_json::from_str::<InfoLine>(line) {
            Ok(info) if info.is_container() => {
                warn!(
                    "Skipping playlist entry {}: not a single video",
                    info.url.as_deref().or(info.id.as_deref()).unwrap_or("?")
                );
                None
            }
            Ok(info) => info.into_entry(),
            Err(e) => {
                debug!("Ignoring unparsable listing line: {}", e);
                None
            }
        })
        .collect()
}

/// Seconds from a JSON number or numeric string
fn parse_duration(value: &Value) -> Option<f64> {
    let seconds = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse().ok()?,
        _ => return None,
    };
    seconds.is_finite().then_some(seconds)
}

fn watch_url(id: &str) -> String {
    format!("https://www.youtube.com/watch?v={}", id)
}

/// Sum of known durations and how many entries had one
pub fn known_totals(entries: &[VideoEntry]) -> (f64, usize) {
    entries
        .iter()
        .filter_map(VideoEntry::known_duration)
        .fold((0.0, 0), |(total, count), d| (total + d, count + 1))
}

#[cfg(test)]
mod tests {
    use super::*;

    const FLAT_PLAYLIST: &str = r#"
{"_type": "url", "ie_key": "Youtube", "id": "aaa", "url": "https://www.youtube.com/watch?v=aaa", "title": "First", "duration": 120.0}
{"_type": "url", "ie_key": "Youtube", "id": "bbb", "url": "https://www.youtube.com/watch?v=bbb", "title": "Second", "duration": null}
not json at all
{"_type": "url", "ie_key": "Youtube", "id": "ccc", "title": "Third", "duration": "95.5"}

{"_type": "url", "title": "No id or url"}
"#;

    #[test]
    fn test_parse_listing_keeps_order_and_skips_bad_lines() {
        let entries = parse_listing(FLAT_PLAYLIST);
        let ids: Vec<_> = entries.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["aaa", "bbb", "ccc"]);

        assert_eq!(entries[0].duration, Some(120.0));
        assert_eq!(entries[1].duration, None);
        assert_eq!(entries[2].duration, Some(95.5));
        assert_eq!(entries[2].url, "https://www.youtube.com/watch?v=ccc");
    }

    #[test]
    fn test_parse_single_video_prefers_webpage_url() {
        let line = r#"{"id": "xyz", "title": "Talk", "duration": 3600, "url": "https://cdn.example/xyz.m4a", "webpage_url": "https://www.youtube.com/watch?v=xyz"}"#;
        let entries = parse_listing(line);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].url, "https://www.youtube.com/watch?v=xyz");
        assert_eq!(entries[0].duration, Some(3600.0));
    }

    #[test]
    fn test_parse_duration_values() {
        assert_eq!(parse_duration(&serde_json::json!(12)), Some(12.0));
        assert_eq!(parse_duration(&serde_json::json!("7.25")), Some(7.25));
        assert_eq!(parse_duration(&serde_json::json!("live")), None);
        assert_eq!(parse_duration(&serde_json::json!(null)), None);
        assert_eq!(parse_duration(&serde_json::json!([1])), None);
    }

    #[test]
    fn test_known_totals() {
        let entries = parse_listing(FLAT_PLAYLIST);
        assert_eq!(known_totals(&entries), (215.5, 2));
        assert_eq!(known_totals(&[]), (0.0, 0));
    }

    #[tokio::test]
    async fn test_resolve_missing_tool_leaves_duration_unknown() {
        let probe = MetadataProbe::new(PathBuf::from("/nonexistent/yt-dlp"), 5);
        let entry = VideoEntry::new("bbb", "https://www.youtube.com/watch?v=bbb", "Second", None);
        let resolved = probe.resolve(entry.clone()).await;
        assert_eq!(resolved, entry);

        let known = VideoEntry::new("aaa", "https://youtu.be/aaa", "First", Some(10.0));
        assert_eq!(probe.resolve(known.clone()).await, known);
    }

    #[tokio::test]
    async fn test_resolve_all_keeps_order() {
        let probe = MetadataProbe::new(PathBuf::from("/nonexistent/yt-dlp"), 5);
        let flat = parse_listing(FLAT_PLAYLIST);
        let resolved: Vec<VideoEntry> = probe.resolve_all(flat.clone()).collect().await;
        assert_eq!(resolved, flat);
    }

    const CHANNEL_TABS: &str = r#"
{"_type": "url", "ie_key": "YoutubeTab", "id": "UCchan", "url": "https://www.youtube.com/@chan/videos", "title": "chan - Videos"}
{"_type": "url", "ie_key": "YoutubeTab", "id": "UCchan", "url": "https://www.youtube.com/@chan/shorts", "title": "chan - Shorts"}
{"_type": "playlist", "id": "PL1", "title": "Nested", "webpage_url": "https://www.youtube.com/playlist?list=PL1"}
{"_type": "url", "ie_key": "Youtube", "id": "ddd", "url": "https://www.youtube.com/watch?v=ddd", "title": "Real", "duration": 30}
"#;

    #[test]
    fn test_parse_listing_skips_tabs_and_playlists() {
        let entries = parse_listing(CHANNEL_TABS);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].id, "ddd");
        assert_eq!(entries[0].duration, Some(30.0));
    }

    /// Stand-in yt-dlp: a flat listing of two channel tabs, and five
    /// 600 second videos for any other query.
    #[cfg(unix)]
    fn fake_yt_dlp(dir: &std::path::Path) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;

        let video = r#"{"_type": "video", "id": "v", "title": "V", "duration": 600, "webpage_url": "https://www.youtube.com/watch?v=v"}"#;
        let script = format!(
            "#!/bin/sh\ncase \"$*\" in\n  *--flat-playlist*)\n    cat <<'EOF'\n{}EOF\n    ;;\n  *)\n    for i in 1 2 3 4 5; do echo '{}'; done\n    ;;\nesac\n",
            CHANNEL_TABS.trim_start(),
            video
        );
        let path = dir.join("yt-dlp");
        std::fs::write(&path, script).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_channel_tabs_are_never_selected() {
        let dir = tempfile::tempdir().unwrap();
        let probe = MetadataProbe::new(fake_yt_dlp(dir.path()), 5);

        let flat = probe.list("https://www.youtube.com/@chan").await.unwrap();
        assert_eq!(flat.len(), 1);

        let result = crate::select_stream(probe.resolve_all(flat), crate::Budget::from_secs(900.0)).await;
        let urls = result.urls();
        assert_eq!(urls, vec!["https://www.youtube.com/watch?v=ddd"]);
        assert_eq!(result.total_seconds, 30.0);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_lookup_listing_many_videos_is_unknown() {
        let dir = tempfile::tempdir().unwrap();
        let probe = MetadataProbe::new(fake_yt_dlp(dir.path()), 5);

        let tab = VideoEntry::new("UCchan", "https://www.youtube.com/@chan/videos", "chan", None);
        assert!(matches!(probe.lookup(&tab.url).await, Err(MetadataError::Parse(_))));
        assert_eq!(probe.resolve(tab.clone()).await.duration, None);
    }

    #[tokio::test]
    async fn test_listing_failure_is_an_error() {
        let probe = MetadataProbe::new(PathBuf::from("/nonexistent/yt-dlp"), 5);
        let err = probe.list("https://youtu.be/aaa").await.unwrap_err();
        assert!(matches!(err, MetadataError::YtDlpNotFound));
    }
}
