//! Audio transcoder using FFmpeg

use crate::audio::AudioSpec;
use crate::error::TranscodeError;
use std::ffi::OsString;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::process::Command;
use tracing::{debug, info};

#[derive(Debug)]
pub struct Transcoder {
    ffmpeg_path: PathBuf,
}

impl Transcoder {
    pub fn new(ffmpeg_path: PathBuf) -> Self {
        Self { ffmpeg_path }
    }

    /// Transcode any media file to normalized PCM WAV
    pub async fn transcode(
        &self,
        input: &Path,
        output: &Path,
        spec: &AudioSpec,
    ) -> Result<(), TranscodeError> {
        info!("Transcoding to {}", spec);

        let status = Command::new(&self.ffmpeg_path)
            .args(Self::build_args(input, output, spec))
            .status()
            .await
            .map_err(|e| {
                if e.kind() == ErrorKind::NotFound {
                    TranscodeError::FfmpegNotFound
                } else {
                    TranscodeError::Io(e)
                }
            })?;

        if !status.success() {
            return Err(TranscodeError::FfmpegFailed(status.code()));
        }

        debug!("Transcoded to: {}", output.display());
        Ok(())
    }

    fn build_args(input: &Path, output: &Path, spec: &AudioSpec) -> Vec<OsString> {
        let mut args: Vec<OsString> = ["-hide_banner", "-loglevel", "error", "-i"]
            .into_iter()
            .map(OsString::from)
            .collect();
        args.push(input.as_os_str().to_owned());

        // Drop video and cover art streams
        args.push("-vn".into());
        args.extend(spec.ffmpeg_args().into_iter().map(OsString::from));

        args.push("-y".into());
        args.push(output.as_os_str().to_owned());
        args
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::{Channels, SampleRate};

    #[test]
    fn test_build_args() {
        let spec = AudioSpec::new(SampleRate::Hz16000, Channels::Mono);
        let args = Transcoder::build_args(Path::new("in.webm"), Path::new("out dir/Song.wav"), &spec);
        let args: Vec<_> = args.iter().map(|a| a.to_string_lossy().into_owned()).collect();
        assert_eq!(
            args,
            vec![
                "-hide_banner", "-loglevel", "error",
                "-i", "in.webm",
                "-vn",
                "-ar", "16000", "-ac", "1", "-c:a", "pcm_s16le",
                "-y", "out dir/Song.wav",
            ]
        );
    }

    #[tokio::test]
    async fn test_missing_ffmpeg() {
        let transcoder = Transcoder::new(PathBuf::from("/nonexistent/ffmpeg"));
        let err = transcoder
            .transcode(Path::new("a.webm"), Path::new("a.wav"), &AudioSpec::default())
            .await
            .unwrap_err();
        assert!(matches!(err, TranscodeError::FfmpegNotFound));
    }
}
