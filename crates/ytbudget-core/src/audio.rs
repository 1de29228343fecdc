//! Output audio parameters

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Codec every output file is transcoded to
pub const OUTPUT_CODEC: &str = "pcm_s16le";

/// Extension of every output file
pub const OUTPUT_EXTENSION: &str = "wav";

/// Supported output sample rates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum SampleRate {
    Hz8000,
    Hz11025,
    Hz16000,
    Hz22050,
    #[default]
    Hz24000,
    Hz32000,
    Hz44100,
    Hz48000,
    Hz88200,
    Hz96000,
    Hz192000,
}

impl SampleRate {
    pub const ALL: [SampleRate; 11] = [
        SampleRate::Hz8000,
        SampleRate::Hz11025,
        SampleRate::Hz16000,
        SampleRate::Hz22050,
        SampleRate::Hz24000,
        SampleRate::Hz32000,
        SampleRate::Hz44100,
        SampleRate::Hz48000,
        SampleRate::Hz88200,
        SampleRate::Hz96000,
        SampleRate::Hz192000,
    ];

    pub fn hz(&self) -> u32 {
        match self {
            SampleRate::Hz8000 => 8000,
            SampleRate::Hz11025 => 11025,
            SampleRate::Hz16000 => 16000,
            SampleRate::Hz22050 => 22050,
            SampleRate::Hz24000 => 24000,
            SampleRate::Hz32000 => 32000,
            SampleRate::Hz44100 => 44100,
            SampleRate::Hz48000 => 48000,
            SampleRate::Hz88200 => 88200,
            SampleRate::Hz96000 => 96000,
            SampleRate::Hz192000 => 192000,
        }
    }

    pub fn from_hz(hz: u32) -> Option<Self> {
        Self::ALL.into_iter().find(|rate| rate.hz() == hz)
    }
}

impl TryFrom<u32> for SampleRate {
    type Error = String;

    fn try_from(hz: u32) -> Result<Self, Self::Error> {
        SampleRate::from_hz(hz).ok_or_else(|| {
            let supported: Vec<String> = Self::ALL.iter().map(|r| r.hz().to_string()).collect();
            format!("unsupported sample rate {} (expected one of {})", hz, supported.join(", "))
        })
    }
}

impl From<SampleRate> for u32 {
    fn from(rate: SampleRate) -> Self {
        rate.hz()
    }
}

impl fmt::Display for SampleRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} Hz", self.hz())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Channels {
    #[default]
    Mono,
    Stereo,
}

impl Channels {
    pub fn count(&self) -> u8 {
        match self {
            Channels::Mono => 1,
            Channels::Stereo => 2,
        }
    }
}

impl FromStr for Channels {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "mono" | "1" => Ok(Channels::Mono),
            "stereo" | "2" => Ok(Channels::Stereo),
            other => Err(format!("unsupported channel layout '{}'", other)),
        }
    }
}

impl fmt::Display for Channels {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Channels::Mono => write!(f, "mono"),
            Channels::Stereo => write!(f, "stereo"),
        }
    }
}

/// Normalized output format: 16-bit PCM WAV at a fixed rate and channel count
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AudioSpec {
    pub sample_rate: SampleRate,
    pub channels: Channels,
}

impl AudioSpec {
    pub fn new(sample_rate: SampleRate, channels: Channels) -> Self {
        Self { sample_rate, channels }
    }

    /// FFmpeg output arguments for this spec
    pub fn ffmpeg_args(&self) -> Vec<String> {
        vec![
            "-ar".to_string(),
            self.sample_rate.hz().to_string(),
            "-ac".to_string(),
            self.channels.count().to_string(),
            "-c:a".to_string(),
            OUTPUT_CODEC.to_string(),
        ]
    }
}

impl fmt::Display for AudioSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {}, 16-bit WAV", self.sample_rate, self.channels)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_rate_lookup() {
        assert_eq!(SampleRate::from_hz(44100), Some(SampleRate::Hz44100));
        assert_eq!(SampleRate::from_hz(44000), None);
        assert!(SampleRate::try_from(12345).is_err());
        assert_eq!(SampleRate::default().hz(), 24000);
    }

    #[test]
    fn test_channels_parse() {
        assert_eq!("Stereo".parse::<Channels>(), Ok(Channels::Stereo));
        assert_eq!(" mono ".parse::<Channels>(), Ok(Channels::Mono));
        assert_eq!("1".parse::<Channels>(), Ok(Channels::Mono));
        assert!("surround".parse::<Channels>().is_err());
    }

    #[test]
    fn test_ffmpeg_args() {
        let spec = AudioSpec::new(SampleRate::Hz48000, Channels::Stereo);
        assert_eq!(
            spec.ffmpeg_args(),
            vec!["-ar", "48000", "-ac", "2", "-c:a", "pcm_s16le"]
        );
        assert_eq!(spec.to_string(), "48000 Hz, stereo, 16-bit WAV");
    }

    #[test]
    fn test_sample_rate_serde() {
        let rate: SampleRate = serde_json::from_str("16000").unwrap();
        assert_eq!(rate, SampleRate::Hz16000);
        assert!(serde_json::from_str::<SampleRate>("16001").is_err());
        assert_eq!(serde_json::to_string(&SampleRate::Hz8000).unwrap(), "8000");
    }
}
