use serde::Serialize;

use super::signal::Signal;

/// Tags read from the file by the codec's metadata reader.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TrackTags {
    pub title: String,
    pub artist: String,
    pub album: String,
    pub year: Option<i32>,
    /// Short codec name ("mp3", "flac", ...)
    pub format: String,
}

impl TrackTags {
    /// True when no descriptive tag was found. `format` is not a tag.
    pub fn is_empty(&self) -> bool {
        self.title.is_empty()
            && self.artist.is_empty()
            && self.album.is_empty()
            && self.year.is_none()
    }
}

/// Stream properties plus tags, as reported to front ends.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AudioMetadata {
    pub sample_rate: u32,
    pub channels: usize,
    pub duration_ms: u64,
    /// Uncompressed PCM bitrate in bits per second.
    pub decoded_bitrate: u64,
    pub tags: TrackTags,
}

impl AudioMetadata {
    pub fn describe(signal: &Signal, bits_per_sample: u32, tags: &TrackTags) -> Self {
        let sample_rate = signal.sample_rate();
        let channels = signal.channels();
        Self {
            sample_rate,
            channels,
            duration_ms: signal.len() as u64 * 1000 / sample_rate as u64,
            decoded_bitrate: sample_rate as u64 * channels as u64 * bits_per_sample as u64,
            tags: tags.clone(),
        }
    }
}
