use std::path::Path;
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::{MetadataOptions, MetadataRevision, StandardTagKey};
use symphonia::core::probe::Hint;
use thiserror::Error;

use super::metadata::TrackTags;
use super::signal::Signal;
use crate::error::AnalysisError;

/// Bits per sample reported when the codec does not declare one (lossy formats).
const DEFAULT_BITS_PER_SAMPLE: u32 = 16;

#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("failed to open audio file: {0}")]
    Io(#[from] std::io::Error),
    #[error("codec error: {0}")]
    Codec(#[from] symphonia::core::errors::Error),
    #[error("no audio tracks found")]
    NoAudioTrack,
    #[error("unknown sample rate")]
    UnknownSampleRate,
    #[error("channel count changed mid-stream from {expected} to {found}")]
    ChannelLayoutChanged { expected: usize, found: usize },
    #[error("decoded signal is empty")]
    Empty,
    #[error(transparent)]
    InvalidSignal(#[from] AnalysisError),
}

/// Output of the codec: samples plus what the container says about them.
#[derive(Debug, Clone)]
pub struct DecodedAudio {
    pub signal: Signal,
    pub tags: TrackTags,
    pub bits_per_sample: u32,
}

pub fn decode_file(path: &Path) -> Result<DecodedAudio, DecodeError> {
    let file = std::fs::File::open(path)?;
    let mss = MediaSourceStream::new(Box::new(file), Default::default());

    let mut hint = Hint::new();
    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(ext);
    }

    let mut probed = symphonia::default::get_probe().format(
        &hint,
        mss,
        &FormatOptions::default(),
        &MetadataOptions::default(),
    )?;

    // ID3 and friends live outside the container; prefer them when present.
    let mut tags = probed
        .metadata
        .get()
        .and_then(|m| m.current().map(read_tags))
        .unwrap_or_default();

    let mut format = probed.format;
    if tags.is_empty() {
        if let Some(rev) = format.metadata().current() {
            tags = read_tags(rev);
        }
    }

    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or(DecodeError::NoAudioTrack)?;

    let track_id = track.id;
    // Some streams only reveal their layout in the first decoded packet.
    let mut channels = track.codec_params.channels.map(|c| c.count());
    let sample_rate = track
        .codec_params
        .sample_rate
        .ok_or(DecodeError::UnknownSampleRate)?;
    let bits_per_sample = track
        .codec_params
        .bits_per_sample
        .unwrap_or(DEFAULT_BITS_PER_SAMPLE);
    tags.format = symphonia::default::get_codecs()
        .get_codec(track.codec_params.codec)
        .map(|d| d.short_name.to_string())
        .unwrap_or_default();

    let mut decoder =
        symphonia::default::get_codecs().make(&track.codec_params, &DecoderOptions::default())?;

    let mut all_samples: Vec<f32> = Vec::new();

    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(symphonia::core::errors::Error::IoError(ref e))
                if e.kind() == std::io::ErrorKind::UnexpectedEof =>
            {
                break;
            }
            Err(e) => return Err(e.into()),
        };

        if packet.track_id() != track_id {
            continue;
        }

        let decoded = match decoder.decode(&packet) {
            Ok(d) => d,
            Err(symphonia::core::errors::Error::DecodeError(err)) => {
                log::debug!("Skipping corrupt packet: {}", err);
                continue;
            }
            Err(e) => return Err(e.into()),
        };

        let spec = *decoded.spec();
        check_layout(&mut channels, spec.channels.count())?;

        let mut sample_buf = SampleBuffer::<f32>::new(decoded.frames() as u64, spec);
        sample_buf.copy_interleaved_ref(decoded);
        all_samples.extend_from_slice(sample_buf.samples());
    }

    let channels = match channels {
        Some(channels) if !all_samples.is_empty() => channels,
        _ => return Err(DecodeError::Empty),
    };

    let signal = Signal::new(all_samples, sample_rate, channels)?;

    log::info!(
        "Decoded audio: {} frames x {} channels, {}Hz, {:.1}s",
        signal.len(),
        channels,
        sample_rate,
        signal.duration_secs()
    );

    Ok(DecodedAudio {
        signal,
        tags,
        bits_per_sample,
    })
}

/// Fix the channel count on first sight, then reject any change.
fn check_layout(channels: &mut Option<usize>, found: usize) -> Result<(), DecodeError> {
    match *channels {
        Some(expected) if expected != found => {
            Err(DecodeError::ChannelLayoutChanged { expected, found })
        }
        Some(_) => Ok(()),
        None => {
            *channels = Some(found);
            Ok(())
        }
    }
}

fn read_tags(rev: &MetadataRevision) -> TrackTags {
    let mut tags = TrackTags::default();
    for tag in rev.tags() {
        let value = tag.value.to_string();
        match tag.std_key {
            Some(StandardTagKey::TrackTitle) => tags.title = value,
            Some(StandardTagKey::Artist) => tags.artist = value,
            Some(StandardTagKey::Album) => tags.album = value,
            Some(StandardTagKey::Date) | Some(StandardTagKey::ReleaseDate) => {
                if tags.year.is_none() {
                    tags.year = parse_year(&value);
                }
            }
            _ => {}
        }
    }
    tags
}

/// Leading four-digit year of a date tag ("1999", "1999-04-01").
fn parse_year(value: &str) -> Option<i32> {
    value.trim().get(..4)?.parse().ok()
}
