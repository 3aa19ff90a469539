use std::fs::File;
use std::path::Path;

use symphonia::core::codecs::{CodecParameters, CODEC_TYPE_NULL};
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::{MetadataOptions, MetadataRevision, StandardTagKey};
use symphonia::core::probe::Hint;

use crate::{EmbeddedPicture, MetadataError};

const ARTIST_SEPARATORS: &[char] = &['/', ';', '\0'];

/// What the format parser sees in a file: its own view of the tags plus the
/// decode-level stream properties.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct FormatInfo {
    pub title: Option<String>,
    /// Individual artist names, split out of every artist tag.
    pub artists: Vec<String>,
    /// First artist tag exactly as written.
    pub artist: Option<String>,
    pub album: Option<String>,
    pub comments: Vec<String>,
    pub picture: Option<EmbeddedPicture>,
    pub codec: Option<String>,
    pub sample_rate: Option<u32>,
    pub bits_per_sample: Option<u32>,
    pub channels: Option<u32>,
    pub duration_secs: Option<f64>,
    /// Bits per second: exact for PCM, otherwise averaged over the file.
    pub bitrate: Option<u64>,
}

pub fn read_secondary(path: &Path) -> Result<FormatInfo, MetadataError> {
    let file = File::open(path)?;
    let file_size = file.metadata()?.len();
    let mss = MediaSourceStream::new(Box::new(file), Default::default());

    let mut hint = Hint::new();
    if let Some(ext) = path.extension().and_then(|ext| ext.to_str()) {
        hint.with_extension(ext);
    }

    let mut probed = symphonia::default::get_probe().format(
        &hint,
        mss,
        &FormatOptions::default(),
        &MetadataOptions::default(),
    )?;

    let mut info = FormatInfo::default();

    {
        let metadata = probed.format.metadata();
        if let Some(revision) = metadata.current() {
            absorb_revision(&mut info, revision);
        }
    }
    // ID3v2 and similar leading tags are found by the probe, not the reader.
    if let Some(metadata) = probed.metadata.get() {
        if let Some(revision) = metadata.current() {
            absorb_revision(&mut info, revision);
        }
    }

    let track = probed.format.default_track().or_else(|| {
        probed
            .format
            .tracks()
            .iter()
            .find(|track| track.codec_params.codec != CODEC_TYPE_NULL)
    });
    if let Some(track) = track {
        absorb_codec_params(&mut info, &track.codec_params, file_size);
    }

    Ok(info)
}

fn absorb_revision(info: &mut FormatInfo, revision: &MetadataRevision) {
    for tag in revision.tags() {
        let value = tag.value.to_string();
        // RIFF INFO values keep their NUL terminator.
        let value = value.trim_matches(|ch: char| ch.is_whitespace() || ch == '\0');
        if value.is_empty() {
            continue;
        }
        match tag.std_key {
            Some(StandardTagKey::TrackTitle) if info.title.is_none() => {
                info.title = Some(value.to_string());
            }
            Some(StandardTagKey::Artist) => {
                if info.artist.is_none() {
                    info.artist = Some(value.to_string());
                }
                info.artists.extend(split_artists(value));
            }
            Some(StandardTagKey::Album) if info.album.is_none() => {
                info.album = Some(value.to_string());
            }
            Some(StandardTagKey::Comment) => info.comments.push(value.to_string()),
            _ => {}
        }
    }

    if info.picture.is_none() {
        info.picture = revision.visuals().first().map(|visual| EmbeddedPicture {
            data: visual.data.to_vec(),
            mime: Some(visual.media_type.clone()),
        });
    }
}

fn absorb_codec_params(info: &mut FormatInfo, params: &CodecParameters, file_size: u64) {
    let codec_name = symphonia::default::get_codecs()
        .get_codec(params.codec)
        .map(|descriptor| descriptor.short_name);

    info.codec = codec_name.map(str::to_string);
    info.sample_rate = params.sample_rate;
    info.bits_per_sample = params.bits_per_sample;
    info.channels = params.channels.map(|channels| channels.count() as u32);
    info.duration_secs = duration_secs(params);

    let is_pcm = codec_name.is_some_and(|name| name.starts_with("pcm_"));
    let exact = if is_pcm { pcm_bitrate(info) } else { None };
    info.bitrate =
        exact.or_else(|| average_bitrate(audio_payload_bytes(file_size, info), info.duration_secs));
}

/// File size minus the artwork the parser saw. Remaining tag bytes are still
/// counted, so averages for heavily tagged files run slightly high.
fn audio_payload_bytes(file_size: u64, info: &FormatInfo) -> u64 {
    let art = info
        .picture
        .as_ref()
        .map_or(0, |picture| picture.data.len() as u64);
    file_size.saturating_sub(art)
}

fn duration_secs(params: &CodecParameters) -> Option<f64> {
    let frames = params.n_frames?;
    if let Some(time_base) = params.time_base {
        let time = time_base.calc_time(frames);
        return Some(time.seconds as f64 + time.frac);
    }
    let sample_rate = params.sample_rate.filter(|rate| *rate > 0)?;
    Some(frames as f64 / f64::from(sample_rate))
}

fn pcm_bitrate(info: &FormatInfo) -> Option<u64> {
    let bits = u64::from(info.bits_per_sample?);
    let rate = u64::from(info.sample_rate?);
    let channels = u64::from(info.channels?);
    Some(bits * rate * channels).filter(|bitrate| *bitrate > 0)
}

fn average_bitrate(file_size: u64, duration_secs: Option<f64>) -> Option<u64> {
    let duration = duration_secs.filter(|secs| *secs > 0.0)?;
    Some((file_size as f64 * 8.0 / duration) as u64)
}

fn split_artists(value: &str) -> impl Iterator<Item = String> + '_ {
    value
        .split(ARTIST_SEPARATORS)
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
}
