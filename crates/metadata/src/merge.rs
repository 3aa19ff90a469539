//! First-present-wins merging of the two metadata sources.
//!
//! Each output field has an ordered chain of `(Source, Extractor)` pairs.
//! The chain is walked until an extractor yields a present value; anything
//! that falls through uses the field's literal default. Adding a field or a
//! source means adding a chain entry, not another nested conditional.

use common::{DEFAULT_ALBUM, UNKNOWN_ARTIST, UNKNOWN_CODEC};
use tracing::trace;

use crate::{FormatInfo, PrimaryTags};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    Primary,
    Secondary,
}

/// Both views of one file, borrowed for the duration of a merge.
#[derive(Debug, Clone, Copy)]
pub struct Sources<'a> {
    pub primary: &'a PrimaryTags,
    pub secondary: &'a FormatInfo,
}

pub type Extractor<T> = fn(&Sources<'_>) -> Option<T>;

/// Whether a value counts as "found". Blank strings and zero numbers fall
/// through to the next source.
pub trait Presence {
    fn is_present(&self) -> bool;
}

impl Presence for String {
    fn is_present(&self) -> bool {
        !self.trim().is_empty()
    }
}

impl Presence for u32 {
    fn is_present(&self) -> bool {
        *self != 0
    }
}

impl Presence for u64 {
    fn is_present(&self) -> bool {
        *self != 0
    }
}

impl Presence for f64 {
    fn is_present(&self) -> bool {
        self.is_finite() && *self > 0.0
    }
}

pub fn first_present<T: Presence>(
    sources: &Sources<'_>,
    chain: &[(Source, Extractor<T>)],
) -> Option<(Source, T)> {
    chain.iter().find_map(|(source, extract)| {
        extract(sources)
            .filter(Presence::is_present)
            .map(|value| (*source, value))
    })
}

const TITLE: &[(Source, Extractor<String>)] = &[
    (Source::Primary, primary_title),
    (Source::Secondary, secondary_title),
];

const ARTISTS: &[(Source, Extractor<String>)] = &[
    (Source::Primary, primary_first_performer),
    (Source::Secondary, secondary_first_artist),
    (Source::Secondary, secondary_artist),
];

const ALBUM: &[(Source, Extractor<String>)] = &[
    (Source::Primary, primary_album),
    (Source::Secondary, secondary_album),
];

const ALIAS: &[(Source, Extractor<String>)] = &[(Source::Secondary, secondary_first_comment)];

const SAMPLE_RATE: &[(Source, Extractor<u32>)] = &[
    (Source::Primary, primary_sample_rate),
    (Source::Secondary, secondary_sample_rate),
];

const BITS_PER_SAMPLE: &[(Source, Extractor<u32>)] = &[
    (Source::Primary, primary_bits_per_sample),
    (Source::Secondary, secondary_bits_per_sample),
];

const BITRATE: &[(Source, Extractor<u64>)] = &[(Source::Secondary, secondary_bitrate)];

const CODEC: &[(Source, Extractor<String>)] = &[
    (Source::Secondary, secondary_codec),
    (Source::Primary, primary_first_codec),
];

const DURATION: &[(Source, Extractor<f64>)] = &[(Source::Secondary, secondary_duration)];

/// Field values after the fallback chains have been applied.
#[derive(Debug, Clone, PartialEq)]
pub struct MergedFields {
    pub title: String,
    pub artists: String,
    pub album: String,
    pub alias: String,
    pub sample_rate: u32,
    pub bits_per_sample: u32,
    pub bitrate_kbps: u32,
    pub codec: String,
    pub duration_ms: u64,
}

/// Merges both views of a file. `file_stem` is the last-resort title.
pub fn merge_fields(primary: &PrimaryTags, secondary: &FormatInfo, file_stem: &str) -> MergedFields {
    let sources = Sources { primary, secondary };

    let title = resolve_string(&sources, "title", TITLE, file_stem);
    let artists = resolve_string(&sources, "artists", ARTISTS, UNKNOWN_ARTIST);
    let album = resolve_string(&sources, "album", ALBUM, DEFAULT_ALBUM);
    let alias = resolve_string(&sources, "alias", ALIAS, "");
    let codec = resolve_string(&sources, "codec", CODEC, UNKNOWN_CODEC);

    let sample_rate = first_present(&sources, SAMPLE_RATE).map_or(0, |(_, value)| value);
    let bits_per_sample = first_present(&sources, BITS_PER_SAMPLE).map_or(0, |(_, value)| value);
    let bitrate_kbps = first_present(&sources, BITRATE)
        .map_or(0, |(_, bps)| u32::try_from(bps / 1000).unwrap_or(u32::MAX));
    let duration_ms = first_present(&sources, DURATION)
        .map_or(0, |(_, secs)| (secs * 1000.0).floor() as u64);

    MergedFields {
        title,
        artists,
        album,
        alias,
        sample_rate,
        bits_per_sample,
        bitrate_kbps,
        codec,
        duration_ms,
    }
}

fn resolve_string(
    sources: &Sources<'_>,
    field: &str,
    chain: &[(Source, Extractor<String>)],
    fallback: &str,
) -> String {
    match first_present(sources, chain) {
        Some((source, value)) => {
            trace!(field, ?source, "field resolved");
            value
        }
        None => fallback.to_string(),
    }
}

fn primary_title(sources: &Sources<'_>) -> Option<String> {
    sources.primary.title.clone()
}

fn primary_first_performer(sources: &Sources<'_>) -> Option<String> {
    sources.primary.performers.first().cloned()
}

fn primary_album(sources: &Sources<'_>) -> Option<String> {
    sources.primary.album.clone()
}

fn primary_sample_rate(sources: &Sources<'_>) -> Option<u32> {
    sources.primary.sample_rate
}

fn primary_bits_per_sample(sources: &Sources<'_>) -> Option<u32> {
    sources.primary.bits_per_sample
}

fn primary_first_codec(sources: &Sources<'_>) -> Option<String> {
    sources.primary.codecs.first().cloned()
}

fn secondary_title(sources: &Sources<'_>) -> Option<String> {
    sources.secondary.title.clone()
}

fn secondary_first_artist(sources: &Sources<'_>) -> Option<String> {
    sources.secondary.artists.first().cloned()
}

fn secondary_artist(sources: &Sources<'_>) -> Option<String> {
    sources.secondary.artist.clone()
}

fn secondary_album(sources: &Sources<'_>) -> Option<String> {
    sources.secondary.album.clone()
}

fn secondary_first_comment(sources: &Sources<'_>) -> Option<String> {
    sources.secondary.comments.first().cloned()
}

fn secondary_sample_rate(sources: &Sources<'_>) -> Option<u32> {
    sources.secondary.sample_rate
}

fn secondary_bits_per_sample(sources: &Sources<'_>) -> Option<u32> {
    sources.secondary.bits_per_sample
}

fn secondary_bitrate(sources: &Sources<'_>) -> Option<u64> {
    sources.secondary.bitrate
}

fn secondary_codec(sources: &Sources<'_>) -> Option<String> {
    sources.secondary.codec.clone()
}

fn secondary_duration(sources: &Sources<'_>) -> Option<f64> {
    sources.secondary.duration_secs
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tagged_primary() -> PrimaryTags {
        PrimaryTags {
            title: Some("Primary Title".to_string()),
            performers: vec!["Primary Artist".to_string(), "Guest".to_string()],
            album: Some("Primary Album".to_string()),
            sample_rate: Some(48_000),
            bits_per_sample: Some(24),
            codecs: vec!["FLAC".to_string()],
            picture: None,
        }
    }

    fn tagged_secondary() -> FormatInfo {
        FormatInfo {
            title: Some("Secondary Title".to_string()),
            artists: vec!["Split One".to_string(), "Split Two".to_string()],
            artist: Some("Split One / Split Two".to_string()),
            album: Some("Secondary Album".to_string()),
            comments: vec!["first comment".to_string(), "second".to_string()],
            codec: Some("flac".to_string()),
            sample_rate: Some(44_100),
            bits_per_sample: Some(16),
            channels: Some(2),
            duration_secs: Some(215.4567),
            bitrate: Some(912_999),
            picture: None,
        }
    }

    #[test]
    fn primary_wins_for_tag_fields() {
        let merged = merge_fields(&tagged_primary(), &tagged_secondary(), "file");
        assert_eq!(merged.title, "Primary Title");
        assert_eq!(merged.artists, "Primary Artist");
        assert_eq!(merged.album, "Primary Album");
        assert_eq!(merged.sample_rate, 48_000);
        assert_eq!(merged.bits_per_sample, 24);
    }

    #[test]
    fn secondary_wins_for_decode_fields() {
        let merged = merge_fields(&tagged_primary(), &tagged_secondary(), "file");
        assert_eq!(merged.codec, "flac");
        assert_eq!(merged.bitrate_kbps, 912);
        assert_eq!(merged.duration_ms, 215_456);
        assert_eq!(merged.alias, "first comment");
    }

    #[test]
    fn falls_back_to_secondary_when_primary_is_blank() {
        let primary = PrimaryTags {
            title: Some("   ".to_string()),
            performers: Vec::new(),
            album: None,
            sample_rate: Some(0),
            bits_per_sample: None,
            ..tagged_primary()
        };
        let merged = merge_fields(&primary, &tagged_secondary(), "file");
        assert_eq!(merged.title, "Secondary Title");
        assert_eq!(merged.artists, "Split One");
        assert_eq!(merged.album, "Secondary Album");
        assert_eq!(merged.sample_rate, 44_100);
        assert_eq!(merged.bits_per_sample, 16);
    }

    #[test]
    fn uses_whole_artist_tag_when_split_list_is_empty() {
        let secondary = FormatInfo {
            artists: Vec::new(),
            artist: Some("Only Whole".to_string()),
            ..tagged_secondary()
        };
        let merged = merge_fields(&PrimaryTags::default(), &secondary, "file");
        assert_eq!(merged.artists, "Only Whole");
    }

    #[test]
    fn uses_literal_defaults_when_nothing_is_known() {
        let merged = merge_fields(&PrimaryTags::default(), &FormatInfo::default(), "02 - Untitled");
        assert_eq!(merged.title, "02 - Untitled");
        assert_eq!(merged.artists, UNKNOWN_ARTIST);
        assert_eq!(merged.album, DEFAULT_ALBUM);
        assert_eq!(merged.alias, "");
        assert_eq!(merged.codec, UNKNOWN_CODEC);
        assert_eq!(merged.sample_rate, 0);
        assert_eq!(merged.bits_per_sample, 0);
        assert_eq!(merged.bitrate_kbps, 0);
        assert_eq!(merged.duration_ms, 0);
    }

    #[test]
    fn codec_falls_back_to_primary_label() {
        let secondary = FormatInfo {
            codec: None,
            ..tagged_secondary()
        };
        let merged = merge_fields(&tagged_primary(), &secondary, "file");
        assert_eq!(merged.codec, "FLAC");
    }

    #[test]
    fn first_present_reports_the_winning_source() {
        let primary = PrimaryTags::default();
        let secondary = tagged_secondary();
        let sources = Sources {
            primary: &primary,
            secondary: &secondary,
        };
        let hit = first_present(&sources, TITLE);
        assert_eq!(hit, Some((Source::Secondary, "Secondary Title".to_string())));
        assert_eq!(first_present::<String>(&sources, &[]), None);
    }
}
