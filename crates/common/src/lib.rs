use serde::{Deserialize, Serialize};

#[cfg(any(test, feature = "fixtures"))]
pub mod fixtures;

pub const UNKNOWN_ARTIST: &str = "Unknown Artist";
pub const DEFAULT_ALBUM: &str = "Local Music";
pub const UNKNOWN_CODEC: &str = "Unknown";

const HI_RES_SAMPLE_RATE: u32 = 96_000;
const HQ_SAMPLE_RATE: u32 = 44_100;
const CD_BIT_DEPTH: u32 = 16;
const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// One playable file as the player UI consumes it.
///
/// Built fresh for every listing request; `id` is the file's 1-based position
/// in the filtered directory listing and is never renumbered after failures
/// are dropped, so ids in a response may have gaps.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SongDescriptor {
    pub id: u32,
    pub name: String,
    pub artists: String,
    pub album: String,
    pub alias: String,
    pub cover: String,
    pub duration_ms: u64,
    #[serde(rename = "sizeMB")]
    pub size_mb: f64,
    pub path: String,
    pub quality: Quality,
    #[serde(rename = "type")]
    pub kind: SongKind,
    pub bitrate_kbps: u32,
    pub sample_rate: u32,
    pub bits_per_sample: u32,
    pub codec: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Quality {
    #[serde(rename = "SQ")]
    Standard,
    #[serde(rename = "HQ")]
    High,
    #[serde(rename = "Hi-Res")]
    HiRes,
}

impl Quality {
    pub fn label(self) -> &'static str {
        match self {
            Quality::Standard => "SQ",
            Quality::High => "HQ",
            Quality::HiRes => "Hi-Res",
        }
    }
}

impl std::fmt::Display for Quality {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SongKind {
    #[default]
    Song,
}

/// Quality tier from sample rate and bit depth. A bit depth above 16 is
/// Hi-Res regardless of the sample rate.
pub fn classify_quality(sample_rate: u32, bits_per_sample: u32) -> Quality {
    if sample_rate >= HI_RES_SAMPLE_RATE || bits_per_sample > CD_BIT_DEPTH {
        Quality::HiRes
    } else if sample_rate >= HQ_SAMPLE_RATE {
        Quality::High
    } else {
        Quality::Standard
    }
}

pub fn size_in_mb(bytes: u64) -> f64 {
    let mb = bytes as f64 / BYTES_PER_MB;
    (mb * 100.0).round() / 100.0
}

pub fn join_url_path(prefix: &str, name: &str) -> String {
    let prefix = prefix.trim_end_matches('/');
    format!("{}/{}", prefix, name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_reference_points() {
        assert_eq!(classify_quality(96_000, 16), Quality::HiRes);
        assert_eq!(classify_quality(44_100, 16), Quality::High);
        assert_eq!(classify_quality(22_050, 16), Quality::Standard);
        assert_eq!(classify_quality(44_100, 24), Quality::HiRes);
    }

    #[test]
    fn classifies_unknown_properties_as_standard() {
        assert_eq!(classify_quality(0, 0), Quality::Standard);
        assert_eq!(classify_quality(48_000, 0), Quality::High);
        assert_eq!(classify_quality(0, 24), Quality::HiRes);
    }

    #[test]
    fn quality_label_matches_wire_name() {
        for quality in [Quality::Standard, Quality::High, Quality::HiRes] {
            let wire = serde_json::to_value(quality).unwrap();
            assert_eq!(wire, serde_json::Value::String(quality.to_string()));
        }
        assert_eq!(Quality::HiRes.label(), "Hi-Res");
    }

    #[test]
    fn rounds_size_to_two_decimals() {
        assert_eq!(size_in_mb(0), 0.0);
        assert_eq!(size_in_mb(1024 * 1024), 1.0);
        assert_eq!(size_in_mb(5_000_000), 4.77);
    }

    #[test]
    fn joins_url_paths_without_double_slash() {
        assert_eq!(join_url_path("/localmusic", "a.mp3"), "/localmusic/a.mp3");
        assert_eq!(join_url_path("/localmusic/", "a.mp3"), "/localmusic/a.mp3");
    }

    #[test]
    fn serializes_wire_field_names() {
        let song = SongDescriptor {
            id: 3,
            name: "Track".to_string(),
            artists: UNKNOWN_ARTIST.to_string(),
            album: DEFAULT_ALBUM.to_string(),
            alias: String::new(),
            cover: "/images/song.jpg".to_string(),
            duration_ms: 1500,
            size_mb: 1.25,
            path: "/localmusic/track.flac".to_string(),
            quality: Quality::HiRes,
            kind: SongKind::Song,
            bitrate_kbps: 900,
            sample_rate: 96_000,
            bits_per_sample: 24,
            codec: "flac".to_string(),
        };
        let value = serde_json::to_value(&song).unwrap();
        assert_eq!(value["id"], 3);
        assert_eq!(value["durationMs"], 1500);
        assert_eq!(value["sizeMB"], 1.25);
        assert_eq!(value["quality"], "Hi-Res");
        assert_eq!(value["type"], "song");
        assert_eq!(value["bitrateKbps"], 900);
        assert_eq!(value["sampleRate"], 96_000);
        assert_eq!(value["bitsPerSample"], 24);
    }
}
