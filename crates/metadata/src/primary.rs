use std::path::Path;

use lofty::file::{FileType, TaggedFile};
use lofty::prelude::{AudioFile, ItemKey, TaggedFileExt};
use lofty::tag::Tag;

use crate::{EmbeddedPicture, MetadataError};

/// What the tag reader sees in a file: container tag fields plus the audio
/// properties lofty derives from the stream headers.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct PrimaryTags {
    pub title: Option<String>,
    pub performers: Vec<String>,
    pub album: Option<String>,
    pub sample_rate: Option<u32>,
    pub bits_per_sample: Option<u32>,
    pub codecs: Vec<String>,
    pub picture: Option<EmbeddedPicture>,
}

/// Reads tags and audio properties with lofty.
///
/// The tagged file lives only inside this call; everything the caller needs is
/// copied out, so the underlying handle is released on every return path.
pub fn read_primary(path: &Path) -> Result<PrimaryTags, MetadataError> {
    let tagged_file = lofty::read_from_path(path)?;
    let properties = tagged_file.properties();

    let mut info = PrimaryTags {
        sample_rate: properties.sample_rate(),
        bits_per_sample: properties.bit_depth().map(u32::from),
        codecs: vec![codec_label(tagged_file.file_type())],
        ..PrimaryTags::default()
    };

    for tag in ordered_tags(&tagged_file) {
        if info.title.is_none() {
            info.title = non_empty(tag.get_string(&ItemKey::TrackTitle));
        }
        if info.performers.is_empty() {
            info.performers = tag
                .get_strings(&ItemKey::TrackArtist)
                .map(str::trim)
                .filter(|value| !value.is_empty())
                .map(str::to_string)
                .collect();
        }
        if info.album.is_none() {
            info.album = non_empty(tag.get_string(&ItemKey::AlbumTitle));
        }
        if info.picture.is_none() {
            info.picture = tag.pictures().first().map(|picture| EmbeddedPicture {
                data: picture.data().to_vec(),
                mime: picture.mime_type().map(|mime| mime.as_str().to_string()),
            });
        }
    }

    Ok(info)
}

// Primary tag first, then whatever other tag formats the file carries, so a
// field missing from the preferred tag can still come from e.g. RIFF INFO.
fn ordered_tags(tagged_file: &TaggedFile) -> Vec<&Tag> {
    let primary_type = tagged_file.primary_tag_type();
    let mut tags: Vec<&Tag> = tagged_file
        .tags()
        .iter()
        .filter(|tag| tag.tag_type() == primary_type)
        .collect();
    tags.extend(
        tagged_file
            .tags()
            .iter()
            .filter(|tag| tag.tag_type() != primary_type),
    );
    tags
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

fn codec_label(file_type: FileType) -> String {
    match file_type {
        FileType::Mpeg => "MPEG Audio".to_string(),
        FileType::Flac => "FLAC".to_string(),
        FileType::Wav => "WAV".to_string(),
        FileType::Mp4 => "MPEG-4 Audio".to_string(),
        FileType::Aac => "AAC".to_string(),
        other => format!("{:?}", other),
    }
}
