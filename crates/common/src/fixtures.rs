//! Synthetic audio files for tests. Only built with the `fixtures` feature.

use std::fs;
use std::io;
use std::path::Path;

use lofty::config::WriteOptions;
use lofty::error::LoftyError;
use lofty::picture::{MimeType, Picture, PictureType};
use lofty::prelude::TagExt;
use lofty::tag::{Tag, TagType};

/// Shape of a silent PCM WAV file, optionally carrying RIFF INFO tags.
#[derive(Debug, Clone)]
pub struct WavSpec<'a> {
    pub sample_rate: u32,
    pub bits_per_sample: u16,
    pub channels: u16,
    pub frames: u32,
    pub title: Option<&'a str>,
    pub artist: Option<&'a str>,
    pub album: Option<&'a str>,
    pub comment: Option<&'a str>,
}

impl Default for WavSpec<'_> {
    fn default() -> Self {
        Self {
            sample_rate: 44_100,
            bits_per_sample: 16,
            channels: 2,
            frames: 44_100,
            title: None,
            artist: None,
            album: None,
            comment: None,
        }
    }
}

pub fn write_wav(path: &Path, spec: &WavSpec<'_>) -> io::Result<()> {
    fs::write(path, wav_bytes(spec))
}

pub fn wav_bytes(spec: &WavSpec<'_>) -> Vec<u8> {
    let block_align = u32::from(spec.channels) * u32::from(spec.bits_per_sample / 8);
    let byte_rate = spec.sample_rate * block_align;
    let data_len = spec.frames * block_align;

    let mut body = Vec::new();
    body.extend_from_slice(b"WAVE");

    body.extend_from_slice(b"fmt ");
    body.extend_from_slice(&16u32.to_le_bytes());
    body.extend_from_slice(&1u16.to_le_bytes());
    body.extend_from_slice(&spec.channels.to_le_bytes());
    body.extend_from_slice(&spec.sample_rate.to_le_bytes());
    body.extend_from_slice(&byte_rate.to_le_bytes());
    body.extend_from_slice(&(block_align as u16).to_le_bytes());
    body.extend_from_slice(&spec.bits_per_sample.to_le_bytes());

    let info = info_chunk(spec);
    if !info.is_empty() {
        body.extend_from_slice(b"LIST");
        body.extend_from_slice(&(info.len() as u32).to_le_bytes());
        body.extend_from_slice(&info);
    }

    body.extend_from_slice(b"data");
    body.extend_from_slice(&data_len.to_le_bytes());
    body.resize(body.len() + data_len as usize, 0);

    let mut out = Vec::with_capacity(body.len() + 8);
    out.extend_from_slice(b"RIFF");
    out.extend_from_slice(&(body.len() as u32).to_le_bytes());
    out.extend_from_slice(&body);
    out
}

fn info_chunk(spec: &WavSpec<'_>) -> Vec<u8> {
    let fields = [
        (b"INAM", spec.title),
        (b"IART", spec.artist),
        (b"IPRD", spec.album),
        (b"ICMT", spec.comment),
    ];
    let mut entries = Vec::new();
    for (id, value) in fields {
        let Some(value) = value else {
            continue;
        };
        let mut text = value.as_bytes().to_vec();
        text.push(0);
        entries.extend_from_slice(id);
        entries.extend_from_slice(&(text.len() as u32).to_le_bytes());
        entries.extend_from_slice(&text);
        if text.len() % 2 == 1 {
            entries.push(0);
        }
    }
    if entries.is_empty() {
        return entries;
    }
    let mut chunk = b"INFO".to_vec();
    chunk.extend_from_slice(&entries);
    chunk
}

/// Attaches a front cover to an existing file in an ID3v2 tag. The mime label
/// is stored exactly as given, so nonstandard labels like `jpg` survive.
pub fn embed_picture(path: &Path, mime: &str, data: &[u8]) -> Result<(), LoftyError> {
    let mut tag = Tag::new(TagType::Id3v2);
    tag.push_picture(Picture::new_unchecked(
        PictureType::CoverFront,
        Some(MimeType::from_str(mime)),
        None,
        data.to_vec(),
    ));
    tag.save_to_path(path, WriteOptions::default())
}
