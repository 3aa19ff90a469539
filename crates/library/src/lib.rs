//! Scanning a flat music directory into [`SongDescriptor`]s.
//!
//! Nothing here keeps state between calls: every scan lists the directory
//! again and every descriptor is rebuilt from the file itself.

use std::fs;
use std::path::{Path, PathBuf};

use common::{classify_quality, join_url_path, size_in_mb, SongDescriptor, SongKind};
use metadata::{
    merge_fields, read_primary, read_secondary, resolve_cover, resolve_primary_cover,
    MetadataError, DEFAULT_PLACEHOLDER,
};
use tracing::{debug, warn};
use walkdir::WalkDir;

pub const AUDIO_EXTENSIONS: [&str; 4] = ["mp3", "flac", "wav", "m4a"];
pub const DEFAULT_STATIC_PREFIX: &str = "/localmusic";

/// Everything a scan needs to know, passed explicitly into each call.
#[derive(Clone, Debug)]
pub struct LibraryOptions {
    pub root: PathBuf,
    /// URL prefix under which the root's files are served.
    pub static_prefix: String,
    pub placeholder_cover: String,
}

impl LibraryOptions {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            static_prefix: DEFAULT_STATIC_PREFIX.to_string(),
            placeholder_cover: DEFAULT_PLACEHOLDER.to_string(),
        }
    }
}

/// An eligible file and its 1-based position in the filtered listing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScanEntry {
    pub id: u32,
    pub file_name: String,
}

#[derive(Debug)]
pub enum LibraryError {
    DirectoryNotFound(PathBuf),
    NotADirectory(PathBuf),
    Io(std::io::Error),
}

impl std::fmt::Display for LibraryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LibraryError::DirectoryNotFound(path) => {
                write!(f, "music directory not found: {}", path.display())
            }
            LibraryError::NotADirectory(path) => {
                write!(f, "music root is not a directory: {}", path.display())
            }
            LibraryError::Io(err) => write!(f, "io error: {}", err),
        }
    }
}

impl std::error::Error for LibraryError {}

impl From<std::io::Error> for LibraryError {
    fn from(err: std::io::Error) -> Self {
        LibraryError::Io(err)
    }
}

/// Failure to turn one file into a descriptor. The batch drops the file and
/// carries on.
#[derive(Debug)]
pub enum SongError {
    Stat(std::io::Error),
    Metadata(MetadataError),
}

impl std::fmt::Display for SongError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SongError::Stat(err) => write!(f, "stat failed: {}", err),
            SongError::Metadata(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for SongError {}

impl From<std::io::Error> for SongError {
    fn from(err: std::io::Error) -> Self {
        SongError::Stat(err)
    }
}

impl From<MetadataError> for SongError {
    fn from(err: MetadataError) -> Self {
        SongError::Metadata(err)
    }
}

#[derive(Debug)]
pub enum CoverLookupError {
    InvalidName(String),
    FileNotFound(PathBuf),
    Metadata(MetadataError),
}

impl std::fmt::Display for CoverLookupError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CoverLookupError::InvalidName(name) => write!(f, "invalid file name: {:?}", name),
            CoverLookupError::FileNotFound(path) => {
                write!(f, "file not found: {}", path.display())
            }
            CoverLookupError::Metadata(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for CoverLookupError {}

impl From<MetadataError> for CoverLookupError {
    fn from(err: MetadataError) -> Self {
        CoverLookupError::Metadata(err)
    }
}

/// Lists the eligible audio files directly inside `root`, in the order the
/// filesystem enumerates them, and numbers them from 1.
pub fn scan_dir(root: &Path) -> Result<Vec<ScanEntry>, LibraryError> {
    if !root.exists() {
        return Err(LibraryError::DirectoryNotFound(root.to_path_buf()));
    }
    if !root.is_dir() {
        return Err(LibraryError::NotADirectory(root.to_path_buf()));
    }

    let mut entries = Vec::new();
    for entry in WalkDir::new(root)
        .follow_links(true)
        .min_depth(1)
        .max_depth(1)
    {
        // An eligible name that cannot be inspected (e.g. a dangling symlink)
        // keeps its position and fails later when the file is opened.
        let name = match entry {
            Ok(entry) if entry.file_type().is_file() => entry.file_name().to_owned(),
            Ok(_) => continue,
            Err(err) if err.depth() == 0 => return Err(LibraryError::Io(err.into())),
            Err(err) => match err.path().and_then(Path::file_name) {
                Some(name) => {
                    debug!("Unreadable entry {:?}: {}", name, err);
                    name.to_owned()
                }
                None => {
                    warn!("Skipping unreadable entry: {}", err);
                    continue;
                }
            },
        };
        let Some(file_name) = name.to_str() else {
            debug!("Skipping non UTF-8 file name: {:?}", name);
            continue;
        };
        if !is_audio_file(file_name) {
            continue;
        }
        entries.push(ScanEntry {
            id: entries.len() as u32 + 1,
            file_name: file_name.to_string(),
        });
    }
    Ok(entries)
}

pub fn is_audio_file(file_name: &str) -> bool {
    let Some(ext) = Path::new(file_name).extension().and_then(|ext| ext.to_str()) else {
        return false;
    };
    AUDIO_EXTENSIONS
        .iter()
        .any(|allowed| ext.eq_ignore_ascii_case(allowed))
}

/// Builds the descriptor for one scanned file. Both metadata readers must
/// succeed; either failing fails the whole file.
pub fn build_song(options: &LibraryOptions, entry: &ScanEntry) -> Result<SongDescriptor, SongError> {
    let path = options.root.join(&entry.file_name);
    let file_size = fs::metadata(&path)?.len();

    let primary = read_primary(&path)?;
    let secondary = read_secondary(&path)?;

    let fields = merge_fields(&primary, &secondary, &file_stem(&entry.file_name));
    let cover = resolve_cover(
        primary.picture.as_ref(),
        secondary.picture.as_ref(),
        &options.placeholder_cover,
    );

    Ok(SongDescriptor {
        id: entry.id,
        name: fields.title,
        artists: fields.artists,
        album: fields.album,
        alias: fields.alias,
        cover,
        duration_ms: fields.duration_ms,
        size_mb: size_in_mb(file_size),
        path: join_url_path(&options.static_prefix, &entry.file_name),
        quality: classify_quality(fields.sample_rate, fields.bits_per_sample),
        kind: SongKind::Song,
        bitrate_kbps: fields.bitrate_kbps,
        sample_rate: fields.sample_rate,
        bits_per_sample: fields.bits_per_sample,
        codec: fields.codec,
    })
}

/// Cover for a single file, read with the tag reader only.
pub fn lookup_cover(options: &LibraryOptions, file_name: &str) -> Result<String, CoverLookupError> {
    if !is_plain_file_name(file_name) {
        return Err(CoverLookupError::InvalidName(file_name.to_string()));
    }
    let path = options.root.join(file_name);
    if !path.is_file() {
        return Err(CoverLookupError::FileNotFound(path));
    }
    let primary = read_primary(&path)?;
    Ok(resolve_primary_cover(
        primary.picture.as_ref(),
        &options.placeholder_cover,
    ))
}

// Exactly one normal path component: no separators, no `.`/`..`, not empty.
fn is_plain_file_name(file_name: &str) -> bool {
    let mut components = Path::new(file_name).components();
    matches!(
        (components.next(), components.next()),
        (Some(std::path::Component::Normal(_)), None)
    ) && !file_name.contains(['/', '\\'])
}

fn file_stem(file_name: &str) -> String {
    Path::new(file_name)
        .file_stem()
        .map(|stem| stem.to_string_lossy().to_string())
        .unwrap_or_else(|| file_name.to_string())
}
