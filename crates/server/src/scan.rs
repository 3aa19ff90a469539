use std::sync::Arc;

use common::SongDescriptor;
use futures_util::future::join_all;
use library::{build_song, lookup_cover, scan_dir, CoverLookupError, LibraryError, LibraryOptions};
use tokio::task::{spawn_blocking, JoinError};
use tracing::{debug, info, warn};

#[derive(Debug)]
pub enum ScanError {
    Library(LibraryError),
    Join(JoinError),
}

impl std::fmt::Display for ScanError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScanError::Library(err) => write!(f, "{}", err),
            ScanError::Join(err) => write!(f, "scan task failed: {}", err),
        }
    }
}

impl std::error::Error for ScanError {}

impl From<LibraryError> for ScanError {
    fn from(err: LibraryError) -> Self {
        ScanError::Library(err)
    }
}

impl From<JoinError> for ScanError {
    fn from(err: JoinError) -> Self {
        ScanError::Join(err)
    }
}

#[derive(Debug)]
pub enum CoverTaskError {
    Lookup(CoverLookupError),
    Join(JoinError),
}

impl From<CoverLookupError> for CoverTaskError {
    fn from(err: CoverLookupError) -> Self {
        CoverTaskError::Lookup(err)
    }
}

impl From<JoinError> for CoverTaskError {
    fn from(err: JoinError) -> Self {
        CoverTaskError::Join(err)
    }
}

/// Scans the library root and builds every descriptor concurrently, one
/// blocking task per file. Waits for all of them, then keeps the successes in
/// scan order. Only a failure to list the root fails the call.
pub async fn list_songs(options: Arc<LibraryOptions>) -> Result<Vec<SongDescriptor>, ScanError> {
    let root = options.root.clone();
    let entries = spawn_blocking(move || scan_dir(&root)).await??;
    let total = entries.len();
    debug!("Found {} audio files in {}", total, options.root.display());

    let jobs = entries.into_iter().map(|entry| {
        let options = Arc::clone(&options);
        spawn_blocking(move || {
            let result = build_song(&options, &entry);
            (entry, result)
        })
    });

    let mut songs = Vec::with_capacity(total);
    for outcome in join_all(jobs).await {
        match outcome {
            Ok((_, Ok(song))) => songs.push(song),
            Ok((entry, Err(err))) => {
                warn!("Skipping {}: {}", entry.file_name, err);
            }
            Err(err) => warn!("File task failed: {}", err),
        }
    }

    info!("Processed {} of {} files", songs.len(), total);
    Ok(songs)
}

pub async fn cover_for_file(
    options: Arc<LibraryOptions>,
    file_name: String,
) -> Result<String, CoverTaskError> {
    let cover = spawn_blocking(move || lookup_cover(&options, &file_name)).await??;
    Ok(cover)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::fs;

    use common::fixtures::{write_wav, WavSpec};
    use library::scan_dir;

    use super::*;

    fn options_for(root: &std::path::Path) -> Arc<LibraryOptions> {
        Arc::new(LibraryOptions::new(root))
    }

    fn write_library(root: &std::path::Path) {
        write_wav(&root.join("alpha.wav"), &WavSpec::default()).unwrap();
        write_wav(
            &root.join("bravo.wav"),
            &WavSpec {
                title: Some("Bravo Tagged"),
                ..WavSpec::default()
            },
        )
        .unwrap();
        write_wav(
            &root.join("charlie.WAV"),
            &WavSpec {
                sample_rate: 22_050,
                ..WavSpec::default()
            },
        )
        .unwrap();
        fs::write(root.join("broken.mp3"), b"garbage that no parser accepts").unwrap();
        fs::write(root.join("cover.jpg"), b"not audio either").unwrap();
    }

    #[tokio::test]
    async fn drops_corrupt_file_and_keeps_the_rest() {
        let dir = tempfile::tempdir().unwrap();
        write_library(dir.path());

        let songs = list_songs(options_for(dir.path())).await.unwrap();
        assert_eq!(songs.len(), 3);
        assert!(songs.iter().all(|song| song.path != "/localmusic/broken.mp3"));
    }

    #[tokio::test]
    async fn ids_keep_listing_positions_after_failures() {
        let dir = tempfile::tempdir().unwrap();
        write_library(dir.path());

        let listing = scan_dir(dir.path()).unwrap();
        let broken_id = listing
            .iter()
            .find(|entry| entry.file_name == "broken.mp3")
            .map(|entry| entry.id)
            .unwrap();

        let songs = list_songs(options_for(dir.path())).await.unwrap();
        let ids: Vec<u32> = songs.iter().map(|song| song.id).collect();
        let expected: Vec<u32> = (1..=4).filter(|id| *id != broken_id).collect();
        assert_eq!(ids, expected);

        for song in &songs {
            let entry = listing.iter().find(|entry| entry.id == song.id).unwrap();
            assert_eq!(song.path, format!("/localmusic/{}", entry.file_name));
        }
    }

    #[tokio::test]
    async fn repeated_scans_match_by_path() {
        let dir = tempfile::tempdir().unwrap();
        write_library(dir.path());
        let options = options_for(dir.path());

        let first = list_songs(Arc::clone(&options)).await.unwrap();
        let second = list_songs(options).await.unwrap();

        let by_path = |songs: Vec<SongDescriptor>| -> HashMap<String, SongDescriptor> {
            songs.into_iter().map(|song| (song.path.clone(), song)).collect()
        };
        assert_eq!(by_path(first), by_path(second));
    }

    #[tokio::test]
    async fn merged_fields_reach_the_descriptor() {
        let dir = tempfile::tempdir().unwrap();
        write_library(dir.path());

        let songs = list_songs(options_for(dir.path())).await.unwrap();
        let find = |path: &str| songs.iter().find(|song| song.path == path).unwrap();
        assert_eq!(find("/localmusic/alpha.wav").name, "alpha");
        assert_eq!(find("/localmusic/bravo.wav").name, "Bravo Tagged");
        assert_eq!(find("/localmusic/charlie.WAV").quality, common::Quality::Standard);
    }

    #[tokio::test]
    async fn missing_root_fails_the_scan() {
        let dir = tempfile::tempdir().unwrap();
        let err = list_songs(options_for(&dir.path().join("absent")))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ScanError::Library(LibraryError::DirectoryNotFound(_))
        ));
    }

    #[tokio::test]
    async fn empty_directory_lists_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let songs = list_songs(options_for(dir.path())).await.unwrap();
        assert!(songs.is_empty());
    }
}
