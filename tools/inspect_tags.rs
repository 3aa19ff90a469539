//! Prints what each metadata reader sees for every eligible file in a music
//! directory, followed by the merged descriptor the server would return.
//!
//! Usage: `inspect_tags [MUSIC_ROOT]` (falls back to `$MUSIC_ROOT`, then
//! `./localmusic`).

use std::env;
use std::path::{Path, PathBuf};

use library::{build_song, scan_dir, LibraryOptions};
use metadata::{read_primary, read_secondary, EmbeddedPicture};
use tracing::warn;
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into());
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let music_root = env::args()
        .nth(1)
        .or_else(|| env::var("MUSIC_ROOT").ok())
        .unwrap_or_else(|| "localmusic".to_string());
    let options = LibraryOptions::new(PathBuf::from(&music_root));

    let entries = scan_dir(&options.root)?;
    println!("{} eligible files in {}", entries.len(), options.root.display());

    let mut built = 0usize;
    for entry in &entries {
        let path = options.root.join(&entry.file_name);
        println!("\n== [{}] {}", entry.id, entry.file_name);
        print_primary(&path);
        print_secondary(&path);

        match build_song(&options, entry) {
            Ok(song) => {
                built += 1;
                println!(
                    "quality: {} ({} Hz, {} bit, {} kbps)",
                    song.quality, song.sample_rate, song.bits_per_sample, song.bitrate_kbps
                );
                let mut value = serde_json::to_value(&song)?;
                if let Some(cover) = value.get_mut("cover") {
                    *cover = serde_json::Value::String(shorten_cover(&song.cover));
                }
                println!("descriptor: {}", serde_json::to_string_pretty(&value)?);
            }
            Err(err) => warn!("{} would be dropped: {}", entry.file_name, err),
        }
    }

    println!("\nBuilt {} of {} descriptors", built, entries.len());
    Ok(())
}

fn print_primary(path: &Path) {
    match read_primary(path) {
        Ok(tags) => {
            println!("tag reader:");
            println!("  title:       {:?}", tags.title);
            println!("  performers:  {:?}", tags.performers);
            println!("  album:       {:?}", tags.album);
            println!("  sample rate: {:?}", tags.sample_rate);
            println!("  bit depth:   {:?}", tags.bits_per_sample);
            println!("  codecs:      {:?}", tags.codecs);
            println!("  picture:     {}", describe_picture(tags.picture.as_ref()));
        }
        Err(err) => println!("tag reader failed: {}", err),
    }
}

fn print_secondary(path: &Path) {
    match read_secondary(path) {
        Ok(info) => {
            println!("format parser:");
            println!("  title:       {:?}", info.title);
            println!("  artists:     {:?}", info.artists);
            println!("  album:       {:?}", info.album);
            println!("  comments:    {:?}", info.comments);
            println!("  codec:       {:?}", info.codec);
            println!("  sample rate: {:?}", info.sample_rate);
            println!("  bit depth:   {:?}", info.bits_per_sample);
            println!("  duration:    {:?}", info.duration_secs);
            println!("  bitrate:     {:?}", info.bitrate);
            println!("  picture:     {}", describe_picture(info.picture.as_ref()));
        }
        Err(err) => println!("format parser failed: {}", err),
    }
}

fn describe_picture(picture: Option<&EmbeddedPicture>) -> String {
    match picture {
        Some(picture) => format!(
            "{} bytes ({})",
            picture.data.len(),
            picture.mime.as_deref().unwrap_or("no type")
        ),
        None => "none".to_string(),
    }
}

fn shorten_cover(cover: &str) -> String {
    match cover.split_once(";base64,") {
        Some((head, data)) => format!("{};base64,<{} chars>", head, data.len()),
        None => cover.to_string(),
    }
}
