use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use tracing::debug;

use crate::EmbeddedPicture;

pub const DEFAULT_PLACEHOLDER: &str = "/images/song.jpg";
const DEFAULT_MIME: &str = "image/jpeg";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoverError {
    EmptyData,
    MissingMime,
}

impl std::fmt::Display for CoverError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CoverError::EmptyData => write!(f, "picture has no data"),
            CoverError::MissingMime => write!(f, "picture has no type"),
        }
    }
}

impl std::error::Error for CoverError {}

/// Encodes a picture as a `data:` URI. `default_mime` is used when the
/// picture carries no type of its own; without one, a missing type is an
/// error.
///
/// Taggers often store a bare extension (`jpg`, `PNG`) instead of a media
/// type. Those are mapped to `image/*`; any other label is kept verbatim.
pub fn encode_data_uri(
    picture: &EmbeddedPicture,
    default_mime: Option<&str>,
) -> Result<String, CoverError> {
    if picture.data.is_empty() {
        return Err(CoverError::EmptyData);
    }
    let mime = picture
        .mime
        .as_deref()
        .map(str::trim)
        .filter(|mime| !mime.is_empty())
        .map(normalize_mime)
        .or_else(|| default_mime.map(str::to_string))
        .ok_or(CoverError::MissingMime)?;
    Ok(format!("data:{};base64,{}", mime, STANDARD.encode(&picture.data)))
}

/// Cover for a listing entry: the tag reader's picture, then the format
/// parser's, then the placeholder.
pub fn resolve_cover(
    primary: Option<&EmbeddedPicture>,
    secondary: Option<&EmbeddedPicture>,
    placeholder: &str,
) -> String {
    primary
        .and_then(|picture| try_encode(picture, Some(DEFAULT_MIME), "tag reader"))
        .or_else(|| secondary.and_then(|picture| try_encode(picture, None, "format parser")))
        .unwrap_or_else(|| placeholder_or_default(placeholder))
}

/// Cover for the single-file lookup, which only consults the tag reader.
pub fn resolve_primary_cover(primary: Option<&EmbeddedPicture>, placeholder: &str) -> String {
    resolve_cover(primary, None, placeholder)
}

fn try_encode(picture: &EmbeddedPicture, default_mime: Option<&str>, source: &str) -> Option<String> {
    match encode_data_uri(picture, default_mime) {
        Ok(uri) => Some(uri),
        Err(err) => {
            debug!("Skipping {} cover: {}", source, err);
            None
        }
    }
}

fn placeholder_or_default(placeholder: &str) -> String {
    let trimmed = placeholder.trim();
    if trimmed.is_empty() {
        DEFAULT_PLACEHOLDER.to_string()
    } else {
        trimmed.to_string()
    }
}

fn normalize_mime(mime: &str) -> String {
    match mime.to_ascii_lowercase().as_str() {
        "jpg" | "jpeg" | "image/jpg" => DEFAULT_MIME.to_string(),
        bare @ ("png" | "gif" | "bmp" | "tiff" | "webp") => format!("image/{}", bare),
        _ => mime.to_string(),
    }
}
