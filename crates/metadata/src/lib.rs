//! Per-file metadata for the local library.
//!
//! Two independent readers look at every file: [`read_primary`] (container
//! tags through lofty) and [`read_secondary`] (decode-level properties
//! through symphonia). [`merge_fields`] combines them under a fixed priority
//! order and [`resolve_cover`] turns embedded artwork into a data URI.

mod cover;
mod merge;
mod primary;
mod secondary;

use lofty::error::LoftyError;
use symphonia::core::errors::Error as SymphoniaError;

pub use cover::{encode_data_uri, resolve_cover, resolve_primary_cover, CoverError, DEFAULT_PLACEHOLDER};
pub use merge::{first_present, merge_fields, Extractor, MergedFields, Presence, Source, Sources};
pub use primary::{read_primary, PrimaryTags};
pub use secondary::{read_secondary, FormatInfo};

/// Raw bytes of an embedded picture together with whatever type label the
/// reader found for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbeddedPicture {
    pub data: Vec<u8>,
    pub mime: Option<String>,
}

#[derive(Debug)]
pub enum MetadataError {
    Io(std::io::Error),
    Lofty(LoftyError),
    Symphonia(SymphoniaError),
}

impl std::fmt::Display for MetadataError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MetadataError::Io(err) => write!(f, "io error: {}", err),
            MetadataError::Lofty(err) => write!(f, "tag read error: {}", err),
            MetadataError::Symphonia(err) => write!(f, "format parse error: {}", err),
        }
    }
}

impl std::error::Error for MetadataError {}

impl From<std::io::Error> for MetadataError {
    fn from(err: std::io::Error) -> Self {
        MetadataError::Io(err)
    }
}

impl From<LoftyError> for MetadataError {
    fn from(err: LoftyError) -> Self {
        MetadataError::Lofty(err)
    }
}

impl From<SymphoniaError> for MetadataError {
    fn from(err: SymphoniaError) -> Self {
        MetadataError::Symphonia(err)
    }
}
