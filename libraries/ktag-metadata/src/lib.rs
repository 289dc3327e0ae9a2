//! ktag Metadata
//!
//! Tag and audio property extraction for descriptor-backed audio files.
//!
//! This crate provides:
//! - Generic property maps (tag name to ordered values) for every container
//!   lofty can parse (FLAC, Opus, Vorbis, MP3, MP4, WAV, AIFF, APE, ...)
//! - Audio properties (duration, bitrate, sample rate, channels)
//!
//! Writing is not supported yet; `MetadataReader::write` always returns
//! `KtagError::WriteUnsupported`.
//!
//! # Example
//!
//! ```rust,no_run
//! use ktag_core::MetadataReader;
//! use ktag_metadata::LoftyMetadataReader;
//! # fn example(fd: i32) -> ktag_core::Result<()> {
//! let reader = LoftyMetadataReader::new();
//! if let Some(metadata) = reader.read(fd)? {
//!     for (key, values) in metadata.properties.iter() {
//!         println!("{key}: {values:?}");
//!     }
//! }
//! # Ok(())
//! # }
//! ```

mod reader;

pub use reader::{comment_map, property_map, LoftyMetadataReader};
