//! ktag Artwork - embedded artwork extraction
//!
//! Finds every picture embedded in an audio file and returns the largest one.
//! Where the pictures live depends on the container:
//!
//! - FLAC: native `PICTURE` metadata blocks
//! - Opus: `METADATA_BLOCK_PICTURE` entries of the Vorbis comment block
//! - Everything else: lofty's generic tag pictures (ID3v2 `APIC`, MP4 `covr`,
//!   APE cover art, ...), all picture types together
//!
//! # Example
//!
//! ```no_run
//! use ktag_artwork::ArtworkExtractor;
//! use ktag_core::ArtworkSource;
//! # fn example(fd: i32) {
//! let extractor = ArtworkExtractor::new();
//!
//! match extractor.artwork(fd) {
//!     Ok(Some(artwork)) => {
//!         println!("Found artwork: {} bytes, type: {:?}",
//!             artwork.data.len(), artwork.mime_type);
//!     }
//!     Ok(None) => println!("No artwork found"),
//!     Err(e) => eprintln!("Error: {}", e),
//! }
//! # }
//! ```

mod extractor;
mod selection;

// Re-export public API
pub use extractor::{ArtworkConfig, ArtworkExtractor};
pub use ktag_core::ArtworkData;
pub use selection::SelectionPolicy;
