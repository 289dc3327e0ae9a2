//! ktag Core
//!
//! Shared types, traits, and error handling for the ktag pipelines.
//!
//! # Architecture
//!
//! The core crate defines:
//! - **Descriptor streams**: `DescriptorStream` reads a host-owned file descriptor
//!   without taking ownership of it
//! - **Containers**: `ContainerFile` probes content and picks the FLAC, Opus or
//!   generic parsing strategy
//! - **Value types**: `PropertyMap`, `AudioProperties`, `Metadata`, `ArtworkData`
//! - **Error Handling**: Unified `KtagError` and `Result` types
//!
//! # Example
//!
//! ```rust,no_run
//! use ktag_core::{ContainerFile, ParseConfig};
//! # fn example(fd: i32) -> ktag_core::Result<()> {
//! if let Some(file) = ContainerFile::open_descriptor(fd, &ParseConfig::default())? {
//!     println!("{} with {} pictures", file.kind(), file.pictures().len());
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod container;
pub mod error;
pub mod stream;
pub mod traits;
pub mod types;

// Re-export commonly used types
pub use config::ParseConfig;
pub use container::{ContainerFile, ContainerKind};
pub use error::{KtagError, Result};
pub use stream::DescriptorStream;
pub use traits::{ArtworkSource, MetadataReader};
pub use types::{ArtworkData, AudioProperties, Metadata, PictureCandidate, PropertyMap};

#[cfg(any(test, feature = "fixtures"))]
pub mod fixtures;
