/// Core traits for ktag
use crate::error::Result;
use crate::types::{ArtworkData, Metadata, PropertyMap};
use std::os::fd::RawFd;

/// Metadata reader trait
///
/// Implementers read tags and audio properties from an already-open descriptor.
pub trait MetadataReader: Send + Sync {
    /// Read metadata from the file behind `fd`
    ///
    /// Returns `Ok(None)` for invalid descriptors and unsupported or corrupt files.
    fn read(&self, fd: RawFd) -> Result<Option<Metadata>>;

    /// Persist `properties` to the file behind `fd`
    fn write(&self, fd: RawFd, properties: &PropertyMap) -> Result<()>;
}

/// Artwork source trait
pub trait ArtworkSource: Send + Sync {
    /// Extract the embedded artwork of the file behind `fd`
    ///
    /// Returns `Ok(None)` when the file is unreadable or carries no usable picture.
    fn artwork(&self, fd: RawFd) -> Result<Option<ArtworkData>>;
}
