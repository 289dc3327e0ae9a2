/// Core error types for ktag
use thiserror::Error;

/// Result type alias using `KtagError`
pub type Result<T> = std::result::Result<T, KtagError>;

/// Core error type shared by the extraction pipelines
#[derive(Error, Debug)]
pub enum KtagError {
    /// Descriptor is negative or not open in this process
    #[error("Invalid file descriptor: {fd}")]
    InvalidDescriptor {
        fd: i32,
        #[source]
        source: Option<std::io::Error>,
    },

    /// Content was read but no container parser recognised it
    #[error("Unsupported format")]
    UnsupportedFormat,

    /// Tag writing is not supported yet
    #[error("Tag writing not yet implemented")]
    WriteUnsupported,

    /// I/O errors
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Lofty errors (corrupt or truncated content)
    #[error(transparent)]
    Lofty(#[from] lofty::error::LoftyError),
}

impl KtagError {
    /// Create an invalid descriptor error without an OS cause
    pub fn invalid_descriptor(fd: i32) -> Self {
        Self::InvalidDescriptor { fd, source: None }
    }

    /// Whether this error means "this file has no usable data" rather than a failure.
    ///
    /// Pipelines turn these into `Ok(None)` so that hosts see an absent result,
    /// never an exception.
    pub fn is_expected_absence(&self) -> bool {
        matches!(
            self,
            Self::InvalidDescriptor { .. } | Self::UnsupportedFormat | Self::Lofty(_)
        )
    }
}
