use crate::selection::SelectionPolicy;
use ktag_core::{ArtworkData, ArtworkSource, ContainerFile, ParseConfig, Result};
use std::os::fd::RawFd;
use tracing::{debug, warn};

/// Artwork extraction settings
#[derive(Debug, Clone, Copy, Default)]
pub struct ArtworkConfig {
    /// Picture selection rule (default: strictly largest, first wins on ties)
    pub selection: SelectionPolicy,

    /// Ignore pictures larger than this many bytes (default: no limit)
    pub max_size: Option<usize>,
}

/// Extracts the largest embedded picture from audio files
#[derive(Debug, Clone)]
pub struct ArtworkExtractor {
    parse: ParseConfig,
    config: ArtworkConfig,
}

impl ArtworkExtractor {
    /// Create an extractor with default settings
    pub fn new() -> Self {
        Self::with_config(ArtworkConfig::default())
    }

    pub fn with_config(config: ArtworkConfig) -> Self {
        Self {
            // Audio properties play no part in picture selection
            parse: ParseConfig::tags_only(),
            config,
        }
    }

    pub fn config(&self) -> &ArtworkConfig {
        &self.config
    }

    /// Select the artwork of an already parsed container
    ///
    /// Returns `None` if the container has no pictures or the selected one is empty.
    pub fn extract_from_container(&self, file: &ContainerFile) -> Option<ArtworkData> {
        let mut candidates = file.pictures();
        if candidates.is_empty() {
            debug!("{} file has no embedded pictures", file.kind());
            return None;
        }

        if let Some(max_size) = self.config.max_size {
            candidates.retain(|candidate| {
                let keep = candidate.len() <= max_size;
                if !keep {
                    warn!(
                        "Skipping {:?} picture: {} bytes (max {} bytes)",
                        candidate.picture_type,
                        candidate.len(),
                        max_size
                    );
                }
                keep
            });
        }

        let selected = self.config.selection.select(&candidates)?;
        if selected.is_empty() {
            debug!("Selected {:?} picture is empty", selected.picture_type);
            return None;
        }

        debug!(
            "Selected {:?} picture ({} bytes) out of {} in {} file",
            selected.picture_type,
            selected.len(),
            candidates.len(),
            file.kind()
        );
        Some(ArtworkData::from_candidate(selected))
    }
}

impl Default for ArtworkExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl ArtworkSource for ArtworkExtractor {
    fn artwork(&self, fd: RawFd) -> Result<Option<ArtworkData>> {
        let Some(file) = ContainerFile::open_descriptor(fd, &self.parse)? else {
            return Ok(None);
        };

        Ok(self.extract_from_container(&file))
    }
}
