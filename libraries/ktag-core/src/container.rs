//! Container probing and the closed set of supported container kinds.
//!
//! A `ContainerFile` only exists once the descriptor produced a stream AND a
//! parser recognised the content, so every pipeline goes through
//! [`ContainerFile::open_descriptor`] before touching file data.

use crate::config::ParseConfig;
use crate::error::{KtagError, Result};
use crate::stream::DescriptorStream;
use crate::types::PictureCandidate;
use lofty::flac::FlacFile;
use lofty::ogg::{OggPictureStorage, OpusFile};
use lofty::{AudioFile, FileType, Probe, TaggedFile, TaggedFileExt};
use std::fmt;
use std::io::{Read, Seek};
use std::os::fd::RawFd;
use tracing::debug;

/// Which branch of the container dispatch a file takes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerKind {
    Flac,
    Opus,
    Other(FileType),
}

impl fmt::Display for ContainerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Flac => f.write_str("FLAC"),
            Self::Opus => f.write_str("Opus"),
            Self::Other(file_type) => write!(f, "{:?}", file_type),
        }
    }
}

/// A parsed audio file, one variant per artwork strategy.
///
/// FLAC keeps its native picture blocks, Opus keeps the pictures of its
/// Vorbis comment block, and everything else goes through lofty's generic
/// tag model.
pub enum ContainerFile {
    Flac(FlacFile),
    Opus(OpusFile),
    Generic(TaggedFile),
}

impl ContainerFile {
    /// Open and parse the file behind `fd`.
    ///
    /// Invalid descriptors and unrecognised or corrupt content yield `Ok(None)`.
    /// A recognised file whose audio stream cannot be decoded still opens,
    /// with empty audio properties.
    pub fn open_descriptor(fd: RawFd, config: &ParseConfig) -> Result<Option<Self>> {
        let mut stream = match DescriptorStream::open(fd) {
            Ok(stream) => stream,
            Err(e) if e.is_expected_absence() => {
                debug!("Cannot open descriptor {}: {}", fd, e);
                return Ok(None);
            }
            Err(e) => return Err(e),
        };

        match Self::read_recovering(&mut stream, config) {
            Ok(file) => {
                debug!("Descriptor {} parsed as {}", fd, file.kind());
                Ok(Some(file))
            }
            Err(e) if e.is_expected_absence() => {
                debug!("Descriptor {} holds no supported audio: {}", fd, e);
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// Parse, falling back to a tags-only parse when the audio stream of a
    /// recognised container cannot be decoded.
    ///
    /// The fallback leaves the audio properties empty, so the tags survive a
    /// corrupt stream.
    fn read_recovering<R: Read + Seek>(reader: &mut R, config: &ParseConfig) -> Result<Self> {
        match Self::read_from(&mut *reader, config) {
            Err(KtagError::Lofty(e)) if config.read_properties => {
                debug!("Audio stream not decodable ({}), retrying for tags only", e);
                Self::read_from(reader, &config.without_properties())
            }
            result => result,
        }
    }

    /// Identify the container from its content and parse it.
    ///
    /// The reader is rewound first; there is no file name to guess from.
    pub fn read_from<R: Read + Seek>(mut reader: R, config: &ParseConfig) -> Result<Self> {
        reader.rewind()?;
        let options = config.parse_options();

        let probe = Probe::new(reader).options(options).guess_file_type()?;
        let Some(file_type) = probe.file_type() else {
            return Err(KtagError::UnsupportedFormat);
        };

        let mut reader = probe.into_inner();
        reader.rewind()?;

        let file = match file_type {
            FileType::Flac => Self::Flac(FlacFile::read_from(&mut reader, options)?),
            FileType::Opus => Self::Opus(OpusFile::read_from(&mut reader, options)?),
            other => Self::Generic(Probe::with_file_type(reader, other).options(options).read()?),
        };

        Ok(file)
    }

    pub fn kind(&self) -> ContainerKind {
        match self {
            Self::Flac(_) => ContainerKind::Flac,
            Self::Opus(_) => ContainerKind::Opus,
            Self::Generic(tagged) => ContainerKind::Other(tagged.file_type()),
        }
    }

    /// Every embedded picture, in enumeration order
    pub fn pictures(&self) -> Vec<PictureCandidate<'_>> {
        match self {
            Self::Flac(flac) => flac
                .pictures()
                .iter()
                .map(|(picture, _)| PictureCandidate::from_picture(picture))
                .collect(),
            // lofty always materialises the comment block; a missing one reads as empty
            Self::Opus(opus) => opus
                .vorbis_comments()
                .pictures()
                .iter()
                .map(|(picture, _)| PictureCandidate::from_picture(picture))
                .collect(),
            // Flatten every tag and every picture type into one candidate set
            Self::Generic(tagged) => tagged
                .tags()
                .iter()
                .flat_map(|tag| tag.pictures())
                .map(PictureCandidate::from_picture)
                .collect(),
        }
    }

    /// Generic view of the file (tags and audio properties)
    pub fn into_tagged(self) -> TaggedFile {
        match self {
            Self::Flac(flac) => flac.into(),
            Self::Opus(opus) => opus.into(),
            Self::Generic(tagged) => tagged,
        }
    }
}

impl fmt::Debug for ContainerFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContainerFile")
            .field("kind", &self.kind())
            .finish_non_exhaustive()
    }
}
