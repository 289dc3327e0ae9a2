/// Metadata reader implementation using lofty
use ktag_core::{
    AudioProperties, ContainerFile, KtagError, Metadata, MetadataReader, ParseConfig, PropertyMap,
};
use lofty::ogg::VorbisComments;
use lofty::{AudioFile, ItemValue, Tag, TagType, TaggedFile, TaggedFileExt};
use std::os::fd::RawFd;
use tracing::{debug, trace};

/// Metadata reader using the lofty library
#[derive(Debug, Clone, Default)]
pub struct LoftyMetadataReader {
    config: ParseConfig,
}

impl LoftyMetadataReader {
    /// Create a new metadata reader
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a reader with custom parse configuration
    pub fn with_config(config: ParseConfig) -> Self {
        Self { config }
    }

    /// Extract metadata from an already parsed container
    ///
    /// FLAC and Opus comments are read as stored. The generic tag view would
    /// add the comment block's vendor string as an encoder item.
    pub fn read_container(&self, file: ContainerFile) -> Metadata {
        let comments = match &file {
            ContainerFile::Flac(flac) => flac.vorbis_comments().map(comment_map),
            ContainerFile::Opus(opus) => Some(comment_map(opus.vorbis_comments())),
            ContainerFile::Generic(_) => None,
        };

        Self::extract_from_tagged(&file.into_tagged(), comments)
    }

    fn extract_from_tagged(tagged: &TaggedFile, comments: Option<PropertyMap>) -> Metadata {
        // Get primary tag or first available tag
        let properties = comments.unwrap_or_else(|| {
            tagged
                .primary_tag()
                .or_else(|| tagged.first_tag())
                .map(property_map)
                .unwrap_or_default()
        });

        let audio_properties = AudioProperties::from_file_properties(tagged.properties());
        if audio_properties.is_none() {
            debug!("{:?} file exposes no audio stream", tagged.file_type());
        }

        Metadata::new(properties, audio_properties)
    }
}

/// Build the generic property map of a tag.
///
/// Keys use the Vorbis comment naming (`ARTIST`, `TITLE`, `TRACKNUMBER`, ...)
/// whatever the underlying tag format; keys lofty does not know pass through
/// verbatim. Binary values have no string form and are skipped.
pub fn property_map(tag: &Tag) -> PropertyMap {
    let mut map = PropertyMap::new();

    for item in tag.items() {
        let Some(key) = item.key().map_key(TagType::VorbisComments, true) else {
            trace!("No generic name for {:?}, skipping", item.key());
            continue;
        };

        match item.value() {
            ItemValue::Text(value) | ItemValue::Locator(value) => map.push(key, value.as_str()),
            ItemValue::Binary(data) => {
                trace!("Skipping binary {} ({} bytes)", key, data.len());
            }
        }
    }

    map
}

/// Property map of a Vorbis comment block
///
/// Keys are upper-cased; the vendor string is not a comment and pictures are
/// kept apart by lofty, so neither appears.
pub fn comment_map(comments: &VorbisComments) -> PropertyMap {
    let mut map = PropertyMap::new();
    for (key, value) in comments.items() {
        map.push(key.to_ascii_uppercase(), value);
    }
    map
}

impl MetadataReader for LoftyMetadataReader {
    fn read(&self, fd: RawFd) -> ktag_core::Result<Option<Metadata>> {
        let Some(file) = ContainerFile::open_descriptor(fd, &self.config)? else {
            return Ok(None);
        };

        Ok(Some(self.read_container(file)))
    }

    fn write(&self, fd: RawFd, properties: &PropertyMap) -> ktag_core::Result<()> {
        // Replace-vs-merge semantics, backup on failure and per-format support
        // are undecided; refuse rather than guess.
        debug!(
            "Refusing to write {} properties to descriptor {}",
            properties.len(),
            fd
        );
        Err(KtagError::WriteUnsupported)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lofty::{ItemKey, TagItem};

    #[test]
    fn default_reader_reads_audio_properties() {
        let reader = LoftyMetadataReader::new();
        assert!(reader.config.read_properties);

        let tags_only = LoftyMetadataReader::with_config(ParseConfig::tags_only());
        assert!(!tags_only.config.read_properties);
    }

    #[test]
    fn read_invalid_descriptor_returns_none() {
        let reader = LoftyMetadataReader::new();
        assert!(reader.read(-1).unwrap().is_none());
    }

    #[test]
    fn write_is_not_supported() {
        let reader = LoftyMetadataReader::new();
        let result = reader.write(-1, &PropertyMap::new());
        assert!(matches!(result, Err(KtagError::WriteUnsupported)));
    }

    #[test]
    fn property_map_uses_generic_names() {
        let mut tag = Tag::new(TagType::Id3v2);
        tag.push_unchecked(TagItem::new(
            ItemKey::TrackTitle,
            ItemValue::Text("Song".to_string()),
        ));
        tag.push_unchecked(TagItem::new(
            ItemKey::AlbumTitle,
            ItemValue::Text("Record".to_string()),
        ));

        let map = property_map(&tag);
        assert_eq!(map.get("TITLE").unwrap(), ["Song"]);
        assert_eq!(map.get("ALBUM").unwrap(), ["Record"]);
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn property_map_passes_unknown_keys_through() {
        let mut tag = Tag::new(TagType::VorbisComments);
        tag.push_unchecked(TagItem::new(
            ItemKey::Unknown("MOOD".to_string()),
            ItemValue::Text("Calm".to_string()),
        ));

        let map = property_map(&tag);
        assert_eq!(map.get("MOOD").unwrap(), ["Calm"]);
    }

    #[test]
    fn comment_map_leaves_out_vendor() {
        let mut comments = VorbisComments::default();
        comments.set_vendor("ktag encoder".to_string());
        comments.push("ARTIST".to_string(), "A".to_string());
        comments.push("ARTIST".to_string(), "B".to_string());
        comments.push("title".to_string(), "Song".to_string());

        let map = comment_map(&comments);

        let expected: PropertyMap = [("ARTIST", vec!["A", "B"]), ("TITLE", vec!["Song"])]
            .into_iter()
            .collect();
        assert_eq!(map, expected);
        assert!(!map.contains_key("ENCODER"));
    }

    #[test]
    fn property_map_skips_binary_values() {
        let mut tag = Tag::new(TagType::VorbisComments);
        tag.push_unchecked(TagItem::new(
            ItemKey::Unknown("BLOB".to_string()),
            ItemValue::Binary(vec![1, 2, 3]),
        ));

        assert!(property_map(&tag).is_empty());
    }
}
