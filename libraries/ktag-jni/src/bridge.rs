use crate::error::Result;
use crate::marshal;
use crate::registry::BridgeRegistry;
use jni::objects::{JByteArray, JObject};
use jni::JNIEnv;
use ktag_artwork::ArtworkExtractor;
use ktag_core::{ArtworkSource, MetadataReader};
use ktag_metadata::LoftyMetadataReader;
use std::os::fd::RawFd;
use tracing::{debug, warn};

/// Everything the exported functions share between calls
///
/// Created once in `JNI_OnLoad`; readers hold no per-call state, so one
/// instance serves every calling thread.
pub struct BridgeContext {
    registry: BridgeRegistry,
    metadata: Box<dyn MetadataReader>,
    artwork: Box<dyn ArtworkSource>,
}

impl BridgeContext {
    pub fn initialize(env: &mut JNIEnv<'_>) -> Result<Self> {
        Ok(Self::with_sources(
            BridgeRegistry::resolve(env)?,
            Box::new(LoftyMetadataReader::new()),
            Box::new(ArtworkExtractor::new()),
        ))
    }

    pub fn with_sources(
        registry: BridgeRegistry,
        metadata: Box<dyn MetadataReader>,
        artwork: Box<dyn ArtworkSource>,
    ) -> Self {
        Self {
            registry,
            metadata,
            artwork,
        }
    }

    pub fn registry(&self) -> &BridgeRegistry {
        &self.registry
    }

    /// Tags and audio properties of the file behind `fd`, or null
    pub fn get_metadata<'local>(
        &self,
        env: &mut JNIEnv<'local>,
        fd: RawFd,
    ) -> Result<JObject<'local>> {
        match self.metadata.read(fd) {
            Ok(Some(metadata)) => marshal::metadata_to_java(env, &self.registry, &metadata),
            Ok(None) => Ok(JObject::null()),
            Err(e) => {
                warn!("Failed to read metadata from descriptor {}: {}", fd, e);
                Ok(JObject::null())
            }
        }
    }

    /// Bytes of the largest embedded picture, or null
    pub fn get_artwork<'local>(
        &self,
        env: &mut JNIEnv<'local>,
        fd: RawFd,
    ) -> Result<JByteArray<'local>> {
        match self.artwork.artwork(fd) {
            Ok(Some(artwork)) => marshal::artwork_to_java(env, &artwork),
            Ok(None) => Ok(JByteArray::from(JObject::null())),
            Err(e) => {
                warn!("Failed to read artwork from descriptor {}: {}", fd, e);
                Ok(JByteArray::from(JObject::null()))
            }
        }
    }

    /// Write `properties` to the file behind `fd`
    ///
    /// The map is decoded so malformed input still surfaces as a Java
    /// exception, but no writer exists yet and the result is always `false`.
    pub fn write_metadata(
        &self,
        env: &mut JNIEnv<'_>,
        fd: RawFd,
        properties: &JObject<'_>,
    ) -> Result<bool> {
        let properties = marshal::property_map_from_java(env, &self.registry, properties)?;
        debug!(
            "Write requested for descriptor {} with {} properties",
            fd,
            properties.len()
        );

        match self.metadata.write(fd, &properties) {
            Ok(()) => Ok(true),
            Err(e) => {
                warn!("Failed to write metadata to descriptor {}: {}", fd, e);
                Ok(false)
            }
        }
    }
}
