//! Conversion between native metadata values and their managed counterparts

use crate::error::Result;
use crate::registry::BridgeRegistry;
use jni::objects::{JByteArray, JObject, JString};
use jni::JNIEnv;
use ktag_core::{ArtworkData, Metadata, PropertyMap};
use tracing::trace;

/// Build a `Metadata` object: a `HashMap<String, ArrayList<String>>` of tag
/// properties plus `AudioProperties` (or null when unavailable)
pub fn metadata_to_java<'local>(
    env: &mut JNIEnv<'local>,
    registry: &BridgeRegistry,
    metadata: &Metadata,
) -> Result<JObject<'local>> {
    let map = property_map_to_java(env, registry, &metadata.properties)?;

    let audio_properties = match &metadata.audio_properties {
        Some(properties) => registry.new_audio_properties(env, properties)?,
        None => JObject::null(),
    };

    let object = registry.new_metadata(env, &map, &audio_properties)?;
    env.delete_local_ref(map)?;
    env.delete_local_ref(audio_properties)?;
    Ok(object)
}

/// Local references are released per entry, so large tag sets do not
/// exhaust the local reference table.
pub fn property_map_to_java<'local>(
    env: &mut JNIEnv<'local>,
    registry: &BridgeRegistry,
    properties: &PropertyMap,
) -> Result<JObject<'local>> {
    let map = registry.new_hash_map(env)?;

    for (key, values) in properties.iter() {
        let list = registry.new_array_list(env, values.len())?;
        for value in values {
            let element = env.new_string(value)?;
            registry.list_add(env, &list, &element)?;
            env.delete_local_ref(element)?;
        }

        let jkey = env.new_string(key)?;
        registry.map_put(env, &map, &jkey, &list)?;
        env.delete_local_ref(jkey)?;
        env.delete_local_ref(list)?;
    }

    Ok(map)
}

/// Decode a managed `Map<String, List<String>>`
///
/// Null keys are skipped and a null value list becomes an empty value list.
/// Null elements inside a list are dropped.
pub fn property_map_from_java(
    env: &mut JNIEnv<'_>,
    registry: &BridgeRegistry,
    map: &JObject<'_>,
) -> Result<PropertyMap> {
    let mut properties = PropertyMap::new();
    if map.is_null() {
        return Ok(properties);
    }

    let iterator = registry.entry_iterator(env, map)?;
    while let Some(entry) = registry.iterator_next(env, &iterator)? {
        let (key, list) = registry.entry_parts(env, &entry)?;
        env.delete_local_ref(entry)?;

        if key.is_null() {
            trace!("Skipping null property key");
            env.delete_local_ref(list)?;
            continue;
        }

        let key = JString::from(key);
        let name: String = env.get_string(&key)?.into();
        env.delete_local_ref(key)?;

        let values = string_list_from_java(env, registry, &list)?;
        env.delete_local_ref(list)?;
        properties.replace(name, values);
    }
    env.delete_local_ref(iterator)?;

    Ok(properties)
}

fn string_list_from_java(
    env: &mut JNIEnv<'_>,
    registry: &BridgeRegistry,
    list: &JObject<'_>,
) -> Result<Vec<String>> {
    if list.is_null() {
        return Ok(Vec::new());
    }

    let size = registry.list_size(env, list)?;
    let mut values = Vec::with_capacity(usize::try_from(size).unwrap_or(0));
    for index in 0..size {
        let element = registry.list_get(env, list, index)?;
        if element.is_null() {
            continue;
        }
        let element = JString::from(element);
        let value: String = env.get_string(&element)?.into();
        env.delete_local_ref(element)?;
        values.push(value);
    }

    Ok(values)
}

/// Copy artwork bytes into a fresh `byte[]`
pub fn artwork_to_java<'local>(
    env: &mut JNIEnv<'local>,
    artwork: &ArtworkData,
) -> Result<JByteArray<'local>> {
    Ok(env.byte_array_from_slice(&artwork.data)?)
}
