//! Cached JVM class and method handles.
//!
//! Everything the bridge needs from the managed side is resolved once, when
//! the library loads, and held as global references for the lifetime of the
//! module. A class or signature that fails to resolve means the native
//! library and the managed declarations disagree, which is fatal.

use crate::error::{BridgeError, Result};
use jni::objects::{GlobalRef, JClass, JMethodID, JObject, JValue};
use jni::signature::{Primitive, ReturnType};
use jni::sys::jvalue;
use jni::JNIEnv;
use ktag_core::AudioProperties;

pub const METADATA_CLASS: &str = "com/simplecityapps/ktaglib/Metadata";
pub const METADATA_CTOR: &str =
    "(Ljava/util/Map;Lcom/simplecityapps/ktaglib/AudioProperties;)V";
pub const AUDIO_PROPERTIES_CLASS: &str = "com/simplecityapps/ktaglib/AudioProperties";
pub const AUDIO_PROPERTIES_CTOR: &str = "(IIII)V";

const HASH_MAP_CLASS: &str = "java/util/HashMap";
const MAP_CLASS: &str = "java/util/Map";
const MAP_ENTRY_CLASS: &str = "java/util/Map$Entry";
const SET_CLASS: &str = "java/util/Set";
const ITERATOR_CLASS: &str = "java/util/Iterator";
const ARRAY_LIST_CLASS: &str = "java/util/ArrayList";
const LIST_CLASS: &str = "java/util/List";

const OBJECT_GETTER: &str = "()Ljava/lang/Object;";

/// Process-wide handles into the managed runtime
///
/// Map and list reads go through the `Map`/`List` interfaces so that any
/// implementation the host passes in works; construction uses the concrete
/// `HashMap`/`ArrayList`.
pub struct BridgeRegistry {
    metadata_class: GlobalRef,
    metadata_init: JMethodID,

    audio_properties_class: GlobalRef,
    audio_properties_init: JMethodID,

    hash_map_class: GlobalRef,
    hash_map_init: JMethodID,
    hash_map_put: JMethodID,

    map_class: GlobalRef,
    map_entry_set: JMethodID,

    map_entry_class: GlobalRef,
    entry_get_key: JMethodID,
    entry_get_value: JMethodID,

    set_class: GlobalRef,
    set_iterator: JMethodID,

    iterator_class: GlobalRef,
    iterator_has_next: JMethodID,
    iterator_next: JMethodID,

    array_list_class: GlobalRef,
    array_list_init: JMethodID,
    array_list_add: JMethodID,

    list_class: GlobalRef,
    list_get: JMethodID,
    list_size: JMethodID,
}

fn class_ref(global: &GlobalRef) -> &JClass<'static> {
    <&JClass>::from(global.as_obj())
}

fn resolve_class(env: &mut JNIEnv<'_>, name: &str) -> Result<GlobalRef> {
    let local = env
        .find_class(name)
        .map_err(|e| BridgeError::resolve(name, e))?;
    let global = env
        .new_global_ref(&local)
        .map_err(|e| BridgeError::resolve(name, e))?;
    env.delete_local_ref(local)?;
    Ok(global)
}

fn resolve_method(
    env: &mut JNIEnv<'_>,
    class: &GlobalRef,
    class_name: &str,
    name: &str,
    signature: &str,
) -> Result<JMethodID> {
    env.get_method_id(class_ref(class), name, signature)
        .map_err(|e| BridgeError::resolve(format!("{}.{}{}", class_name, name, signature), e))
}

impl BridgeRegistry {
    /// Resolve every class and method the bridge uses.
    ///
    /// References acquired before a failure are released when the partially
    /// built handles drop.
    pub fn resolve(env: &mut JNIEnv<'_>) -> Result<Self> {
        let metadata_class = resolve_class(env, METADATA_CLASS)?;
        let metadata_init =
            resolve_method(env, &metadata_class, METADATA_CLASS, "<init>", METADATA_CTOR)?;

        let audio_properties_class = resolve_class(env, AUDIO_PROPERTIES_CLASS)?;
        let audio_properties_init = resolve_method(
            env,
            &audio_properties_class,
            AUDIO_PROPERTIES_CLASS,
            "<init>",
            AUDIO_PROPERTIES_CTOR,
        )?;

        let hash_map_class = resolve_class(env, HASH_MAP_CLASS)?;
        let hash_map_init = resolve_method(env, &hash_map_class, HASH_MAP_CLASS, "<init>", "()V")?;
        let hash_map_put = resolve_method(
            env,
            &hash_map_class,
            HASH_MAP_CLASS,
            "put",
            "(Ljava/lang/Object;Ljava/lang/Object;)Ljava/lang/Object;",
        )?;

        let map_class = resolve_class(env, MAP_CLASS)?;
        let map_entry_set =
            resolve_method(env, &map_class, MAP_CLASS, "entrySet", "()Ljava/util/Set;")?;

        let map_entry_class = resolve_class(env, MAP_ENTRY_CLASS)?;
        let entry_get_key =
            resolve_method(env, &map_entry_class, MAP_ENTRY_CLASS, "getKey", OBJECT_GETTER)?;
        let entry_get_value =
            resolve_method(env, &map_entry_class, MAP_ENTRY_CLASS, "getValue", OBJECT_GETTER)?;

        let set_class = resolve_class(env, SET_CLASS)?;
        let set_iterator =
            resolve_method(env, &set_class, SET_CLASS, "iterator", "()Ljava/util/Iterator;")?;

        let iterator_class = resolve_class(env, ITERATOR_CLASS)?;
        let iterator_has_next =
            resolve_method(env, &iterator_class, ITERATOR_CLASS, "hasNext", "()Z")?;
        let iterator_next =
            resolve_method(env, &iterator_class, ITERATOR_CLASS, "next", OBJECT_GETTER)?;

        let array_list_class = resolve_class(env, ARRAY_LIST_CLASS)?;
        let array_list_init =
            resolve_method(env, &array_list_class, ARRAY_LIST_CLASS, "<init>", "(I)V")?;
        let array_list_add = resolve_method(
            env,
            &array_list_class,
            ARRAY_LIST_CLASS,
            "add",
            "(Ljava/lang/Object;)Z",
        )?;

        let list_class = resolve_class(env, LIST_CLASS)?;
        let list_get = resolve_method(env, &list_class, LIST_CLASS, "get", "(I)Ljava/lang/Object;")?;
        let list_size = resolve_method(env, &list_class, LIST_CLASS, "size", "()I")?;

        Ok(Self {
            metadata_class,
            metadata_init,
            audio_properties_class,
            audio_properties_init,
            hash_map_class,
            hash_map_init,
            hash_map_put,
            map_class,
            map_entry_set,
            map_entry_class,
            entry_get_key,
            entry_get_value,
            set_class,
            set_iterator,
            iterator_class,
            iterator_has_next,
            iterator_next,
            array_list_class,
            array_list_init,
            array_list_add,
            list_class,
            list_get,
            list_size,
        })
    }
}

// Every unchecked call below uses a method ID resolved against the class (or
// interface) of the receiver, with arguments matching the resolved signature.
#[allow(unsafe_code)]
impl BridgeRegistry {
    fn call_object<'local>(
        env: &mut JNIEnv<'local>,
        receiver: &JObject<'_>,
        method: JMethodID,
        args: &[jvalue],
    ) -> Result<JObject<'local>> {
        // SAFETY: see impl comment
        let value = unsafe { env.call_method_unchecked(receiver, method, ReturnType::Object, args) }?;
        Ok(value.l()?)
    }

    fn call_boolean(
        env: &mut JNIEnv<'_>,
        receiver: &JObject<'_>,
        method: JMethodID,
        args: &[jvalue],
    ) -> Result<bool> {
        // SAFETY: see impl comment
        let value = unsafe {
            env.call_method_unchecked(
                receiver,
                method,
                ReturnType::Primitive(Primitive::Boolean),
                args,
            )
        }?;
        Ok(value.z()?)
    }

    /// `new HashMap()`
    pub fn new_hash_map<'local>(&self, env: &mut JNIEnv<'local>) -> Result<JObject<'local>> {
        // SAFETY: no-arg constructor of HashMap
        let map =
            unsafe { env.new_object_unchecked(class_ref(&self.hash_map_class), self.hash_map_init, &[]) }?;
        Ok(map)
    }

    /// `map.put(key, value)`, discarding the previous value
    pub fn map_put(
        &self,
        env: &mut JNIEnv<'_>,
        map: &JObject<'_>,
        key: &JObject<'_>,
        value: &JObject<'_>,
    ) -> Result<()> {
        let args = [JValue::Object(key).as_jni(), JValue::Object(value).as_jni()];
        let previous = Self::call_object(env, map, self.hash_map_put, &args)?;
        env.delete_local_ref(previous)?;
        Ok(())
    }

    /// `new ArrayList(capacity)`
    pub fn new_array_list<'local>(
        &self,
        env: &mut JNIEnv<'local>,
        capacity: usize,
    ) -> Result<JObject<'local>> {
        let capacity = i32::try_from(capacity).unwrap_or(i32::MAX);
        // SAFETY: ArrayList(int) constructor with one int argument
        let list = unsafe {
            env.new_object_unchecked(
                class_ref(&self.array_list_class),
                self.array_list_init,
                &[JValue::Int(capacity).as_jni()],
            )
        }?;
        Ok(list)
    }

    /// `list.add(element)`
    pub fn list_add(
        &self,
        env: &mut JNIEnv<'_>,
        list: &JObject<'_>,
        element: &JObject<'_>,
    ) -> Result<bool> {
        Self::call_boolean(
            env,
            list,
            self.array_list_add,
            &[JValue::Object(element).as_jni()],
        )
    }

    /// `list.size()`
    pub fn list_size(&self, env: &mut JNIEnv<'_>, list: &JObject<'_>) -> Result<i32> {
        // SAFETY: see impl comment
        let value = unsafe {
            env.call_method_unchecked(list, self.list_size, ReturnType::Primitive(Primitive::Int), &[])
        }?;
        Ok(value.i()?)
    }

    /// `list.get(index)`
    pub fn list_get<'local>(
        &self,
        env: &mut JNIEnv<'local>,
        list: &JObject<'_>,
        index: i32,
    ) -> Result<JObject<'local>> {
        Self::call_object(env, list, self.list_get, &[JValue::Int(index).as_jni()])
    }

    /// `map.entrySet().iterator()`
    pub fn entry_iterator<'local>(
        &self,
        env: &mut JNIEnv<'local>,
        map: &JObject<'_>,
    ) -> Result<JObject<'local>> {
        let entries = Self::call_object(env, map, self.map_entry_set, &[])?;
        let iterator = Self::call_object(env, &entries, self.set_iterator, &[])?;
        env.delete_local_ref(entries)?;
        Ok(iterator)
    }

    /// `iterator.hasNext() ? iterator.next() : None`
    pub fn iterator_next<'local>(
        &self,
        env: &mut JNIEnv<'local>,
        iterator: &JObject<'_>,
    ) -> Result<Option<JObject<'local>>> {
        if !Self::call_boolean(env, iterator, self.iterator_has_next, &[])? {
            return Ok(None);
        }
        Self::call_object(env, iterator, self.iterator_next, &[]).map(Some)
    }

    /// `(entry.getKey(), entry.getValue())`
    pub fn entry_parts<'local>(
        &self,
        env: &mut JNIEnv<'local>,
        entry: &JObject<'_>,
    ) -> Result<(JObject<'local>, JObject<'local>)> {
        let key = Self::call_object(env, entry, self.entry_get_key, &[])?;
        let value = Self::call_object(env, entry, self.entry_get_value, &[])?;
        Ok((key, value))
    }

    /// `new AudioProperties(duration, bitrate, sampleRate, channels)`
    pub fn new_audio_properties<'local>(
        &self,
        env: &mut JNIEnv<'local>,
        properties: &AudioProperties,
    ) -> Result<JObject<'local>> {
        let args = [
            JValue::Int(properties.duration_ms).as_jni(),
            JValue::Int(properties.bitrate).as_jni(),
            JValue::Int(properties.sample_rate).as_jni(),
            JValue::Int(properties.channels).as_jni(),
        ];
        // SAFETY: (IIII)V constructor, four ints in declaration order
        let object = unsafe {
            env.new_object_unchecked(
                class_ref(&self.audio_properties_class),
                self.audio_properties_init,
                &args,
            )
        }?;
        Ok(object)
    }

    /// `new Metadata(map, audioProperties)`; `audio_properties` may be null
    pub fn new_metadata<'local>(
        &self,
        env: &mut JNIEnv<'local>,
        map: &JObject<'_>,
        audio_properties: &JObject<'_>,
    ) -> Result<JObject<'local>> {
        let args = [
            JValue::Object(map).as_jni(),
            JValue::Object(audio_properties).as_jni(),
        ];
        // SAFETY: (Map, AudioProperties) constructor
        let object = unsafe {
            env.new_object_unchecked(class_ref(&self.metadata_class), self.metadata_init, &args)
        }?;
        Ok(object)
    }
}
