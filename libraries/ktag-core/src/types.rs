//! Plain value types returned by the extraction pipelines.
//!
//! None of these know about the managed runtime; the JNI adapter converts
//! them at the boundary.

use lofty::{FileProperties, PictureType};
use std::collections::BTreeMap;
use std::time::Duration;

/// Tag name to ordered list of values (one key may carry several artists, etc.)
///
/// Keys iterate in sorted order. Values keep the order the tag reported them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PropertyMap {
    entries: BTreeMap<String, Vec<String>>,
}

impl PropertyMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `value` to the values of `key`
    pub fn push(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries
            .entry(key.into())
            .or_default()
            .push(value.into());
    }

    /// Replace every value of `key`
    pub fn replace(&mut self, key: impl Into<String>, values: Vec<String>) {
        self.entries.insert(key.into(), values);
    }

    pub fn get(&self, key: &str) -> Option<&[String]> {
        self.entries.get(key).map(Vec::as_slice)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries
            .iter()
            .map(|(key, values)| (key.as_str(), values.as_slice()))
    }

    /// Number of distinct keys
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for PropertyMap
where
    K: Into<String>,
    V: IntoIterator,
    V::Item: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (key, values) in iter {
            let key = key.into();
            for value in values {
                map.push(key.clone(), value);
            }
        }
        map
    }
}

/// Audio stream properties, in the order the managed constructor takes them
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AudioProperties {
    pub duration_ms: i32,
    /// Kilobits per second
    pub bitrate: i32,
    /// Hz
    pub sample_rate: i32,
    pub channels: i32,
}

impl AudioProperties {
    pub fn new(duration_ms: i32, bitrate: i32, sample_rate: i32, channels: i32) -> Self {
        Self {
            duration_ms,
            bitrate,
            sample_rate,
            channels,
        }
    }

    /// Build properties from raw stream values.
    ///
    /// Returns `None` when nothing describes a decodable stream: zero duration
    /// and no sample rate and no channel count. Any single known value is
    /// enough; unknown values become zero.
    pub fn from_parts(
        duration: Duration,
        bitrate: Option<u32>,
        sample_rate: Option<u32>,
        channels: Option<u8>,
    ) -> Option<Self> {
        let sample_rate = sample_rate.unwrap_or(0);
        let channels = channels.unwrap_or(0);

        if duration.is_zero() && sample_rate == 0 && channels == 0 {
            return None;
        }

        Some(Self {
            duration_ms: i32::try_from(duration.as_millis()).unwrap_or(i32::MAX),
            bitrate: i32::try_from(bitrate.unwrap_or(0)).unwrap_or(i32::MAX),
            sample_rate: i32::try_from(sample_rate).unwrap_or(i32::MAX),
            channels: i32::from(channels),
        })
    }

    /// Properties as lofty reports them; prefers the audio bitrate over the overall one
    pub fn from_file_properties(properties: &FileProperties) -> Option<Self> {
        Self::from_parts(
            properties.duration(),
            properties
                .audio_bitrate()
                .or_else(|| properties.overall_bitrate()),
            properties.sample_rate(),
            properties.channels(),
        )
    }
}

/// Result of one metadata extraction
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Metadata {
    pub properties: PropertyMap,
    /// Absent when the file has no decodable audio stream
    pub audio_properties: Option<AudioProperties>,
}

impl Metadata {
    pub fn new(properties: PropertyMap, audio_properties: Option<AudioProperties>) -> Self {
        Self {
            properties,
            audio_properties,
        }
    }
}

/// One embedded picture found while scanning a container
#[derive(Debug, Clone, Copy)]
pub struct PictureCandidate<'a> {
    pub picture_type: PictureType,
    pub mime_type: Option<&'a str>,
    pub data: &'a [u8],
}

impl<'a> PictureCandidate<'a> {
    pub fn from_picture(picture: &'a lofty::Picture) -> Self {
        Self {
            picture_type: picture.pic_type(),
            mime_type: picture.mime_type().map(|m| m.as_str()),
            data: picture.data(),
        }
    }

    /// Payload size in bytes
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Artwork extracted from an audio file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtworkData {
    /// Raw image bytes
    pub data: Vec<u8>,
    /// MIME type as stored in the file, if any
    pub mime_type: Option<String>,
    pub picture_type: PictureType,
}

impl ArtworkData {
    pub fn from_candidate(candidate: &PictureCandidate<'_>) -> Self {
        Self {
            data: candidate.data.to_vec(),
            mime_type: candidate.mime_type.map(str::to_string),
            picture_type: candidate.picture_type,
        }
    }
}
