/// Integration tests for metadata reading
///
/// Fixture files are written to temp files and read back through their raw
/// descriptors, the way a host hands them over.
use ktag_core::fixtures::{self, FixturePicture, FRONT_COVER};
use ktag_core::{MetadataReader, PropertyMap};
use ktag_metadata::LoftyMetadataReader;
use std::io::{Read, Seek, SeekFrom};
use std::os::fd::AsRawFd;

#[test]
fn flac_multi_value_tags() {
    let file = fixtures::temp_file(&fixtures::flac(
        &[("ARTIST", "A"), ("ARTIST", "B"), ("TITLE", "Song")],
        &[],
    ))
    .unwrap();

    let metadata = LoftyMetadataReader::new()
        .read(file.as_raw_fd())
        .unwrap()
        .expect("FLAC should be recognised");

    let expected: PropertyMap = [("ARTIST", vec!["A", "B"]), ("TITLE", vec!["Song"])]
        .into_iter()
        .collect();
    assert_eq!(metadata.properties, expected);
}

#[test]
fn flac_audio_properties() {
    let file = fixtures::temp_file(&fixtures::flac(&[("TITLE", "Song")], &[])).unwrap();

    let metadata = LoftyMetadataReader::new()
        .read(file.as_raw_fd())
        .unwrap()
        .unwrap();

    let props = metadata
        .audio_properties
        .expect("STREAMINFO describes an audio stream");
    assert_eq!(props.sample_rate, 44100);
    assert_eq!(props.channels, 2);
    assert!(
        (999..=1000).contains(&props.duration_ms),
        "Duration should be around 1000ms, got: {}",
        props.duration_ms
    );
    assert!(props.bitrate >= 0);
}

#[test]
fn flac_without_comments_has_empty_map() {
    let file = fixtures::temp_file(&fixtures::flac(&[], &[])).unwrap();

    let metadata = LoftyMetadataReader::new()
        .read(file.as_raw_fd())
        .unwrap()
        .expect("tagless FLAC is still a FLAC");

    assert!(metadata.properties.is_empty());
}

#[test]
fn pictures_do_not_leak_into_properties() {
    let file = fixtures::temp_file(&fixtures::flac(
        &[("TITLE", "Song")],
        &[FixturePicture::png(FRONT_COVER, 64, 7)],
    ))
    .unwrap();

    let metadata = LoftyMetadataReader::new()
        .read(file.as_raw_fd())
        .unwrap()
        .unwrap();

    let keys: Vec<_> = metadata.properties.keys().collect();
    assert_eq!(keys, ["TITLE"]);
}

#[test]
fn opus_tags_and_properties() {
    let file = fixtures::temp_file(&fixtures::opus(
        &[("ALBUM", "Record"), ("TITLE", "Song")],
        &[],
    ))
    .unwrap();

    let metadata = LoftyMetadataReader::new()
        .read(file.as_raw_fd())
        .unwrap()
        .expect("Opus should be recognised");

    let expected: PropertyMap = [("ALBUM", vec!["Record"]), ("TITLE", vec!["Song"])]
        .into_iter()
        .collect();
    assert_eq!(metadata.properties, expected);

    let props = metadata.audio_properties.unwrap();
    assert_eq!(props.channels, 2);
}

#[test]
fn opus_pictures_and_vendor_are_not_properties() {
    let file = fixtures::temp_file(&fixtures::opus(
        &[("TITLE", "Song")],
        &[FixturePicture::png(FRONT_COVER, 64, 7)],
    ))
    .unwrap();

    let metadata = LoftyMetadataReader::new()
        .read(file.as_raw_fd())
        .unwrap()
        .unwrap();

    let keys: Vec<_> = metadata.properties.keys().collect();
    assert_eq!(keys, ["TITLE"]);
}

#[test]
fn undecodable_audio_keeps_tags() {
    let file = fixtures::temp_file(&fixtures::mpeg_with_id3("Song")).unwrap();

    let metadata = LoftyMetadataReader::new()
        .read(file.as_raw_fd())
        .unwrap()
        .expect("tags survive a broken audio stream");

    let expected: PropertyMap = [("TITLE", vec!["Song"])].into_iter().collect();
    assert_eq!(metadata.properties, expected);
    assert!(metadata.audio_properties.is_none());
}

#[test]
fn wav_id3_title() {
    let file = fixtures::temp_file(&fixtures::wav_with_id3("Wave Song", &[])).unwrap();

    let metadata = LoftyMetadataReader::new()
        .read(file.as_raw_fd())
        .unwrap()
        .expect("WAV should be recognised");

    assert_eq!(metadata.properties.get("TITLE").unwrap(), ["Wave Song"]);
    let props = metadata.audio_properties.unwrap();
    assert_eq!(props.sample_rate, 44100);
    assert_eq!(props.channels, 2);
}

#[test]
fn unrecognised_content_returns_none() {
    let file = fixtures::temp_file(b"Not a valid audio file").unwrap();

    let result = LoftyMetadataReader::new().read(file.as_raw_fd()).unwrap();
    assert!(result.is_none());
}

#[test]
fn empty_file_returns_none() {
    let file = fixtures::temp_file(&[]).unwrap();

    let result = LoftyMetadataReader::new().read(file.as_raw_fd()).unwrap();
    assert!(result.is_none());
}

#[test]
fn invalid_descriptors_return_none() {
    let reader = LoftyMetadataReader::new();
    assert!(reader.read(-1).unwrap().is_none());
    assert!(reader.read(1 << 20).unwrap().is_none());
}

#[test]
fn repeated_reads_are_equal() {
    let file = fixtures::temp_file(&fixtures::flac(
        &[("ARTIST", "A"), ("GENRE", "Jazz")],
        &[],
    ))
    .unwrap();
    let reader = LoftyMetadataReader::new();

    let first = reader.read(file.as_raw_fd()).unwrap();
    let second = reader.read(file.as_raw_fd()).unwrap();

    assert!(first.is_some());
    assert_eq!(first, second);
}

#[test]
fn host_descriptor_survives_read() {
    let bytes = fixtures::flac(&[("TITLE", "Song")], &[]);
    let mut file = fixtures::temp_file(&bytes).unwrap();

    LoftyMetadataReader::new()
        .read(file.as_raw_fd())
        .unwrap()
        .unwrap();

    file.seek(SeekFrom::Start(0)).unwrap();
    let mut contents = Vec::new();
    file.read_to_end(&mut contents).unwrap();
    assert_eq!(contents, bytes);
}

#[test]
fn write_reports_unsupported() {
    let file = fixtures::temp_file(&fixtures::flac(&[("TITLE", "Song")], &[])).unwrap();
    let properties: PropertyMap = [("TITLE", vec!["Other"])].into_iter().collect();

    let result = LoftyMetadataReader::new().write(file.as_raw_fd(), &properties);

    let err = result.unwrap_err();
    assert_eq!(err.to_string(), "Tag writing not yet implemented");
}
