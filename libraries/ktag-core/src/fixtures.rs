//! Hand-built audio files for tests.
//!
//! Each builder produces the smallest byte layout lofty accepts for the
//! container: FLAC metadata blocks with no frames, a three-page Ogg Opus
//! stream, and a silent WAV carrying an ID3v2 chunk.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use std::fs::File;
use ogg_pager::{CONTAINS_FIRST_PAGE_OF_BITSTREAM, CONTAINS_LAST_PAGE_OF_BITSTREAM};
use std::io::{Seek, SeekFrom, Write};

/// Front cover, as numbered in ID3v2 APIC and FLAC PICTURE
pub const FRONT_COVER: u8 = 3;
pub const BACK_COVER: u8 = 4;

/// Picture to embed in a fixture
#[derive(Debug, Clone)]
pub struct FixturePicture {
    pub picture_type: u8,
    pub mime_type: &'static str,
    pub data: Vec<u8>,
}

impl FixturePicture {
    /// A `size`-byte PNG-labelled payload filled with `fill`
    pub fn png(picture_type: u8, size: usize, fill: u8) -> Self {
        Self {
            picture_type,
            mime_type: "image/png",
            data: vec![fill; size],
        }
    }

    /// Body of a FLAC PICTURE block (also the METADATA_BLOCK_PICTURE payload)
    pub fn flac_block(&self) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(&u32::from(self.picture_type).to_be_bytes());
        out.extend_from_slice(&(self.mime_type.len() as u32).to_be_bytes());
        out.extend_from_slice(self.mime_type.as_bytes());
        out.extend_from_slice(&0u32.to_be_bytes()); // description
        out.extend_from_slice(&1u32.to_be_bytes()); // width
        out.extend_from_slice(&1u32.to_be_bytes()); // height
        out.extend_from_slice(&24u32.to_be_bytes()); // depth
        out.extend_from_slice(&0u32.to_be_bytes()); // indexed colours
        out.extend_from_slice(&(self.data.len() as u32).to_be_bytes());
        out.extend_from_slice(&self.data);
        out
    }
}

const FLAC_STREAMINFO: u8 = 0;
const FLAC_VORBIS_COMMENT: u8 = 4;
const FLAC_PICTURE: u8 = 6;

/// FLAC file: one second of 44.1kHz stereo 16-bit (declared, no frames)
pub fn flac(comments: &[(&str, &str)], pictures: &[FixturePicture]) -> Vec<u8> {
    let mut blocks = vec![(FLAC_STREAMINFO, flac_streaminfo(44100, 2, 16, 44100))];
    if !comments.is_empty() {
        blocks.push((FLAC_VORBIS_COMMENT, vorbis_comments(comments)));
    }
    for picture in pictures {
        blocks.push((FLAC_PICTURE, picture.flac_block()));
    }

    let mut out = b"fLaC".to_vec();
    let last = blocks.len() - 1;
    for (i, (block_type, body)) in blocks.into_iter().enumerate() {
        let flag = if i == last { 0x80 } else { 0x00 };
        out.push(block_type | flag);
        out.extend_from_slice(&(body.len() as u32).to_be_bytes()[1..]);
        out.extend_from_slice(&body);
    }
    out
}

fn flac_streaminfo(sample_rate: u64, channels: u64, bits_per_sample: u64, samples: u64) -> Vec<u8> {
    let mut out = Vec::with_capacity(34);
    out.extend_from_slice(&4096u16.to_be_bytes()); // min block size
    out.extend_from_slice(&4096u16.to_be_bytes()); // max block size
    out.extend_from_slice(&[0; 3]); // min frame size
    out.extend_from_slice(&[0; 3]); // max frame size
    let packed = (sample_rate << 44)
        | ((channels - 1) << 41)
        | ((bits_per_sample - 1) << 36)
        | (samples & 0xF_FFFF_FFFF);
    out.extend_from_slice(&packed.to_be_bytes());
    out.extend_from_slice(&[0; 16]); // MD5
    out
}

/// Vorbis comment body without framing bit (FLAC layout)
fn vorbis_comments(comments: &[(&str, &str)]) -> Vec<u8> {
    let vendor = b"ktag fixtures";
    let mut out = Vec::new();
    out.extend_from_slice(&(vendor.len() as u32).to_le_bytes());
    out.extend_from_slice(vendor);
    out.extend_from_slice(&(comments.len() as u32).to_le_bytes());
    for (key, value) in comments {
        let comment = format!("{}={}", key, value);
        out.extend_from_slice(&(comment.len() as u32).to_le_bytes());
        out.extend_from_slice(comment.as_bytes());
    }
    out
}

const OPUS_PRE_SKIP: u16 = 312;

/// Ogg Opus file: one second of 48kHz stereo
///
/// Pictures go into the comment block as METADATA_BLOCK_PICTURE entries.
pub fn opus(comments: &[(&str, &str)], pictures: &[FixturePicture]) -> Vec<u8> {
    let serial = 0x6b74_6167;

    let mut head = b"OpusHead".to_vec();
    head.push(1); // version
    head.push(2); // channels
    head.extend_from_slice(&OPUS_PRE_SKIP.to_le_bytes());
    head.extend_from_slice(&48000u32.to_le_bytes());
    head.extend_from_slice(&0i16.to_le_bytes()); // output gain
    head.push(0); // mapping family

    let encoded: Vec<String> = pictures
        .iter()
        .map(|picture| STANDARD.encode(picture.flac_block()))
        .collect();
    let mut all_comments: Vec<(&str, &str)> = comments.to_vec();
    for picture in &encoded {
        all_comments.push(("METADATA_BLOCK_PICTURE", picture.as_str()));
    }

    let mut tags = b"OpusTags".to_vec();
    tags.extend_from_slice(&vorbis_comments(&all_comments));

    let granule = 48000 + u64::from(OPUS_PRE_SKIP);
    ogg_stream(
        serial,
        &[
            (head.as_slice(), 0),
            (tags.as_slice(), 0),
            (&[0xFC, 0xFF, 0xFE][..], granule),
        ],
    )
}

/// Ogg stream with each packet starting a fresh page
///
/// `packets` pairs each packet with the granule position of its last page.
fn ogg_stream(serial: u32, packets: &[(&[u8], u64)]) -> Vec<u8> {
    let last = packets.len().saturating_sub(1);
    let mut out = Vec::new();
    let mut sequence = 0;

    for (i, &(packet, granule)) in packets.iter().enumerate() {
        let mut flags = 0;
        if i == 0 {
            flags |= CONTAINS_FIRST_PAGE_OF_BITSTREAM;
        }
        if i == last {
            flags |= CONTAINS_LAST_PAGE_OF_BITSTREAM;
        }

        let pages = ogg_pager::paginate([packet], serial, granule, flags)
            .expect("paginating an in-memory packet");
        for mut page in pages {
            page.header_mut().sequence_number = sequence;
            sequence += 1;
            page.gen_crc();
            out.extend_from_slice(&page.as_bytes());
        }
    }

    out
}

/// ID3v2-tagged MPEG stream holding a single frame with nothing after it
///
/// Probing recognises it as MPEG, but there is no second frame to confirm
/// the stream, so audio properties cannot be decoded.
pub fn mpeg_with_id3(title: &str) -> Vec<u8> {
    // MPEG-1 layer III, 128 kbit/s, 44.1 kHz, joint stereo: 417-byte frame
    let frame_header = [0xFF, 0xFB, 0x90, 0x64];

    let mut out = id3v2(title, &[]);
    out.extend_from_slice(&frame_header);
    out.extend_from_slice(&[0u8; 413]);
    out
}

/// Silent 0.1s WAV (44.1kHz stereo) with an ID3v2.4 chunk holding a title and pictures
pub fn wav_with_id3(title: &str, pictures: &[FixturePicture]) -> Vec<u8> {
    let sample_rate = 44100u32;
    let channels = 2u16;
    let num_samples = 4410usize;
    let data_size = (num_samples * channels as usize * 2) as u32;

    let mut fmt = Vec::new();
    fmt.extend_from_slice(&1u16.to_le_bytes()); // PCM
    fmt.extend_from_slice(&channels.to_le_bytes());
    fmt.extend_from_slice(&sample_rate.to_le_bytes());
    fmt.extend_from_slice(&(sample_rate * u32::from(channels) * 2).to_le_bytes());
    fmt.extend_from_slice(&(channels * 2).to_le_bytes());
    fmt.extend_from_slice(&16u16.to_le_bytes());

    let mut body = b"WAVE".to_vec();
    push_riff_chunk(&mut body, b"fmt ", &fmt);
    push_riff_chunk(&mut body, b"data", &vec![0u8; data_size as usize]);
    push_riff_chunk(&mut body, b"ID3 ", &id3v2(title, pictures));

    let mut out = b"RIFF".to_vec();
    out.extend_from_slice(&(body.len() as u32).to_le_bytes());
    out.extend_from_slice(&body);
    out
}

fn push_riff_chunk(out: &mut Vec<u8>, id: &[u8; 4], content: &[u8]) {
    out.extend_from_slice(id);
    out.extend_from_slice(&(content.len() as u32).to_le_bytes());
    out.extend_from_slice(content);
    if content.len() % 2 == 1 {
        out.push(0);
    }
}

fn id3v2(title: &str, pictures: &[FixturePicture]) -> Vec<u8> {
    let mut frames = Vec::new();

    let mut tit2 = vec![3u8]; // UTF-8
    tit2.extend_from_slice(title.as_bytes());
    push_id3_frame(&mut frames, b"TIT2", &tit2);

    for picture in pictures {
        let mut apic = vec![0u8]; // Latin-1
        apic.extend_from_slice(picture.mime_type.as_bytes());
        apic.push(0);
        apic.push(picture.picture_type);
        apic.push(0); // empty description
        apic.extend_from_slice(&picture.data);
        push_id3_frame(&mut frames, b"APIC", &apic);
    }

    let mut out = b"ID3".to_vec();
    out.extend_from_slice(&[4, 0, 0]); // v2.4.0, no flags
    out.extend_from_slice(&synchsafe(frames.len() as u32));
    out.extend_from_slice(&frames);
    out
}

fn push_id3_frame(out: &mut Vec<u8>, id: &[u8; 4], content: &[u8]) {
    out.extend_from_slice(id);
    out.extend_from_slice(&synchsafe(content.len() as u32));
    out.extend_from_slice(&[0, 0]); // flags
    out.extend_from_slice(content);
}

fn synchsafe(value: u32) -> [u8; 4] {
    [
        ((value >> 21) & 0x7F) as u8,
        ((value >> 14) & 0x7F) as u8,
        ((value >> 7) & 0x7F) as u8,
        (value & 0x7F) as u8,
    ]
}

/// Write `bytes` to an anonymous temp file and leave the offset at EOF,
/// like a descriptor a host has already used
pub fn temp_file(bytes: &[u8]) -> std::io::Result<File> {
    let mut file = tempfile::tempfile()?;
    file.write_all(bytes)?;
    file.seek(SeekFrom::End(0))?;
    Ok(file)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ogg_pager::Page;
    use std::io::Cursor;

    #[test]
    fn synchsafe_encoding() {
        assert_eq!(synchsafe(0), [0, 0, 0, 0]);
        assert_eq!(synchsafe(127), [0, 0, 0, 127]);
        assert_eq!(synchsafe(128), [0, 0, 1, 0]);
        assert_eq!(synchsafe(257), [0, 0, 2, 1]);
    }

    #[test]
    fn flac_marks_only_last_block() {
        let bytes = flac(&[("TITLE", "x")], &[FixturePicture::png(FRONT_COVER, 4, 1)]);
        assert_eq!(&bytes[..4], b"fLaC");
        assert_eq!(bytes[4], FLAC_STREAMINFO);
        assert_eq!(&bytes[5..8], &[0, 0, 34]);
        let comment_header = 8 + 34;
        assert_eq!(bytes[comment_header], FLAC_VORBIS_COMMENT);
    }

    #[test]
    fn opus_pages_are_sequenced() {
        let mut reader = Cursor::new(opus(&[("TITLE", "x")], &[]));

        let mut pages = Vec::new();
        while let Ok(page) = Page::read(&mut reader) {
            pages.push(page);
        }

        let sequences: Vec<u32> = pages.iter().map(|p| p.header().sequence_number).collect();
        assert_eq!(sequences, [0, 1, 2]);
        assert_eq!(pages[0].header().header_type_flag(), CONTAINS_FIRST_PAGE_OF_BITSTREAM);
        assert_eq!(pages[2].header().header_type_flag(), CONTAINS_LAST_PAGE_OF_BITSTREAM);
        assert_eq!(pages[2].header().abgp, 48000 + u64::from(OPUS_PRE_SKIP));
        assert!(pages[0].content().starts_with(b"OpusHead"));
        assert!(pages[1].content().starts_with(b"OpusTags"));
    }

    #[test]
    fn opus_page_checksums_verify() {
        let mut reader = Cursor::new(opus(&[], &[FixturePicture::png(FRONT_COVER, 64, 1)]));

        while let Ok(page) = Page::read(&mut reader) {
            let mut recomputed = page.clone();
            recomputed.gen_crc();
            assert_eq!(page.header().checksum(), recomputed.header().checksum());
        }
    }

    #[test]
    fn mpeg_frame_follows_id3_tag() {
        let bytes = mpeg_with_id3("Song");
        assert_eq!(&bytes[..3], b"ID3");

        let tag_len = 10 + bytes[6..10]
            .iter()
            .fold(0usize, |len, &b| (len << 7) | usize::from(b));
        assert_eq!(&bytes[tag_len..tag_len + 2], &[0xFF, 0xFB]);
        assert_eq!(bytes.len(), tag_len + 417);
    }
}
