//! Test utilities for artwork testing
//!
//! Builders for synthetic audio containers carrying known pictures. The
//! files hold no decodable audio, only enough structure for the metadata
//! readers.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use id3::frame::{Picture, PictureType};
use id3::{TagLike, Version};
use std::path::Path;

/// Codec carried by a synthetic Ogg stream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OggCodec {
    Vorbis,
    Opus,
}

/// FLAC picture block body (front cover, no description, zero dimensions)
pub fn picture_block(mime: &str, data: &[u8]) -> Vec<u8> {
    picture_block_with_description(mime, b"", data)
}

/// FLAC picture block body with raw description bytes, which need not be UTF-8
pub fn picture_block_with_description(mime: &str, description: &[u8], data: &[u8]) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(&3u32.to_be_bytes());
    out.extend_from_slice(&(mime.len() as u32).to_be_bytes());
    out.extend_from_slice(mime.as_bytes());
    out.extend_from_slice(&(description.len() as u32).to_be_bytes());
    out.extend_from_slice(description);
    out.extend_from_slice(&[0u8; 16]);
    out.extend_from_slice(&(data.len() as u32).to_be_bytes());
    out.extend_from_slice(data);
    out
}

/// Base64 value for a `METADATA_BLOCK_PICTURE` comment
pub fn picture_comment_value(mime: &str, data: &[u8]) -> String {
    STANDARD.encode(picture_block(mime, data))
}

/// Native FLAC stream with one PICTURE block per entry, in order
pub fn flac_file(pictures: &[(&str, &[u8])]) -> Vec<u8> {
    flac_file_with_picture_blocks(
        &pictures
            .iter()
            .map(|(mime, data)| picture_block(mime, data))
            .collect::<Vec<_>>(),
    )
}

/// Native FLAC stream with the given PICTURE block bodies, in order
pub fn flac_file_with_picture_blocks(picture_blocks: &[Vec<u8>]) -> Vec<u8> {
    let mut blocks: Vec<(u8, Vec<u8>)> = vec![(0, stream_info()), (4, vorbis_comment_body(&[]))];
    blocks.extend(picture_blocks.iter().map(|body| (6, body.clone())));
    blocks.push((1, vec![0u8; 64]));

    let mut out = b"fLaC".to_vec();
    let count = blocks.len();
    for (i, (kind, body)) in blocks.into_iter().enumerate() {
        let last = if i + 1 == count { 0x80 } else { 0 };
        let len = body.len() as u32;
        out.push(last | kind);
        out.extend_from_slice(&len.to_be_bytes()[1..]);
        out.extend(body);
    }
    // a frame sync so the file does not end on metadata
    out.extend_from_slice(&[0xFF, 0xF8, 0x69, 0x08, 0x00, 0x00]);
    out
}

/// Ogg stream of the given codec whose comment header carries `comments`
/// (`KEY=value` strings)
pub fn ogg_file(codec: OggCodec, comments: &[String]) -> Vec<u8> {
    let serial = 0x5EED_0001;
    let (identification, magic) = match codec {
        OggCodec::Vorbis => {
            let mut ident = b"\x01vorbis".to_vec();
            ident.extend_from_slice(&[0u8; 23]);
            (ident, b"\x03vorbis".as_slice())
        }
        OggCodec::Opus => {
            let mut ident = b"OpusHead".to_vec();
            ident.extend_from_slice(&[1, 2, 0x38, 0x01, 0x80, 0xBB, 0, 0, 0, 0, 0]);
            (ident, b"OpusTags".as_slice())
        }
    };

    let mut comment = magic.to_vec();
    comment.extend(vorbis_comment_body(comments));
    if codec == OggCodec::Vorbis {
        comment.push(1);
    }

    let mut packets = vec![identification, comment];
    if codec == OggCodec::Vorbis {
        packets.push(b"\x05vorbis\x00".to_vec());
    }
    packets.push(vec![0u8; 32]);

    let mut out = Vec::new();
    let mut sequence = 0u32;
    let packet_count = packets.len();
    for (index, packet) in packets.iter().enumerate() {
        let mut lacing = vec![255u8; packet.len() / 255];
        lacing.push((packet.len() % 255) as u8);

        let mut offset = 0usize;
        let chunk_count = lacing.chunks(255).count();
        for (chunk_index, chunk) in lacing.chunks(255).enumerate() {
            let mut header_type = 0u8;
            if chunk_index > 0 {
                header_type |= 0x01;
            }
            if index == 0 {
                header_type |= 0x02;
            }
            if index + 1 == packet_count && chunk_index + 1 == chunk_count {
                header_type |= 0x04;
            }

            let body_len: usize = chunk.iter().map(|v| *v as usize).sum();
            let body = &packet[offset..offset + body_len];
            offset += body_len;

            write_page(&mut out, header_type, serial, sequence, chunk, body);
            sequence += 1;
        }
    }
    out
}

/// Ogg stream whose comment header holds one `METADATA_BLOCK_PICTURE` per value
pub fn ogg_with_picture_values(codec: OggCodec, values: &[String]) -> Vec<u8> {
    let mut comments = vec!["TITLE=Synthetic".to_string()];
    comments.extend(values.iter().map(|v| format!("METADATA_BLOCK_PICTURE={}", v)));
    ogg_file(codec, &comments)
}

/// M4A file with a single `covr` data atom
pub fn m4a_file(type_indicator: u32, image: &[u8]) -> Vec<u8> {
    let mut data = type_indicator.to_be_bytes().to_vec();
    data.extend_from_slice(&[0u8; 4]);
    data.extend_from_slice(image);

    let ilst = atom(b"ilst", &atom(b"covr", &atom(b"data", &data)));
    let mut meta = vec![0u8; 4];
    meta.extend(atom(b"hdlr", &[0u8; 25]));
    meta.extend(ilst);

    let mut moov = atom(b"mvhd", &[0u8; 100]);
    moov.extend(atom(b"udta", &atom(b"meta", &meta)));

    let mut out = atom(b"ftyp", b"M4A \x00\x00\x02\x00M4A mp42isom");
    out.extend(atom(b"moov", &moov));
    out.extend(atom(b"mdat", &[0u8; 128]));
    out
}

/// Write an MP3-looking file, with an ID3v2.4 APIC frame when `picture` is set
pub fn write_mp3(path: &Path, picture: Option<(&str, &[u8])>) -> std::io::Result<()> {
    let mut frames = vec![0xFF, 0xFB, 0x90, 0x64];
    frames.resize(1024, 0);
    std::fs::write(path, frames)?;

    let mut tag = id3::Tag::new();
    tag.set_title("Synthetic");
    if let Some((mime, data)) = picture {
        tag.add_frame(Picture {
            mime_type: mime.to_string(),
            picture_type: PictureType::CoverFront,
            description: String::new(),
            data: data.to_vec(),
        });
    }
    tag.write_to_path(path, Version::Id3v24)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e.to_string()))
}

/// STREAMINFO for 44.1 kHz 16-bit stereo, 4096-sample blocks
fn stream_info() -> Vec<u8> {
    let mut out = Vec::with_capacity(34);
    out.extend_from_slice(&4096u16.to_be_bytes());
    out.extend_from_slice(&4096u16.to_be_bytes());
    out.extend_from_slice(&[0u8; 6]);
    let packed: u64 = (44_100u64 << 44) | (1u64 << 41) | (15u64 << 36);
    out.extend_from_slice(&packed.to_be_bytes());
    out.extend_from_slice(&[0u8; 16]);
    out
}

fn vorbis_comment_body(comments: &[String]) -> Vec<u8> {
    let vendor = b"coverfix test-utils";
    let mut out = (vendor.len() as u32).to_le_bytes().to_vec();
    out.extend_from_slice(vendor);
    out.extend_from_slice(&(comments.len() as u32).to_le_bytes());
    for comment in comments {
        out.extend_from_slice(&(comment.len() as u32).to_le_bytes());
        out.extend_from_slice(comment.as_bytes());
    }
    out
}

fn atom(name: &[u8; 4], payload: &[u8]) -> Vec<u8> {
    let mut out = ((payload.len() + 8) as u32).to_be_bytes().to_vec();
    out.extend_from_slice(name);
    out.extend_from_slice(payload);
    out
}

fn write_page(out: &mut Vec<u8>, header_type: u8, serial: u32, sequence: u32, lacing: &[u8], body: &[u8]) {
    let start = out.len();
    out.extend_from_slice(b"OggS");
    out.push(0);
    out.push(header_type);
    out.extend_from_slice(&0u64.to_le_bytes());
    out.extend_from_slice(&serial.to_le_bytes());
    out.extend_from_slice(&sequence.to_le_bytes());
    out.extend_from_slice(&[0u8; 4]);
    out.push(lacing.len() as u8);
    out.extend_from_slice(lacing);
    out.extend_from_slice(body);

    let crc = ogg_crc(&out[start..]);
    out[start + 22..start + 26].copy_from_slice(&crc.to_le_bytes());
}

fn ogg_crc(page: &[u8]) -> u32 {
    page.iter().fold(0u32, |crc, byte| {
        let mut crc = crc ^ (u32::from(*byte) << 24);
        for _ in 0..8 {
            crc = if crc & 0x8000_0000 != 0 {
                (crc << 1) ^ 0x04C1_1DB7
            } else {
                crc << 1
            };
        }
        crc
    })
}
