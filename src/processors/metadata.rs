// orientpress/src/processors/metadata.rs
use crate::core::{ConvertError, Result};
use exif::experimental::Writer;
use exif::{Context, Exif, Field, In, Reader};
use std::fs::File;
use std::io::{BufReader, Cursor};
use std::path::Path;

const SOI: [u8; 2] = [0xFF, 0xD8];
const APP1: [u8; 2] = [0xFF, 0xE1];
const EXIF_HEADER: &[u8; 6] = b"Exif\0\0";
const MAX_SEGMENT_LEN: usize = u16::MAX as usize;

const VP8X_FLAG_EXIF: u8 = 0x08;
const VP8X_CHUNK_LEN: usize = 18;
const CHUNK_HEADER_LEN: usize = 8;

/// Primary-IFD tags that describe the source's pixel layout (dimensions,
/// strips, tiles, sub-IFD pointers). They are rewritten by the encoder, so
/// copying them would describe data the output does not contain.
const LAYOUT_TAGS: [u16; 22] = [
    0x0100, 0x0101, 0x0102, 0x0103, 0x0106, 0x0111, 0x0115, 0x0116, 0x0117, 0x011C, 0x013D,
    0x0140, 0x0142, 0x0143, 0x0144, 0x0145, 0x0152, 0x0153, 0x0201, 0x0202, 0x8769, 0x8825,
];
const INTEROP_POINTER: u16 = 0xA005;

/// Carries EXIF from a source file into re-encoded output.
#[derive(Debug, Default)]
pub struct MetadataProcessor;

impl MetadataProcessor {
    pub fn new() -> Self {
        Self
    }

    /// EXIF block for the output, rebuilt from the source's primary-image
    /// fields. Thumbnails and pixel-layout tags are left behind, so a TIFF
    /// source contributes its tags and not its strips.
    ///
    /// Malformed EXIF is logged and treated as absent; it never fails a conversion.
    pub fn read_exif_block(&self, path: &Path) -> Result<Option<Vec<u8>>> {
        let file = File::open(path).map_err(|e| ConvertError::io(path, e))?;
        let mut bufreader = BufReader::new(file);

        match Reader::new().read_from_container(&mut bufreader) {
            Ok(exif) => {
                log::debug!("Found EXIF data in {}", path.display());
                Ok(rebuild_block(&exif, path))
            }
            Err(exif::Error::NotFound(_)) => {
                log::debug!("No EXIF data found in {}", path.display());
                Ok(None)
            }
            Err(e) => {
                log::warn!("Ignoring unreadable EXIF in {}: {}", path.display(), e);
                Ok(None)
            }
        }
    }

    /// Bytes `embed_exif_jpeg` adds for an EXIF block of `exif_len` bytes.
    pub fn jpeg_overhead(exif_len: usize) -> usize {
        APP1.len() + 2 + EXIF_HEADER.len() + exif_len
    }

    /// Upper bound of the bytes `embed_exif_webp` adds for `exif_len` bytes.
    pub fn webp_overhead(exif_len: usize) -> usize {
        VP8X_CHUNK_LEN + CHUNK_HEADER_LEN + exif_len + exif_len % 2
    }

    /// Inserts `exif` as an APP1 segment directly after the JPEG SOI marker.
    pub fn embed_exif_jpeg(&self, jpeg: &[u8], exif: &[u8], path: &Path) -> Result<Vec<u8>> {
        if !jpeg.starts_with(&SOI) {
            return Err(ConvertError::encode(path, "encoder output is not a JPEG stream"));
        }

        let segment_len = 2 + EXIF_HEADER.len() + exif.len();
        if segment_len > MAX_SEGMENT_LEN {
            log::warn!(
                "EXIF block of {} bytes does not fit a JPEG segment, dropping it for {}",
                exif.len(),
                path.display()
            );
            return Ok(jpeg.to_vec());
        }

        let mut out = Vec::with_capacity(jpeg.len() + segment_len + 2);
        out.extend_from_slice(&SOI);
        out.extend_from_slice(&APP1);
        out.extend_from_slice(&(segment_len as u16).to_be_bytes());
        out.extend_from_slice(EXIF_HEADER);
        out.extend_from_slice(exif);
        out.extend_from_slice(&jpeg[SOI.len()..]);
        Ok(out)
    }

    /// Appends `exif` as a RIFF `EXIF` chunk, promoting a simple-format WebP
    /// to the extended format (VP8X) when needed.
    pub fn embed_exif_webp(
        &self,
        webp: &[u8],
        exif: &[u8],
        (width, height): (u32, u32),
        path: &Path,
    ) -> Result<Vec<u8>> {
        if webp.len() < 12 + CHUNK_HEADER_LEN || &webp[0..4] != b"RIFF" || &webp[8..12] != b"WEBP" {
            return Err(ConvertError::encode(path, "encoder output is not a WebP stream"));
        }

        let chunks = &webp[12..];
        let mut out = Vec::with_capacity(webp.len() + Self::webp_overhead(exif.len()));
        out.extend_from_slice(b"RIFF\0\0\0\0WEBP");

        if &chunks[0..4] == b"VP8X" {
            out.extend_from_slice(chunks);
            out[12 + CHUNK_HEADER_LEN] |= VP8X_FLAG_EXIF;
        } else {
            if width == 0 || height == 0 || width > 1 << 24 || height > 1 << 24 {
                return Err(ConvertError::encode(path, "image size out of range for WebP"));
            }
            out.extend_from_slice(b"VP8X");
            out.extend_from_slice(&10u32.to_le_bytes());
            out.extend_from_slice(&[VP8X_FLAG_EXIF, 0, 0, 0]);
            out.extend_from_slice(&(width - 1).to_le_bytes()[..3]);
            out.extend_from_slice(&(height - 1).to_le_bytes()[..3]);
            out.extend_from_slice(chunks);
        }

        out.extend_from_slice(b"EXIF");
        out.extend_from_slice(&(exif.len() as u32).to_le_bytes());
        out.extend_from_slice(exif);
        if exif.len() % 2 == 1 {
            out.push(0);
        }

        let riff_len = (out.len() - CHUNK_HEADER_LEN) as u32;
        out[4..8].copy_from_slice(&riff_len.to_le_bytes());
        Ok(out)
    }
}

fn is_layout_field(field: &Field) -> bool {
    match field.tag.context() {
        Context::Tiff => LAYOUT_TAGS.contains(&field.tag.number()),
        Context::Exif => field.tag.number() == INTEROP_POINTER,
        _ => false,
    }
}

fn rebuild_block(exif: &Exif, path: &Path) -> Option<Vec<u8>> {
    let kept: Vec<&Field> = exif
        .fields()
        .filter(|f| f.ifd_num == In::PRIMARY && !is_layout_field(f))
        .collect();
    if kept.is_empty() {
        log::debug!("No transferable EXIF fields in {}", path.display());
        return None;
    }

    let mut writer = Writer::new();
    for field in &kept {
        writer.push_field(field);
    }

    let mut buf = Cursor::new(Vec::new());
    match writer.write(&mut buf, exif.little_endian()) {
        Ok(()) => Some(buf.into_inner()),
        Err(e) => {
            log::warn!("Dropping EXIF of {}: {}", path.display(), e);
            None
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use exif::Tag;
    use image::codecs::jpeg::JpegEncoder;

    /// Little-endian TIFF block with a single Orientation = 6 entry.
    pub(crate) fn orientation_exif() -> Vec<u8> {
        vec![
            0x49, 0x49, 0x2A, 0x00, 0x08, 0x00, 0x00, 0x00, // header
            0x01, 0x00, // one entry
            0x12, 0x01, 0x03, 0x00, 0x01, 0x00, 0x00, 0x00, 0x06, 0x00, 0x00, 0x00,
            0x00, 0x00, 0x00, 0x00, // no next IFD
        ]
    }

    pub(crate) fn orientation_of(block: &[u8]) -> Option<u32> {
        let exif = Reader::new().read_raw(block.to_vec()).ok()?;
        exif.get_field(Tag::Orientation, In::PRIMARY)?.value.get_uint(0)
    }

    /// Payload of the first RIFF chunk named `id`.
    pub(crate) fn riff_chunk<'a>(webp: &'a [u8], id: &[u8; 4]) -> Option<&'a [u8]> {
        let mut pos = 12;
        while pos + 8 <= webp.len() {
            let len = u32::from_le_bytes(webp[pos + 4..pos + 8].try_into().ok()?) as usize;
            let body = webp.get(pos + 8..pos + 8 + len)?;
            if &webp[pos..pos + 4] == id {
                return Some(body);
            }
            pos += 8 + len + len % 2;
        }
        None
    }

    fn tiny_jpeg() -> Vec<u8> {
        let mut buf = Vec::new();
        image::RgbImage::new(8, 8)
            .write_with_encoder(JpegEncoder::new_with_quality(&mut buf, 80))
            .unwrap();
        buf
    }

    #[test]
    fn embedded_exif_survives_a_read_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tagged.jpg");
        let processor = MetadataProcessor::new();

        let tagged = processor
            .embed_exif_jpeg(&tiny_jpeg(), &orientation_exif(), &path)
            .unwrap();
        assert_eq!(
            tagged.len(),
            tiny_jpeg().len() + MetadataProcessor::jpeg_overhead(orientation_exif().len())
        );
        std::fs::write(&path, &tagged).unwrap();

        let file = File::open(&path).unwrap();
        let exif = Reader::new()
            .read_from_container(&mut BufReader::new(file))
            .unwrap();
        let orientation = exif.get_field(Tag::Orientation, In::PRIMARY).unwrap();
        assert_eq!(orientation.value.get_uint(0), Some(6));

        assert!(image::load_from_memory(&tagged).is_ok());
        let block = processor.read_exif_block(&path).unwrap().unwrap();
        assert_eq!(orientation_of(&block), Some(6));
    }

    #[test]
    fn tiff_source_yields_tags_without_pixel_data() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scan.tif");
        image::RgbImage::from_fn(60, 120, |x, y| image::Rgb([x as u8, y as u8, 7]))
            .save(&path)
            .unwrap();
        let source_len = std::fs::metadata(&path).unwrap().len() as usize;

        let block = MetadataProcessor::new().read_exif_block(&path).unwrap();
        if let Some(block) = block {
            assert!(block.len() < 1024, "block of {} bytes from a {} byte file", block.len(), source_len);
            let exif = Reader::new().read_raw(block).unwrap();
            assert!(exif.get_field(Tag::StripOffsets, In::PRIMARY).is_none());
            assert!(exif.get_field(Tag::ImageWidth, In::PRIMARY).is_none());
        }
    }

    #[test]
    fn missing_exif_is_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plain.jpg");
        std::fs::write(&path, tiny_jpeg()).unwrap();

        assert_eq!(MetadataProcessor::new().read_exif_block(&path).unwrap(), None);
    }

    #[test]
    fn refuses_non_jpeg_stream() {
        let err = MetadataProcessor::new()
            .embed_exif_jpeg(b"RIFF....WEBP", &orientation_exif(), Path::new("x.webp"))
            .unwrap_err();
        assert!(matches!(err, ConvertError::Encode { .. }));
    }

    #[test]
    fn webp_gains_extended_header_and_exif_chunk() {
        let rgb = image::RgbImage::from_fn(16, 8, |x, y| image::Rgb([x as u8 * 9, y as u8 * 20, 40]));
        let plain = webp::Encoder::from_rgb(rgb.as_raw(), 16, 8)
            .encode_simple(false, 75.0)
            .unwrap()
            .to_vec();
        let exif = orientation_exif();

        let tagged = MetadataProcessor::new()
            .embed_exif_webp(&plain, &exif, (16, 8), Path::new("t.webp"))
            .unwrap();

        assert!(tagged.len() <= plain.len() + MetadataProcessor::webp_overhead(exif.len()));
        assert_eq!(
            u32::from_le_bytes(tagged[4..8].try_into().unwrap()) as usize,
            tagged.len() - 8
        );
        let vp8x = riff_chunk(&tagged, b"VP8X").unwrap();
        assert_eq!(vp8x[0] & VP8X_FLAG_EXIF, VP8X_FLAG_EXIF);
        assert_eq!(orientation_of(riff_chunk(&tagged, b"EXIF").unwrap()), Some(6));

        let decoded = image::load_from_memory(&tagged).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (16, 8));
    }
}
