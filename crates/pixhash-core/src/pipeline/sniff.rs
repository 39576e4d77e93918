//! File type detection from on-disk magic bytes.
//!
//! The file name is never consulted: a PNG saved as `photo.jpg` is a PNG.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::error::{PipelineError, PipelineResult};

/// How many leading bytes are inspected.
const HEADER_LEN: u64 = 64;

/// A detected file type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileKind {
    /// Canonical extension, without the dot
    pub extension: &'static str,
    /// MIME type
    pub mime: &'static str,
}

impl FileKind {
    const fn new(extension: &'static str, mime: &'static str) -> Self {
        Self { extension, mime }
    }
}

/// Detects file types by signature.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileSniffer;

impl FileSniffer {
    pub fn new() -> Self {
        Self
    }

    /// Detect the type of the file at `path` from its leading bytes.
    pub fn detect(&self, path: &Path) -> PipelineResult<FileKind> {
        let header = Self::read_header(path)?;
        Self::detect_bytes(&header).ok_or_else(|| PipelineError::UnknownType {
            path: path.to_path_buf(),
        })
    }

    fn read_header(path: &Path) -> PipelineResult<Vec<u8>> {
        let read_err = |source| PipelineError::Read {
            path: path.to_path_buf(),
            source,
        };
        let file = File::open(path).map_err(read_err)?;
        let mut header = Vec::with_capacity(HEADER_LEN as usize);
        file.take(HEADER_LEN)
            .read_to_end(&mut header)
            .map_err(read_err)?;
        Ok(header)
    }

    /// Match a header against known signatures.
    ///
    /// Formats without an entry in the table fall back to the codec
    /// library's own signature guess.
    pub fn detect_bytes(header: &[u8]) -> Option<FileKind> {
        Self::match_signature(header).or_else(|| {
            let format = image::guess_format(header).ok()?;
            let extension = *format.extensions_str().first()?;
            Some(FileKind::new(extension, format.to_mime_type()))
        })
    }

    fn match_signature(header: &[u8]) -> Option<FileKind> {
        // JPEG: FF D8 FF
        if header.starts_with(&[0xFF, 0xD8, 0xFF]) {
            return Some(FileKind::new("jpg", "image/jpeg"));
        }

        // PNG: 89 50 4E 47 0D 0A 1A 0A
        if header.starts_with(&[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]) {
            return Some(FileKind::new("png", "image/png"));
        }

        // GIF: GIF87a / GIF89a
        if header.starts_with(b"GIF87a") || header.starts_with(b"GIF89a") {
            return Some(FileKind::new("gif", "image/gif"));
        }

        // WebP: RIFF....WEBP
        if header.len() >= 12 && header.starts_with(b"RIFF") && &header[8..12] == b"WEBP" {
            return Some(FileKind::new("webp", "image/webp"));
        }

        // BMP: BM
        if header.starts_with(b"BM") {
            return Some(FileKind::new("bmp", "image/bmp"));
        }

        // TIFF: II*\0 (little-endian) or MM\0* (big-endian)
        if header.starts_with(&[b'I', b'I', 0x2A, 0x00])
            || header.starts_with(&[b'M', b'M', 0x00, 0x2A])
        {
            return Some(FileKind::new("tif", "image/tiff"));
        }

        // ICO: 00 00 01 00
        if header.starts_with(&[0x00, 0x00, 0x01, 0x00]) {
            return Some(FileKind::new("ico", "image/x-icon"));
        }

        // PNM: P1..P7 followed by whitespace
        if header.len() >= 3 && header[0] == b'P' && header[2].is_ascii_whitespace() {
            let kind = match header[1] {
                b'1' | b'4' => FileKind::new("pbm", "image/x-portable-bitmap"),
                b'2' | b'5' => FileKind::new("pgm", "image/x-portable-graymap"),
                b'3' | b'6' => FileKind::new("ppm", "image/x-portable-pixmap"),
                b'7' => FileKind::new("pam", "image/x-portable-arbitrarymap"),
                _ => return None,
            };
            return Some(kind);
        }

        // ISO-BMFF: ftyp box at offset 4, major brand at offset 8
        if header.len() >= 12 && &header[4..8] == b"ftyp" {
            return Self::match_ftyp(header);
        }

        None
    }

    /// Pick AVIF or HEIC from the ftyp box brands.
    ///
    /// The generic `mif1`/`msf1` major brands are shared by both formats, so
    /// the compatible brands (offset 16 up to the box size) decide.
    fn match_ftyp(header: &[u8]) -> Option<FileKind> {
        const AVIF: FileKind = FileKind::new("avif", "image/avif");
        const HEIC: FileKind = FileKind::new("heic", "image/heic");

        match &header[8..12] {
            b"avif" | b"avis" => Some(AVIF),
            b"heic" | b"heix" | b"hevc" | b"hevx" => Some(HEIC),
            b"mif1" | b"msf1" => {
                let box_len = u32::from_be_bytes([header[0], header[1], header[2], header[3]]);
                let end = (box_len as usize).min(header.len());
                let compatible = header.get(16..end).unwrap_or_default();
                let is_avif = compatible
                    .chunks_exact(4)
                    .any(|brand| brand == b"avif" || brand == b"avis");
                Some(if is_avif { AVIF } else { HEIC })
            }
            _ => None,
        }
    }
}
