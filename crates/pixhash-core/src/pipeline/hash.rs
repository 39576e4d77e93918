//! Content hashing over decoded pixel data.

use md5::{Digest, Md5};

use super::decode::DecodedImage;

/// MD5 hashing of pixel buffers.
///
/// The digest covers the decoded pixels rather than the file bytes, so two
/// encodings of the same picture (different compression, stripped metadata)
/// end up with the same name.
pub struct Hasher;

impl Hasher {
    /// MD5 of `pixels`, rendered as 32 lowercase hex characters.
    pub fn pixel_hash(pixels: &[u8]) -> String {
        let mut hasher = Md5::new();
        hasher.update(pixels);
        hex::encode(hasher.finalize())
    }

    /// MD5 of a decoded image's native pixel buffer.
    pub fn image_hash(decoded: &DecodedImage) -> String {
        Self::pixel_hash(decoded.pixels())
    }
}
