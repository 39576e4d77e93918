//! Image decoding with content-based format detection.

use image::{DynamicImage, GenericImageView, ImageFormat};
use std::path::Path;

use crate::error::{PipelineError, PipelineResult};

/// Decodes image files into their raw pixel buffers.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageDecoder;

/// Result of decoding an image.
#[derive(Debug)]
pub struct DecodedImage {
    /// The decoded image data
    pub image: DynamicImage,
    /// Codec the decoder used, if known
    pub format: Option<ImageFormat>,
    /// Image width in pixels
    pub width: u32,
    /// Image height in pixels
    pub height: u32,
}

impl DecodedImage {
    /// Raw pixel bytes in the image's native color layout.
    pub fn pixels(&self) -> &[u8] {
        self.image.as_bytes()
    }
}

impl ImageDecoder {
    pub fn new() -> Self {
        Self
    }

    /// Open and fully decode the image at `path`.
    ///
    /// The codec is guessed from the file's content; when the content is
    /// inconclusive the path extension is used instead.
    pub fn decode(&self, path: &Path) -> PipelineResult<DecodedImage> {
        let reader = image::ImageReader::open(path)
            .map_err(|e| PipelineError::Decode {
                path: path.to_path_buf(),
                message: format!("Cannot open file: {}", e),
            })?
            .with_guessed_format()
            .map_err(|e| PipelineError::Decode {
                path: path.to_path_buf(),
                message: format!("Cannot detect image format: {}", e),
            })?;
        let format = reader.format();

        let image = reader.decode().map_err(|e| PipelineError::Decode {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        let (width, height) = image.dimensions();
        Ok(DecodedImage {
            image,
            format,
            width,
            height,
        })
    }
}
