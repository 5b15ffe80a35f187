use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use image::codecs::jpeg::JpegEncoder;
use image::ExtendedColorType;
use thiserror::Error;

use crate::shared::frame::Frame;

const DATA_URL_PREFIX: &str = "data:image/jpeg;base64,";

#[derive(Error, Debug)]
pub enum EncodeError {
    #[error("frame has no dimensions")]
    EmptyFrame,
    #[error("unsupported channel count: {0}")]
    Channels(u8),
    #[error("jpeg encoding failed: {0}")]
    Jpeg(#[from] image::ImageError),
}

/// Encodes frames as JPEG data URLs, the form the recognition server
/// expects in its `image` fields.
#[derive(Clone, Copy, Debug)]
pub struct SnapshotEncoder {
    quality: u8,
}

impl SnapshotEncoder {
    pub fn new(quality: u8) -> Self {
        Self {
            quality: quality.clamp(1, 100),
        }
    }

    pub fn quality(&self) -> u8 {
        self.quality
    }

    pub fn encode_jpeg(&self, frame: &Frame) -> Result<Vec<u8>, EncodeError> {
        if !frame.has_dimensions() {
            return Err(EncodeError::EmptyFrame);
        }
        let color = match frame.channels() {
            3 => ExtendedColorType::Rgb8,
            1 => ExtendedColorType::L8,
            other => return Err(EncodeError::Channels(other)),
        };

        let mut buf = Vec::new();
        JpegEncoder::new_with_quality(&mut buf, self.quality).encode(
            frame.data(),
            frame.width(),
            frame.height(),
            color,
        )?;
        Ok(buf)
    }

    pub fn encode_data_url(&self, frame: &Frame) -> Result<String, EncodeError> {
        let jpeg = self.encode_jpeg(frame)?;
        Ok(format!("{DATA_URL_PREFIX}{}", BASE64.encode(jpeg)))
    }
}

impl Default for SnapshotEncoder {
    fn default() -> Self {
        Self::new(crate::shared::constants::DEFAULT_JPEG_QUALITY)
    }
}
