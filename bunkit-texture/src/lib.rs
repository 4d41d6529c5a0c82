pub mod codec;
pub mod dds;
pub mod format;
pub mod tile;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TextureError {
    #[error("invalid texture dimensions {width}x{height}")]
    InvalidDimensions { width: usize, height: usize },
    #[error("{context} buffer is too small ({len} bytes, {needed} needed)")]
    BufferTooSmall {
        context: &'static str,
        len: usize,
        needed: usize,
    },
    #[error("unsupported texture operation: {0}")]
    Unsupported(String),
    #[error("cannot encode PNG image")]
    Png(#[from] png::EncodingError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<bunkit_core::cursor::OutOfBounds> for TextureError {
    fn from(err: bunkit_core::cursor::OutOfBounds) -> Self {
        Self::BufferTooSmall {
            context: "texture header",
            len: err.len,
            needed: err.at + err.wanted,
        }
    }
}
