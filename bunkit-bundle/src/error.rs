use thiserror::Error;

use bunkit_core::cursor::OutOfBounds;

#[derive(Debug, Error)]
pub enum BundleError {
    #[error("malformed chunk: {0}")]
    MalformedChunk(String),
    #[error("unknown chunk id {id:08X}")]
    UnknownChunkKind { id: u32 },
    #[error("inconsistent {kind} container: {reason}")]
    InconsistentContainer {
        kind: &'static str,
        reason: String,
    },
    #[error("invalid compression header: {0}")]
    InvalidCompressionHeader(String),
    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<OutOfBounds> for BundleError {
    fn from(err: OutOfBounds) -> Self {
        Self::MalformedChunk(err.to_string())
    }
}

impl From<bunkit_texture::TextureError> for BundleError {
    fn from(err: bunkit_texture::TextureError) -> Self {
        Self::UnsupportedFormat(err.to_string())
    }
}
