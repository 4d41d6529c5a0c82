//! Principal-component animation weight blocks.
//!
//! Only the descriptor in front of the block has a stable layout; the
//! packed weight tables behind it are not decoded.

use bunkit_core::cursor::ByteReader;
use tracing::info;

use crate::chunk::ChunkView;
use crate::error::BundleError;

pub const DESCRIPTOR_SIZE: usize = 24;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PcaDescriptor {
    pub version: i32,
    pub name_hash: u32,
    pub frame_count: u32,
    pub component_count: u32,
    pub sample_count: u32,
    pub flags: u32,
}

impl PcaDescriptor {
    pub fn parse(reader: &mut ByteReader<'_>) -> Result<Self, BundleError> {
        Ok(Self {
            version: reader.i32_le()?,
            name_hash: reader.u32_le()?,
            frame_count: reader.u32_le()?,
            component_count: reader.u32_le()?,
            sample_count: reader.u32_le()?,
            flags: reader.u32_le()?,
        })
    }
}

/// Reads the block descriptor. The weight tables themselves have no
/// published layout, so a block that carries them cannot be fully decoded.
pub fn process(view: &ChunkView<'_>) -> Result<PcaDescriptor, BundleError> {
    let descriptor = PcaDescriptor::parse(&mut view.reader())?;
    info!(
        hash = format_args!("{:08x}", descriptor.name_hash),
        frames = descriptor.frame_count,
        components = descriptor.component_count,
        "found weight block"
    );
    if view.payload().len() > DESCRIPTOR_SIZE {
        return Err(BundleError::UnsupportedFormat(format!(
            "weight tables for block {:08x} have no known layout",
            descriptor.name_hash
        )));
    }
    Ok(descriptor)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunk::ChunkIter;

    fn pca_chunk(extra: usize) -> Vec<u8> {
        let mut payload = Vec::new();
        payload.extend_from_slice(&1i32.to_le_bytes());
        payload.extend_from_slice(&0x0BAD_F00Du32.to_le_bytes());
        payload.extend_from_slice(&30u32.to_le_bytes());
        payload.extend_from_slice(&8u32.to_le_bytes());
        payload.extend_from_slice(&240u32.to_le_bytes());
        payload.extend_from_slice(&0u32.to_le_bytes());
        payload.extend(std::iter::repeat(0u8).take(extra));

        let mut bytes = Vec::new();
        bytes.extend_from_slice(&crate::kind::id::PCA_WEIGHTS.to_le_bytes());
        bytes.extend_from_slice(&(payload.len() as u32).to_le_bytes());
        bytes.extend_from_slice(&payload);
        bytes
    }

    #[test]
    fn decodes_a_bare_descriptor() {
        let bytes = pca_chunk(0);
        let view = ChunkIter::new(&bytes, 0).next().unwrap().unwrap();
        let descriptor = process(&view).unwrap();
        assert_eq!(descriptor.name_hash, 0x0BAD_F00D);
        assert_eq!(descriptor.frame_count, 30);
        assert_eq!(descriptor.component_count, 8);
    }

    #[test]
    fn weight_tables_are_unsupported() {
        let bytes = pca_chunk(128);
        let view = ChunkIter::new(&bytes, 0).next().unwrap().unwrap();
        assert!(matches!(
            process(&view),
            Err(BundleError::UnsupportedFormat(_))
        ));
    }
}
