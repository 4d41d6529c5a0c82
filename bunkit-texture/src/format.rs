use std::fmt;

/// Pixel formats the bundle codec understands.
///
/// The block-compressed variants cover everything the console texture packs
/// actually ship; `Rgba8` is the decode target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureFormat {
    Bc1,
    Bc2,
    Bc3,
    Rgba8,
}

impl TextureFormat {
    /// Size of one compressed 4x4 block, or `None` for uncompressed formats.
    pub fn block_size(self) -> Option<usize> {
        match self {
            Self::Bc1 => Some(8),
            Self::Bc2 | Self::Bc3 => Some(16),
            Self::Rgba8 => None,
        }
    }

    pub fn is_block_compressed(self) -> bool {
        self.block_size().is_some()
    }

    /// Maps the per-texture compression-type byte from a pack descriptor.
    pub fn from_compression_type(compression_type: u8) -> Option<Self> {
        match compression_type {
            36 => Some(Self::Bc2),
            38 => Some(Self::Bc3),
            _ => None,
        }
    }

    /// Maps the 32-bit D3D format code found in platform-info records.
    pub fn from_d3d_format(code: u32) -> Option<Self> {
        match code {
            0x1A200152 => Some(Self::Bc1),
            0x1A200153 => Some(Self::Bc2),
            0x1A200154 => Some(Self::Bc3),
            _ => None,
        }
    }

    /// Maps a DDS pixel-format fourCC.
    pub fn from_fourcc(fourcc: u32) -> Option<Self> {
        match fourcc {
            crate::dds::FOURCC_DXT1 => Some(Self::Bc1),
            crate::dds::FOURCC_DXT3 => Some(Self::Bc2),
            crate::dds::FOURCC_DXT5 => Some(Self::Bc3),
            _ => None,
        }
    }

    pub fn fourcc(self) -> Option<u32> {
        match self {
            Self::Bc1 => Some(crate::dds::FOURCC_DXT1),
            Self::Bc2 => Some(crate::dds::FOURCC_DXT3),
            Self::Bc3 => Some(crate::dds::FOURCC_DXT5),
            Self::Rgba8 => None,
        }
    }

    /// Byte size of one mip level at the given dimensions.
    pub fn data_size(self, width: usize, height: usize) -> usize {
        match self.block_size() {
            Some(block_size) => width.div_ceil(4) * height.div_ceil(4) * block_size,
            None => width * height * 4,
        }
    }
}

impl fmt::Display for TextureFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Bc1 => "BC1",
            Self::Bc2 => "BC2",
            Self::Bc3 => "BC3",
            Self::Rgba8 => "RGBA8",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compression_type_mapping() {
        assert_eq!(TextureFormat::from_compression_type(36), Some(TextureFormat::Bc2));
        assert_eq!(TextureFormat::from_compression_type(38), Some(TextureFormat::Bc3));
        assert_eq!(TextureFormat::from_compression_type(0), None);
    }

    #[test]
    fn data_sizes() {
        assert_eq!(TextureFormat::Bc1.data_size(64, 64), 2048);
        assert_eq!(TextureFormat::Bc3.data_size(64, 64), 4096);
        assert_eq!(TextureFormat::Rgba8.data_size(4, 4), 64);
        // Sub-block dimensions round up to a whole block.
        assert_eq!(TextureFormat::Bc1.data_size(2, 2), 8);
    }
}
