//! DDS container reading and writing.

use std::io::Write;

use bunkit_core::cursor::{ByteReader, Endian};
use bunkit_core::write::{Serialize, Serializer};

use crate::format::TextureFormat;
use crate::TextureError;

pub const DDS_MAGIC: u32 = 0x2053_4444; // "DDS "
pub const FOURCC_DXT1: u32 = 0x3154_5844;
pub const FOURCC_DXT3: u32 = 0x3354_5844;
pub const FOURCC_DXT5: u32 = 0x3554_5844;

const DDSD_CAPS: u32 = 0x1;
const DDSD_HEIGHT: u32 = 0x2;
const DDSD_WIDTH: u32 = 0x4;
const DDSD_PIXELFORMAT: u32 = 0x1000;
const DDSD_MIPMAPCOUNT: u32 = 0x20000;
const DDSD_LINEARSIZE: u32 = 0x80000;

const DDPF_FOURCC: u32 = 0x4;
const DDPF_RGB: u32 = 0x40;
const DDPF_ALPHAPIXELS: u32 = 0x1;

const DDSCAPS_COMPLEX: u32 = 0x8;
const DDSCAPS_TEXTURE: u32 = 0x1000;
const DDSCAPS_MIPMAP: u32 = 0x40_0000;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DdsPixelFormat {
    pub size: u32,
    pub flags: u32,
    pub fourcc: u32,
    pub rgb_bit_count: u32,
    pub r_bit_mask: u32,
    pub g_bit_mask: u32,
    pub b_bit_mask: u32,
    pub a_bit_mask: u32,
}

impl Serialize for DdsPixelFormat {
    fn serialize(&self, serializer: &mut Serializer<impl Write>) -> anyhow::Result<()> {
        self.size.serialize(serializer)?;
        self.flags.serialize(serializer)?;
        self.fourcc.serialize(serializer)?;
        self.rgb_bit_count.serialize(serializer)?;
        self.r_bit_mask.serialize(serializer)?;
        self.g_bit_mask.serialize(serializer)?;
        self.b_bit_mask.serialize(serializer)?;
        self.a_bit_mask.serialize(serializer)?;
        Ok(())
    }
}

/// The 124-byte header following the `DDS ` magic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DdsHeader {
    pub size: u32,
    pub flags: u32,
    pub height: u32,
    pub width: u32,
    pub pitch_or_linear_size: u32,
    pub depth: u32,
    pub mip_map_count: u32,
    pub reserved1: [u32; 11],
    pub pixel_format: DdsPixelFormat,
    pub caps: u32,
    pub caps2: u32,
    pub caps3: u32,
    pub caps4: u32,
    pub reserved2: u32,
}

impl Serialize for DdsHeader {
    fn serialize(&self, serializer: &mut Serializer<impl Write>) -> anyhow::Result<()> {
        self.size.serialize(serializer)?;
        self.flags.serialize(serializer)?;
        self.height.serialize(serializer)?;
        self.width.serialize(serializer)?;
        self.pitch_or_linear_size.serialize(serializer)?;
        self.depth.serialize(serializer)?;
        self.mip_map_count.serialize(serializer)?;
        self.reserved1.serialize(serializer)?;
        self.pixel_format.serialize(serializer)?;
        self.caps.serialize(serializer)?;
        self.caps2.serialize(serializer)?;
        self.caps3.serialize(serializer)?;
        self.caps4.serialize(serializer)?;
        self.reserved2.serialize(serializer)?;
        Ok(())
    }
}

impl DdsHeader {
    /// A header for a mip chain of block-compressed or RGBA8 data.
    pub fn new(
        format: TextureFormat,
        width: usize,
        height: usize,
        mip_map_count: usize,
    ) -> Self {
        let mut flags =
            DDSD_CAPS | DDSD_HEIGHT | DDSD_WIDTH | DDSD_PIXELFORMAT | DDSD_LINEARSIZE;
        let mut caps = DDSCAPS_TEXTURE;
        if mip_map_count > 1 {
            flags |= DDSD_MIPMAPCOUNT;
            caps |= DDSCAPS_COMPLEX | DDSCAPS_MIPMAP;
        }

        let pixel_format = match format.fourcc() {
            Some(fourcc) => DdsPixelFormat {
                size: 32,
                flags: DDPF_FOURCC,
                fourcc,
                ..Default::default()
            },
            None => DdsPixelFormat {
                size: 32,
                flags: DDPF_RGB | DDPF_ALPHAPIXELS,
                fourcc: 0,
                rgb_bit_count: 32,
                r_bit_mask: 0x00FF_0000,
                g_bit_mask: 0x0000_FF00,
                b_bit_mask: 0x0000_00FF,
                a_bit_mask: 0xFF00_0000,
            },
        };

        Self {
            size: 124,
            flags,
            height: height as u32,
            width: width as u32,
            pitch_or_linear_size: format.data_size(width, height) as u32,
            depth: 0,
            mip_map_count: mip_map_count as u32,
            reserved1: [0; 11],
            pixel_format,
            caps,
            caps2: 0,
            caps3: 0,
            caps4: 0,
            reserved2: 0,
        }
    }

    pub fn parse(reader: &mut ByteReader<'_>) -> Result<Self, TextureError> {
        let mut header = Self {
            size: reader.u32_le()?,
            flags: reader.u32_le()?,
            height: reader.u32_le()?,
            width: reader.u32_le()?,
            pitch_or_linear_size: reader.u32_le()?,
            depth: reader.u32_le()?,
            mip_map_count: reader.u32_le()?,
            reserved1: [0; 11],
            pixel_format: DdsPixelFormat::default(),
            caps: 0,
            caps2: 0,
            caps3: 0,
            caps4: 0,
            reserved2: 0,
        };
        for slot in &mut header.reserved1 {
            *slot = reader.u32_le()?;
        }
        header.pixel_format = DdsPixelFormat {
            size: reader.u32_le()?,
            flags: reader.u32_le()?,
            fourcc: reader.u32_le()?,
            rgb_bit_count: reader.u32_le()?,
            r_bit_mask: reader.u32_le()?,
            g_bit_mask: reader.u32_le()?,
            b_bit_mask: reader.u32_le()?,
            a_bit_mask: reader.u32_le()?,
        };
        header.caps = reader.u32_le()?;
        header.caps2 = reader.u32_le()?;
        header.caps3 = reader.u32_le()?;
        header.caps4 = reader.u32_le()?;
        header.reserved2 = reader.u32_le()?;

        if header.size != 124 {
            return Err(TextureError::Unsupported(format!(
                "DDS header size is {}, expected 124",
                header.size
            )));
        }
        Ok(header)
    }
}

/// Basic description of a texture surface, shared between the bundle
/// descriptors and the DDS container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextureInformation {
    pub format: TextureFormat,
    pub width: usize,
    pub height: usize,
    pub mip_levels: usize,
    /// Byte alignment of the surface data: the compressed block size, or
    /// the pixel size for uncompressed data.
    pub alignment: usize,
}

impl TextureInformation {
    pub fn new(format: TextureFormat, width: usize, height: usize, mip_levels: usize) -> Self {
        Self {
            format,
            width,
            height,
            mip_levels,
            alignment: format.block_size().unwrap_or(4),
        }
    }

    /// Total byte size of the full mip chain.
    pub fn data_size(&self) -> usize {
        let mut total = 0;
        let mut width = self.width;
        let mut height = self.height;
        for _ in 0..self.mip_levels.max(1) {
            total += self.format.data_size(width, height);
            width = (width / 2).max(1);
            height = (height / 2).max(1);
        }
        total
    }
}

/// Writes a complete DDS file: magic, header, then the data verbatim.
pub fn write_dds(
    mut writer: impl Write,
    info: &TextureInformation,
    data: &[u8],
) -> Result<(), TextureError> {
    let header = DdsHeader::new(info.format, info.width, info.height, info.mip_levels);
    let mut serializer = Serializer::new(&mut writer);
    let failed = |_| {
        TextureError::Unsupported("cannot serialize DDS header".to_string())
    };
    DDS_MAGIC.serialize(&mut serializer).map_err(failed)?;
    header.serialize(&mut serializer).map_err(failed)?;
    writer.write_all(data)?;
    Ok(())
}

/// Reads the magic and header of a DDS file and maps it back to a surface
/// description. Returns the information and the pixel data offset.
pub fn read_dds(bytes: &[u8]) -> Result<(TextureInformation, usize), TextureError> {
    let mut reader = ByteReader::new(bytes);
    let magic = reader.u32_le()?;
    if magic != DDS_MAGIC {
        return Err(TextureError::Unsupported(
            "not a DDS file (bad magic)".to_string(),
        ));
    }
    let header = DdsHeader::parse(&mut reader)?;
    let format = if header.pixel_format.flags & DDPF_FOURCC != 0 {
        TextureFormat::from_fourcc(header.pixel_format.fourcc).ok_or_else(|| {
            TextureError::Unsupported(format!(
                "unknown DDS fourCC {:08X}",
                header.pixel_format.fourcc
            ))
        })?
    } else if header.pixel_format.rgb_bit_count == 32 {
        TextureFormat::Rgba8
    } else {
        return Err(TextureError::Unsupported(format!(
            "unsupported DDS pixel format ({} bpp)",
            header.pixel_format.rgb_bit_count
        )));
    };
    let info = TextureInformation::new(
        format,
        header.width as usize,
        header.height as usize,
        (header.mip_map_count as usize).max(1),
    );
    Ok((info, reader.position()))
}
