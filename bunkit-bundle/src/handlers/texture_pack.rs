//! Texture packs: the descriptor tables in the info block plus the raw
//! surface data in the data block.

use bitflags::bitflags;
use tracing::{debug, info, warn};

use bunkit_core::cursor::{ByteReader, Endian};
use bunkit_texture::dds::{write_dds, TextureInformation};
use bunkit_texture::format::TextureFormat;
use bunkit_texture::tile::{swap_u16_buffer, untile_xenon, TEXTURE_ALIGN};

use crate::chunk::ChunkView;
use crate::error::BundleError;
use crate::kind::{self, id};
use crate::names::NameTable;
use crate::output::Filestore;
use crate::Platform;

/// The pack-wide header from the first info part.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackHeader {
    pub version: i32,
    pub name: String,
    pub filename: String,
    pub filename_hash: u32,
    pub perm_chunk_byte_offset: u32,
    pub perm_chunk_byte_size: u32,
    pub endian_swapped: i32,
}

impl PackHeader {
    pub fn parse(reader: &mut ByteReader<'_>) -> Result<Self, BundleError> {
        let version = reader.i32_le()?;
        let name = reader.cstring(28)?;
        let filename = reader.cstring(64)?;
        let filename_hash = reader.u32_le()?;
        let perm_chunk_byte_offset = reader.u32_le()?;
        let perm_chunk_byte_size = reader.u32_le()?;
        let endian_swapped = reader.i32_le()?;
        reader.take(12)?;
        Ok(Self {
            version,
            name,
            filename,
            filename_hash,
            perm_chunk_byte_offset,
            perm_chunk_byte_size,
            endian_swapped,
        })
    }
}

/// One entry of the name-hash index from the second info part.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexEntry {
    pub name_hash: u32,
    pub padding: u32,
}

/// One entry of the streaming table from the third info part.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamingEntry {
    pub name_hash: u32,
    pub chunk_byte_offset: u32,
    pub chunk_byte_size: i32,
    pub uncompressed_size: i32,
    pub user_flags: u8,
    pub flags: u8,
    pub ref_count: u16,
}

impl StreamingEntry {
    fn parse(reader: &mut ByteReader<'_>) -> Result<Self, BundleError> {
        let entry = Self {
            name_hash: reader.u32_le()?,
            chunk_byte_offset: reader.u32_le()?,
            chunk_byte_size: reader.i32_le()?,
            uncompressed_size: reader.i32_le()?,
            user_flags: reader.u8()?,
            flags: reader.u8()?,
            ref_count: reader.u16_le()?,
        };
        reader.take(4)?;
        Ok(entry)
    }
}

bitflags! {
    /// Single-bit render states; the multi-bit fields have accessors on
    /// [`RenderState`].
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct RenderStateFlags: u32 {
        const SUB_SORT_KEY = 1 << 8;
        const COLOUR_WRITE_ALPHA = 1 << 9;
        const MULTI_PASS_BLEND = 1 << 10;
        const WANTS_AUXILIARY_TEXTURES = 1 << 13;
        const IS_ADDITIVE_BLEND = 1 << 14;
        const HAS_TEXTURE_ANIMATION = 1 << 15;
        const ALPHA_BLEND_ENABLED = 1 << 28;
        const ALPHA_TEST_ENABLED = 1 << 29;
        const IS_BACK_FACE_CULLED = 1 << 30;
        const Z_WRITE_ENABLED = 1 << 31;
    }
}

/// The packed 32-bit render state word from a platform-info record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderState(pub u32);

impl RenderState {
    pub fn flags(self) -> RenderStateFlags {
        RenderStateFlags::from_bits_truncate(self.0)
    }

    pub fn alpha_test_ref(self) -> u32 {
        (self.0 >> 4) & 0xF
    }

    pub fn bias_level(self) -> u32 {
        (self.0 >> 11) & 0x3
    }

    pub fn texture_address_v(self) -> u32 {
        (self.0 >> 16) & 0x3
    }

    pub fn texture_address_u(self) -> u32 {
        (self.0 >> 18) & 0x3
    }

    pub fn alpha_blend_dest(self) -> u32 {
        (self.0 >> 20) & 0xF
    }

    pub fn alpha_blend_src(self) -> u32 {
        (self.0 >> 24) & 0xF
    }
}

/// One platform-info record from the fifth info part.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TexturePlatInfo {
    pub render_state: RenderState,
    pub kind: u32,
    pub punch_thru_value: u16,
    pub format: u32,
}

pub const PLAT_INFO_SIZE: usize = 32;

impl TexturePlatInfo {
    fn parse(reader: &mut ByteReader<'_>) -> Result<Self, BundleError> {
        reader.take(8)?;
        let render_state = RenderState(reader.u32_le()?);
        let kind = reader.u32_le()?;
        reader.take(2)?;
        let punch_thru_value = reader.u16_le()?;
        let format = reader.u32_le()?;
        reader.take(8)?;
        Ok(Self {
            render_state,
            kind,
            punch_thru_value,
            format,
        })
    }

    pub fn format_name(&self) -> Option<&'static str> {
        kind::d3d_format_name(self.format)
    }
}

/// One texture descriptor from the fourth info part. Records are variable
/// length: 89 fixed bytes followed by the debug name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextureDescriptor {
    pub name_hash: u32,
    pub class_name_hash: u32,
    pub image_placement: i32,
    pub palette_placement: i32,
    pub image_size: i32,
    pub palette_size: i32,
    pub base_image_size: i32,
    pub width: i16,
    pub height: i16,
    pub shift_width: i8,
    pub shift_height: i8,
    pub image_compression_type: u8,
    pub palette_compression_type: u8,
    pub num_palette_entries: i16,
    pub num_mip_map_levels: i8,
    pub tilable_uv: i8,
    pub bias_level: i8,
    pub rendering_order: i8,
    pub scroll_type: i8,
    pub used_flag: i8,
    pub apply_alpha_sorting: i8,
    pub alpha_usage_type: i8,
    pub alpha_blend_type: i8,
    pub flags: i8,
    pub mipmap_bias_type: i8,
    pub scroll_time_step: i16,
    pub scroll_speed_s: i16,
    pub scroll_speed_t: i16,
    pub offset_s: i16,
    pub offset_t: i16,
    pub scale_s: i16,
    pub scale_t: i16,
    pub palette_data: u32,
    pub debug_name: String,
}

impl TextureDescriptor {
    /// Parses one record, leaving the reader at the start of the next.
    /// Returns `None` when the zero-padding guard in front of the record
    /// does not hold.
    pub fn parse(reader: &mut ByteReader<'_>) -> Result<Option<Self>, BundleError> {
        let guard = reader.take(12)?;
        if guard.iter().any(|&b| b != 0) {
            return Ok(None);
        }

        let mut descriptor = Self {
            name_hash: reader.u32_le()?,
            class_name_hash: reader.u32_le()?,
            image_placement: reader.i32_le()?,
            palette_placement: reader.i32_le()?,
            image_size: reader.i32_le()?,
            palette_size: reader.i32_le()?,
            base_image_size: reader.i32_le()?,
            width: reader.i16_le()?,
            height: reader.i16_le()?,
            shift_width: reader.i8()?,
            shift_height: reader.i8()?,
            image_compression_type: reader.u8()?,
            palette_compression_type: reader.u8()?,
            num_palette_entries: reader.i16_le()?,
            num_mip_map_levels: reader.i8()?,
            tilable_uv: reader.i8()?,
            bias_level: reader.i8()?,
            rendering_order: reader.i8()?,
            scroll_type: reader.i8()?,
            used_flag: reader.i8()?,
            apply_alpha_sorting: reader.i8()?,
            alpha_usage_type: reader.i8()?,
            alpha_blend_type: reader.i8()?,
            flags: reader.i8()?,
            mipmap_bias_type: reader.i8()?,
            scroll_time_step: 0,
            scroll_speed_s: 0,
            scroll_speed_t: 0,
            offset_s: 0,
            offset_t: 0,
            scale_s: 0,
            scale_t: 0,
            palette_data: 0,
            debug_name: String::new(),
        };
        reader.i8()?; // alignment byte
        descriptor.scroll_time_step = reader.i16_le()?;
        descriptor.scroll_speed_s = reader.i16_le()?;
        descriptor.scroll_speed_t = reader.i16_le()?;
        descriptor.offset_s = reader.i16_le()?;
        descriptor.offset_t = reader.i16_le()?;
        descriptor.scale_s = reader.i16_le()?;
        descriptor.scale_t = reader.i16_le()?;
        reader.take(8)?;
        descriptor.palette_data = reader.u32_le()?;
        let debug_name_size = reader.u8()?;
        descriptor.debug_name = reader.cstring(usize::from(debug_name_size))?;
        Ok(Some(descriptor))
    }

    pub fn format(&self) -> Option<TextureFormat> {
        TextureFormat::from_compression_type(self.image_compression_type)
    }
}

/// The header in front of the surface data, from the first data part.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VramHeader {
    pub version: i32,
    pub filename_hash: u32,
    pub endian_swapped: i32,
}

impl VramHeader {
    pub fn parse(reader: &mut ByteReader<'_>) -> Result<Self, BundleError> {
        // The byte order of the leading fields depends on a flag that sits
        // after them, so pick that up first.
        reader.seek(16)?;
        let endian_swapped = reader.i32_le()?;
        let endian = if endian_swapped != 0 {
            Endian::Big
        } else {
            Endian::Little
        };
        reader.seek(8)?;
        let version = reader.i32(endian)?;
        let filename_hash = reader.u32(endian)?;
        Ok(Self {
            version,
            filename_hash,
            endian_swapped,
        })
    }
}

/// One texture animation from the pack's animation block.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextureAnim {
    pub name: String,
    pub name_hash: u32,
    pub frame_count: i8,
    pub frames_per_second: i8,
    pub time_base: i8,
    pub frame_hashes: Vec<u32>,
}

/// Everything decoded from one texture pack chunk.
#[derive(Debug, Clone, Default)]
pub struct TexturePack {
    pub header: PackHeader,
    pub index: Vec<IndexEntry>,
    pub streaming: Vec<StreamingEntry>,
    pub descriptors: Vec<TextureDescriptor>,
    pub plat_info: Vec<TexturePlatInfo>,
    pub anims: Vec<TextureAnim>,
    pub vram: Option<VramHeader>,
}

/// Decodes a pack container, checks it is internally consistent, and
/// extracts every texture it can decode into `filestore`.
pub fn process(
    view: &ChunkView<'_>,
    platform: Platform,
    names: &NameTable,
    filestore: &mut impl Filestore,
) -> Result<TexturePack, BundleError> {
    let mut pack = TexturePack::default();
    let mut data: Option<&[u8]> = None;

    for child in view.children() {
        let child = child?;
        match child.id() {
            id::TPK_INFO_BLOCK => process_info_block(&child, &mut pack)?,
            id::TPK_DATA_BLOCK => data = Some(process_data_block(&child, &mut pack)?),
            other => {
                debug!(id = format_args!("{other:08X}"), "skipping chunk in texture pack");
            }
        }
    }

    if pack.index.len() != pack.descriptors.len() {
        return Err(BundleError::InconsistentContainer {
            kind: "texture pack",
            reason: format!(
                "{} index entries but {} texture descriptors",
                pack.index.len(),
                pack.descriptors.len()
            ),
        });
    }

    info!(
        name = %pack.header.name,
        textures = pack.descriptors.len(),
        "decoded texture pack"
    );
    if let Some(data) = data {
        extract_textures(&pack, data, platform, names, filestore)?;
    }
    Ok(pack)
}

fn process_info_block(view: &ChunkView<'_>, pack: &mut TexturePack) -> Result<(), BundleError> {
    for child in view.children() {
        let child = child?;
        let mut reader = child.reader();
        match child.id() {
            id::TPK_INFO_PART1 => {
                pack.header = PackHeader::parse(&mut reader)?;
                debug!(name = %pack.header.name, hash = format_args!("{:08x}", pack.header.filename_hash), "pack header");
            }
            id::TPK_INFO_PART2 => {
                let count = child.payload().len() / 8;
                pack.index.reserve(count);
                for _ in 0..count {
                    pack.index.push(IndexEntry {
                        name_hash: reader.u32_le()?,
                        padding: reader.u32_le()?,
                    });
                }
            }
            id::TPK_INFO_PART3 => {
                let count = child.payload().len() / 24;
                pack.streaming.reserve(count);
                for _ in 0..count {
                    pack.streaming.push(StreamingEntry::parse(&mut reader)?);
                }
            }
            id::TPK_INFO_PART4 => {
                pack.descriptors = decode_descriptors(&mut reader, pack.index.len())?;
            }
            id::TPK_INFO_PART5 => {
                let count = child.payload().len() / PLAT_INFO_SIZE;
                pack.plat_info.reserve(count);
                for _ in 0..count {
                    let plat_info = TexturePlatInfo::parse(&mut reader)?;
                    debug!(format = plat_info.format_name().unwrap_or("unknown"), "plat info");
                    pack.plat_info.push(plat_info);
                }
            }
            id::TPK_BIN_DATA => {
                pack.anims = process_anim_block(&child)?;
            }
            other => {
                debug!(id = format_args!("{other:08X}"), "skipping chunk in info block");
            }
        }
    }
    Ok(())
}

/// Decodes up to `limit` descriptor records, stopping early if a record's
/// padding guard fails.
pub fn decode_descriptors(
    reader: &mut ByteReader<'_>,
    limit: usize,
) -> Result<Vec<TextureDescriptor>, BundleError> {
    let mut descriptors = Vec::with_capacity(limit);
    for i in 0..limit {
        if reader.at_end() {
            break;
        }
        match TextureDescriptor::parse(reader)? {
            Some(descriptor) => descriptors.push(descriptor),
            None => {
                warn!(record = i, "descriptor padding guard failed, stopping decode");
                break;
            }
        }
    }
    Ok(descriptors)
}

fn process_anim_block(view: &ChunkView<'_>) -> Result<Vec<TextureAnim>, BundleError> {
    let mut anims = Vec::new();
    for child in view.children() {
        let child = child?;
        if child.id() != id::TPK_ANIM_BLOCK {
            warn!(
                id = format_args!("{:08X}", child.id()),
                "unexpected chunk in texture animation block"
            );
            continue;
        }

        let mut anim = TextureAnim::default();
        for part in child.children() {
            let part = part?;
            let mut reader = part.reader();
            match part.id() {
                id::TPK_ANIM_PART1 => {
                    reader.take(8)?;
                    anim.name = reader.cstring(16)?;
                    anim.name_hash = reader.u32_le()?;
                    anim.frame_count = reader.i8()?;
                    anim.frames_per_second = reader.i8()?;
                    anim.time_base = reader.i8()?;
                }
                id::TPK_ANIM_PART2 => {
                    let count = part.payload().len() / 4;
                    anim.frame_hashes.reserve(count);
                    for _ in 0..count {
                        anim.frame_hashes.push(reader.u32_le()?);
                    }
                }
                other => {
                    debug!(id = format_args!("{other:08X}"), "skipping chunk in animation");
                }
            }
        }
        debug!(name = %anim.name, frames = anim.frame_count, "texture animation");
        anims.push(anim);
    }
    Ok(anims)
}

/// Pulls the VRAM header out of the data block and returns the surface data
/// with its front padding words stripped.
fn process_data_block<'a>(
    view: &ChunkView<'a>,
    pack: &mut TexturePack,
) -> Result<&'a [u8], BundleError> {
    let mut data: &[u8] = &[];
    for child in view.children() {
        let child = child?;
        match child.id() {
            id::TPK_DATA_PART1 => {
                let vram = VramHeader::parse(&mut child.reader())?;
                debug!(hash = format_args!("{:08x}", vram.filename_hash), "vram header");
                pack.vram = Some(vram);
            }
            id::TPK_DATA_PART2 => {
                data = skip_padding_words(child.payload());
            }
            other => {
                debug!(id = format_args!("{other:08X}"), "skipping chunk in data block");
            }
        }
    }
    Ok(data)
}

/// The surface data is pushed out to its alignment with `11 11 11 11` filler
/// words.
fn skip_padding_words(mut data: &[u8]) -> &[u8] {
    while data.len() >= 4 && data[0..4] == [0x11, 0x11, 0x11, 0x11] {
        data = &data[4..];
    }
    data
}

fn texture_name(names: &NameTable, descriptor: &TextureDescriptor) -> String {
    if let Some(name) = names.lookup(descriptor.name_hash) {
        return name.to_string();
    }
    if !descriptor.debug_name.is_empty() {
        return descriptor.debug_name.clone();
    }
    format!("texture_{:08x}", descriptor.name_hash)
}

fn align(value: usize, alignment: usize) -> usize {
    value.div_ceil(alignment) * alignment
}

/// Writes every decodable texture in the pack as a DDS file under
/// `textures/`.
pub fn extract_textures(
    pack: &TexturePack,
    data: &[u8],
    platform: Platform,
    names: &NameTable,
    filestore: &mut impl Filestore,
) -> Result<(), BundleError> {
    for descriptor in &pack.descriptors {
        let name = texture_name(names, descriptor);
        let Some(format) = descriptor.format() else {
            warn!(
                compression = descriptor.image_compression_type,
                texture = %name,
                "unknown texture format, skipping"
            );
            continue;
        };

        let start = descriptor.image_placement.max(0) as usize;
        let size = descriptor.image_size.max(0) as usize;
        if start + size > data.len() {
            warn!(
                texture = %name,
                start,
                size,
                available = data.len(),
                "texture data reaches outside the data block, skipping"
            );
            continue;
        }
        let image = &data[start..start + size];
        let width = descriptor.width.max(0) as usize;
        let height = descriptor.height.max(0) as usize;

        info!(
            texture = %name,
            width,
            height,
            size_kb = size / 1024,
            mips = descriptor.num_mip_map_levels,
            %format,
            "extracting texture"
        );

        let surface = match platform {
            Platform::Xenon => {
                let block_size = match format.block_size() {
                    Some(block_size) => block_size,
                    None => continue,
                };
                // Pad out to the full tiled grid so detiling never reads
                // outside the buffer.
                let tiled_len =
                    align(width, TEXTURE_ALIGN) / 4 * (align(height, TEXTURE_ALIGN) / 4) * block_size;
                let mut tiled = vec![0u8; tiled_len];
                let present = image.len().min(tiled_len);
                tiled[..present].copy_from_slice(&image[..present]);
                swap_u16_buffer(&mut tiled);
                untile_xenon(&tiled, width, height, format)?
            }
            Platform::Pc => image.to_vec(),
        };

        let info = TextureInformation::new(format, width, height, 1);
        let mut file = Vec::new();
        write_dds(&mut file, &info, &surface)?;
        filestore.store(&format!("textures/{name}.dds"), &file)?;
    }
    Ok(())
}
